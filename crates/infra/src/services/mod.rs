//! Application services: authorization, validation and storage wired
//! together per operation.

pub mod roster;
pub mod users;

pub use roster::{RosterError, RosterService};
pub use users::{AdminError, UserAdministration, UserStats};
