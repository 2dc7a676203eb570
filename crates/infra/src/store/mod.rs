//! Storage boundary: traits the services depend on plus in-memory
//! implementations for tests and single-process use.
//!
//! Unique indexes live here and are authoritative. Callers may pre-check
//! (slug probing, duplicate names) but must still handle
//! [`StoreError::UniqueViolation`].

pub mod error;
pub mod roles;
pub mod roster;
pub mod users;

pub use error::{Constraint, StoreError};
pub use roles::SharedRoleRegistry;
pub use roster::{InMemoryRosterStore, RosterStore};
pub use users::{InMemoryUserStore, UserStore};
