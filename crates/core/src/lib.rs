//! `roster-core` — shared domain building blocks.
//!
//! Typed identifiers, the domain error model and field-scoped validation
//! errors. No storage or transport concerns live here.

pub mod entity;
pub mod error;
pub mod id;
pub mod validation;
pub mod value_object;

pub use entity::Entity;
pub use error::DomainError;
pub use id::{PlayerId, TeamId, UserId};
pub use validation::{FieldError, ValidationErrors};
pub use value_object::ValueObject;
