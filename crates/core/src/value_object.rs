//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// A value object has no identity of its own: a permission set or a parsed
/// birthplace is defined entirely by its contents, and two with the same
/// contents are interchangeable.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
