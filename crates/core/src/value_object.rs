//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. `Money` is the
/// canonical example in this workspace: two amounts of 1500 cents are the same value,
/// wherever they came from.
///
/// ```ignore
/// let a = Money::from_cents(1500);
/// let b: Money = "15.00".parse()?;
/// assert_eq!(a, b);
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
