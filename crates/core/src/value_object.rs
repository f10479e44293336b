//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value** - they carry no
/// identity of their own. `Email`, `Username` and the task hour wrappers are
/// all value objects: two `Email`s holding the same address are equal, and
/// "modifying" one means constructing a new value.
///
/// The bounds mirror what that implies in practice: values are cheap to clone,
/// comparable by their attributes, and debuggable in logs and tests.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
