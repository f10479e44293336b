//! `devplan-core` — domain foundation building blocks.
//!
//! Pure domain primitives shared by the DevPlan modules: aggregate/entity
//! traits, the value-object marker, typed identifiers and the domain error
//! model. No IO, no HTTP, no storage concerns.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{AggregateId, ProjectId, TeamId, UserId};
pub use value_object::ValueObject;
