//! `devplan-events` — domain event mechanics.
//!
//! Event/command abstractions, the stream envelope and a lightweight pub/sub
//! bus used to dispatch committed events to subscribers (notification senders,
//! read-model builders, audit logs). Pure mechanics, no business rules.

pub mod bus;
pub mod command;
pub mod envelope;
pub mod event;
pub mod handler;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use command::Command;
pub use envelope::EventEnvelope;
pub use event::Event;
pub use handler::{execute, CommandHandler};
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
