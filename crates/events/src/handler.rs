use crate::{Command, Event};

/// Handles a command and emits events, independent of the aggregate lifecycle.
///
/// Useful for background workers and tests that transform commands to events
/// without going through full aggregate rehydration.
pub trait CommandHandler {
    type Cmd: Command;
    type Ev: Event;
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn handle(&self, command: Self::Cmd) -> Result<Vec<Self::Ev>, Self::Error>;
}

/// Execute an aggregate command deterministically (no IO, no async).
///
/// The canonical decide-then-evolve step: `handle` produces events without
/// mutating state, then each event is applied in order. The aggregate's own
/// `apply` is responsible for bumping its version.
pub fn execute<A>(aggregate: &mut A, command: &A::Command) -> Result<Vec<A::Event>, A::Error>
where
    A: devplan_core::Aggregate,
{
    let events = A::handle(aggregate, command)?;
    for ev in &events {
        A::apply(aggregate, ev);
    }
    Ok(events)
}
