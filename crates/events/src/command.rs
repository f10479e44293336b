use devplan_core::AggregateId;

/// A command targets a specific aggregate.
///
/// Commands represent **intent** and are transient; they are either rejected
/// (validation, invariant failures) or turned into events, which are the
/// persisted facts. Each command operates on exactly one aggregate, which is
/// the transaction boundary.
///
/// The bounds (`Clone + Send + Sync + 'static`) exist because commands may be
/// retried, logged and handed across worker threads.
pub trait Command: Clone + core::fmt::Debug + Send + Sync + 'static {
    fn target_aggregate_id(&self) -> AggregateId;
}
