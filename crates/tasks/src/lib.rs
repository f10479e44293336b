//! Tasks domain module (event-sourced).
//!
//! Work-item lifecycle with explicit transition guards and clamped hour
//! tracking. Deterministic domain logic only (no IO, no HTTP, no storage).

pub mod hours;
pub mod task;

pub use hours::{ActualHours, EstimatedHours, MAX_HOURS};
pub use task::{
    ArchiveTask, AssignTask, CancelTask, CompleteTask, CreateTask, EstimateRevised, HoursLogged,
    LogHours, ReopenTask, ReviseEstimate, StartTask, SubmitForReview, Task, TaskArchived,
    TaskAssigned, TaskCancelled, TaskCommand, TaskCompleted, TaskCreated, TaskEvent, TaskId,
    TaskReopened, TaskStarted, TaskStatus, TaskSubmittedForReview, TaskUnassigned, UnassignTask,
};
