use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use devplan_core::{Aggregate, AggregateId, AggregateRoot, DomainError, ProjectId, UserId};
use devplan_events::Event;

use crate::hours::{ActualHours, EstimatedHours};

/// Task identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub AggregateId);

impl TaskId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for TaskId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Task status lifecycle.
///
/// ```text
/// Todo ──start──► InProgress ──submit──► InReview ──complete──► Done
///                     ▲                      │                    │
///                     └──────reopen──────────┘                    │
///
/// Todo | InProgress | InReview ──cancel──► Cancelled              │
/// Done | Cancelled ──archive──► Archived ◄─────────────────────────┘
/// ```
///
/// Done and Cancelled accept only `archive`; Archived accepts nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    InReview,
    Done,
    Cancelled,
    Archived,
}

impl TaskStatus {
    /// Done/Cancelled/Archived: no forward work transitions remain.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Done | TaskStatus::Cancelled | TaskStatus::Archived
        )
    }
}

impl core::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::InReview => "in_review",
            TaskStatus::Done => "done",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::Archived => "archived",
        };
        f.write_str(s)
    }
}

/// Aggregate root: Task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    project_id: Option<ProjectId>,
    title: String,
    assignee: Option<UserId>,
    status: TaskStatus,
    estimate: Option<EstimatedHours>,
    actual: ActualHours,
    version: u64,
    created: bool,
}

impl Task {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: TaskId) -> Self {
        Self {
            id,
            project_id: None,
            title: String::new(),
            assignee: None,
            status: TaskStatus::Todo,
            estimate: None,
            actual: ActualHours::default(),
            version: 0,
            created: false,
        }
    }

    pub fn project_id(&self) -> Option<ProjectId> {
        self.project_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn assignee(&self) -> Option<UserId> {
        self.assignee
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn estimate(&self) -> Option<EstimatedHours> {
        self.estimate
    }

    pub fn actual(&self) -> ActualHours {
        self.actual
    }

    fn ensure_created(&self) -> Result<(), DomainError> {
        if self.created {
            Ok(())
        } else {
            Err(DomainError::NotFound)
        }
    }

    fn ensure_not_terminal(&self) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::invariant(format!(
                "task is {} (terminal)",
                self.status
            )));
        }
        Ok(())
    }

    fn ensure_status(&self, expected: TaskStatus, action: &str) -> Result<(), DomainError> {
        if self.status != expected {
            return Err(DomainError::invariant(format!(
                "cannot {action} a task that is {} (requires {expected})",
                self.status
            )));
        }
        Ok(())
    }
}

impl AggregateRoot for Task {
    type Id = TaskId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Command: create a task in `Todo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTask {
    pub task_id: TaskId,
    pub project_id: ProjectId,
    pub title: String,
    pub estimate: Option<EstimatedHours>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: assign the task to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignTask {
    pub task_id: TaskId,
    pub assignee: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: remove the current assignee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnassignTask {
    pub task_id: TaskId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: begin work (`Todo` → `InProgress`, requires an assignee).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartTask {
    pub task_id: TaskId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: hand over for review (`InProgress` → `InReview`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitForReview {
    pub task_id: TaskId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: accept the work (`InReview` → `Done`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteTask {
    pub task_id: TaskId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: send back from review (`InReview` → `InProgress`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReopenTask {
    pub task_id: TaskId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: cancel from any non-terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelTask {
    pub task_id: TaskId,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: archive a finished task (`Done`/`Cancelled` → `Archived`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveTask {
    pub task_id: TaskId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: replace the effort estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviseEstimate {
    pub task_id: TaskId,
    pub estimate: EstimatedHours,
    pub occurred_at: DateTime<Utc>,
}

/// Command: log worked hours (accumulating, saturating at the cap).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogHours {
    pub task_id: TaskId,
    pub hours: u32,
    pub occurred_at: DateTime<Utc>,
}

/// All task commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskCommand {
    Create(CreateTask),
    Assign(AssignTask),
    Unassign(UnassignTask),
    Start(StartTask),
    SubmitForReview(SubmitForReview),
    Complete(CompleteTask),
    Reopen(ReopenTask),
    Cancel(CancelTask),
    Archive(ArchiveTask),
    ReviseEstimate(ReviseEstimate),
    LogHours(LogHours),
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// Event: task created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCreated {
    pub task_id: TaskId,
    pub project_id: ProjectId,
    pub title: String,
    pub estimate: Option<EstimatedHours>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: task assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAssigned {
    pub task_id: TaskId,
    pub assignee: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: assignee removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUnassigned {
    pub task_id: TaskId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: work started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStarted {
    pub task_id: TaskId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: submitted for review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSubmittedForReview {
    pub task_id: TaskId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: task completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCompleted {
    pub task_id: TaskId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: sent back from review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskReopened {
    pub task_id: TaskId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: task cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCancelled {
    pub task_id: TaskId,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: task archived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskArchived {
    pub task_id: TaskId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: estimate replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateRevised {
    pub task_id: TaskId,
    pub estimate: EstimatedHours,
    pub occurred_at: DateTime<Utc>,
}

/// Event: hours logged.
///
/// Carries the post-accumulation total so replays do not need to re-run the
/// saturating addition against intermediate state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoursLogged {
    pub task_id: TaskId,
    pub hours: u32,
    pub total: ActualHours,
    pub occurred_at: DateTime<Utc>,
}

/// All task events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskEvent {
    Created(TaskCreated),
    Assigned(TaskAssigned),
    Unassigned(TaskUnassigned),
    Started(TaskStarted),
    SubmittedForReview(TaskSubmittedForReview),
    Completed(TaskCompleted),
    Reopened(TaskReopened),
    Cancelled(TaskCancelled),
    Archived(TaskArchived),
    EstimateRevised(EstimateRevised),
    HoursLogged(HoursLogged),
}

impl Event for TaskEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TaskEvent::Created(_) => "tasks.task.created",
            TaskEvent::Assigned(_) => "tasks.task.assigned",
            TaskEvent::Unassigned(_) => "tasks.task.unassigned",
            TaskEvent::Started(_) => "tasks.task.started",
            TaskEvent::SubmittedForReview(_) => "tasks.task.submitted_for_review",
            TaskEvent::Completed(_) => "tasks.task.completed",
            TaskEvent::Reopened(_) => "tasks.task.reopened",
            TaskEvent::Cancelled(_) => "tasks.task.cancelled",
            TaskEvent::Archived(_) => "tasks.task.archived",
            TaskEvent::EstimateRevised(_) => "tasks.task.estimate_revised",
            TaskEvent::HoursLogged(_) => "tasks.task.hours_logged",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            TaskEvent::Created(e) => e.occurred_at,
            TaskEvent::Assigned(e) => e.occurred_at,
            TaskEvent::Unassigned(e) => e.occurred_at,
            TaskEvent::Started(e) => e.occurred_at,
            TaskEvent::SubmittedForReview(e) => e.occurred_at,
            TaskEvent::Completed(e) => e.occurred_at,
            TaskEvent::Reopened(e) => e.occurred_at,
            TaskEvent::Cancelled(e) => e.occurred_at,
            TaskEvent::Archived(e) => e.occurred_at,
            TaskEvent::EstimateRevised(e) => e.occurred_at,
            TaskEvent::HoursLogged(e) => e.occurred_at,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Aggregate implementation
// ─────────────────────────────────────────────────────────────────────────────

impl Aggregate for Task {
    type Command = TaskCommand;
    type Event = TaskEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            TaskEvent::Created(e) => {
                self.id = e.task_id;
                self.project_id = Some(e.project_id);
                self.title = e.title.clone();
                self.estimate = e.estimate;
                self.status = TaskStatus::Todo;
                self.created = true;
            }
            TaskEvent::Assigned(e) => self.assignee = Some(e.assignee),
            TaskEvent::Unassigned(_) => self.assignee = None,
            TaskEvent::Started(_) => self.status = TaskStatus::InProgress,
            TaskEvent::SubmittedForReview(_) => self.status = TaskStatus::InReview,
            TaskEvent::Completed(_) => self.status = TaskStatus::Done,
            TaskEvent::Reopened(_) => self.status = TaskStatus::InProgress,
            TaskEvent::Cancelled(_) => self.status = TaskStatus::Cancelled,
            TaskEvent::Archived(_) => self.status = TaskStatus::Archived,
            TaskEvent::EstimateRevised(e) => self.estimate = Some(e.estimate),
            TaskEvent::HoursLogged(e) => self.actual = e.total,
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            TaskCommand::Create(cmd) => self.handle_create(cmd),
            TaskCommand::Assign(cmd) => self.handle_assign(cmd),
            TaskCommand::Unassign(cmd) => self.handle_unassign(cmd),
            TaskCommand::Start(cmd) => self.handle_start(cmd),
            TaskCommand::SubmitForReview(cmd) => self.handle_submit(cmd),
            TaskCommand::Complete(cmd) => self.handle_complete(cmd),
            TaskCommand::Reopen(cmd) => self.handle_reopen(cmd),
            TaskCommand::Cancel(cmd) => self.handle_cancel(cmd),
            TaskCommand::Archive(cmd) => self.handle_archive(cmd),
            TaskCommand::ReviseEstimate(cmd) => self.handle_revise_estimate(cmd),
            TaskCommand::LogHours(cmd) => self.handle_log_hours(cmd),
        }
    }
}

impl Task {
    fn handle_create(&self, cmd: &CreateTask) -> Result<Vec<TaskEvent>, DomainError> {
        if self.created {
            return Err(DomainError::invariant("task already exists"));
        }

        let title = cmd.title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("task title cannot be empty"));
        }
        if title.len() > 200 {
            return Err(DomainError::validation("task title too long (max 200)"));
        }

        Ok(vec![TaskEvent::Created(TaskCreated {
            task_id: cmd.task_id,
            project_id: cmd.project_id,
            title: title.to_string(),
            estimate: cmd.estimate,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_assign(&self, cmd: &AssignTask) -> Result<Vec<TaskEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_not_terminal()?;

        if self.assignee == Some(cmd.assignee) {
            return Err(DomainError::invariant("task already assigned to this user"));
        }

        Ok(vec![TaskEvent::Assigned(TaskAssigned {
            task_id: cmd.task_id,
            assignee: cmd.assignee,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_unassign(&self, cmd: &UnassignTask) -> Result<Vec<TaskEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_not_terminal()?;

        if self.assignee.is_none() {
            return Err(DomainError::invariant("task has no assignee"));
        }

        Ok(vec![TaskEvent::Unassigned(TaskUnassigned {
            task_id: cmd.task_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_start(&self, cmd: &StartTask) -> Result<Vec<TaskEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_status(TaskStatus::Todo, "start")?;

        if self.assignee.is_none() {
            return Err(DomainError::invariant("cannot start an unassigned task"));
        }

        Ok(vec![TaskEvent::Started(TaskStarted {
            task_id: cmd.task_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_submit(&self, cmd: &SubmitForReview) -> Result<Vec<TaskEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_status(TaskStatus::InProgress, "submit")?;

        Ok(vec![TaskEvent::SubmittedForReview(TaskSubmittedForReview {
            task_id: cmd.task_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_complete(&self, cmd: &CompleteTask) -> Result<Vec<TaskEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_status(TaskStatus::InReview, "complete")?;

        Ok(vec![TaskEvent::Completed(TaskCompleted {
            task_id: cmd.task_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_reopen(&self, cmd: &ReopenTask) -> Result<Vec<TaskEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_status(TaskStatus::InReview, "reopen")?;

        Ok(vec![TaskEvent::Reopened(TaskReopened {
            task_id: cmd.task_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_cancel(&self, cmd: &CancelTask) -> Result<Vec<TaskEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_not_terminal()?;

        Ok(vec![TaskEvent::Cancelled(TaskCancelled {
            task_id: cmd.task_id,
            reason: cmd.reason.trim().to_string(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_archive(&self, cmd: &ArchiveTask) -> Result<Vec<TaskEvent>, DomainError> {
        self.ensure_created()?;

        if !matches!(self.status, TaskStatus::Done | TaskStatus::Cancelled) {
            return Err(DomainError::invariant(format!(
                "only done or cancelled tasks can be archived (task is {})",
                self.status
            )));
        }

        Ok(vec![TaskEvent::Archived(TaskArchived {
            task_id: cmd.task_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_revise_estimate(&self, cmd: &ReviseEstimate) -> Result<Vec<TaskEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_not_terminal()?;

        Ok(vec![TaskEvent::EstimateRevised(EstimateRevised {
            task_id: cmd.task_id,
            estimate: cmd.estimate,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_log_hours(&self, cmd: &LogHours) -> Result<Vec<TaskEvent>, DomainError> {
        self.ensure_created()?;

        if !matches!(self.status, TaskStatus::InProgress | TaskStatus::InReview) {
            return Err(DomainError::invariant(format!(
                "hours can only be logged while in progress or in review (task is {})",
                self.status
            )));
        }
        if cmd.hours == 0 {
            return Err(DomainError::validation("logged hours must be positive"));
        }

        Ok(vec![TaskEvent::HoursLogged(HoursLogged {
            task_id: cmd.task_id,
            hours: cmd.hours,
            total: self.actual.add(cmd.hours),
            occurred_at: cmd.occurred_at,
        })])
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
