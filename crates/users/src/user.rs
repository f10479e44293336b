//! User aggregate: account lifecycle, roles and memberships.
//!
//! # Invariants
//! - Status transitions happen only through commands with legal-predecessor
//!   guards (see [`UserStatus`]).
//! - A user holds exactly one role; re-assignment replaces it.
//! - Actors cannot grant a role above their own (privilege escalation).
//! - Blocked or inactive users cannot receive roles or join teams/projects.
//! - Memberships are unique per team/project.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use devplan_auth::{RoleKind, UserRole};
use devplan_core::{Aggregate, AggregateRoot, DomainError, ProjectId, TeamId, UserId};
use devplan_events::Event;

use crate::identity::{Email, Username};

// ─────────────────────────────────────────────────────────────────────────────
// Status & memberships
// ─────────────────────────────────────────────────────────────────────────────

/// User account lifecycle.
///
/// ```text
/// PendingVerification ──verify──► PendingApproval ──approve──► Active
///          │                                                     │ ▲
///          └──verify (auto-approve)──────────────────────────────┘ │
///                                        deactivate │ reactivate ──┘
///
/// any non-Blocked ──block──► Blocked ──unblock──► Active
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    PendingVerification,
    PendingApproval,
    Active,
    Inactive,
    Blocked,
}

impl core::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            UserStatus::PendingVerification => "pending_verification",
            UserStatus::PendingApproval => "pending_approval",
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Blocked => "blocked",
        };
        f.write_str(s)
    }
}

/// Membership of a user in a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMembership {
    pub team_id: TeamId,
    pub joined_at: DateTime<Utc>,
}

/// Membership of a user in a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMembership {
    pub project_id: ProjectId,
    pub joined_at: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Aggregate
// ─────────────────────────────────────────────────────────────────────────────

/// Aggregate root: User.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: Option<Username>,
    email: Option<Email>,
    password_hash: String,
    role: Option<UserRole>,
    status: UserStatus,
    teams: Vec<TeamMembership>,
    projects: Vec<ProjectMembership>,
    version: u64,
    created: bool,
}

impl User {
    /// Create an empty, not-yet-registered aggregate instance for rehydration.
    pub fn empty(id: UserId) -> Self {
        Self {
            id,
            username: None,
            email: None,
            password_hash: String::new(),
            role: None,
            status: UserStatus::PendingVerification,
            teams: Vec::new(),
            projects: Vec::new(),
            version: 0,
            created: false,
        }
    }

    pub fn username(&self) -> Option<&Username> {
        self.username.as_ref()
    }

    pub fn email(&self) -> Option<&Email> {
        self.email.as_ref()
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn role(&self) -> Option<&UserRole> {
        self.role.as_ref()
    }

    pub fn status(&self) -> UserStatus {
        self.status
    }

    pub fn teams(&self) -> &[TeamMembership] {
        &self.teams
    }

    pub fn projects(&self) -> &[ProjectMembership] {
        &self.projects
    }

    /// Whether the account may authenticate and transact.
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    fn ensure_created(&self) -> Result<(), DomainError> {
        if self.created {
            Ok(())
        } else {
            Err(DomainError::NotFound)
        }
    }

    fn ensure_active(&self) -> Result<(), DomainError> {
        match self.status {
            UserStatus::Active => Ok(()),
            other => Err(DomainError::invariant(format!(
                "user is {other}, must be active"
            ))),
        }
    }
}

impl AggregateRoot for User {
    type Id = UserId;

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

/// Command to register a new user account.
///
/// The credential arrives pre-hashed; plaintext never enters the domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterUser {
    pub user_id: UserId,
    pub username: Username,
    pub email: Email,
    pub password_hash: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command to confirm the account's email address.
///
/// `auto_approve` is a caller-side policy decision: when set, verification
/// activates the account directly instead of parking it for manual approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyEmail {
    pub user_id: UserId,
    pub auto_approve: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Command to approve a pending account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveUser {
    pub user_id: UserId,
    pub approved_by: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Command to deactivate an active account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeactivateUser {
    pub user_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Command to reactivate a deactivated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactivateUser {
    pub user_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Command to block an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockUser {
    pub user_id: UserId,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command to lift a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnblockUser {
    pub user_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Command to assign a role to a user (replaces the current role).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignRole {
    pub user_id: UserId,
    pub role: RoleKind,
    pub assigned_by: UserId,
    /// Role of the actor performing the assignment (escalation guard).
    pub actor_role: RoleKind,
    pub occurred_at: DateTime<Utc>,
}

/// Command to join a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinTeam {
    pub user_id: UserId,
    pub team_id: TeamId,
    pub occurred_at: DateTime<Utc>,
}

/// Command to leave a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveTeam {
    pub user_id: UserId,
    pub team_id: TeamId,
    pub occurred_at: DateTime<Utc>,
}

/// Command to join a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinProject {
    pub user_id: UserId,
    pub project_id: ProjectId,
    pub occurred_at: DateTime<Utc>,
}

/// Command to leave a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveProject {
    pub user_id: UserId,
    pub project_id: ProjectId,
    pub occurred_at: DateTime<Utc>,
}

/// All user commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserCommand {
    Register(RegisterUser),
    VerifyEmail(VerifyEmail),
    Approve(ApproveUser),
    Deactivate(DeactivateUser),
    Reactivate(ReactivateUser),
    Block(BlockUser),
    Unblock(UnblockUser),
    AssignRole(AssignRole),
    JoinTeam(JoinTeam),
    LeaveTeam(LeaveTeam),
    JoinProject(JoinProject),
    LeaveProject(LeaveProject),
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// Event emitted when a user registers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRegistered {
    pub user_id: UserId,
    pub username: Username,
    pub email: Email,
    pub password_hash: String,
    pub initial_role: UserRole,
    pub occurred_at: DateTime<Utc>,
}

/// Event emitted when the email address is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailVerified {
    pub user_id: UserId,
    /// Status the account moved to (`Active` when auto-approved).
    pub new_status: UserStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Event emitted when a pending account is approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserApproved {
    pub user_id: UserId,
    pub approved_by: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Event emitted when an account is deactivated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDeactivated {
    pub user_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Event emitted when an account is reactivated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserReactivated {
    pub user_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Event emitted when an account is blocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBlocked {
    pub user_id: UserId,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event emitted when a block is lifted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUnblocked {
    pub user_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Event emitted when a role is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssigned {
    pub user_id: UserId,
    pub role: UserRole,
    pub occurred_at: DateTime<Utc>,
}

/// Event emitted when the user joins a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamJoined {
    pub user_id: UserId,
    pub team_id: TeamId,
    pub occurred_at: DateTime<Utc>,
}

/// Event emitted when the user leaves a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamLeft {
    pub user_id: UserId,
    pub team_id: TeamId,
    pub occurred_at: DateTime<Utc>,
}

/// Event emitted when the user joins a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectJoined {
    pub user_id: UserId,
    pub project_id: ProjectId,
    pub occurred_at: DateTime<Utc>,
}

/// Event emitted when the user leaves a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectLeft {
    pub user_id: UserId,
    pub project_id: ProjectId,
    pub occurred_at: DateTime<Utc>,
}

/// All user events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserEvent {
    Registered(UserRegistered),
    EmailVerified(EmailVerified),
    Approved(UserApproved),
    Deactivated(UserDeactivated),
    Reactivated(UserReactivated),
    Blocked(UserBlocked),
    Unblocked(UserUnblocked),
    RoleAssigned(RoleAssigned),
    TeamJoined(TeamJoined),
    TeamLeft(TeamLeft),
    ProjectJoined(ProjectJoined),
    ProjectLeft(ProjectLeft),
}

impl Event for UserEvent {
    fn event_type(&self) -> &'static str {
        match self {
            UserEvent::Registered(_) => "users.user.registered",
            UserEvent::EmailVerified(_) => "users.user.email_verified",
            UserEvent::Approved(_) => "users.user.approved",
            UserEvent::Deactivated(_) => "users.user.deactivated",
            UserEvent::Reactivated(_) => "users.user.reactivated",
            UserEvent::Blocked(_) => "users.user.blocked",
            UserEvent::Unblocked(_) => "users.user.unblocked",
            UserEvent::RoleAssigned(_) => "users.user.role_assigned",
            UserEvent::TeamJoined(_) => "users.user.team_joined",
            UserEvent::TeamLeft(_) => "users.user.team_left",
            UserEvent::ProjectJoined(_) => "users.user.project_joined",
            UserEvent::ProjectLeft(_) => "users.user.project_left",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            UserEvent::Registered(e) => e.occurred_at,
            UserEvent::EmailVerified(e) => e.occurred_at,
            UserEvent::Approved(e) => e.occurred_at,
            UserEvent::Deactivated(e) => e.occurred_at,
            UserEvent::Reactivated(e) => e.occurred_at,
            UserEvent::Blocked(e) => e.occurred_at,
            UserEvent::Unblocked(e) => e.occurred_at,
            UserEvent::RoleAssigned(e) => e.occurred_at,
            UserEvent::TeamJoined(e) => e.occurred_at,
            UserEvent::TeamLeft(e) => e.occurred_at,
            UserEvent::ProjectJoined(e) => e.occurred_at,
            UserEvent::ProjectLeft(e) => e.occurred_at,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Aggregate implementation
// ─────────────────────────────────────────────────────────────────────────────

impl Aggregate for User {
    type Command = UserCommand;
    type Event = UserEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            UserEvent::Registered(e) => self.apply_registered(e),
            UserEvent::EmailVerified(e) => self.status = e.new_status,
            UserEvent::Approved(_) => self.status = UserStatus::Active,
            UserEvent::Deactivated(_) => self.status = UserStatus::Inactive,
            UserEvent::Reactivated(_) => self.status = UserStatus::Active,
            UserEvent::Blocked(_) => self.status = UserStatus::Blocked,
            UserEvent::Unblocked(_) => self.status = UserStatus::Active,
            UserEvent::RoleAssigned(e) => self.role = Some(e.role.clone()),
            UserEvent::TeamJoined(e) => self.teams.push(TeamMembership {
                team_id: e.team_id,
                joined_at: e.occurred_at,
            }),
            UserEvent::TeamLeft(e) => self.teams.retain(|m| m.team_id != e.team_id),
            UserEvent::ProjectJoined(e) => self.projects.push(ProjectMembership {
                project_id: e.project_id,
                joined_at: e.occurred_at,
            }),
            UserEvent::ProjectLeft(e) => self.projects.retain(|m| m.project_id != e.project_id),
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            UserCommand::Register(cmd) => self.handle_register(cmd),
            UserCommand::VerifyEmail(cmd) => self.handle_verify_email(cmd),
            UserCommand::Approve(cmd) => self.handle_approve(cmd),
            UserCommand::Deactivate(cmd) => self.handle_deactivate(cmd),
            UserCommand::Reactivate(cmd) => self.handle_reactivate(cmd),
            UserCommand::Block(cmd) => self.handle_block(cmd),
            UserCommand::Unblock(cmd) => self.handle_unblock(cmd),
            UserCommand::AssignRole(cmd) => self.handle_assign_role(cmd),
            UserCommand::JoinTeam(cmd) => self.handle_join_team(cmd),
            UserCommand::LeaveTeam(cmd) => self.handle_leave_team(cmd),
            UserCommand::JoinProject(cmd) => self.handle_join_project(cmd),
            UserCommand::LeaveProject(cmd) => self.handle_leave_project(cmd),
        }
    }
}

impl User {
    // ─────────────────────────────────────────────────────────────────────────
    // Command handlers
    // ─────────────────────────────────────────────────────────────────────────

    fn handle_register(&self, cmd: &RegisterUser) -> Result<Vec<UserEvent>, DomainError> {
        if self.created {
            return Err(DomainError::invariant("user already registered"));
        }
        if cmd.password_hash.trim().is_empty() {
            return Err(DomainError::validation("password hash cannot be empty"));
        }

        Ok(vec![UserEvent::Registered(UserRegistered {
            user_id: cmd.user_id,
            username: cmd.username.clone(),
            email: cmd.email.clone(),
            password_hash: cmd.password_hash.clone(),
            initial_role: UserRole::system(RoleKind::Guest, cmd.occurred_at),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_verify_email(&self, cmd: &VerifyEmail) -> Result<Vec<UserEvent>, DomainError> {
        self.ensure_created()?;

        if self.status != UserStatus::PendingVerification {
            return Err(DomainError::invariant(format!(
                "cannot verify email while {}",
                self.status
            )));
        }

        let new_status = if cmd.auto_approve {
            UserStatus::Active
        } else {
            UserStatus::PendingApproval
        };

        Ok(vec![UserEvent::EmailVerified(EmailVerified {
            user_id: cmd.user_id,
            new_status,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_approve(&self, cmd: &ApproveUser) -> Result<Vec<UserEvent>, DomainError> {
        self.ensure_created()?;

        if self.status != UserStatus::PendingApproval {
            return Err(DomainError::invariant(format!(
                "cannot approve a user that is {}",
                self.status
            )));
        }
        if cmd.approved_by == self.id {
            return Err(DomainError::invariant("users cannot approve themselves"));
        }

        Ok(vec![UserEvent::Approved(UserApproved {
            user_id: cmd.user_id,
            approved_by: cmd.approved_by,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_deactivate(&self, cmd: &DeactivateUser) -> Result<Vec<UserEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_active()?;

        Ok(vec![UserEvent::Deactivated(UserDeactivated {
            user_id: cmd.user_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_reactivate(&self, cmd: &ReactivateUser) -> Result<Vec<UserEvent>, DomainError> {
        self.ensure_created()?;

        if self.status != UserStatus::Inactive {
            return Err(DomainError::invariant(format!(
                "cannot reactivate a user that is {}",
                self.status
            )));
        }

        Ok(vec![UserEvent::Reactivated(UserReactivated {
            user_id: cmd.user_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_block(&self, cmd: &BlockUser) -> Result<Vec<UserEvent>, DomainError> {
        self.ensure_created()?;

        if self.status == UserStatus::Blocked {
            return Err(DomainError::invariant("user is already blocked"));
        }
        if cmd.reason.trim().is_empty() {
            return Err(DomainError::validation("block reason cannot be empty"));
        }

        Ok(vec![UserEvent::Blocked(UserBlocked {
            user_id: cmd.user_id,
            reason: cmd.reason.trim().to_string(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_unblock(&self, cmd: &UnblockUser) -> Result<Vec<UserEvent>, DomainError> {
        self.ensure_created()?;

        if self.status != UserStatus::Blocked {
            return Err(DomainError::invariant("user is not blocked"));
        }

        Ok(vec![UserEvent::Unblocked(UserUnblocked {
            user_id: cmd.user_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_assign_role(&self, cmd: &AssignRole) -> Result<Vec<UserEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_active()?;

        // Escalation guard first: an unauthorized actor must not learn
        // anything about the target's current role.
        if cmd.actor_role < cmd.role {
            return Err(DomainError::Unauthorized);
        }

        if self.role.as_ref().is_some_and(|r| r.kind == cmd.role) {
            return Err(DomainError::invariant("role already assigned"));
        }

        Ok(vec![UserEvent::RoleAssigned(RoleAssigned {
            user_id: cmd.user_id,
            role: UserRole::new(cmd.role, cmd.occurred_at, Some(cmd.assigned_by)),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_join_team(&self, cmd: &JoinTeam) -> Result<Vec<UserEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_active()?;

        if self.teams.iter().any(|m| m.team_id == cmd.team_id) {
            return Err(DomainError::invariant("already a member of this team"));
        }

        Ok(vec![UserEvent::TeamJoined(TeamJoined {
            user_id: cmd.user_id,
            team_id: cmd.team_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_leave_team(&self, cmd: &LeaveTeam) -> Result<Vec<UserEvent>, DomainError> {
        self.ensure_created()?;

        if !self.teams.iter().any(|m| m.team_id == cmd.team_id) {
            return Err(DomainError::invariant("not a member of this team"));
        }

        Ok(vec![UserEvent::TeamLeft(TeamLeft {
            user_id: cmd.user_id,
            team_id: cmd.team_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_join_project(&self, cmd: &JoinProject) -> Result<Vec<UserEvent>, DomainError> {
        self.ensure_created()?;
        self.ensure_active()?;

        if self.projects.iter().any(|m| m.project_id == cmd.project_id) {
            return Err(DomainError::invariant("already a member of this project"));
        }

        Ok(vec![UserEvent::ProjectJoined(ProjectJoined {
            user_id: cmd.user_id,
            project_id: cmd.project_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_leave_project(&self, cmd: &LeaveProject) -> Result<Vec<UserEvent>, DomainError> {
        self.ensure_created()?;

        if !self.projects.iter().any(|m| m.project_id == cmd.project_id) {
            return Err(DomainError::invariant("not a member of this project"));
        }

        Ok(vec![UserEvent::ProjectLeft(ProjectLeft {
            user_id: cmd.user_id,
            project_id: cmd.project_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Event appliers
    // ─────────────────────────────────────────────────────────────────────────

    fn apply_registered(&mut self, e: &UserRegistered) {
        self.id = e.user_id;
        self.username = Some(e.username.clone());
        self.email = Some(e.email.clone());
        self.password_hash = e.password_hash.clone();
        self.role = Some(e.initial_role.clone());
        self.status = UserStatus::PendingVerification;
        self.created = true;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use devplan_events::execute;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn register_cmd(user_id: UserId) -> UserCommand {
        UserCommand::Register(RegisterUser {
            user_id,
            username: Username::new("alice").unwrap(),
            email: Email::new("alice@example.com").unwrap(),
            password_hash: "$argon2id$stub".to_string(),
            occurred_at: now(),
        })
    }

    fn registered_user() -> User {
        let user_id = UserId::new();
        let mut user = User::empty(user_id);
        execute(&mut user, &register_cmd(user_id)).unwrap();
        user
    }

    /// Registered, verified (not auto-approved), approved by another user.
    fn active_user() -> User {
        let mut user = registered_user();
        let user_id = *user.id();
        execute(
            &mut user,
            &UserCommand::VerifyEmail(VerifyEmail {
                user_id,
                auto_approve: false,
                occurred_at: now(),
            }),
        )
        .unwrap();
        execute(
            &mut user,
            &UserCommand::Approve(ApproveUser {
                user_id,
                approved_by: UserId::new(),
                occurred_at: now(),
            }),
        )
        .unwrap();
        user
    }

    #[test]
    fn register_starts_pending_verification_with_guest_role() {
        let user = registered_user();

        assert_eq!(user.status(), UserStatus::PendingVerification);
        assert_eq!(user.role().unwrap().kind, RoleKind::Guest);
        assert!(user.role().unwrap().assigned_by.is_none());
        assert_eq!(user.version(), 1);
    }

    #[test]
    fn register_twice_rejected() {
        let user = registered_user();
        let err = user.handle(&register_cmd(*user.id())).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn verify_email_moves_to_pending_approval() {
        let mut user = registered_user();
        let user_id = *user.id();

        execute(
            &mut user,
            &UserCommand::VerifyEmail(VerifyEmail {
                user_id,
                auto_approve: false,
                occurred_at: now(),
            }),
        )
        .unwrap();

        assert_eq!(user.status(), UserStatus::PendingApproval);
    }

    #[test]
    fn verify_email_auto_approve_activates() {
        let mut user = registered_user();
        let user_id = *user.id();

        execute(
            &mut user,
            &UserCommand::VerifyEmail(VerifyEmail {
                user_id,
                auto_approve: true,
                occurred_at: now(),
            }),
        )
        .unwrap();

        assert_eq!(user.status(), UserStatus::Active);
    }

    #[test]
    fn cannot_verify_twice() {
        let mut user = registered_user();
        let user_id = *user.id();
        let cmd = UserCommand::VerifyEmail(VerifyEmail {
            user_id,
            auto_approve: true,
            occurred_at: now(),
        });

        execute(&mut user, &cmd).unwrap();
        assert!(user.handle(&cmd).is_err());
    }

    #[test]
    fn approve_requires_pending_approval() {
        let user = registered_user();
        let err = user
            .handle(&UserCommand::Approve(ApproveUser {
                user_id: *user.id(),
                approved_by: UserId::new(),
                occurred_at: now(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn self_approval_rejected() {
        let mut user = registered_user();
        let user_id = *user.id();
        execute(
            &mut user,
            &UserCommand::VerifyEmail(VerifyEmail {
                user_id,
                auto_approve: false,
                occurred_at: now(),
            }),
        )
        .unwrap();

        let err = user
            .handle(&UserCommand::Approve(ApproveUser {
                user_id,
                approved_by: user_id,
                occurred_at: now(),
            }))
            .unwrap_err();
        assert!(err.to_string().contains("themselves"));
    }

    #[test]
    fn deactivate_and_reactivate() {
        let mut user = active_user();
        let user_id = *user.id();

        execute(
            &mut user,
            &UserCommand::Deactivate(DeactivateUser {
                user_id,
                occurred_at: now(),
            }),
        )
        .unwrap();
        assert_eq!(user.status(), UserStatus::Inactive);

        execute(
            &mut user,
            &UserCommand::Reactivate(ReactivateUser {
                user_id,
                occurred_at: now(),
            }),
        )
        .unwrap();
        assert_eq!(user.status(), UserStatus::Active);
    }

    #[test]
    fn block_from_any_non_blocked_state() {
        let mut user = registered_user();
        let user_id = *user.id();

        execute(
            &mut user,
            &UserCommand::Block(BlockUser {
                user_id,
                reason: "abuse".to_string(),
                occurred_at: now(),
            }),
        )
        .unwrap();
        assert_eq!(user.status(), UserStatus::Blocked);

        // Blocking twice is rejected.
        let err = user
            .handle(&UserCommand::Block(BlockUser {
                user_id,
                reason: "again".to_string(),
                occurred_at: now(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn unblock_returns_to_active() {
        let mut user = active_user();
        let user_id = *user.id();

        execute(
            &mut user,
            &UserCommand::Block(BlockUser {
                user_id,
                reason: "abuse".to_string(),
                occurred_at: now(),
            }),
        )
        .unwrap();
        execute(
            &mut user,
            &UserCommand::Unblock(UnblockUser {
                user_id,
                occurred_at: now(),
            }),
        )
        .unwrap();

        assert_eq!(user.status(), UserStatus::Active);
    }

    #[test]
    fn assign_role_replaces_current_role() {
        let mut user = active_user();
        let user_id = *user.id();
        let admin = UserId::new();

        execute(
            &mut user,
            &UserCommand::AssignRole(AssignRole {
                user_id,
                role: RoleKind::Employee,
                assigned_by: admin,
                actor_role: RoleKind::Admin,
                occurred_at: now(),
            }),
        )
        .unwrap();

        let role = user.role().unwrap();
        assert_eq!(role.kind, RoleKind::Employee);
        assert_eq!(role.assigned_by, Some(admin));
    }

    #[test]
    fn privilege_escalation_blocked() {
        let user = active_user();
        let err = user
            .handle(&UserCommand::AssignRole(AssignRole {
                user_id: *user.id(),
                role: RoleKind::Admin,
                assigned_by: UserId::new(),
                actor_role: RoleKind::Manager,
                occurred_at: now(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized));
    }

    #[test]
    fn escalation_guard_runs_before_duplicate_role_check() {
        let mut user = active_user();
        let user_id = *user.id();
        execute(
            &mut user,
            &UserCommand::AssignRole(AssignRole {
                user_id,
                role: RoleKind::Employee,
                assigned_by: UserId::new(),
                actor_role: RoleKind::Admin,
                occurred_at: now(),
            }),
        )
        .unwrap();

        // A guest asking for the role the target already holds must see
        // Unauthorized, not a hint that the role is already assigned.
        let err = user
            .handle(&UserCommand::AssignRole(AssignRole {
                user_id,
                role: RoleKind::Employee,
                assigned_by: UserId::new(),
                actor_role: RoleKind::Guest,
                occurred_at: now(),
            }))
            .unwrap_err();
        assert_eq!(err, DomainError::Unauthorized);
    }

    #[test]
    fn blocked_user_cannot_receive_roles() {
        let mut user = active_user();
        let user_id = *user.id();

        execute(
            &mut user,
            &UserCommand::Block(BlockUser {
                user_id,
                reason: "abuse".to_string(),
                occurred_at: now(),
            }),
        )
        .unwrap();

        let err = user
            .handle(&UserCommand::AssignRole(AssignRole {
                user_id,
                role: RoleKind::Employee,
                assigned_by: UserId::new(),
                actor_role: RoleKind::Admin,
                occurred_at: now(),
            }))
            .unwrap_err();
        assert!(err.to_string().contains("blocked"));
    }

    #[test]
    fn team_membership_join_and_leave() {
        let mut user = active_user();
        let user_id = *user.id();
        let team_id = TeamId::new();

        execute(
            &mut user,
            &UserCommand::JoinTeam(JoinTeam {
                user_id,
                team_id,
                occurred_at: now(),
            }),
        )
        .unwrap();
        assert_eq!(user.teams().len(), 1);

        // Duplicate join rejected.
        assert!(user
            .handle(&UserCommand::JoinTeam(JoinTeam {
                user_id,
                team_id,
                occurred_at: now(),
            }))
            .is_err());

        execute(
            &mut user,
            &UserCommand::LeaveTeam(LeaveTeam {
                user_id,
                team_id,
                occurred_at: now(),
            }),
        )
        .unwrap();
        assert!(user.teams().is_empty());
    }

    #[test]
    fn leaving_unknown_project_rejected() {
        let user = active_user();
        let err = user
            .handle(&UserCommand::LeaveProject(LeaveProject {
                user_id: *user.id(),
                project_id: ProjectId::new(),
                occurred_at: now(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn commands_against_missing_user_return_not_found() {
        let user = User::empty(UserId::new());
        let err = user
            .handle(&UserCommand::VerifyEmail(VerifyEmail {
                user_id: *user.id(),
                auto_approve: false,
                occurred_at: now(),
            }))
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn replaying_events_is_deterministic() {
        let user_id = UserId::new();
        let mut source = User::empty(user_id);

        let mut log: Vec<UserEvent> = Vec::new();
        log.extend(execute(&mut source, &register_cmd(user_id)).unwrap());
        log.extend(
            execute(
                &mut source,
                &UserCommand::VerifyEmail(VerifyEmail {
                    user_id,
                    auto_approve: true,
                    occurred_at: now(),
                }),
            )
            .unwrap(),
        );

        let mut replayed = User::empty(user_id);
        for event in &log {
            replayed.apply(event);
        }

        assert_eq!(source, replayed);
        assert_eq!(replayed.version(), 2);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn command_for(user_id: UserId, op: u8) -> UserCommand {
            match op % 8 {
                0 => UserCommand::VerifyEmail(VerifyEmail {
                    user_id,
                    auto_approve: op & 0x80 != 0,
                    occurred_at: now(),
                }),
                1 => UserCommand::Approve(ApproveUser {
                    user_id,
                    approved_by: UserId::new(),
                    occurred_at: now(),
                }),
                2 => UserCommand::Deactivate(DeactivateUser {
                    user_id,
                    occurred_at: now(),
                }),
                3 => UserCommand::Reactivate(ReactivateUser {
                    user_id,
                    occurred_at: now(),
                }),
                4 => UserCommand::Block(BlockUser {
                    user_id,
                    reason: "abuse".to_string(),
                    occurred_at: now(),
                }),
                5 => UserCommand::Unblock(UnblockUser {
                    user_id,
                    occurred_at: now(),
                }),
                6 => UserCommand::AssignRole(AssignRole {
                    user_id,
                    role: RoleKind::Employee,
                    assigned_by: UserId::new(),
                    actor_role: RoleKind::Admin,
                    occurred_at: now(),
                }),
                _ => UserCommand::JoinTeam(JoinTeam {
                    user_id,
                    team_id: TeamId::new(),
                    occurred_at: now(),
                }),
            }
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: whatever command sequence was accepted, replaying
            /// the committed event log rebuilds the exact aggregate state.
            #[test]
            fn replay_of_arbitrary_logs_is_deterministic(
                ops in proptest::collection::vec(any::<u8>(), 0..24),
            ) {
                let user_id = UserId::new();
                let mut source = User::empty(user_id);

                let mut log: Vec<UserEvent> = Vec::new();
                log.extend(execute(&mut source, &register_cmd(user_id)).unwrap());
                for op in ops {
                    if let Ok(events) = execute(&mut source, &command_for(user_id, op)) {
                        log.extend(events);
                    }
                }

                let mut replayed = User::empty(user_id);
                for event in &log {
                    replayed.apply(event);
                }

                prop_assert_eq!(&source, &replayed);
                prop_assert_eq!(source.version(), log.len() as u64);
            }
        }
    }
}
