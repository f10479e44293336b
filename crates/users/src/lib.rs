//! Users domain module (event-sourced).
//!
//! User identity and lifecycle: registration, email verification, approval,
//! blocking, role assignment and team/project membership. Deterministic domain
//! logic only (no IO, no HTTP, no storage).

pub mod identity;
pub mod user;

pub use identity::{Email, Username};
pub use user::{
    ApproveUser, AssignRole, BlockUser, DeactivateUser, EmailVerified, JoinProject, JoinTeam,
    LeaveProject, LeaveTeam, ProjectJoined, ProjectLeft, ProjectMembership, ReactivateUser,
    RegisterUser, RoleAssigned, TeamJoined, TeamLeft, TeamMembership, UnblockUser, User,
    UserApproved, UserBlocked, UserCommand, UserDeactivated, UserEvent, UserReactivated,
    UserRegistered, UserStatus, UserUnblocked, VerifyEmail,
};
