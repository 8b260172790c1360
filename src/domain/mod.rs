//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod assistant;
pub mod entities;
pub mod errors;
pub mod filter;
pub mod snapshot;

pub use assistant::{
    AgentStatus, AiAgent, AiConversation, AiRestrictions, ChatMessage, ChatRole, ExamSession,
    HomeworkSession, SessionStatus, SessionWindow,
};
pub use entities::{
    CollaborationTools, DirectoryStats, InvitationStatus, MeetingSchedule, MemberPermissions,
    MemberRole, NewWorkGroup, StudentProfile, WorkGroup, WorkGroupInvitation, WorkGroupMember,
};
pub use errors::{DomainError, MembershipError};
pub use filter::{GroupFilter, can_join, filter_groups};
pub use snapshot::DirectorySnapshot;
