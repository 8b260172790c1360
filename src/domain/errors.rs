//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use crate::domain::assistant::AgentStatus;
use thiserror::Error;

/// Why a directory mutation was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MembershipError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("group {0} is not active")]
    Inactive(String),

    #[error("group {0} is full")]
    Full(String),

    #[error("student {student} already has a membership in {group}")]
    AlreadyMember { group: String, student: String },

    #[error("student {student} is not an active member of {group}")]
    NotMember { group: String, student: String },

    #[error("not permitted: {0}")]
    NotPermitted(String),

    #[error("invitation {0} has expired")]
    Expired(String),

    #[error("invitation {0} is no longer pending")]
    NotPending(String),

    #[error("invalid input: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error(transparent)]
    Membership(#[from] MembershipError),

    #[error("Snapshot store error: {0}")]
    Store(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("UI error: {0}")]
    Ui(String),

    #[error("Assistant error: {0}")]
    Assistant(String),

    /// Gate refused the chat; carries the computed status.
    #[error("Assistant {agent_id} is {status}")]
    AssistantUnavailable {
        agent_id: String,
        status: AgentStatus,
        message: Option<String>,
    },
}
