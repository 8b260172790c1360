//! AI-assistant records: agents, conversations, and the exam/homework sessions that gate them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A study assistant a student can chat with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAgent {
    pub id: String,
    pub name: String,
    /// Subjects this agent covers. Empty = all subjects.
    #[serde(default)]
    pub subjects: Vec<String>,
    /// Grades this agent may serve. Empty = all grades.
    #[serde(default)]
    pub grades: Vec<u8>,
    pub is_active: bool,
    pub max_concurrent_chats: u32,
    #[serde(default)]
    pub active_chats: u32,
}

impl AiAgent {
    pub fn serves_subject(&self, subject: Option<&str>) -> bool {
        match subject {
            None => true,
            Some(s) => {
                self.subjects.is_empty() || self.subjects.iter().any(|x| x.eq_ignore_ascii_case(s))
            }
        }
    }

    pub fn serves_grade(&self, grade: u8) -> bool {
        self.grades.is_empty() || self.grades.contains(&grade)
    }

    pub fn at_capacity(&self) -> bool {
        self.active_chats >= self.max_concurrent_chats
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Available,
    Busy,
    Restricted,
    Offline,
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Available => "available",
            Self::Busy => "busy",
            Self::Restricted => "restricted",
            Self::Offline => "offline",
        };
        f.write_str(s)
    }
}

/// Assistant limits attached to an exam or homework session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiRestrictions {
    pub agents_disabled: bool,
    /// Agents still reachable while `agents_disabled` is set.
    #[serde(default)]
    pub allowed_agents: Vec<String>,
}

impl AiRestrictions {
    pub fn blocks(&self, agent_id: &str) -> bool {
        self.agents_disabled && !self.allowed_agents.iter().any(|a| a == agent_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Scheduled,
    Active,
    Completed,
}

/// Window shared by exam and homework sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionWindow {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: SessionStatus,
}

impl SessionWindow {
    /// Marked active and `now` within `[starts_at, ends_at)`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status == SessionStatus::Active && self.starts_at <= now && now < self.ends_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamSession {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub student_ids: Vec<String>,
    #[serde(flatten)]
    pub window: SessionWindow,
    #[serde(default)]
    pub ai_restrictions: AiRestrictions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkSession {
    pub id: String,
    pub homework_id: String,
    pub subject: String,
    pub student_ids: Vec<String>,
    #[serde(flatten)]
    pub window: SessionWindow,
    #[serde(default)]
    pub ai_restrictions: AiRestrictions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    Student,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

/// One student's thread with one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiConversation {
    pub id: String,
    pub agent_id: String,
    pub student_id: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AiConversation {
    pub fn new(
        id: impl Into<String>,
        agent_id: impl Into<String>,
        student_id: impl Into<String>,
        subject: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            agent_id: agent_id.into(),
            student_id: student_id.into(),
            subject,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn push(&mut self, role: ChatRole, content: impl Into<String>, now: DateTime<Utc>) {
        self.messages.push(ChatMessage {
            role,
            content: content.into(),
            sent_at: now,
        });
        self.updated_at = now;
    }
}
