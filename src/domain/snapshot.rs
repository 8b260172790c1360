//! Full dataset the directory and assistant operate on. Serialized as one JSON document.

use crate::domain::assistant::{AiAgent, AiConversation, ExamSession, HomeworkSession};
use crate::domain::entities::{StudentProfile, WorkGroup, WorkGroupInvitation, WorkGroupMember};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorySnapshot {
    #[serde(default)]
    pub students: Vec<StudentProfile>,
    #[serde(default)]
    pub groups: Vec<WorkGroup>,
    #[serde(default)]
    pub members: Vec<WorkGroupMember>,
    #[serde(default)]
    pub invitations: Vec<WorkGroupInvitation>,
    #[serde(default)]
    pub agents: Vec<AiAgent>,
    #[serde(default)]
    pub conversations: Vec<AiConversation>,
    #[serde(default)]
    pub exam_sessions: Vec<ExamSession>,
    #[serde(default)]
    pub homework_sessions: Vec<HomeworkSession>,
}

impl DirectorySnapshot {
    pub fn student(&self, id: &str) -> Option<&StudentProfile> {
        self.students.iter().find(|s| s.id == id)
    }

    pub fn agent(&self, id: &str) -> Option<&AiAgent> {
        self.agents.iter().find(|a| a.id == id)
    }
}
