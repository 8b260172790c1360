//! Domain entities. Pure data structures for the work-group directory.
//!
//! No IO types here. Records keep the camelCase field names of the fixture dataset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A student as seen by the directory (identity + class/grade scope).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub id: String,
    pub name: String,
    pub class_name: String,
    pub grade: u8,
}

/// Tools enabled for a group's collaboration space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationTools {
    pub chat: bool,
    pub video_calls: bool,
    pub file_sharing: bool,
    pub whiteboard: bool,
    pub task_board: bool,
}

/// Recurring meeting slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingSchedule {
    pub weekday: chrono::Weekday,
    /// Local start time, `HH:MM`.
    pub start_time: String,
    pub duration_minutes: u32,
    #[serde(default)]
    pub location: Option<String>,
}

/// A student work group scoped to one class and grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkGroup {
    pub id: String,
    pub name: String,
    pub description: String,
    pub class_name: String,
    pub grade: u8,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub max_members: u32,
    /// Denormalized count of active member rows. Only the directory mutates it.
    pub current_members: u32,
    pub is_active: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub meeting_schedule: Option<MeetingSchedule>,
    #[serde(default)]
    pub tools: CollaborationTools,
}

impl WorkGroup {
    pub fn has_space(&self) -> bool {
        self.current_members < self.max_members
    }

    pub fn open_seats(&self) -> u32 {
        self.max_members.saturating_sub(self.current_members)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Creator,
    Member,
}

/// What a member may do inside the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberPermissions {
    pub can_invite: bool,
    pub can_manage_tasks: bool,
    pub can_share_documents: bool,
    pub can_record: bool,
    pub can_moderate: bool,
}

impl MemberPermissions {
    /// Creator permissions: everything.
    pub fn full() -> Self {
        Self {
            can_invite: true,
            can_manage_tasks: true,
            can_share_documents: true,
            can_record: true,
            can_moderate: true,
        }
    }

    /// Permissions granted to a regular member on join.
    pub fn member_default() -> Self {
        Self {
            can_invite: true,
            ..Self::default()
        }
    }
}

/// Links a student to a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkGroupMember {
    pub id: String,
    pub group_id: String,
    pub student_id: String,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
    pub is_active: bool,
    pub permissions: MemberPermissions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkGroupInvitation {
    pub id: String,
    pub group_id: String,
    pub invited_by: String,
    pub invited_student: String,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub message: Option<String>,
}

impl WorkGroupInvitation {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Pending and not yet past expiry.
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.status == InvitationStatus::Pending && !self.is_expired_at(now)
    }
}

/// Input for group creation. Optional fields fall back to directory defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkGroup {
    pub name: String,
    pub description: String,
    pub class_name: String,
    pub grade: u8,
    #[serde(default)]
    pub max_members: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub meeting_schedule: Option<MeetingSchedule>,
    #[serde(default)]
    pub tools: Option<CollaborationTools>,
}

/// Aggregate counters shown on dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirectoryStats {
    pub total_groups: usize,
    pub active_groups: usize,
    pub full_groups: usize,
    pub active_memberships: usize,
    pub open_seats: u32,
    pub pending_invitations: usize,
}
