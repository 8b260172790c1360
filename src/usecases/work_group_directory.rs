//! Work-group directory: groups, member rows and invitations behind one owner.
//!
//! - Every mutation of `current_members` happens here, so it always equals the
//!   number of active member rows of the group
//! - Membership per student per group is one-way: none -> active -> inactive
//! - The creator row is created with the group and can never become inactive
//! - `try_*` operations report why they refused; the plain forms keep the boolean contract

use crate::domain::{
    CollaborationTools, DirectorySnapshot, DirectoryStats, GroupFilter, InvitationStatus,
    MemberPermissions, MemberRole, MembershipError, NewWorkGroup, StudentProfile, WorkGroup,
    WorkGroupInvitation, WorkGroupMember, can_join, filter_groups,
};
use crate::ports::Clock;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Defaults applied when creating groups and invitations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryPolicy {
    pub default_max_members: u32,
    pub invitation_ttl: Duration,
    pub tools: CollaborationTools,
}

impl Default for DirectoryPolicy {
    fn default() -> Self {
        Self {
            default_max_members: 6,
            invitation_ttl: Duration::hours(168),
            tools: CollaborationTools {
                chat: true,
                file_sharing: true,
                ..CollaborationTools::default()
            },
        }
    }
}

#[derive(Clone)]
pub struct WorkGroupDirectory {
    groups: Vec<WorkGroup>,
    members: Vec<WorkGroupMember>,
    invitations: Vec<WorkGroupInvitation>,
    policy: DirectoryPolicy,
    clock: Arc<dyn Clock>,
    seq: u64,
}

impl WorkGroupDirectory {
    pub fn new(policy: DirectoryPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            groups: Vec::new(),
            members: Vec::new(),
            invitations: Vec::new(),
            policy,
            clock,
            seq: 0,
        }
    }

    /// Build from a stored snapshot, repairing stored data that breaks the
    /// membership rules (each repair is logged):
    ///
    /// - exactly one active creator row per group, owned by `created_by`
    /// - `current_members` equals the active row count
    /// - `max_members` is at least `current_members`
    pub fn from_snapshot(
        snapshot: &DirectorySnapshot,
        policy: DirectoryPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut dir = Self::new(policy, clock);
        dir.groups = snapshot.groups.clone();
        dir.members = snapshot.members.clone();
        dir.invitations = snapshot.invitations.clone();
        dir.seq = dir.highest_id_suffix();

        dir.repair_creator_rows();
        for group_id in dir.member_count_mismatches() {
            let active = dir.active_member_count(&group_id);
            if let Some(g) = dir.groups.iter_mut().find(|g| g.id == group_id) {
                warn!(
                    group_id = %g.id,
                    stored = g.current_members,
                    active,
                    "member counter out of sync, recomputed"
                );
                g.current_members = active;
            }
        }
        for g in dir.groups.iter_mut().filter(|g| g.current_members > g.max_members) {
            warn!(
                group_id = %g.id,
                max_members = g.max_members,
                active = g.current_members,
                "group over capacity, max raised to member count"
            );
            g.max_members = g.current_members;
        }
        dir
    }

    /// Demote stray creator rows and make sure `created_by` holds an active creator row.
    fn repair_creator_rows(&mut self) {
        let owners: Vec<(String, String, DateTime<Utc>)> = self
            .groups
            .iter()
            .map(|g| (g.id.clone(), g.created_by.clone(), g.created_at))
            .collect();
        for (group_id, owner, created_at) in owners {
            for m in self.members.iter_mut().filter(|m| {
                m.group_id == group_id && m.role == MemberRole::Creator && m.student_id != owner
            }) {
                warn!(
                    group_id = %group_id,
                    student_id = %m.student_id,
                    "stray creator row demoted"
                );
                m.role = MemberRole::Member;
                m.permissions = MemberPermissions::member_default();
            }

            let row = self
                .members
                .iter()
                .position(|m| m.group_id == group_id && m.student_id == owner);
            match row {
                Some(i) => {
                    let m = &mut self.members[i];
                    if m.role != MemberRole::Creator || !m.is_active {
                        warn!(group_id = %group_id, student_id = %owner, "creator row restored");
                    }
                    m.role = MemberRole::Creator;
                    m.is_active = true;
                    m.permissions = MemberPermissions::full();
                }
                None => {
                    warn!(group_id = %group_id, student_id = %owner, "missing creator row added");
                    let id = self.next_id("wgm");
                    self.members.push(WorkGroupMember {
                        id,
                        group_id,
                        student_id: owner,
                        role: MemberRole::Creator,
                        joined_at: created_at,
                        is_active: true,
                        permissions: MemberPermissions::full(),
                    });
                }
            }
        }
    }

    /// Largest numeric `-n` suffix among stored ids; new ids count up from it.
    fn highest_id_suffix(&self) -> u64 {
        self.groups
            .iter()
            .map(|g| g.id.as_str())
            .chain(self.members.iter().map(|m| m.id.as_str()))
            .chain(self.invitations.iter().map(|i| i.id.as_str()))
            .filter_map(|id| id.rsplit('-').next()?.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
    }

    /// Write groups, members and invitations into `snapshot`, leaving other records untouched.
    pub fn export_into(&self, snapshot: &mut DirectorySnapshot) {
        snapshot.groups = self.groups.clone();
        snapshot.members = self.members.clone();
        snapshot.invitations = self.invitations.clone();
    }

    pub fn policy(&self) -> &DirectoryPolicy {
        &self.policy
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn groups(&self) -> &[WorkGroup] {
        &self.groups
    }

    pub fn members(&self) -> &[WorkGroupMember] {
        &self.members
    }

    pub fn invitations(&self) -> &[WorkGroupInvitation] {
        &self.invitations
    }

    pub fn group(&self, group_id: &str) -> Option<&WorkGroup> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    pub fn invitation(&self, invitation_id: &str) -> Option<&WorkGroupInvitation> {
        self.invitations.iter().find(|i| i.id == invitation_id)
    }

    /// The student's row in the group, active or not.
    pub fn membership(&self, group_id: &str, student_id: &str) -> Option<&WorkGroupMember> {
        self.members
            .iter()
            .find(|m| m.group_id == group_id && m.student_id == student_id)
    }

    pub fn active_members(&self, group_id: &str) -> Vec<&WorkGroupMember> {
        self.members
            .iter()
            .filter(|m| m.group_id == group_id && m.is_active)
            .collect()
    }

    /// Groups where the student holds an active row.
    pub fn groups_for_student(&self, student_id: &str) -> Vec<&WorkGroup> {
        self.filter(&GroupFilter::default().member_of(student_id))
    }

    pub fn filter(&self, criteria: &GroupFilter) -> Vec<&WorkGroup> {
        filter_groups(&self.groups, &self.members, criteria)
    }

    /// Eligibility of `student` for `group_id`. Unknown group -> false.
    pub fn can_join(&self, student: &StudentProfile, group_id: &str) -> bool {
        self.group(group_id)
            .is_some_and(|g| can_join(&student.class_name, student.grade, g))
    }

    /// Pending, unexpired invitations addressed to the student.
    pub fn pending_invitations_for(&self, student_id: &str) -> Vec<&WorkGroupInvitation> {
        let now = self.clock.now();
        self.invitations
            .iter()
            .filter(|i| i.invited_student == student_id && i.is_open_at(now))
            .collect()
    }

    pub fn invitations_for_group(&self, group_id: &str) -> Vec<&WorkGroupInvitation> {
        self.invitations
            .iter()
            .filter(|i| i.group_id == group_id)
            .collect()
    }

    pub fn stats(&self) -> DirectoryStats {
        let now = self.clock.now();
        DirectoryStats {
            total_groups: self.groups.len(),
            active_groups: self.groups.iter().filter(|g| g.is_active).count(),
            full_groups: self.groups.iter().filter(|g| !g.has_space()).count(),
            active_memberships: self.members.iter().filter(|m| m.is_active).count(),
            open_seats: self
                .groups
                .iter()
                .filter(|g| g.is_active)
                .map(WorkGroup::open_seats)
                .sum(),
            pending_invitations: self.invitations.iter().filter(|i| i.is_open_at(now)).count(),
        }
    }

    /// Ids of groups whose `current_members` differs from their active row count.
    pub fn member_count_mismatches(&self) -> Vec<String> {
        self.groups
            .iter()
            .filter(|g| g.current_members != self.active_member_count(&g.id))
            .map(|g| g.id.clone())
            .collect()
    }

    fn active_member_count(&self, group_id: &str) -> u32 {
        self.members
            .iter()
            .filter(|m| m.group_id == group_id && m.is_active)
            .count() as u32
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Group lifecycle & membership
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a group and its creator row together. Only name and description are required.
    pub fn try_create_group(
        &mut self,
        data: NewWorkGroup,
        creator_id: &str,
    ) -> Result<WorkGroup, MembershipError> {
        if data.name.trim().is_empty() {
            return Err(MembershipError::Invalid("name is required".into()));
        }
        if data.description.trim().is_empty() {
            return Err(MembershipError::Invalid("description is required".into()));
        }
        if creator_id.trim().is_empty() {
            return Err(MembershipError::Invalid("creator id is required".into()));
        }
        let max_members = data.max_members.unwrap_or(self.policy.default_max_members);
        if max_members == 0 {
            return Err(MembershipError::Invalid("max members must be at least 1".into()));
        }

        let now = self.clock.now();
        let group = WorkGroup {
            id: self.next_id("wg"),
            name: data.name.trim().to_string(),
            description: data.description.trim().to_string(),
            class_name: data.class_name,
            grade: data.grade,
            created_by: creator_id.to_string(),
            created_at: now,
            max_members,
            current_members: 1,
            is_active: true,
            tags: data.tags,
            subject: data.subject,
            meeting_schedule: data.meeting_schedule,
            tools: data.tools.unwrap_or(self.policy.tools),
        };
        let creator = WorkGroupMember {
            id: self.next_id("wgm"),
            group_id: group.id.clone(),
            student_id: creator_id.to_string(),
            role: MemberRole::Creator,
            joined_at: now,
            is_active: true,
            permissions: MemberPermissions::full(),
        };

        self.groups.push(group.clone());
        self.members.push(creator);
        info!(group_id = %group.id, creator_id, max_members, "work group created");
        Ok(group)
    }

    pub fn create_group(&mut self, data: NewWorkGroup, creator_id: &str) -> Option<WorkGroup> {
        self.try_create_group(data, creator_id).ok()
    }

    /// Add the student as a regular member. Refused when the group is missing,
    /// inactive, full, or the student already has a row (active or not).
    /// Open invitations of the student to this group count as accepted.
    pub fn try_join_group(
        &mut self,
        group_id: &str,
        student_id: &str,
    ) -> Result<WorkGroupMember, MembershipError> {
        let idx = self.group_index(group_id)?;
        {
            let group = &self.groups[idx];
            if !group.is_active {
                return Err(MembershipError::Inactive(group_id.to_string()));
            }
            if !group.has_space() {
                return Err(MembershipError::Full(group_id.to_string()));
            }
        }
        if self.membership(group_id, student_id).is_some() {
            return Err(MembershipError::AlreadyMember {
                group: group_id.to_string(),
                student: student_id.to_string(),
            });
        }

        let member = WorkGroupMember {
            id: self.next_id("wgm"),
            group_id: group_id.to_string(),
            student_id: student_id.to_string(),
            role: MemberRole::Member,
            joined_at: self.clock.now(),
            is_active: true,
            permissions: MemberPermissions::member_default(),
        };
        self.members.push(member.clone());
        let now = member.joined_at;
        for inv in self.invitations.iter_mut().filter(|i| {
            i.group_id == group_id && i.invited_student == student_id && i.is_open_at(now)
        }) {
            inv.status = InvitationStatus::Accepted;
        }
        let group = &mut self.groups[idx];
        group.current_members += 1;
        debug!(
            group_id,
            student_id,
            current_members = group.current_members,
            "student joined group"
        );
        Ok(member)
    }

    pub fn join_group(&mut self, group_id: &str, student_id: &str) -> bool {
        self.try_join_group(group_id, student_id).is_ok()
    }

    /// Deactivate a non-creator member's row.
    pub fn try_leave_group(
        &mut self,
        group_id: &str,
        student_id: &str,
    ) -> Result<(), MembershipError> {
        let idx = self.group_index(group_id)?;
        let member_idx = self
            .members
            .iter()
            .position(|m| m.group_id == group_id && m.student_id == student_id && m.is_active)
            .ok_or_else(|| MembershipError::NotMember {
                group: group_id.to_string(),
                student: student_id.to_string(),
            })?;
        if self.groups[idx].created_by == student_id
            || self.members[member_idx].role == MemberRole::Creator
        {
            return Err(MembershipError::NotPermitted(
                "the group creator cannot leave".into(),
            ));
        }

        self.members[member_idx].is_active = false;
        let group = &mut self.groups[idx];
        group.current_members = group.current_members.saturating_sub(1);
        debug!(
            group_id,
            student_id,
            current_members = group.current_members,
            "student left group"
        );
        Ok(())
    }

    pub fn leave_group(&mut self, group_id: &str, student_id: &str) -> bool {
        self.try_leave_group(group_id, student_id).is_ok()
    }

    /// Change a member's permissions. The actor must be the creator or hold
    /// `can_moderate`; the creator's own permissions never change.
    pub fn update_permissions(
        &mut self,
        group_id: &str,
        actor_id: &str,
        target_id: &str,
        permissions: MemberPermissions,
    ) -> Result<(), MembershipError> {
        self.group_index(group_id)?;
        let actor = self
            .active_row(group_id, actor_id)
            .ok_or_else(|| MembershipError::NotMember {
                group: group_id.to_string(),
                student: actor_id.to_string(),
            })?;
        if actor.role != MemberRole::Creator && !actor.permissions.can_moderate {
            return Err(MembershipError::NotPermitted(format!(
                "{actor_id} may not moderate {group_id}"
            )));
        }

        let target_idx = self
            .members
            .iter()
            .position(|m| m.group_id == group_id && m.student_id == target_id && m.is_active)
            .ok_or_else(|| MembershipError::NotMember {
                group: group_id.to_string(),
                student: target_id.to_string(),
            })?;
        if self.members[target_idx].role == MemberRole::Creator {
            return Err(MembershipError::NotPermitted(
                "creator permissions are fixed".into(),
            ));
        }
        self.members[target_idx].permissions = permissions;
        info!(group_id, actor_id, target_id, "member permissions updated");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Invitations
    // ─────────────────────────────────────────────────────────────────────────

    /// Invite a student. The inviter needs an active row with `can_invite`.
    pub fn invite(
        &mut self,
        group_id: &str,
        inviter_id: &str,
        invitee_id: &str,
        message: Option<String>,
    ) -> Result<WorkGroupInvitation, MembershipError> {
        let idx = self.group_index(group_id)?;
        if !self.groups[idx].is_active {
            return Err(MembershipError::Inactive(group_id.to_string()));
        }
        if !self.groups[idx].has_space() {
            return Err(MembershipError::Full(group_id.to_string()));
        }
        let can_invite = self
            .active_row(group_id, inviter_id)
            .is_some_and(|m| m.permissions.can_invite);
        if !can_invite {
            return Err(MembershipError::NotPermitted(format!(
                "{inviter_id} may not invite to {group_id}"
            )));
        }
        if inviter_id == invitee_id {
            return Err(MembershipError::Invalid("cannot invite yourself".into()));
        }
        if self.membership(group_id, invitee_id).is_some() {
            return Err(MembershipError::AlreadyMember {
                group: group_id.to_string(),
                student: invitee_id.to_string(),
            });
        }
        let now = self.clock.now();
        let already_pending = self
            .invitations
            .iter()
            .any(|i| {
                i.group_id == group_id && i.invited_student == invitee_id && i.is_open_at(now)
            });
        if already_pending {
            return Err(MembershipError::Invalid(format!(
                "{invitee_id} already has a pending invitation to {group_id}"
            )));
        }

        let invitation = WorkGroupInvitation {
            id: self.next_id("inv"),
            group_id: group_id.to_string(),
            invited_by: inviter_id.to_string(),
            invited_student: invitee_id.to_string(),
            status: InvitationStatus::Pending,
            created_at: now,
            expires_at: now + self.policy.invitation_ttl,
            message,
        };
        self.invitations.push(invitation.clone());
        info!(
            invitation_id = %invitation.id,
            group_id,
            inviter_id,
            invitee_id,
            expires_at = %invitation.expires_at,
            "invitation sent"
        );
        Ok(invitation)
    }

    /// Accept as the invitee. Past expiry the invitation becomes `Expired` instead;
    /// when the join itself is refused (e.g. group full) it stays pending.
    pub fn accept_invitation(
        &mut self,
        invitation_id: &str,
        student_id: &str,
    ) -> Result<WorkGroupMember, MembershipError> {
        let idx = self.open_invitation_index(invitation_id, student_id)?;
        let group_id = self.invitations[idx].group_id.clone();
        let member = self.try_join_group(&group_id, student_id)?;
        self.invitations[idx].status = InvitationStatus::Accepted;
        info!(invitation_id, group_id = %group_id, student_id, "invitation accepted");
        Ok(member)
    }

    pub fn decline_invitation(
        &mut self,
        invitation_id: &str,
        student_id: &str,
    ) -> Result<(), MembershipError> {
        let idx = self.open_invitation_index(invitation_id, student_id)?;
        self.invitations[idx].status = InvitationStatus::Declined;
        info!(invitation_id, student_id, "invitation declined");
        Ok(())
    }

    /// Mark every pending invitation past its expiry as `Expired`. Returns how many changed.
    pub fn expire_invitations(&mut self) -> usize {
        let now = self.clock.now();
        let mut expired = 0;
        for inv in self
            .invitations
            .iter_mut()
            .filter(|i| i.status == InvitationStatus::Pending && i.is_expired_at(now))
        {
            inv.status = InvitationStatus::Expired;
            expired += 1;
        }
        if expired > 0 {
            info!(expired, "expired stale invitations");
        }
        expired
    }

    /// Index of a pending invitation addressed to `student_id`. Flips it to
    /// `Expired` (and fails) when it is past expiry.
    fn open_invitation_index(
        &mut self,
        invitation_id: &str,
        student_id: &str,
    ) -> Result<usize, MembershipError> {
        let idx = self
            .invitations
            .iter()
            .position(|i| i.id == invitation_id)
            .ok_or_else(|| MembershipError::NotFound(invitation_id.to_string()))?;
        let now = self.clock.now();
        let inv = &mut self.invitations[idx];
        if inv.invited_student != student_id {
            return Err(MembershipError::NotPermitted(format!(
                "invitation {invitation_id} is addressed to someone else"
            )));
        }
        if inv.status != InvitationStatus::Pending {
            return Err(MembershipError::NotPending(invitation_id.to_string()));
        }
        if inv.is_expired_at(now) {
            inv.status = InvitationStatus::Expired;
            return Err(MembershipError::Expired(invitation_id.to_string()));
        }
        Ok(idx)
    }

    fn group_index(&self, group_id: &str) -> Result<usize, MembershipError> {
        self.groups
            .iter()
            .position(|g| g.id == group_id)
            .ok_or_else(|| MembershipError::NotFound(group_id.to_string()))
    }

    fn active_row(&self, group_id: &str, student_id: &str) -> Option<&WorkGroupMember> {
        self.members
            .iter()
            .find(|m| m.group_id == group_id && m.student_id == student_id && m.is_active)
    }

    /// Next `{prefix}-{n}` id. One counter is shared by all record kinds.
    fn next_id(&mut self, prefix: &str) -> String {
        self.seq += 1;
        format!("{}-{}", prefix, self.seq)
    }
}
