//! Group list filtering. Pure predicate composition over groups and member rows.

use crate::domain::entities::{WorkGroup, WorkGroupMember};

/// Criteria for narrowing a group list. `None`/`false` fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupFilter {
    pub subject: Option<String>,
    pub active_only: bool,
    pub has_space: bool,
    /// "Created by me".
    pub created_by: Option<String>,
    /// "Member of": student holds an active member row.
    pub member_of: Option<String>,
}

impl GroupFilter {
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn active_only(mut self) -> Self {
        self.active_only = true;
        self
    }

    pub fn with_space(mut self) -> Self {
        self.has_space = true;
        self
    }

    pub fn created_by(mut self, student_id: impl Into<String>) -> Self {
        self.created_by = Some(student_id.into());
        self
    }

    pub fn member_of(mut self, student_id: impl Into<String>) -> Self {
        self.member_of = Some(student_id.into());
        self
    }

    pub fn matches(&self, group: &WorkGroup, members: &[WorkGroupMember]) -> bool {
        if let Some(subject) = &self.subject {
            match &group.subject {
                Some(s) if s.eq_ignore_ascii_case(subject) => {}
                _ => return false,
            }
        }
        if self.active_only && !group.is_active {
            return false;
        }
        if self.has_space && !group.has_space() {
            return false;
        }
        if let Some(creator) = &self.created_by {
            if &group.created_by != creator {
                return false;
            }
        }
        if let Some(student) = &self.member_of {
            let is_member = members
                .iter()
                .any(|m| m.group_id == group.id && &m.student_id == student && m.is_active);
            if !is_member {
                return false;
            }
        }
        true
    }
}

/// Groups matching `criteria`, in input order.
pub fn filter_groups<'a>(
    groups: &'a [WorkGroup],
    members: &[WorkGroupMember],
    criteria: &GroupFilter,
) -> Vec<&'a WorkGroup> {
    groups
        .iter()
        .filter(|g| criteria.matches(g, members))
        .collect()
}

/// Eligibility: exact class and grade match, active, spare capacity.
pub fn can_join(student_class: &str, student_grade: u8, group: &WorkGroup) -> bool {
    group.class_name == student_class
        && group.grade == student_grade
        && group.is_active
        && group.has_space()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{CollaborationTools, MemberPermissions, MemberRole};
    use chrono::{TimeZone, Utc};

    fn group(id: &str, subject: Option<&str>, current: u32, max: u32, active: bool) -> WorkGroup {
        WorkGroup {
            id: id.to_string(),
            name: format!("Group {id}"),
            description: "test".to_string(),
            class_name: "10-A".to_string(),
            grade: 10,
            created_by: "student-1".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap(),
            max_members: max,
            current_members: current,
            is_active: active,
            tags: vec![],
            subject: subject.map(str::to_string),
            meeting_schedule: None,
            tools: CollaborationTools::default(),
        }
    }

    fn member(group_id: &str, student_id: &str, active: bool) -> WorkGroupMember {
        WorkGroupMember {
            id: format!("wgm-{group_id}-{student_id}"),
            group_id: group_id.to_string(),
            student_id: student_id.to_string(),
            role: MemberRole::Member,
            joined_at: Utc.with_ymd_and_hms(2024, 9, 2, 8, 0, 0).unwrap(),
            is_active: active,
            permissions: MemberPermissions::member_default(),
        }
    }

    #[test]
    fn test_can_join_requires_matching_scope() {
        let g = group("wg-1", None, 1, 6, true);
        assert!(can_join("10-A", 10, &g));
        assert!(!can_join("10-B", 10, &g));
        assert!(!can_join("10-A", 11, &g));
    }

    #[test]
    fn test_can_join_rejects_full_or_inactive() {
        assert!(!can_join("10-A", 10, &group("wg-1", None, 6, 6, true)));
        assert!(!can_join("10-A", 10, &group("wg-1", None, 1, 6, false)));
    }

    #[test]
    fn test_filter_composes_criteria() {
        let groups = vec![
            group("wg-1", Some("Math"), 2, 6, true),
            group("wg-2", Some("Physics"), 4, 4, true),
            group("wg-3", Some("math"), 1, 5, false),
        ];
        let members = vec![member("wg-2", "student-7", true), member("wg-1", "student-7", false)];

        let math = filter_groups(&groups, &members, &GroupFilter::default().subject("MATH"));
        assert_eq!(math.len(), 2);

        let open_math = filter_groups(
            &groups,
            &members,
            &GroupFilter::default().subject("math").active_only().with_space(),
        );
        assert_eq!(open_math.len(), 1);
        assert_eq!(open_math[0].id, "wg-1");

        let mine = filter_groups(&groups, &members, &GroupFilter::default().member_of("student-7"));
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "wg-2");

        let by_creator = GroupFilter::default().created_by("student-1");
        let created = filter_groups(&groups, &members, &by_creator);
        assert_eq!(created.len(), 3);
    }
}
