//! Seed dataset used when no snapshot exists yet, and by tests.
//!
//! Timestamps are relative to `now` so session windows and invitation expiry stay meaningful.

use crate::domain::{
    AiAgent, AiRestrictions, CollaborationTools, DirectorySnapshot, ExamSession, HomeworkSession,
    InvitationStatus, MeetingSchedule, MemberPermissions, MemberRole, SessionStatus,
    SessionWindow, StudentProfile, WorkGroup, WorkGroupInvitation, WorkGroupMember,
};
use chrono::{DateTime, Duration, Utc, Weekday};

fn student(id: &str, name: &str, class_name: &str, grade: u8) -> StudentProfile {
    StudentProfile {
        id: id.to_string(),
        name: name.to_string(),
        class_name: class_name.to_string(),
        grade,
    }
}

fn member(
    id: &str,
    group_id: &str,
    student_id: &str,
    role: MemberRole,
    joined_at: DateTime<Utc>,
    is_active: bool,
) -> WorkGroupMember {
    let permissions = match role {
        MemberRole::Creator => MemberPermissions::full(),
        MemberRole::Member => MemberPermissions::member_default(),
    };
    WorkGroupMember {
        id: id.to_string(),
        group_id: group_id.to_string(),
        student_id: student_id.to_string(),
        role,
        joined_at,
        is_active,
        permissions,
    }
}

fn window(
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    status: SessionStatus,
) -> SessionWindow {
    SessionWindow {
        starts_at,
        ends_at,
        status,
    }
}

/// Seed dataset. `wg-1` starts with 4 of 6 seats taken and `student-1` as creator.
pub fn seed_snapshot(now: DateTime<Utc>) -> DirectorySnapshot {
    let created = now - Duration::days(30);
    let day = |n: i64| created + Duration::days(n);

    let students = vec![
        student("student-1", "Aigerim Sadykova", "10-A", 10),
        student("student-2", "Daniyar Omarov", "10-A", 10),
        student("student-3", "Madina Akhmetova", "10-A", 10),
        student("student-4", "Timur Bekov", "10-A", 10),
        student("student-5", "Alina Kim", "10-A", 10),
        student("student-6", "Ruslan Nurpeisov", "10-A", 10),
        student("student-7", "Zarina Abenova", "10-B", 10),
        student("student-8", "Erlan Tulegenov", "10-B", 10),
        student("student-9", "Saule Ismailova", "11-A", 11),
    ];

    let groups = vec![
        WorkGroup {
            id: "wg-1".to_string(),
            name: "Algebra Study Circle".to_string(),
            description: "Weekly problem-solving sessions before the algebra unit tests"
                .to_string(),
            class_name: "10-A".to_string(),
            grade: 10,
            created_by: "student-1".to_string(),
            created_at: created,
            max_members: 6,
            current_members: 4,
            is_active: true,
            tags: vec!["algebra".to_string(), "exam-prep".to_string()],
            subject: Some("Math".to_string()),
            meeting_schedule: Some(MeetingSchedule {
                weekday: Weekday::Wed,
                start_time: "16:00".to_string(),
                duration_minutes: 60,
                location: Some("Room 204".to_string()),
            }),
            tools: CollaborationTools {
                chat: true,
                video_calls: true,
                file_sharing: true,
                whiteboard: true,
                task_board: false,
            },
        },
        WorkGroup {
            id: "wg-2".to_string(),
            name: "Physics Lab Crew".to_string(),
            description: "Lab report write-ups and experiment planning".to_string(),
            class_name: "10-A".to_string(),
            grade: 10,
            created_by: "student-5".to_string(),
            created_at: day(2),
            max_members: 4,
            current_members: 4,
            is_active: true,
            tags: vec!["lab".to_string()],
            subject: Some("Physics".to_string()),
            meeting_schedule: None,
            tools: CollaborationTools {
                chat: true,
                file_sharing: true,
                task_board: true,
                ..CollaborationTools::default()
            },
        },
        WorkGroup {
            id: "wg-3".to_string(),
            name: "Book Club 10-B".to_string(),
            description: "Reading and discussing the literature curriculum".to_string(),
            class_name: "10-B".to_string(),
            grade: 10,
            created_by: "student-7".to_string(),
            created_at: day(5),
            max_members: 5,
            current_members: 2,
            is_active: true,
            tags: vec!["reading".to_string()],
            subject: Some("Literature".to_string()),
            meeting_schedule: Some(MeetingSchedule {
                weekday: Weekday::Fri,
                start_time: "15:30".to_string(),
                duration_minutes: 45,
                location: None,
            }),
            tools: CollaborationTools {
                chat: true,
                ..CollaborationTools::default()
            },
        },
        WorkGroup {
            id: "wg-4".to_string(),
            name: "Chemistry Olympiad Prep".to_string(),
            description: "Olympiad practice problems, paused for the term".to_string(),
            class_name: "11-A".to_string(),
            grade: 11,
            created_by: "student-9".to_string(),
            created_at: day(-60),
            max_members: 4,
            current_members: 1,
            is_active: false,
            tags: vec!["olympiad".to_string()],
            subject: Some("Chemistry".to_string()),
            meeting_schedule: None,
            tools: CollaborationTools::default(),
        },
    ];

    let members = vec![
        member("wgm-1", "wg-1", "student-1", MemberRole::Creator, created, true),
        member("wgm-2", "wg-1", "student-2", MemberRole::Member, day(1), true),
        member("wgm-3", "wg-1", "student-3", MemberRole::Member, day(1), true),
        member("wgm-4", "wg-1", "student-4", MemberRole::Member, day(3), true),
        member("wgm-5", "wg-1", "student-6", MemberRole::Member, day(3), false),
        member("wgm-6", "wg-2", "student-5", MemberRole::Creator, day(2), true),
        member("wgm-7", "wg-2", "student-6", MemberRole::Member, day(4), true),
        member("wgm-8", "wg-2", "student-2", MemberRole::Member, day(4), true),
        member("wgm-9", "wg-2", "student-3", MemberRole::Member, day(6), true),
        member("wgm-10", "wg-3", "student-7", MemberRole::Creator, day(5), true),
        member("wgm-11", "wg-3", "student-8", MemberRole::Member, day(5), true),
        member("wgm-12", "wg-4", "student-9", MemberRole::Creator, day(-60), true),
    ];

    let invitations = vec![
        WorkGroupInvitation {
            id: "inv-1".to_string(),
            group_id: "wg-1".to_string(),
            invited_by: "student-2".to_string(),
            invited_student: "student-5".to_string(),
            status: InvitationStatus::Pending,
            created_at: now - Duration::days(1),
            expires_at: now + Duration::days(6),
            message: Some("Join us for the algebra review!".to_string()),
        },
        WorkGroupInvitation {
            id: "inv-2".to_string(),
            group_id: "wg-3".to_string(),
            invited_by: "student-7".to_string(),
            invited_student: "student-6".to_string(),
            status: InvitationStatus::Pending,
            created_at: now - Duration::days(9),
            expires_at: now - Duration::days(2),
            message: None,
        },
        WorkGroupInvitation {
            id: "inv-3".to_string(),
            group_id: "wg-2".to_string(),
            invited_by: "student-5".to_string(),
            invited_student: "student-3".to_string(),
            status: InvitationStatus::Accepted,
            created_at: day(5),
            expires_at: day(12),
            message: None,
        },
    ];

    let agents = vec![
        AiAgent {
            id: "agent-math".to_string(),
            name: "Math Tutor".to_string(),
            subjects: vec!["Math".to_string()],
            grades: vec![9, 10, 11],
            is_active: true,
            max_concurrent_chats: 5,
            active_chats: 1,
        },
        AiAgent {
            id: "agent-science".to_string(),
            name: "Science Helper".to_string(),
            subjects: vec![
                "Physics".to_string(),
                "Chemistry".to_string(),
                "Biology".to_string(),
            ],
            grades: vec![],
            is_active: true,
            max_concurrent_chats: 3,
            active_chats: 3,
        },
        AiAgent {
            id: "agent-writing".to_string(),
            name: "Writing Coach".to_string(),
            subjects: vec!["Literature".to_string(), "English".to_string()],
            grades: vec![10, 11, 12],
            is_active: true,
            max_concurrent_chats: 4,
            active_chats: 0,
        },
        AiAgent {
            id: "agent-general".to_string(),
            name: "Study Buddy".to_string(),
            subjects: vec![],
            grades: vec![],
            is_active: false,
            max_concurrent_chats: 10,
            active_chats: 0,
        },
    ];

    let exam_sessions = vec![
        ExamSession {
            id: "exam-1".to_string(),
            title: "Algebra Unit Test".to_string(),
            subject: "Math".to_string(),
            student_ids: vec!["student-1".to_string(), "student-2".to_string()],
            window: window(
                now - Duration::minutes(30),
                now + Duration::minutes(90),
                SessionStatus::Active,
            ),
            ai_restrictions: AiRestrictions {
                agents_disabled: true,
                allowed_agents: vec![],
            },
        },
        ExamSession {
            id: "exam-2".to_string(),
            title: "Kinematics Quiz".to_string(),
            subject: "Physics".to_string(),
            student_ids: vec!["student-5".to_string(), "student-6".to_string()],
            window: window(
                now - Duration::days(3),
                now - Duration::days(3) + Duration::hours(1),
                SessionStatus::Completed,
            ),
            ai_restrictions: AiRestrictions {
                agents_disabled: true,
                allowed_agents: vec![],
            },
        },
    ];

    let homework_sessions = vec![
        HomeworkSession {
            id: "hw-1".to_string(),
            homework_id: "homework-physics-7".to_string(),
            subject: "Physics".to_string(),
            student_ids: vec!["student-3".to_string()],
            window: window(
                now - Duration::hours(1),
                now + Duration::hours(2),
                SessionStatus::Active,
            ),
            ai_restrictions: AiRestrictions {
                agents_disabled: true,
                allowed_agents: vec!["agent-writing".to_string()],
            },
        },
        HomeworkSession {
            id: "hw-2".to_string(),
            homework_id: "homework-literature-2".to_string(),
            subject: "Literature".to_string(),
            student_ids: vec!["student-7".to_string()],
            window: window(
                now - Duration::hours(1),
                now + Duration::hours(1),
                SessionStatus::Active,
            ),
            ai_restrictions: AiRestrictions::default(),
        },
    ];

    DirectorySnapshot {
        students,
        groups,
        members,
        invitations,
        agents,
        conversations: Vec::new(),
        exam_sessions,
        homework_sessions,
    }
}
