//! Assistant availability gate. Pure functions over agents and exam/homework sessions.

use crate::domain::{AgentStatus, AiAgent, ExamSession, HomeworkSession, StudentProfile};
use chrono::{DateTime, Utc};

/// Shown whenever an exam or homework session is running.
pub const RESTRICTION_MESSAGE: &str =
    "AI assistants are restricted during active exams and homework sessions. \
     Please complete your current assessment first.";

/// What the student is asking about. `subject` narrows which agents apply.
#[derive(Debug, Clone, Copy)]
pub struct AssistantRequest<'a> {
    pub student: &'a StudentProfile,
    pub subject: Option<&'a str>,
    pub now: DateTime<Utc>,
}

/// Status of `agent` for this request.
///
/// Order of checks: offline (agent inactive), restricted (session blocks it,
/// or subject/grade out of scope), busy (at chat capacity), available.
pub fn agent_status(
    agent: &AiAgent,
    request: &AssistantRequest<'_>,
    exams: &[ExamSession],
    homeworks: &[HomeworkSession],
) -> AgentStatus {
    if !agent.is_active {
        return AgentStatus::Offline;
    }
    let student_id = request.student.id.as_str();
    let exam_blocks = exams.iter().any(|e| {
        e.window.is_active_at(request.now)
            && e.student_ids.iter().any(|s| s == student_id)
            && e.ai_restrictions.blocks(&agent.id)
    });
    let homework_blocks = homeworks.iter().any(|h| {
        h.window.is_active_at(request.now)
            && h.student_ids.iter().any(|s| s == student_id)
            && h.ai_restrictions.blocks(&agent.id)
    });
    if exam_blocks || homework_blocks {
        return AgentStatus::Restricted;
    }
    if !agent.serves_grade(request.student.grade) || !agent.serves_subject(request.subject) {
        return AgentStatus::Restricted;
    }
    if agent.at_capacity() {
        return AgentStatus::Busy;
    }
    AgentStatus::Available
}

/// Fixed notice when any exam or homework session in the lists is active.
pub fn restriction_message(
    exams: &[ExamSession],
    homeworks: &[HomeworkSession],
    now: DateTime<Utc>,
) -> Option<&'static str> {
    let any_active = exams.iter().any(|e| e.window.is_active_at(now))
        || homeworks.iter().any(|h| h.window.is_active_at(now));
    any_active.then_some(RESTRICTION_MESSAGE)
}

/// Sessions that involve `student_id`, for callers narrowing the lists first.
pub fn sessions_for_student(
    student_id: &str,
    exams: &[ExamSession],
    homeworks: &[HomeworkSession],
) -> (Vec<ExamSession>, Vec<HomeworkSession>) {
    let exams = exams
        .iter()
        .filter(|e| e.student_ids.iter().any(|s| s == student_id))
        .cloned()
        .collect();
    let homeworks = homeworks
        .iter()
        .filter(|h| h.student_ids.iter().any(|s| s == student_id))
        .cloned()
        .collect();
    (exams, homeworks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::fixtures::seed_snapshot;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 1, 9, 0, 0).unwrap()
    }

    fn status_for(
        student: &str,
        agent: &str,
        subject: Option<&str>,
        now: DateTime<Utc>,
    ) -> AgentStatus {
        let snap = seed_snapshot(t0());
        let request = AssistantRequest {
            student: snap.student(student).unwrap(),
            subject,
            now,
        };
        agent_status(
            snap.agent(agent).unwrap(),
            &request,
            &snap.exam_sessions,
            &snap.homework_sessions,
        )
    }

    #[test]
    fn test_inactive_agent_is_offline() {
        assert_eq!(status_for("student-4", "agent-general", None, t0()), AgentStatus::Offline);
    }

    #[test]
    fn test_active_exam_restricts() {
        // student-1 sits exam-1 until t0 + 90m
        assert_eq!(
            status_for("student-1", "agent-math", Some("Math"), t0()),
            AgentStatus::Restricted
        );
        assert_eq!(
            status_for("student-4", "agent-math", Some("Math"), t0()),
            AgentStatus::Available
        );
        let after = t0() + Duration::minutes(91);
        assert_eq!(
            status_for("student-1", "agent-math", Some("Math"), after),
            AgentStatus::Available
        );
    }

    #[test]
    fn test_homework_allow_list() {
        assert_eq!(status_for("student-3", "agent-math", None, t0()), AgentStatus::Restricted);
        assert_eq!(status_for("student-3", "agent-writing", None, t0()), AgentStatus::Available);
    }

    #[test]
    fn test_homework_without_restriction_does_not_block() {
        assert_eq!(status_for("student-7", "agent-writing", None, t0()), AgentStatus::Available);
    }

    #[test]
    fn test_subject_and_grade_scope() {
        assert_eq!(
            status_for("student-4", "agent-math", Some("Literature"), t0()),
            AgentStatus::Restricted
        );
        assert_eq!(
            status_for("student-9", "agent-writing", Some("english"), t0()),
            AgentStatus::Available
        );
        let mut snap = seed_snapshot(t0());
        snap.students[3].grade = 8;
        let request = AssistantRequest {
            student: &snap.students[3],
            subject: None,
            now: t0(),
        };
        assert_eq!(
            agent_status(snap.agent("agent-math").unwrap(), &request, &[], &[]),
            AgentStatus::Restricted
        );
    }

    #[test]
    fn test_full_agent_is_busy() {
        assert_eq!(
            status_for("student-4", "agent-science", Some("Physics"), t0()),
            AgentStatus::Busy
        );
    }

    #[test]
    fn test_restriction_message() {
        let snap = seed_snapshot(t0());
        assert_eq!(
            restriction_message(&snap.exam_sessions, &snap.homework_sessions, t0()),
            Some(RESTRICTION_MESSAGE)
        );
        assert_eq!(restriction_message(&snap.exam_sessions, &[], t0()), Some(RESTRICTION_MESSAGE));
        assert_eq!(restriction_message(&[], &[], t0()), None);
        let later = t0() + Duration::days(1);
        assert_eq!(restriction_message(&snap.exam_sessions, &snap.homework_sessions, later), None);
    }

    #[test]
    fn test_sessions_for_student() {
        let snap = seed_snapshot(t0());
        let (exams, homeworks) =
            sessions_for_student("student-3", &snap.exam_sessions, &snap.homework_sessions);
        assert!(exams.is_empty());
        assert_eq!(homeworks.len(), 1);
        assert_eq!(restriction_message(&exams, &homeworks, t0()), Some(RESTRICTION_MESSAGE));
        let (exams, homeworks) =
            sessions_for_student("student-4", &snap.exam_sessions, &snap.homework_sessions);
        assert_eq!(restriction_message(&exams, &homeworks, t0()), None);
    }
}
