//! Assistant chat flow: gate check, then canned reply appended to the conversation.

use crate::domain::{
    AgentStatus, AiAgent, AiConversation, ChatRole, DomainError, ExamSession, HomeworkSession,
    StudentProfile,
};
use crate::ports::{AssistantPort, Clock};
use crate::usecases::assistant_gate::{
    AssistantRequest, agent_status, restriction_message, sessions_for_student,
};
use std::sync::Arc;
use tracing::{info, warn};

pub struct AssistantService {
    assistant: Arc<dyn AssistantPort>,
    clock: Arc<dyn Clock>,
}

impl AssistantService {
    pub fn new(assistant: Arc<dyn AssistantPort>, clock: Arc<dyn Clock>) -> Self {
        Self { assistant, clock }
    }

    /// Status of every agent for this student, in input order.
    pub fn agent_statuses<'a>(
        &self,
        agents: &'a [AiAgent],
        student: &StudentProfile,
        subject: Option<&str>,
        exams: &[ExamSession],
        homeworks: &[HomeworkSession],
    ) -> Vec<(&'a AiAgent, AgentStatus)> {
        let request = AssistantRequest {
            student,
            subject,
            now: self.clock.now(),
        };
        agents
            .iter()
            .map(|a| (a, agent_status(a, &request, exams, homeworks)))
            .collect()
    }

    /// Restriction notice for the student's own sessions, if any is running.
    pub fn restriction_notice(
        &self,
        student: &StudentProfile,
        exams: &[ExamSession],
        homeworks: &[HomeworkSession],
    ) -> Option<&'static str> {
        let (exams, homeworks) = sessions_for_student(&student.id, exams, homeworks);
        restriction_message(&exams, &homeworks, self.clock.now())
    }

    pub fn start_conversation(
        &self,
        agent: &AiAgent,
        student: &StudentProfile,
        subject: Option<String>,
    ) -> AiConversation {
        let now = self.clock.now();
        let id = format!("conv-{}-{}-{}", student.id, agent.id, now.timestamp_millis());
        AiConversation::new(id, agent.id.clone(), student.id.clone(), subject, now)
    }

    /// Send `prompt` to `agent` inside `conversation`. Refused unless the agent is
    /// available to this student right now; a refused prompt is not recorded.
    pub async fn ask(
        &self,
        conversation: &mut AiConversation,
        agent: &AiAgent,
        student: &StudentProfile,
        prompt: &str,
        exams: &[ExamSession],
        homeworks: &[HomeworkSession],
    ) -> Result<String, DomainError> {
        if conversation.agent_id != agent.id || conversation.student_id != student.id {
            return Err(DomainError::Assistant(format!(
                "conversation {} does not belong to {} / {}",
                conversation.id, student.id, agent.id
            )));
        }
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(DomainError::Assistant("empty prompt".into()));
        }

        let request = AssistantRequest {
            student,
            subject: conversation.subject.as_deref(),
            now: self.clock.now(),
        };
        let status = agent_status(agent, &request, exams, homeworks);
        if status != AgentStatus::Available {
            warn!(agent_id = %agent.id, student_id = %student.id, %status, "assistant refused");
            return Err(DomainError::AssistantUnavailable {
                agent_id: agent.id.clone(),
                status,
                message: self.restriction_notice(student, exams, homeworks).map(str::to_string),
            });
        }

        conversation.push(ChatRole::Student, prompt, self.clock.now());
        let reply = self.assistant.respond(agent, prompt).await?;
        conversation.push(ChatRole::Agent, reply.clone(), self.clock.now());
        info!(
            conversation_id = %conversation.id,
            messages = conversation.messages.len(),
            "assistant replied"
        );
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAssistantAdapter;
    use crate::adapters::persistence::fixtures::seed_snapshot;
    use crate::ports::FixedClock;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 1, 9, 0, 0).unwrap()
    }

    fn service(clock: Arc<FixedClock>) -> AssistantService {
        AssistantService::new(Arc::new(MockAssistantAdapter::with_delay(0)), clock)
    }

    #[tokio::test]
    async fn test_ask_appends_both_messages() {
        let snap = seed_snapshot(t0());
        let svc = service(Arc::new(FixedClock::new(t0())));
        let agent = snap.agent("agent-math").unwrap();
        let student = snap.student("student-4").unwrap();
        let mut conv = svc.start_conversation(agent, student, Some("Math".into()));

        let reply = svc
            .ask(
                &mut conv,
                agent,
                student,
                "  factor x^2 - 9  ",
                &snap.exam_sessions,
                &snap.homework_sessions,
            )
            .await
            .unwrap();

        assert_eq!(conv.messages.len(), 2);
        assert_eq!(conv.messages[0].role, ChatRole::Student);
        assert_eq!(conv.messages[0].content, "factor x^2 - 9");
        assert_eq!(conv.messages[1].content, reply);
    }

    #[tokio::test]
    async fn test_ask_during_exam_is_refused() {
        let snap = seed_snapshot(t0());
        let clock = Arc::new(FixedClock::new(t0()));
        let svc = service(clock.clone());
        let agent = snap.agent("agent-math").unwrap();
        let student = snap.student("student-1").unwrap();
        let mut conv = svc.start_conversation(agent, student, None);

        let err = svc
            .ask(
                &mut conv,
                agent,
                student,
                "what is 7*8?",
                &snap.exam_sessions,
                &snap.homework_sessions,
            )
            .await
            .unwrap_err();
        match err {
            DomainError::AssistantUnavailable { status, message, .. } => {
                assert_eq!(status, AgentStatus::Restricted);
                assert!(message.is_some());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(conv.messages.is_empty());

        clock.advance(Duration::hours(2));
        svc.ask(
            &mut conv,
            agent,
            student,
            "what is 7*8?",
            &snap.exam_sessions,
            &snap.homework_sessions,
        )
        .await
            .unwrap();
        assert_eq!(conv.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_ask_rejects_foreign_conversation_and_empty_prompt() {
        let snap = seed_snapshot(t0());
        let svc = service(Arc::new(FixedClock::new(t0())));
        let agent = snap.agent("agent-writing").unwrap();
        let student = snap.student("student-4").unwrap();
        let other = snap.student("student-5").unwrap();
        let mut conv = svc.start_conversation(agent, other, None);

        assert!(matches!(
            svc.ask(&mut conv, agent, student, "hi", &[], &[]).await,
            Err(DomainError::Assistant(_))
        ));
        let mut conv = svc.start_conversation(agent, student, None);
        assert!(matches!(
            svc.ask(&mut conv, agent, student, "   ", &[], &[]).await,
            Err(DomainError::Assistant(_))
        ));
    }

    #[test]
    fn test_statuses_and_notice() {
        let snap = seed_snapshot(t0());
        let svc = service(Arc::new(FixedClock::new(t0())));
        let student = snap.student("student-1").unwrap();
        let statuses = svc.agent_statuses(
            &snap.agents,
            student,
            None,
            &snap.exam_sessions,
            &snap.homework_sessions,
        );
        let by_id: Vec<_> = statuses.iter().map(|(a, s)| (a.id.as_str(), *s)).collect();
        assert_eq!(
            by_id,
            vec![
                ("agent-math", AgentStatus::Restricted),
                ("agent-science", AgentStatus::Restricted),
                ("agent-writing", AgentStatus::Restricted),
                ("agent-general", AgentStatus::Offline),
            ]
        );
        assert!(svc
            .restriction_notice(student, &snap.exam_sessions, &snap.homework_sessions)
            .is_some());
        let free = snap.student("student-4").unwrap();
        assert!(svc
            .restriction_notice(free, &snap.exam_sessions, &snap.homework_sessions)
            .is_none());
    }
}
