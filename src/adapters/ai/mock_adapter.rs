//! Canned-response assistant. No inference: replies are picked by agent id.
//!
//! Used for the CLI and tests.

use crate::domain::{AiAgent, DomainError};
use crate::ports::AssistantPort;
use std::time::Duration;
use tracing::info;

const MATH_REPLIES: &[&str] = &[
    "Let's break the problem into smaller steps. What do you already know about the equation?",
    "Try isolating the variable first, then check your answer by substituting it back.",
    "Draw a quick sketch of the graph. Where does it cross the axes?",
];

const SCIENCE_REPLIES: &[&str] = &[
    "Start from the basic law involved and list the quantities you are given.",
    "Check the units on both sides. They often reveal a missing step.",
    "What would you expect to observe if your hypothesis were true?",
];

const WRITING_REPLIES: &[&str] = &[
    "What is the main argument you want the reader to take away?",
    "Try opening the paragraph with a clear topic sentence, then support it with a quote.",
    "Read the passage aloud. Which sentences feel too long?",
];

const GENERAL_REPLIES: &[&str] = &[
    "Good question! Could you tell me a bit more about what you have tried so far?",
    "Let's make a short plan: what do you need to finish first?",
];

/// Mock assistant adapter.
///
/// Returns predetermined responses without making any calls.
/// Simulates thinking latency with configurable delay.
pub struct MockAssistantAdapter {
    delay_ms: u64,
}

impl MockAssistantAdapter {
    /// Create a new mock adapter with default delay (150ms).
    pub fn new() -> Self {
        Self { delay_ms: 150 }
    }

    pub fn with_delay(delay_ms: u64) -> Self {
        Self { delay_ms }
    }
}

impl Default for MockAssistantAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Reply pool for an agent id.
pub fn replies_for(agent_id: &str) -> &'static [&'static str] {
    match agent_id {
        "agent-math" => MATH_REPLIES,
        "agent-science" => SCIENCE_REPLIES,
        "agent-writing" => WRITING_REPLIES,
        _ => GENERAL_REPLIES,
    }
}

/// Deterministic pick: same agent and prompt always yield the same reply.
pub fn canned_response(agent_id: &str, prompt: &str) -> &'static str {
    let pool = replies_for(agent_id);
    let idx = prompt.bytes().map(usize::from).sum::<usize>() % pool.len();
    pool[idx]
}

#[async_trait::async_trait]
impl AssistantPort for MockAssistantAdapter {
    async fn respond(&self, agent: &AiAgent, prompt: &str) -> Result<String, DomainError> {
        info!(
            agent_id = %agent.id,
            prompt_len = prompt.len(),
            "[MOCK] generating canned assistant reply"
        );

        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;

        Ok(canned_response(&agent.id, prompt).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(id: &str) -> AiAgent {
        AiAgent {
            id: id.to_string(),
            name: "Tutor".to_string(),
            subjects: vec![],
            grades: vec![],
            is_active: true,
            max_concurrent_chats: 1,
            active_chats: 0,
        }
    }

    #[tokio::test]
    async fn test_mock_adapter_picks_from_agent_pool() {
        let adapter = MockAssistantAdapter::with_delay(1);
        let reply = adapter
            .respond(&agent("agent-math"), "how do I solve 2x + 3 = 7?")
            .await
            .unwrap();
        assert!(MATH_REPLIES.contains(&reply.as_str()));

        let reply = adapter.respond(&agent("agent-unknown"), "hi").await.unwrap();
        assert!(GENERAL_REPLIES.contains(&reply.as_str()));
    }

    #[test]
    fn test_canned_response_is_deterministic() {
        let a = canned_response("agent-writing", "thesis help");
        let b = canned_response("agent-writing", "thesis help");
        assert_eq!(a, b);
        assert_eq!(canned_response("agent-science", ""), SCIENCE_REPLIES[0]);
    }
}
