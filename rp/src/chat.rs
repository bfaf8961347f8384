//! Chat over a finished course

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::Course;
use crate::llm::{CompletionRequest, LlmClient, LlmError, Message};
use crate::prompts::{ChatPromptContext, PromptLoader};

/// Errors from the chat assistant
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Assistant returned an empty reply")]
    EmptyReply,
}

/// Answers questions about a course
///
/// Stateless: the course is sent along with every message.
pub struct ChatService {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptLoader>,
    max_tokens: u32,
}

impl ChatService {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptLoader>, max_tokens: u32) -> Self {
        debug!(max_tokens, "ChatService::new: called");
        Self {
            llm,
            prompts,
            max_tokens,
        }
    }

    /// Reply to one user message about `course`
    pub async fn reply(&self, course: &Course, message: &str) -> Result<String, ChatError> {
        debug!(message_len = message.len(), "ChatService::reply: called");
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let context = ChatPromptContext::from_course(course).map_err(|e| ChatError::Prompt(e.to_string()))?;
        let system_prompt = self
            .prompts
            .chat_prompt(&context)
            .map_err(|e| ChatError::Prompt(e.to_string()))?;

        let response = self
            .llm
            .complete(CompletionRequest {
                system_prompt,
                messages: vec![Message::user(message)],
                max_tokens: self.max_tokens,
                temperature: None,
            })
            .await?;

        let reply = response.text_content().ok_or(ChatError::EmptyReply)?.to_string();
        info!(reply_len = reply.len(), "ChatService::reply: replied");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Place;
    use crate::llm::client::mock::MockLlmClient;

    fn service(llm: Arc<MockLlmClient>) -> ChatService {
        ChatService::new(llm, Arc::new(PromptLoader::embedded_only()), 500)
    }

    fn course() -> Course {
        Course {
            places: vec![Place::new("Gamcheon Culture Village")],
            sequence: vec![0],
            location: Some("Busan".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_reply_sends_course_and_message() {
        let llm = Arc::new(MockLlmClient::with_text("  Take bus 2 from Toseong station.  "));
        let reply = service(llm.clone()).reply(&course(), "How do I get there?").await.unwrap();

        assert_eq!(reply, "Take bus 2 from Toseong station.");
        let requests = llm.requests();
        assert!(requests[0].system_prompt.contains("Gamcheon Culture Village"));
        assert_eq!(requests[0].messages[0].content, "How do I get there?");
    }

    #[tokio::test]
    async fn test_blank_message_rejected_without_llm_call() {
        let llm = Arc::new(MockLlmClient::new(vec![]));
        let err = service(llm.clone()).reply(&course(), "  ").await.unwrap_err();
        assert!(matches!(err, ChatError::EmptyMessage));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_llm_failure_surfaces() {
        let llm = Arc::new(MockLlmClient::new(vec![]));
        let err = service(llm).reply(&course(), "Is it open on Monday?").await.unwrap_err();
        assert!(matches!(err, ChatError::Llm(_)));
    }
}
