use crate::ai::{error::AiError, model::Model, provider::AiProvider, types::*};
use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
    time::Duration,
};

/// Mock behavior for the mock provider
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum MockBehavior {
    /// Return successful responses
    #[default]
    Success,
    /// Return the given text verbatim
    Reply { text: String },
    /// Wait before returning the given text
    DelayedReply { text: String, delay_ms: u64 },
    /// Always return a transient error
    AlwaysTransientError,
    /// Always return a terminal error
    AlwaysTerminalError,
    /// Pops one behavior per call; falls back to Success once drained.
    /// Queues cannot be nested.
    BehaviorQueue { behaviors: Vec<MockBehavior> },
}

/// Mock AI provider for testing
#[derive(Clone)]
pub struct MockProvider {
    behavior: Arc<Mutex<MockBehavior>>,
    call_count: Arc<Mutex<usize>>,
    captured_requests: Arc<Mutex<Vec<ConversationRequest>>>,
}

impl MockProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior: Arc::new(Mutex::new(behavior)),
            call_count: Arc::new(Mutex::new(0)),
            captured_requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn pop_behavior_from_queue(behavior: &mut MockBehavior) -> MockBehavior {
        if let MockBehavior::BehaviorQueue { behaviors } = behavior {
            if behaviors.is_empty() {
                return MockBehavior::Success;
            }
            return behaviors.remove(0);
        }
        behavior.clone()
    }

    pub fn set_behavior(&self, behavior: MockBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn get_captured_requests(&self) -> Vec<ConversationRequest> {
        self.captured_requests.lock().unwrap().clone()
    }

    pub fn get_last_captured_request(&self) -> Option<ConversationRequest> {
        self.captured_requests.lock().unwrap().last().cloned()
    }

    pub fn clear_captured_requests(&self) {
        self.captured_requests.lock().unwrap().clear();
    }
}

fn text_response(text: impl Into<String>) -> ConversationResponse {
    ConversationResponse {
        content: text.into(),
        usage: TokenUsage::new(10, 10),
        stop_reason: StopReason::EndTurn,
    }
}

#[async_trait::async_trait]
impl AiProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn supported_models(&self) -> HashSet<Model> {
        use strum::VariantArray;
        Model::VARIANTS.iter().copied().collect()
    }

    async fn converse(
        &self,
        request: ConversationRequest,
    ) -> Result<ConversationResponse, AiError> {
        self.captured_requests.lock().unwrap().push(request);
        *self.call_count.lock().unwrap() += 1;

        let effective = {
            let mut behavior = self.behavior.lock().unwrap();
            Self::pop_behavior_from_queue(&mut behavior)
        };

        match effective {
            MockBehavior::Success => Ok(text_response("Mock response")),
            MockBehavior::Reply { text } => Ok(text_response(text)),
            MockBehavior::DelayedReply { text, delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(text_response(text))
            }
            MockBehavior::AlwaysTransientError => Err(AiError::Transient(anyhow::anyhow!(
                "Mock transient error (always fails)"
            ))),
            MockBehavior::AlwaysTerminalError => {
                Err(AiError::Terminal(anyhow::anyhow!("Mock terminal error")))
            }
            MockBehavior::BehaviorQueue { .. } => Err(AiError::Terminal(anyhow::anyhow!(
                "Mock behavior queues cannot contain other behavior queues"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str) -> ConversationRequest {
        ConversationRequest {
            messages: vec![Message::user(text)],
            model: Model::None.default_settings(),
            system_prompt: "instruction".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_provider_success() {
        let provider = MockProvider::new(MockBehavior::Success);

        let response = provider.converse(request("Test")).await.unwrap();
        assert_eq!(response.content, "Mock response");
        assert_eq!(provider.get_call_count(), 1);

        let captured = provider.get_last_captured_request().unwrap();
        assert_eq!(captured.system_prompt, "instruction");
        assert_eq!(captured.messages, vec![Message::user("Test")]);
    }

    #[tokio::test]
    async fn test_behavior_queue_then_success() {
        let provider = MockProvider::new(MockBehavior::BehaviorQueue {
            behaviors: vec![
                MockBehavior::AlwaysTransientError,
                MockBehavior::Reply {
                    text: "```veriloga\nmodule m; endmodule\n```".to_string(),
                },
            ],
        });

        let first = provider.converse(request("a")).await;
        assert!(matches!(first, Err(AiError::Transient(_))));

        let second = provider.converse(request("b")).await.unwrap();
        assert!(second.content.contains("module m;"));

        let third = provider.converse(request("c")).await.unwrap();
        assert_eq!(third.content, "Mock response");
        assert_eq!(provider.get_call_count(), 3);
        assert_eq!(provider.get_captured_requests().len(), 3);
    }

    #[tokio::test]
    async fn test_nested_queue_is_an_error() {
        let provider = MockProvider::new(MockBehavior::BehaviorQueue {
            behaviors: vec![MockBehavior::BehaviorQueue {
                behaviors: vec![MockBehavior::Success],
            }],
        });

        let nested = provider.converse(request("a")).await;
        assert!(matches!(nested, Err(AiError::Terminal(_))));

        // The queue is drained and the provider keeps working
        let next = provider.converse(request("b")).await.unwrap();
        assert_eq!(next.content, "Mock response");
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_reply_waits() {
        let provider = MockProvider::new(MockBehavior::DelayedReply {
            text: "late".to_string(),
            delay_ms: 5_000,
        });

        let start = tokio::time::Instant::now();
        let response = provider.converse(request("x")).await.unwrap();
        assert_eq!(response.content, "late");
        assert!(start.elapsed() >= Duration::from_millis(5_000));
    }
}
