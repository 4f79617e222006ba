use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::errors::{ProviderError, ProviderResult};
use crate::models::message::ConversationTurn;
use crate::providers::base::Provider;
use crate::registry::ModelDescriptor;

/// A call observed by [`MockProvider`]
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Model {
        model_id: String,
        conversation: Vec<ConversationTurn>,
    },
    Image {
        image_url: String,
        prompt: String,
    },
}

/// A mock provider that returns pre-configured replies and records every call
pub struct MockProvider {
    replies: Mutex<Vec<String>>,
    failure: Option<String>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of replies
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies),
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A provider whose every call fails as an unavailable upstream
    pub fn failing<S: Into<String>>(reason: S) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::new(Vec::new())
        }
    }

    pub async fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().await.clone()
    }

    async fn next_reply(&self, model_id: &str) -> ProviderResult<String> {
        if let Some(reason) = &self.failure {
            return Err(ProviderError::upstream(model_id, reason.clone()));
        }
        let mut replies = self.replies.lock().await;
        if replies.is_empty() {
            // Empty reply once the configured ones run out
            Ok(String::new())
        } else {
            Ok(replies.remove(0))
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn call_model(
        &self,
        model: &ModelDescriptor,
        conversation: &[ConversationTurn],
    ) -> ProviderResult<String> {
        self.calls.lock().await.push(MockCall::Model {
            model_id: model.id.clone(),
            conversation: conversation.to_vec(),
        });
        self.next_reply(&model.id).await
    }

    async fn describe_image(&self, image_url: &str, prompt: &str) -> ProviderResult<String> {
        self.calls.lock().await.push(MockCall::Image {
            image_url: image_url.to_string(),
            prompt: prompt.to_string(),
        });
        self.next_reply(super::http::OCR_MODEL_ID).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::find_model;

    #[tokio::test]
    async fn test_replies_in_order_then_empty() {
        let provider = MockProvider::new(vec!["one".into(), "two".into()]);
        let model = find_model("grok4").unwrap();
        let turns = [ConversationTurn::user("hi")];

        assert_eq!(provider.call_model(model, &turns).await.unwrap(), "one");
        assert_eq!(provider.call_model(model, &turns).await.unwrap(), "two");
        assert_eq!(provider.call_model(model, &turns).await.unwrap(), "");
        assert_eq!(provider.calls().await.len(), 3);
    }

    #[tokio::test]
    async fn test_failing_provider_records_call() {
        let provider = MockProvider::failing("down");
        let err = provider.describe_image("https://x/y.png", "what").await.unwrap_err();

        assert!(matches!(err, ProviderError::UpstreamUnavailable { .. }));
        assert_eq!(
            provider.calls().await,
            vec![MockCall::Image {
                image_url: "https://x/y.png".to_string(),
                prompt: "what".to_string(),
            }]
        );
    }
}
