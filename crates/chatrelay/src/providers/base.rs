use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::{ProviderError, ProviderResult};
use crate::models::message::ConversationTurn;
use crate::models::role::Role;
use crate::registry::ModelDescriptor;

/// Prompt used when an image is sent without any accompanying text
pub const DEFAULT_IMAGE_PROMPT: &str = "describe this picture";

/// How much of a conversation is folded into the single prompt field an
/// upstream accepts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
    /// Only the content of the last turn is sent
    #[default]
    Latest,
    /// Every turn is rendered as a `Role: content` line
    Transcript,
}

impl HistoryMode {
    pub fn build_prompt(&self, conversation: &[ConversationTurn]) -> ProviderResult<String> {
        let last = conversation.last().ok_or(ProviderError::EmptyConversation)?;
        match self {
            HistoryMode::Latest => Ok(last.content.clone()),
            HistoryMode::Transcript => Ok(conversation
                .iter()
                .map(|turn| {
                    let speaker = match turn.role {
                        Role::User => "User",
                        Role::Assistant => "Assistant",
                    };
                    format!("{}: {}", speaker, turn.content)
                })
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }
}

/// Base trait for upstream model adapters
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send a conversation to the given model and return its reply text
    async fn call_model(
        &self,
        model: &ModelDescriptor,
        conversation: &[ConversationTurn],
    ) -> ProviderResult<String>;

    /// Ask the OCR endpoint to describe the image at `image_url`
    async fn describe_image(&self, image_url: &str, prompt: &str) -> ProviderResult<String>;
}
