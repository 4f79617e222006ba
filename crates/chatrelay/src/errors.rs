use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Upstream unavailable for model {model}: {reason}")]
    UpstreamUnavailable { model: String, reason: String },

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Conversation has no messages")]
    EmptyConversation,
}

impl ProviderError {
    pub fn upstream<S: Into<String>>(model: &str, reason: S) -> Self {
        ProviderError::UpstreamUnavailable {
            model: model.to_string(),
            reason: reason.into(),
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Chat not found: {0}")]
    ChatNotFound(String),

    #[error("Duplicate message id {message_id} in chat {chat_id}")]
    DuplicateMessage { chat_id: String, message_id: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
