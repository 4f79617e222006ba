//! The fixed list of chat models the relay can forward to.
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CHAT_MODEL: &str = "chatgpt4";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub api_endpoint: String,
}

impl ModelDescriptor {
    pub fn new(id: &str, name: &str, description: &str, api_endpoint: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            api_endpoint: api_endpoint.to_string(),
        }
    }

    /// Same model pointed at another endpoint
    pub fn with_endpoint<S: Into<String>>(mut self, api_endpoint: S) -> Self {
        self.api_endpoint = api_endpoint.into();
        self
    }
}

lazy_static! {
    static ref CHAT_MODELS: Vec<ModelDescriptor> = vec![
        ModelDescriptor::new(
            "chatgpt4",
            "ChatGPT-4",
            "Best AI model with advanced reasoning capabilities",
            "https://shahad.top/chatbotapi.php",
        ),
        ModelDescriptor::new(
            "gemini-dark",
            "Gemini Dark",
            "Google's advanced Gemini model",
            "https://sii3.top/api/gemini-dark.php",
        ),
        ModelDescriptor::new(
            "gemma-27b",
            "Gemma 27B",
            "Powerful open-source language model",
            "https://sii3.top/api/gemma.php",
        ),
        ModelDescriptor::new(
            "qwen-72b",
            "Qwen 2.5 72B",
            "Advanced multilingual model",
            "https://sii3.top/api/qwen.php",
        ),
        ModelDescriptor::new(
            "grok4",
            "Grok 4",
            "Fast and efficient AI model",
            "https://sii3.top/api/grok4.php",
        ),
        ModelDescriptor::new(
            "gpt-oss",
            "GPT OSS",
            "Open-source GPT implementation",
            "https://sii3.top/api/gpt-oss.php",
        ),
    ];
}

pub fn list_models() -> &'static [ModelDescriptor] {
    &CHAT_MODELS
}

pub fn find_model(id: &str) -> Option<&'static ModelDescriptor> {
    CHAT_MODELS.iter().find(|model| model.id == id)
}
