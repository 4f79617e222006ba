use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::ChatStore;
use crate::errors::{StoreError, StoreResult};
use crate::models::chat::Chat;
use crate::models::message::ChatMessage;

struct StoredChat {
    chat: Chat,
    messages: Vec<ChatMessage>,
}

/// Keeps chats in process memory; everything is lost on restart
#[derive(Default)]
pub struct MemoryStore {
    chats: RwLock<HashMap<String, StoredChat>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn get_chat(&self, id: &str) -> StoreResult<Option<Chat>> {
        Ok(self.chats.read().await.get(id).map(|stored| stored.chat.clone()))
    }

    async fn save_chat(&self, chat: Chat) -> StoreResult<()> {
        let mut chats = self.chats.write().await;
        match chats.get_mut(&chat.id) {
            Some(stored) => stored.chat = chat,
            None => {
                chats.insert(
                    chat.id.clone(),
                    StoredChat {
                        chat,
                        messages: Vec::new(),
                    },
                );
            }
        }
        Ok(())
    }

    async fn delete_chat(&self, id: &str) -> StoreResult<Option<Chat>> {
        Ok(self.chats.write().await.remove(id).map(|stored| stored.chat))
    }

    async fn get_messages(&self, chat_id: &str) -> StoreResult<Vec<ChatMessage>> {
        Ok(self
            .chats
            .read()
            .await
            .get(chat_id)
            .map(|stored| stored.messages.clone())
            .unwrap_or_default())
    }

    async fn save_message(&self, message: ChatMessage) -> StoreResult<()> {
        let mut chats = self.chats.write().await;
        let stored = chats
            .get_mut(&message.chat_id)
            .ok_or_else(|| StoreError::ChatNotFound(message.chat_id.clone()))?;

        if stored.messages.iter().any(|m| m.id == message.id) {
            return Err(StoreError::DuplicateMessage {
                chat_id: message.chat_id,
                message_id: message.id,
            });
        }
        stored.messages.push(message);
        Ok(())
    }
}
