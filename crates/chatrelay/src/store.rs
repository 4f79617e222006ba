//! Chat persistence. The relay only needs read, append and delete.
use async_trait::async_trait;

use crate::errors::StoreResult;
use crate::models::chat::Chat;
use crate::models::message::ChatMessage;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn get_chat(&self, id: &str) -> StoreResult<Option<Chat>>;

    /// Insert a chat, or replace the record of an existing one keeping its messages
    async fn save_chat(&self, chat: Chat) -> StoreResult<()>;

    /// Remove a chat with all its messages, returning the removed record
    async fn delete_chat(&self, id: &str) -> StoreResult<Option<Chat>>;

    /// Messages of a chat in the order they were saved
    async fn get_messages(&self, chat_id: &str) -> StoreResult<Vec<ChatMessage>>;

    /// Append a message. The chat must exist and the message id must be new to it.
    async fn save_message(&self, message: ChatMessage) -> StoreResult<()>;
}
