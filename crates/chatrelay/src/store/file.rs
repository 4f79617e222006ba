use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use super::ChatStore;
use crate::errors::{StoreError, StoreResult};
use crate::models::chat::Chat;
use crate::models::message::ChatMessage;

/// Stores each chat as `<dir>/<chat id>.jsonl`: the chat record on the first
/// line, then one message per line in save order.
pub struct FileStore {
    dir: PathBuf,
    // Writers rewrite or append whole files; readers must never observe one
    // half-written
    lock: RwLock<()>,
}

impl FileStore {
    pub async fn open<P: Into<PathBuf>>(dir: P) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            lock: RwLock::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // Chat ids come from clients, so anything that is not a plain file name
    // has no file
    fn chat_file(&self, id: &str) -> Option<PathBuf> {
        let mut components = Path::new(id).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Some(self.dir.join(format!("{}.jsonl", id))),
            _ => None,
        }
    }

    async fn read(&self, id: &str) -> StoreResult<Option<(Chat, Vec<ChatMessage>)>> {
        let Some(path) = self.chat_file(id) else {
            return Ok(None);
        };
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut lines = content.lines().filter(|line| !line.trim().is_empty());
        let Some(header) = lines.next() else {
            return Ok(None);
        };
        let chat: Chat = serde_json::from_str(header)?;
        let messages = lines
            .map(serde_json::from_str)
            .collect::<Result<Vec<ChatMessage>, _>>()?;
        Ok(Some((chat, messages)))
    }

    async fn write(&self, path: &Path, chat: &Chat, messages: &[ChatMessage]) -> StoreResult<()> {
        let mut buffer = serde_json::to_string(chat)?;
        buffer.push('\n');
        for message in messages {
            buffer.push_str(&serde_json::to_string(message)?);
            buffer.push('\n');
        }
        fs::write(path, buffer).await?;
        Ok(())
    }

    fn invalid_id(id: &str) -> StoreError {
        StoreError::Io(std::io::Error::new(
            ErrorKind::InvalidInput,
            format!("Invalid chat id: {}", id),
        ))
    }
}

#[async_trait]
impl ChatStore for FileStore {
    async fn get_chat(&self, id: &str) -> StoreResult<Option<Chat>> {
        let _guard = self.lock.read().await;
        Ok(self.read(id).await?.map(|(chat, _)| chat))
    }

    async fn save_chat(&self, chat: Chat) -> StoreResult<()> {
        let _guard = self.lock.write().await;
        let path = self.chat_file(&chat.id).ok_or_else(|| Self::invalid_id(&chat.id))?;
        let messages = self
            .read(&chat.id)
            .await?
            .map(|(_, messages)| messages)
            .unwrap_or_default();
        self.write(&path, &chat, &messages).await
    }

    async fn delete_chat(&self, id: &str) -> StoreResult<Option<Chat>> {
        let _guard = self.lock.write().await;
        let Some((chat, _)) = self.read(id).await? else {
            return Ok(None);
        };
        if let Some(path) = self.chat_file(id) {
            fs::remove_file(path).await?;
        }
        Ok(Some(chat))
    }

    async fn get_messages(&self, chat_id: &str) -> StoreResult<Vec<ChatMessage>> {
        let _guard = self.lock.read().await;
        Ok(self
            .read(chat_id)
            .await?
            .map(|(_, messages)| messages)
            .unwrap_or_default())
    }

    async fn save_message(&self, message: ChatMessage) -> StoreResult<()> {
        let _guard = self.lock.write().await;
        let (_, messages) = self
            .read(&message.chat_id)
            .await?
            .ok_or_else(|| StoreError::ChatNotFound(message.chat_id.clone()))?;

        if messages.iter().any(|m| m.id == message.id) {
            return Err(StoreError::DuplicateMessage {
                chat_id: message.chat_id,
                message_id: message.id,
            });
        }

        let path = self
            .chat_file(&message.chat_id)
            .ok_or_else(|| Self::invalid_id(&message.chat_id))?;
        let mut line = serde_json::to_string(&message)?;
        line.push('\n');

        let mut file = fs::OpenOptions::new().append(true).open(path).await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Visibility;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_messages_survive_reopen() -> StoreResult<()> {
        let temp_dir = tempdir()?;
        {
            let store = FileStore::open(temp_dir.path()).await?;
            store.save_chat(Chat::new("c1", "Hello", Visibility::Public)).await?;
            store.save_message(ChatMessage::user("c1").with_id("m1").with_text("hi")).await?;
            store
                .save_message(
                    ChatMessage::user("c1")
                        .with_id("m2")
                        .with_file("https://x/cat.png", "image/png"),
                )
                .await?;
        }

        let store = FileStore::open(temp_dir.path()).await?;
        let chat = store.get_chat("c1").await?.unwrap();
        assert_eq!(chat.visibility, Visibility::Public);

        let messages = store.get_messages("c1").await?;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].text(), "hi");
        assert!(messages[1].image_attachment().is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_removes_file() -> StoreResult<()> {
        let temp_dir = tempdir()?;
        let store = FileStore::open(temp_dir.path()).await?;
        store.save_chat(Chat::new("c1", "Hello", Visibility::Private)).await?;
        assert!(temp_dir.path().join("c1.jsonl").exists());

        let deleted = store.delete_chat("c1").await?.unwrap();
        assert_eq!(deleted.id, "c1");
        assert!(!temp_dir.path().join("c1.jsonl").exists());
        assert!(store.delete_chat("c1").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_path_like_ids_have_no_file() -> StoreResult<()> {
        let temp_dir = tempdir()?;
        let store = FileStore::open(temp_dir.path()).await?;

        assert!(store.get_chat("../etc/passwd").await?.is_none());
        let saved = store
            .save_chat(Chat::new("../escape", "x", Visibility::Private))
            .await;
        assert!(saved.is_err());
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_reads_never_see_partial_writes() -> StoreResult<()> {
        let temp_dir = tempdir()?;
        let store = std::sync::Arc::new(FileStore::open(temp_dir.path()).await?);
        store.save_chat(Chat::new("c1", "Busy", Visibility::Private)).await?;

        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                for i in 0..50 {
                    store
                        .save_message(ChatMessage::user("c1").with_text(format!("message {}", i)))
                        .await?;
                    store.save_chat(Chat::new("c1", format!("Busy {}", i), Visibility::Private)).await?;
                }
                Ok::<_, StoreError>(())
            })
        };

        let mut last_seen = 0;
        for _ in 0..200 {
            assert!(store.get_chat("c1").await?.is_some());
            let count = store.get_messages("c1").await?.len();
            assert!(count >= last_seen);
            last_seen = count;
            tokio::task::yield_now().await;
        }

        writer.await.expect("writer task panicked")?;
        assert_eq!(store.get_messages("c1").await?.len(), 50);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_message_rejected() -> StoreResult<()> {
        let temp_dir = tempdir()?;
        let store = FileStore::open(temp_dir.path()).await?;
        store.save_chat(Chat::new("c1", "t", Visibility::Private)).await?;
        store.save_message(ChatMessage::user("c1").with_id("m1")).await?;

        let duplicate = store.save_message(ChatMessage::user("c1").with_id("m1")).await;
        assert!(matches!(duplicate, Err(StoreError::DuplicateMessage { .. })));
        assert_eq!(store.get_messages("c1").await?.len(), 1);
        Ok(())
    }
}
