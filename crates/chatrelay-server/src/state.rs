use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chatrelay::catalog::ModelCatalog;
use chatrelay::providers::{base::Provider, http::HttpProvider};
use chatrelay::store::{ChatStore, FileStore, MemoryStore};

use crate::configuration::{ProviderMode, Settings, StoreKind};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub mode: ProviderMode,
    pub provider: Arc<dyn Provider>,
    pub store: Arc<dyn ChatStore>,
    pub catalog: Arc<ModelCatalog>,
}

impl AppState {
    pub fn new(
        mode: ProviderMode,
        provider: Arc<dyn Provider>,
        store: Arc<dyn ChatStore>,
        catalog: Arc<ModelCatalog>,
    ) -> Self {
        Self {
            mode,
            provider,
            store,
            catalog,
        }
    }

    pub async fn from_settings(settings: &Settings, mode: ProviderMode) -> Result<Self> {
        let provider = HttpProvider::new(settings.provider.history)?
            .with_ocr_endpoint(settings.provider.ocr_endpoint.clone());

        let store: Arc<dyn ChatStore> = match settings.store.kind {
            StoreKind::Memory => Arc::new(MemoryStore::new()),
            StoreKind::File => {
                let dir = settings.store.resolved_dir()?;
                tracing::info!("storing chats in {}", dir.display());
                Arc::new(FileStore::open(dir).await?)
            }
        };

        let catalog = ModelCatalog::new(settings.catalog.url.clone())
            .with_ttl(Duration::from_secs(settings.catalog.ttl_secs));

        Ok(Self::new(mode, Arc::new(provider), store, Arc::new(catalog)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::StoreSettings;
    use chatrelay::models::chat::{Chat, Visibility};
    use chatrelay::models::message::ChatMessage;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_store_from_settings() {
        let temp_dir = tempdir().unwrap();
        let settings = Settings {
            store: StoreSettings {
                kind: StoreKind::File,
                dir: Some(temp_dir.path().join("chats")),
            },
            ..Default::default()
        };

        let state = AppState::from_settings(&settings, ProviderMode::Live)
            .await
            .unwrap();
        assert_eq!(state.mode, ProviderMode::Live);

        state
            .store
            .save_chat(Chat::new("c1", "Hello", Visibility::Private))
            .await
            .unwrap();
        state
            .store
            .save_message(ChatMessage::user("c1").with_text("hi"))
            .await
            .unwrap();

        assert!(temp_dir.path().join("chats").join("c1.jsonl").exists());
        assert_eq!(state.store.get_messages("c1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_is_default() {
        let state = AppState::from_settings(&Settings::default(), ProviderMode::Mock)
            .await
            .unwrap();

        assert_eq!(state.mode, ProviderMode::Mock);
        assert!(state.store.get_chat("c1").await.unwrap().is_none());
        assert_eq!(state.catalog.models().await.len(), 6);
    }
}
