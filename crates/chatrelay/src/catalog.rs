//! Read-through cache of a remote model catalog.
//!
//! The catalog is advisory: it feeds model listings only, never request
//! validation, so any failure quietly falls back to the built-in registry.
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use reqwest::Client;
use tokio::sync::RwLock;

use crate::registry::{list_models, ModelDescriptor};

pub const CATALOG_TTL: Duration = Duration::from_secs(24 * 60 * 60);

struct CachedCatalog {
    fetched_at: Instant,
    models: Vec<ModelDescriptor>,
}

pub struct ModelCatalog {
    client: Client,
    url: Option<String>,
    ttl: Duration,
    cached: RwLock<Option<CachedCatalog>>,
}

impl ModelCatalog {
    pub fn new(url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            url,
            ttl: CATALOG_TTL,
            cached: RwLock::new(None),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Current catalog, fetched at most once per TTL
    pub async fn models(&self) -> Vec<ModelDescriptor> {
        let Some(url) = &self.url else {
            return list_models().to_vec();
        };

        if let Some(cached) = self.cached.read().await.as_ref() {
            if cached.fetched_at.elapsed() < self.ttl {
                return cached.models.clone();
            }
        }

        match self.fetch(url).await {
            Ok(models) => {
                *self.cached.write().await = Some(CachedCatalog {
                    fetched_at: Instant::now(),
                    models: models.clone(),
                });
                models
            }
            Err(e) => {
                tracing::debug!("Model catalog unavailable, using built-in list: {}", e);
                list_models().to_vec()
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<ModelDescriptor>> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("Request failed: {}", response.status()));
        }
        let models: Vec<ModelDescriptor> = response.json().await?;
        if models.is_empty() {
            return Err(anyhow!("Catalog is empty"));
        }
        Ok(models)
    }
}
