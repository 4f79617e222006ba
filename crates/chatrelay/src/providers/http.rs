use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};

use super::base::{HistoryMode, Provider};
use super::encoding::request_encoding;
use super::utils::extract_reply;
use crate::errors::{ProviderError, ProviderResult};
use crate::models::message::ConversationTurn;
use crate::registry::ModelDescriptor;

pub const OCR_ENDPOINT: &str = "https://sii3.top/api/OCR.php";
pub const OCR_MODEL_ID: &str = "ocr";

/// Talks to the upstream model endpoints over plain HTTP
pub struct HttpProvider {
    client: Client,
    history: HistoryMode,
    ocr_endpoint: String,
}

impl HttpProvider {
    pub fn new(history: HistoryMode) -> Result<Self> {
        // No explicit timeout, upstream latency is left to the transport
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            history,
            ocr_endpoint: OCR_ENDPOINT.to_string(),
        })
    }

    pub fn with_ocr_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.ocr_endpoint = endpoint.into();
        self
    }

    async fn send(&self, model_id: &str, request: RequestBuilder) -> ProviderResult<String> {
        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::upstream(model_id, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::upstream(
                model_id,
                format!("Request failed: {}", status),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::upstream(model_id, e.to_string()))?;

        Ok(extract_reply(&body))
    }
}

#[async_trait]
impl Provider for HttpProvider {
    async fn call_model(
        &self,
        model: &ModelDescriptor,
        conversation: &[ConversationTurn],
    ) -> ProviderResult<String> {
        let encoding = request_encoding(&model.id)
            .ok_or_else(|| ProviderError::UnknownModel(model.id.clone()))?;
        let prompt = self.history.build_prompt(conversation)?;

        let mut request = self
            .client
            .request(encoding.method(), encoding.url(&model.api_endpoint, &prompt))
            .header(CONTENT_TYPE, encoding.content_type());
        if let Some(body) = encoding
            .body(&prompt)
            .map_err(|e| ProviderError::upstream(&model.id, e.to_string()))?
        {
            request = request.body(body);
        }

        tracing::debug!(model = %model.id, "calling upstream model");
        self.send(&model.id, request).await.map_err(|err| {
            tracing::error!("Error calling {}: {}", model.name, err);
            err
        })
    }

    async fn describe_image(&self, image_url: &str, prompt: &str) -> ProviderResult<String> {
        let url = format!(
            "{}?text={}&link={}",
            self.ocr_endpoint,
            urlencoding::encode(prompt),
            urlencoding::encode(image_url)
        );

        tracing::debug!(image_url, "calling OCR endpoint");
        self.send(OCR_MODEL_ID, self.client.get(url))
            .await
            .map_err(|err| {
                tracing::error!("Error calling OCR API: {}", err);
                err
            })
    }
}
