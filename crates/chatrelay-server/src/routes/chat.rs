use crate::configuration::ProviderMode;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use chatrelay::{
    models::{
        chat::{derive_title, Chat, Visibility},
        message::{ChatMessage, ConversationTurn, MessagePart},
        role::Role,
    },
    providers::base::DEFAULT_IMAGE_PROMPT,
    registry::{find_model, ModelDescriptor},
};
use chrono::Utc;
use futures::Stream;
use http::header::{self, HeaderName};
use serde::Deserialize;
use serde_json::{json, Value};
use std::{
    convert::Infallible,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

pub const MOCK_REPLY_PREFIX: &str = "👋 Mock reply (no API key set). I received: ";
const MOCK_ECHO_CHARS: usize = 200;

const UI_MESSAGE_STREAM: HeaderName = HeaderName::from_static("x-vercel-ai-ui-message-stream");

// Types matching the incoming JSON structure
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest {
    id: String,
    message: IncomingMessage,
    selected_chat_model: String,
    #[serde(default)]
    selected_visibility_type: Visibility,
}

#[derive(Debug, Deserialize)]
struct IncomingMessage {
    id: String,
    role: Role,
    parts: Vec<MessagePart>,
}

#[derive(Debug, Default, Deserialize)]
struct MockRequest {
    #[serde(default)]
    messages: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct DeleteQuery {
    id: Option<String>,
}

// Custom SSE response type carrying the UI message stream protocol
pub struct SseResponse {
    rx: ReceiverStream<String>,
}

impl SseResponse {
    fn new(rx: ReceiverStream<String>) -> Self {
        Self { rx }
    }
}

impl Stream for SseResponse {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx)
            .poll_next(cx)
            .map(|opt| opt.map(|s| Ok(Bytes::from(s))))
    }
}

impl IntoResponse for SseResponse {
    fn into_response(self) -> Response {
        let body = Body::from_stream(self);

        (
            [
                (header::CONTENT_TYPE, "text/event-stream"),
                (header::CACHE_CONTROL, "no-cache"),
                (header::CONNECTION, "keep-alive"),
                (UI_MESSAGE_STREAM, "v1"),
            ],
            body,
        )
            .into_response()
    }
}

// Protocol-specific frame formatting
struct ProtocolFormatter;

impl ProtocolFormatter {
    fn frame(event_type: &str, data: Value) -> String {
        let event = json!({
            "type": event_type,
            "data": data,
        });
        format!("data: {}\n\n", event)
    }

    fn format_start(message_id: &str) -> String {
        Self::frame("message-start", json!({ "messageId": message_id }))
    }

    fn format_text(text: &str) -> String {
        Self::frame("text-delta", json!(text))
    }

    fn format_finish(reason: &str) -> String {
        Self::frame("message-finish", json!({ "finishReason": reason }))
    }

    fn format_usage() -> String {
        // Upstreams report no token counts
        Self::frame(
            "data-usage",
            json!({
                "promptTokens": 0,
                "completionTokens": 0
            }),
        )
    }

    fn format_error(message: &str) -> String {
        Self::frame("error", json!({ "message": message }))
    }

    fn format_done() -> String {
        "data: [DONE]\n\n".to_string()
    }
}

/// What the adapter is asked to do for one turn
enum Invocation {
    Describe { image_url: String, prompt: String },
    Complete {
        model: &'static ModelDescriptor,
        conversation: Vec<ConversationTurn>,
    },
}

fn validate(request: &ChatRequest) -> Result<&'static ModelDescriptor, ApiError> {
    if request.id.trim().is_empty() {
        return Err(ApiError::BadRequest("Chat id is required".to_string()));
    }
    if request.message.id.trim().is_empty() {
        return Err(ApiError::BadRequest("Message id is required".to_string()));
    }
    if request.message.role != Role::User {
        return Err(ApiError::BadRequest(
            "Only user messages can be sent".to_string(),
        ));
    }
    if request.message.parts.is_empty() {
        return Err(ApiError::BadRequest("Message has no parts".to_string()));
    }
    find_model(&request.selected_chat_model).ok_or_else(|| {
        ApiError::BadRequest(format!("Unknown model: {}", request.selected_chat_model))
    })
}

async fn ensure_chat(
    state: &AppState,
    request: &ChatRequest,
    message: &ChatMessage,
) -> Result<(), ApiError> {
    if state.store.get_chat(&request.id).await?.is_none() {
        let chat = Chat::new(
            request.id.clone(),
            derive_title(&message.text()),
            request.selected_visibility_type,
        );
        tracing::info!(chat_id = %chat.id, "creating chat");
        state.store.save_chat(chat).await?;
    }
    Ok(())
}

async fn live_handler(state: AppState, body: &[u8]) -> Result<SseResponse, ApiError> {
    let request: ChatRequest = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))?;
    let model = validate(&request)?;

    let message = ChatMessage::user(request.id.clone())
        .with_id(request.message.id.clone());
    let message = request
        .message
        .parts
        .iter()
        .cloned()
        .fold(message, ChatMessage::with_part);

    ensure_chat(&state, &request, &message).await?;
    // History is read before the save so the prompt always ends with this
    // request's message, whatever other turns land concurrently
    let mut conversation: Vec<ConversationTurn> = state
        .store
        .get_messages(&request.id)
        .await?
        .iter()
        .map(ChatMessage::to_turn)
        .collect();
    state.store.save_message(message.clone()).await?;
    conversation.push(message.to_turn());

    let invocation = match message.image_attachment() {
        Some(image) => {
            let text = message.text();
            Invocation::Describe {
                image_url: image.url.clone(),
                prompt: if text.trim().is_empty() {
                    DEFAULT_IMAGE_PROMPT.to_string()
                } else {
                    text
                },
            }
        }
        None => Invocation::Complete {
            model,
            conversation,
        },
    };

    // Create channel for streaming
    let (tx, rx) = mpsc::channel(16);
    let stream = ReceiverStream::new(rx);
    let chat_id = request.id;

    // Spawn task to handle streaming
    tokio::spawn(async move {
        let message_id = Uuid::new_v4().to_string();
        let _ = tx.send(ProtocolFormatter::format_start(&message_id)).await;

        let reply = match &invocation {
            Invocation::Describe { image_url, prompt } => {
                state.provider.describe_image(image_url, prompt).await
            }
            Invocation::Complete {
                model,
                conversation,
            } => state.provider.call_model(model, conversation).await,
        };

        match reply {
            Ok(text) => {
                for frame in [
                    ProtocolFormatter::format_text(&text),
                    ProtocolFormatter::format_finish("stop"),
                    ProtocolFormatter::format_usage(),
                    ProtocolFormatter::format_done(),
                ] {
                    if let Err(e) = tx.send(frame).await {
                        tracing::debug!("Client went away mid-stream: {}", e);
                        break;
                    }
                }

                let assistant = ChatMessage::assistant(chat_id)
                    .with_id(message_id)
                    .with_text(text);
                if let Err(e) = state.store.save_message(assistant).await {
                    tracing::warn!("Failed to save assistant message: {}", e);
                }
            }
            Err(e) => {
                tracing::debug!("Chat turn failed: {}", e);
                let _ = tx.send(ProtocolFormatter::format_error(&e.to_string())).await;
                let _ = tx.send(ProtocolFormatter::format_done()).await;
            }
        }
    });

    Ok(SseResponse::new(stream))
}

fn mock_reply(body: &[u8]) -> Response {
    let request: MockRequest = serde_json::from_slice(body).unwrap_or_default();
    let user_text = request
        .messages
        .iter()
        .rev()
        .find(|m| m.get("role").and_then(Value::as_str) == Some("user"))
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    let echoed = if user_text.is_empty() {
        "(no message)".to_string()
    } else {
        user_text.chars().take(MOCK_ECHO_CHARS).collect()
    };
    let content = format!("{}{} …", MOCK_REPLY_PREFIX, echoed);
    let now = Utc::now().timestamp_millis();

    (
        [(header::CACHE_CONTROL, "no-store")],
        Json(json!({
            "id": format!("mock-{}", now),
            "created": now,
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        })),
    )
        .into_response()
}

async fn handler(State(state): State<AppState>, body: Bytes) -> Response {
    match state.mode {
        ProviderMode::Mock => mock_reply(&body),
        ProviderMode::Live => live_handler(state, &body).await.into_response(),
    }
}

async fn delete_handler(
    State(state): State<AppState>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<Chat>, ApiError> {
    let id = query
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Parameter id is required".to_string()))?;

    match state.store.delete_chat(&id).await? {
        Some(chat) => {
            tracing::info!(chat_id = %chat.id, "deleted chat");
            Ok(Json(chat))
        }
        None => Err(ApiError::ChatForbidden(id)),
    }
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "ok": true }))
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/chat",
            post(handler).delete(delete_handler).get(health_handler),
        )
        .with_state(state)
}
