use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use chatrelay::registry::{ModelDescriptor, DEFAULT_CHAT_MODEL};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ModelsResponse {
    default_model: &'static str,
    models: Vec<ModelDescriptor>,
}

async fn list_handler(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        default_model: DEFAULT_CHAT_MODEL,
        models: state.catalog.models().await,
    })
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/models", get(list_handler))
        .with_state(state)
}
