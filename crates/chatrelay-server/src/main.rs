mod configuration;
mod error;
mod routes;
mod state;

use configuration::{ProviderMode, Settings};
use state::AppState;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let settings = Settings::new()?;
    let mode = settings.provider.mode.resolve(ProviderMode::from_env);
    if mode == ProviderMode::Mock {
        info!("no provider keys configured, answering chats with mock replies");
    }

    let state = AppState::from_settings(&settings, mode).await?;

    // Create router with CORS support
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(settings.server.socket_addr()?).await?;
    info!("listening on {} in {:?} mode", listener.local_addr()?, mode);
    axum::serve(listener, app).await?;
    Ok(())
}
