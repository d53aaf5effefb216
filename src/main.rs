use axum::{routing::get, Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use undercover::room::cleanup_task::{start_cleanup_task, CleanupConfig};
use undercover::room::{InMemoryRoomRepository, RoomRepository, RoomService};
use undercover::shared::AppState;
use undercover::websockets::{
    websocket_handler, ConnectionManager, InMemoryConnectionManager, WsGateway,
};
use undercover::websockets::gateway::BroadcastGateway;
use undercover::words::{BuiltinWordBank, WordSource};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "undercover=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Undercover game server");

    // Wire up shared state. Each seam is a trait so tests can swap pieces.
    let room_repository: Arc<dyn RoomRepository> = Arc::new(InMemoryRoomRepository::new());
    let connection_manager: Arc<dyn ConnectionManager> =
        Arc::new(InMemoryConnectionManager::new());
    let gateway: Arc<dyn BroadcastGateway> = Arc::new(WsGateway::new(connection_manager.clone()));
    let words: Arc<dyn WordSource> = Arc::new(BuiltinWordBank);
    let room_service = Arc::new(RoomService::new(
        room_repository.clone(),
        words,
        gateway.clone(),
    ));

    let app_state = AppState::new(
        room_service,
        room_repository.clone(),
        connection_manager,
        gateway,
    );

    // Reap rooms nobody has touched in a while.
    tokio::spawn(start_cleanup_task(room_repository, CleanupConfig::default()));

    let app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/ws", get(websocket_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind listener");
    info!(addr = %addr, "Server running");
    axum::serve(listener, app).await.expect("server error");
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "service": "undercover" }))
}
