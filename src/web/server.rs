use std::sync::Arc;

use axum::Router;
use axum::routing::{any, get};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::routes;
use crate::web::state::AppState;

pub fn app(shared_state: Arc<AppState>) -> Router {
    let public = ServeDir::new(&shared_state.public_dir);

    Router::new()
        .route("/", any(routes::landing))
        .route("/gpt/{text}", get(routes::gpt))
        .route("/check-for-updates", get(routes::check_for_updates))
        // Static assets, including the synthesized audio
        .nest_service("/public", public)
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state)
}

// Run the server
pub async fn serve(port: u16, shared_state: Arc<AppState>) {
    let app = app(shared_state);

    let listener = match tokio::net::TcpListener::bind(("0.0.0.0", port)).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind port {}: {}", port, e);
            return;
        }
    };

    info!("🌐 Server running on port {}", port);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
    }
}
