use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::{Html, Response};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info};

use crate::chatbot::AudioUpdate;
use crate::web::public::ApiError;
use crate::web::state::AppState;
use crate::web::templates::Page;

type SharedState = Arc<AppState>;

pub async fn landing(State(state): State<SharedState>) -> Result<Html<String>, ApiError> {
    info!("Just got a request!");
    let html = state
        .templates
        .render(&Page::Index.to_string(), &state.landing)?;
    Ok(Html(html))
}

/// Run free text through the completion pipeline and return the full answer.
pub async fn gpt(
    State(state): State<SharedState>,
    Path(text): Path<String>,
) -> Result<String, ApiError> {
    info!("🌐 HTTP prompt: {}", text);
    let answer = state.router.answer(&text).await?;
    Ok(answer)
}

pub async fn check_for_updates(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
) -> Response {
    let updates = state.notifier.subscribe();
    ws.on_upgrade(move |socket| forward_updates(socket, updates))
}

/// Push every audio update to the socket until either side goes away.
/// Inbound messages are read and discarded.
async fn forward_updates(mut socket: WebSocket, mut updates: broadcast::Receiver<AudioUpdate>) {
    debug!("WebSocket client connected");
    loop {
        tokio::select! {
            update = updates.recv() => {
                let update = match update {
                    Ok(update) => update,
                    Err(RecvError::Lagged(skipped)) => {
                        debug!("WebSocket listener lagged by {} update(s)", skipped);
                        AudioUpdate { updated: true }
                    }
                    Err(RecvError::Closed) => break,
                };
                let payload = match serde_json::to_string(&update) {
                    Ok(payload) => payload,
                    Err(_) => continue,
                };
                if socket.send(Message::Text(payload.into())).await.is_err() {
                    break;
                }
            }
            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }
    debug!("WebSocket client disconnected");
}
