//! services/api/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a WebSocket connection.
//! Each connection owns exactly one `PlannerSession`; client frames and the
//! session's own timers are fed to it from a single loop, and its updates are
//! forwarded to the socket by a separate task.

use crate::{
    adapters::CatalogTranslator,
    error::ApiError,
    web::{
        protocol::{ClientMessage, ServerMessage},
        state::AppState,
    },
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use itinerary_planner_core::planner::{PlannerSession, PlannerUpdate};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

type WsSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

#[derive(Deserialize, Debug)]
pub struct WsParams {
    /// Language of the conversation copy, e.g. `en` or `es`.
    lang: Option<String>,
}

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<WsParams>,
) -> Response {
    let language = session_language(params.lang.as_deref(), &app_state.config.default_language);
    ws.on_upgrade(move |socket| handle_socket(socket, app_state, language))
}

/// The catalog language a session will speak, given the requested `?lang=`.
fn session_language(requested: Option<&str>, default_language: &str) -> String {
    let requested = requested
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .unwrap_or(default_language);
    CatalogTranslator::for_language(requested).language().to_string()
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>, language: String) {
    // The sender is wrapped in an Arc<Mutex<>> so the forwarder task and the loop can share it.
    let (sender, mut receiver) = socket.split();
    let ws_sender: WsSender = Arc::new(Mutex::new(sender));

    let (updates_tx, updates_rx) = mpsc::unbounded_channel();
    let (scheduled_tx, mut scheduled_rx) = mpsc::unbounded_channel();
    let mut session = PlannerSession::new(
        app_state.planner_services(&language),
        app_state.config.planner_settings(),
        updates_tx,
        scheduled_tx,
    );
    let conversation_id = session.conversation().id();
    info!(%conversation_id, %language, "New planner connection established.");

    // --- 1. Initialization Phase ---
    let init_msg = ServerMessage::SessionInitialized {
        conversation_id,
        language: language.clone(),
    };
    if let Err(e) = send_message(&ws_sender, &init_msg).await {
        error!("Failed to send session initialized message: {}", e);
        return;
    }

    let forwarder = tokio::spawn(forward_updates(updates_rx, ws_sender.clone()));

    if let Err(e) = session.start().await {
        error!("Failed to start conversation: {}", e);
        forwarder.abort();
        return;
    }

    // --- 2. Main Loop ---
    loop {
        tokio::select! {
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    handle_text_message(text.to_string(), &mut session, &ws_sender).await;
                }
                Some(Ok(Message::Close(_))) => {
                    info!("Client sent close message.");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("WebSocket receive error: {}", e);
                    break;
                }
                None => {
                    info!("Client disconnected.");
                    break;
                }
            },
            Some(event) = scheduled_rx.recv() => {
                let name = event.name();
                if let Err(e) = session.dispatch(event).await {
                    debug!("Scheduled event '{}' no longer applies: {}", name, e);
                }
            }
        }
    }

    // --- 3. Cleanup ---
    drop(session);
    forwarder.abort();
    info!(%conversation_id, "WebSocket connection closed.");
}

/// Applies one client frame to the session, answering with an `error` frame when
/// the frame is malformed or not valid in the current step.
async fn handle_text_message(text: String, session: &mut PlannerSession, ws_sender: &WsSender) {
    let client_msg = match serde_json::from_str::<ClientMessage>(&text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!("Failed to deserialize client message: {}", e);
            reject(ws_sender, format!("Malformed message: {}", e)).await;
            return;
        }
    };

    let event = match client_msg.into_event() {
        Ok(event) => event,
        Err(reason) => {
            reject(ws_sender, reason).await;
            return;
        }
    };

    let name = event.name();
    if let Err(e) = session.dispatch(event).await {
        warn!(step = %session.conversation().step(), event = name, "Rejected client event: {}", e);
        reject(ws_sender, e.to_string()).await;
    }
}

async fn reject(ws_sender: &WsSender, message: String) {
    if let Err(e) = send_message(ws_sender, &ServerMessage::Error { message }).await {
        warn!("Failed to send error frame: {}", e);
    }
}

/// Pushes every planner update to the client, in order.
async fn forward_updates(
    mut updates: mpsc::UnboundedReceiver<PlannerUpdate>,
    ws_sender: WsSender,
) {
    while let Some(update) = updates.recv().await {
        let message = ServerMessage::from(update);
        if let Err(e) = send_message(&ws_sender, &message).await {
            warn!("Failed to forward update, client may have disconnected: {}", e);
            break;
        }
    }
}

async fn send_message(ws_sender: &WsSender, message: &ServerMessage) -> Result<(), ApiError> {
    let json = serde_json::to_string(message).map_err(|e| ApiError::Internal(e.to_string()))?;
    ws_sender
        .lock()
        .await
        .send(Message::Text(json.into()))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_language_reports_the_catalog_in_use() {
        assert_eq!(session_language(Some("es-MX"), "en"), "es");
        assert_eq!(session_language(Some("fr"), "es"), "en");
        assert_eq!(session_language(None, "es"), "es");
        assert_eq!(session_language(Some("  "), "es"), "es");
    }
}
