//! Manages the WebSocket connection lifecycle for one conversation.
//!
//! Each connection owns exactly one `Conversation`: constructed after the
//! `init` handshake, mutated one utterance at a time, dropped when the
//! socket closes. The shared order ledger is locked only for the duration
//! of a turn, so appends from concurrent conversations stay serialized.

use super::protocol::{ClientMessage, ConversationMode, ServerMessage};
use crate::state::AppState;
use anyhow::{Result, anyhow};
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use pantry_core::agent::{Conversation, TurnContext};
use std::sync::Arc;
use tracing::{Instrument, error, info, instrument, warn};
use uuid::Uuid;

/// Axum handler to upgrade an HTTP connection to a WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Entry point for a new connection: performs the init handshake, then runs
/// the turn loop until the runtime disconnects.
#[instrument(name = "ws_session", skip_all, fields(session_id))]
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id = Uuid::new_v4();
    tracing::Span::current().record("session_id", session_id.to_string());
    info!("New WebSocket connection. Awaiting init...");

    let (mut socket_tx, mut socket_rx) = socket.split();

    let mode = match read_init(&mut socket_rx).await {
        Ok(mode) => mode,
        Err(e) => {
            warn!("Session initialization failed: {:?}", e);
            let _ = send_msg(
                &mut socket_tx,
                ServerMessage::Error {
                    message: e.to_string(),
                },
            )
            .await;
            return;
        }
    };

    let conversation = match mode {
        ConversationMode::Shopping => Conversation::shopping(),
        ConversationMode::Improv => Conversation::improv(state.config.improv_max_rounds),
    };

    if send_msg(
        &mut socket_tx,
        ServerMessage::Initialized {
            session_id,
            mode,
            greeting: conversation.greeting(),
        },
    )
    .await
    .is_err()
    {
        error!("Failed to send Initialized message to client.");
        return;
    }

    let session_span = tracing::info_span!("conversation", %session_id, ?mode);
    async {
        if let Err(e) = run_conversation(state, socket_tx, socket_rx, conversation).await {
            error!(error = ?e, "Conversation terminated with error.");
        }
        info!("Conversation finished.");
    }
    .instrument(session_span)
    .await;
}

/// The first message from the client must be an `init` message.
async fn read_init(socket_rx: &mut SplitStream<WebSocket>) -> Result<ConversationMode> {
    let ws_msg = socket_rx
        .next()
        .await
        .ok_or_else(|| anyhow!("Client disconnected before sending init message."))??;
    let text = match ws_msg {
        Message::Text(text) => text,
        _ => return Err(anyhow!("First message was not a text `init` message.")),
    };
    match serde_json::from_str::<ClientMessage>(&text)? {
        ClientMessage::Init { mode } => Ok(mode),
        _ => Err(anyhow!("First message must be `init`.")),
    }
}

/// The main turn loop: one utterance in, one reply out, until disconnect.
async fn run_conversation(
    state: Arc<AppState>,
    mut socket_tx: SplitSink<WebSocket, Message>,
    mut socket_rx: SplitStream<WebSocket>,
    mut conversation: Conversation,
) -> Result<()> {
    while let Some(msg_result) = socket_rx.next().await {
        match msg_result {
            Ok(ws_msg) => match ws_msg {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::UserMessage { text }) => {
                        let ctx = TurnContext {
                            catalog: &state.catalog,
                            recipes: &state.recipes,
                            currency: &state.config.currency,
                        };
                        let reply = {
                            let mut ledger = state.ledger.lock().await;
                            conversation.handle_utterance(&text, &ctx, &mut *ledger).await
                        };
                        send_msg(&mut socket_tx, ServerMessage::Reply { text: reply }).await?;
                    }
                    Ok(ClientMessage::Init { .. }) => {
                        warn!("Ignoring duplicate init message post-handshake.");
                        send_msg(
                            &mut socket_tx,
                            ServerMessage::Error {
                                message: "Session is already initialized.".to_string(),
                            },
                        )
                        .await?;
                    }
                    Err(e) => {
                        warn!(error = %e, "Discarding malformed client message.");
                        send_msg(
                            &mut socket_tx,
                            ServerMessage::Error {
                                message: "Malformed message.".to_string(),
                            },
                        )
                        .await?;
                    }
                },
                Message::Close(_) => {
                    info!("Client sent close frame. Shutting down session.");
                    break;
                }
                Message::Binary(_) => {
                    warn!("Ignoring binary frame; this boundary is text-only.");
                }
                Message::Ping(_) | Message::Pong(_) => {}
            },
            Err(e) => {
                error!("Error receiving from client WebSocket: {:?}", e);
                break;
            }
        }
    }
    info!("WebSocket connection closed.");
    Ok(())
}

/// A helper function to serialize and send a `ServerMessage` to the client.
pub(crate) async fn send_msg(
    socket_tx: &mut SplitSink<WebSocket, Message>,
    msg: ServerMessage,
) -> Result<()> {
    let serialized = serde_json::to_string(&msg)?;
    socket_tx.send(Message::Text(serialized.into())).await?;
    Ok(())
}
