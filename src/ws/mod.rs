pub mod handlers;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::protocol::ClientMessage;
use crate::state::{AppState, OutboundSender};
use crate::types::{GameId, PlayerId};

/// What a single connection knows about itself. The ids are bound by the
/// first successful create or join and never rebound afterwards.
pub struct ConnCtx {
    pub player_id: Option<PlayerId>,
    pub game_id: Option<GameId>,
    pub sender: OutboundSender,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let mut ctx = ConnCtx {
        player_id: None,
        game_id: None,
        sender: tx,
    };

    tracing::info!("WebSocket connected");

    loop {
        tokio::select! {
            // Frames queued for this connection (replies and room broadcasts)
            outbound = rx.recv() => {
                match outbound {
                    Some(json) => {
                        if sink.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            // Client frames
            ws_msg = stream.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received message: {}", text);

                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                if let Some(response) =
                                    handlers::handle_message(&state, &mut ctx, client_msg).await
                                {
                                    if let Ok(json) = serde_json::to_string(&response) {
                                        if sink.send(Message::Text(json.into())).await.is_err() {
                                            break;
                                        }
                                    }
                                }
                            }
                            // Malformed frames are dropped without a reply.
                            Err(e) => {
                                tracing::debug!("Ignoring unparsable frame: {}", e);
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket closed");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sink.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    if let (Some(player_id), Some(game_id)) = (&ctx.player_id, &ctx.game_id) {
        state.handle_disconnect(player_id, game_id).await;
    }
    tracing::info!("WebSocket connection closed");
}
