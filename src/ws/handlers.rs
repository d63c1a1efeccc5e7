//! WebSocket message dispatch
//!
//! Connection identity is resolved here (first create/join binds the
//! connection to a player and room), then each method is dispatched to
//! the matching state operation.

use std::sync::Arc;

use crate::protocol::{ClientMessage, ErrorBody, Outbound};
use crate::state::AppState;
use crate::types::{GameId, PlayerId};

use super::ConnCtx;

/// The (game, player) pair a bound connection acts as.
fn bound(ctx: &ConnCtx) -> Result<(GameId, PlayerId), ErrorBody> {
    match (&ctx.game_id, &ctx.player_id) {
        (Some(game_id), Some(player_id)) => Ok((game_id.clone(), player_id.clone())),
        _ => Err(ErrorBody::bad_request("connection is not part of a game")),
    }
}

fn ack(result: Result<(), ErrorBody>) -> Option<Outbound> {
    match result {
        Ok(()) => None,
        Err(e) => Some(Outbound::Error(e)),
    }
}

/// Handle a client message and return the direct reply, if any.
/// Broadcasts to the rest of the room go out through the registries.
pub async fn handle_message(
    state: &Arc<AppState>,
    ctx: &mut ConnCtx,
    msg: ClientMessage,
) -> Option<Outbound> {
    match msg {
        ClientMessage::Create { admin, game } => {
            if ctx.player_id.is_some() {
                return Some(Outbound::Error(ErrorBody::bad_request(
                    "connection is already in a game",
                )));
            }
            match state.create_game(admin, game, ctx.sender.clone()).await {
                Ok((game_id, player_id, reply)) => {
                    ctx.game_id = Some(game_id);
                    ctx.player_id = Some(player_id);
                    Some(Outbound::Game(reply))
                }
                Err(e) => Some(Outbound::Error(e)),
            }
        }

        ClientMessage::Join { game_id, player } => {
            if ctx.player_id.is_some() {
                return Some(Outbound::Error(ErrorBody::bad_request(
                    "connection is already in a game",
                )));
            }
            match state.join_game(&game_id, player, ctx.sender.clone()).await {
                Ok(player_id) => {
                    // The joiner gets the roster through the room broadcast.
                    ctx.game_id = Some(game_id);
                    ctx.player_id = Some(player_id);
                    None
                }
                Err(e) => Some(Outbound::Error(e)),
            }
        }

        ClientMessage::UpdatePlayer { updated_player } => match bound(ctx) {
            Ok((game_id, player_id)) => {
                ack(state.update_player(&game_id, &player_id, updated_player).await)
            }
            Err(e) => Some(Outbound::Error(e)),
        },

        ClientMessage::UpdateGame { updated_game } => match bound(ctx) {
            Ok((game_id, player_id)) => {
                ack(state.update_game(&game_id, &player_id, updated_game).await)
            }
            Err(e) => Some(Outbound::Error(e)),
        },

        ClientMessage::StartGame => match bound(ctx) {
            Ok((game_id, player_id)) => ack(state.start_game(&game_id, &player_id).await),
            Err(e) => Some(Outbound::Error(e)),
        },

        ClientMessage::SubmitCaption { captions } => match bound(ctx) {
            Ok((game_id, player_id)) => {
                Some(state.submit_caption(&game_id, &player_id, captions).await)
            }
            Err(e) => Some(Outbound::Error(e)),
        },

        ClientMessage::SubmitReview {
            player_to_be_reviewed_id,
            like,
        } => match bound(ctx) {
            Ok((game_id, player_id)) => Some(
                state
                    .submit_review(&game_id, &player_id, player_to_be_reviewed_id, like)
                    .await,
            ),
            Err(e) => Some(Outbound::Error(e)),
        },

        ClientMessage::SendMessage { content } => match bound(ctx) {
            Ok((game_id, player_id)) => ack(state.send_chat(&game_id, &player_id, content).await),
            Err(e) => Some(Outbound::Error(e)),
        },

        ClientMessage::Restart => match bound(ctx) {
            Ok((game_id, player_id)) => ack(state.restart_game(&game_id, &player_id).await),
            Err(e) => Some(Outbound::Error(e)),
        },

        ClientMessage::Terminate => match bound(ctx) {
            Ok((game_id, player_id)) => ack(state.terminate_game(&game_id, &player_id).await),
            Err(e) => Some(Outbound::Error(e)),
        },
    }
}
