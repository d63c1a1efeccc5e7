use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::memes::MemeContent;
use crate::protocol::{ErrorBody, NewPlayer, Outbound, ServerMessage};
use crate::state::{score, AppState};
use crate::types::*;

/// Outbound channel for one connection; frames are pre-serialized JSON.
pub type OutboundSender = mpsc::UnboundedSender<String>;

/// Per-connection participant state.
///
/// A player who disconnects mid-round is kept with `in_game = false` so
/// votes and submissions referencing them stay valid; only lobby-phase
/// departures are purged outright.
#[derive(Debug)]
pub struct Player {
    pub id: PlayerId,
    pub nickname: String,
    pub avatar: String,
    pub admin: bool,
    pub in_game: bool,
    pub joined_at: i64,
    pub game_id: GameId,
    /// Assigned content for the current round; None outside caption play
    pub current_meme: Option<MemeContent>,
    /// Submitted caption strings, one per slot; None until submitted
    pub current_captions: Option<Vec<String>>,
    /// Votes this player cast, keyed by (target, round)
    pub votes: HashMap<VoteKey, bool>,
    sender: OutboundSender,
}

impl Player {
    pub fn new(
        nickname: String,
        avatar: String,
        admin: bool,
        game_id: GameId,
        sender: OutboundSender,
    ) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            nickname,
            avatar,
            admin,
            in_game: true,
            joined_at: chrono::Utc::now().timestamp_millis(),
            game_id,
            current_meme: None,
            current_captions: None,
            votes: HashMap::new(),
            sender,
        }
    }

    /// Public view; the caller supplies the derived total score.
    pub fn info(&self, total_score: i64) -> PlayerInfo {
        PlayerInfo {
            id: self.id.clone(),
            nickname: self.nickname.clone(),
            avatar: self.avatar.clone(),
            admin: self.admin,
            in_game: self.in_game,
            joined_at: self.joined_at,
            total_score,
        }
    }

    /// Serialize and queue one frame for this player's connection.
    /// A closed channel only means the socket already went away.
    pub fn send(&self, message: &Outbound) {
        match serde_json::to_string(message) {
            Ok(json) => {
                let _ = self.sender.send(json);
            }
            Err(e) => tracing::error!("Failed to serialize outbound message: {}", e),
        }
    }

    /// Queue an already-serialized frame (used by room broadcasts).
    pub fn send_raw(&self, json: String) {
        let _ = self.sender.send(json);
    }
}

impl AppState {
    /// Change the requester's own nickname or avatar.
    pub async fn update_player(
        &self,
        game_id: &GameId,
        player_id: &PlayerId,
        identity: NewPlayer,
    ) -> Result<(), ErrorBody> {
        let games = self.games.read().await;
        let mut players = self.players.write().await;

        let Some(game) = games.get(game_id) else {
            return Err(ErrorBody::not_found("game not found"));
        };
        {
            let Some(player) = players.get_mut(player_id) else {
                return Err(ErrorBody::not_found("player not found"));
            };
            player.nickname = identity.nickname;
            player.avatar = identity.avatar;
        }

        let updated = players
            .get(player_id)
            .map(|p| p.info(score::total_score(game, &players, player_id)));
        if let Some(updated_player) = updated {
            let message = Outbound::Game(ServerMessage::UpdatePlayer { updated_player });
            game.broadcast(&players, &message);
        }
        Ok(())
    }

    /// A connection went away. Lobby departures are purged outright;
    /// mid-game departures stay on the roster with `in_game = false` so
    /// their votes and submissions remain addressable. The admin role
    /// passes to the earliest-joined remaining player, and an empty room
    /// is torn down entirely.
    pub async fn handle_disconnect(self: &Arc<Self>, player_id: &PlayerId, game_id: &GameId) {
        let mut finish_caption_round = None;

        {
            let mut games = self.games.write().await;
            let mut players = self.players.write().await;

            let Some(game) = games.get_mut(game_id) else {
                players.remove(player_id);
                return;
            };

            let (mut left_info, was_admin) = {
                let Some(player) = players.get_mut(player_id) else {
                    return;
                };
                let was_admin = player.admin;
                player.in_game = false;
                player.admin = false;
                (player.info(0), was_admin)
            };
            left_info.total_score = score::total_score(game, &players, player_id);

            if game.phase == Phase::Lobby {
                game.players.retain(|id| id != player_id);
                players.remove(player_id);
            }

            if game.active_count(&players) == 0 {
                tracing::info!("Game {} is empty, tearing it down.", game.id);
                game.clear_timer();
                let member_ids = game.players.clone();
                games.remove(game_id);
                for id in member_ids {
                    players.remove(&id);
                }
                return;
            }

            let new_admin = if was_admin {
                match game.earliest_active_player(&players).map(|p| p.id.clone()) {
                    Some(id) => {
                        if let Some(successor) = players.get_mut(&id) {
                            successor.admin = true;
                        }
                        players
                            .get(&id)
                            .map(|p| p.info(score::total_score(game, &players, &id)))
                    }
                    None => None,
                }
            } else {
                None
            };

            let mut messages = vec![ChatMessage::system(format!(
                "{} left the game.",
                left_info.nickname
            ))];
            if let Some(admin) = &new_admin {
                messages.push(ChatMessage::system(format!(
                    "{} is now the admin.",
                    admin.nickname
                )));
            }
            let message = Outbound::Game(ServerMessage::Leave {
                player: left_info,
                rest_of_players: game.players_infos(&players),
                new_admin,
                messages,
            });
            game.broadcast(&players, &message);

            // A departure can be the last missing submission.
            if game.phase == Phase::Caption
                && game
                    .active_players(&players)
                    .all(|p| p.current_captions.is_some())
            {
                finish_caption_round = Some(game.current_round);
            }

            tracing::info!("Player {} left game {}.", player_id, game.id);
        }

        if let Some(round) = finish_caption_round {
            self.end_caption_phase(game_id, round).await;
        }
    }
}
