use std::collections::HashMap;

use tokio::task::JoinHandle;

use crate::protocol::{ErrorBody, GameSettings, NewPlayer, Outbound, ServerMessage};
use crate::state::{score, AppState, OutboundSender, Player};
use crate::types::*;

/// The single live deadline for a room. Scheduling a new one always
/// replaces (and aborts) the previous one; handles are never stacked.
#[derive(Debug)]
pub struct PendingTimer {
    pub handle: JoinHandle<()>,
    /// Phase and round the timer was armed for, kept for logging
    pub phase: Phase,
    pub round: u32,
}

/// One room: membership, phase machine state, and the pending deadline.
#[derive(Debug)]
pub struct Game {
    pub id: GameId,
    pub rounds: u32,
    pub max_players: usize,
    /// 1-indexed once play starts; 0 while in the lobby
    pub current_round: u32,
    pub phase: Phase,
    /// Ordered membership; insertion order decides admin succession ties
    pub players: Vec<PlayerId>,
    /// Fixed per-round review sequence, shuffled once at review entry
    pub review_order: Vec<PlayerId>,
    pub review_index: usize,
    pub pending_timer: Option<PendingTimer>,
}

impl Game {
    pub fn new(rounds: u32, max_players: usize) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            rounds,
            max_players,
            current_round: 0,
            phase: Phase::Lobby,
            players: Vec::new(),
            review_order: Vec::new(),
            review_index: 0,
            pending_timer: None,
        }
    }

    pub fn info(&self) -> GameInfo {
        GameInfo {
            id: self.id.clone(),
            rounds: self.rounds,
            max_players: self.max_players,
            current_round: self.current_round,
            phase: self.phase,
        }
    }

    /// Abort the pending deadline, if any. Every phase entry point must
    /// call this before scheduling its own timer.
    pub fn clear_timer(&mut self) {
        if let Some(timer) = self.pending_timer.take() {
            tracing::debug!(
                "Game {}: cancelled pending {:?} timer for round {}",
                self.id,
                timer.phase,
                timer.round
            );
            timer.handle.abort();
        }
    }

    pub fn add_player(&mut self, player_id: PlayerId) {
        self.players.push(player_id);
    }

    /// Members still connected and participating.
    pub fn active_players<'a>(
        &'a self,
        players: &'a HashMap<PlayerId, Player>,
    ) -> impl Iterator<Item = &'a Player> {
        self.players
            .iter()
            .filter_map(|id| players.get(id))
            .filter(|p| p.in_game)
    }

    pub fn active_count(&self, players: &HashMap<PlayerId, Player>) -> usize {
        self.active_players(players).count()
    }

    /// Earliest-joined active member; deterministic successor for the
    /// admin role.
    pub fn earliest_active_player<'a>(
        &'a self,
        players: &'a HashMap<PlayerId, Player>,
    ) -> Option<&'a Player> {
        self.active_players(players).min_by_key(|p| p.joined_at)
    }

    /// Public views for every retained member, scores included.
    pub fn players_infos(&self, players: &HashMap<PlayerId, Player>) -> Vec<PlayerInfo> {
        self.players
            .iter()
            .filter_map(|id| players.get(id))
            .map(|p| p.info(score::total_score(self, players, &p.id)))
            .collect()
    }

    /// Serialize once, then fan out to every member's connection.
    pub fn broadcast(&self, players: &HashMap<PlayerId, Player>, message: &Outbound) {
        let json = match serde_json::to_string(message) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize broadcast: {}", e);
                return;
            }
        };
        for id in &self.players {
            if let Some(player) = players.get(id) {
                player.send_raw(json.clone());
            }
        }
    }
}

impl AppState {
    /// Create a new room; the creator becomes its admin.
    /// Returns the ids to bind to the connection plus the direct reply.
    pub async fn create_game(
        &self,
        admin: NewPlayer,
        settings: GameSettings,
        sender: OutboundSender,
    ) -> Result<(GameId, PlayerId, ServerMessage), ErrorBody> {
        if settings.rounds < 1 {
            return Err(ErrorBody::bad_request("rounds must be at least 1"));
        }
        if settings.max_players < 2 {
            return Err(ErrorBody::bad_request("maxPlayers must be at least 2"));
        }

        let mut game = Game::new(settings.rounds, settings.max_players);
        let player = Player::new(admin.nickname, admin.avatar, true, game.id.clone(), sender);
        game.add_player(player.id.clone());

        let reply = ServerMessage::Create {
            game: game.info(),
            admin: player.info(0),
        };
        let (game_id, player_id) = (game.id.clone(), player.id.clone());

        self.games.write().await.insert(game_id.clone(), game);
        self.players.write().await.insert(player_id.clone(), player);

        tracing::info!("Game {} was created by player {}.", game_id, player_id);
        Ok((game_id, player_id, reply))
    }

    /// Join an existing room; rejected when unknown, full, or already
    /// past the lobby. Broadcasts the updated member list to the room.
    pub async fn join_game(
        &self,
        game_id: &GameId,
        identity: NewPlayer,
        sender: OutboundSender,
    ) -> Result<PlayerId, ErrorBody> {
        let mut games = self.games.write().await;
        let mut players = self.players.write().await;

        let Some(game) = games.get_mut(game_id) else {
            return Err(ErrorBody::not_found("game not found"));
        };
        if game.phase != Phase::Lobby {
            return Err(ErrorBody::bad_request("game already started"));
        }
        if game.active_count(&players) >= game.max_players {
            return Err(ErrorBody::bad_request("game is full"));
        }

        let player = Player::new(identity.nickname, identity.avatar, false, game.id.clone(), sender);
        let player_id = player.id.clone();
        game.add_player(player_id.clone());
        players.insert(player_id.clone(), player);

        let message = Outbound::Game(ServerMessage::Join {
            game: game.info(),
            players: game.players_infos(&players),
        });
        game.broadcast(&players, &message);

        tracing::info!("Player {} joined game {}.", player_id, game.id);
        Ok(player_id)
    }

    /// Admin-only settings change, lobby only.
    pub async fn update_game(
        &self,
        game_id: &GameId,
        requester: &PlayerId,
        settings: GameSettings,
    ) -> Result<(), ErrorBody> {
        let mut games = self.games.write().await;
        let players = self.players.read().await;

        let Some(game) = games.get_mut(game_id) else {
            return Err(ErrorBody::not_found("game not found"));
        };
        let is_admin = players.get(requester).map(|p| p.admin).unwrap_or(false);
        if !is_admin {
            return Err(ErrorBody::forbidden("only the admin can update the game"));
        }
        if game.phase != Phase::Lobby {
            return Err(ErrorBody::bad_request("settings can only change in the lobby"));
        }
        if settings.rounds < 1 {
            return Err(ErrorBody::bad_request("rounds must be at least 1"));
        }
        if settings.max_players < game.players.len() {
            return Err(ErrorBody::bad_request(
                "maxPlayers cannot be below the current member count",
            ));
        }

        game.rounds = settings.rounds;
        game.max_players = settings.max_players;

        let message = Outbound::Game(ServerMessage::UpdateGame {
            updated_game: game.info(),
        });
        game.broadcast(&players, &message);

        tracing::info!("Game {} got updated with {:?}.", game.id, settings);
        Ok(())
    }

    /// Room-wide chat broadcast.
    pub async fn send_chat(
        &self,
        game_id: &GameId,
        player_id: &PlayerId,
        content: String,
    ) -> Result<(), ErrorBody> {
        let games = self.games.read().await;
        let players = self.players.read().await;

        let Some(game) = games.get(game_id) else {
            return Err(ErrorBody::not_found("game not found"));
        };
        let Some(player) = players.get(player_id) else {
            return Err(ErrorBody::not_found("player not found"));
        };

        let chat = ChatMessage::from_player(
            player.info(score::total_score(game, &players, player_id)),
            content,
        );
        let message = Outbound::Game(ServerMessage::SendMessage {
            messages: vec![chat],
        });
        game.broadcast(&players, &message);
        Ok(())
    }
}
