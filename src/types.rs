use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type GameId = String;
pub type PlayerId = String;

/// The stages a room moves through during a game.
///
/// `lobby → caption → review → result → {caption | final}`; `restart`
/// returns any phase to `lobby`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Lobby,
    Caption,
    Review,
    Result,
    Final,
}

/// Public view of a player, included in room broadcasts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub nickname: String,
    pub avatar: String,
    pub admin: bool,
    pub in_game: bool,
    pub joined_at: i64,
    pub total_score: i64,
}

/// Public view of a room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameInfo {
    pub id: GameId,
    pub rounds: u32,
    pub max_players: usize,
    /// 0 while the room sits in the lobby (including after a restart);
    /// 1-indexed once play starts
    pub current_round: u32,
    pub phase: Phase,
}

/// A chat line, either written by a player or emitted by the server
/// (leave/admin-succession notices).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub is_system_message: bool,
    pub content: String,
    pub sent_by: Option<PlayerInfo>,
    pub timestamp: i64,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            is_system_message: true,
            content: content.into(),
            sent_by: None,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn from_player(player: PlayerInfo, content: impl Into<String>) -> Self {
        Self {
            is_system_message: false,
            content: content.into(),
            sent_by: Some(player),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Composite key for one cast vote: who it targets and in which round.
///
/// Stored on the voter; one entry per distinct target per round.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VoteKey {
    pub target: PlayerId,
    pub round: u32,
}
