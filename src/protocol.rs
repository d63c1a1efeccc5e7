//! Wire protocol: frame-delimited JSON over a persistent WebSocket.
//!
//! Every inbound message carries a `method` discriminator. Outbound frames
//! are either a `method`-tagged [`ServerMessage`] or a bare
//! `{code, error}` body for request failures.

use crate::memes::MemeContent;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Identity fields a client supplies when creating or joining a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlayer {
    pub nickname: String,
    pub avatar: String,
}

/// Room settings, supplied on create and on admin updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    pub rounds: u32,
    pub max_players: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum ClientMessage {
    Create {
        admin: NewPlayer,
        game: GameSettings,
    },
    Join {
        #[serde(rename = "gameId")]
        game_id: GameId,
        player: NewPlayer,
    },
    /// Mutate the requester's own identity
    UpdatePlayer {
        #[serde(rename = "updatedPlayer")]
        updated_player: NewPlayer,
    },
    /// Admin-only settings change, lobby only
    UpdateGame {
        #[serde(rename = "updatedGame")]
        updated_game: GameSettings,
    },
    /// Admin-only; requires at least 2 active players
    StartGame,
    SubmitCaption {
        captions: Vec<String>,
    },
    SubmitReview {
        #[serde(rename = "playerToBeReviewedId")]
        player_to_be_reviewed_id: PlayerId,
        like: bool,
    },
    SendMessage {
        content: String,
    },
    /// Admin-only; back to the lobby without destroying the room
    Restart,
    /// Admin-only; tears the room down
    Terminate,
}

/// One submission as shown during the review phase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    pub player: PlayerInfo,
    pub meme: MemeContent,
    pub captions: Vec<String>,
    pub index: usize,
    pub total: usize,
}

/// Per-player outcome of one round, broadcast at result-phase entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MemeResult {
    pub player: PlayerInfo,
    pub meme: MemeContent,
    pub captions: Vec<String>,
    pub upvotes: u32,
    pub downvotes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Direct reply to the creator
    Create {
        game: GameInfo,
        admin: PlayerInfo,
    },
    /// Room-wide; the joiner derives their own record from the last entry
    Join {
        game: GameInfo,
        players: Vec<PlayerInfo>,
    },
    UpdatePlayer {
        #[serde(rename = "updatedPlayer")]
        updated_player: PlayerInfo,
    },
    UpdateGame {
        #[serde(rename = "updatedGame")]
        updated_game: GameInfo,
    },
    /// Sent to each player individually with their own assignment
    StartGame {
        round: u32,
        meme: MemeContent,
    },
    /// Acknowledgment for a caption submission; `success:false` on a
    /// phase mismatch (expected race outcome, not a client bug)
    SubmitCaption {
        success: bool,
    },
    /// Broadcast exactly once per caption phase
    EndCaptionPhase,
    /// Current review item; re-broadcast as the carousel advances
    Review {
        review: ReviewItem,
    },
    SubmitReview {
        success: bool,
    },
    /// Per-round tallies, materialized at result-phase entry
    Result {
        round: u32,
        results: Vec<MemeResult>,
    },
    /// Final standings, sorted by total score descending
    Final {
        players: Vec<PlayerInfo>,
    },
    SendMessage {
        messages: Vec<ChatMessage>,
    },
    Leave {
        player: PlayerInfo,
        #[serde(rename = "restOfPlayers")]
        rest_of_players: Vec<PlayerInfo>,
        #[serde(rename = "newAdmin")]
        new_admin: Option<PlayerInfo>,
        messages: Vec<ChatMessage>,
    },
    Restart {
        game: GameInfo,
        players: Vec<PlayerInfo>,
    },
    Terminate,
}

/// Structured request failure: `{code, error}` with 400/403/404 semantics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub code: u16,
    pub error: String,
}

impl ErrorBody {
    pub fn bad_request(error: impl Into<String>) -> Self {
        Self {
            code: 400,
            error: error.into(),
        }
    }

    pub fn forbidden(error: impl Into<String>) -> Self {
        Self {
            code: 403,
            error: error.into(),
        }
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        Self {
            code: 404,
            error: error.into(),
        }
    }
}

/// Everything the server puts on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outbound {
    Game(ServerMessage),
    Error(ErrorBody),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_decodes_by_method() {
        let frame = r#"{"method":"submitReview","playerToBeReviewedId":"abc","like":true}"#;
        let msg: ClientMessage = serde_json::from_str(frame).unwrap();
        match msg {
            ClientMessage::SubmitReview {
                player_to_be_reviewed_id,
                like,
            } => {
                assert_eq!(player_to_be_reviewed_id, "abc");
                assert!(like);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_error_body_has_no_method_tag() {
        let out = Outbound::Error(ErrorBody::not_found("game not found"));
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["code"], 404);
        assert_eq!(json["error"], "game not found");
        assert!(json.get("method").is_none());
    }

    #[test]
    fn test_server_message_carries_method_tag() {
        let out = Outbound::Game(ServerMessage::Terminate);
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["method"], "terminate");
    }
}
