mod game;
mod phases;
mod player;
pub mod score;

pub use game::{Game, PendingTimer};
pub use player::{OutboundSender, Player};

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::memes::MemeProvider;
use crate::types::*;

/// Shared application state: the two process-wide registries plus the
/// injected collaborators.
///
/// Lock discipline: when both registries are needed, `games` is always
/// acquired before `players`, and no lock is ever held across the content
/// provider's await point.
pub struct AppState {
    pub games: RwLock<HashMap<GameId, Game>>,
    pub players: RwLock<HashMap<PlayerId, Player>>,
    pub config: Config,
    pub memes: Box<dyn MemeProvider>,
}

impl AppState {
    pub fn new(config: Config, memes: Box<dyn MemeProvider>) -> Self {
        Self {
            games: RwLock::new(HashMap::new()),
            players: RwLock::new(HashMap::new()),
            config,
            memes,
        }
    }
}
