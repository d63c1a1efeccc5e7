//! The per-room phase machine.
//!
//! Every phase transition funnels through one guarded entry point that
//! re-checks the room is still in the (phase, round) the trigger was armed
//! for. Timer fires and player actions race freely; whichever loses the
//! race becomes a logged no-op instead of a double transition.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;

use crate::memes::MemeContent;
use crate::protocol::{ErrorBody, Outbound, ReviewItem, ServerMessage};
use crate::state::{score, AppState, Game, PendingTimer, Player};
use crate::types::*;

/// What a deadline does when it fires. Each variant carries the round
/// (and review position) it was armed for, so a fire that lost the race
/// against a player-driven transition no longer matches and does nothing.
#[derive(Debug, Clone, Copy)]
pub enum TimerFire {
    EndCaption { round: u32 },
    AdvanceReview { round: u32, index: usize },
    EndResult { round: u32 },
}

impl AppState {
    /// Arm the room's single deadline, replacing whatever was pending.
    fn schedule_deadline(self: &Arc<Self>, game: &mut Game, duration: Duration, fire: TimerFire) {
        game.clear_timer();
        let state = Arc::clone(self);
        let game_id = game.id.clone();
        let (phase, round) = (game.phase, game.current_round);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            match fire {
                TimerFire::EndCaption { round } => state.end_caption_phase(&game_id, round).await,
                TimerFire::AdvanceReview { round, index } => {
                    state.advance_review(&game_id, round, index).await
                }
                TimerFire::EndResult { round } => state.end_result_phase(&game_id, round).await,
            }
        });
        game.pending_timer = Some(PendingTimer {
            handle,
            phase,
            round,
        });
    }

    /// Admin starts the game from the lobby. Content is fetched with no
    /// lock held; since the room stays joinable during the fetch, the
    /// loop re-validates the membership after relocking and fetches
    /// again whenever the active count moved under it.
    pub async fn start_game(
        self: &Arc<Self>,
        game_id: &GameId,
        requester: &PlayerId,
    ) -> Result<(), ErrorBody> {
        loop {
            let needed = {
                let games = self.games.read().await;
                let players = self.players.read().await;

                let Some(game) = games.get(game_id) else {
                    return Err(ErrorBody::not_found("game not found"));
                };
                let is_admin = players.get(requester).map(|p| p.admin).unwrap_or(false);
                if !is_admin {
                    return Err(ErrorBody::forbidden("only the admin can start the game"));
                }
                if game.phase != Phase::Lobby {
                    return Err(ErrorBody::bad_request("game already started"));
                }
                let active = game.active_count(&players);
                if active < 2 {
                    return Err(ErrorBody::bad_request(
                        "at least 2 players are needed to start",
                    ));
                }
                active
            };

            let memes = self
                .memes
                .get_random_memes(needed)
                .await
                .map_err(|e| ErrorBody::bad_request(e.to_string()))?;

            let mut games = self.games.write().await;
            let mut players = self.players.write().await;
            let Some(game) = games.get_mut(game_id) else {
                return Err(ErrorBody::not_found("game not found"));
            };
            if game.phase != Phase::Lobby {
                return Err(ErrorBody::bad_request("game already started"));
            }
            if game.active_count(&players) != needed {
                tracing::debug!(
                    "Game {}: membership changed during content fetch, retrying",
                    game.id
                );
                continue;
            }

            game.current_round = 1;
            self.enter_caption(game, &mut players, memes);
            tracing::info!("Game {} started.", game.id);
            return Ok(());
        }
    }

    /// Deal one meme to each active player, tell everyone their own
    /// assignment, and arm the caption deadline.
    fn enter_caption(
        self: &Arc<Self>,
        game: &mut Game,
        players: &mut HashMap<PlayerId, Player>,
        memes: Vec<MemeContent>,
    ) {
        for id in &game.players {
            if let Some(player) = players.get_mut(id) {
                player.current_meme = None;
                player.current_captions = None;
            }
        }

        let active_ids: Vec<PlayerId> = game
            .active_players(players)
            .map(|p| p.id.clone())
            .collect();
        let round = game.current_round;
        for (id, meme) in active_ids.into_iter().zip(memes) {
            if let Some(player) = players.get_mut(&id) {
                player.current_meme = Some(meme.clone());
                player.send(&Outbound::Game(ServerMessage::StartGame { round, meme }));
            }
        }

        game.phase = Phase::Caption;
        game.review_order.clear();
        game.review_index = 0;
        let deadline = self.config.timings.caption;
        self.schedule_deadline(game, deadline, TimerFire::EndCaption { round });
    }

    /// Store a player's captions. A phase mismatch is the expected
    /// outcome of losing a race against the deadline and only downgrades
    /// the acknowledgment; a slot-count mismatch is a client error.
    pub async fn submit_caption(
        self: &Arc<Self>,
        game_id: &GameId,
        player_id: &PlayerId,
        captions: Vec<String>,
    ) -> Outbound {
        let finish_round = {
            let games = self.games.read().await;
            let mut players = self.players.write().await;

            let Some(game) = games.get(game_id) else {
                return Outbound::Error(ErrorBody::not_found("game not found"));
            };
            if game.phase != Phase::Caption {
                return Outbound::Game(ServerMessage::SubmitCaption { success: false });
            }

            {
                let Some(player) = players.get_mut(player_id) else {
                    return Outbound::Error(ErrorBody::not_found("player not found"));
                };
                let Some(meme) = &player.current_meme else {
                    return Outbound::Error(ErrorBody::bad_request(
                        "no meme assigned for this round",
                    ));
                };
                if captions.len() != meme.captions.len() {
                    return Outbound::Error(ErrorBody::bad_request(format!(
                        "expected {} captions, got {}",
                        meme.captions.len(),
                        captions.len()
                    )));
                }
                player.current_captions = Some(captions);
            }

            let all_submitted = game
                .active_players(&players)
                .all(|p| p.current_captions.is_some());
            all_submitted.then_some(game.current_round)
        };

        if let Some(round) = finish_round {
            self.end_caption_phase(game_id, round).await;
        }
        Outbound::Game(ServerMessage::SubmitCaption { success: true })
    }

    /// Close the caption phase for `round` and open the review carousel.
    /// Both the deadline and the everyone-submitted path land here; the
    /// guard makes the second arrival a no-op.
    pub async fn end_caption_phase(self: &Arc<Self>, game_id: &GameId, round: u32) {
        let mut games = self.games.write().await;
        let mut players = self.players.write().await;

        let Some(game) = games.get_mut(game_id) else {
            return;
        };
        if game.phase != Phase::Caption || game.current_round != round {
            tracing::debug!(
                "Game {}: stale caption-end for round {} ignored",
                game.id,
                round
            );
            return;
        }
        game.clear_timer();

        let mut order: Vec<PlayerId> = game
            .players
            .iter()
            .filter_map(|id| players.get(id))
            .filter(|p| p.current_meme.is_some())
            .map(|p| p.id.clone())
            .collect();
        order.shuffle(&mut rand::rng());
        game.review_order = order;
        game.review_index = 0;

        game.broadcast(&players, &Outbound::Game(ServerMessage::EndCaptionPhase));

        if game.review_order.is_empty() {
            self.enter_result(game, &mut players);
            return;
        }

        game.phase = Phase::Review;
        broadcast_review_item(game, &players);
        let deadline = self.config.timings.review;
        self.schedule_deadline(game, deadline, TimerFire::AdvanceReview { round, index: 1 });
        tracing::debug!(
            "Game {}: review started with {} submissions",
            game.id,
            game.review_order.len()
        );
    }

    /// Move the review carousel to position `index`. Only the fire armed
    /// for the position right after the current one is honored.
    pub async fn advance_review(self: &Arc<Self>, game_id: &GameId, round: u32, index: usize) {
        let mut games = self.games.write().await;
        let mut players = self.players.write().await;

        let Some(game) = games.get_mut(game_id) else {
            return;
        };
        if game.phase != Phase::Review
            || game.current_round != round
            || index != game.review_index + 1
        {
            tracing::debug!(
                "Game {}: stale review advance to {} ignored",
                game.id,
                index
            );
            return;
        }
        game.clear_timer();

        if index >= game.review_order.len() {
            self.enter_result(game, &mut players);
            return;
        }

        game.review_index = index;
        broadcast_review_item(game, &players);
        let deadline = self.config.timings.review;
        self.schedule_deadline(
            game,
            deadline,
            TimerFire::AdvanceReview {
                round,
                index: index + 1,
            },
        );
    }

    /// Record one review vote. Self-votes and repeat votes for the same
    /// (target, round) keep the ledger append-only and are acknowledged
    /// with `success:false`.
    pub async fn submit_review(
        &self,
        game_id: &GameId,
        voter_id: &PlayerId,
        target: PlayerId,
        like: bool,
    ) -> Outbound {
        let games = self.games.read().await;
        let mut players = self.players.write().await;

        let Some(game) = games.get(game_id) else {
            return Outbound::Error(ErrorBody::not_found("game not found"));
        };
        if game.phase != Phase::Review {
            return Outbound::Game(ServerMessage::SubmitReview { success: false });
        }
        if !game.players.contains(&target) || !players.contains_key(&target) {
            return Outbound::Error(ErrorBody::not_found("player not found"));
        }
        if *voter_id == target {
            return Outbound::Game(ServerMessage::SubmitReview { success: false });
        }

        let Some(voter) = players.get_mut(voter_id) else {
            return Outbound::Error(ErrorBody::not_found("player not found"));
        };
        let key = VoteKey {
            target,
            round: game.current_round,
        };
        if voter.votes.contains_key(&key) {
            return Outbound::Game(ServerMessage::SubmitReview { success: false });
        }
        voter.votes.insert(key, like);
        Outbound::Game(ServerMessage::SubmitReview { success: true })
    }

    /// Materialize the round's tallies, broadcast them, and arm the
    /// result deadline.
    fn enter_result(self: &Arc<Self>, game: &mut Game, players: &mut HashMap<PlayerId, Player>) {
        game.clear_timer();
        game.phase = Phase::Result;
        let round = game.current_round;
        let results = score::round_results(game, players, round);
        game.broadcast(
            players,
            &Outbound::Game(ServerMessage::Result { round, results }),
        );
        let deadline = self.config.timings.result;
        self.schedule_deadline(game, deadline, TimerFire::EndResult { round });
    }

    /// Leave the result phase: either deal the next round or, after the
    /// last round, publish the final standings.
    pub async fn end_result_phase(self: &Arc<Self>, game_id: &GameId, round: u32) {
        let needed = {
            let mut games = self.games.write().await;
            let players = self.players.read().await;

            let Some(game) = games.get_mut(game_id) else {
                return;
            };
            if game.phase != Phase::Result || game.current_round != round {
                tracing::debug!(
                    "Game {}: stale result-end for round {} ignored",
                    game.id,
                    round
                );
                return;
            }
            game.clear_timer();

            if round >= game.rounds {
                game.phase = Phase::Final;
                let mut standings = game.players_infos(&players);
                standings.sort_by(|a, b| b.total_score.cmp(&a.total_score));
                game.broadcast(
                    &players,
                    &Outbound::Game(ServerMessage::Final { players: standings }),
                );
                tracing::info!("Game {} finished after {} rounds.", game.id, round);
                return;
            }
            game.active_count(&players)
        };

        let memes = match self.memes.get_random_memes(needed).await {
            Ok(memes) => memes,
            Err(e) => {
                tracing::error!("Game {}: could not deal round {}: {}", game_id, round + 1, e);
                return;
            }
        };

        let mut games = self.games.write().await;
        let mut players = self.players.write().await;
        let Some(game) = games.get_mut(game_id) else {
            return;
        };
        if game.phase != Phase::Result || game.current_round != round {
            return;
        }
        game.current_round = round + 1;
        self.enter_caption(game, &mut players, memes);
    }

    /// Admin sends everyone back to the lobby. Round state is wiped,
    /// departed members are purged, and scores reset with the votes.
    pub async fn restart_game(
        &self,
        game_id: &GameId,
        requester: &PlayerId,
    ) -> Result<(), ErrorBody> {
        let mut games = self.games.write().await;
        let mut players = self.players.write().await;

        let Some(game) = games.get_mut(game_id) else {
            return Err(ErrorBody::not_found("game not found"));
        };
        let is_admin = players.get(requester).map(|p| p.admin).unwrap_or(false);
        if !is_admin {
            return Err(ErrorBody::forbidden("only the admin can restart the game"));
        }

        game.clear_timer();
        game.phase = Phase::Lobby;
        game.current_round = 0;
        game.review_order.clear();
        game.review_index = 0;

        let departed: Vec<PlayerId> = game
            .players
            .iter()
            .filter(|id| players.get(*id).map(|p| !p.in_game).unwrap_or(true))
            .cloned()
            .collect();
        for id in &departed {
            players.remove(id);
        }
        game.players.retain(|id| !departed.contains(id));

        for id in &game.players {
            if let Some(player) = players.get_mut(id) {
                player.votes.clear();
                player.current_meme = None;
                player.current_captions = None;
            }
        }

        let message = Outbound::Game(ServerMessage::Restart {
            game: game.info(),
            players: game.players_infos(&players),
        });
        game.broadcast(&players, &message);
        tracing::info!("Game {} restarted.", game.id);
        Ok(())
    }

    /// Admin tears the room down; every member record goes with it.
    pub async fn terminate_game(
        &self,
        game_id: &GameId,
        requester: &PlayerId,
    ) -> Result<(), ErrorBody> {
        let mut games = self.games.write().await;
        let mut players = self.players.write().await;

        let member_ids = {
            let Some(game) = games.get_mut(game_id) else {
                return Err(ErrorBody::not_found("game not found"));
            };
            let is_admin = players.get(requester).map(|p| p.admin).unwrap_or(false);
            if !is_admin {
                return Err(ErrorBody::forbidden(
                    "only the admin can terminate the game",
                ));
            }
            game.clear_timer();
            game.broadcast(&players, &Outbound::Game(ServerMessage::Terminate));
            game.players.clone()
        };

        games.remove(game_id);
        for id in member_ids {
            players.remove(&id);
        }
        tracing::info!("Game {} was terminated.", game_id);
        Ok(())
    }
}

/// Push the review item at the room's current carousel position to
/// every member. Missing submissions show empty placeholder captions.
fn broadcast_review_item(game: &Game, players: &HashMap<PlayerId, Player>) {
    let Some(id) = game.review_order.get(game.review_index) else {
        return;
    };
    let Some(player) = players.get(id) else {
        return;
    };
    let Some(meme) = player.current_meme.clone() else {
        return;
    };
    let captions = player
        .current_captions
        .clone()
        .unwrap_or_else(|| vec![String::new(); meme.captions.len()]);
    let review = ReviewItem {
        player: player.info(score::total_score(game, players, id)),
        meme,
        captions,
        index: game.review_index + 1,
        total: game.review_order.len(),
    };
    game.broadcast(players, &Outbound::Game(ServerMessage::Review { review }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::memes::CatalogProvider;
    use crate::protocol::{GameSettings, NewPlayer, ServerMessage};
    use tokio::sync::mpsc;

    fn identity(nickname: &str) -> NewPlayer {
        NewPlayer {
            nickname: nickname.to_string(),
            avatar: format!("/avatars/{nickname}.png"),
        }
    }

    fn settings(rounds: u32) -> GameSettings {
        GameSettings {
            rounds,
            max_players: 6,
        }
    }

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState::new(
            Config::default(),
            Box::new(CatalogProvider::new()),
        ))
    }

    async fn two_player_room(state: &Arc<AppState>) -> (GameId, PlayerId, PlayerId) {
        let (tx_a, _rx_a) = mpsc::unbounded_channel();
        let (game_id, admin_id, _) = state
            .create_game(identity("a"), settings(1), tx_a)
            .await
            .unwrap();
        let (tx_b, _rx_b) = mpsc::unbounded_channel();
        let member_id = state.join_game(&game_id, identity("b"), tx_b).await.unwrap();
        (game_id, admin_id, member_id)
    }

    /// Catalog that stalls before answering, long enough for lobby
    /// membership to change while a start is in flight.
    struct SlowProvider {
        inner: CatalogProvider,
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl crate::memes::MemeProvider for SlowProvider {
        async fn get_random_memes(
            &self,
            n: usize,
        ) -> crate::memes::ContentResult<Vec<MemeContent>> {
            tokio::time::sleep(self.delay).await;
            self.inner.get_random_memes(n).await
        }

        fn name(&self) -> &str {
            "slow-catalog"
        }
    }

    #[tokio::test]
    async fn test_join_during_content_fetch_still_gets_an_assignment() {
        let state = Arc::new(AppState::new(
            Config::default(),
            Box::new(SlowProvider {
                inner: CatalogProvider::new(),
                delay: Duration::from_millis(100),
            }),
        ));
        let (tx_a, _rx_a) = mpsc::unbounded_channel();
        let (game_id, admin_id, _) = state
            .create_game(identity("a"), settings(1), tx_a)
            .await
            .unwrap();
        let (tx_b, _rx_b) = mpsc::unbounded_channel();
        state.join_game(&game_id, identity("b"), tx_b).await.unwrap();

        let starter = {
            let state = Arc::clone(&state);
            let (game_id, admin_id) = (game_id.clone(), admin_id.clone());
            tokio::spawn(async move { state.start_game(&game_id, &admin_id).await })
        };

        // Join while the content fetch for two players is outstanding.
        tokio::time::sleep(Duration::from_millis(30)).await;
        let (tx_c, _rx_c) = mpsc::unbounded_channel();
        let carol_id = state.join_game(&game_id, identity("c"), tx_c).await.unwrap();

        starter.await.unwrap().unwrap();

        let games = state.games.read().await;
        let players = state.players.read().await;
        let game = games.get(&game_id).unwrap();
        assert_eq!(game.phase, Phase::Caption);
        assert_eq!(game.active_count(&players), 3);
        for player in game.active_players(&players) {
            assert!(
                player.current_meme.is_some(),
                "{} entered the round without an assignment",
                player.nickname
            );
        }
        assert!(players.get(&carol_id).unwrap().current_meme.is_some());
    }

    #[tokio::test]
    async fn test_submit_caption_outside_caption_phase_is_soft_rejected() {
        let state = test_state();
        let (game_id, admin_id, _) = two_player_room(&state).await;

        let reply = state
            .submit_caption(&game_id, &admin_id, vec!["early".into()])
            .await;
        match reply {
            Outbound::Game(ServerMessage::SubmitCaption { success }) => assert!(!success),
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_start_game_requires_admin_and_quorum() {
        let state = test_state();
        let (tx, _rx) = mpsc::unbounded_channel();
        let (game_id, admin_id, _) = state
            .create_game(identity("solo"), settings(1), tx)
            .await
            .unwrap();

        let err = state.start_game(&game_id, &admin_id).await.unwrap_err();
        assert_eq!(err.code, 400);

        let (tx_b, _rx_b) = mpsc::unbounded_channel();
        let member_id = state.join_game(&game_id, identity("b"), tx_b).await.unwrap();
        let err = state.start_game(&game_id, &member_id).await.unwrap_err();
        assert_eq!(err.code, 403);

        state.start_game(&game_id, &admin_id).await.unwrap();
        let games = state.games.read().await;
        let game = games.get(&game_id).unwrap();
        assert_eq!(game.phase, Phase::Caption);
        assert_eq!(game.current_round, 1);
    }

    #[tokio::test]
    async fn test_all_submissions_end_the_caption_phase_once() {
        let state = test_state();
        let (game_id, admin_id, member_id) = two_player_room(&state).await;
        state.start_game(&game_id, &admin_id).await.unwrap();

        let slots = |id: &PlayerId| {
            let state = Arc::clone(&state);
            let id = id.clone();
            async move {
                let players = state.players.read().await;
                players.get(&id).unwrap().current_meme.as_ref().unwrap().captions.len()
            }
        };

        let n = slots(&admin_id).await;
        state
            .submit_caption(&game_id, &admin_id, vec!["one".into(); n])
            .await;
        {
            let games = state.games.read().await;
            assert_eq!(games.get(&game_id).unwrap().phase, Phase::Caption);
        }

        let n = slots(&member_id).await;
        state
            .submit_caption(&game_id, &member_id, vec!["two".into(); n])
            .await;
        let (phase, order_len) = {
            let games = state.games.read().await;
            let game = games.get(&game_id).unwrap();
            (game.phase, game.review_order.len())
        };
        assert_eq!(phase, Phase::Review);
        assert_eq!(order_len, 2);

        // A late deadline fire for the same round must change nothing.
        state.end_caption_phase(&game_id, 1).await;
        let games = state.games.read().await;
        assert_eq!(games.get(&game_id).unwrap().phase, Phase::Review);
    }

    #[tokio::test]
    async fn test_self_vote_and_duplicate_vote_are_rejected() {
        let state = test_state();
        let (game_id, admin_id, member_id) = two_player_room(&state).await;
        state.start_game(&game_id, &admin_id).await.unwrap();
        state.end_caption_phase(&game_id, 1).await;

        let reply = state
            .submit_review(&game_id, &admin_id, admin_id.clone(), true)
            .await;
        match reply {
            Outbound::Game(ServerMessage::SubmitReview { success }) => assert!(!success),
            other => panic!("unexpected reply: {:?}", other),
        }

        let reply = state
            .submit_review(&game_id, &admin_id, member_id.clone(), true)
            .await;
        match reply {
            Outbound::Game(ServerMessage::SubmitReview { success }) => assert!(success),
            other => panic!("unexpected reply: {:?}", other),
        }

        let reply = state
            .submit_review(&game_id, &admin_id, member_id.clone(), false)
            .await;
        match reply {
            Outbound::Game(ServerMessage::SubmitReview { success }) => assert!(!success),
            other => panic!("unexpected reply: {:?}", other),
        }

        let players = state.players.read().await;
        assert_eq!(players.get(&admin_id).unwrap().votes.len(), 1);
    }

    #[tokio::test]
    async fn test_stale_review_advance_is_ignored() {
        let state = test_state();
        let (game_id, admin_id, _) = two_player_room(&state).await;
        state.start_game(&game_id, &admin_id).await.unwrap();
        state.end_caption_phase(&game_id, 1).await;

        // Armed for index 1; a fire for any other index is stale.
        state.advance_review(&game_id, 1, 2).await;
        {
            let games = state.games.read().await;
            assert_eq!(games.get(&game_id).unwrap().review_index, 0);
        }

        state.advance_review(&game_id, 1, 1).await;
        {
            let games = state.games.read().await;
            assert_eq!(games.get(&game_id).unwrap().review_index, 1);
        }

        // Past the end of the order the room moves to results.
        state.advance_review(&game_id, 1, 2).await;
        let games = state.games.read().await;
        assert_eq!(games.get(&game_id).unwrap().phase, Phase::Result);
    }

    #[tokio::test]
    async fn test_final_standings_after_last_round() {
        let state = test_state();
        let (game_id, admin_id, member_id) = two_player_room(&state).await;
        state.start_game(&game_id, &admin_id).await.unwrap();
        state.end_caption_phase(&game_id, 1).await;
        state
            .submit_review(&game_id, &admin_id, member_id.clone(), true)
            .await;
        state.advance_review(&game_id, 1, 1).await;
        state.advance_review(&game_id, 1, 2).await;
        state.end_result_phase(&game_id, 1).await;

        let games = state.games.read().await;
        let players = state.players.read().await;
        let game = games.get(&game_id).unwrap();
        assert_eq!(game.phase, Phase::Final);
        assert_eq!(
            score::total_score(game, &players, &member_id),
            1
        );
    }

    #[tokio::test]
    async fn test_restart_resets_round_state() {
        let state = test_state();
        let (game_id, admin_id, member_id) = two_player_room(&state).await;
        state.start_game(&game_id, &admin_id).await.unwrap();
        state.end_caption_phase(&game_id, 1).await;
        state
            .submit_review(&game_id, &admin_id, member_id.clone(), true)
            .await;

        state.restart_game(&game_id, &admin_id).await.unwrap();

        let games = state.games.read().await;
        let players = state.players.read().await;
        let game = games.get(&game_id).unwrap();
        assert_eq!(game.phase, Phase::Lobby);
        assert_eq!(game.current_round, 0);
        assert!(players.get(&admin_id).unwrap().votes.is_empty());
        assert!(players.get(&member_id).unwrap().current_meme.is_none());
    }

    #[tokio::test]
    async fn test_terminate_purges_both_registries() {
        let state = test_state();
        let (game_id, admin_id, member_id) = two_player_room(&state).await;

        let err = state
            .terminate_game(&game_id, &member_id)
            .await
            .unwrap_err();
        assert_eq!(err.code, 403);

        state.terminate_game(&game_id, &admin_id).await.unwrap();
        assert!(state.games.read().await.is_empty());
        assert!(state.players.read().await.is_empty());
    }
}
