//! Vote aggregation.
//!
//! Votes live on the voter, keyed by (target, round). Tallies are only
//! materialized into broadcasts at result-phase entry; late review votes
//! are rejected by the phase guard in the handler, never here.

use std::collections::HashMap;

use crate::protocol::MemeResult;
use crate::state::{Game, Player};
use crate::types::*;

/// Upvotes and downvotes cast for `target` in `round`.
pub fn round_tally(
    game: &Game,
    players: &HashMap<PlayerId, Player>,
    target: &PlayerId,
    round: u32,
) -> (u32, u32) {
    let mut upvotes = 0;
    let mut downvotes = 0;
    let key = VoteKey {
        target: target.clone(),
        round,
    };
    for id in &game.players {
        if let Some(voter) = players.get(id) {
            match voter.votes.get(&key) {
                Some(true) => upvotes += 1,
                Some(false) => downvotes += 1,
                None => {}
            }
        }
    }
    (upvotes, downvotes)
}

/// Signed sum of all votes cast for `target` across all rounds:
/// +1 per upvote, -1 per downvote.
pub fn total_score(game: &Game, players: &HashMap<PlayerId, Player>, target: &PlayerId) -> i64 {
    let mut total = 0;
    for id in &game.players {
        if let Some(voter) = players.get(id) {
            for (key, like) in &voter.votes {
                if key.target == *target {
                    total += if *like { 1 } else { -1 };
                }
            }
        }
    }
    total
}

/// One result entry per member that held an assignment this round.
/// Players who never submitted appear with empty placeholder captions.
pub fn round_results(
    game: &Game,
    players: &HashMap<PlayerId, Player>,
    round: u32,
) -> Vec<MemeResult> {
    game.players
        .iter()
        .filter_map(|id| players.get(id))
        .filter_map(|player| {
            let meme = player.current_meme.clone()?;
            let captions = player
                .current_captions
                .clone()
                .unwrap_or_else(|| vec![String::new(); meme.captions.len()]);
            let (upvotes, downvotes) = round_tally(game, players, &player.id, round);
            Some(MemeResult {
                player: player.info(total_score(game, players, &player.id)),
                meme,
                captions,
                upvotes,
                downvotes,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn test_player(nickname: &str, game_id: &str) -> Player {
        let (tx, _rx) = mpsc::unbounded_channel();
        Player::new(
            nickname.to_string(),
            "/avatar/bugs.jpg".to_string(),
            false,
            game_id.to_string(),
            tx,
        )
    }

    fn room_with(names: &[&str]) -> (Game, HashMap<PlayerId, Player>) {
        let mut game = Game::new(3, 6);
        let mut players = HashMap::new();
        for name in names {
            let player = test_player(name, &game.id);
            game.add_player(player.id.clone());
            players.insert(player.id.clone(), player);
        }
        (game, players)
    }

    fn vote(
        players: &mut HashMap<PlayerId, Player>,
        voter: &PlayerId,
        target: &PlayerId,
        round: u32,
        like: bool,
    ) {
        players.get_mut(voter).unwrap().votes.insert(
            VoteKey {
                target: target.clone(),
                round,
            },
            like,
        );
    }

    #[test]
    fn test_round_tally_counts_both_directions() {
        let (game, mut players) = room_with(&["a", "b", "c"]);
        let ids: Vec<PlayerId> = game.players.clone();

        vote(&mut players, &ids[1], &ids[0], 1, true);
        vote(&mut players, &ids[2], &ids[0], 1, false);

        assert_eq!(round_tally(&game, &players, &ids[0], 1), (1, 1));
        assert_eq!(round_tally(&game, &players, &ids[1], 1), (0, 0));
    }

    #[test]
    fn test_tally_ignores_other_rounds() {
        let (game, mut players) = room_with(&["a", "b"]);
        let ids: Vec<PlayerId> = game.players.clone();

        vote(&mut players, &ids[1], &ids[0], 1, true);
        vote(&mut players, &ids[1], &ids[0], 2, true);

        assert_eq!(round_tally(&game, &players, &ids[0], 1), (1, 0));
        assert_eq!(round_tally(&game, &players, &ids[0], 2), (1, 0));
    }

    #[test]
    fn test_total_score_matches_per_round_tallies() {
        let (game, mut players) = room_with(&["a", "b", "c"]);
        let ids: Vec<PlayerId> = game.players.clone();

        vote(&mut players, &ids[1], &ids[0], 1, true);
        vote(&mut players, &ids[2], &ids[0], 1, true);
        vote(&mut players, &ids[1], &ids[0], 2, false);

        let mut from_tallies = 0i64;
        for round in 1..=2 {
            let (up, down) = round_tally(&game, &players, &ids[0], round);
            from_tallies += up as i64 - down as i64;
        }

        assert_eq!(total_score(&game, &players, &ids[0]), 1);
        assert_eq!(total_score(&game, &players, &ids[0]), from_tallies);
    }

    #[test]
    fn test_round_results_include_non_submitters_with_placeholder() {
        let (game, mut players) = room_with(&["a", "b"]);
        let ids: Vec<PlayerId> = game.players.clone();

        let meme = crate::memes::CatalogProvider::new();
        let memes = futures::executor::block_on(crate::memes::MemeProvider::get_random_memes(
            &meme, 2,
        ))
        .unwrap();

        players.get_mut(&ids[0]).unwrap().current_meme = Some(memes[0].clone());
        players.get_mut(&ids[0]).unwrap().current_captions = Some(vec![
            "top".to_string();
            memes[0].captions.len()
        ]);
        players.get_mut(&ids[1]).unwrap().current_meme = Some(memes[1].clone());
        // second player never submitted

        let results = round_results(&game, &players, 1);
        assert_eq!(results.len(), 2);

        let silent = results.iter().find(|r| r.player.id == ids[1]).unwrap();
        assert_eq!(silent.captions.len(), memes[1].captions.len());
        assert!(silent.captions.iter().all(|c| c.is_empty()));
    }
}
