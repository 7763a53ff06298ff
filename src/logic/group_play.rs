//! Group stage: round-robin match generation.

use crate::error::{DrawError, DrawResult};
use crate::models::{Group, Match, Player, PlayerId, SlotPlayer, TournamentId};
use std::collections::HashMap;

/// Every unordered pair of distinct members, once, in member order.
pub fn round_robin_pairs<T: Clone>(members: &[T]) -> Vec<(T, T)> {
    let mut pairs = Vec::with_capacity(members.len() * members.len().saturating_sub(1) / 2);
    for (i, a) in members.iter().enumerate() {
        for b in &members[i + 1..] {
            pairs.push((a.clone(), b.clone()));
        }
    }
    pairs
}

/// Scheduled round-robin matches for each group. Groups and players are not touched.
pub fn generate_group_matches(
    tournament_id: TournamentId,
    category: Option<&str>,
    groups: &[Group],
    players: &[Player],
) -> DrawResult<Vec<Match>> {
    let by_id: HashMap<PlayerId, &Player> = players.iter().map(|p| (p.id, p)).collect();
    let mut matches = Vec::new();
    for group in groups {
        for (a, b) in round_robin_pairs(&group.members) {
            let p1 = by_id
                .get(&a)
                .ok_or_else(|| DrawError::not_found("player", a))?;
            let p2 = by_id
                .get(&b)
                .ok_or_else(|| DrawError::not_found("player", b))?;
            matches.push(Match::group(
                tournament_id,
                category.map(str::to_string).or_else(|| group.category.clone()),
                &group.name,
                slot_player(p1),
                slot_player(p2),
            ));
        }
    }
    Ok(matches)
}

pub fn slot_player(p: &Player) -> SlotPlayer {
    SlotPlayer {
        person_id: p.person_id.clone(),
        name: p.name.clone(),
        seed: p.seed,
    }
}
