//! Single-elimination bracket: sizing, seeded placement, byes.

use crate::error::{DrawError, DrawResult};
use crate::logic::advance::{apply_winner, complete_bye};
use crate::models::{Match, NextMatch, Qualifier, Slot, SlotIndex, SlotPlayer, TournamentId};
use std::collections::{BTreeMap, HashSet};

pub const MIN_BRACKET_SIZE: usize = 8;

/// Largest supported bracket. Callers must not pass more qualifiers than this.
pub const MAX_BRACKET_SIZE: usize = 128;

/// Smallest power of two in `8..=128` that holds `n` players; capped at 128.
pub fn bracket_size(n: usize) -> usize {
    n.clamp(MIN_BRACKET_SIZE, MAX_BRACKET_SIZE).next_power_of_two()
}

pub fn round_count(size: usize) -> u32 {
    size.trailing_zeros()
}

/// Size of the tree actually built for `n` players.
///
/// Starts from [`bracket_size`] and halves while the opening round would be
/// byes only, so 2 players get a lone final and 3-4 players a 4-slot draw.
pub fn draw_size(n: usize) -> usize {
    let mut size = bracket_size(n);
    while size > 2 && n <= size / 2 {
        size /= 2;
    }
    size
}

/// Seed number occupying each first-round slot, top to bottom.
///
/// Built by doubling from `[1]`: each seed `p` at index `i` expands into the
/// pair `p, 2L+1-p` (reversed at odd `i`), so seeds 1 and 2 can only meet in
/// the final, 1-4 in the semis, and so on. Size 8 gives `1,8,5,4,3,6,7,2`.
pub fn seed_positions(size: usize) -> Vec<u32> {
    let mut order = vec![1u32];
    while order.len() < size {
        let mirror = order.len() as u32 * 2 + 1;
        order = order
            .iter()
            .enumerate()
            .flat_map(|(i, &p)| {
                if i % 2 == 0 {
                    [p, mirror - p]
                } else {
                    [mirror - p, p]
                }
            })
            .collect();
    }
    order
}

/// Build every match of the bracket, final first.
///
/// Qualifiers are ranked by seed (unseeded last, input order kept on ties)
/// and placed with [`seed_positions`]. Matches are created from the final
/// back to round 1 so each child links to an existing parent. First-round
/// byes come back completed, their winner already written into the parent.
pub fn build_bracket(
    tournament_id: TournamentId,
    category: Option<&str>,
    qualifiers: &[Qualifier],
) -> DrawResult<Vec<Match>> {
    let n = qualifiers.len();
    if n < 2 {
        return Err(DrawError::Validation(format!(
            "A bracket needs at least 2 qualifiers, got {n}"
        )));
    }
    if n > MAX_BRACKET_SIZE {
        return Err(DrawError::Validation(format!(
            "{n} qualifiers exceed the {MAX_BRACKET_SIZE}-slot bracket limit"
        )));
    }

    let mut seen = HashSet::with_capacity(n);
    if let Some(dup) = qualifiers.iter().find(|q| !seen.insert(q.person_id.as_str())) {
        return Err(DrawError::Validation(format!(
            "{} is listed more than once",
            dup.person_id
        )));
    }

    let mut ranked: Vec<&Qualifier> = qualifiers.iter().collect();
    ranked.sort_by_key(|q| (q.seed.is_none(), q.seed));

    let size = draw_size(n);
    let rounds = round_count(size);
    let category = category.map(str::to_string);

    // Arena keyed by (round, position), filled parent-first.
    let mut arena: BTreeMap<(u32, u32), Match> = BTreeMap::new();
    for round in (1..=rounds).rev() {
        let count = (size >> round) as u32;
        for position in 1..=count {
            let next = if round == rounds {
                None
            } else {
                let parent = &arena[&(round + 1, position.div_ceil(2))];
                Some(NextMatch {
                    match_id: parent.id,
                    slot: SlotIndex::for_child(position),
                })
            };
            let m = Match::bracket(
                tournament_id,
                category.clone(),
                round,
                rounds,
                position,
                next,
            );
            arena.insert((round, position), m);
        }
    }

    let order = seed_positions(size);
    let entrant = |seed: u32| -> Slot {
        match ranked.get(seed as usize - 1) {
            Some(q) => Slot::Filled(SlotPlayer {
                person_id: q.person_id.clone(),
                name: q.name.clone(),
                seed: Some(seed),
            }),
            None => Slot::Bye,
        }
    };
    for (i, pair) in order.chunks_exact(2).enumerate() {
        if let Some(m) = arena.get_mut(&(1, i as u32 + 1)) {
            m.player1 = entrant(pair[0]);
            m.player2 = entrant(pair[1]);
        }
    }

    resolve_byes(&mut arena, rounds);

    let mut matches: Vec<Match> = arena.into_values().collect();
    matches.sort_by_key(|m| m.bracket_position().map(|(r, p)| (std::cmp::Reverse(r), p)));
    Ok(matches)
}

/// Walk the rounds upward completing byes and pushing their winners on.
fn resolve_byes(arena: &mut BTreeMap<(u32, u32), Match>, rounds: u32) {
    for round in 1..rounds {
        let keys: Vec<(u32, u32)> = arena
            .range((round, 0)..(round + 1, 0))
            .map(|(k, _)| *k)
            .collect();
        for key in keys {
            let Some(m) = arena.get_mut(&key) else {
                continue;
            };
            let Some(winner) = complete_bye(m) else {
                continue;
            };
            let Some(next) = m.next_match() else {
                continue;
            };
            log::debug!(
                "Bye for {} in round {} position {}",
                winner.name,
                key.0,
                key.1
            );
            if let Some(parent) = arena.get_mut(&(round + 1, key.1.div_ceil(2))) {
                debug_assert_eq!(parent.id, next.match_id);
                apply_winner(parent, next.slot, winner);
            }
        }
    }
}
