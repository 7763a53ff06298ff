//! Standings: a pure fold over completed group matches.

use crate::models::{category_matches, Group, Match, Player, ScoringConfig, Standing};
use std::collections::HashMap;

/// Standings for every grouped player, sorted by [`Standing::ranking_order`].
///
/// Only completed group-stage matches count. A result whose winner is not one
/// of the two slots is ignored; a side whose player is no longer on the roster
/// is skipped.
pub fn compute_standings(
    players: &[Player],
    matches: &[Match],
    scoring: &ScoringConfig,
    category: Option<&str>,
) -> Vec<Standing> {
    let mut standings: Vec<Standing> = players
        .iter()
        .filter(|p| category_matches(p.category.as_deref(), category))
        .filter_map(|p| {
            let group = p.group.clone()?;
            Some(Standing {
                player_id: p.id,
                person_id: p.person_id.clone(),
                name: p.name.clone(),
                group,
                category: p.category.clone(),
                seed: p.seed,
                points: 0,
                wins: 0,
                losses: 0,
                played: 0,
            })
        })
        .collect();
    // A person registered in several categories has one standing per group.
    let mut index: HashMap<(&str, &str), Vec<usize>> = HashMap::new();
    for (i, s) in standings.iter().enumerate() {
        index
            .entry((s.group.as_str(), s.person_id.as_str()))
            .or_default()
            .push(i);
    }

    let completed = matches.iter().filter(|m| {
        m.is_completed()
            && m.group_name().is_some()
            && category_matches(m.category.as_deref(), category)
    });
    let mut credits = Vec::new();
    for m in completed {
        let (Some(winner), Some(loser)) = (m.winner_id.as_ref(), m.loser_id()) else {
            continue;
        };
        if let Some(i) = locate(&index, &standings, m, winner) {
            credits.push((i, scoring.win, true));
        }
        if let Some(i) = locate(&index, &standings, m, loser) {
            credits.push((i, scoring.loser_points(m.is_withdrawal), false));
        }
    }
    drop(index);
    for (i, points, won) in credits {
        let s = &mut standings[i];
        s.points += points;
        s.played += 1;
        if won {
            s.wins += 1;
        } else {
            s.losses += 1;
        }
    }

    standings.sort_by(Standing::ranking_order);
    standings
}

/// Standing of `person_id` in the group `m` was played in. When the person
/// holds several same-named groups, the match's category decides.
fn locate(
    index: &HashMap<(&str, &str), Vec<usize>>,
    standings: &[Standing],
    m: &Match,
    person_id: &str,
) -> Option<usize> {
    let candidates = index.get(&(m.group_name()?, person_id))?;
    match candidates.as_slice() {
        [only] => Some(*only),
        _ => candidates
            .iter()
            .copied()
            .find(|&i| standings[i].category == m.category),
    }
}

/// Standings of one group, in ranking order.
pub fn group_standings<'a>(
    standings: &'a [Standing],
    group: &'a Group,
) -> impl Iterator<Item = &'a Standing> + 'a {
    standings.iter().filter(move |s| {
        s.group == group.name && category_matches(s.category.as_deref(), group.category.as_deref())
    })
}
