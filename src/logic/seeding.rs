//! Ranking and the snake draft that spreads ranked players over groups.

use crate::error::{DrawError, DrawResult};
use crate::models::{group_label, Player, PlayerId};

/// A player with the rank value used to order the draw.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RankedPlayer {
    pub player_id: PlayerId,
    pub name: String,
    pub rank: i64,
}

/// Outcome of the draw for one player.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GroupAssignment {
    pub player_id: PlayerId,
    pub group: String,
    /// Dense tournament-wide seed, 1 is strongest.
    pub seed: u32,
}

/// Rank value of a player: a manual seed inverts against `manual_seed_base`,
/// otherwise club points (guests have none).
pub fn rank_value(player: &Player, club_points: Option<i64>, manual_seed_base: i64) -> i64 {
    match player.seed {
        Some(seed) => manual_seed_base - i64::from(seed),
        None if player.guest => 0,
        None => club_points.unwrap_or(0),
    }
}

/// Sort by rank descending, name ascending on ties.
pub fn sort_by_rank(players: &mut [RankedPlayer]) {
    players.sort_by(|a, b| {
        b.rank
            .cmp(&a.rank)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.player_id.cmp(&b.player_id))
    });
}

/// Snake draft over `group_count` columns.
///
/// Row 0 runs left to right, row 1 right to left, and so on, so the top
/// `group_count` players land in distinct groups. Seeds are handed out in
/// traversal order, which is rank order.
pub fn snake_draft(
    mut players: Vec<RankedPlayer>,
    group_count: usize,
) -> DrawResult<Vec<GroupAssignment>> {
    if group_count < 1 {
        return Err(DrawError::Validation(
            "Group count must be at least 1".to_string(),
        ));
    }
    if players.is_empty() {
        return Err(DrawError::Validation("No players to draw".to_string()));
    }
    if group_count > players.len() {
        return Err(DrawError::Validation(format!(
            "Cannot spread {} players over {group_count} groups",
            players.len()
        )));
    }
    sort_by_rank(&mut players);

    let labels: Vec<String> = (0..group_count).map(group_label).collect();
    let assignments = players
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            let row = i / group_count;
            let col = i % group_count;
            let column = if row % 2 == 0 {
                col
            } else {
                group_count - 1 - col
            };
            GroupAssignment {
                player_id: p.player_id,
                group: labels[column].clone(),
                seed: i as u32 + 1,
            }
        })
        .collect();
    Ok(assignments)
}
