//! Integration tests for ranking and the snake draft.

use rand::seq::SliceRandom;
use std::collections::HashMap;
use tournament_draw::logic::{rank_value, snake_draft, RankedPlayer};
use tournament_draw::models::{group_label, Player};
use tournament_draw::DrawError;
use uuid::Uuid;

fn ranked(n: usize) -> Vec<RankedPlayer> {
    (0..n)
        .map(|i| RankedPlayer {
            player_id: Uuid::new_v4(),
            name: format!("P{i:02}"),
            rank: 1000 - i as i64 * 10,
        })
        .collect()
}

fn groups_by_name(players: &[RankedPlayer], group_count: usize) -> HashMap<String, Vec<String>> {
    let names: HashMap<Uuid, String> = players
        .iter()
        .map(|p| (p.player_id, p.name.clone()))
        .collect();
    let mut out: HashMap<String, Vec<String>> = HashMap::new();
    for a in snake_draft(players.to_vec(), group_count).unwrap() {
        out.entry(a.group).or_default().push(names[&a.player_id].clone());
    }
    out
}

#[test]
fn snake_alternates_direction_each_row() {
    let groups = groups_by_name(&ranked(8), 3);
    assert_eq!(groups["A"], vec!["P00", "P05", "P06"]);
    assert_eq!(groups["B"], vec!["P01", "P04", "P07"]);
    assert_eq!(groups["C"], vec!["P02", "P03"]);
}

#[test]
fn top_ranked_players_land_in_distinct_groups() {
    let players = ranked(12);
    let assignments = snake_draft(players.clone(), 4).unwrap();
    let top: Vec<&str> = assignments[..4].iter().map(|a| a.group.as_str()).collect();
    assert_eq!(top, vec!["A", "B", "C", "D"]);
}

#[test]
fn seeds_are_dense_and_follow_rank() {
    let players = ranked(7);
    let assignments = snake_draft(players.clone(), 2).unwrap();
    let seeds: Vec<u32> = assignments.iter().map(|a| a.seed).collect();
    assert_eq!(seeds, (1..=7).collect::<Vec<u32>>());
    assert_eq!(assignments[0].player_id, players[0].player_id);
}

#[test]
fn draw_does_not_depend_on_input_order() {
    let players = ranked(10);
    let expected = snake_draft(players.clone(), 3).unwrap();
    let mut shuffled = players;
    shuffled.shuffle(&mut rand::thread_rng());
    assert_eq!(snake_draft(shuffled, 3).unwrap(), expected);
}

#[test]
fn equal_rank_is_broken_by_name() {
    let mut players = ranked(2);
    players[0].rank = 5;
    players[0].name = "Zed".to_string();
    players[1].rank = 5;
    players[1].name = "Amy".to_string();
    let assignments = snake_draft(players.clone(), 2).unwrap();
    assert_eq!(assignments[0].player_id, players[1].player_id);
    assert_eq!(assignments[0].group, "A");
}

#[test]
fn rejects_zero_groups_and_empty_roster() {
    assert!(matches!(
        snake_draft(ranked(4), 0),
        Err(DrawError::Validation(_))
    ));
    assert!(matches!(
        snake_draft(Vec::new(), 2),
        Err(DrawError::Validation(_))
    ));
    assert!(matches!(
        snake_draft(ranked(2), 3),
        Err(DrawError::Validation(_))
    ));
}

#[test]
fn manual_seed_outranks_club_points() {
    let tid = Uuid::new_v4();
    let seeded = Player::new(tid, "a", "Seeded").with_seed(1);
    let second = Player::new(tid, "b", "Second").with_seed(2);
    let pointy = Player::new(tid, "c", "Points");
    let guest = Player::guest(tid, "Guest");

    let base = 1_000_000;
    assert!(rank_value(&seeded, None, base) > rank_value(&second, None, base));
    assert!(rank_value(&second, None, base) > rank_value(&pointy, Some(5_000), base));
    assert_eq!(rank_value(&pointy, None, base), 0);
    assert_eq!(rank_value(&guest, Some(900), base), 0);
}

#[test]
fn group_labels_run_past_z() {
    assert_eq!(group_label(0), "A");
    assert_eq!(group_label(25), "Z");
    assert_eq!(group_label(26), "AA");
    assert_eq!(group_label(27), "AB");
}
