//! Integration tests for bracket construction, byes and winner advancement.

use proptest::prelude::*;
use std::sync::Arc;
use tournament_draw::logic::{
    advancement, apply_winner, bracket_size, build_bracket, draw_size, record_result,
    seed_positions,
};
use tournament_draw::models::{BracketRound, Match, MatchStatus, Qualifier, Slot, SlotIndex};
use tournament_draw::{DrawEngine, DrawError, EngineConfig, MemoryStore};
use uuid::Uuid;

fn qualifiers(n: u32) -> Vec<Qualifier> {
    (1..=n)
        .map(|s| Qualifier::new(format!("person-{s}"), format!("Seed {s}")).with_seed(s))
        .collect()
}

fn at(matches: &[Match], round: u32, position: u32) -> &Match {
    matches
        .iter()
        .find(|m| m.bracket_position() == Some((round, position)))
        .unwrap()
}

fn seed_in(slot: &Slot) -> Option<u32> {
    slot.player().and_then(|p| p.seed)
}

#[test]
fn bracket_size_picks_power_of_two_with_cap() {
    assert_eq!(bracket_size(2), 8);
    assert_eq!(bracket_size(5), 8);
    assert_eq!(bracket_size(8), 8);
    assert_eq!(bracket_size(9), 16);
    assert_eq!(bracket_size(33), 64);
    assert_eq!(bracket_size(128), 128);
    assert_eq!(bracket_size(129), 128);
}

#[test]
fn seed_positions_match_standard_placement() {
    assert_eq!(seed_positions(4), vec![1, 4, 3, 2]);
    assert_eq!(seed_positions(8), vec![1, 8, 5, 4, 3, 6, 7, 2]);
    assert_eq!(seed_positions(2), vec![1, 2]);
}

#[test]
fn draw_size_drops_all_bye_opening_rounds() {
    assert_eq!(draw_size(2), 2);
    assert_eq!(draw_size(3), 4);
    assert_eq!(draw_size(4), 4);
    assert_eq!(draw_size(5), 8);
    assert_eq!(draw_size(17), 32);
}

#[test]
fn five_qualifiers_get_three_byes_resolved_into_round_two() {
    let matches = build_bracket(Uuid::new_v4(), None, &qualifiers(5)).unwrap();
    assert_eq!(matches.len(), 7);

    let round_one: Vec<&Match> = matches
        .iter()
        .filter(|m| m.bracket_position().map(|(r, _)| r) == Some(1))
        .collect();
    let byes: Vec<&&Match> = round_one.iter().filter(|m| m.is_bye()).collect();
    assert_eq!(byes.len(), 3);
    for m in &byes {
        assert_eq!(m.status, MatchStatus::Completed);
        assert!(m.winner().is_some());
    }

    // Seed 1 waits in semi 1; seeds 3 and 2 already meet in semi 2.
    let semi_one = at(&matches, 2, 1);
    assert_eq!(seed_in(&semi_one.player1), Some(1));
    assert_eq!(semi_one.player2, Slot::Empty);
    let semi_two = at(&matches, 2, 2);
    assert_eq!(seed_in(&semi_two.player1), Some(3));
    assert_eq!(seed_in(&semi_two.player2), Some(2));

    let real = at(&matches, 1, 2);
    assert!(!real.is_bye());
    assert_eq!(seed_in(&real.player1), Some(5));
    assert_eq!(seed_in(&real.player2), Some(4));
}

#[test]
fn links_point_at_parent_slots() {
    let matches = build_bracket(Uuid::new_v4(), None, &qualifiers(16)).unwrap();
    assert_eq!(matches.len(), 15);
    assert_eq!(matches[0].bracket_position(), Some((4, 1)));
    assert!(matches[0].next_match().is_none());
    for m in matches.iter().skip(1) {
        let (round, position) = m.bracket_position().unwrap();
        let next = m.next_match().unwrap();
        let parent = at(&matches, round + 1, position.div_ceil(2));
        assert_eq!(next.match_id, parent.id);
        let expected = if position % 2 == 1 {
            SlotIndex::One
        } else {
            SlotIndex::Two
        };
        assert_eq!(next.slot, expected);
    }
}

#[test]
fn round_names_count_back_from_final() {
    let matches = build_bracket(Uuid::new_v4(), None, &qualifiers(16)).unwrap();
    let round_of = |r: u32| match &at(&matches, r, 1).stage {
        tournament_draw::Stage::Bracket { round, .. } => *round,
        tournament_draw::Stage::Group { .. } => unreachable!(),
    };
    assert_eq!(round_of(1), BracketRound::RoundOf(16));
    assert_eq!(round_of(2), BracketRound::QuarterFinal);
    assert_eq!(round_of(3), BracketRound::SemiFinal);
    assert_eq!(round_of(4), BracketRound::Final);
}

#[test]
fn unseeded_qualifiers_are_placed_last() {
    let mut list = vec![Qualifier::new("x", "Unseeded")];
    list.extend(qualifiers(3));
    let matches = build_bracket(Uuid::new_v4(), None, &list).unwrap();
    // 4 entrants, 4-slot draw: 1 v 4 and 3 v 2; the unseeded player is seed 4.
    let first = at(&matches, 1, 1);
    assert_eq!(first.player2.person_id().map(String::as_str), Some("x"));
}

#[test]
fn rejects_too_few_or_too_many_qualifiers() {
    let tid = Uuid::new_v4();
    assert!(matches!(
        build_bracket(tid, None, &qualifiers(1)),
        Err(DrawError::Validation(_))
    ));
    assert!(matches!(
        build_bracket(tid, None, &qualifiers(129)),
        Err(DrawError::Validation(_))
    ));
    let mut twice = qualifiers(4);
    twice.push(Qualifier::new("person-2", "Seed 2 again"));
    assert!(matches!(
        build_bracket(tid, None, &twice),
        Err(DrawError::Validation(_))
    ));
}

#[test]
fn winner_moves_into_parent_slot_and_repeats_harmlessly() {
    let mut matches = build_bracket(Uuid::new_v4(), None, &qualifiers(4)).unwrap();
    let child_idx = matches
        .iter()
        .position(|m| m.bracket_position() == Some((1, 2)))
        .unwrap();
    record_result(&mut matches[child_idx], Vec::new(), "person-2", false).unwrap();
    let (next, slot) = advancement(&matches[child_idx]).unwrap();
    assert_eq!(next.slot, SlotIndex::Two);

    let final_idx = matches.iter().position(|m| m.id == next.match_id).unwrap();
    let Slot::Filled(player) = slot else {
        panic!("winner slot should be filled");
    };
    apply_winner(&mut matches[final_idx], next.slot, player.clone());
    let once = matches[final_idx].clone();
    apply_winner(&mut matches[final_idx], next.slot, player);
    assert_eq!(matches[final_idx], once);
    assert_eq!(
        once.player2.person_id().map(String::as_str),
        Some("person-2")
    );
    assert_eq!(once.player1, Slot::Empty);
}

#[test]
fn scoring_rejects_byes_and_outsiders() {
    let mut matches = build_bracket(Uuid::new_v4(), None, &qualifiers(3)).unwrap();
    let bye = matches.iter_mut().find(|m| m.is_bye()).unwrap();
    assert!(matches!(
        record_result(bye, Vec::new(), "person-1", false),
        Err(DrawError::Validation(_))
    ));
    let real = matches
        .iter_mut()
        .find(|m| m.bracket_position() == Some((1, 2)))
        .unwrap();
    assert!(matches!(
        record_result(real, Vec::new(), "person-1", false),
        Err(DrawError::Validation(_))
    ));
}

#[tokio::test]
async fn engine_advances_winners_to_champion() {
    let store = Arc::new(MemoryStore::new());
    let engine = DrawEngine::in_memory(store, EngineConfig::default());
    let t = engine.create_tournament("Cup", None, None).await.unwrap();
    engine
        .generate_bracket(t.id, &qualifiers(5), None)
        .await
        .unwrap();

    let bracket = engine.get_bracket(t.id, None).await.unwrap();
    let quarter = at(&bracket, 1, 2).id;
    engine
        .record_match_result(t.id, quarter, Vec::new(), "person-4", false)
        .await
        .unwrap();
    let bracket = engine.get_bracket(t.id, None).await.unwrap();
    let semi_one = at(&bracket, 2, 1);
    assert_eq!(seed_in(&semi_one.player2), Some(4));

    let (semi_one, semi_two) = (semi_one.id, at(&bracket, 2, 2).id);
    engine
        .record_match_result(t.id, semi_one, Vec::new(), "person-1", false)
        .await
        .unwrap();
    engine
        .record_match_result(t.id, semi_two, Vec::new(), "person-3", true)
        .await
        .unwrap();
    let bracket = engine.get_bracket(t.id, None).await.unwrap();
    let final_match = at(&bracket, 3, 1).clone();
    assert_eq!(seed_in(&final_match.player1), Some(1));
    assert_eq!(seed_in(&final_match.player2), Some(3));

    let done = engine
        .record_match_result(t.id, final_match.id, Vec::new(), "person-3", false)
        .await
        .unwrap();
    assert_eq!(done.winner_id.as_deref(), Some("person-3"));
}

#[tokio::test]
async fn decided_final_locks_its_feeder_results() {
    let store = Arc::new(MemoryStore::new());
    let engine = DrawEngine::in_memory(store, EngineConfig::default());
    let t = engine.create_tournament("Cup", None, None).await.unwrap();
    engine
        .generate_bracket(t.id, &qualifiers(4), None)
        .await
        .unwrap();
    let bracket = engine.get_bracket(t.id, None).await.unwrap();
    let (semi_one, semi_two, final_id) = (
        at(&bracket, 1, 1).id,
        at(&bracket, 1, 2).id,
        at(&bracket, 2, 1).id,
    );
    for (id, winner) in [
        (semi_one, "person-1"),
        (semi_two, "person-2"),
        (final_id, "person-1"),
    ] {
        engine
            .record_match_result(t.id, id, Vec::new(), winner, false)
            .await
            .unwrap();
    }

    assert!(matches!(
        engine
            .record_match_result(t.id, semi_one, Vec::new(), "person-4", false)
            .await,
        Err(DrawError::Conflict(_))
    ));
    // Same winner again only rewrites the scores.
    engine
        .record_match_result(t.id, semi_one, Vec::new(), "person-1", false)
        .await
        .unwrap();

    let bracket = engine.get_bracket(t.id, None).await.unwrap();
    let final_match = at(&bracket, 2, 1);
    assert_eq!(final_match.winner_id.as_deref(), Some("person-1"));
    assert!(final_match.winner().is_some());
    assert_eq!(seed_in(&final_match.player1), Some(1));
}

#[tokio::test]
async fn brackets_are_kept_per_category() {
    let store = Arc::new(MemoryStore::new());
    let engine = DrawEngine::in_memory(store, EngineConfig::default());
    let t = engine.create_tournament("Cup", None, None).await.unwrap();
    engine
        .generate_bracket(t.id, &qualifiers(2), Some("men"))
        .await
        .unwrap();
    engine
        .generate_bracket(t.id, &qualifiers(3), Some("women"))
        .await
        .unwrap();

    assert_eq!(engine.delete_bracket(t.id, Some("men")).await.unwrap(), 1);
    assert!(engine.get_bracket(t.id, Some("men")).await.unwrap().is_empty());
    assert_eq!(engine.get_bracket(t.id, Some("women")).await.unwrap().len(), 3);
    assert_eq!(engine.delete_bracket(t.id, None).await.unwrap(), 3);
}

#[tokio::test]
async fn second_bracket_conflicts_until_deleted() {
    let store = Arc::new(MemoryStore::new());
    let engine = DrawEngine::in_memory(store, EngineConfig::default());
    let t = engine.create_tournament("Cup", None, None).await.unwrap();
    engine
        .generate_bracket(t.id, &qualifiers(6), None)
        .await
        .unwrap();
    assert!(matches!(
        engine.generate_bracket(t.id, &qualifiers(6), None).await,
        Err(DrawError::Conflict(_))
    ));
    assert_eq!(engine.delete_bracket(t.id, None).await.unwrap(), 7);
    assert!(engine.generate_bracket(t.id, &qualifiers(6), None).await.is_ok());
}

#[tokio::test]
async fn interrupted_bracket_build_reports_partial_failure() {
    let store = Arc::new(MemoryStore::new());
    let engine = DrawEngine::in_memory(store.clone(), EngineConfig::default());
    let t = engine.create_tournament("Cup", None, None).await.unwrap();
    store.fail_writes_after(2);
    let err = engine
        .generate_bracket(t.id, &qualifiers(5), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DrawError::PartialFailure { completed: 2, .. }
    ));

    store.heal();
    assert_eq!(engine.delete_bracket(t.id, None).await.unwrap(), 2);
    assert_eq!(
        engine
            .generate_bracket(t.id, &qualifiers(5), None)
            .await
            .unwrap()
            .len(),
        7
    );
}

proptest! {
    #[test]
    fn seed_positions_pair_opponents_to_sum(exp in 1u32..8) {
        let size = 1usize << exp;
        let order = seed_positions(size);
        let mut sorted = order.clone();
        sorted.sort_unstable();
        prop_assert_eq!(sorted, (1..=size as u32).collect::<Vec<u32>>());
        for pair in order.chunks_exact(2) {
            prop_assert_eq!(pair[0] + pair[1], size as u32 + 1);
        }
    }

    #[test]
    fn every_entrant_appears_once_in_round_one(n in 2u32..=64) {
        let matches = build_bracket(Uuid::new_v4(), None, &qualifiers(n)).unwrap();
        let size = draw_size(n as usize);
        prop_assert_eq!(matches.len(), size - 1);
        let mut seeds: Vec<u32> = matches
            .iter()
            .filter(|m| m.bracket_position().map(|(r, _)| r) == Some(1))
            .flat_map(|m| [seed_in(&m.player1), seed_in(&m.player2)])
            .flatten()
            .collect();
        seeds.sort_unstable();
        prop_assert_eq!(seeds, (1..=n).collect::<Vec<u32>>());
        let byes = matches.iter().filter(|m| m.is_bye()).count();
        prop_assert_eq!(byes, size - n as usize);
    }
}
