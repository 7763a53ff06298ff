//! Draw business logic: seeding, group play, standings, bracket, rankings.

mod advance;
mod bracket;
mod group_play;
mod qualification;
mod rankings;
mod roster;
mod seeding;
mod standings;

pub use advance::{advancement, apply_winner, complete_bye, record_result};
pub use bracket::{
    bracket_size, build_bracket, draw_size, round_count, seed_positions, MAX_BRACKET_SIZE,
    MIN_BRACKET_SIZE,
};
pub use group_play::{generate_group_matches, round_robin_pairs, slot_player};
pub use qualification::select_qualifiers;
pub use rankings::{tally_points, PointTotals, RecalculationJob, RecalculationReport};
pub use roster::{parse_roster, RosterEntry};
pub use seeding::{rank_value, snake_draft, sort_by_rank, GroupAssignment, RankedPlayer};
pub use standings::{compute_standings, group_standings};
