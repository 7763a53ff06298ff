//! Tournament draw engine: library with models, draw logic and store abstractions.

pub mod config;
pub mod engine;
pub mod error;
pub mod logic;
pub mod models;
pub mod store;

pub use config::EngineConfig;
pub use engine::DrawEngine;
pub use error::{DrawError, DrawResult};
pub use logic::{
    bracket_size, build_bracket, compute_standings, parse_roster, seed_positions,
    select_qualifiers, snake_draft, RecalculationJob, RecalculationReport, RosterEntry,
};
pub use models::{
    BracketRound, Group, GroupStatus, Match, MatchId, MatchStatus, PersonId, Player, PlayerId,
    Qualifier, ScoringConfig, SetScore, Slot, SlotIndex, SlotPlayer, Stage, Standing, Tournament,
    TournamentId,
};
pub use store::{MatchQuery, MemoryStore, PointLedger, RankingSource, TournamentStore};
