//! Data structures for the draw: players, groups, matches, standings, ledgers.

mod game;
mod group;
mod ledger;
mod player;
mod standing;
mod tournament;

pub use game::{
    BracketRound, Match, MatchId, MatchStatus, NextMatch, SetScore, Slot, SlotIndex, SlotPlayer,
    Stage, StageKind,
};
pub use group::{group_label, Group, GroupId, GroupStatus, DEFAULT_QUALIFIERS};
pub use ledger::{LedgerEntry, LedgerScope};
pub use player::{PersonId, Player, PlayerId, PlayerUpdate};
pub use standing::{Qualifier, Standing};
pub use tournament::{category_matches, ClubId, ScoringConfig, Tournament, TournamentId};
