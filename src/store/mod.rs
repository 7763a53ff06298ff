//! Storage and ranking collaborators the engine runs against.
//!
//! No transactions or locks are assumed: every call is its own write, except
//! the batched calls which are atomic per call and bounded by
//! [`TournamentStore::max_batch_size`].

mod memory;

pub use memory::MemoryStore;

use crate::error::DrawResult;
use crate::models::{
    ClubId, Group, GroupId, LedgerEntry, Match, MatchId, MatchStatus, PersonId, Player,
    PlayerUpdate, Slot, SlotIndex, StageKind, Tournament, TournamentId,
};
use async_trait::async_trait;

/// Equality filters for match queries. `None` fields match everything.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MatchQuery {
    pub category: Option<String>,
    pub kind: Option<StageKind>,
    pub status: Option<MatchStatus>,
    pub group: Option<String>,
}

impl MatchQuery {
    pub fn group_stage(category: Option<&str>) -> Self {
        Self {
            category: category.map(str::to_string),
            kind: Some(StageKind::Group),
            ..Self::default()
        }
    }

    pub fn bracket(category: Option<&str>) -> Self {
        Self {
            category: category.map(str::to_string),
            kind: Some(StageKind::Bracket),
            ..Self::default()
        }
    }

    pub fn completed(mut self) -> Self {
        self.status = Some(MatchStatus::Completed);
        self
    }

    pub fn matches(&self, m: &Match) -> bool {
        crate::models::category_matches(m.category.as_deref(), self.category.as_deref())
            && self.kind.map_or(true, |k| m.kind() == k)
            && self.status.map_or(true, |s| m.status == s)
            && self
                .group
                .as_deref()
                .map_or(true, |g| m.group_name() == Some(g))
    }
}

/// Per-tournament collections: players, groups, matches.
#[async_trait]
pub trait TournamentStore: Send + Sync {
    /// Largest batch accepted by [`TournamentStore::update_players`].
    fn max_batch_size(&self) -> usize;

    async fn create_tournament(&self, tournament: Tournament) -> DrawResult<()>;

    async fn get_tournament(&self, id: TournamentId) -> DrawResult<Option<Tournament>>;

    async fn list_tournaments(&self) -> DrawResult<Vec<Tournament>>;

    async fn create_player(&self, player: Player) -> DrawResult<()>;

    async fn list_players(
        &self,
        tournament_id: TournamentId,
        category: Option<&str>,
    ) -> DrawResult<Vec<Player>>;

    /// Atomic batch. Fails without applying anything when above the batch limit.
    async fn update_players(
        &self,
        tournament_id: TournamentId,
        updates: Vec<PlayerUpdate>,
    ) -> DrawResult<()>;

    async fn create_group(&self, group: Group) -> DrawResult<()>;

    async fn list_groups(
        &self,
        tournament_id: TournamentId,
        category: Option<&str>,
    ) -> DrawResult<Vec<Group>>;

    async fn update_group(&self, group: Group) -> DrawResult<()>;

    async fn delete_group(&self, tournament_id: TournamentId, id: GroupId) -> DrawResult<()>;

    async fn create_match(&self, m: Match) -> DrawResult<()>;

    async fn get_match(&self, tournament_id: TournamentId, id: MatchId)
        -> DrawResult<Option<Match>>;

    async fn list_matches(
        &self,
        tournament_id: TournamentId,
        query: &MatchQuery,
    ) -> DrawResult<Vec<Match>>;

    async fn update_match(&self, m: Match) -> DrawResult<()>;

    /// Overwrite a single slot and nothing else.
    async fn set_match_slot(
        &self,
        tournament_id: TournamentId,
        id: MatchId,
        index: SlotIndex,
        slot: Slot,
    ) -> DrawResult<()>;

    async fn delete_match(&self, tournament_id: TournamentId, id: MatchId) -> DrawResult<()>;

    /// Every completed match of every tournament.
    async fn completed_matches(&self) -> DrawResult<Vec<Match>>;
}

/// External ranking provider used to order players before the draw.
#[async_trait]
pub trait RankingSource: Send + Sync {
    /// Club points for a person. `None` when nothing is known.
    async fn points(&self, person_id: &PersonId, club_id: &ClubId) -> DrawResult<Option<i64>>;
}

/// Cumulative point ledgers.
#[async_trait]
pub trait PointLedger: Send + Sync {
    /// Largest batch accepted by [`PointLedger::write_entries`].
    fn max_batch_size(&self) -> usize;

    /// Existing rows; a club filter restricts to that club's ledger.
    async fn entries(&self, club_id: Option<&str>) -> DrawResult<Vec<LedgerEntry>>;

    /// Atomic batch of absolute totals.
    async fn write_entries(&self, entries: Vec<LedgerEntry>) -> DrawResult<()>;
}
