//! In-memory store used by the web binary and the tests.

use super::{MatchQuery, PointLedger, RankingSource, TournamentStore};
use crate::config::DEFAULT_MAX_BATCH_SIZE;
use crate::error::{DrawError, DrawResult};
use crate::models::{
    category_matches, ClubId, Group, GroupId, LedgerEntry, LedgerScope, Match, MatchId, PersonId,
    Player, PlayerUpdate, Slot, SlotIndex, Tournament, TournamentId,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct State {
    tournaments: HashMap<TournamentId, Tournament>,
    /// Registration order is kept.
    players: Vec<Player>,
    groups: Vec<Group>,
    matches: Vec<Match>,
    ledger: BTreeMap<(LedgerScope, PersonId), i64>,
}

/// All collections behind one lock. Writes can be made to fail on demand.
pub struct MemoryStore {
    state: RwLock<State>,
    max_batch_size: usize,
    /// Writes still allowed before every write fails; `usize::MAX` is unlimited.
    write_budget: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_max_batch_size(DEFAULT_MAX_BATCH_SIZE)
    }

    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        Self {
            state: RwLock::new(State::default()),
            max_batch_size: max_batch_size.max(1),
            write_budget: AtomicUsize::new(usize::MAX),
        }
    }

    /// Let the next `writes` writes succeed and fail every one after them.
    pub fn fail_writes_after(&self, writes: usize) {
        self.write_budget.store(writes, Ordering::SeqCst);
    }

    /// Remove any injected failure.
    pub fn heal(&self) {
        self.write_budget.store(usize::MAX, Ordering::SeqCst);
    }

    /// Seed a club ledger row directly (ranking points from outside this engine).
    pub fn set_club_points(&self, club_id: &str, person_id: &str, points: i64) -> DrawResult<()> {
        self.write()?.ledger.insert(
            (LedgerScope::Club(club_id.to_string()), person_id.to_string()),
            points,
        );
        Ok(())
    }

    fn read(&self) -> DrawResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| DrawError::Store("lock error".to_string()))
    }

    fn write(&self) -> DrawResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| DrawError::Store("lock error".to_string()))
    }

    fn charge_write(&self) -> DrawResult<()> {
        let unlimited = usize::MAX;
        self.write_budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                0 => None,
                n if n == unlimited => Some(n),
                n => Some(n - 1),
            })
            .map(|_| ())
            .map_err(|_| DrawError::Store("injected write failure".to_string()))
    }

    fn check_batch(&self, len: usize) -> DrawResult<()> {
        if len > self.max_batch_size {
            return Err(DrawError::Store(format!(
                "batch of {len} exceeds limit of {}",
                self.max_batch_size
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl TournamentStore for MemoryStore {
    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    async fn create_tournament(&self, tournament: Tournament) -> DrawResult<()> {
        self.charge_write()?;
        self.write()?.tournaments.insert(tournament.id, tournament);
        Ok(())
    }

    async fn get_tournament(&self, id: TournamentId) -> DrawResult<Option<Tournament>> {
        Ok(self.read()?.tournaments.get(&id).cloned())
    }

    async fn list_tournaments(&self) -> DrawResult<Vec<Tournament>> {
        Ok(self.read()?.tournaments.values().cloned().collect())
    }

    async fn create_player(&self, player: Player) -> DrawResult<()> {
        self.charge_write()?;
        self.write()?.players.push(player);
        Ok(())
    }

    async fn list_players(
        &self,
        tournament_id: TournamentId,
        category: Option<&str>,
    ) -> DrawResult<Vec<Player>> {
        Ok(self
            .read()?
            .players
            .iter()
            .filter(|p| p.tournament_id == tournament_id)
            .filter(|p| category_matches(p.category.as_deref(), category))
            .cloned()
            .collect())
    }

    async fn update_players(
        &self,
        tournament_id: TournamentId,
        updates: Vec<PlayerUpdate>,
    ) -> DrawResult<()> {
        self.check_batch(updates.len())?;
        self.charge_write()?;
        let mut state = self.write()?;
        // Resolve every target first so a bad id leaves the batch unapplied.
        let mut targets = Vec::with_capacity(updates.len());
        for update in &updates {
            let idx = state
                .players
                .iter()
                .position(|p| p.tournament_id == tournament_id && p.id == update.player_id())
                .ok_or_else(|| DrawError::not_found("player", update.player_id()))?;
            targets.push(idx);
        }
        for (idx, update) in targets.into_iter().zip(&updates) {
            update.apply(&mut state.players[idx]);
        }
        Ok(())
    }

    async fn create_group(&self, group: Group) -> DrawResult<()> {
        self.charge_write()?;
        self.write()?.groups.push(group);
        Ok(())
    }

    async fn list_groups(
        &self,
        tournament_id: TournamentId,
        category: Option<&str>,
    ) -> DrawResult<Vec<Group>> {
        let mut groups: Vec<Group> = self
            .read()?
            .groups
            .iter()
            .filter(|g| g.tournament_id == tournament_id)
            .filter(|g| category_matches(g.category.as_deref(), category))
            .cloned()
            .collect();
        groups.sort_by(|a, b| (a.name.len(), &a.name).cmp(&(b.name.len(), &b.name)));
        Ok(groups)
    }

    async fn update_group(&self, group: Group) -> DrawResult<()> {
        self.charge_write()?;
        let mut state = self.write()?;
        let slot = state
            .groups
            .iter_mut()
            .find(|g| g.id == group.id)
            .ok_or_else(|| DrawError::not_found("group", &group.name))?;
        *slot = group;
        Ok(())
    }

    async fn delete_group(&self, tournament_id: TournamentId, id: GroupId) -> DrawResult<()> {
        self.charge_write()?;
        self.write()?
            .groups
            .retain(|g| !(g.tournament_id == tournament_id && g.id == id));
        Ok(())
    }

    async fn create_match(&self, m: Match) -> DrawResult<()> {
        self.charge_write()?;
        self.write()?.matches.push(m);
        Ok(())
    }

    async fn get_match(
        &self,
        tournament_id: TournamentId,
        id: MatchId,
    ) -> DrawResult<Option<Match>> {
        Ok(self
            .read()?
            .matches
            .iter()
            .find(|m| m.tournament_id == tournament_id && m.id == id)
            .cloned())
    }

    async fn list_matches(
        &self,
        tournament_id: TournamentId,
        query: &MatchQuery,
    ) -> DrawResult<Vec<Match>> {
        Ok(self
            .read()?
            .matches
            .iter()
            .filter(|m| m.tournament_id == tournament_id && query.matches(m))
            .cloned()
            .collect())
    }

    async fn update_match(&self, m: Match) -> DrawResult<()> {
        self.charge_write()?;
        let mut state = self.write()?;
        let slot = state
            .matches
            .iter_mut()
            .find(|x| x.tournament_id == m.tournament_id && x.id == m.id)
            .ok_or_else(|| DrawError::not_found("match", m.id))?;
        *slot = m;
        Ok(())
    }

    async fn set_match_slot(
        &self,
        tournament_id: TournamentId,
        id: MatchId,
        index: SlotIndex,
        slot: Slot,
    ) -> DrawResult<()> {
        self.charge_write()?;
        let mut state = self.write()?;
        let m = state
            .matches
            .iter_mut()
            .find(|m| m.tournament_id == tournament_id && m.id == id)
            .ok_or_else(|| DrawError::not_found("match", id))?;
        *m.slot_mut(index) = slot;
        Ok(())
    }

    async fn delete_match(&self, tournament_id: TournamentId, id: MatchId) -> DrawResult<()> {
        self.charge_write()?;
        self.write()?
            .matches
            .retain(|m| !(m.tournament_id == tournament_id && m.id == id));
        Ok(())
    }

    async fn completed_matches(&self) -> DrawResult<Vec<Match>> {
        Ok(self
            .read()?
            .matches
            .iter()
            .filter(|m| m.is_completed())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RankingSource for MemoryStore {
    async fn points(&self, person_id: &PersonId, club_id: &ClubId) -> DrawResult<Option<i64>> {
        Ok(self
            .read()?
            .ledger
            .get(&(LedgerScope::Club(club_id.clone()), person_id.clone()))
            .copied())
    }
}

#[async_trait]
impl PointLedger for MemoryStore {
    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    async fn entries(&self, club_id: Option<&str>) -> DrawResult<Vec<LedgerEntry>> {
        Ok(self
            .read()?
            .ledger
            .iter()
            .filter(|((scope, _), _)| match (scope, club_id) {
                (_, None) => true,
                (LedgerScope::Club(c), Some(filter)) => c == filter,
                (LedgerScope::Global, Some(_)) => false,
            })
            .map(|((scope, person_id), points)| LedgerEntry {
                scope: scope.clone(),
                person_id: person_id.clone(),
                points: *points,
            })
            .collect())
    }

    async fn write_entries(&self, entries: Vec<LedgerEntry>) -> DrawResult<()> {
        self.check_batch(entries.len())?;
        self.charge_write()?;
        let mut state = self.write()?;
        for e in entries {
            state.ledger.insert((e.scope, e.person_id), e.points);
        }
        Ok(())
    }
}
