//! Draw engine: the async operation surface used by the admin UI.
//!
//! Every operation reads what it needs from the store, runs the pure logic in
//! [`crate::logic`], and writes the result back as a sequence of separate
//! writes. Nothing here is transactional; an operation that fails after its
//! first write reports [`DrawError::PartialFailure`] and the documented
//! recovery is reset, then regenerate.

use crate::config::EngineConfig;
use crate::error::{DrawError, DrawResult};
use crate::logic::{self, RecalculationJob, RecalculationReport, RankedPlayer, RosterEntry};
use crate::models::{
    ClubId, Group, Match, MatchId, Player, PlayerUpdate, Qualifier, ScoringConfig, SetScore,
    Standing, Tournament, TournamentId,
};
use crate::store::{MatchQuery, MemoryStore, PointLedger, RankingSource, TournamentStore};
use std::collections::HashMap;
use std::sync::Arc;

/// Draw engine over a store, a ranking source and a point ledger.
#[derive(Clone)]
pub struct DrawEngine {
    store: Arc<dyn TournamentStore>,
    rankings: Arc<dyn RankingSource>,
    ledger: Arc<dyn PointLedger>,
    config: EngineConfig,
}

impl DrawEngine {
    pub fn new(
        store: Arc<dyn TournamentStore>,
        rankings: Arc<dyn RankingSource>,
        ledger: Arc<dyn PointLedger>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            rankings,
            ledger,
            config,
        }
    }

    /// Engine where one [`MemoryStore`] plays every collaborator.
    pub fn in_memory(store: Arc<MemoryStore>, config: EngineConfig) -> Self {
        Self::new(store.clone(), store.clone(), store, config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn batch_size(&self) -> usize {
        self.store.max_batch_size().min(self.config.max_batch_size).max(1)
    }

    async fn tournament(&self, id: TournamentId) -> DrawResult<Tournament> {
        self.store
            .get_tournament(id)
            .await?
            .ok_or_else(|| DrawError::not_found("tournament", id))
    }

    async fn group_by_name(
        &self,
        tournament_id: TournamentId,
        name: &str,
        category: Option<&str>,
    ) -> DrawResult<Group> {
        self.store
            .list_groups(tournament_id, category)
            .await?
            .into_iter()
            .find(|g| g.name == name)
            .ok_or_else(|| DrawError::not_found("group", name))
    }

    /// Batched player updates, chunked below the store's batch limit.
    /// `writes` counts the writes of the surrounding operation.
    async fn update_players_chunked(
        &self,
        tournament_id: TournamentId,
        updates: Vec<PlayerUpdate>,
        operation: &'static str,
        writes: &mut usize,
    ) -> DrawResult<()> {
        for chunk in updates.chunks(self.batch_size()) {
            log::debug!("{operation}: updating {} player(s)", chunk.len());
            if let Err(e) = self.store.update_players(tournament_id, chunk.to_vec()).await {
                return Err(DrawError::partial(operation, *writes, e));
            }
            *writes += 1;
        }
        Ok(())
    }

    pub async fn create_tournament(
        &self,
        name: impl Into<String>,
        club_id: Option<ClubId>,
        scoring: Option<ScoringConfig>,
    ) -> DrawResult<Tournament> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DrawError::Validation("Tournament name is empty".to_string()));
        }
        let tournament =
            Tournament::new(name.trim(), club_id).with_scoring(scoring.unwrap_or_default());
        self.store.create_tournament(tournament.clone()).await?;
        log::info!("Created tournament {} ({})", tournament.name, tournament.id);
        Ok(tournament)
    }

    pub async fn get_tournament(&self, tournament_id: TournamentId) -> DrawResult<Tournament> {
        self.tournament(tournament_id).await
    }

    /// Register roster entries as players.
    pub async fn register_players(
        &self,
        tournament_id: TournamentId,
        entries: Vec<RosterEntry>,
    ) -> DrawResult<Vec<Player>> {
        self.tournament(tournament_id).await?;
        let mut created = Vec::with_capacity(entries.len());
        for entry in entries {
            let player = entry.into_player(tournament_id);
            if let Err(e) = self.store.create_player(player.clone()).await {
                return Err(DrawError::partial("Player registration", created.len(), e));
            }
            created.push(player);
        }
        log::info!(
            "Registered {} player(s) in tournament {tournament_id}",
            created.len()
        );
        Ok(created)
    }

    pub async fn get_players(
        &self,
        tournament_id: TournamentId,
        category: Option<&str>,
    ) -> DrawResult<Vec<Player>> {
        self.tournament(tournament_id).await?;
        self.store.list_players(tournament_id, category).await
    }

    /// Snake-draft the category's players into `group_count` groups.
    ///
    /// Group documents are written before players point at them, so a failure
    /// part way leaves empty groups rather than dangling player references.
    pub async fn assign_groups(
        &self,
        tournament_id: TournamentId,
        group_count: usize,
        category: Option<&str>,
    ) -> DrawResult<Vec<Group>> {
        if group_count < 1 {
            return Err(DrawError::Validation(
                "Group count must be at least 1".to_string(),
            ));
        }
        let (tournament, players, existing) = tokio::try_join!(
            self.tournament(tournament_id),
            self.store.list_players(tournament_id, category),
            self.store.list_groups(tournament_id, category),
        )?;
        if !existing.is_empty() {
            return Err(DrawError::Conflict(
                "Groups already drawn for this category; reset the group stage first".to_string(),
            ));
        }

        let mut ranked = Vec::with_capacity(players.len());
        for p in &players {
            let points = match (&tournament.club_id, p.seed, p.guest) {
                (Some(club_id), None, false) => self.rankings.points(&p.person_id, club_id).await?,
                _ => None,
            };
            ranked.push(RankedPlayer {
                player_id: p.id,
                name: p.name.clone(),
                rank: logic::rank_value(p, points, self.config.manual_seed_base),
            });
        }
        let assignments = logic::snake_draft(ranked, group_count)?;

        let mut groups: Vec<Group> = (0..group_count)
            .map(|i| {
                Group::new(
                    tournament_id,
                    crate::models::group_label(i),
                    category.map(str::to_string),
                    Vec::new(),
                )
            })
            .collect();
        for a in &assignments {
            if let Some(g) = groups.iter_mut().find(|g| g.name == a.group) {
                g.members.push(a.player_id);
            }
        }

        let mut writes = 0;
        for g in &groups {
            if let Err(e) = self.store.create_group(g.clone()).await {
                return Err(DrawError::partial("Group assignment", writes, e));
            }
            writes += 1;
        }
        let updates = assignments
            .into_iter()
            .map(|a| PlayerUpdate::Draw {
                player_id: a.player_id,
                seed: a.seed,
                group: a.group,
            })
            .collect();
        self.update_players_chunked(tournament_id, updates, "Group assignment", &mut writes)
            .await?;

        log::info!(
            "Drew {} player(s) into {group_count} group(s) in tournament {tournament_id}",
            players.len()
        );
        Ok(groups)
    }

    pub async fn get_groups(
        &self,
        tournament_id: TournamentId,
        category: Option<&str>,
    ) -> DrawResult<Vec<Group>> {
        self.tournament(tournament_id).await?;
        self.store.list_groups(tournament_id, category).await
    }

    /// Round-robin matches for every drawn group of the category.
    pub async fn generate_group_matches(
        &self,
        tournament_id: TournamentId,
        category: Option<&str>,
    ) -> DrawResult<Vec<Match>> {
        let query = MatchQuery::group_stage(category);
        let (_, groups, players, existing) = tokio::try_join!(
            self.tournament(tournament_id),
            self.store.list_groups(tournament_id, category),
            self.store.list_players(tournament_id, category),
            self.store.list_matches(tournament_id, &query),
        )?;
        if groups.is_empty() {
            return Err(DrawError::Validation(
                "Assign groups before generating matches".to_string(),
            ));
        }
        if !existing.is_empty() {
            return Err(DrawError::Conflict(
                "Group matches already exist; reset the group stage first".to_string(),
            ));
        }

        let matches = logic::generate_group_matches(tournament_id, category, &groups, &players)?;
        for (written, m) in matches.iter().enumerate() {
            if let Err(e) = self.store.create_match(m.clone()).await {
                return Err(DrawError::partial("Group match generation", written, e));
            }
        }
        log::info!(
            "Generated {} group match(es) for {} group(s) in tournament {tournament_id}",
            matches.len(),
            groups.len()
        );
        Ok(matches)
    }

    /// Close a group's round-robin and fix how many of its players advance.
    pub async fn finalize_group(
        &self,
        tournament_id: TournamentId,
        group_name: &str,
        qualifiers_count: u32,
        category: Option<&str>,
    ) -> DrawResult<Group> {
        if qualifiers_count < 1 {
            return Err(DrawError::Validation(
                "At least one player must qualify".to_string(),
            ));
        }
        self.tournament(tournament_id).await?;
        let mut group = self.group_by_name(tournament_id, group_name, category).await?;
        group.finalize(qualifiers_count);
        self.store.update_group(group.clone()).await?;
        log::info!("Finalized group {group_name} with {qualifiers_count} qualifier(s)");
        Ok(group)
    }

    pub async fn unfinalize_group(
        &self,
        tournament_id: TournamentId,
        group_name: &str,
        category: Option<&str>,
    ) -> DrawResult<Group> {
        self.tournament(tournament_id).await?;
        let mut group = self.group_by_name(tournament_id, group_name, category).await?;
        group.unfinalize();
        self.store.update_group(group.clone()).await?;
        log::info!("Reopened group {group_name}");
        Ok(group)
    }

    pub async fn get_standings(
        &self,
        tournament_id: TournamentId,
        category: Option<&str>,
    ) -> DrawResult<Vec<Standing>> {
        let query = MatchQuery::group_stage(category).completed();
        let (tournament, players, matches) = tokio::try_join!(
            self.tournament(tournament_id),
            self.store.list_players(tournament_id, category),
            self.store.list_matches(tournament_id, &query),
        )?;
        Ok(logic::compute_standings(
            &players,
            &matches,
            &tournament.scoring,
            category,
        ))
    }

    pub async fn get_qualifiers(
        &self,
        tournament_id: TournamentId,
        category: Option<&str>,
    ) -> DrawResult<Vec<Qualifier>> {
        let (standings, groups) = tokio::try_join!(
            self.get_standings(tournament_id, category),
            self.store.list_groups(tournament_id, category),
        )?;
        Ok(logic::select_qualifiers(&groups, &standings, category))
    }

    /// Build and store the knockout bracket, final first.
    ///
    /// Without a category any existing bracket in the tournament conflicts.
    pub async fn generate_bracket(
        &self,
        tournament_id: TournamentId,
        qualified: &[Qualifier],
        category: Option<&str>,
    ) -> DrawResult<Vec<Match>> {
        let query = MatchQuery::bracket(category);
        let (_, existing) = tokio::try_join!(
            self.tournament(tournament_id),
            self.store.list_matches(tournament_id, &query),
        )?;
        if !existing.is_empty() {
            return Err(DrawError::Conflict(
                "A bracket already exists; delete it first".to_string(),
            ));
        }

        let matches = logic::build_bracket(tournament_id, category, qualified)?;
        for (written, m) in matches.iter().enumerate() {
            if let Err(e) = self.store.create_match(m.clone()).await {
                return Err(DrawError::partial("Bracket generation", written, e));
            }
        }
        log::info!(
            "Built bracket of {} match(es) for {} qualifier(s) in tournament {tournament_id}",
            matches.len(),
            qualified.len()
        );
        Ok(matches)
    }

    /// Bracket matches ordered by round, then position.
    pub async fn get_bracket(
        &self,
        tournament_id: TournamentId,
        category: Option<&str>,
    ) -> DrawResult<Vec<Match>> {
        self.tournament(tournament_id).await?;
        let mut matches = self
            .store
            .list_matches(tournament_id, &MatchQuery::bracket(category))
            .await?;
        matches.sort_by_key(Match::bracket_position);
        Ok(matches)
    }

    /// Score a match and, for bracket matches, move the winner on.
    pub async fn record_match_result(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        sets: Vec<SetScore>,
        winner_id: &str,
        is_withdrawal: bool,
    ) -> DrawResult<Match> {
        let mut m = self
            .store
            .get_match(tournament_id, match_id)
            .await?
            .ok_or_else(|| DrawError::not_found("match", match_id))?;
        logic::record_result(&mut m, sets, winner_id, is_withdrawal)?;
        self.ensure_result_editable(&m, winner_id).await?;
        self.store.update_match(m.clone()).await?;
        self.advance_winner(&m)
            .await
            .map_err(|e| DrawError::partial("Recording result", 1, e))?;
        log::info!("Recorded result for match {match_id}: winner {winner_id}");
        Ok(m)
    }

    /// A result may not change once something downstream depends on it: the
    /// group is finalized, or the bracket parent already has a result with
    /// a different player in this match's slot.
    async fn ensure_result_editable(&self, m: &Match, winner_id: &str) -> DrawResult<()> {
        if let Some(group_name) = m.group_name() {
            let finalized = self
                .store
                .list_groups(m.tournament_id, m.category.as_deref())
                .await?
                .iter()
                .any(|g| g.name == group_name && g.category == m.category && g.is_finalized());
            if finalized {
                return Err(DrawError::Conflict(format!(
                    "Group {group_name} is finalized; unfinalize it before changing results"
                )));
            }
        }
        if let Some(next) = m.next_match() {
            let parent = self.store.get_match(m.tournament_id, next.match_id).await?;
            if let Some(parent) = parent {
                let unchanged = parent
                    .slot(next.slot)
                    .person_id()
                    .is_some_and(|p| p == winner_id);
                if parent.is_completed() && !unchanged {
                    return Err(DrawError::Conflict(
                        "The next match already has a result; it must be cleared first"
                            .to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Write a completed match's winner into its parent's slot. No-op for the
    /// final; safe to repeat.
    pub async fn advance_winner(&self, completed: &Match) -> DrawResult<()> {
        let Some((next, slot)) = logic::advancement(completed) else {
            return Ok(());
        };
        log::debug!(
            "Advancing winner of {} into {} slot {:?}",
            completed.id,
            next.match_id,
            next.slot
        );
        self.store
            .set_match_slot(completed.tournament_id, next.match_id, next.slot, slot)
            .await
    }

    /// Back to the pre-draw state: group matches and groups deleted, every
    /// player's group cleared. Player references go first so none dangles.
    pub async fn reset_group_stage(
        &self,
        tournament_id: TournamentId,
        category: Option<&str>,
    ) -> DrawResult<()> {
        let query = MatchQuery::group_stage(category);
        let (_, players, groups, matches) = tokio::try_join!(
            self.tournament(tournament_id),
            self.store.list_players(tournament_id, category),
            self.store.list_groups(tournament_id, category),
            self.store.list_matches(tournament_id, &query),
        )?;

        let mut writes = 0;
        let updates = players
            .iter()
            .filter(|p| p.group.is_some())
            .map(|p| PlayerUpdate::ClearGroup { player_id: p.id })
            .collect();
        self.update_players_chunked(tournament_id, updates, "Group stage reset", &mut writes)
            .await?;
        for g in &groups {
            if let Err(e) = self.store.delete_group(tournament_id, g.id).await {
                return Err(DrawError::partial("Group stage reset", writes, e));
            }
            writes += 1;
        }
        for m in &matches {
            if let Err(e) = self.store.delete_match(tournament_id, m.id).await {
                return Err(DrawError::partial("Group stage reset", writes, e));
            }
            writes += 1;
        }
        log::info!(
            "Reset group stage of tournament {tournament_id}: {} group(s), {} match(es) removed",
            groups.len(),
            matches.len()
        );
        Ok(())
    }

    /// Remove the category's bracket matches, or every bracket match of the
    /// tournament when no category is given. Returns how many went.
    pub async fn delete_bracket(
        &self,
        tournament_id: TournamentId,
        category: Option<&str>,
    ) -> DrawResult<usize> {
        let query = MatchQuery::bracket(category);
        let (_, matches) = tokio::try_join!(
            self.tournament(tournament_id),
            self.store.list_matches(tournament_id, &query),
        )?;
        for (written, m) in matches.iter().enumerate() {
            if let Err(e) = self.store.delete_match(tournament_id, m.id).await {
                return Err(DrawError::partial("Bracket deletion", written, e));
            }
        }
        log::info!(
            "Deleted {} bracket match(es) from tournament {tournament_id}",
            matches.len()
        );
        Ok(matches.len())
    }

    /// Plan a full ledger rebuild from every completed match.
    pub async fn plan_recalculation(&self, club_id: Option<&str>) -> DrawResult<RecalculationJob> {
        let (matches, tournaments, existing) = tokio::try_join!(
            self.store.completed_matches(),
            self.store.list_tournaments(),
            self.ledger.entries(club_id),
        )?;
        let clubs: HashMap<TournamentId, Option<ClubId>> =
            tournaments.into_iter().map(|t| (t.id, t.club_id)).collect();
        let totals =
            logic::tally_points(&matches, &clubs, &self.config.ledger_scoring, club_id);
        let chunk_size = self.ledger.max_batch_size().min(self.config.max_batch_size);
        let job = RecalculationJob::plan(totals, &existing, chunk_size);
        log::debug!(
            "Planned ledger rebuild over {} match(es) in {} chunk(s)",
            matches.len(),
            job.chunk_count()
        );
        Ok(job)
    }

    /// Run (or resume) a planned rebuild.
    pub async fn run_recalculation(
        &self,
        job: &mut RecalculationJob,
    ) -> DrawResult<RecalculationReport> {
        job.run(self.ledger.as_ref()).await
    }

    /// Rebuild club ledgers (one club, or all clubs plus global XP).
    pub async fn recalculate_rankings(
        &self,
        club_id: Option<&str>,
    ) -> DrawResult<RecalculationReport> {
        let mut job = self.plan_recalculation(club_id).await?;
        let report = self.run_recalculation(&mut job).await?;
        log::info!(
            "Recalculated rankings{}: {} ledger row(s) in {} chunk(s)",
            club_id.map(|c| format!(" for club {c}")).unwrap_or_default(),
            report.entries_written,
            report.chunks_written
        );
        Ok(report)
    }
}
