//! Full recompute of the cumulative point ledgers from match history.
//!
//! Totals are absolute: every run sums the whole history and overwrites the
//! ledger, so running it again without new matches writes the same numbers.

use crate::error::{DrawError, DrawResult};
use crate::models::{
    ClubId, LedgerEntry, LedgerScope, Match, PersonId, ScoringConfig, TournamentId,
};
use crate::store::PointLedger;
use std::collections::{BTreeMap, HashMap};

/// Summed points per ledger.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PointTotals {
    pub clubs: BTreeMap<ClubId, BTreeMap<PersonId, i64>>,
    /// Cross-club XP. Only filled when no club filter is given.
    pub global: BTreeMap<PersonId, i64>,
}

impl PointTotals {
    pub fn club_points(&self, club_id: &str, person_id: &str) -> Option<i64> {
        self.clubs.get(club_id)?.get(person_id).copied()
    }

    fn credit(&mut self, club: Option<&ClubId>, person_id: &PersonId, points: i64, global: bool) {
        if let Some(club) = club {
            *self
                .clubs
                .entry(club.clone())
                .or_default()
                .entry(person_id.clone())
                .or_insert(0) += points;
        }
        if global {
            *self.global.entry(person_id.clone()).or_insert(0) += points;
        }
    }
}

/// Sum ledger points over completed two-player matches.
///
/// `clubs` maps each tournament to its owning club. With a club filter only
/// that club's tournaments count and global XP is left empty.
pub fn tally_points(
    matches: &[Match],
    clubs: &HashMap<TournamentId, Option<ClubId>>,
    scoring: &ScoringConfig,
    club_filter: Option<&str>,
) -> PointTotals {
    let mut totals = PointTotals::default();
    let global = club_filter.is_none();
    for m in matches.iter().filter(|m| m.is_completed() && !m.is_bye()) {
        let club = clubs.get(&m.tournament_id).and_then(Option::as_ref);
        if let Some(filter) = club_filter {
            if club.map(String::as_str) != Some(filter) {
                continue;
            }
        }
        let (Some(winner), Some(loser)) = (m.winner_id.as_ref(), m.loser_id()) else {
            continue;
        };
        totals.credit(club, winner, scoring.win, global);
        totals.credit(club, loser, scoring.loser_points(m.is_withdrawal), global);
    }
    totals
}

/// What a finished (or resumed-to-finish) job reports.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RecalculationReport {
    pub entries_written: usize,
    pub chunks_written: usize,
    pub totals: PointTotals,
}

/// Ledger rewrite split into atomic chunks, with a cursor so a failed run
/// can be resumed by calling [`RecalculationJob::run`] again.
#[derive(Clone, Debug)]
pub struct RecalculationJob {
    totals: PointTotals,
    chunks: Vec<Vec<LedgerEntry>>,
    next_chunk: usize,
}

impl RecalculationJob {
    /// Plan the writes. Rows in `existing` with no matches left are reset to 0.
    pub fn plan(totals: PointTotals, existing: &[LedgerEntry], chunk_size: usize) -> Self {
        let mut rows: BTreeMap<(LedgerScope, PersonId), i64> = BTreeMap::new();
        for e in existing {
            rows.insert((e.scope.clone(), e.person_id.clone()), 0);
        }
        for (club, people) in &totals.clubs {
            for (person_id, points) in people {
                rows.insert((LedgerScope::Club(club.clone()), person_id.clone()), *points);
            }
        }
        for (person_id, points) in &totals.global {
            rows.insert((LedgerScope::Global, person_id.clone()), *points);
        }
        let entries: Vec<LedgerEntry> = rows
            .into_iter()
            .map(|((scope, person_id), points)| LedgerEntry {
                scope,
                person_id,
                points,
            })
            .collect();
        let chunks = entries
            .chunks(chunk_size.max(1))
            .map(<[LedgerEntry]>::to_vec)
            .collect();
        Self {
            totals,
            chunks,
            next_chunk: 0,
        }
    }

    pub fn totals(&self) -> &PointTotals {
        &self.totals
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_finished(&self) -> bool {
        self.next_chunk >= self.chunks.len()
    }

    /// Write the remaining chunks in order. Each chunk is one atomic batch.
    pub async fn run(&mut self, ledger: &dyn PointLedger) -> DrawResult<RecalculationReport> {
        while let Some(chunk) = self.chunks.get(self.next_chunk) {
            log::debug!(
                "Writing ledger chunk {}/{} ({} rows)",
                self.next_chunk + 1,
                self.chunks.len(),
                chunk.len()
            );
            if let Err(e) = ledger.write_entries(chunk.clone()).await {
                return Err(DrawError::partial(
                    "Ranking recalculation",
                    self.next_chunk,
                    e,
                ));
            }
            self.next_chunk += 1;
        }
        Ok(RecalculationReport {
            entries_written: self.chunks.iter().map(Vec::len).sum(),
            chunks_written: self.chunks.len(),
            totals: self.totals.clone(),
        })
    }
}
