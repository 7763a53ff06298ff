//! Tournament and its scoring configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Identifier of the club that owns a tournament and its point ledger.
pub type ClubId = String;

/// Points credited per result.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub win: i64,
    pub loss: i64,
    /// Credited to the loser instead of `loss` when they withdrew.
    pub withdraw: i64,
}

impl ScoringConfig {
    /// Group standings scoring.
    pub const STANDINGS: ScoringConfig = ScoringConfig {
        win: 50,
        loss: 10,
        withdraw: 5,
    };

    /// Club-wide point ledger scoring.
    pub const LEDGER: ScoringConfig = ScoringConfig {
        win: 3,
        loss: 0,
        withdraw: 0,
    };

    pub fn loser_points(&self, is_withdrawal: bool) -> i64 {
        if is_withdrawal {
            self.withdraw
        } else {
            self.loss
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::STANDINGS
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    /// None for tournaments outside any club ledger.
    #[serde(default)]
    pub club_id: Option<ClubId>,
    #[serde(default)]
    pub scoring: ScoringConfig,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    pub fn new(name: impl Into<String>, club_id: Option<ClubId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            club_id,
            scoring: ScoringConfig::default(),
            created_at: Utc::now(),
        }
    }

    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }
}

/// Category filter: `None` selects every category.
pub fn category_matches(value: Option<&str>, filter: Option<&str>) -> bool {
    filter.map_or(true, |f| value == Some(f))
}
