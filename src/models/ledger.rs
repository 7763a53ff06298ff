//! Cumulative point ledgers rebuilt by the ranking recompute.

use crate::models::player::PersonId;
use crate::models::tournament::ClubId;
use serde::{Deserialize, Serialize};

/// Which ledger a row belongs to.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerScope {
    Club(ClubId),
    /// Cross-club experience points.
    Global,
}

/// Absolute total for one person in one ledger. Writing it replaces the old value.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub scope: LedgerScope,
    pub person_id: PersonId,
    pub points: i64,
}
