//! Round-robin groups.

use crate::models::player::PlayerId;
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type GroupId = Uuid;

/// Qualifiers taken from a group unless the operator says otherwise.
pub const DEFAULT_QUALIFIERS: u32 = 2;

/// Only `InProgress -> Completed` on finalize and back on un-finalize.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupStatus {
    #[default]
    InProgress,
    Completed,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub tournament_id: TournamentId,
    /// Letter label: A, B, ... Z, AA, AB, ...
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Members in draw order.
    pub members: Vec<PlayerId>,
    pub qualifiers_count: u32,
    pub status: GroupStatus,
    pub finalized_at: Option<DateTime<Utc>>,
}

impl Group {
    pub fn new(
        tournament_id: TournamentId,
        name: impl Into<String>,
        category: Option<String>,
        members: Vec<PlayerId>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            name: name.into(),
            category,
            members,
            qualifiers_count: DEFAULT_QUALIFIERS,
            status: GroupStatus::InProgress,
            finalized_at: None,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.status == GroupStatus::Completed
    }

    pub fn finalize(&mut self, qualifiers_count: u32) {
        self.qualifiers_count = qualifiers_count;
        self.status = GroupStatus::Completed;
        self.finalized_at = Some(Utc::now());
    }

    pub fn unfinalize(&mut self) {
        self.status = GroupStatus::InProgress;
        self.finalized_at = None;
    }
}

/// Spreadsheet-style label for the group at `index`: 0 -> A, 25 -> Z, 26 -> AA.
pub fn group_label(index: usize) -> String {
    let mut n = index + 1;
    let mut label = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        label.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    label.reverse();
    String::from_utf8_lossy(&label).into_owned()
}
