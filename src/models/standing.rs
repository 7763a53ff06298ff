//! Derived group standings and the qualifiers taken from them.

use crate::models::player::{PersonId, PlayerId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Per-player group summary. Always recomputed from matches, never stored.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub player_id: PlayerId,
    pub person_id: PersonId,
    pub name: String,
    pub group: String,
    pub category: Option<String>,
    pub seed: Option<u32>,
    pub points: i64,
    pub wins: u32,
    pub losses: u32,
    pub played: u32,
}

impl Standing {
    /// Points desc, wins desc, name asc, person id as the last resort.
    pub fn ranking_order(a: &Standing, b: &Standing) -> Ordering {
        b.points
            .cmp(&a.points)
            .then_with(|| b.wins.cmp(&a.wins))
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.person_id.cmp(&b.person_id))
    }
}

/// A player advanced from a finalized group into the bracket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Qualifier {
    pub person_id: PersonId,
    pub name: String,
    #[serde(default)]
    pub seed: Option<u32>,
    #[serde(default)]
    pub group: Option<String>,
}

impl Qualifier {
    pub fn new(person_id: impl Into<PersonId>, name: impl Into<String>) -> Self {
        Self {
            person_id: person_id.into(),
            name: name.into(),
            seed: None,
            group: None,
        }
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl From<&Standing> for Qualifier {
    fn from(s: &Standing) -> Self {
        Self {
            person_id: s.person_id.clone(),
            name: s.name.clone(),
            seed: s.seed,
            group: Some(s.group.clone()),
        }
    }
}
