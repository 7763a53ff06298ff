//! Player registrations.

use crate::models::tournament::TournamentId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a registration (one person in one tournament).
pub type PlayerId = Uuid;

/// Identity of the person behind a registration, stable across tournaments.
pub type PersonId = String;

/// A player registered in a tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub tournament_id: TournamentId,
    pub person_id: PersonId,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Manual seed before the draw, dense draw seed after it. Lower is stronger.
    #[serde(default)]
    pub seed: Option<u32>,
    /// Group label once drawn.
    #[serde(default)]
    pub group: Option<String>,
    /// Entered by hand, no club account and therefore no ranking points.
    #[serde(default)]
    pub guest: bool,
    #[serde(default)]
    pub paid: bool,
}

impl Player {
    pub fn new(
        tournament_id: TournamentId,
        person_id: impl Into<PersonId>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            person_id: person_id.into(),
            name: name.into(),
            category: None,
            seed: None,
            group: None,
            guest: false,
            paid: false,
        }
    }

    /// A manual entry. Gets a generated person id.
    pub fn guest(tournament_id: TournamentId, name: impl Into<String>) -> Self {
        Self {
            guest: true,
            ..Self::new(tournament_id, format!("guest-{}", Uuid::new_v4()), name)
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// A single-player change inside a batched update.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PlayerUpdate {
    /// Result of the snake draft: dense seed and group label.
    Draw {
        player_id: PlayerId,
        seed: u32,
        group: String,
    },
    /// Back to the pre-draw state. The seed is kept.
    ClearGroup { player_id: PlayerId },
}

impl PlayerUpdate {
    pub fn player_id(&self) -> PlayerId {
        match self {
            PlayerUpdate::Draw { player_id, .. } | PlayerUpdate::ClearGroup { player_id } => {
                *player_id
            }
        }
    }

    pub fn apply(&self, player: &mut Player) {
        match self {
            PlayerUpdate::Draw { seed, group, .. } => {
                player.seed = Some(*seed);
                player.group = Some(group.clone());
            }
            PlayerUpdate::ClearGroup { .. } => player.group = None,
        }
    }
}
