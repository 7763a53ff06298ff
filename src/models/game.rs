//! Match, its two player slots, and the stage it belongs to.

use crate::models::player::PersonId;
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Who occupies a slot once it is filled.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SlotPlayer {
    pub person_id: PersonId,
    pub name: String,
    pub seed: Option<u32>,
}

/// One side of a match.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Slot {
    /// Waiting for the winner of a feeder match.
    #[default]
    Empty,
    /// No opponent will ever arrive.
    Bye,
    Filled(SlotPlayer),
}

impl Slot {
    pub fn player(&self) -> Option<&SlotPlayer> {
        match self {
            Slot::Filled(p) => Some(p),
            Slot::Empty | Slot::Bye => None,
        }
    }

    pub fn person_id(&self) -> Option<&PersonId> {
        self.player().map(|p| &p.person_id)
    }
}

/// Which slot of the parent match a winner moves into.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotIndex {
    #[default]
    One,
    Two,
}

impl SlotIndex {
    /// Odd child positions feed slot one, even positions slot two.
    pub fn for_child(position: u32) -> Self {
        if position % 2 == 1 {
            SlotIndex::One
        } else {
            SlotIndex::Two
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Completed,
}

/// Games won by each side in one set.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SetScore {
    pub player1: u32,
    pub player2: u32,
}

/// Display name of a bracket round, counted back from the final.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketRound {
    Final,
    SemiFinal,
    QuarterFinal,
    /// Earlier rounds, named by the number of players still in.
    RoundOf(u32),
}

impl BracketRound {
    pub fn new(round_number: u32, round_count: u32) -> Self {
        match round_count + 1 - round_number {
            1 => BracketRound::Final,
            2 => BracketRound::SemiFinal,
            3 => BracketRound::QuarterFinal,
            remaining => BracketRound::RoundOf(1 << remaining),
        }
    }
}

/// Forward link from a bracket match to the match its winner plays next.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NextMatch {
    pub match_id: MatchId,
    pub slot: SlotIndex,
}

/// A match belongs to a round-robin group or to the knockout bracket, never both.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stage {
    Group {
        group: String,
    },
    Bracket {
        round_number: u32,
        position: u32,
        round: BracketRound,
        next: Option<NextMatch>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Group,
    Bracket,
}

/// A single match between two slots.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    #[serde(default)]
    pub category: Option<String>,
    pub player1: Slot,
    pub player2: Slot,
    pub status: MatchStatus,
    #[serde(default)]
    pub sets: Vec<SetScore>,
    /// None if not yet played.
    pub winner_id: Option<PersonId>,
    #[serde(default)]
    pub is_withdrawal: bool,
    pub stage: Stage,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Match {
    fn new(tournament_id: TournamentId, category: Option<String>, stage: Stage) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            category,
            player1: Slot::Empty,
            player2: Slot::Empty,
            status: MatchStatus::Scheduled,
            sets: Vec::new(),
            winner_id: None,
            is_withdrawal: false,
            stage,
            completed_at: None,
        }
    }

    /// A scheduled round-robin match.
    pub fn group(
        tournament_id: TournamentId,
        category: Option<String>,
        group: impl Into<String>,
        player1: SlotPlayer,
        player2: SlotPlayer,
    ) -> Self {
        let mut m = Self::new(
            tournament_id,
            category,
            Stage::Group {
                group: group.into(),
            },
        );
        m.player1 = Slot::Filled(player1);
        m.player2 = Slot::Filled(player2);
        m
    }

    /// An empty bracket match with its forward link already resolved.
    pub fn bracket(
        tournament_id: TournamentId,
        category: Option<String>,
        round_number: u32,
        round_count: u32,
        position: u32,
        next: Option<NextMatch>,
    ) -> Self {
        Self::new(
            tournament_id,
            category,
            Stage::Bracket {
                round_number,
                position,
                round: BracketRound::new(round_number, round_count),
                next,
            },
        )
    }

    pub fn slot(&self, index: SlotIndex) -> &Slot {
        match index {
            SlotIndex::One => &self.player1,
            SlotIndex::Two => &self.player2,
        }
    }

    pub fn slot_mut(&mut self, index: SlotIndex) -> &mut Slot {
        match index {
            SlotIndex::One => &mut self.player1,
            SlotIndex::Two => &mut self.player2,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// One side is a bye.
    pub fn is_bye(&self) -> bool {
        self.player1 == Slot::Bye || self.player2 == Slot::Bye
    }

    pub fn kind(&self) -> StageKind {
        match self.stage {
            Stage::Group { .. } => StageKind::Group,
            Stage::Bracket { .. } => StageKind::Bracket,
        }
    }

    pub fn group_name(&self) -> Option<&str> {
        match &self.stage {
            Stage::Group { group } => Some(group),
            Stage::Bracket { .. } => None,
        }
    }

    /// `(round_number, position)` for bracket matches.
    pub fn bracket_position(&self) -> Option<(u32, u32)> {
        match self.stage {
            Stage::Bracket {
                round_number,
                position,
                ..
            } => Some((round_number, position)),
            Stage::Group { .. } => None,
        }
    }

    pub fn next_match(&self) -> Option<NextMatch> {
        match self.stage {
            Stage::Bracket { next, .. } => next,
            Stage::Group { .. } => None,
        }
    }

    /// Slot holding `person_id`, if that person plays in this match.
    pub fn side_of(&self, person_id: &str) -> Option<SlotIndex> {
        if self.player1.person_id().is_some_and(|p| p == person_id) {
            Some(SlotIndex::One)
        } else if self.player2.person_id().is_some_and(|p| p == person_id) {
            Some(SlotIndex::Two)
        } else {
            None
        }
    }

    /// The recorded winner as a slot occupant.
    pub fn winner(&self) -> Option<&SlotPlayer> {
        let winner_id = self.winner_id.as_deref()?;
        let side = self.side_of(winner_id)?;
        self.slot(side).player()
    }

    /// Person id of the other side of a completed two-player match.
    pub fn loser_id(&self) -> Option<&PersonId> {
        let winner_id = self.winner_id.as_deref()?;
        match self.side_of(winner_id)? {
            SlotIndex::One => self.player2.person_id(),
            SlotIndex::Two => self.player1.person_id(),
        }
    }
}
