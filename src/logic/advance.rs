//! Result entry and winner propagation along the bracket's forward links.

use crate::error::{DrawError, DrawResult};
use crate::models::{Match, MatchStatus, NextMatch, SetScore, Slot, SlotIndex, SlotPlayer};
use chrono::Utc;

/// Record a played result on `m`.
///
/// The winner must occupy one of the two slots and both slots must hold a
/// player. Re-recording overwrites the previous result.
pub fn record_result(
    m: &mut Match,
    sets: Vec<SetScore>,
    winner_id: &str,
    is_withdrawal: bool,
) -> DrawResult<()> {
    if m.is_bye() {
        return Err(DrawError::Validation(
            "A bye is decided when the bracket is built".to_string(),
        ));
    }
    if m.player1.player().is_none() || m.player2.player().is_none() {
        return Err(DrawError::Validation(
            "Both players must be known before scoring".to_string(),
        ));
    }
    if m.side_of(winner_id).is_none() {
        return Err(DrawError::Validation(format!(
            "Winner {winner_id} does not play in this match"
        )));
    }
    m.sets = sets;
    m.winner_id = Some(winner_id.to_string());
    m.is_withdrawal = is_withdrawal;
    m.status = MatchStatus::Completed;
    m.completed_at = Some(Utc::now());
    Ok(())
}

/// Complete a match that has a player on one side and a bye on the other.
/// Returns the player who walks through.
pub fn complete_bye(m: &mut Match) -> Option<SlotPlayer> {
    let player = match (&m.player1, &m.player2) {
        (Slot::Filled(p), Slot::Bye) | (Slot::Bye, Slot::Filled(p)) => p.clone(),
        _ => return None,
    };
    m.winner_id = Some(player.person_id.clone());
    m.status = MatchStatus::Completed;
    m.completed_at = Some(Utc::now());
    Some(player)
}

/// The slot write that carries a completed match's winner to its parent.
/// None for the final or an undecided match.
pub fn advancement(completed: &Match) -> Option<(NextMatch, Slot)> {
    if !completed.is_completed() {
        return None;
    }
    let next = completed.next_match()?;
    let winner = completed.winner()?;
    Some((next, Slot::Filled(winner.clone())))
}

/// Write `winner` into one slot of `parent`. Applying it twice changes nothing.
pub fn apply_winner(parent: &mut Match, slot: SlotIndex, winner: SlotPlayer) {
    *parent.slot_mut(slot) = Slot::Filled(winner);
}
