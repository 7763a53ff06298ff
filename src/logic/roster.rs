//! Roster import from CSV.
//!
//! Expected header: `name,person_id,category,seed`. Only `name` is required;
//! a row without a person id becomes a guest entry.

use crate::error::{DrawError, DrawResult};
use crate::models::{Player, TournamentId};
use serde::Deserialize;
use std::io::Read;

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    #[serde(default)]
    pub person_id: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub seed: Option<u32>,
}

impl RosterEntry {
    pub fn into_player(self, tournament_id: TournamentId) -> Player {
        let name = self.name.trim().to_string();
        let mut player = match self.person_id.filter(|id| !id.trim().is_empty()) {
            Some(person_id) => Player::new(tournament_id, person_id.trim(), name),
            None => Player::guest(tournament_id, name),
        };
        player.category = self.category.filter(|c| !c.trim().is_empty());
        // Seeds are positive; 0 means unseeded.
        player.seed = self.seed.filter(|&s| s > 0);
        player
    }
}

/// Parse a roster. Rows with an empty name are rejected.
pub fn parse_roster<R: Read>(reader: R) -> DrawResult<Vec<RosterEntry>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut entries = Vec::new();
    for (line, row) in rdr.deserialize::<RosterEntry>().enumerate() {
        let entry =
            row.map_err(|e| DrawError::Validation(format!("Roster row {}: {e}", line + 1)))?;
        if entry.name.trim().is_empty() {
            return Err(DrawError::Validation(format!(
                "Roster row {}: name is empty",
                line + 1
            )));
        }
        entries.push(entry);
    }
    Ok(entries)
}
