//! Player registry helpers: name validation and CSV roster import.

use crate::models::{Player, TournamentError};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct RosterRow {
    name: String,
    #[serde(default)]
    class: Option<String>,
}

/// Trimmed name, or an error if blank or already taken (case-insensitive).
pub fn validate_player_name<'a>(name: &'a str, existing: &[Player]) -> Result<&'a str, TournamentError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TournamentError::BlankPlayerName);
    }
    if existing.iter().any(|p| p.name.eq_ignore_ascii_case(trimmed)) {
        return Err(TournamentError::DuplicatePlayerName);
    }
    Ok(trimmed)
}

/// Read players from CSV with a `name` column and an optional `class` column.
///
/// The whole file is rejected if any row is blank or duplicates a name, either
/// in `existing` or earlier in the file.
pub fn import_players_csv<R: Read>(reader: R, existing: &[Player]) -> Result<Vec<Player>, TournamentError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut known: Vec<Player> = existing.to_vec();
    let mut imported = Vec::new();

    for row in rdr.deserialize::<RosterRow>() {
        let row = row.map_err(|e| TournamentError::RosterImport(e.to_string()))?;
        let name = validate_player_name(&row.name, &known)?.to_string();
        let mut player = Player::new(name);
        player.class = row.class.filter(|c| !c.is_empty());
        known.push(player.clone());
        imported.push(player);
    }

    log::info!("Imported {} players from roster", imported.len());
    Ok(imported)
}
