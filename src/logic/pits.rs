//! Pit (court) reassignment for queued round-robin matches.

use crate::models::{LeagueMatch, MatchId, MatchStatus, TournamentId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// New pit for one match; `None` means "on deck".
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PitPatch {
    pub match_id: MatchId,
    pub pit_number: Option<u32>,
}

/// Hand free pits to the next pending matches of a tournament.
///
/// In-progress matches keep their pit. Pending matches are queued by
/// `(round, created_at)` and take the free pits in ascending order; the rest
/// go on deck. Only changed assignments are returned.
pub fn reassign_pits(
    tournament_id: TournamentId,
    matches: &[LeagueMatch],
    available_pits: u32,
) -> Vec<PitPatch> {
    let held: BTreeSet<u32> = of_tournament(matches, tournament_id)
        .filter(|m| m.status == MatchStatus::InProgress)
        .filter_map(|m| m.pit_number)
        .collect();
    let free: Vec<u32> = (1..=available_pits).filter(|p| !held.contains(p)).collect();

    let mut queue: Vec<&LeagueMatch> = of_tournament(matches, tournament_id)
        .filter(|m| m.status == MatchStatus::Pending)
        .collect();
    queue.sort_by_key(|m| (m.round, m.created_at));

    let patches: Vec<PitPatch> = queue
        .iter()
        .enumerate()
        .map(|(i, m)| (m, free.get(i).copied()))
        .filter(|(m, pit)| m.pit_number != *pit)
        .map(|(m, pit)| PitPatch {
            match_id: m.id,
            pit_number: pit,
        })
        .collect();

    log::debug!(
        "Pit reassignment for {}: {} held, {} free, {} changes",
        tournament_id,
        held.len(),
        free.len(),
        patches.len()
    );
    patches
}

fn of_tournament(
    matches: &[LeagueMatch],
    tournament_id: TournamentId,
) -> impl Iterator<Item = &LeagueMatch> {
    matches
        .iter()
        .filter(move |m| m.tournament_id == tournament_id)
}

/// Apply patches produced by [`reassign_pits`] to a match list.
pub fn apply_pit_patches(matches: &mut [LeagueMatch], patches: &[PitPatch]) {
    for patch in patches {
        if let Some(m) = matches.iter_mut().find(|m| m.id == patch.match_id) {
            m.pit_number = patch.pit_number;
        }
    }
}
