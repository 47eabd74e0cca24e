//! Integration tests for pit reassignment.

use chrono::{Duration, Utc};
use league_engine::logic::apply_pit_patches;
use league_engine::{reassign_pits, LeagueMatch, MatchStatus, PitPatch};
use uuid::Uuid;

fn queue(tournament_id: Uuid, rounds: &[u32]) -> Vec<LeagueMatch> {
    let start = Utc::now();
    rounds
        .iter()
        .enumerate()
        .map(|(k, &round)| {
            LeagueMatch::pending(
                tournament_id,
                Uuid::new_v4(),
                Uuid::new_v4(),
                round,
                start + Duration::milliseconds(k as i64),
            )
        })
        .collect()
}

#[test]
fn pending_matches_fill_pits_in_order() {
    let tid = Uuid::new_v4();
    let mut matches = queue(tid, &[1, 1, 1, 2, 2]);
    let patches = reassign_pits(tid, &matches, 3);
    apply_pit_patches(&mut matches, &patches);
    let pits: Vec<Option<u32>> = matches.iter().map(|m| m.pit_number).collect();
    assert_eq!(pits, vec![Some(1), Some(2), Some(3), None, None]);
}

#[test]
fn in_progress_matches_keep_their_pit() {
    let tid = Uuid::new_v4();
    let mut matches = queue(tid, &[1, 1, 2, 2]);
    matches[1].status = MatchStatus::InProgress;
    matches[1].pit_number = Some(1);
    let patches = reassign_pits(tid, &matches, 2);
    assert!(patches.iter().all(|p| p.match_id != matches[1].id));

    apply_pit_patches(&mut matches, &patches);
    assert_eq!(matches[0].pit_number, Some(2));
    assert_eq!(matches[1].pit_number, Some(1));
    assert_eq!(matches[2].pit_number, None);
    assert_eq!(matches[3].pit_number, None);
}

#[test]
fn earlier_rounds_go_first_regardless_of_creation() {
    let tid = Uuid::new_v4();
    let matches = queue(tid, &[3, 1, 2]);
    let patches = reassign_pits(tid, &matches, 1);
    assert_eq!(
        patches,
        vec![PitPatch {
            match_id: matches[1].id,
            pit_number: Some(1)
        }]
    );
}

#[test]
fn only_changes_are_reported() {
    let tid = Uuid::new_v4();
    let mut matches = queue(tid, &[1, 1, 2]);
    let first = reassign_pits(tid, &matches, 2);
    assert_eq!(first.len(), 2);
    apply_pit_patches(&mut matches, &first);
    assert!(reassign_pits(tid, &matches, 2).is_empty());

    // A finished match frees its pit for the next one in line.
    matches[0].status = MatchStatus::Completed;
    let next = reassign_pits(tid, &matches, 2);
    assert_eq!(
        next,
        vec![
            PitPatch {
                match_id: matches[1].id,
                pit_number: Some(1)
            },
            PitPatch {
                match_id: matches[2].id,
                pit_number: Some(2)
            },
        ]
    );
}

#[test]
fn no_pits_puts_everyone_on_deck() {
    let tid = Uuid::new_v4();
    let mut matches = queue(tid, &[1, 1]);
    matches[0].pit_number = Some(1);
    let patches = reassign_pits(tid, &matches, 0);
    assert_eq!(
        patches,
        vec![PitPatch {
            match_id: matches[0].id,
            pit_number: None
        }]
    );
}

#[test]
fn other_tournaments_ignored() {
    let tid = Uuid::new_v4();
    let mut matches = queue(tid, &[1]);
    let mut other = queue(Uuid::new_v4(), &[1]);
    other[0].status = MatchStatus::InProgress;
    other[0].pit_number = Some(1);
    matches.extend(other);
    let patches = reassign_pits(tid, &matches, 1);
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].pit_number, Some(1));
}
