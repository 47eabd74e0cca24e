//! Integration tests for round-robin scheduling and league match scoring.

use chrono::{TimeZone, Utc};
use league_engine::{
    generate_round_robin, record_league_result, start_league_match, LeagueMatch, MatchStatus,
    RoundRobinFormat, RoundRobinPlan, Team, TournamentError,
};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

fn teams(n: u32) -> Vec<Team> {
    (1..=n)
        .map(|seed| Team::new(seed, Uuid::new_v4(), Uuid::new_v4(), format!("Team {seed}")))
        .collect()
}

fn schedule(teams: &[Team], pits: u32) -> Vec<LeagueMatch> {
    let now = Utc.with_ymd_and_hms(2026, 5, 1, 18, 0, 0).unwrap();
    match generate_round_robin(Uuid::new_v4(), teams, pits, &[], false, now).unwrap() {
        RoundRobinPlan::Generated { matches, replaced } => {
            assert!(replaced.is_empty());
            matches
        }
        RoundRobinPlan::Unchanged => panic!("expected a schedule"),
    }
}

fn games_per_team(matches: &[LeagueMatch]) -> HashMap<Uuid, usize> {
    let mut games = HashMap::new();
    for m in matches {
        *games.entry(m.team1_id).or_insert(0) += 1;
        *games.entry(m.team2_id).or_insert(0) += 1;
    }
    games
}

#[test]
fn format_policy_by_team_count() {
    let cases = [
        (2, 2, 21),
        (3, 2, 21),
        (4, 2, 30),
        (5, 2, 21),
        (6, 1, 30),
        (7, 1, 30),
        (8, 1, 21),
    ];
    for (n, cycles, target) in cases {
        let format = RoundRobinFormat::for_team_count(n).unwrap();
        assert_eq!((format.cycles, format.target_points), (cycles, target), "{n} teams");
    }
    assert_eq!(
        RoundRobinFormat::for_team_count(1),
        Err(TournamentError::NotEnoughTeams {
            required: 2,
            actual: 1
        })
    );
    assert_eq!(
        RoundRobinFormat::for_team_count(9),
        Err(TournamentError::UnsupportedTeamCount(9))
    );
}

#[test]
fn four_teams_play_each_other_twice() {
    let teams = teams(4);
    let matches = schedule(&teams, 0);
    assert_eq!(matches.len(), 12);
    let rounds: HashSet<u32> = matches.iter().map(|m| m.round).collect();
    assert_eq!(rounds, (1..=6).collect());
    assert!(games_per_team(&matches).values().all(|&g| g == 6));
    assert!(matches.iter().all(|m| m.target_points == Some(30)));
    assert!(matches.iter().all(|m| m.status == MatchStatus::Pending));
}

#[test]
fn second_cycle_swaps_sides() {
    let teams = teams(4);
    let matches = schedule(&teams, 0);
    let (first, second) = matches.split_at(6);
    for m in first {
        assert!(second
            .iter()
            .any(|r| r.team1_id == m.team2_id && r.team2_id == m.team1_id));
    }
    assert!(second.iter().all(|m| m.round > 3));
}

#[test]
fn odd_field_sits_one_team_out_each_round() {
    let teams = teams(5);
    let matches = schedule(&teams, 0);
    assert_eq!(matches.len(), 20);
    assert_eq!(matches.iter().map(|m| m.round).max(), Some(10));
    assert!(games_per_team(&matches).values().all(|&g| g == 8));
    assert!(matches.iter().all(|m| m.target_points == Some(21)));
}

#[test]
fn larger_fields_play_once() {
    for (n, expected, target) in [(6, 15, 30), (7, 21, 30), (8, 28, 21)] {
        let matches = schedule(&teams(n), 0);
        assert_eq!(matches.len(), expected, "{n} teams");
        assert!(games_per_team(&matches)
            .values()
            .all(|&g| g == n as usize - 1));
        assert!(matches.iter().all(|m| m.target_points == Some(target)));
    }
}

#[test]
fn two_teams_play_a_pair_of_matches() {
    let teams = teams(2);
    let matches = schedule(&teams, 1);
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].team1_id, matches[1].team2_id);
    assert_eq!((matches[0].round, matches[1].round), (1, 2));
}

#[test]
fn pits_wrap_in_creation_order() {
    let matches = schedule(&teams(6), 4);
    let pits: Vec<Option<u32>> = matches.iter().take(6).map(|m| m.pit_number).collect();
    assert_eq!(
        pits,
        vec![Some(1), Some(2), Some(3), Some(4), Some(1), Some(2)]
    );
    assert!(matches
        .windows(2)
        .all(|w| w[0].created_at < w[1].created_at));
}

#[test]
fn no_pits_leaves_matches_on_deck() {
    let matches = schedule(&teams(3), 0);
    assert!(matches.iter().all(|m| m.pit_number.is_none()));
}

#[test]
fn existing_schedule_is_kept_unless_forced() {
    let tournament_id = Uuid::new_v4();
    let teams = teams(4);
    let now = Utc::now();
    let RoundRobinPlan::Generated { matches, .. } =
        generate_round_robin(tournament_id, &teams, 2, &[], false, now).unwrap()
    else {
        panic!("expected a schedule");
    };

    let again = generate_round_robin(tournament_id, &teams, 2, &matches, false, now).unwrap();
    assert_eq!(again, RoundRobinPlan::Unchanged);

    let forced = generate_round_robin(tournament_id, &teams, 2, &matches, true, now).unwrap();
    let RoundRobinPlan::Generated { replaced, matches: fresh } = forced else {
        panic!("expected a schedule");
    };
    let old: HashSet<Uuid> = matches.iter().map(|m| m.id).collect();
    assert_eq!(replaced.into_iter().collect::<HashSet<_>>(), old);
    assert_eq!(fresh.len(), 12);
    assert!(fresh.iter().all(|m| !old.contains(&m.id)));
}

#[test]
fn other_tournaments_do_not_block_generation() {
    let teams = teams(4);
    let other = schedule(&teams, 0);
    let plan = generate_round_robin(Uuid::new_v4(), &teams, 0, &other, false, Utc::now()).unwrap();
    assert!(matches!(plan, RoundRobinPlan::Generated { .. }));
}

#[test]
fn recording_a_result() {
    let mut m = schedule(&teams(2), 1).remove(0);
    start_league_match(&mut m).unwrap();
    assert_eq!(m.status, MatchStatus::InProgress);
    assert_eq!(start_league_match(&mut m), Err(TournamentError::InvalidState));

    assert_eq!(
        record_league_result(&mut m, 18, 18, 2, 1),
        Err(TournamentError::TiedScore(18))
    );
    assert_eq!(m.status, MatchStatus::InProgress);

    record_league_result(&mut m, 12, 21, 1, 4).unwrap();
    assert_eq!(m.status, MatchStatus::Completed);
    assert_eq!(m.winner_team_id, Some(m.team2_id));
    assert_eq!(m.loser_team_id(), Some(m.team1_id));
    assert_eq!(m.score_for(m.team2_id), Some((21, 4)));

    assert_eq!(
        record_league_result(&mut m, 21, 12, 0, 0),
        Err(TournamentError::MatchAlreadyCompleted(m.id))
    );
}

#[test]
fn pending_match_can_be_scored_directly() {
    let mut m = schedule(&teams(2), 0).remove(0);
    record_league_result(&mut m, 21, 3, 0, 0).unwrap();
    assert_eq!(m.winner_team_id, Some(m.team1_id));
}

proptest! {
    #[test]
    fn every_pairing_played_once_per_cycle(n in 2u32..=8) {
        let teams = teams(n);
        let matches = schedule(&teams, 3);
        let cycles = RoundRobinFormat::for_team_count(n as usize).unwrap().cycles as usize;

        let mut pairings: HashMap<(Uuid, Uuid), usize> = HashMap::new();
        for m in &matches {
            prop_assert_ne!(m.team1_id, m.team2_id);
            let key = if m.team1_id < m.team2_id {
                (m.team1_id, m.team2_id)
            } else {
                (m.team2_id, m.team1_id)
            };
            *pairings.entry(key).or_insert(0) += 1;
        }
        let n = n as usize;
        prop_assert_eq!(pairings.len(), n * (n - 1) / 2);
        prop_assert!(pairings.values().all(|&c| c == cycles));

        let mut by_round: HashMap<u32, HashSet<Uuid>> = HashMap::new();
        for m in &matches {
            let seen = by_round.entry(m.round).or_default();
            prop_assert!(seen.insert(m.team1_id));
            prop_assert!(seen.insert(m.team2_id));
        }
    }
}
