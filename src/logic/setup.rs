//! Tournament lifecycle: format choice, start, reseed, reset and completion.

use crate::logic::bracket::generate_bracket;
use crate::logic::drop_table::{field_size_for, MIN_BRACKET_TEAMS};
use crate::logic::round_robin::{generate_round_robin, RoundRobinPlan, MAX_ROUND_ROBIN_TEAMS};
use crate::models::{
    BracketTeam, LeagueMatch, Team, Tournament, TournamentError, TournamentFormat, TournamentStatus,
};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

/// Format for a field: round robin for 2-8 teams, double elimination from 10.
pub fn select_format(team_count: usize) -> Result<TournamentFormat, TournamentError> {
    match team_count {
        0..=1 => Err(TournamentError::NotEnoughTeams {
            required: 2,
            actual: team_count,
        }),
        2..=MAX_ROUND_ROBIN_TEAMS => Ok(TournamentFormat::RoundRobin),
        n if n >= MIN_BRACKET_TEAMS && field_size_for(n).is_some() => {
            Ok(TournamentFormat::DoubleElimination)
        }
        n => Err(TournamentError::UnsupportedTeamCount(n)),
    }
}

/// Start the tournament: pick the format and generate the bracket or schedule.
///
/// Returns the new round-robin matches for the caller to store (empty for
/// double elimination, or when a schedule already exists). The tournament is
/// only modified on success.
pub fn start_tournament(
    tournament: &mut Tournament,
    existing: &[LeagueMatch],
    now: DateTime<Utc>,
) -> Result<Vec<LeagueMatch>, TournamentError> {
    if tournament.status != TournamentStatus::Setup {
        return Err(TournamentError::InvalidState);
    }
    let format = select_format(tournament.teams.len())?;
    let new_matches = match format {
        TournamentFormat::DoubleElimination => {
            tournament.bracket = Some(generate_bracket(&tournament.bracket_teams())?);
            Vec::new()
        }
        TournamentFormat::RoundRobin => {
            match generate_round_robin(
                tournament.id,
                &tournament.teams,
                tournament.available_pits,
                existing,
                false,
                now,
            )? {
                RoundRobinPlan::Generated { matches, .. } => matches,
                RoundRobinPlan::Unchanged => Vec::new(),
            }
        }
    };
    tournament.format = Some(format);
    tournament.status = TournamentStatus::InProgress;
    log::info!(
        "Tournament {} started as {:?} with {} teams",
        tournament.name,
        format,
        tournament.teams.len()
    );
    Ok(new_matches)
}

/// Throw away a round-robin schedule and build a fresh one.
pub fn regenerate_schedule(
    tournament: &Tournament,
    existing: &[LeagueMatch],
    now: DateTime<Utc>,
) -> Result<RoundRobinPlan, TournamentError> {
    if tournament.status != TournamentStatus::InProgress
        || tournament.format != Some(TournamentFormat::RoundRobin)
    {
        return Err(TournamentError::InvalidState);
    }
    generate_round_robin(
        tournament.id,
        &tournament.teams,
        tournament.available_pits,
        existing,
        true,
        now,
    )
}

/// Give teams seeds 1..=n in random order.
pub fn reseed_teams<R: Rng + ?Sized>(teams: &mut [Team], rng: &mut R) {
    let mut seeds: Vec<u32> = (1..=teams.len() as u32).collect();
    seeds.shuffle(rng);
    for (team, seed) in teams.iter_mut().zip(seeds) {
        team.seed = seed;
    }
}

/// Randomly reseed a running double-elimination tournament and replace its
/// bracket wholesale. The caller deletes the tournament's mirrored matches.
pub fn reseed_bracket<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    rng: &mut R,
) -> Result<(), TournamentError> {
    if tournament.status != TournamentStatus::InProgress
        || tournament.format != Some(TournamentFormat::DoubleElimination)
    {
        return Err(TournamentError::InvalidState);
    }
    let mut teams = tournament.teams.clone();
    reseed_teams(&mut teams, rng);
    let entrants: Vec<BracketTeam> = teams.iter().map(BracketTeam::from).collect();
    let bracket = generate_bracket(&entrants)?;
    tournament.teams = teams;
    tournament.bracket = Some(bracket);
    log::info!("Tournament {} reseeded", tournament.name);
    Ok(())
}

/// Back to Setup with the same teams; bracket dropped. The caller deletes the
/// tournament's matches.
pub fn reset_tournament(tournament: &mut Tournament) -> Result<(), TournamentError> {
    if tournament.status != TournamentStatus::InProgress {
        return Err(TournamentError::InvalidState);
    }
    tournament.status = TournamentStatus::Setup;
    tournament.format = None;
    tournament.bracket = None;
    log::info!("Tournament {} reset to setup", tournament.name);
    Ok(())
}

/// Mark the tournament completed so it counts toward season standings.
pub fn complete_tournament(tournament: &mut Tournament, now: DateTime<Utc>) -> Result<(), TournamentError> {
    if tournament.status != TournamentStatus::InProgress {
        return Err(TournamentError::InvalidState);
    }
    if let Some(bracket) = &tournament.bracket {
        if !bracket.is_complete() {
            log::warn!(
                "Tournament {} completed before the bracket produced a champion",
                tournament.name
            );
        }
    }
    tournament.status = TournamentStatus::Completed;
    tournament.completed_at = Some(now);
    Ok(())
}
