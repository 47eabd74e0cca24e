//! Round-robin schedules for small fields (2-8 teams), with pit assignment.

use crate::models::{LeagueMatch, MatchId, MatchStatus, Team, TournamentError, TournamentId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Largest field played as a round robin.
pub const MAX_ROUND_ROBIN_TEAMS: usize = 8;

/// How many times every pairing is played, and to how many points.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundRobinFormat {
    /// 1 = single round robin, 2 = double.
    pub cycles: u32,
    pub target_points: u32,
}

impl RoundRobinFormat {
    /// League policy by field size.
    pub fn for_team_count(team_count: usize) -> Result<Self, TournamentError> {
        let (cycles, target_points) = match team_count {
            0..=1 => {
                return Err(TournamentError::NotEnoughTeams {
                    required: 2,
                    actual: team_count,
                })
            }
            2..=3 => (2, 21),
            4 => (2, 30),
            5 => (2, 21),
            6 | 7 => (1, 30),
            8 => (1, 21),
            _ => return Err(TournamentError::UnsupportedTeamCount(team_count)),
        };
        Ok(Self {
            cycles,
            target_points,
        })
    }

    pub fn is_double(&self) -> bool {
        self.cycles == 2
    }
}

/// Result of a schedule request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RoundRobinPlan {
    /// Matches already exist and regeneration was not forced.
    Unchanged,
    /// Caller deletes `replaced` first, then stores `matches`.
    Generated {
        replaced: Vec<MatchId>,
        matches: Vec<LeagueMatch>,
    },
}

/// One cycle of the circle method over `team_count` teams.
///
/// Returns rounds of `(i, j)` index pairs. Odd counts get a synthetic bye
/// slot; pairings against it are dropped.
pub fn circle_rounds(team_count: usize) -> Vec<Vec<(usize, usize)>> {
    let mut slots: Vec<Option<usize>> = (0..team_count).map(Some).collect();
    if team_count % 2 == 1 {
        slots.push(None);
    }
    let n = slots.len();
    if n < 2 {
        return Vec::new();
    }

    let mut rounds = Vec::with_capacity(n - 1);
    for _ in 0..n - 1 {
        let pairs = (0..n / 2)
            .filter_map(|i| match (slots[i], slots[n - 1 - i]) {
                (Some(a), Some(b)) => Some((a, b)),
                _ => None,
            })
            .collect();
        rounds.push(pairs);
        // Slot 0 stays fixed; everyone else moves one seat.
        slots[1..].rotate_right(1);
    }
    rounds
}

/// Build the full pending schedule for a round-robin tournament.
///
/// Existing matches make this a no-op unless `force_regenerate` is set, in
/// which case their ids are returned for deletion alongside the new schedule.
pub fn generate_round_robin(
    tournament_id: TournamentId,
    teams: &[Team],
    available_pits: u32,
    existing: &[LeagueMatch],
    force_regenerate: bool,
    now: DateTime<Utc>,
) -> Result<RoundRobinPlan, TournamentError> {
    let format = RoundRobinFormat::for_team_count(teams.len())?;

    let replaced: Vec<MatchId> = existing
        .iter()
        .filter(|m| m.tournament_id == tournament_id)
        .map(|m| m.id)
        .collect();
    if !replaced.is_empty() && !force_regenerate {
        log::warn!(
            "Tournament {} already has {} matches; not regenerating",
            tournament_id,
            replaced.len()
        );
        return Ok(RoundRobinPlan::Unchanged);
    }

    let mut ordered: Vec<&Team> = teams.iter().collect();
    ordered.sort_by_key(|t| t.seed);

    let cycle = circle_rounds(ordered.len());
    let mut matches: Vec<LeagueMatch> = Vec::new();
    let mut round = 0u32;
    for c in 0..format.cycles {
        for pairs in &cycle {
            round += 1;
            for &(a, b) in pairs {
                // Second cycle flips sides.
                let (t1, t2) = if c % 2 == 0 { (a, b) } else { (b, a) };
                let k = matches.len();
                let pit = (available_pits > 0).then(|| (k as u32 % available_pits) + 1);
                let created_at = now + Duration::milliseconds(k as i64);
                matches.push(
                    LeagueMatch::pending(tournament_id, ordered[t1].id, ordered[t2].id, round, created_at)
                        .with_target_points(format.target_points)
                        .with_pit(pit),
                );
            }
        }
    }

    log::info!(
        "Generated {} round robin: {} teams, {} rounds, {} matches to {} points",
        if format.is_double() { "double" } else { "single" },
        ordered.len(),
        round,
        matches.len(),
        format.target_points
    );
    Ok(RoundRobinPlan::Generated { replaced, matches })
}

/// Put a pending match on its pit.
pub fn start_league_match(m: &mut LeagueMatch) -> Result<(), TournamentError> {
    match m.status {
        MatchStatus::Pending => {
            m.status = MatchStatus::InProgress;
            Ok(())
        }
        MatchStatus::InProgress => Err(TournamentError::InvalidState),
        MatchStatus::Completed => Err(TournamentError::MatchAlreadyCompleted(m.id)),
    }
}

/// Score a round-robin match. The higher score wins; ties are rejected.
pub fn record_league_result(
    m: &mut LeagueMatch,
    team1_score: u32,
    team2_score: u32,
    team1_ringers: u32,
    team2_ringers: u32,
) -> Result<(), TournamentError> {
    if team1_score == team2_score {
        return Err(TournamentError::TiedScore(team1_score));
    }
    if m.status == MatchStatus::Completed {
        return Err(TournamentError::MatchAlreadyCompleted(m.id));
    }
    m.team1_score = team1_score;
    m.team2_score = team2_score;
    m.team1_ringers = team1_ringers;
    m.team2_ringers = team2_ringers;
    m.winner_team_id = Some(if team1_score > team2_score {
        m.team1_id
    } else {
        m.team2_id
    });
    m.status = MatchStatus::Completed;
    Ok(())
}
