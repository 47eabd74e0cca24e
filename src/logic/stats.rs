//! Per-tournament team statistics, folded from completed match history.

use crate::models::{LeagueMatch, TeamStats, Tournament};

/// Win/loss/point totals for every team of `tournament`, best first.
///
/// Only completed matches of this tournament count. Order is wins desc then
/// losses asc; teams still tied keep seed order.
pub fn compute_team_stats(tournament: &Tournament, matches: &[LeagueMatch]) -> Vec<TeamStats> {
    let mut stats: Vec<TeamStats> = tournament
        .teams_by_seed()
        .into_iter()
        .map(|t| TeamStats::new(t.id))
        .collect();

    for m in matches
        .iter()
        .filter(|m| m.tournament_id == tournament.id && m.is_completed())
    {
        let loser = m.loser_team_id();
        for team_id in [m.team1_id, m.team2_id] {
            let Some(row) = stats.iter_mut().find(|s| s.team_id == team_id) else {
                log::warn!("Match {} references team {} outside the tournament", m.id, team_id);
                continue;
            };
            let (points, ringers) = m.score_for(team_id).unwrap_or_default();
            row.total_points += points;
            row.total_ringers += ringers;
            row.matches += 1;
            if m.winner_team_id == Some(team_id) {
                row.wins += 1;
            } else if loser == Some(team_id) {
                row.losses += 1;
            }
        }
    }

    stats.sort_by(|a, b| b.wins.cmp(&a.wins).then(a.losses.cmp(&b.losses)));
    stats
}
