//! Season standings: participation and podium points per player, plus the
//! placement inference they rely on.

use crate::logic::stats::compute_team_stats;
use crate::models::{
    LeagueMatch, Player, PlayerSeasonStats, TeamId, TeamStats, Tournament, TournamentFormat,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;

pub const PARTICIPATION_POINTS: i32 = 1;
pub const FIRST_PLACE_POINTS: i32 = 10;
pub const SECOND_PLACE_POINTS: i32 = 5;
pub const THIRD_PLACE_POINTS: i32 = 3;

/// Which tournaments count toward the table.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct StandingsFilter {
    /// Only tournaments of this class (division).
    pub class: Option<String>,
    /// Only tournaments completed on or after this instant (last season reset).
    pub season_start: Option<DateTime<Utc>>,
}

impl StandingsFilter {
    /// A tournament belongs to the season in which it was completed, not the
    /// one it was scheduled in. Records without a completion stamp fall back
    /// to their date.
    pub fn includes(&self, tournament: &Tournament) -> bool {
        let class_ok = match &self.class {
            Some(class) => tournament.class.as_deref() == Some(class.as_str()),
            None => true,
        };
        let finished = tournament.completed_at.unwrap_or(tournament.date);
        let season_ok = self.season_start.map_or(true, |start| finished >= start);
        class_ok && season_ok
    }
}

/// Top three teams of one tournament.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Placements {
    pub first: Option<TeamId>,
    pub second: Option<TeamId>,
    pub third: Option<TeamId>,
    /// True while the result can still change (tournament running, or more
    /// than one team still alive in the bracket).
    pub provisional: bool,
}

impl Placements {
    fn from_ranking(ranking: &[TeamId], provisional: bool) -> Self {
        Self {
            first: ranking.first().copied(),
            second: ranking.get(1).copied(),
            third: ranking.get(2).copied(),
            provisional,
        }
    }

    /// `(place, team)` for each filled podium spot.
    pub fn podium(&self) -> impl Iterator<Item = (u8, TeamId)> {
        [(1, self.first), (2, self.second), (3, self.third)]
            .into_iter()
            .filter_map(|(place, team)| team.map(|t| (place, t)))
    }
}

/// Frozen standings taken when an admin resets the season.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SeasonArchive {
    pub archived_at: DateTime<Utc>,
    pub standings: Vec<PlayerSeasonStats>,
}

impl SeasonArchive {
    /// Filter for the season that starts right after this archive.
    pub fn next_season_filter(&self) -> StandingsFilter {
        StandingsFilter {
            class: None,
            season_start: Some(self.archived_at),
        }
    }
}

/// Snapshot the current table; the next season counts from `now`.
pub fn archive_season(standings: Vec<PlayerSeasonStats>, now: DateTime<Utc>) -> SeasonArchive {
    log::info!("Season archived with {} ranked players", standings.len());
    SeasonArchive {
        archived_at: now,
        standings,
    }
}

/// 1st/2nd/3rd of a tournament, final or provisional.
///
/// Round robin takes the top three of the stats order. Double elimination
/// ranks teams still alive (fewer than two losses) in stats order, then
/// eliminated teams by most recent second loss.
pub fn tournament_placements(tournament: &Tournament, matches: &[LeagueMatch]) -> Placements {
    let stats = compute_team_stats(tournament, matches);
    match tournament.format {
        Some(TournamentFormat::DoubleElimination) => {
            double_elimination_placements(tournament, &stats, matches)
        }
        _ => {
            let ranking: Vec<TeamId> = stats.iter().map(|s| s.team_id).collect();
            Placements::from_ranking(&ranking, !tournament.is_completed())
        }
    }
}

fn double_elimination_placements(
    tournament: &Tournament,
    stats: &[TeamStats],
    matches: &[LeagueMatch],
) -> Placements {
    let mut history: Vec<&LeagueMatch> = matches
        .iter()
        .filter(|m| m.tournament_id == tournament.id && m.is_completed())
        .collect();
    history.sort_by_key(|m| m.created_at);

    let mut losses: HashMap<TeamId, Vec<DateTime<Utc>>> = HashMap::new();
    for m in history {
        if let Some(loser) = m.loser_team_id() {
            losses.entry(loser).or_default().push(m.created_at);
        }
    }
    let eliminated_at = |team: TeamId| losses.get(&team).and_then(|l| l.get(1)).copied();

    let active: Vec<TeamId> = stats
        .iter()
        .map(|s| s.team_id)
        .filter(|&t| eliminated_at(t).is_none())
        .collect();
    let mut eliminated: Vec<(TeamId, DateTime<Utc>)> = stats
        .iter()
        .filter_map(|s| eliminated_at(s.team_id).map(|at| (s.team_id, at)))
        .collect();
    eliminated.sort_by_key(|&(_, at)| Reverse(at));

    let ranking: Vec<TeamId> = if active.len() >= 3 {
        active.into_iter().take(3).collect()
    } else {
        active
            .iter()
            .copied()
            .chain(eliminated.iter().map(|&(t, _)| t))
            .collect()
    };
    let alive = stats.len() - eliminated.len();
    Placements::from_ranking(&ranking, !tournament.is_completed() || alive > 1)
}

/// Season table across every completed tournament the filter admits.
///
/// Each participating player gets one point per tournament; both players of
/// the podium teams get 10/5/3. Manual overrides are added last. Players with
/// no tournaments and no override are left out.
pub fn compute_season_standings(
    players: &[Player],
    tournaments: &[Tournament],
    matches: &[LeagueMatch],
    filter: &StandingsFilter,
) -> Vec<PlayerSeasonStats> {
    let mut table: Vec<PlayerSeasonStats> =
        players.iter().map(|p| PlayerSeasonStats::new(p.id)).collect();

    for tournament in tournaments
        .iter()
        .filter(|t| t.is_completed() && filter.includes(t))
    {
        for (row, player) in table.iter_mut().zip(players) {
            if tournament.has_player(player.id) {
                row.points += PARTICIPATION_POINTS;
                row.tournaments_played += 1;
            }
        }

        let placements = tournament_placements(tournament, matches);
        for (place, team_id) in placements.podium() {
            let Some(team) = tournament.team(team_id) else {
                continue;
            };
            for player_id in team.players() {
                if let Some(row) = table.iter_mut().find(|r| r.player_id == player_id) {
                    award_place(row, place);
                }
            }
        }
    }

    let mut standings: Vec<PlayerSeasonStats> = table
        .into_iter()
        .zip(players)
        .filter(|(row, player)| row.has_activity(player))
        .map(|(mut row, player)| {
            row.points += player.custom_season_points.unwrap_or(0);
            row
        })
        .collect();

    standings.sort_by_key(|s| {
        Reverse((
            s.points,
            s.first_place_finishes,
            s.second_place_finishes,
            s.third_place_finishes,
        ))
    });
    standings
}

fn award_place(row: &mut PlayerSeasonStats, place: u8) {
    match place {
        1 => {
            row.points += FIRST_PLACE_POINTS;
            row.first_place_finishes += 1;
        }
        2 => {
            row.points += SECOND_PLACE_POINTS;
            row.second_place_finishes += 1;
        }
        3 => {
            row.points += THIRD_PLACE_POINTS;
            row.third_place_finishes += 1;
        }
        _ => {}
    }
}
