//! LeagueMatch: the flat, persisted match history of a tournament.

use crate::models::team::TeamId;
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match (league or bracket).
pub type MatchId = Uuid;

/// Lifecycle of a match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

/// One played (or scheduled) match between two teams.
///
/// Round-robin tournaments populate these directly; double-elimination
/// tournaments get one row per completed bracket match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LeagueMatch {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub team1_id: TeamId,
    pub team2_id: TeamId,
    pub team1_score: u32,
    pub team2_score: u32,
    pub team1_ringers: u32,
    pub team2_ringers: u32,
    /// None until the match is completed.
    pub winner_team_id: Option<TeamId>,
    pub status: MatchStatus,
    pub round: u32,
    pub target_points: Option<u32>,
    pub pit_number: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl LeagueMatch {
    /// A scheduled match that has not started yet.
    pub fn pending(
        tournament_id: TournamentId,
        team1_id: TeamId,
        team2_id: TeamId,
        round: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            team1_id,
            team2_id,
            team1_score: 0,
            team2_score: 0,
            team1_ringers: 0,
            team2_ringers: 0,
            winner_team_id: None,
            status: MatchStatus::Pending,
            round,
            target_points: None,
            pit_number: None,
            created_at,
        }
    }

    pub fn with_target_points(mut self, target_points: u32) -> Self {
        self.target_points = Some(target_points);
        self
    }

    pub fn with_pit(mut self, pit_number: Option<u32>) -> Self {
        self.pit_number = pit_number;
        self
    }

    pub fn involves(&self, team_id: TeamId) -> bool {
        self.team1_id == team_id || self.team2_id == team_id
    }

    /// The team that lost a completed match, if the match has a winner.
    pub fn loser_team_id(&self) -> Option<TeamId> {
        if self.status != MatchStatus::Completed {
            return None;
        }
        match self.winner_team_id {
            Some(w) if w == self.team1_id => Some(self.team2_id),
            Some(w) if w == self.team2_id => Some(self.team1_id),
            _ => None,
        }
    }

    /// Score and ringers credited to `team_id` in this match.
    pub fn score_for(&self, team_id: TeamId) -> Option<(u32, u32)> {
        if team_id == self.team1_id {
            Some((self.team1_score, self.team1_ringers))
        } else if team_id == self.team2_id {
            Some((self.team2_score, self.team2_ringers))
        } else {
            None
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }
}
