//! Tournament, its lifecycle enums, and TournamentError.

use crate::models::bracket::{Bracket, BracketTeam};
use crate::models::league_match::MatchId;
use crate::models::player::PlayerId;
use crate::models::team::{Team, TeamId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TournamentError {
    /// Too few teams for the requested format.
    #[error("Need at least {required} teams for this format (have {actual})")]
    NotEnoughTeams { required: usize, actual: usize },
    /// No supported format or field size for this many teams.
    #[error("No tournament format supports {0} teams")]
    UnsupportedTeamCount(usize),
    #[error("Team entered more than once")]
    DuplicateTeam(TeamId),
    /// Submitted score has no winner.
    #[error("Scores are tied at {0}; a match needs a winner")]
    TiedScore(u32),
    #[error("Match has already been completed")]
    MatchAlreadyCompleted(MatchId),
    /// One or both slots are still TBD.
    #[error("Match is still waiting on a team")]
    MatchNotReady(MatchId),
    #[error("Team is not playing in this match")]
    TeamNotInMatch(TeamId),
    /// Declared winner does not have the higher score.
    #[error("Winner scored {winner_score} but loser scored {loser_score}")]
    ScoreMismatch { winner_score: u32, loser_score: u32 },
    /// Tournament is not in a state that allows this action.
    #[error("Invalid state for this action")]
    InvalidState,
    #[error("A team needs two different players")]
    SamePlayerTwice,
    /// Player is already on another team in this tournament.
    #[error("Player is already on a team in this tournament")]
    PlayerAlreadyOnTeam(PlayerId),
    #[error("Player name must not be blank")]
    BlankPlayerName,
    /// A player with this name already exists (names are unique, case-insensitive).
    #[error("A player with this name already exists")]
    DuplicatePlayerName,
    /// Prize pool for this fee and field does not fit in a u64 of cents.
    #[error("Entry fee of {0} cents is too large to compute a prize pool")]
    EntryFeeTooLarge(u64),
    #[error("Roster import failed: {0}")]
    RosterImport(String),
    #[error("Match not found")]
    MatchNotFound(MatchId),
    #[error("Team not found")]
    TeamNotFound(TeamId),
    #[error("Player not found")]
    PlayerNotFound(PlayerId),
    #[error("Tournament not found")]
    TournamentNotFound(TournamentId),
    /// Bracket topology broken: a programming error, never recovered silently.
    #[error("Bracket is inconsistent: {0}")]
    InconsistentBracket(String),
}

/// Coarse category of a [`TournamentError`], used to decide how to surface it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Correctable by the director (wrong input, wrong moment).
    Precondition,
    /// Unknown id; nothing was changed.
    NotFound,
    /// Invariant violation; treat as fatal.
    InconsistentState,
}

impl TournamentError {
    pub fn kind(&self) -> ErrorKind {
        use TournamentError::*;
        match self {
            MatchNotFound(_) | TeamNotFound(_) | PlayerNotFound(_) | TournamentNotFound(_) => {
                ErrorKind::NotFound
            }
            InconsistentBracket(_) => ErrorKind::InconsistentState,
            _ => ErrorKind::Precondition,
        }
    }
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Current phase of the tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Entering teams; nothing generated yet.
    #[default]
    Setup,
    InProgress,
    /// Counts toward season standings.
    Completed,
}

/// How the tournament is played, chosen from the team count at start.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    RoundRobin,
    DoubleElimination,
}

/// One tournament night: teams, format, and (for double elimination) the bracket.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    /// Division label used by the standings class filter.
    #[serde(default)]
    pub class: Option<String>,
    pub date: DateTime<Utc>,
    pub status: TournamentStatus,
    /// Set when the tournament starts.
    pub format: Option<TournamentFormat>,
    pub teams: Vec<Team>,
    /// Per-player entry fee.
    pub entry_fee_cents: u64,
    pub available_pits: u32,
    pub bracket: Option<Bracket>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Tournament {
    /// Create a new tournament in Setup state with no teams.
    pub fn new(name: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            class: None,
            date,
            status: TournamentStatus::Setup,
            format: None,
            teams: Vec::new(),
            entry_fee_cents: 0,
            available_pits: 0,
            bracket: None,
            completed_at: None,
        }
    }

    /// Create a tournament with initial teams. Still in Setup until started.
    pub fn with_teams(name: impl Into<String>, date: DateTime<Utc>, teams: Vec<Team>) -> Self {
        Self {
            teams,
            ..Self::new(name, date)
        }
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn team_mut(&mut self, id: TeamId) -> Option<&mut Team> {
        self.teams.iter_mut().find(|t| t.id == id)
    }

    pub fn has_team(&self, id: TeamId) -> bool {
        self.team(id).is_some()
    }

    /// Teams ordered by seed (stable on entry order).
    pub fn teams_by_seed(&self) -> Vec<&Team> {
        let mut teams: Vec<&Team> = self.teams.iter().collect();
        teams.sort_by_key(|t| t.seed);
        teams
    }

    pub fn bracket_teams(&self) -> Vec<BracketTeam> {
        self.teams_by_seed().into_iter().map(BracketTeam::from).collect()
    }

    /// True when either of the player's teams is entered.
    pub fn has_player(&self, player_id: PlayerId) -> bool {
        self.teams.iter().any(|t| t.has_player(player_id))
    }

    pub fn is_completed(&self) -> bool {
        self.status == TournamentStatus::Completed
    }

    /// Enter a team (only valid in Setup). A player may only be on one team.
    pub fn add_team(&mut self, team: Team) -> Result<(), TournamentError> {
        if self.status != TournamentStatus::Setup {
            return Err(TournamentError::InvalidState);
        }
        if team.player1_id == team.player2_id {
            return Err(TournamentError::SamePlayerTwice);
        }
        if self.has_team(team.id) {
            return Err(TournamentError::DuplicateTeam(team.id));
        }
        if let Some(&taken) = team.players().iter().find(|&&p| self.has_player(p)) {
            return Err(TournamentError::PlayerAlreadyOnTeam(taken));
        }
        self.teams.push(team);
        Ok(())
    }

    /// Remove a team by id (only valid in Setup).
    pub fn remove_team(&mut self, team_id: TeamId) -> Result<(), TournamentError> {
        if self.status != TournamentStatus::Setup {
            return Err(TournamentError::InvalidState);
        }
        let idx = self
            .teams
            .iter()
            .position(|t| t.id == team_id)
            .ok_or(TournamentError::TeamNotFound(team_id))?;
        self.teams.remove(idx);
        Ok(())
    }

    /// Cosmetic rename, allowed in any state.
    pub fn rename_team(&mut self, team_id: TeamId, name: impl Into<String>) -> Result<(), TournamentError> {
        self.team_mut(team_id)
            .ok_or(TournamentError::TeamNotFound(team_id))?
            .rename(name);
        Ok(())
    }
}
