//! Double-elimination bracket: slots, matches, rounds and the derived flat view.

use crate::models::league_match::{LeagueMatch, MatchId, MatchStatus};
use crate::models::team::{Team, TeamId};
use crate::models::tournament::{TournamentError, TournamentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// A team as the bracket sees it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketTeam {
    pub id: TeamId,
    pub name: String,
    pub seed: u32,
}

impl BracketTeam {
    pub fn new(id: TeamId, name: impl Into<String>, seed: u32) -> Self {
        Self {
            id,
            name: name.into(),
            seed,
        }
    }
}

impl From<&Team> for BracketTeam {
    fn from(team: &Team) -> Self {
        Self::new(team.id, team.name.clone(), team.seed)
    }
}

/// One side of a bracket match.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "team", rename_all = "snake_case")]
pub enum Slot {
    /// Waiting on a feeder match ("TBD").
    #[default]
    Empty,
    Scheduled(BracketTeam),
    /// Will never be filled; the opponent advances without playing.
    Bye,
}

impl Slot {
    pub fn team(&self) -> Option<&BracketTeam> {
        match self {
            Slot::Scheduled(team) => Some(team),
            Slot::Empty | Slot::Bye => None,
        }
    }

    pub fn team_id(&self) -> Option<TeamId> {
        self.team().map(|t| t.id)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    pub fn is_bye(&self) -> bool {
        matches!(self, Slot::Bye)
    }
}

/// Which side of a match a slot is on.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotSide {
    Team1,
    Team2,
}

impl SlotSide {
    /// Even positions feed team1, odd positions feed team2.
    pub fn from_position(position: u32) -> Self {
        if position % 2 == 0 {
            SlotSide::Team1
        } else {
            SlotSide::Team2
        }
    }
}

/// Half of the bracket a match belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketSection {
    Winners,
    Losers,
    Finals,
}

/// A single slot-pair in the bracket. Owns no pointer to the next match; the
/// destination is derived from `(section, round, position)`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketMatch {
    pub id: MatchId,
    /// Stable, 1-based number shown to directors.
    pub match_number: u32,
    /// 1-based round within the section.
    pub round: u32,
    /// 0-based index within the round.
    pub position: u32,
    pub section: BracketSection,
    pub team1: Slot,
    pub team2: Slot,
    pub team1_score: u32,
    pub team2_score: u32,
    pub status: MatchStatus,
    pub winner_id: Option<TeamId>,
    pub loser_id: Option<TeamId>,
}

impl BracketMatch {
    pub fn new(match_number: u32, section: BracketSection, round: u32, position: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            match_number,
            round,
            position,
            section,
            team1: Slot::Empty,
            team2: Slot::Empty,
            team1_score: 0,
            team2_score: 0,
            status: MatchStatus::Pending,
            winner_id: None,
            loser_id: None,
        }
    }

    pub fn slot(&self, side: SlotSide) -> &Slot {
        match side {
            SlotSide::Team1 => &self.team1,
            SlotSide::Team2 => &self.team2,
        }
    }

    pub fn slot_mut(&mut self, side: SlotSide) -> &mut Slot {
        match side {
            SlotSide::Team1 => &mut self.team1,
            SlotSide::Team2 => &mut self.team2,
        }
    }

    /// Both teams known and not yet completed.
    pub fn is_ready(&self) -> bool {
        self.status != MatchStatus::Completed
            && self.team1.team().is_some()
            && self.team2.team().is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// Resolved without play because one (or both) sides was a bye.
    pub fn is_bye(&self) -> bool {
        self.team1.is_bye() || self.team2.is_bye()
    }

    pub fn has_team(&self, team_id: TeamId) -> bool {
        self.team1.team_id() == Some(team_id) || self.team2.team_id() == Some(team_id)
    }

    /// Flat history row for a completed, actually played match.
    pub fn to_league_match(
        &self,
        tournament_id: TournamentId,
        created_at: DateTime<Utc>,
    ) -> Result<LeagueMatch, TournamentError> {
        let (team1, team2) = match (self.team1.team_id(), self.team2.team_id()) {
            (Some(t1), Some(t2)) if self.is_completed() => (t1, t2),
            _ => return Err(TournamentError::InvalidState),
        };
        let mut row = LeagueMatch::pending(tournament_id, team1, team2, self.round, created_at);
        row.team1_score = self.team1_score;
        row.team2_score = self.team2_score;
        row.winner_team_id = self.winner_id;
        row.status = MatchStatus::Completed;
        Ok(row)
    }
}

/// One round of one section.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Round {
    /// 1-based round number within the section.
    pub number: u32,
    pub name: String,
    pub matches: Vec<BracketMatch>,
}

/// Full double-elimination bracket.
///
/// The round-nested arrays are the only storage; the flat list of every match
/// is derived by [`Bracket::all_matches`], so the two views cannot drift apart.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    /// Power of two the team count was rounded up to.
    pub field_size: u32,
    pub winners_rounds: Vec<Round>,
    pub losers_rounds: Vec<Round>,
    /// Grand final, then the reset match.
    pub finals_rounds: Vec<Round>,
}

impl Bracket {
    /// Every match, in match-number order (winners, losers, finals).
    pub fn all_matches(&self) -> impl Iterator<Item = &BracketMatch> {
        self.winners_rounds
            .iter()
            .chain(self.losers_rounds.iter())
            .chain(self.finals_rounds.iter())
            .flat_map(|r| r.matches.iter())
    }

    pub fn all_matches_mut(&mut self) -> impl Iterator<Item = &mut BracketMatch> {
        self.winners_rounds
            .iter_mut()
            .chain(self.losers_rounds.iter_mut())
            .chain(self.finals_rounds.iter_mut())
            .flat_map(|r| r.matches.iter_mut())
    }

    pub fn match_count(&self) -> usize {
        self.all_matches().count()
    }

    pub fn rounds(&self, section: BracketSection) -> &[Round] {
        match section {
            BracketSection::Winners => &self.winners_rounds,
            BracketSection::Losers => &self.losers_rounds,
            BracketSection::Finals => &self.finals_rounds,
        }
    }

    fn rounds_mut(&mut self, section: BracketSection) -> &mut Vec<Round> {
        match section {
            BracketSection::Winners => &mut self.winners_rounds,
            BracketSection::Losers => &mut self.losers_rounds,
            BracketSection::Finals => &mut self.finals_rounds,
        }
    }

    pub fn find_match(&self, id: MatchId) -> Option<&BracketMatch> {
        self.all_matches().find(|m| m.id == id)
    }

    pub fn match_by_number(&self, match_number: u32) -> Option<&BracketMatch> {
        self.all_matches().find(|m| m.match_number == match_number)
    }

    /// Match at a topology coordinate (round is 1-based, position 0-based).
    pub fn match_at(&self, section: BracketSection, round: u32, position: u32) -> Option<&BracketMatch> {
        let idx = round.checked_sub(1)? as usize;
        self.rounds(section).get(idx)?.matches.get(position as usize)
    }

    pub fn match_at_mut(
        &mut self,
        section: BracketSection,
        round: u32,
        position: u32,
    ) -> Option<&mut BracketMatch> {
        let idx = round.checked_sub(1)? as usize;
        self.rounds_mut(section)
            .get_mut(idx)?
            .matches
            .get_mut(position as usize)
    }

    pub fn grand_final(&self) -> Option<&BracketMatch> {
        self.match_at(BracketSection::Finals, 1, 0)
    }

    pub fn reset_match(&self) -> Option<&BracketMatch> {
        self.match_at(BracketSection::Finals, 2, 0)
    }

    /// Losses are never stored on the team; they are counted from results.
    pub fn loss_count(&self, team_id: TeamId) -> usize {
        self.all_matches()
            .filter(|m| m.is_completed() && m.loser_id == Some(team_id))
            .count()
    }

    pub fn is_eliminated(&self, team_id: TeamId) -> bool {
        self.loss_count(team_id) >= 2
    }

    /// The tournament winner, once the bracket is decided.
    pub fn champion(&self) -> Option<TeamId> {
        if let Some(reset) = self.reset_match() {
            if reset.is_completed() {
                return reset.winner_id;
            }
        }
        let grand_final = self.grand_final()?;
        if !grand_final.is_completed() {
            return None;
        }
        // Winners champion (team1) took game one: no reset needed.
        if grand_final.winner_id.is_some() && grand_final.winner_id == grand_final.team1.team_id() {
            grand_final.winner_id
        } else {
            None
        }
    }

    pub fn is_complete(&self) -> bool {
        self.champion().is_some()
    }

    /// Teams entered in the bracket, by seed.
    pub fn teams(&self) -> Vec<BracketTeam> {
        let mut teams: Vec<BracketTeam> = self
            .winners_rounds
            .first()
            .map(|r| {
                r.matches
                    .iter()
                    .flat_map(|m| [m.team1.team(), m.team2.team()])
                    .flatten()
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        teams.sort_by_key(|t| t.seed);
        teams
    }

    /// Matches a director can score right now.
    pub fn ready_matches(&self) -> Vec<&BracketMatch> {
        self.all_matches().filter(|m| m.is_ready()).collect()
    }

    /// Check structural invariants: match count, gap-free unique numbering,
    /// unique ids and coordinates that agree with array positions.
    pub fn validate(&self) -> Result<(), TournamentError> {
        let expected = (self.field_size as usize * 2).saturating_sub(1);
        let count = self.match_count();
        if count != expected {
            return Err(TournamentError::InconsistentBracket(format!(
                "expected {expected} matches for a field of {}, found {count}",
                self.field_size
            )));
        }
        let mut numbers: Vec<u32> = self.all_matches().map(|m| m.match_number).collect();
        numbers.sort_unstable();
        if numbers.iter().enumerate().any(|(i, &n)| n as usize != i + 1) {
            return Err(TournamentError::InconsistentBracket(
                "match numbers are not 1..N without gaps".to_string(),
            ));
        }
        let mut ids = HashSet::with_capacity(count);
        if !self.all_matches().all(|m| ids.insert(m.id)) {
            return Err(TournamentError::InconsistentBracket(
                "duplicate match id".to_string(),
            ));
        }
        for section in [BracketSection::Winners, BracketSection::Losers, BracketSection::Finals] {
            for (r, round) in self.rounds(section).iter().enumerate() {
                for (p, m) in round.matches.iter().enumerate() {
                    if m.section != section || m.round as usize != r + 1 || m.position as usize != p {
                        return Err(TournamentError::InconsistentBracket(format!(
                            "match {} is stored at the wrong coordinate",
                            m.match_number
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}
