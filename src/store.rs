//! In-memory league store used by the web app.
//!
//! The store owns every collection the engine works on. Each mutation runs
//! the pure engine function first and only then applies its result, marking
//! the store dirty; `flush` hands the caller a snapshot to persist.
//!
//! The `web` binary keeps everything in memory and never calls `init` or
//! `flush`; they are the seam for an embedding application that persists.

use crate::logic::{
    self, apply_pit_patches, PitPatch, Placements, PrizePayout, RoundRobinPlan, SeasonArchive,
    StandingsFilter,
};
use crate::models::{
    LeagueMatch, MatchId, Player, PlayerId, PlayerSeasonStats, Team, TeamId, TeamStats,
    Tournament, TournamentError, TournamentFormat, TournamentId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Everything the store holds, as loaded or flushed.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LeagueSnapshot {
    pub players: Vec<Player>,
    pub tournaments: Vec<Tournament>,
    pub matches: Vec<LeagueMatch>,
    pub archives: Vec<SeasonArchive>,
}

#[derive(Debug, Default)]
pub struct LeagueStore {
    data: LeagueSnapshot,
    dirty: bool,
}

impl LeagueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from previously persisted data.
    pub fn init(snapshot: LeagueSnapshot) -> Self {
        Self {
            data: snapshot,
            dirty: false,
        }
    }

    /// Snapshot to persist if anything changed since the last flush.
    pub fn flush(&mut self) -> Option<LeagueSnapshot> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.data.clone())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn players(&self) -> &[Player] {
        &self.data.players
    }

    pub fn tournaments(&self) -> &[Tournament] {
        &self.data.tournaments
    }

    pub fn archives(&self) -> &[SeasonArchive] {
        &self.data.archives
    }

    /// Matches of one tournament.
    pub fn matches(&self, tournament_id: TournamentId) -> Vec<&LeagueMatch> {
        self.data
            .matches
            .iter()
            .filter(|m| m.tournament_id == tournament_id)
            .collect()
    }

    pub fn tournament(&self, id: TournamentId) -> Result<&Tournament, TournamentError> {
        self.data
            .tournaments
            .iter()
            .find(|t| t.id == id)
            .ok_or(TournamentError::TournamentNotFound(id))
    }

    fn tournament_mut(&mut self, id: TournamentId) -> Result<&mut Tournament, TournamentError> {
        self.data
            .tournaments
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TournamentError::TournamentNotFound(id))
    }

    fn player(&self, id: PlayerId) -> Result<&Player, TournamentError> {
        self.data
            .players
            .iter()
            .find(|p| p.id == id)
            .ok_or(TournamentError::PlayerNotFound(id))
    }

    fn league_match_mut(
        &mut self,
        tournament_id: TournamentId,
        match_id: MatchId,
    ) -> Result<&mut LeagueMatch, TournamentError> {
        self.data
            .matches
            .iter_mut()
            .find(|m| m.id == match_id && m.tournament_id == tournament_id)
            .ok_or(TournamentError::MatchNotFound(match_id))
    }

    /// Replace a tournament with an updated copy.
    fn commit_tournament(&mut self, tournament: Tournament) -> Result<&Tournament, TournamentError> {
        let id = tournament.id;
        *self.tournament_mut(id)? = tournament;
        self.dirty = true;
        self.tournament(id)
    }

    fn delete_matches(&mut self, tournament_id: TournamentId) {
        self.data.matches.retain(|m| m.tournament_id != tournament_id);
    }

    pub fn add_player(&mut self, name: &str, class: Option<String>) -> Result<&Player, TournamentError> {
        let name = logic::validate_player_name(name, &self.data.players)?.to_string();
        let mut player = Player::new(name);
        player.class = class;
        self.data.players.push(player);
        self.dirty = true;
        Ok(&self.data.players[self.data.players.len() - 1])
    }

    pub fn import_players<R: Read>(&mut self, reader: R) -> Result<usize, TournamentError> {
        let imported = logic::import_players_csv(reader, &self.data.players)?;
        let count = imported.len();
        self.data.players.extend(imported);
        self.dirty = true;
        Ok(count)
    }

    pub fn set_custom_season_points(
        &mut self,
        player_id: PlayerId,
        points: Option<i32>,
    ) -> Result<(), TournamentError> {
        self.data
            .players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or(TournamentError::PlayerNotFound(player_id))?
            .set_custom_season_points(points);
        self.dirty = true;
        Ok(())
    }

    pub fn create_tournament(&mut self, mut tournament: Tournament) -> &Tournament {
        tournament.teams.clear();
        tournament.bracket = None;
        self.data.tournaments.push(tournament);
        self.dirty = true;
        &self.data.tournaments[self.data.tournaments.len() - 1]
    }

    /// Pair two registered players as the next seed of a tournament in Setup.
    pub fn add_team(
        &mut self,
        tournament_id: TournamentId,
        player1_id: PlayerId,
        player2_id: PlayerId,
    ) -> Result<TeamId, TournamentError> {
        let team = {
            let seed = self.tournament(tournament_id)?.teams.len() as u32 + 1;
            Team::from_players(seed, self.player(player1_id)?, self.player(player2_id)?)
        };
        let team_id = team.id;
        self.tournament_mut(tournament_id)?.add_team(team)?;
        self.dirty = true;
        Ok(team_id)
    }

    pub fn start_tournament(
        &mut self,
        tournament_id: TournamentId,
        now: DateTime<Utc>,
    ) -> Result<&Tournament, TournamentError> {
        let mut tournament = self.tournament(tournament_id)?.clone();
        let new_matches = logic::start_tournament(&mut tournament, &self.data.matches, now)?;
        self.data.matches.extend(new_matches);
        self.refresh_pits(&tournament);
        self.commit_tournament(tournament)
    }

    /// Delete the schedule or bracket history and return to Setup.
    pub fn reset_tournament(&mut self, tournament_id: TournamentId) -> Result<&Tournament, TournamentError> {
        let mut tournament = self.tournament(tournament_id)?.clone();
        logic::reset_tournament(&mut tournament)?;
        self.delete_matches(tournament_id);
        self.commit_tournament(tournament)
    }

    pub fn reseed_bracket(&mut self, tournament_id: TournamentId) -> Result<&Tournament, TournamentError> {
        let mut tournament = self.tournament(tournament_id)?.clone();
        logic::reseed_bracket(&mut tournament, &mut rand::thread_rng())?;
        self.delete_matches(tournament_id);
        self.commit_tournament(tournament)
    }

    pub fn regenerate_schedule(
        &mut self,
        tournament_id: TournamentId,
        now: DateTime<Utc>,
    ) -> Result<usize, TournamentError> {
        let tournament = self.tournament(tournament_id)?.clone();
        match logic::regenerate_schedule(&tournament, &self.data.matches, now)? {
            RoundRobinPlan::Unchanged => Ok(0),
            RoundRobinPlan::Generated { replaced, matches } => {
                self.data.matches.retain(|m| !replaced.contains(&m.id));
                let count = matches.len();
                self.data.matches.extend(matches);
                self.refresh_pits(&tournament);
                self.dirty = true;
                Ok(count)
            }
        }
    }

    pub fn start_match(
        &mut self,
        tournament_id: TournamentId,
        match_id: MatchId,
    ) -> Result<&LeagueMatch, TournamentError> {
        let tournament = self.tournament(tournament_id)?.clone();
        logic::start_league_match(self.league_match_mut(tournament_id, match_id)?)?;
        self.refresh_pits(&tournament);
        self.dirty = true;
        Ok(&*self.league_match_mut(tournament_id, match_id)?)
    }

    pub fn record_match_result(
        &mut self,
        tournament_id: TournamentId,
        match_id: MatchId,
        scores: (u32, u32),
        ringers: (u32, u32),
    ) -> Result<&LeagueMatch, TournamentError> {
        let tournament = self.tournament(tournament_id)?.clone();
        if tournament.format != Some(TournamentFormat::RoundRobin) {
            return Err(TournamentError::InvalidState);
        }
        logic::record_league_result(
            self.league_match_mut(tournament_id, match_id)?,
            scores.0,
            scores.1,
            ringers.0,
            ringers.1,
        )?;
        self.refresh_pits(&tournament);
        self.dirty = true;
        Ok(&*self.league_match_mut(tournament_id, match_id)?)
    }

    pub fn start_bracket_match(
        &mut self,
        tournament_id: TournamentId,
        match_id: MatchId,
    ) -> Result<&Tournament, TournamentError> {
        let mut tournament = self.tournament(tournament_id)?.clone();
        let bracket = tournament.bracket.as_ref().ok_or(TournamentError::InvalidState)?;
        tournament.bracket = Some(logic::start_bracket_match(bracket, match_id)?);
        self.commit_tournament(tournament)
    }

    /// Advance the bracket and mirror the result into the match history.
    pub fn record_bracket_result(
        &mut self,
        tournament_id: TournamentId,
        match_id: MatchId,
        winner_id: TeamId,
        scores: (u32, u32),
        ringers: (u32, u32),
        now: DateTime<Utc>,
    ) -> Result<LeagueMatch, TournamentError> {
        let mut tournament = self.tournament(tournament_id)?.clone();
        let bracket = tournament.bracket.as_ref().ok_or(TournamentError::InvalidState)?;
        let played = bracket
            .find_match(match_id)
            .ok_or(TournamentError::MatchNotFound(match_id))?;
        let loser_id = [played.team1.team_id(), played.team2.team_id()]
            .into_iter()
            .flatten()
            .find(|&t| t != winner_id)
            .ok_or(TournamentError::MatchNotReady(match_id))?;

        let advanced = logic::advance_winner(bracket, match_id, winner_id, loser_id, scores.0, scores.1)?;
        let mut mirror = advanced
            .find_match(match_id)
            .ok_or(TournamentError::MatchNotFound(match_id))?
            .to_league_match(tournament_id, now)?;
        mirror.team1_ringers = ringers.0;
        mirror.team2_ringers = ringers.1;
        tournament.bracket = Some(advanced);
        self.data.matches.push(mirror.clone());
        self.commit_tournament(tournament)?;
        Ok(mirror)
    }

    pub fn complete_tournament(
        &mut self,
        tournament_id: TournamentId,
        now: DateTime<Utc>,
    ) -> Result<&Tournament, TournamentError> {
        let mut tournament = self.tournament(tournament_id)?.clone();
        logic::complete_tournament(&mut tournament, now)?;
        self.commit_tournament(tournament)
    }

    pub fn team_stats(&self, tournament_id: TournamentId) -> Result<Vec<TeamStats>, TournamentError> {
        let tournament = self.tournament(tournament_id)?;
        Ok(logic::compute_team_stats(tournament, &self.data.matches))
    }

    pub fn placements(&self, tournament_id: TournamentId) -> Result<Placements, TournamentError> {
        let tournament = self.tournament(tournament_id)?;
        Ok(logic::tournament_placements(tournament, &self.data.matches))
    }

    pub fn payouts(&self, tournament_id: TournamentId) -> Result<PrizePayout, TournamentError> {
        let tournament = self.tournament(tournament_id)?;
        logic::prize_payouts(tournament.entry_fee_cents, tournament.teams.len())
    }

    /// Current season table; the season starts at the latest archive.
    pub fn standings(&self, class: Option<String>) -> Vec<PlayerSeasonStats> {
        let filter = StandingsFilter {
            class,
            season_start: self.data.archives.last().map(|a| a.archived_at),
        };
        logic::compute_season_standings(
            &self.data.players,
            &self.data.tournaments,
            &self.data.matches,
            &filter,
        )
    }

    /// Archive the current table and start a new season.
    pub fn reset_season(&mut self, now: DateTime<Utc>) -> &SeasonArchive {
        let archive = logic::archive_season(self.standings(None), now);
        self.data.archives.push(archive);
        self.dirty = true;
        &self.data.archives[self.data.archives.len() - 1]
    }

    fn refresh_pits(&mut self, tournament: &Tournament) {
        let patches: Vec<PitPatch> =
            logic::reassign_pits(tournament.id, &self.data.matches, tournament.available_pits);
        apply_pit_patches(&mut self.data.matches, &patches);
    }
}
