//! Data structures for the league: players, teams, matches, brackets, tournaments.

mod bracket;
mod league_match;
mod player;
mod team;
mod tournament;

pub use bracket::{Bracket, BracketMatch, BracketSection, BracketTeam, Round, Slot, SlotSide};
pub use league_match::{LeagueMatch, MatchId, MatchStatus};
pub use player::{Player, PlayerId, PlayerSeasonStats};
pub use team::{Team, TeamId, TeamStats};
pub use tournament::{
    ErrorKind, Tournament, TournamentError, TournamentFormat, TournamentId, TournamentStatus,
};
