//! League tournament engine: library with models, business logic and an
//! in-memory store for the web app.

pub mod logic;
pub mod models;
pub mod store;

pub use logic::{
    advance_winner, archive_season, complete_tournament, compute_season_standings,
    compute_team_stats, generate_bracket, generate_round_robin, import_players_csv, prize_payouts,
    reassign_pits, record_league_result, regenerate_schedule, reseed_bracket, reset_tournament,
    select_format, start_bracket_match, start_league_match, start_tournament,
    tournament_placements, PitPatch, Placements, PrizePayout, RoundRobinFormat, RoundRobinPlan,
    SeasonArchive, StandingsFilter,
};
pub use models::{
    Bracket, BracketMatch, BracketSection, BracketTeam, ErrorKind, LeagueMatch, MatchId,
    MatchStatus, Player, PlayerId, PlayerSeasonStats, Round, Slot, SlotSide, Team, TeamId,
    TeamStats, Tournament, TournamentError, TournamentFormat, TournamentId, TournamentStatus,
};
pub use store::LeagueStore;
