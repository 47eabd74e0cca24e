//! Tournament business logic: bracket, round robin, pits, stats, standings.

mod advance;
mod bracket;
pub mod drop_table;
mod payouts;
mod pits;
mod roster;
mod round_robin;
mod setup;
mod standings;
mod stats;

pub use advance::{
    advance_winner, loser_destination, start_bracket_match, winner_destination, SlotRef,
};
pub use bracket::{generate_bracket, regenerate_bracket, seed_order};
pub use drop_table::{DropSlot, DropTable};
pub use payouts::{prize_payouts, PrizePayout, PAYOUT_PERCENTAGES};
pub use pits::{apply_pit_patches, reassign_pits, PitPatch};
pub use roster::{import_players_csv, validate_player_name};
pub use round_robin::{
    circle_rounds, generate_round_robin, record_league_result, start_league_match,
    RoundRobinFormat, RoundRobinPlan,
};
pub use setup::{
    complete_tournament, regenerate_schedule, reseed_bracket, reseed_teams, reset_tournament,
    select_format, start_tournament,
};
pub use standings::{
    archive_season, compute_season_standings, tournament_placements, Placements, SeasonArchive,
    StandingsFilter,
};
pub use stats::compute_team_stats;
