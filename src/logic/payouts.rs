//! Prize pool split for a tournament's podium.

use crate::models::TournamentError;
use serde::{Deserialize, Serialize};

/// Team share of the pool, in percent, for 1st/2nd/3rd.
pub const PAYOUT_PERCENTAGES: [u64; 3] = [50, 30, 20];

/// Money owed per podium spot, in cents.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PrizePayout {
    pub pool_cents: u64,
    /// Team share for 1st, 2nd, 3rd.
    pub team_cents: [u64; 3],
    /// Each player's half of the team share.
    pub per_player_cents: [u64; 3],
}

/// Pool = entry fee x teams x 2 players, split 50/30/20.
///
/// Rounding leftovers from the percentage split go to first place. A pool
/// that does not fit in a `u64` of cents is rejected.
pub fn prize_payouts(entry_fee_cents: u64, team_count: usize) -> Result<PrizePayout, TournamentError> {
    let pool_cents = (team_count as u64)
        .checked_mul(2)
        .and_then(|entries| entries.checked_mul(entry_fee_cents))
        .ok_or(TournamentError::EntryFeeTooLarge(entry_fee_cents))?;
    let mut team_cents = PAYOUT_PERCENTAGES.map(|pct| percent_of(pool_cents, pct));
    let leftover = pool_cents - team_cents.iter().sum::<u64>();
    team_cents[0] += leftover;
    Ok(PrizePayout {
        pool_cents,
        team_cents,
        per_player_cents: team_cents.map(|c| c / 2),
    })
}

/// `floor(amount * pct / 100)` without overflowing for any `pct <= 100`.
fn percent_of(amount: u64, pct: u64) -> u64 {
    amount / 100 * pct + amount % 100 * pct / 100
}
