//! Where winners-bracket losers enter the losers bracket, per supported field size.
//!
//! Round 1 losers pair up straight into losers round 1. Every later winners
//! round `r` drops into losers round `2(r - 1)` as team2, in an order that
//! alternates (reversed, half-swapped, reversed, ...) so teams that met in the
//! winners bracket do not meet again right away.

use crate::models::SlotSide;
use crate::models::SlotSide::{Team1 as T1, Team2 as T2};

/// Smallest team count that gets a double-elimination bracket.
pub const MIN_BRACKET_TEAMS: usize = 10;

/// Field sizes with a drop table, ascending.
pub const SUPPORTED_FIELD_SIZES: [u32; 2] = [16, 32];

/// Losers-bracket slot that receives the loser of one winners-bracket match.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DropSlot {
    /// 1-based losers round.
    pub losers_round: u32,
    /// 0-based match index in that round.
    pub position: u32,
    pub side: SlotSide,
}

const fn slot(losers_round: u32, position: u32, side: SlotSide) -> DropSlot {
    DropSlot {
        losers_round,
        position,
        side,
    }
}

/// Drop destinations for one field size, indexed by winners round then position.
#[derive(Debug)]
pub struct DropTable {
    pub field_size: u32,
    rounds: &'static [&'static [DropSlot]],
}

static FIELD_16: DropTable = DropTable {
    field_size: 16,
    rounds: &[
        &[
            slot(1, 0, T1),
            slot(1, 0, T2),
            slot(1, 1, T1),
            slot(1, 1, T2),
            slot(1, 2, T1),
            slot(1, 2, T2),
            slot(1, 3, T1),
            slot(1, 3, T2),
        ],
        &[slot(2, 3, T2), slot(2, 2, T2), slot(2, 1, T2), slot(2, 0, T2)],
        &[slot(4, 1, T2), slot(4, 0, T2)],
        &[slot(6, 0, T2)],
    ],
};

static FIELD_32: DropTable = DropTable {
    field_size: 32,
    rounds: &[
        &[
            slot(1, 0, T1),
            slot(1, 0, T2),
            slot(1, 1, T1),
            slot(1, 1, T2),
            slot(1, 2, T1),
            slot(1, 2, T2),
            slot(1, 3, T1),
            slot(1, 3, T2),
            slot(1, 4, T1),
            slot(1, 4, T2),
            slot(1, 5, T1),
            slot(1, 5, T2),
            slot(1, 6, T1),
            slot(1, 6, T2),
            slot(1, 7, T1),
            slot(1, 7, T2),
        ],
        &[
            slot(2, 7, T2),
            slot(2, 6, T2),
            slot(2, 5, T2),
            slot(2, 4, T2),
            slot(2, 3, T2),
            slot(2, 2, T2),
            slot(2, 1, T2),
            slot(2, 0, T2),
        ],
        &[slot(4, 2, T2), slot(4, 3, T2), slot(4, 0, T2), slot(4, 1, T2)],
        &[slot(6, 1, T2), slot(6, 0, T2)],
        &[slot(8, 0, T2)],
    ],
};

impl DropTable {
    /// Table for an exact field size; None for unsupported sizes.
    pub fn for_field_size(field_size: u32) -> Option<&'static DropTable> {
        match field_size {
            16 => Some(&FIELD_16),
            32 => Some(&FIELD_32),
            _ => None,
        }
    }

    /// Destination of the loser of winners match `(winners_round, position)`.
    pub fn destination(&self, winners_round: u32, position: u32) -> Option<DropSlot> {
        let r = winners_round.checked_sub(1)? as usize;
        self.rounds.get(r)?.get(position as usize).copied()
    }

    pub fn winners_round_count(&self) -> u32 {
        self.rounds.len() as u32
    }

    pub fn losers_round_count(&self) -> u32 {
        2 * (self.winners_round_count() - 1)
    }

    /// Matches in a 1-based winners round.
    pub fn winners_matches_in_round(&self, round: u32) -> u32 {
        self.field_size >> round
    }

    /// Matches in a 1-based losers round. Rounds come in pairs of equal size.
    pub fn losers_matches_in_round(&self, round: u32) -> u32 {
        let pair = round.div_ceil(2);
        self.field_size >> (pair + 1)
    }

    /// Every `(winners_round, position, slot)` entry, in table order.
    pub fn entries(&self) -> impl Iterator<Item = (u32, u32, DropSlot)> + '_ {
        self.rounds.iter().enumerate().flat_map(|(r, slots)| {
            slots
                .iter()
                .enumerate()
                .map(move |(p, s)| (r as u32 + 1, p as u32, *s))
        })
    }
}

/// Field size the bracket for `team_count` teams is rounded up to.
pub fn field_size_for(team_count: usize) -> Option<u32> {
    if team_count < MIN_BRACKET_TEAMS {
        return None;
    }
    SUPPORTED_FIELD_SIZES
        .iter()
        .copied()
        .find(|&size| team_count <= size as usize)
}
