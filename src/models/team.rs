//! Teams of two and their per-tournament statistics.

use crate::models::player::{Player, PlayerId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team.
pub type TeamId = Uuid;

/// A team of two players entered in one tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    /// 1 is the top seed.
    pub seed: u32,
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    pub name: String,
}

impl Team {
    pub fn new(seed: u32, player1_id: PlayerId, player2_id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            seed,
            player1_id,
            player2_id,
            name: name.into(),
        }
    }

    /// Build a team named after its two players ("Ann & Bob").
    pub fn from_players(seed: u32, player1: &Player, player2: &Player) -> Self {
        Self::new(
            seed,
            player1.id,
            player2.id,
            format!("{} & {}", player1.name, player2.name),
        )
    }

    pub fn has_player(&self, player_id: PlayerId) -> bool {
        self.player1_id == player_id || self.player2_id == player_id
    }

    pub fn players(&self) -> [PlayerId; 2] {
        [self.player1_id, self.player2_id]
    }

    /// Cosmetic rename; the only change allowed once play has been generated.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}

/// Win/loss/point totals of one team in one tournament. Derived from match history.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub team_id: TeamId,
    pub wins: u32,
    pub losses: u32,
    pub total_points: u32,
    pub total_ringers: u32,
    pub matches: u32,
}

impl TeamStats {
    pub fn new(team_id: TeamId) -> Self {
        Self {
            team_id,
            ..Self::default()
        }
    }
}
