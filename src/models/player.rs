//! Player and PlayerSeasonStats data structures.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (used in teams and lookups).
pub type PlayerId = Uuid;

/// Season leaderboard row for one player. Derived on every read, never stored.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerSeasonStats {
    pub player_id: PlayerId,
    pub points: i32,
    pub tournaments_played: u32,
    pub first_place_finishes: u32,
    pub second_place_finishes: u32,
    pub third_place_finishes: u32,
}

impl PlayerSeasonStats {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            ..Self::default()
        }
    }

    /// True when the player has played or carries a manual points override.
    pub fn has_activity(&self, player: &Player) -> bool {
        self.tournaments_played > 0 || player.custom_season_points.is_some()
    }
}

/// A registered league player.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Skill class / division label (e.g. "A", "B").
    #[serde(default)]
    pub class: Option<String>,
    /// Admin-set points added on top of the computed season points.
    #[serde(default)]
    pub custom_season_points: Option<i32>,
}

impl Player {
    /// Create a new player with the given name, no class and no override.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            class: None,
            custom_season_points: None,
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Set (or clear) the admin override.
    pub fn set_custom_season_points(&mut self, points: Option<i32>) {
        self.custom_season_points = points;
    }
}
