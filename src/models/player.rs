//! Player data: identity, skill level, rating and per-session statistics.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (used in game team slots and lookups).
pub type PlayerId = Uuid;

/// Self-reported skill level, used to seed the initial rating.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillLevel {
    BelowAverage,
    #[default]
    Average,
    AboveAverage,
}

impl SkillLevel {
    /// Seed rating for this level.
    pub fn initial_rating(self) -> f64 {
        match self {
            SkillLevel::BelowAverage => 800.0,
            SkillLevel::Average => 1000.0,
            SkillLevel::AboveAverage => 1200.0,
        }
    }
}

/// Creation input for one player (name, last initial, skill level).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerSetup {
    pub first_name: String,
    pub last_initial: String,
    #[serde(default)]
    pub level: SkillLevel,
}

/// A player in a session. Rating starts at the level seed and moves after
/// every completed game; rank is recomputed on every ranking pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub first_name: String,
    pub last_initial: String,
    pub level: SkillLevel,
    pub initial_rating: f64,
    pub current_rating: f64,
    /// 1-based rank; `None` until the first ranking pass.
    pub current_rank: Option<u32>,
    pub games_played: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub total_points_won: u32,
    pub total_points_lost: u32,
    pub win_percentage: f64,
    pub points_won_percentage: f64,
}

impl Player {
    /// Create a player with the rating seeded from the skill level.
    pub fn new(setup: &PlayerSetup) -> Self {
        let rating = setup.level.initial_rating();
        Self {
            id: Uuid::new_v4(),
            first_name: setup.first_name.trim().to_string(),
            last_initial: setup.last_initial.trim().to_uppercase(),
            level: setup.level,
            initial_rating: rating,
            current_rating: rating,
            current_rank: None,
            games_played: 0,
            games_won: 0,
            games_lost: 0,
            total_points_won: 0,
            total_points_lost: 0,
            win_percentage: 0.0,
            points_won_percentage: 0.0,
        }
    }

    /// Display name, e.g. "Ana G.".
    pub fn display_name(&self) -> String {
        format!("{} {}.", self.first_name, self.last_initial)
    }

    /// Record one completed game from this player's perspective.
    pub fn record_game(&mut self, won: bool, points_won: u16, points_lost: u16) {
        self.games_played += 1;
        if won {
            self.games_won += 1;
        } else {
            self.games_lost += 1;
        }
        self.total_points_won += u32::from(points_won);
        self.total_points_lost += u32::from(points_lost);
        self.recompute_percentages();
    }

    /// Undo one previously recorded game (retroactive score corrections).
    pub fn revert_game(&mut self, won: bool, points_won: u16, points_lost: u16) {
        self.games_played = self.games_played.saturating_sub(1);
        if won {
            self.games_won = self.games_won.saturating_sub(1);
        } else {
            self.games_lost = self.games_lost.saturating_sub(1);
        }
        self.total_points_won = self.total_points_won.saturating_sub(u32::from(points_won));
        self.total_points_lost = self.total_points_lost.saturating_sub(u32::from(points_lost));
        self.recompute_percentages();
    }

    /// Recompute the derived percentage stats from the counters.
    pub fn recompute_percentages(&mut self) {
        self.win_percentage = if self.games_played > 0 {
            f64::from(self.games_won) / f64::from(self.games_played) * 100.0
        } else {
            0.0
        };
        let total_points = self.total_points_won + self.total_points_lost;
        self.points_won_percentage = if total_points > 0 {
            f64::from(self.total_points_won) / f64::from(total_points) * 100.0
        } else {
            0.0
        };
    }

    /// Reset the rating back to the level seed (rating replays).
    pub fn reset_rating(&mut self) {
        self.current_rating = self.initial_rating;
    }
}
