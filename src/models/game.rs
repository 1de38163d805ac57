//! Game data: a 2v2 doubles game, its scores and its bracket position.

use crate::models::court::CourtId;
use crate::models::player::PlayerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a game.
pub type GameId = Uuid;

/// One of the two teams in a game.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    #[default]
    One,
    Two,
}

impl Team {
    pub fn other(self) -> Team {
        match self {
            Team::One => Team::Two,
            Team::Two => Team::One,
        }
    }
}

/// Lifecycle of a single game. Cancelled games are retained (never deleted)
/// so the session's total game count stays stable.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    Pending,
    Active,
    Completed,
    Cancelled,
}

/// Labeled bracket position for playoff games (independent of tournament
/// stage numbering).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayoffRound {
    Semifinal,
    Final,
    Gold,
    Bronze,
    Qualifier,
    Medal,
}

/// Points of one set, team 1 vs team 2.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SetScore {
    pub team1: u16,
    pub team2: u16,
}

impl SetScore {
    pub fn new(team1: u16, team2: u16) -> Self {
        Self { team1, team2 }
    }

    /// Which team took this set (`None` on a tie, which is never valid).
    pub fn winner(&self) -> Option<Team> {
        match self.team1.cmp(&self.team2) {
            std::cmp::Ordering::Greater => Some(Team::One),
            std::cmp::Ordering::Less => Some(Team::Two),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// A single 2v2 game. `game_number` is unique within the session and defines
/// queue priority; `court_id` is `None` while the game waits in the queue.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub game_number: u32,
    /// Tournament stage (1..=3); `None` for non-tournament games.
    pub stage: Option<u8>,
    pub status: GameStatus,
    pub court_id: Option<CourtId>,
    pub team1: [PlayerId; 2],
    pub team2: [PlayerId; 2],
    pub team1_score: Option<u16>,
    pub team2_score: Option<u16>,
    /// Per-set scores for best-of-three games (empty for single-set games).
    #[serde(default)]
    pub sets: Vec<SetScore>,
    pub winner_team: Option<Team>,
    pub is_playoff_game: bool,
    pub playoff_round: Option<PlayoffRound>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Game {
    /// Create a pending regular game.
    pub fn new(game_number: u32, stage: Option<u8>, team1: [PlayerId; 2], team2: [PlayerId; 2]) -> Self {
        Self {
            id: Uuid::new_v4(),
            game_number,
            stage,
            status: GameStatus::Pending,
            court_id: None,
            team1,
            team2,
            team1_score: None,
            team2_score: None,
            sets: Vec::new(),
            winner_team: None,
            is_playoff_game: false,
            playoff_round: None,
            started_at: None,
            completed_at: None,
        }
    }

    /// Create a pending playoff game at the given bracket position.
    pub fn playoff(game_number: u32, round: PlayoffRound, team1: [PlayerId; 2], team2: [PlayerId; 2]) -> Self {
        Self {
            is_playoff_game: true,
            playoff_round: Some(round),
            ..Self::new(game_number, None, team1, team2)
        }
    }

    /// All four participating players.
    pub fn player_ids(&self) -> [PlayerId; 4] {
        [self.team1[0], self.team1[1], self.team2[0], self.team2[1]]
    }

    pub fn team_ids(&self, team: Team) -> [PlayerId; 2] {
        match team {
            Team::One => self.team1,
            Team::Two => self.team2,
        }
    }

    /// Which team a player is on, if they take part in this game.
    pub fn team_of(&self, player_id: PlayerId) -> Option<Team> {
        if self.team1.contains(&player_id) {
            Some(Team::One)
        } else if self.team2.contains(&player_id) {
            Some(Team::Two)
        } else {
            None
        }
    }

    pub fn winning_team_ids(&self) -> Option<[PlayerId; 2]> {
        self.winner_team.map(|t| self.team_ids(t))
    }

    pub fn losing_team_ids(&self) -> Option<[PlayerId; 2]> {
        self.winner_team.map(|t| self.team_ids(t.other()))
    }

    /// The deciding third set, when a best-of-three went the distance.
    pub fn deciding_set(&self) -> Option<&SetScore> {
        if self.sets.len() == 3 {
            self.sets.last()
        } else {
            None
        }
    }

    /// Aggregate point margin (0 if no scores yet).
    pub fn point_margin(&self) -> u16 {
        match (self.team1_score, self.team2_score) {
            (Some(a), Some(b)) => a.abs_diff(b),
            _ => 0,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.status, GameStatus::Pending | GameStatus::Active)
    }
}
