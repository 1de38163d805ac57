//! Session aggregate: configuration, lifecycle status, and the owned
//! courts/players/games.

use crate::models::court::{Court, CourtId};
use crate::models::game::{Game, GameId, GameStatus, PlayoffRound};
use crate::models::player::{Player, PlayerId, PlayerSetup};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a session.
pub type SessionId = Uuid;

/// Tournaments run exactly three stages.
pub const MAX_TOURNAMENT_STAGE: u8 = 3;

/// Errors that can occur during session operations.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionError {
    /// Session is not in a status that allows this action.
    InvalidStatus,
    /// The action does not apply to this session type.
    WrongSessionType,
    /// Game not found in this session.
    GameNotFound(GameId),
    /// Player not found in this session.
    PlayerNotFound(PlayerId),
    /// Game is not in a status that allows this action.
    InvalidGameStatus(GameId),
    /// Initial games have already been generated for this session.
    GamesAlreadyGenerated,
    /// Every court is occupied by an active game.
    NoAvailableCourt,
    /// Tied scores are never valid.
    TiedScore,
    /// The winning score is below the configured points per game.
    ScoreTooLow { minimum: u16 },
    /// The winning margin is below the configured win-by.
    MarginTooSmall { win_by: u16 },
    /// The set sequence does not form a valid best-of-three.
    MalformedSets,
    /// Fewer players than the courts require (4 per court).
    NotEnoughPlayers { required: u32 },
    /// More players than the courts can absorb (8 per court).
    TooManyPlayers { maximum: u32 },
    /// points_per_game and win_by must both be at least 1.
    InvalidScoringRules,
    /// No schedule template exists for this configuration.
    NoTemplate { key: String },
    /// Games are still in play in the current stage.
    StageIncomplete { in_play: usize },
    /// The tournament already reached its final stage.
    MaxStageReached,
    /// The playoff bracket has already been generated.
    PlayoffsAlreadyGenerated,
    /// Regular games are still in play.
    RegularGamesIncomplete { in_play: usize },
    /// Both semifinals must exist and be completed.
    SemifinalsIncomplete,
    /// Gold/bronze finals have already been generated.
    FinalsAlreadyGenerated,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::InvalidStatus => write!(f, "Session is not in a status that allows this action"),
            SessionError::WrongSessionType => write!(f, "This action does not apply to this session type"),
            SessionError::GameNotFound(id) => write!(f, "Game {} not found", id),
            SessionError::PlayerNotFound(id) => write!(f, "Player {} not found", id),
            SessionError::InvalidGameStatus(id) => {
                write!(f, "Game {} is not in a status that allows this action", id)
            }
            SessionError::GamesAlreadyGenerated => write!(f, "Games have already been generated"),
            SessionError::NoAvailableCourt => {
                write!(f, "No courts available; complete an active game first")
            }
            SessionError::TiedScore => write!(f, "Scores cannot be tied"),
            SessionError::ScoreTooLow { minimum } => {
                write!(f, "The winner must score at least {} points", minimum)
            }
            SessionError::MarginTooSmall { win_by } => {
                write!(f, "The winner must win by at least {} point(s)", win_by)
            }
            SessionError::MalformedSets => write!(f, "Invalid best-of-three set sequence"),
            SessionError::NotEnoughPlayers { required } => {
                write!(f, "At least {} players are required (4 per court)", required)
            }
            SessionError::TooManyPlayers { maximum } => {
                write!(f, "At most {} players are supported (8 per court)", maximum)
            }
            SessionError::InvalidScoringRules => {
                write!(f, "points_per_game and win_by must both be at least 1")
            }
            SessionError::NoTemplate { key } => {
                write!(f, "No schedule template exists for configuration {}", key)
            }
            SessionError::StageIncomplete { in_play } => {
                write!(f, "Cannot advance: {} game(s) still in play in the current stage", in_play)
            }
            SessionError::MaxStageReached => write!(f, "All tournament stages have been completed"),
            SessionError::PlayoffsAlreadyGenerated => {
                write!(f, "The playoff bracket has already been generated")
            }
            SessionError::RegularGamesIncomplete { in_play } => {
                write!(f, "Cannot advance: {} regular game(s) still in play", in_play)
            }
            SessionError::SemifinalsIncomplete => {
                write!(f, "Both semifinals must exist and be completed")
            }
            SessionError::FinalsAlreadyGenerated => {
                write!(f, "Gold and bronze finals have already been generated")
            }
        }
    }
}

/// Format of the session: a staged tournament, a ranked playoff for the top
/// 4 or 8, or a free-running schedule.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Tournament,
    Playoff4,
    Playoff8,
    Optimized,
    Simple,
}

impl SessionType {
    /// Short code used in template file keys.
    pub fn code(self) -> &'static str {
        match self {
            SessionType::Tournament => "T",
            SessionType::Playoff4 => "P4",
            SessionType::Playoff8 => "P8",
            SessionType::Optimized => "O",
            SessionType::Simple => "S",
        }
    }

    pub fn is_tournament(self) -> bool {
        self == SessionType::Tournament
    }

    /// Playoff formats end with a bracket seeded from the rankings.
    pub fn has_playoff_bracket(self) -> bool {
        matches!(self, SessionType::Playoff4 | SessionType::Playoff8)
    }

    /// Bracket games the format adds on top of the regular schedule
    /// (P4: one final; P8: two semifinals plus gold and bronze).
    pub fn fixed_playoff_games(self) -> u32 {
        match self {
            SessionType::Playoff4 => 1,
            SessionType::Playoff8 => 4,
            _ => 0,
        }
    }

    /// Structured formats cannot run without a schedule template; the
    /// free-running formats fall back to randomized matchmaking.
    pub fn requires_template(self) -> bool {
        matches!(
            self,
            SessionType::Tournament | SessionType::Playoff4 | SessionType::Playoff8
        )
    }
}

/// Session lifecycle status. Transitions are monotonic: draft -> pending ->
/// active -> completed, never backward.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Draft,
    #[default]
    Pending,
    Active,
    Completed,
}

/// Whether games are played as one set or best of three.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetsFormat {
    #[default]
    Single,
    BestOfThree,
}

/// Creation input for a session.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub name: String,
    pub court_names: Vec<String>,
    pub duration_hours: u32,
    pub points_per_game: u16,
    pub win_by: u16,
    #[serde(default)]
    pub sets_format: SetsFormat,
    pub session_type: SessionType,
    pub players: Vec<PlayerSetup>,
}

impl SessionConfig {
    /// Template lookup key, e.g. `2C2H10P-T`.
    pub fn template_key(&self) -> String {
        format!(
            "{}C{}H{}P-{}",
            self.court_names.len(),
            self.duration_hours,
            self.players.len(),
            self.session_type.code()
        )
    }
}

/// Condensed per-session result view (history listings).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionSummary {
    pub name: String,
    pub session_type: SessionType,
    pub winner: Option<String>,
    pub winner_rating: Option<f64>,
    pub duration_minutes: Option<i64>,
    pub total_games: u32,
    pub completed_games: u32,
    pub progress_percentage: f64,
}

/// A scheduling session: the aggregate root owning courts, players and games.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub name: String,
    pub number_of_courts: u32,
    pub duration_hours: u32,
    pub number_of_players: u32,
    pub points_per_game: u16,
    pub win_by: u16,
    pub sets_format: SetsFormat,
    pub session_type: SessionType,
    /// Current tournament stage (1..=3); fixed at 1 for other formats.
    pub current_stage: u8,
    pub status: SessionStatus,
    pub progress_percentage: f64,
    /// Expected total game count for the format, cached at generation time
    /// (includes bracket games not yet generated for playoff formats).
    pub total_games: u32,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub courts: Vec<Court>,
    /// Players in creation order (positional notation for stage 1 resolves
    /// against this order).
    pub players: Vec<Player>,
    pub games: Vec<Game>,
}

impl Session {
    /// Build a pending session from a configuration (validation happens in
    /// `logic::create_session`).
    pub fn new(config: SessionConfig) -> Self {
        Self::from_config(config, SessionStatus::Pending)
    }

    /// Build a draft session: editable and deletable until activated.
    pub fn draft(config: SessionConfig) -> Self {
        Self::from_config(config, SessionStatus::Draft)
    }

    fn from_config(config: SessionConfig, status: SessionStatus) -> Self {
        let courts: Vec<Court> = config
            .court_names
            .iter()
            .enumerate()
            .map(|(i, name)| Court::new(name.clone(), i as u32 + 1))
            .collect();
        let players: Vec<Player> = config.players.iter().map(Player::new).collect();
        Self {
            id: Uuid::new_v4(),
            name: config.name,
            number_of_courts: courts.len() as u32,
            duration_hours: config.duration_hours,
            number_of_players: players.len() as u32,
            points_per_game: config.points_per_game,
            win_by: config.win_by,
            sets_format: config.sets_format,
            session_type: config.session_type,
            current_stage: 1,
            status,
            progress_percentage: 0.0,
            total_games: 0,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            courts,
            players,
            games: Vec::new(),
        }
    }

    /// Replace the configuration of a draft session (courts and players are
    /// rebuilt; ids are not preserved).
    pub fn update_config(&mut self, config: SessionConfig) -> Result<(), SessionError> {
        if self.status != SessionStatus::Draft {
            return Err(SessionError::InvalidStatus);
        }
        let fresh = Self::from_config(config, SessionStatus::Draft);
        let (id, created_at) = (self.id, self.created_at);
        *self = fresh;
        self.id = id;
        self.created_at = created_at;
        Ok(())
    }

    /// Template lookup key for this session, e.g. `2C2H10P-T`.
    pub fn template_key(&self) -> String {
        format!(
            "{}C{}H{}P-{}",
            self.number_of_courts, self.duration_hours, self.number_of_players,
            self.session_type.code()
        )
    }

    pub fn game(&self, id: GameId) -> Option<&Game> {
        self.games.iter().find(|g| g.id == id)
    }

    pub fn game_mut(&mut self, id: GameId) -> Option<&mut Game> {
        self.games.iter_mut().find(|g| g.id == id)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn court(&self, id: CourtId) -> Option<&Court> {
        self.courts.iter().find(|c| c.id == id)
    }

    pub fn court_mut(&mut self, id: CourtId) -> Option<&mut Court> {
        self.courts.iter_mut().find(|c| c.id == id)
    }

    /// Next free game number (sequence defines queue priority).
    pub fn next_game_number(&self) -> u32 {
        self.games.iter().map(|g| g.game_number).max().map_or(1, |n| n + 1)
    }

    pub fn has_playoff_games(&self) -> bool {
        self.games.iter().any(|g| g.is_playoff_game)
    }

    /// Playoff games at a bracket position, in schedule order.
    pub fn playoff_games(&self, round: PlayoffRound) -> Vec<&Game> {
        self.games
            .iter()
            .filter(|g| g.is_playoff_game && g.playoff_round == Some(round))
            .collect()
    }

    pub fn playoff_game(&self, round: PlayoffRound) -> Option<&Game> {
        self.playoff_games(round).into_iter().next()
    }

    pub fn completed_game_count(&self) -> usize {
        self.games.iter().filter(|g| g.status == GameStatus::Completed).count()
    }

    fn open_game_count(&self) -> usize {
        self.games.iter().filter(|g| g.is_open()).count()
    }

    /// Players sorted by current rank (unranked last), deterministic on ties.
    pub fn ranked_players(&self) -> Vec<&Player> {
        let mut ranked: Vec<&Player> = self.players.iter().collect();
        ranked.sort_by(|a, b| {
            a.current_rank
                .unwrap_or(u32::MAX)
                .cmp(&b.current_rank.unwrap_or(u32::MAX))
                .then_with(|| a.first_name.to_lowercase().cmp(&b.first_name.to_lowercase()))
        });
        ranked
    }

    /// Recompute derived player stats and assign ranks. Rating is the only
    /// ranking key; equal ratings share a rank and the next distinct rating
    /// takes the following rank (dense ranking, no gaps).
    pub fn update_rankings(&mut self) {
        for p in &mut self.players {
            p.recompute_percentages();
        }
        let mut order: Vec<usize> = (0..self.players.len()).collect();
        order.sort_by(|&a, &b| {
            let (pa, pb) = (&self.players[a], &self.players[b]);
            pb.current_rating
                .partial_cmp(&pa.current_rating)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| pa.first_name.to_lowercase().cmp(&pb.first_name.to_lowercase()))
        });
        let mut rank = 0u32;
        let mut previous: Option<f64> = None;
        for idx in order {
            let rating = self.players[idx].current_rating;
            if previous != Some(rating) {
                rank += 1;
            }
            self.players[idx].current_rank = Some(rank);
            previous = Some(rating);
        }
    }

    /// Completed games over the expected format total, as a percentage.
    pub fn update_progress(&mut self) {
        self.progress_percentage = if self.total_games > 0 {
            self.completed_game_count() as f64 / f64::from(self.total_games) * 100.0
        } else {
            0.0
        };
    }

    /// Whether an advance action (stage or playoff bracket) is currently
    /// permitted. Pending games do not block advancing (they get cancelled);
    /// in-play games do.
    pub fn can_advance(&self) -> bool {
        if self.status != SessionStatus::Active {
            return false;
        }
        match self.session_type {
            SessionType::Tournament => {
                self.current_stage < MAX_TOURNAMENT_STAGE
                    && !self.games.iter().any(|g| {
                        g.stage == Some(self.current_stage) && g.status == GameStatus::Active
                    })
            }
            SessionType::Playoff4 | SessionType::Playoff8 => {
                !self.has_playoff_games()
                    && !self
                        .games
                        .iter()
                        .any(|g| !g.is_playoff_game && g.status == GameStatus::Active)
            }
            _ => false,
        }
    }

    /// Format-specific completion check: the required finals must exist and
    /// be completed, and no game may remain pending or active.
    pub fn is_fully_completed(&self) -> bool {
        match self.session_type {
            SessionType::Tournament => {
                if self.current_stage < MAX_TOURNAMENT_STAGE {
                    return false;
                }
            }
            SessionType::Playoff8 => {
                let gold_done = self
                    .playoff_game(PlayoffRound::Gold)
                    .is_some_and(|g| g.status == GameStatus::Completed);
                let bronze_done = self
                    .playoff_game(PlayoffRound::Bronze)
                    .is_some_and(|g| g.status == GameStatus::Completed);
                if !gold_done || !bronze_done {
                    return false;
                }
            }
            SessionType::Playoff4 => {
                let final_done = self
                    .playoff_game(PlayoffRound::Final)
                    .is_some_and(|g| g.status == GameStatus::Completed);
                if !final_done {
                    return false;
                }
            }
            SessionType::Optimized | SessionType::Simple => {}
        }
        self.open_game_count() == 0
    }

    /// Condensed result view: winner (rank 1), wall-clock duration, counts.
    pub fn summary(&self) -> SessionSummary {
        let winner = self
            .ranked_players()
            .into_iter()
            .find(|p| p.current_rank == Some(1));
        let duration_minutes = match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some((end - start).num_minutes()),
            _ => None,
        };
        SessionSummary {
            name: self.name.clone(),
            session_type: self.session_type,
            winner: winner.map(|p| p.display_name()),
            winner_rating: winner.map(|p| p.current_rating),
            duration_minutes,
            total_games: self.total_games,
            completed_games: self.completed_game_count() as u32,
            progress_percentage: self.progress_percentage,
        }
    }

    /// All games a player takes part in, in schedule order.
    pub fn games_for_player(&self, player_id: PlayerId) -> Vec<&Game> {
        let mut games: Vec<&Game> = self
            .games
            .iter()
            .filter(|g| g.team_of(player_id).is_some())
            .collect();
        games.sort_by_key(|g| g.game_number);
        games
    }
}
