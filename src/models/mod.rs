//! Data structures for the scheduler: sessions, courts, players, games.

mod court;
mod game;
mod player;
mod session;

pub use court::{Court, CourtId, CourtStatus};
pub use game::{Game, GameId, GameStatus, PlayoffRound, SetScore, Team};
pub use player::{Player, PlayerId, PlayerSetup, SkillLevel};
pub use session::{
    Session, SessionConfig, SessionError, SessionId, SessionStatus, SessionSummary, SessionType,
    SetsFormat, MAX_TOURNAMENT_STAGE,
};
