//! Pickleball session scheduler: game queue, bracket progression, ratings
//! and the session state machine, as a library with models and business
//! logic.

pub mod logic;
pub mod models;
pub mod templates;

pub use logic::{
    activate_session, advance_playoffs, advance_stage, cancel_game, create_draft_session,
    create_session, expected_score, finalize_session, generate_initial_games, generate_p8_finals,
    generate_playoff_bracket, generate_stage_games, is_score_valid, margin_multiplier,
    publish_session, rating_distribution, recalculate_all_ratings, reorganize_queue, start_game,
    start_session, submit_score, submit_set_scores, update_ratings, update_score, update_set_scores,
    validate_score, validate_session_configuration, validate_sets, GenerationReport,
    RatingDistribution, K_FACTOR,
};
pub use models::{
    Court, CourtId, CourtStatus, Game, GameId, GameStatus, Player, PlayerId, PlayerSetup,
    PlayoffRound, Session, SessionConfig, SessionError, SessionId, SessionStatus, SessionSummary,
    SessionType, SetScore, SetsFormat, SkillLevel, Team, MAX_TOURNAMENT_STAGE,
};
pub use templates::{
    DirTemplateStore, InMemoryTemplateStore, Template, TemplateBlock, TemplateCourt,
    TemplateRound, TemplateStore,
};
