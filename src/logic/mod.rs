//! Scheduling business logic: generation, queueing, scoring, ratings,
//! lifecycle.

mod generator;
mod lifecycle;
mod rating;
mod scheduler;
mod scoring;

pub use generator::{
    expected_total_games, generate_initial_games, generate_playoff_bracket, generate_stage_games,
    validate_session_configuration, GenerationReport, GAMES_PER_COURT_HOUR,
};
pub use lifecycle::{
    activate_session, advance_playoffs, advance_stage, create_draft_session, create_session,
    finalize_session, generate_p8_finals, publish_session, start_session,
};
pub use rating::{
    expected_score, margin_multiplier, rating_distribution, recalculate_all_ratings,
    update_ratings, RatingDistribution, K_FACTOR,
};
pub use scheduler::{cancel_game, reorganize_queue, start_game};
pub use scoring::{
    is_score_valid, submit_score, submit_set_scores, update_score, update_set_scores,
    validate_score, validate_sets,
};
