//! Session lifecycle: creation, activation, stage and playoff advancement,
//! and finalization.
//!
//! Every operation validates before mutating, so a rejected call leaves the
//! session exactly as it was. Pending games superseded by an advance are
//! cancelled and retained, never deleted; only in-play games block an
//! advance.

use crate::logic::{generator, scheduler};
use crate::logic::generator::GenerationReport;
use crate::models::{
    CourtStatus, GameStatus, Session, SessionConfig, SessionError, SessionStatus,
    MAX_TOURNAMENT_STAGE,
};
use crate::templates::TemplateStore;
use chrono::Utc;

/// Validate a configuration and build a pending session from it.
pub fn create_session(
    config: SessionConfig,
    store: &dyn TemplateStore,
) -> Result<Session, SessionError> {
    generator::validate_session_configuration(&config, store)?;
    let session = Session::new(config);
    log::info!("Session {} created ({})", session.name, session.template_key());
    Ok(session)
}

/// Validate a configuration and build a draft session (editable until
/// activated, not shown in active listings).
pub fn create_draft_session(
    config: SessionConfig,
    store: &dyn TemplateStore,
) -> Result<Session, SessionError> {
    generator::validate_session_configuration(&config, store)?;
    Ok(Session::draft(config))
}

/// Promote a draft to pending: the configuration is frozen, games are not
/// generated yet.
pub fn publish_session(session: &mut Session) -> Result<(), SessionError> {
    if session.status != SessionStatus::Draft {
        return Err(SessionError::InvalidStatus);
    }
    session.status = SessionStatus::Pending;
    Ok(())
}

/// Start a pending session: generate the initial games, fill the courts and
/// go active.
pub fn start_session(
    session: &mut Session,
    store: &dyn TemplateStore,
) -> Result<GenerationReport, SessionError> {
    if session.status != SessionStatus::Pending {
        return Err(SessionError::InvalidStatus);
    }
    begin(session, store)
}

/// Activate a draft session (same generation step as starting a pending
/// one).
pub fn activate_session(
    session: &mut Session,
    store: &dyn TemplateStore,
) -> Result<GenerationReport, SessionError> {
    if session.status != SessionStatus::Draft {
        return Err(SessionError::InvalidStatus);
    }
    begin(session, store)
}

fn begin(session: &mut Session, store: &dyn TemplateStore) -> Result<GenerationReport, SessionError> {
    let report = generator::generate_initial_games(session, store)?;
    session.status = SessionStatus::Active;
    session.started_at = Some(Utc::now());
    session.update_progress();
    log::info!(
        "Session {} active: {} game(s) scheduled, {} slot(s) skipped",
        session.name, report.created, report.skipped
    );
    Ok(report)
}

/// Advance a tournament to its next stage: cancel superseded pending games,
/// recompute rankings, bump the stage and generate its games. Blocked while
/// any current-stage game is in play, and once the final stage is reached.
pub fn advance_stage(
    session: &mut Session,
    store: &dyn TemplateStore,
) -> Result<GenerationReport, SessionError> {
    if session.status != SessionStatus::Active {
        return Err(SessionError::InvalidStatus);
    }
    if !session.session_type.is_tournament() {
        return Err(SessionError::WrongSessionType);
    }
    if session.current_stage >= MAX_TOURNAMENT_STAGE {
        return Err(SessionError::MaxStageReached);
    }
    let in_play = session
        .games
        .iter()
        .filter(|g| g.stage == Some(session.current_stage) && g.status == GameStatus::Active)
        .count();
    if in_play > 0 {
        return Err(SessionError::StageIncomplete { in_play });
    }

    let cancelled = cancel_pending_games(session);
    session.update_rankings();
    let from_stage = session.current_stage;
    session.current_stage += 1;
    let report = generator::generate_stage_games(session, store)?;
    session.update_progress();
    log::info!(
        "Tournament advanced from stage {} to {}: {} game(s) generated, {} superseded game(s) cancelled",
        from_stage, session.current_stage, report.created, cancelled
    );
    Ok(report)
}

/// Advance a playoff session into its bracket: cancel leftover pending
/// regular games, run one ranking pass and seed the bracket from it.
/// Blocked while a regular game is in play or once the bracket exists.
pub fn advance_playoffs(session: &mut Session) -> Result<GenerationReport, SessionError> {
    if session.status != SessionStatus::Active {
        return Err(SessionError::InvalidStatus);
    }
    if !session.session_type.has_playoff_bracket() {
        return Err(SessionError::WrongSessionType);
    }
    if session.has_playoff_games() {
        return Err(SessionError::PlayoffsAlreadyGenerated);
    }
    let in_play = session
        .games
        .iter()
        .filter(|g| !g.is_playoff_game && g.status == GameStatus::Active)
        .count();
    if in_play > 0 {
        return Err(SessionError::RegularGamesIncomplete { in_play });
    }

    let cancelled = cancel_pending_games(session);
    session.update_rankings();
    let report = generator::generate_playoff_bracket(session)?;
    scheduler::reorganize_queue(session);
    session.update_progress();
    log::info!(
        "Playoff bracket generated: {} game(s), {} superseded game(s) cancelled",
        report.created, cancelled
    );
    Ok(report)
}

/// Generate the gold and bronze finals of a Playoff8 session once both
/// semifinals are completed.
pub fn generate_p8_finals(session: &mut Session) -> Result<GenerationReport, SessionError> {
    if session.status != SessionStatus::Active {
        return Err(SessionError::InvalidStatus);
    }
    generator::generate_p8_finals(session)
}

/// End a session early: cancel everything still open, run a final ranking
/// pass and mark the session completed. Irreversible.
pub fn finalize_session(session: &mut Session) -> Result<(), SessionError> {
    if session.status != SessionStatus::Active {
        return Err(SessionError::InvalidStatus);
    }
    let mut cancelled = 0;
    for game in session.games.iter_mut().filter(|g| g.is_open()) {
        game.status = GameStatus::Cancelled;
        game.court_id = None;
        cancelled += 1;
    }
    for court in &mut session.courts {
        court.status = CourtStatus::Available;
    }
    session.update_rankings();
    session.status = SessionStatus::Completed;
    session.completed_at = Some(Utc::now());
    session.update_progress();
    log::info!("Session {} finalized ({} open game(s) cancelled)", session.name, cancelled);
    Ok(())
}

/// Cancel-and-retain every pending game (superseded by an advance). Their
/// court reservations are released; totals stay stable for progress
/// accounting.
fn cancel_pending_games(session: &mut Session) -> usize {
    let mut cancelled = 0;
    for game in session
        .games
        .iter_mut()
        .filter(|g| g.status == GameStatus::Pending)
    {
        game.status = GameStatus::Cancelled;
        game.court_id = None;
        cancelled += 1;
    }
    if cancelled > 0 {
        log::info!("{} pending game(s) cancelled and retained", cancelled);
    }
    cancelled
}
