//! Score validation, submission, and retroactive corrections.
//!
//! Submitting a score drives the whole post-game sequence: complete the
//! game, free its court, update player stats, ratings, rankings and
//! progress, auto-complete the session when nothing is left, then refill
//! the queue. Validation happens before any mutation so a rejected score
//! leaves the session untouched.

use crate::logic::{rating, scheduler};
use crate::models::{
    CourtStatus, GameId, GameStatus, Session, SessionError, SessionStatus, SetScore, SetsFormat,
    Team,
};
use chrono::Utc;

/// Symmetric yes/no form of the score rule (see `validate_score` for the
/// rule-by-rule variant).
pub fn is_score_valid(session: &Session, team1_score: u16, team2_score: u16) -> bool {
    validate_score(session, team1_score, team2_score).is_ok()
}

/// A score pair is valid iff it is not tied, the winner reached the
/// configured points per game, and the margin meets win-by.
pub fn validate_score(session: &Session, team1_score: u16, team2_score: u16) -> Result<(), SessionError> {
    if team1_score == team2_score {
        return Err(SessionError::TiedScore);
    }
    let winner_score = team1_score.max(team2_score);
    let loser_score = team1_score.min(team2_score);
    if winner_score < session.points_per_game {
        return Err(SessionError::ScoreTooLow {
            minimum: session.points_per_game,
        });
    }
    if winner_score - loser_score < session.win_by {
        return Err(SessionError::MarginTooSmall {
            win_by: session.win_by,
        });
    }
    Ok(())
}

/// Validate a best-of-three set sequence: two or three sets, each valid on
/// its own, one team winning exactly two, and no third set after a 2-0.
/// Returns the aggregate scores and the winner.
pub fn validate_sets(session: &Session, sets: &[SetScore]) -> Result<(u16, u16, Team), SessionError> {
    if sets.len() < 2 || sets.len() > 3 {
        return Err(SessionError::MalformedSets);
    }
    let mut team1_sets = 0u8;
    let mut team2_sets = 0u8;
    for set in sets {
        validate_score(session, set.team1, set.team2)?;
        match set.winner() {
            Some(Team::One) => team1_sets += 1,
            Some(Team::Two) => team2_sets += 1,
            None => return Err(SessionError::MalformedSets),
        }
    }
    // A 2-0 after two sets means the third was never played.
    if sets.len() == 3 && sets[0].winner() == sets[1].winner() {
        return Err(SessionError::MalformedSets);
    }
    let winner = match (team1_sets, team2_sets) {
        (2, _) => Team::One,
        (_, 2) => Team::Two,
        _ => return Err(SessionError::MalformedSets),
    };
    let team1_total: u16 = sets.iter().map(|s| s.team1).sum();
    let team2_total: u16 = sets.iter().map(|s| s.team2).sum();
    Ok((team1_total, team2_total, winner))
}

/// Submit a single-set result for a pending or active game.
pub fn submit_score(
    session: &mut Session,
    game_id: GameId,
    team1_score: u16,
    team2_score: u16,
) -> Result<(), SessionError> {
    if session.sets_format != SetsFormat::Single {
        return Err(SessionError::MalformedSets);
    }
    check_open_game(session, game_id)?;
    validate_score(session, team1_score, team2_score)?;
    let winner = if team1_score > team2_score { Team::One } else { Team::Two };
    finish_game(session, game_id, team1_score, team2_score, Vec::new(), winner)
}

/// Submit a best-of-three result for a pending or active game.
pub fn submit_set_scores(
    session: &mut Session,
    game_id: GameId,
    sets: &[SetScore],
) -> Result<(), SessionError> {
    if session.sets_format != SetsFormat::BestOfThree {
        return Err(SessionError::MalformedSets);
    }
    check_open_game(session, game_id)?;
    let (team1_total, team2_total, winner) = validate_sets(session, sets)?;
    finish_game(session, game_id, team1_total, team2_total, sets.to_vec(), winner)
}

/// Correct the result of an already-completed single-set game. Player stats
/// are reverted and reapplied, and the whole rating history is replayed so
/// ratings stay deterministic.
pub fn update_score(
    session: &mut Session,
    game_id: GameId,
    team1_score: u16,
    team2_score: u16,
) -> Result<(), SessionError> {
    if session.sets_format != SetsFormat::Single {
        return Err(SessionError::MalformedSets);
    }
    check_completed_game(session, game_id)?;
    validate_score(session, team1_score, team2_score)?;
    let winner = if team1_score > team2_score { Team::One } else { Team::Two };
    rewrite_game(session, game_id, team1_score, team2_score, Vec::new(), winner)
}

/// Correct the result of an already-completed best-of-three game.
pub fn update_set_scores(
    session: &mut Session,
    game_id: GameId,
    sets: &[SetScore],
) -> Result<(), SessionError> {
    if session.sets_format != SetsFormat::BestOfThree {
        return Err(SessionError::MalformedSets);
    }
    check_completed_game(session, game_id)?;
    let (team1_total, team2_total, winner) = validate_sets(session, sets)?;
    rewrite_game(session, game_id, team1_total, team2_total, sets.to_vec(), winner)
}

fn check_open_game(session: &Session, game_id: GameId) -> Result<(), SessionError> {
    if session.status != SessionStatus::Active {
        return Err(SessionError::InvalidStatus);
    }
    let game = session
        .game(game_id)
        .ok_or(SessionError::GameNotFound(game_id))?;
    if !game.is_open() {
        return Err(SessionError::InvalidGameStatus(game_id));
    }
    for id in game.player_ids() {
        if session.player(id).is_none() {
            return Err(SessionError::PlayerNotFound(id));
        }
    }
    Ok(())
}

fn check_completed_game(session: &Session, game_id: GameId) -> Result<(), SessionError> {
    let game = session
        .game(game_id)
        .ok_or(SessionError::GameNotFound(game_id))?;
    if game.status != GameStatus::Completed {
        return Err(SessionError::InvalidGameStatus(game_id));
    }
    for id in game.player_ids() {
        if session.player(id).is_none() {
            return Err(SessionError::PlayerNotFound(id));
        }
    }
    Ok(())
}

fn finish_game(
    session: &mut Session,
    game_id: GameId,
    team1_score: u16,
    team2_score: u16,
    sets: Vec<SetScore>,
    winner: Team,
) -> Result<(), SessionError> {
    let now = Utc::now();
    let court_id;
    let game_number;
    {
        let game = session
            .game_mut(game_id)
            .ok_or(SessionError::GameNotFound(game_id))?;
        game.team1_score = Some(team1_score);
        game.team2_score = Some(team2_score);
        game.sets = sets;
        game.winner_team = Some(winner);
        game.status = GameStatus::Completed;
        game.completed_at = Some(now);
        court_id = game.court_id;
        game_number = game.game_number;
    }
    if let Some(court) = court_id.and_then(|id| session.court_mut(id)) {
        court.status = CourtStatus::Available;
    }
    log::info!(
        "Game {} completed {}-{} (team {:?} wins)",
        game_number, team1_score, team2_score, winner
    );

    apply_player_stats(session, game_id)?;
    rating::update_ratings(session, game_id)?;
    session.update_rankings();
    session.update_progress();

    if session.is_fully_completed() && session.status == SessionStatus::Active {
        session.status = SessionStatus::Completed;
        session.completed_at = Some(now);
        log::info!("Session {} completed", session.name);
    }

    scheduler::reorganize_queue(session);
    Ok(())
}

fn rewrite_game(
    session: &mut Session,
    game_id: GameId,
    team1_score: u16,
    team2_score: u16,
    sets: Vec<SetScore>,
    winner: Team,
) -> Result<(), SessionError> {
    revert_player_stats(session, game_id)?;
    {
        let game = session
            .game_mut(game_id)
            .ok_or(SessionError::GameNotFound(game_id))?;
        game.team1_score = Some(team1_score);
        game.team2_score = Some(team2_score);
        game.sets = sets;
        game.winner_team = Some(winner);
    }
    apply_player_stats(session, game_id)?;
    rating::recalculate_all_ratings(session)?;
    session.update_rankings();
    session.update_progress();
    Ok(())
}

/// Record the game on all four players' stat lines.
fn apply_player_stats(session: &mut Session, game_id: GameId) -> Result<(), SessionError> {
    let game = session
        .game(game_id)
        .ok_or(SessionError::GameNotFound(game_id))?;
    let (team1, team2) = (game.team1, game.team2);
    let team1_score = game.team1_score.unwrap_or(0);
    let team2_score = game.team2_score.unwrap_or(0);
    let winner = game
        .winner_team
        .ok_or(SessionError::InvalidGameStatus(game_id))?;
    for id in team1 {
        session
            .player_mut(id)
            .ok_or(SessionError::PlayerNotFound(id))?
            .record_game(winner == Team::One, team1_score, team2_score);
    }
    for id in team2 {
        session
            .player_mut(id)
            .ok_or(SessionError::PlayerNotFound(id))?
            .record_game(winner == Team::Two, team2_score, team1_score);
    }
    Ok(())
}

/// Undo a previously recorded game on all four players' stat lines.
fn revert_player_stats(session: &mut Session, game_id: GameId) -> Result<(), SessionError> {
    let game = session
        .game(game_id)
        .ok_or(SessionError::GameNotFound(game_id))?;
    let (team1, team2) = (game.team1, game.team2);
    let team1_score = game.team1_score.unwrap_or(0);
    let team2_score = game.team2_score.unwrap_or(0);
    let winner = game
        .winner_team
        .ok_or(SessionError::InvalidGameStatus(game_id))?;
    for id in team1 {
        session
            .player_mut(id)
            .ok_or(SessionError::PlayerNotFound(id))?
            .revert_game(winner == Team::One, team1_score, team2_score);
    }
    for id in team2 {
        session
            .player_mut(id)
            .ok_or(SessionError::PlayerNotFound(id))?
            .revert_game(winner == Team::Two, team2_score, team1_score);
    }
    Ok(())
}
