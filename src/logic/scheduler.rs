//! Court/queue scheduling: pending games flow onto free courts in
//! game-number order; courts fill in court-number order.

use crate::models::{CourtId, CourtStatus, GameId, GameStatus, Session, SessionError, SessionStatus};
use chrono::Utc;
use std::collections::HashSet;

/// Assign free courts to queued games: unassigned pending games (ascending
/// game number) are zipped with free courts (ascending court number).
/// Surplus games stay queued; surplus courts stay idle. Idempotent: a second
/// run on an unchanged session assigns nothing.
///
/// Returns the number of assignments made.
pub fn reorganize_queue(session: &mut Session) -> usize {
    let mut queued: Vec<_> = session
        .games
        .iter()
        .filter(|g| g.status == GameStatus::Pending && g.court_id.is_none())
        .map(|g| (g.game_number, g.id))
        .collect();
    queued.sort();

    // A court is free when it is not hosting an active game and no pending
    // game already holds a reservation on it.
    let reserved: HashSet<CourtId> = session
        .games
        .iter()
        .filter(|g| g.is_open())
        .filter_map(|g| g.court_id)
        .collect();
    let mut free: Vec<_> = session
        .courts
        .iter()
        .filter(|c| c.is_available() && !reserved.contains(&c.id))
        .map(|c| (c.number, c.id))
        .collect();
    free.sort();

    let mut assigned = 0;
    for ((game_number, game_id), (court_number, court_id)) in queued.into_iter().zip(free) {
        if let Some(game) = session.game_mut(game_id) {
            game.court_id = Some(court_id);
            assigned += 1;
            log::debug!("Game {} queued onto court {}", game_number, court_number);
        }
    }
    assigned
}

/// Start a pending game on the lowest-numbered available court. The court
/// need not be the one previously reserved for the game; if another pending
/// game held a reservation on it, that game returns to the queue. Courts
/// therefore fill in a stable, predictable order regardless of assignment
/// history.
pub fn start_game(session: &mut Session, game_id: GameId) -> Result<(), SessionError> {
    if session.status != SessionStatus::Active {
        return Err(SessionError::InvalidStatus);
    }
    let game = session
        .game(game_id)
        .ok_or(SessionError::GameNotFound(game_id))?;
    if game.status != GameStatus::Pending {
        return Err(SessionError::InvalidGameStatus(game_id));
    }

    let mut available: Vec<_> = session
        .courts
        .iter()
        .filter(|c| c.is_available())
        .map(|c| (c.number, c.id))
        .collect();
    available.sort();
    let (court_number, court_id) = available.first().copied().ok_or(SessionError::NoAvailableCourt)?;

    // Displace any other pending game reserving this court.
    for other in session
        .games
        .iter_mut()
        .filter(|g| g.id != game_id && g.status == GameStatus::Pending)
    {
        if other.court_id == Some(court_id) {
            log::info!("Game {} unassigned to free court {}", other.game_number, court_number);
            other.court_id = None;
        }
    }

    let game = session
        .game_mut(game_id)
        .ok_or(SessionError::GameNotFound(game_id))?;
    game.court_id = Some(court_id);
    game.status = GameStatus::Active;
    game.started_at = Some(Utc::now());
    let game_number = game.game_number;
    if let Some(court) = session.court_mut(court_id) {
        court.status = CourtStatus::Occupied;
    }
    log::info!("Game {} started on court {}", game_number, court_number);

    reorganize_queue(session);
    Ok(())
}

/// Cancel a pending or active game. Cancelled games are retained (they keep
/// counting toward the session total); the court is freed and the queue
/// reorganized.
pub fn cancel_game(session: &mut Session, game_id: GameId) -> Result<(), SessionError> {
    let game = session
        .game(game_id)
        .ok_or(SessionError::GameNotFound(game_id))?;
    if !game.is_open() {
        return Err(SessionError::InvalidGameStatus(game_id));
    }
    let was_active = game.status == GameStatus::Active;
    let court_id = game.court_id;

    let game = session
        .game_mut(game_id)
        .ok_or(SessionError::GameNotFound(game_id))?;
    game.status = GameStatus::Cancelled;
    game.court_id = None;
    let game_number = game.game_number;

    if was_active {
        if let Some(court) = court_id.and_then(|id| session.court_mut(id)) {
            court.status = CourtStatus::Available;
        }
    }
    log::info!("Game {} cancelled", game_number);

    reorganize_queue(session);
    Ok(())
}
