//! ELO-style team rating updates with margin-of-victory scaling.

use crate::models::{Game, GameId, GameStatus, PlayerId, Session, SessionError, SetsFormat, Team};

/// How far one result can move a team's rating.
pub const K_FACTOR: f64 = 32.0;

/// Highest/lowest/average/median view of a session's ratings.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RatingDistribution {
    pub highest: f64,
    pub lowest: f64,
    pub average: f64,
    pub median: f64,
    /// (display name, rating) pairs, best first.
    pub players: Vec<(String, f64)>,
}

/// Adjust the ratings of all four participants of a completed game, once.
/// Both players of a team receive the same delta.
pub fn update_ratings(session: &mut Session, game_id: GameId) -> Result<(), SessionError> {
    let game = session
        .game(game_id)
        .ok_or(SessionError::GameNotFound(game_id))?;
    if game.status != GameStatus::Completed {
        return Err(SessionError::InvalidGameStatus(game_id));
    }
    let winner = game
        .winner_team
        .ok_or(SessionError::InvalidGameStatus(game_id))?;
    let (team1, team2) = (game.team1, game.team2);
    let margin = effective_margin(game, session.sets_format);
    let multiplier = margin_multiplier(margin, session.points_per_game);

    let team1_avg = team_average(session, team1)?;
    let team2_avg = team_average(session, team2)?;
    let team1_expected = expected_score(team1_avg, team2_avg);
    let team2_expected = 1.0 - team1_expected;
    let (team1_actual, team2_actual) = match winner {
        Team::One => (1.0, 0.0),
        Team::Two => (0.0, 1.0),
    };

    let team1_delta = K_FACTOR * (team1_actual - team1_expected) * multiplier;
    let team2_delta = K_FACTOR * (team2_actual - team2_expected) * multiplier;

    for id in team1 {
        let player = session
            .player_mut(id)
            .ok_or(SessionError::PlayerNotFound(id))?;
        player.current_rating += team1_delta;
    }
    for id in team2 {
        let player = session
            .player_mut(id)
            .ok_or(SessionError::PlayerNotFound(id))?;
        player.current_rating += team2_delta;
    }
    log::debug!(
        "Ratings updated for game {}: team1 {:+.2}, team2 {:+.2} (margin {}, multiplier {:.2})",
        game_id, team1_delta, team2_delta, margin, multiplier
    );
    Ok(())
}

/// Reset every player to their seeded rating and replay all completed games
/// in completion order. Used after retroactive score corrections to keep the
/// rating history deterministic.
pub fn recalculate_all_ratings(session: &mut Session) -> Result<(), SessionError> {
    for p in &mut session.players {
        p.reset_rating();
    }
    let mut completed: Vec<_> = session
        .games
        .iter()
        .filter(|g| g.status == GameStatus::Completed)
        .map(|g| (g.completed_at, g.game_number, g.id))
        .collect();
    completed.sort();
    log::info!("Replaying {} completed game(s) for rating recalculation", completed.len());
    for (_, _, id) in completed {
        update_ratings(session, id)?;
    }
    Ok(())
}

/// Rating spread of the session, best player first.
pub fn rating_distribution(session: &Session) -> RatingDistribution {
    let mut ratings: Vec<(String, f64)> = session
        .players
        .iter()
        .map(|p| (p.display_name(), p.current_rating))
        .collect();
    ratings.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    let values: Vec<f64> = ratings.iter().map(|(_, r)| *r).collect();
    RatingDistribution {
        highest: values.first().copied().unwrap_or(0.0),
        lowest: values.last().copied().unwrap_or(0.0),
        average: if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        },
        median: median(&values),
        players: ratings,
    }
}

/// Standard ELO expectation for a team rated `rating_a` against `rating_b`.
pub fn expected_score(rating_a: f64, rating_b: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((rating_b - rating_a) / 400.0))
}

/// Map the point margin onto [0.5, 1.5]: margin is normalized against the
/// points-per-game target and clamped to 1 before the shift.
pub fn margin_multiplier(margin: u16, points_per_game: u16) -> f64 {
    let normalized = (f64::from(margin) / f64::from(points_per_game.max(1))).min(1.0);
    0.5 + normalized
}

/// Margin fed into the multiplier. For a best-of-three that went to a
/// deciding set, only the third set counts (via 20 + set score per side), so
/// the two already-decided sets cannot dominate the margin.
fn effective_margin(game: &Game, format: SetsFormat) -> u16 {
    if format == SetsFormat::BestOfThree {
        if let Some(third) = game.deciding_set() {
            let team1_input = 20 + i32::from(third.team1);
            let team2_input = 20 + i32::from(third.team2);
            return team1_input.abs_diff(team2_input) as u16;
        }
    }
    game.point_margin()
}

fn team_average(session: &Session, team: [PlayerId; 2]) -> Result<f64, SessionError> {
    let mut sum = 0.0;
    for id in team {
        sum += session
            .player(id)
            .ok_or(SessionError::PlayerNotFound(id))?
            .current_rating;
    }
    Ok(sum / 2.0)
}

/// Median of a sorted-descending rating list (0 when empty).
fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}
