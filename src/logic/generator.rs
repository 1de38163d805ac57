//! Game generation: schedule templates, the randomized fallback, stage
//! generation, and playoff brackets.
//!
//! Template interpretation is best-effort per game slot: a notation that
//! cannot resolve to a concrete player skips that one game (logged and
//! counted) instead of failing the batch.

use crate::logic::scheduler;
use crate::models::{
    Game, GameStatus, PlayerId, PlayoffRound, Session, SessionConfig, SessionError, SessionType,
};
use crate::templates::{
    GameOutcome, GameRef, PlayerSlot, Template, TemplateBlock, TemplateStore,
};
use rand::seq::SliceRandom;

/// Throughput assumption for the fallback heuristic: games one court gets
/// through in an hour.
pub const GAMES_PER_COURT_HOUR: u32 = 4;

/// Outcome of a generation pass: games created plus slots skipped because a
/// notation could not be resolved.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct GenerationReport {
    pub created: u32,
    pub skipped: u32,
}

impl GenerationReport {
    fn absorb(&mut self, other: GenerationReport) {
        self.created += other.created;
        self.skipped += other.skipped;
    }
}

/// How `P<n>` notation resolves: against creation order (stage 1) or
/// against current rank (stage 2+ and playoff phases).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ResolveOrder {
    Creation,
    Rank,
}

/// Reject configurations the scheduler cannot run: too few players for the
/// courts (4 per court minimum), too many (8 per court), nonsense scoring
/// rules, or a structured format without a matching template.
pub fn validate_session_configuration(
    config: &SessionConfig,
    store: &dyn TemplateStore,
) -> Result<(), SessionError> {
    let courts = config.court_names.len() as u32;
    let players = config.players.len() as u32;
    let required = (courts * 4).max(4);
    if courts == 0 || players < required {
        return Err(SessionError::NotEnoughPlayers { required });
    }
    let maximum = courts * 8;
    if players > maximum {
        return Err(SessionError::TooManyPlayers { maximum });
    }
    if config.points_per_game == 0 || config.win_by == 0 {
        return Err(SessionError::InvalidScoringRules);
    }
    if config.session_type.requires_template() {
        let key = config.template_key();
        if store.load_template(&key).is_none() {
            return Err(SessionError::NoTemplate { key });
        }
    }
    Ok(())
}

/// Materialize the initial game set for a session: the template when one
/// matches, otherwise the randomized fallback (free-running formats only).
/// Tournament sessions get their stage-1 block; playoff formats get their
/// first (regular-phase) block, with later blocks withheld until an explicit
/// advance.
pub fn generate_initial_games(
    session: &mut Session,
    store: &dyn TemplateStore,
) -> Result<GenerationReport, SessionError> {
    if !session.games.is_empty() {
        return Err(SessionError::GamesAlreadyGenerated);
    }
    let key = session.template_key();
    match store.load_template(&key) {
        Some(template) => {
            log::info!("Using schedule template {}", key);
            Ok(generate_from_template(session, &template))
        }
        None if session.session_type.requires_template() => {
            Err(SessionError::NoTemplate { key })
        }
        None => {
            log::warn!("No schedule template {}; using randomized matchmaking", key);
            Ok(generate_random_games(session))
        }
    }
}

fn generate_from_template(session: &mut Session, template: &Template) -> GenerationReport {
    let mut report = GenerationReport::default();
    for (index, block) in template.blocks.iter().enumerate() {
        if session.session_type.has_playoff_bracket() && index > 0 {
            log::info!("Withholding block {:?} until playoff advancement", block.label);
            continue;
        }
        if session.session_type.is_tournament() && block.stage() != Some(1) {
            log::info!("Withholding block {:?} until stage advancement", block.label);
            continue;
        }
        let stage = if session.session_type.is_tournament() { Some(1) } else { None };
        report.absorb(create_block_games(session, block, stage, ResolveOrder::Creation));
    }
    session.total_games = expected_total_games(session, Some(template));
    let assigned = scheduler::reorganize_queue(session);
    log::info!(
        "Initial generation: {} game(s) created, {} skipped, {} on court",
        report.created, report.skipped, assigned
    );
    report
}

/// Generate the template block for the tournament's current stage. `P<n>`
/// resolves by creation order in stage 1 and by current rank afterwards.
pub fn generate_stage_games(
    session: &mut Session,
    store: &dyn TemplateStore,
) -> Result<GenerationReport, SessionError> {
    if !session.session_type.is_tournament() {
        return Err(SessionError::WrongSessionType);
    }
    let key = session.template_key();
    let template = store
        .load_template(&key)
        .ok_or(SessionError::NoTemplate { key })?;
    let stage = session.current_stage;
    let Some(block) = template.stage_block(stage) else {
        log::warn!("Template has no block for stage {}", stage);
        return Ok(GenerationReport::default());
    };
    let order = if stage == 1 { ResolveOrder::Creation } else { ResolveOrder::Rank };
    let report = create_block_games(session, block, Some(stage), order);
    let assigned = scheduler::reorganize_queue(session);
    log::info!(
        "Stage {} generation: {} game(s) created, {} skipped, {} on court",
        stage, report.created, report.skipped, assigned
    );
    Ok(report)
}

/// Seed the playoff bracket from the current rankings. Playoff4 pairs
/// 1+4 vs 2+3 into a single final; Playoff8 seeds two semifinals,
/// 1+8 vs 4+5 and 2+7 vs 3+6.
pub fn generate_playoff_bracket(session: &mut Session) -> Result<GenerationReport, SessionError> {
    let ranked: Vec<PlayerId> = session.ranked_players().iter().map(|p| p.id).collect();
    let mut game_number = session.next_game_number();
    match session.session_type {
        SessionType::Playoff4 => {
            if ranked.len() < 4 {
                return Err(SessionError::NotEnoughPlayers { required: 4 });
            }
            session.games.push(Game::playoff(
                game_number,
                PlayoffRound::Final,
                [ranked[0], ranked[3]],
                [ranked[1], ranked[2]],
            ));
            log::info!("Playoff final seeded as game {}", game_number);
            Ok(GenerationReport { created: 1, skipped: 0 })
        }
        SessionType::Playoff8 => {
            if ranked.len() < 8 {
                return Err(SessionError::NotEnoughPlayers { required: 8 });
            }
            session.games.push(Game::playoff(
                game_number,
                PlayoffRound::Semifinal,
                [ranked[0], ranked[7]],
                [ranked[3], ranked[4]],
            ));
            game_number += 1;
            session.games.push(Game::playoff(
                game_number,
                PlayoffRound::Semifinal,
                [ranked[1], ranked[6]],
                [ranked[2], ranked[5]],
            ));
            log::info!("Playoff semifinals seeded as games {} and {}", game_number - 1, game_number);
            Ok(GenerationReport { created: 2, skipped: 0 })
        }
        _ => Err(SessionError::WrongSessionType),
    }
}

/// With both semifinals completed, send the winners to a gold game and the
/// losers to a bronze game.
pub fn generate_p8_finals(session: &mut Session) -> Result<GenerationReport, SessionError> {
    if session.session_type != SessionType::Playoff8 {
        return Err(SessionError::WrongSessionType);
    }
    let semis = session.playoff_games(PlayoffRound::Semifinal);
    if semis.len() != 2 || semis.iter().any(|g| g.status != GameStatus::Completed) {
        return Err(SessionError::SemifinalsIncomplete);
    }
    if session.playoff_game(PlayoffRound::Gold).is_some()
        || session.playoff_game(PlayoffRound::Bronze).is_some()
    {
        return Err(SessionError::FinalsAlreadyGenerated);
    }
    let (sf1, sf2) = (semis[0], semis[1]);
    let sf1_id = sf1.id;
    let sf2_id = sf2.id;
    let gold_teams = (
        sf1.winning_team_ids().ok_or(SessionError::InvalidGameStatus(sf1_id))?,
        sf2.winning_team_ids().ok_or(SessionError::InvalidGameStatus(sf2_id))?,
    );
    let bronze_teams = (
        sf1.losing_team_ids().ok_or(SessionError::InvalidGameStatus(sf1_id))?,
        sf2.losing_team_ids().ok_or(SessionError::InvalidGameStatus(sf2_id))?,
    );

    let gold_number = session.next_game_number();
    session.games.push(Game::playoff(gold_number, PlayoffRound::Gold, gold_teams.0, gold_teams.1));
    session.games.push(Game::playoff(
        gold_number + 1,
        PlayoffRound::Bronze,
        bronze_teams.0,
        bronze_teams.1,
    ));
    log::info!("Playoff finals generated: gold game {}, bronze game {}", gold_number, gold_number + 1);

    scheduler::reorganize_queue(session);
    session.update_progress();
    Ok(GenerationReport { created: 2, skipped: 0 })
}

/// Format-specific expected game total (the progress denominator):
/// tournaments count the full cross-stage template, playoff formats add the
/// fixed bracket size on top of the regular games, free-running formats
/// count what was generated.
pub fn expected_total_games(session: &Session, template: Option<&Template>) -> u32 {
    match session.session_type {
        SessionType::Tournament => template
            .map(Template::total_games)
            .unwrap_or(session.games.len() as u32),
        SessionType::Playoff4 | SessionType::Playoff8 => {
            let regular = session.games.iter().filter(|g| !g.is_playoff_game).count() as u32;
            regular + session.session_type.fixed_playoff_games()
        }
        SessionType::Optimized | SessionType::Simple => session.games.len() as u32,
    }
}

fn create_block_games(
    session: &mut Session,
    block: &TemplateBlock,
    stage: Option<u8>,
    order: ResolveOrder,
) -> GenerationReport {
    let mut report = GenerationReport::default();
    let mut game_number = session.next_game_number();
    for round in &block.rounds {
        for court in &round.courts {
            let slots = [
                (&court.team_a[0], 0),
                (&court.team_a[1], 1),
                (&court.team_b[0], 0),
                (&court.team_b[1], 1),
            ];
            let mut ids = Vec::with_capacity(4);
            for (notation, slot_index) in slots {
                match resolve_slot(session, notation, slot_index, order) {
                    Some(id) => ids.push(id),
                    None => break,
                }
            }
            if ids.len() != 4 || !all_distinct(&ids) {
                log::warn!(
                    "Skipping game slot in block {:?}: unresolvable teams {:?} vs {:?}",
                    block.label, court.team_a, court.team_b
                );
                report.skipped += 1;
                continue;
            }
            session
                .games
                .push(Game::new(game_number, stage, [ids[0], ids[1]], [ids[2], ids[3]]));
            game_number += 1;
            report.created += 1;
        }
    }
    report
}

/// Resolve one notation slot to a player, or `None` when it refers to a
/// position, rank, or game result that does not (yet) exist.
fn resolve_slot(
    session: &Session,
    notation: &str,
    slot_index: usize,
    order: ResolveOrder,
) -> Option<PlayerId> {
    let slot: PlayerSlot = match notation.parse() {
        Ok(slot) => slot,
        Err(e) => {
            log::warn!("{}", e);
            return None;
        }
    };
    match slot {
        PlayerSlot::Position(n) => match order {
            ResolveOrder::Creation => session.players.get(n as usize - 1).map(|p| p.id),
            ResolveOrder::Rank => player_by_rank(session, n),
        },
        PlayerSlot::StageRank { rank, .. } => player_by_rank(session, rank),
        PlayerSlot::FromGame { outcome, game } => {
            let referenced = match game {
                GameRef::Number(n) => session.games.iter().find(|g| g.game_number == n),
                GameRef::Semifinal(n) => session
                    .playoff_games(PlayoffRound::Semifinal)
                    .into_iter()
                    .nth(n as usize - 1),
            }?;
            if referenced.status != GameStatus::Completed {
                log::warn!(
                    "Referenced game {} is not completed; cannot resolve {:?}",
                    referenced.game_number, notation
                );
                return None;
            }
            let team = match outcome {
                GameOutcome::Winner => referenced.winning_team_ids()?,
                GameOutcome::Loser => referenced.losing_team_ids()?,
            };
            team.get(slot_index).copied()
        }
    }
}

/// The n-th player in rank order. Positional lookup keeps rank references
/// resolvable when tied ratings share a rank number.
fn player_by_rank(session: &Session, rank: u32) -> Option<PlayerId> {
    session
        .ranked_players()
        .get(rank as usize - 1)
        .map(|p| p.id)
}

fn all_distinct(ids: &[PlayerId]) -> bool {
    ids.iter()
        .all(|id| ids.iter().filter(|other| *other == id).count() == 1)
}

/// Fallback matchmaking: shuffle and repeatedly draw groups of four until
/// every player reached the target game count derived from court-hours, or
/// fewer than four players still have quota left.
fn generate_random_games(session: &mut Session) -> GenerationReport {
    let mut rng = rand::thread_rng();
    let total_games = session.number_of_courts * session.duration_hours * GAMES_PER_COURT_HOUR;
    let groups = (session.players.len() as f64 / 4.0).max(1.0);
    let min_games_per_player = (f64::from(total_games) / groups).ceil() as u32;

    let mut counts: std::collections::HashMap<PlayerId, u32> =
        session.players.iter().map(|p| (p.id, 0)).collect();
    let mut report = GenerationReport::default();
    let mut game_number = session.next_game_number();

    for _ in 0..total_games {
        let mut pool: Vec<PlayerId> = session
            .players
            .iter()
            .map(|p| p.id)
            .filter(|id| counts[id] < min_games_per_player)
            .collect();
        if pool.len() < 4 {
            break;
        }
        pool.shuffle(&mut rng);
        let picked = [pool[0], pool[1], pool[2], pool[3]];
        session
            .games
            .push(Game::new(game_number, None, [picked[0], picked[1]], [picked[2], picked[3]]));
        for id in picked {
            if let Some(count) = counts.get_mut(&id) {
                *count += 1;
            }
        }
        game_number += 1;
        report.created += 1;
    }

    session.total_games = expected_total_games(session, None);
    let assigned = scheduler::reorganize_queue(session);
    log::info!(
        "Randomized matchmaking: {} game(s) created, {} on court",
        report.created, assigned
    );
    report
}
