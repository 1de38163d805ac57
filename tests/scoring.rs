//! Integration tests for score validation, submission, and corrections.

use pickleball_scheduler::{
    is_score_valid, start_session, submit_score, submit_set_scores, update_score, CourtStatus,
    GameStatus, InMemoryTemplateStore, PlayerSetup, Session, SessionConfig, SessionError,
    SessionType, SetScore, SetsFormat, SkillLevel, Team, Template, TemplateBlock, TemplateCourt,
    TemplateRound,
};

fn config(points_per_game: u16, win_by: u16, sets_format: SetsFormat) -> SessionConfig {
    SessionConfig {
        name: "scoring test".to_string(),
        court_names: vec!["Court 1".to_string()],
        duration_hours: 2,
        points_per_game,
        win_by,
        sets_format,
        session_type: SessionType::Simple,
        players: (1..=4)
            .map(|i| PlayerSetup {
                first_name: format!("Player{i:02}"),
                last_initial: "T".to_string(),
                level: SkillLevel::Average,
            })
            .collect(),
    }
}

fn game_slot(a1: &str, a2: &str, b1: &str, b2: &str) -> TemplateCourt {
    TemplateCourt {
        team_a: [a1.to_string(), a2.to_string()],
        team_b: [b1.to_string(), b2.to_string()],
    }
}

fn two_game_template() -> Template {
    Template {
        blocks: vec![TemplateBlock {
            label: "Open Play".to_string(),
            rounds: vec![
                TemplateRound { courts: vec![game_slot("P1", "P2", "P3", "P4")] },
                TemplateRound { courts: vec![game_slot("P1", "P3", "P2", "P4")] },
            ],
        }],
    }
}

/// Active one-court session with two scheduled games.
fn active_session(points_per_game: u16, win_by: u16, sets_format: SetsFormat) -> Session {
    let mut store = InMemoryTemplateStore::new();
    store.insert("1C2H4P-S", two_game_template());
    let mut session = Session::new(config(points_per_game, win_by, sets_format));
    start_session(&mut session, &store).unwrap();
    session
}

#[test]
fn score_validity_is_symmetric() {
    let session = Session::new(config(11, 2, SetsFormat::Single));
    for (a, b) in [(11u16, 9u16), (9, 11), (11, 11), (11, 10), (7, 3), (15, 0)] {
        assert_eq!(is_score_valid(&session, a, b), is_score_valid(&session, b, a));
    }
}

#[test]
fn tied_scores_are_never_valid() {
    // win_by 1 does not rescue a tie
    let session = Session::new(config(11, 1, SetsFormat::Single));
    assert!(!is_score_valid(&session, 11, 11));
}

#[test]
fn winner_must_reach_points_per_game_and_margin() {
    let session = Session::new(config(11, 2, SetsFormat::Single));
    assert!(!is_score_valid(&session, 10, 5));
    assert!(!is_score_valid(&session, 11, 10));
    assert!(is_score_valid(&session, 11, 9));
    assert!(is_score_valid(&session, 12, 10));
}

#[test]
fn submitting_completes_game_and_backfills_court() {
    let mut session = active_session(11, 2, SetsFormat::Single);
    let first = session.games[0].id;
    let second = session.games[1].id;
    assert!(session.games[0].court_id.is_some());
    assert!(session.games[1].court_id.is_none());

    submit_score(&mut session, first, 11, 7).unwrap();

    let game = session.game(first).unwrap();
    assert_eq!(game.status, GameStatus::Completed);
    assert_eq!(game.winner_team, Some(Team::One));
    assert!(game.completed_at.is_some());
    assert_eq!(session.courts[0].status, CourtStatus::Available);
    // The freed court goes to the next queued game.
    assert!(session.game(second).unwrap().court_id.is_some());
    assert!((session.progress_percentage - 50.0).abs() < f64::EPSILON);
}

#[test]
fn submitting_updates_player_stats() {
    let mut session = active_session(11, 2, SetsFormat::Single);
    let first = session.games[0].id;
    let winners = session.games[0].team1;
    let losers = session.games[0].team2;

    submit_score(&mut session, first, 11, 7).unwrap();

    for id in winners {
        let p = session.player(id).unwrap();
        assert_eq!((p.games_played, p.games_won, p.games_lost), (1, 1, 0));
        assert_eq!((p.total_points_won, p.total_points_lost), (11, 7));
        assert!((p.win_percentage - 100.0).abs() < f64::EPSILON);
    }
    for id in losers {
        let p = session.player(id).unwrap();
        assert_eq!((p.games_played, p.games_won, p.games_lost), (1, 0, 1));
        assert_eq!((p.total_points_won, p.total_points_lost), (7, 11));
    }
}

#[test]
fn invalid_score_leaves_game_untouched() {
    let mut session = active_session(11, 2, SetsFormat::Single);
    let first = session.games[0].id;

    assert_eq!(
        submit_score(&mut session, first, 9, 9),
        Err(SessionError::TiedScore)
    );
    assert_eq!(
        submit_score(&mut session, first, 11, 10),
        Err(SessionError::MarginTooSmall { win_by: 2 })
    );
    let game = session.game(first).unwrap();
    assert_eq!(game.status, GameStatus::Pending);
    assert_eq!(game.team1_score, None);
}

#[test]
fn completed_games_reject_resubmission() {
    let mut session = active_session(11, 2, SetsFormat::Single);
    let first = session.games[0].id;
    submit_score(&mut session, first, 11, 7).unwrap();
    assert_eq!(
        submit_score(&mut session, first, 11, 3),
        Err(SessionError::InvalidGameStatus(first))
    );
}

#[test]
fn best_of_three_deciding_set_is_valid() {
    // 11-9, 8-11, 11-9: team 1 wins 2-1, aggregates 30-29
    let mut session = active_session(11, 2, SetsFormat::BestOfThree);
    let first = session.games[0].id;
    let sets = [SetScore::new(11, 9), SetScore::new(8, 11), SetScore::new(11, 9)];

    submit_set_scores(&mut session, first, &sets).unwrap();

    let game = session.game(first).unwrap();
    assert_eq!(game.status, GameStatus::Completed);
    assert_eq!(game.winner_team, Some(Team::One));
    assert_eq!(game.team1_score, Some(30));
    assert_eq!(game.team2_score, Some(29));
    assert_eq!(game.sets.len(), 3);
}

#[test]
fn best_of_three_rejects_malformed_sequences() {
    let mut session = active_session(11, 2, SetsFormat::BestOfThree);
    let first = session.games[0].id;

    // Third set after a straight 2-0
    let swept = [SetScore::new(11, 9), SetScore::new(11, 9), SetScore::new(11, 9)];
    assert_eq!(
        submit_set_scores(&mut session, first, &swept),
        Err(SessionError::MalformedSets)
    );
    // Only one set
    assert_eq!(
        submit_set_scores(&mut session, first, &[SetScore::new(11, 9)]),
        Err(SessionError::MalformedSets)
    );
    // A tied set is invalid on its own
    let tied = [SetScore::new(11, 11), SetScore::new(11, 9)];
    assert_eq!(
        submit_set_scores(&mut session, first, &tied),
        Err(SessionError::TiedScore)
    );
    // Aggregate submission is the wrong shape for best-of-three
    assert_eq!(
        submit_score(&mut session, first, 11, 9),
        Err(SessionError::MalformedSets)
    );
    assert_eq!(session.game(first).unwrap().status, GameStatus::Pending);
}

#[test]
fn best_of_three_straight_sets_are_valid() {
    let mut session = active_session(11, 2, SetsFormat::BestOfThree);
    let first = session.games[0].id;
    let sets = [SetScore::new(9, 11), SetScore::new(5, 11)];

    submit_set_scores(&mut session, first, &sets).unwrap();

    let game = session.game(first).unwrap();
    assert_eq!(game.winner_team, Some(Team::Two));
    assert_eq!(game.team1_score, Some(14));
    assert_eq!(game.team2_score, Some(22));
}

#[test]
fn update_score_reverts_and_reapplies_stats() {
    let mut session = active_session(11, 2, SetsFormat::Single);
    let first = session.games[0].id;
    let team1 = session.games[0].team1;
    let team2 = session.games[0].team2;
    submit_score(&mut session, first, 11, 7).unwrap();

    update_score(&mut session, first, 6, 11).unwrap();

    let game = session.game(first).unwrap();
    assert_eq!(game.winner_team, Some(Team::Two));
    for id in team1 {
        let p = session.player(id).unwrap();
        assert_eq!((p.games_played, p.games_won, p.games_lost), (1, 0, 1));
        assert_eq!((p.total_points_won, p.total_points_lost), (6, 11));
    }
    for id in team2 {
        let p = session.player(id).unwrap();
        assert_eq!((p.games_played, p.games_won, p.games_lost), (1, 1, 0));
    }
}

#[test]
fn update_score_requires_a_completed_game() {
    let mut session = active_session(11, 2, SetsFormat::Single);
    let first = session.games[0].id;
    assert_eq!(
        update_score(&mut session, first, 11, 7),
        Err(SessionError::InvalidGameStatus(first))
    );
}

#[test]
fn corrected_ratings_match_a_clean_replay() {
    // Submitting 11-7 then correcting to 6-11 must land on the same ratings
    // as submitting 6-11 in the first place.
    let mut corrected = active_session(11, 2, SetsFormat::Single);
    let mut direct = active_session(11, 2, SetsFormat::Single);
    let corrected_id = corrected.games[0].id;
    let direct_id = direct.games[0].id;

    submit_score(&mut corrected, corrected_id, 11, 7).unwrap();
    update_score(&mut corrected, corrected_id, 6, 11).unwrap();
    submit_score(&mut direct, direct_id, 6, 11).unwrap();

    for (a, b) in corrected.players.iter().zip(direct.players.iter()) {
        assert!((a.current_rating - b.current_rating).abs() < 1e-9);
    }
}

#[test]
fn submission_requires_an_active_session() {
    let mut session = Session::new(config(11, 2, SetsFormat::Single));
    let missing = uuid::Uuid::new_v4();
    assert_eq!(
        submit_score(&mut session, missing, 11, 7),
        Err(SessionError::InvalidStatus)
    );
}
