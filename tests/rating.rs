//! Integration tests for the ELO-style rating engine.

use pickleball_scheduler::{
    expected_score, margin_multiplier, rating_distribution, recalculate_all_ratings,
    start_session, submit_score, submit_set_scores, InMemoryTemplateStore, PlayerSetup, Session,
    SessionConfig, SessionType, SetScore, SetsFormat, SkillLevel, Template, TemplateBlock,
    TemplateCourt, TemplateRound, K_FACTOR,
};

fn config(sets_format: SetsFormat, levels: [SkillLevel; 4]) -> SessionConfig {
    SessionConfig {
        name: "rating test".to_string(),
        court_names: vec!["Court 1".to_string()],
        duration_hours: 2,
        points_per_game: 11,
        win_by: 2,
        sets_format,
        session_type: SessionType::Simple,
        players: levels
            .iter()
            .enumerate()
            .map(|(i, level)| PlayerSetup {
                first_name: format!("Player{:02}", i + 1),
                last_initial: "T".to_string(),
                level: *level,
            })
            .collect(),
    }
}

fn one_game_template() -> Template {
    Template {
        blocks: vec![TemplateBlock {
            label: "Open Play".to_string(),
            rounds: vec![TemplateRound {
                courts: vec![TemplateCourt {
                    team_a: ["P1".to_string(), "P2".to_string()],
                    team_b: ["P3".to_string(), "P4".to_string()],
                }],
            }],
        }],
    }
}

fn active_session(sets_format: SetsFormat, levels: [SkillLevel; 4]) -> Session {
    let mut store = InMemoryTemplateStore::new();
    store.insert("1C2H4P-S", one_game_template());
    let mut session = Session::new(config(sets_format, levels));
    start_session(&mut session, &store).unwrap();
    session
}

const AVERAGE: [SkillLevel; 4] = [
    SkillLevel::Average,
    SkillLevel::Average,
    SkillLevel::Average,
    SkillLevel::Average,
];

#[test]
fn expected_scores_sum_to_one() {
    for (a, b) in [(1000.0, 1000.0), (1200.0, 800.0), (950.0, 1075.0)] {
        assert!((expected_score(a, b) + expected_score(b, a) - 1.0).abs() < 1e-12);
    }
    // Equal ratings expect a coin flip
    assert!((expected_score(1000.0, 1000.0) - 0.5).abs() < 1e-12);
}

#[test]
fn margin_multiplier_is_clamped_to_half_through_one_and_a_half() {
    assert!((margin_multiplier(0, 11) - 0.5).abs() < 1e-12);
    assert!((margin_multiplier(11, 11) - 1.5).abs() < 1e-12);
    // Oversized margins do not push past the cap
    assert!((margin_multiplier(50, 11) - 1.5).abs() < 1e-12);
    assert!((margin_multiplier(2, 11) - (0.5 + 2.0 / 11.0)).abs() < 1e-12);
}

#[test]
fn shutout_between_equal_teams_moves_full_scaled_delta() {
    // Equal teams, 11-0: delta = 32 * (1 - 0.5) * 1.5 = 24 per player
    let mut session = active_session(SetsFormat::Single, AVERAGE);
    let game = session.games[0].id;
    submit_score(&mut session, game, 11, 0).unwrap();

    let winners = session.games[0].team1;
    let losers = session.games[0].team2;
    for id in winners {
        assert!((session.player(id).unwrap().current_rating - 1024.0).abs() < 1e-9);
    }
    for id in losers {
        assert!((session.player(id).unwrap().current_rating - 976.0).abs() < 1e-9);
    }
}

#[test]
fn both_teammates_receive_the_identical_delta() {
    let levels = [
        SkillLevel::AboveAverage,
        SkillLevel::BelowAverage,
        SkillLevel::Average,
        SkillLevel::Average,
    ];
    let mut session = active_session(SetsFormat::Single, levels);
    let game = session.games[0].id;
    let team1 = session.games[0].team1;
    let before: Vec<f64> = team1
        .iter()
        .map(|id| session.player(*id).unwrap().current_rating)
        .collect();

    submit_score(&mut session, game, 11, 5).unwrap();

    let deltas: Vec<f64> = team1
        .iter()
        .zip(&before)
        .map(|(id, b)| session.player(*id).unwrap().current_rating - b)
        .collect();
    assert!((deltas[0] - deltas[1]).abs() < 1e-9);
}

#[test]
fn team_delta_stays_within_the_scaled_bounds() {
    // |delta| must lie in [K * |actual - expected| * 0.5, K * |actual - expected| * 1.5]
    let mut session = active_session(SetsFormat::Single, AVERAGE);
    let game = session.games[0].id;
    submit_score(&mut session, game, 11, 6).unwrap();

    let winner = session.games[0].team1[0];
    let delta = session.player(winner).unwrap().current_rating - 1000.0;
    let base = K_FACTOR * 0.5; // equal teams: |actual - expected| = 0.5
    assert!(delta >= base * 0.5 - 1e-9);
    assert!(delta <= base * 1.5 + 1e-9);
}

#[test]
fn deciding_set_controls_the_margin() {
    // 11-9, 8-11, 11-9: margin comes from the third set only ((20+11) vs
    // (20+9) = 2), not the 30-29 aggregate (which would be 1).
    let mut session = active_session(SetsFormat::BestOfThree, AVERAGE);
    let game = session.games[0].id;
    let sets = [SetScore::new(11, 9), SetScore::new(8, 11), SetScore::new(11, 9)];
    submit_set_scores(&mut session, game, &sets).unwrap();

    let winner = session.games[0].team1[0];
    let expected_delta = K_FACTOR * 0.5 * (0.5 + 2.0 / 11.0);
    let delta = session.player(winner).unwrap().current_rating - 1000.0;
    assert!((delta - expected_delta).abs() < 1e-9);
}

#[test]
fn straight_sets_use_the_aggregate_margin() {
    // 11-5, 11-7: aggregates 22-12, margin 10 -> multiplier 0.5 + 10/11
    let mut session = active_session(SetsFormat::BestOfThree, AVERAGE);
    let game = session.games[0].id;
    submit_set_scores(&mut session, game, &[SetScore::new(11, 5), SetScore::new(11, 7)]).unwrap();

    let winner = session.games[0].team1[0];
    let expected_delta = K_FACTOR * 0.5 * (0.5 + 10.0 / 11.0);
    let delta = session.player(winner).unwrap().current_rating - 1000.0;
    assert!((delta - expected_delta).abs() < 1e-9);
}

#[test]
fn favorites_gain_less_than_underdogs() {
    let favorites = [
        SkillLevel::AboveAverage,
        SkillLevel::AboveAverage,
        SkillLevel::BelowAverage,
        SkillLevel::BelowAverage,
    ];
    let mut session = active_session(SetsFormat::Single, favorites);
    let game = session.games[0].id;
    submit_score(&mut session, game, 11, 5).unwrap();

    let favorite = session.games[0].team1[0];
    let favorite_gain = session.player(favorite).unwrap().current_rating - 1200.0;
    assert!(favorite_gain > 0.0);
    // An equal-strength winner with the same margin gains K * 0.5 * mult
    let equal_gain = K_FACTOR * 0.5 * (0.5 + 6.0 / 11.0);
    assert!(favorite_gain < equal_gain);
}

#[test]
fn recalculation_replays_to_the_same_ratings() {
    let mut session = active_session(SetsFormat::Single, AVERAGE);
    let game = session.games[0].id;
    submit_score(&mut session, game, 11, 4).unwrap();
    let snapshot: Vec<f64> = session.players.iter().map(|p| p.current_rating).collect();

    // Drift a rating out from under the engine, then replay.
    session.players[0].current_rating += 123.0;
    recalculate_all_ratings(&mut session).unwrap();

    for (player, expected) in session.players.iter().zip(snapshot) {
        assert!((player.current_rating - expected).abs() < 1e-9);
    }
}

#[test]
fn distribution_reports_spread_and_median() {
    let levels = [
        SkillLevel::AboveAverage,
        SkillLevel::Average,
        SkillLevel::Average,
        SkillLevel::BelowAverage,
    ];
    let session = Session::new(config(SetsFormat::Single, levels));
    let dist = rating_distribution(&session);
    assert!((dist.highest - 1200.0).abs() < 1e-9);
    assert!((dist.lowest - 800.0).abs() < 1e-9);
    assert!((dist.average - 1000.0).abs() < 1e-9);
    assert!((dist.median - 1000.0).abs() < 1e-9);
    assert_eq!(dist.players.len(), 4);
    assert_eq!(dist.players[0].0, "Player01 T.");
}
