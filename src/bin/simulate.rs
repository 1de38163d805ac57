//! Drive one full Playoff8 session end to end with random scores and print
//! the final standings. Run with: cargo run --bin simulate
//! Useful for eyeballing the scheduling/ratings pipeline with RUST_LOG=debug.

use pickleball_scheduler::{
    advance_playoffs, create_session, generate_p8_finals, start_game, start_session, submit_score,
    GameStatus, InMemoryTemplateStore, PlayerSetup, Session, SessionConfig, SessionStatus,
    SessionType, SetsFormat, SkillLevel,
};
use rand::Rng;

/// Regular phase for 1 court / 2 hours / 8 players: every player gets four
/// games before the bracket.
const TEMPLATE_JSON: &str = r#"{
  "blocks": [
    {
      "label": "Regular Play",
      "rounds": [
        { "courts": [ { "A": ["P1", "P2"], "B": ["P3", "P4"] } ] },
        { "courts": [ { "A": ["P5", "P6"], "B": ["P7", "P8"] } ] },
        { "courts": [ { "A": ["P1", "P3"], "B": ["P5", "P7"] } ] },
        { "courts": [ { "A": ["P2", "P4"], "B": ["P6", "P8"] } ] },
        { "courts": [ { "A": ["P1", "P5"], "B": ["P2", "P6"] } ] },
        { "courts": [ { "A": ["P3", "P7"], "B": ["P4", "P8"] } ] },
        { "courts": [ { "A": ["P1", "P8"], "B": ["P2", "P7"] } ] },
        { "courts": [ { "A": ["P3", "P6"], "B": ["P4", "P5"] } ] }
      ]
    },
    { "label": "Playoff Finals", "rounds": [] }
  ]
}"#;

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let mut store = InMemoryTemplateStore::new();
    store.insert(
        "1C2H8P-P8",
        serde_json::from_str(TEMPLATE_JSON).expect("embedded template is valid JSON"),
    );

    let names = ["Ana", "Ben", "Carla", "Dan", "Elena", "Felix", "Gina", "Hugo"];
    let config = SessionConfig {
        name: "Saturday open play".to_string(),
        court_names: vec!["Center".to_string()],
        duration_hours: 2,
        points_per_game: 11,
        win_by: 2,
        sets_format: SetsFormat::Single,
        session_type: SessionType::Playoff8,
        players: names
            .iter()
            .enumerate()
            .map(|(i, name)| PlayerSetup {
                first_name: (*name).to_string(),
                last_initial: "X".to_string(),
                level: match i % 3 {
                    0 => SkillLevel::AboveAverage,
                    1 => SkillLevel::Average,
                    _ => SkillLevel::BelowAverage,
                },
            })
            .collect(),
    };

    let mut session = create_session(config, &store).expect("valid configuration");
    start_session(&mut session, &store).expect("session starts");

    let mut rng = rand::thread_rng();
    while session.status == SessionStatus::Active {
        if let Some(game_id) = next_startable_game(&session) {
            start_game(&mut session, game_id).expect("game starts");
            let (winner_score, loser_score) = random_score(&mut rng, session.points_per_game, session.win_by);
            let (team1, team2) = if rng.gen_bool(0.5) {
                (winner_score, loser_score)
            } else {
                (loser_score, winner_score)
            };
            submit_score(&mut session, game_id, team1, team2).expect("valid score");
            continue;
        }
        // Queue drained: move the session along the bracket.
        if session.can_advance() {
            advance_playoffs(&mut session).expect("bracket generates");
        } else if generate_p8_finals(&mut session).is_err() {
            break;
        }
    }

    print_standings(&session);
}

fn next_startable_game(session: &Session) -> Option<pickleball_scheduler::GameId> {
    session
        .games
        .iter()
        .filter(|g| g.status == GameStatus::Pending && g.court_id.is_some())
        .min_by_key(|g| g.game_number)
        .map(|g| g.id)
}

fn random_score(rng: &mut impl Rng, points_per_game: u16, win_by: u16) -> (u16, u16) {
    let loser = rng.gen_range(0..=points_per_game.saturating_sub(win_by));
    (points_per_game, loser)
}

fn print_standings(session: &Session) {
    println!("\n=== {} ===", session.name);
    println!(
        "status: {:?}, progress: {:.0}%, games: {}/{}",
        session.status,
        session.progress_percentage,
        session.completed_game_count(),
        session.total_games
    );
    println!("{:<5} {:<12} {:>8} {:>6} {:>6}", "rank", "player", "rating", "won", "lost");
    for p in session.ranked_players() {
        println!(
            "{:<5} {:<12} {:>8.1} {:>6} {:>6}",
            p.current_rank.map_or_else(|| "-".to_string(), |r| r.to_string()),
            p.display_name(),
            p.current_rating,
            p.games_won,
            p.games_lost
        );
    }
}
