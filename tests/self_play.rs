use draughts::agents::{MctsActor, RandomActor};
use draughts::game_controller::{GameController, GameStatus};
use draughts::persistence::{JsonStatsFiles, StatsPersistence};
use draughts::render::{DisplayMode, TerminalRenderer};
use draughts::training::Trainer;
use draughts::{legal_moves, ArenaConfig, Board, MctsConfig, MctsEngine, Player, StatsStore, Zobrist};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_one_simulation_on_small_board() {
    let board = Board::new(4).unwrap();
    let zobrist = Arc::new(Zobrist::new(4, 9));
    let stats = StatsStore::new().into_shared();
    let config = MctsConfig {
        simulations: 1,
        ..MctsConfig::default()
    };
    let mut engine = MctsEngine::new(
        Player::White,
        config,
        Arc::clone(&zobrist),
        Arc::clone(&stats),
        Xoshiro256PlusPlus::seed_from_u64(4),
    );

    let mv = engine.search(&board).unwrap();
    let moves = legal_moves(Player::White, &board);
    assert!(moves.contains(&mv));

    let store = stats.lock();
    let root = store.get(zobrist.hash(&board)).unwrap();
    // budget plus one forced expansion per untouched root move
    assert_eq!(root.visits as usize, moves.move_count());
    for candidate in moves.moves() {
        let child = zobrist.hash(&board.apply(Player::White, &candidate).unwrap());
        assert_eq!(store.get(child).map(|s| s.visits), Some(1));
    }
}

#[test]
fn test_mcts_against_random_shows_the_game() {
    let zobrist = Arc::new(Zobrist::new(6, 1));
    let engine = MctsEngine::new(
        Player::White,
        MctsConfig {
            simulations: 10,
            ..MctsConfig::default()
        },
        zobrist,
        StatsStore::new().into_shared(),
        Xoshiro256PlusPlus::seed_from_u64(11),
    );
    let mut white = MctsActor::new(engine);
    let mut black = RandomActor::new(Player::Black, Xoshiro256PlusPlus::seed_from_u64(12));
    let mut renderer = TerminalRenderer::new(Vec::new());
    let mut controller = GameController::new(Board::new(6).unwrap(), 40);

    let status = controller
        .play_game(&mut white, &mut black, &mut renderer, DisplayMode::Plain)
        .unwrap();
    assert!(status.is_game_over());

    let transcript = String::from_utf8(renderer.into_inner()).unwrap();
    assert!(transcript.contains("white moves"));
    match status {
        GameStatus::Win(p) => assert!(transcript.contains(&format!("{p} wins"))),
        _ => assert!(transcript.contains("stalemate")),
    }
}

#[test]
fn test_training_snapshot_round_trips_through_files() {
    let dir = tempdir().unwrap();
    let mut config = ArenaConfig {
        board_size: 6,
        ..ArenaConfig::default()
    };
    config.mcts.simulations = 8;
    config.training.games = 2;
    config.training.max_rounds = 30;
    config.training.save_id = "smoke".to_string();
    let files = JsonStatsFiles::new(dir.path());

    let mut trainer = Trainer::new(config.clone(), files.clone()).unwrap();
    let summary = trainer.run().unwrap();
    assert_eq!(summary.games, 2);
    assert_eq!(summary.saves, 2);

    let (loaded, seed) = files.load("smoke").unwrap();
    assert_eq!(seed, config.zobrist_seed);
    let live = trainer.stats().lock();
    assert_eq!(loaded.len(), live.len());

    let opening = trainer.zobrist().hash(&Board::new(6).unwrap());
    let saved = loaded.get(opening).unwrap();
    let current = live.get(opening).unwrap();
    assert_eq!(saved.visits, current.visits);
    assert!((saved.value - current.value).abs() < 1e-12);
}
