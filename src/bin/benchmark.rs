use clap::Parser;
use draughts::agents::RandomActor;
use draughts::mcts::SearchSummary;
use draughts::{legal_moves, Actor, Board, MctsConfig, MctsEngine, Player, StatsStore, Zobrist};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Board size (default: 8)
    #[arg(long, default_value_t = 8)]
    board_size: usize,

    /// Random games to sample positions from for move generation timing
    #[arg(long, default_value_t = 200)]
    games: u32,

    /// Search decisions to time (default: 20)
    #[arg(long, default_value_t = 20)]
    decisions: u32,

    /// Simulations per search decision
    #[arg(long, default_value_t = 200)]
    simulations: u32,

    #[arg(long, default_value_t = 1.5)]
    exploration: f64,

    #[arg(long, default_value_t = 7)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    println!("Draughts Arena - Benchmark Tool");
    println!("===============================");
    println!("Board: {}x{}", args.board_size, args.board_size);
    println!("Random games: {}", args.games);
    println!("Search decisions: {} x {} simulations", args.decisions, args.simulations);
    println!("-------------------------------");

    #[cfg(debug_assertions)]
    println!("WARNING: Running in debug mode. Performance will be significantly lower.\nUse --release for accurate benchmarks.\n");

    println!("\nRunning move generation benchmark...");
    let (positions, elapsed) = movegen_benchmark(&args)?;
    let secs = elapsed.as_secs_f64();
    println!("Move generation Results:");
    println!("  Positions: {}", positions);
    println!("  Time: {:.3}s", secs);
    println!("  Rate: {:.0} positions/sec", positions as f64 / secs);

    println!("\nRunning search benchmark...");
    let (summary, elapsed) = search_benchmark(&args)?;
    print_stats(&summary, elapsed);
    Ok(())
}

/// Plays random games, generating legal moves at every ply.
fn movegen_benchmark(args: &Args) -> anyhow::Result<(u64, Duration)> {
    let mut white = RandomActor::new(Player::White, Xoshiro256PlusPlus::seed_from_u64(args.seed));
    let mut black = RandomActor::new(Player::Black, Xoshiro256PlusPlus::seed_from_u64(args.seed ^ 1));
    let mut positions = 0u64;
    let start = Instant::now();

    for _ in 0..args.games {
        let mut board = Board::new(args.board_size)?;
        let mut player = Player::White;
        for _ in 0..200 {
            let moves = legal_moves(player, &board);
            positions += 1;
            if moves.is_empty() {
                break;
            }
            let actor: &mut dyn Actor = match player {
                Player::White => &mut white,
                Player::Black => &mut black,
            };
            let mv = actor.select_action(&board, &moves)?;
            board = board.apply(player, &mv)?;
            player = player.opponent();
        }
    }
    Ok((positions, start.elapsed()))
}

/// Times consecutive searches from the opening, alternating sides on one store.
fn search_benchmark(args: &Args) -> anyhow::Result<(SearchSummary, Duration)> {
    let config = MctsConfig {
        simulations: args.simulations,
        exploration: args.exploration,
        ..MctsConfig::default()
    };
    let zobrist = Arc::new(Zobrist::new(args.board_size, args.seed));
    let stats = StatsStore::new().into_shared();
    let mut engines = [Player::White, Player::Black].map(|p| {
        MctsEngine::new(
            p,
            config.clone(),
            Arc::clone(&zobrist),
            Arc::clone(&stats),
            Xoshiro256PlusPlus::seed_from_u64(args.seed.wrapping_add(p as u64)),
        )
    });

    let mut total = SearchSummary::default();
    let mut board = Board::new(args.board_size)?;
    let mut turn = 0usize;
    let start = Instant::now();
    for _ in 0..args.decisions {
        let engine = &mut engines[turn % 2];
        if legal_moves(engine.player(), &board).is_empty() {
            board = Board::new(args.board_size)?;
            turn = 0;
            continue;
        }
        let mv = engine.search(&board)?;
        let summary = engine.last_summary();
        total.simulations += summary.simulations;
        total.forced_expansions += summary.forced_expansions;
        total.white_wins += summary.white_wins;
        total.black_wins += summary.black_wins;
        total.stalemates += summary.stalemates;
        board = board.apply(engine.player(), &mv)?;
        turn += 1;
    }
    total.store_size = stats.lock().len();
    Ok((total, start.elapsed()))
}

fn print_stats(summary: &SearchSummary, duration: Duration) {
    let secs = duration.as_secs_f64();
    println!("Search Results:");
    println!("  Simulations: {}", summary.simulations);
    println!("  Forced expansions: {}", summary.forced_expansions);
    println!("  Time: {:.3}s", secs);
    println!("  SPS: {:.0} sims/sec", summary.simulations as f64 / secs);
    println!(
        "  Outcomes: {} white / {} black / {} stalemate",
        summary.white_wins, summary.black_wins, summary.stalemates
    );
    println!("  Positions stored: {}", summary.store_size);
}
