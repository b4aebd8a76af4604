//! # Draughts Arena
//!
//! Command-line driver for the self-play draughts engine.
//!
//! ## Usage
//! ```text
//! play train --games 50 --save-id run1
//! play train --games 50 --load-id run1 --save-id run2
//! play match --white mcts --black random --load-id run2
//! play human --side black --load-id run2
//! play evaluate --games 100 --load-id run2
//! ```
//! Settings come from defaults, then an optional `--config` TOML file, then
//! command-line flags. Logging follows `RUST_LOG` (default `info`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use draughts::agents::{HumanActor, LineInput, MctsActor, RandomActor};
use draughts::game_controller::GameController;
use draughts::persistence::{load_checked, JsonStatsFiles};
use draughts::render::{DisplayMode, TerminalRenderer};
use draughts::training::{evaluate, Trainer};
use draughts::{Actor, ArenaConfig, Board, MctsEngine, Player, SharedStats, StatsStore, Zobrist};
use log::info;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Board size (even, at least 4)
    #[arg(long)]
    board_size: Option<usize>,

    /// Simulations per MCTS decision
    #[arg(short = 'n', long)]
    simulations: Option<u32>,

    /// UCB1 exploration constant
    #[arg(short, long)]
    exploration: Option<f64>,

    /// Seed for move randomness
    #[arg(long)]
    seed: Option<u64>,

    /// Seed for the position hash table
    #[arg(long)]
    zobrist_seed: Option<u64>,

    /// Directory holding saved statistics
    #[arg(long)]
    stats_dir: Option<PathBuf>,

    /// Draw boards without ANSI colors
    #[arg(long, default_value_t = false)]
    no_color: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Self-play training on one shared statistics store
    Train {
        #[arg(short, long)]
        games: Option<u32>,
        /// Save statistics under this id
        #[arg(long)]
        save_id: Option<String>,
        /// Resume from statistics saved under this id
        #[arg(long)]
        load_id: Option<String>,
        /// Save after every this many games (0 disables saving)
        #[arg(long)]
        save_every: Option<u32>,
        /// Full rounds before a stalemate (0 for no cap)
        #[arg(long)]
        max_rounds: Option<u32>,
        /// Draw every position while training
        #[arg(long, default_value_t = false)]
        show: bool,
    },
    /// One displayed game between two computer actors
    Match {
        #[arg(long, value_enum, default_value_t = Seat::Mcts)]
        white: Seat,
        #[arg(long, value_enum, default_value_t = Seat::Random)]
        black: Seat,
        #[arg(long)]
        load_id: Option<String>,
        #[arg(long)]
        max_rounds: Option<u32>,
    },
    /// Play against the MCTS actor from the terminal
    Human {
        /// Side the human plays
        #[arg(long, value_enum, default_value_t = Side::White)]
        side: Side,
        #[arg(long)]
        load_id: Option<String>,
    },
    /// MCTS against the random actor, games spread over a thread pool
    Evaluate {
        #[arg(short, long)]
        games: Option<u32>,
        /// Worker threads (0 for one per CPU)
        #[arg(short, long)]
        threads: Option<usize>,
        #[arg(long)]
        load_id: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Seat {
    Mcts,
    Random,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Side {
    White,
    Black,
}

impl From<Side> for Player {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Player::White,
            Side::Black => Player::Black,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level))
        .init();

    let mut config = match &args.config {
        Some(path) => ArenaConfig::load(path).with_context(|| format!("reading {}", path.display()))?,
        None => ArenaConfig::default(),
    };
    apply_overrides(&mut config, &args);
    config.validate().context("invalid settings")?;

    let mode = if args.no_color {
        DisplayMode::Plain
    } else {
        DisplayMode::Colored
    };

    match args.command {
        Command::Train { show, .. } => {
            let files = JsonStatsFiles::new(&config.training.stats_dir);
            let mut trainer = Trainer::new(config, files).context("starting training")?;
            let summary = if show {
                trainer.run_with(&mut TerminalRenderer::stdout(), mode)?
            } else {
                trainer.run()?
            };
            println!(
                "{} games: {} white wins, {} black wins, {} stalemates, {} positions known",
                summary.games, summary.white_wins, summary.black_wins, summary.stalemates, summary.positions
            );
        }
        Command::Match {
            white,
            black,
            ref load_id,
            ..
        } => {
            let (zobrist, stats) = load_stats(&config, load_id.as_deref())?;
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.seed);
            let mut white_actor = seat_actor(white, Player::White, &config, &zobrist, &stats, &mut rng);
            let mut black_actor = seat_actor(black, Player::Black, &config, &zobrist, &stats, &mut rng);
            play(&config, white_actor.as_mut(), black_actor.as_mut(), mode)?;
        }
        Command::Human { side, ref load_id } => {
            let human_side = Player::from(side);
            let (zobrist, stats) = load_stats(&config, load_id.as_deref())?;
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.seed);
            let mut human: Box<dyn Actor> = Box::new(HumanActor::new(human_side, LineInput::stdio()));
            let mut engine = seat_actor(Seat::Mcts, human_side.opponent(), &config, &zobrist, &stats, &mut rng);
            match human_side {
                Player::White => play(&config, human.as_mut(), engine.as_mut(), mode)?,
                Player::Black => play(&config, engine.as_mut(), human.as_mut(), mode)?,
            }
        }
        Command::Evaluate { ref load_id, .. } => {
            let (zobrist, stats) = load_stats(&config, load_id.as_deref())?;
            let snapshot = stats.lock().clone();
            let summary = evaluate(&config, zobrist, &snapshot)?;
            println!(
                "MCTS won {}/{} ({:.1}%), random won {}, {} stalemates",
                summary.mcts_wins,
                summary.games,
                summary.win_rate() * 100.0,
                summary.random_wins,
                summary.stalemates
            );
        }
    }
    Ok(())
}

/// Folds command-line flags over the loaded configuration.
fn apply_overrides(config: &mut ArenaConfig, args: &Args) {
    if let Some(size) = args.board_size {
        config.board_size = size;
    }
    if let Some(n) = args.simulations {
        config.mcts.simulations = n;
    }
    if let Some(c) = args.exploration {
        config.mcts.exploration = c;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(seed) = args.zobrist_seed {
        config.zobrist_seed = seed;
    }
    if let Some(dir) = &args.stats_dir {
        config.training.stats_dir = dir.clone();
    }

    match &args.command {
        Command::Train {
            games,
            save_id,
            load_id,
            save_every,
            max_rounds,
            ..
        } => {
            if let Some(games) = games {
                config.training.games = *games;
            }
            if let Some(id) = save_id {
                config.training.save_id = id.clone();
            }
            if load_id.is_some() {
                config.training.load_id = load_id.clone();
            }
            if let Some(every) = save_every {
                config.training.save_every = *every;
            }
            if let Some(rounds) = max_rounds {
                config.training.max_rounds = *rounds;
            }
        }
        Command::Match { max_rounds, .. } => {
            if let Some(rounds) = max_rounds {
                config.training.max_rounds = *rounds;
            }
        }
        Command::Evaluate { games, threads, .. } => {
            if let Some(games) = games {
                config.evaluation.games = *games;
            }
            if let Some(threads) = threads {
                config.evaluation.threads = *threads;
            }
        }
        Command::Human { .. } => {}
    }
}

/// Hash table for the configured board, and a store loaded from `load_id` if given.
fn load_stats(config: &ArenaConfig, load_id: Option<&str>) -> Result<(Arc<Zobrist>, SharedStats)> {
    let zobrist = Arc::new(Zobrist::new(config.board_size, config.zobrist_seed));
    let store = match load_id {
        Some(id) => {
            let files = JsonStatsFiles::new(&config.training.stats_dir);
            load_checked(&files, id, config.zobrist_seed)
                .with_context(|| format!("loading statistics '{id}' from {}", files.dir().display()))?
        }
        None => StatsStore::new(),
    };
    info!("starting with {} known positions", store.len());
    Ok((zobrist, store.into_shared()))
}

fn seat_actor(
    seat: Seat,
    player: Player,
    config: &ArenaConfig,
    zobrist: &Arc<Zobrist>,
    stats: &SharedStats,
    rng: &mut Xoshiro256PlusPlus,
) -> Box<dyn Actor> {
    let own = rng.clone();
    rng.jump();
    match seat {
        Seat::Mcts => Box::new(MctsActor::new(MctsEngine::new(
            player,
            config.mcts.clone(),
            Arc::clone(zobrist),
            Arc::clone(stats),
            own,
        ))),
        Seat::Random => Box::new(RandomActor::new(player, own)),
    }
}

fn play(config: &ArenaConfig, white: &mut dyn Actor, black: &mut dyn Actor, mode: DisplayMode) -> Result<()> {
    let board = Board::new(config.board_size)?;
    let mut controller = GameController::new(board, config.training.max_rounds);
    let mut renderer = TerminalRenderer::stdout();
    controller.play_game(white, black, &mut renderer, mode)?;
    print!("\n{}", controller.format_history());
    Ok(())
}
