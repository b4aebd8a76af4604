//! # Training and Evaluation
//!
//! [`Trainer`] runs self-play games between two MCTS actors that share one
//! statistics store, saving the store on a fixed cadence. [`evaluate`] pits a
//! snapshot of a store against the random actor on a rayon pool.

use crate::agents::{MctsActor, RandomActor};
use crate::board::{Board, Player};
use crate::config::ArenaConfig;
use crate::error::{DraughtsError, Result};
use crate::game_controller::{GameController, GameStatus};
use crate::mcts::MctsEngine;
use crate::persistence::{load_checked, StatsPersistence};
use crate::render::{DisplayMode, NullRenderer, Renderer};
use crate::stats::{SharedStats, StatsStore};
use crate::zobrist::Zobrist;
use log::{debug, info};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::sync::Arc;
use std::time::Instant;

/// Tally of finished self-play games.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrainingSummary {
    pub games: u32,
    pub white_wins: u32,
    pub black_wins: u32,
    pub stalemates: u32,
    /// Store size after the last game.
    pub positions: usize,
    pub saves: u32,
}

impl TrainingSummary {
    fn record(&mut self, status: GameStatus) {
        self.games += 1;
        match status {
            GameStatus::Win(Player::White) => self.white_wins += 1,
            GameStatus::Win(Player::Black) => self.black_wins += 1,
            _ => self.stalemates += 1,
        }
    }
}

/// Self-play driver.
///
/// Both sides' engines are built on the same [`SharedStats`] and the same
/// hash table, so the store learns from both perspectives at once.
pub struct Trainer<P: StatsPersistence> {
    config: ArenaConfig,
    zobrist: Arc<Zobrist>,
    stats: SharedStats,
    persistence: P,
    rng: Xoshiro256PlusPlus,
}

impl<P: StatsPersistence> Trainer<P> {
    /// Creates a trainer, resuming from `training.load_id` when set.
    ///
    /// # Errors
    /// Invalid configuration, unreadable snapshots, or a snapshot recorded
    /// under a different zobrist seed.
    pub fn new(config: ArenaConfig, persistence: P) -> Result<Self> {
        config.validate()?;
        let store = match &config.training.load_id {
            Some(id) => load_checked(&persistence, id, config.zobrist_seed)?,
            None => StatsStore::new(),
        };
        Ok(Trainer {
            zobrist: Arc::new(Zobrist::new(config.board_size, config.zobrist_seed)),
            stats: store.into_shared(),
            rng: Xoshiro256PlusPlus::seed_from_u64(config.seed),
            persistence,
            config,
        })
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn stats(&self) -> &SharedStats {
        &self.stats
    }

    pub fn zobrist(&self) -> &Arc<Zobrist> {
        &self.zobrist
    }

    /// An MCTS actor for `player` on the shared store, with its own random stream.
    pub fn mcts_actor(&mut self, player: Player) -> MctsActor {
        let rng = self.rng.clone();
        self.rng.jump();
        MctsActor::new(MctsEngine::new(
            player,
            self.config.mcts.clone(),
            Arc::clone(&self.zobrist),
            Arc::clone(&self.stats),
            rng,
        ))
    }

    /// Runs `training.games` headless self-play games.
    pub fn run(&mut self) -> Result<TrainingSummary> {
        self.run_with(&mut NullRenderer, DisplayMode::Off)
    }

    /// Runs `training.games` self-play games, drawing them through `renderer`.
    pub fn run_with(&mut self, renderer: &mut dyn Renderer, mode: DisplayMode) -> Result<TrainingSummary> {
        let games = self.config.training.games;
        let save_every = self.config.training.save_every;
        let mut summary = TrainingSummary::default();

        for game in 1..=games {
            let started = Instant::now();
            let status = self.play_one(renderer, mode)?;
            summary.record(status);
            summary.positions = self.stats.lock().len();
            info!(
                "game {game}/{games}: {} in {:.2?}, store holds {} positions",
                describe(status),
                started.elapsed(),
                summary.positions
            );

            if save_every > 0 && game % save_every == 0 {
                self.save()?;
                summary.saves += 1;
            }
        }
        if save_every > 0 && games % save_every != 0 {
            self.save()?;
            summary.saves += 1;
        }

        info!(
            "training done: {} white wins, {} black wins, {} stalemates",
            summary.white_wins, summary.black_wins, summary.stalemates
        );
        Ok(summary)
    }

    /// Plays one self-play game from the initial position.
    pub fn play_one(&mut self, renderer: &mut dyn Renderer, mode: DisplayMode) -> Result<GameStatus> {
        let mut white = self.mcts_actor(Player::White);
        let mut black = self.mcts_actor(Player::Black);
        let mut controller = GameController::new(Board::new(self.config.board_size)?, self.config.training.max_rounds);
        let status = controller.play_game(&mut white, &mut black, renderer, mode)?;
        debug!("self-play game finished after {} moves", controller.move_count());
        Ok(status)
    }

    /// Writes the shared store under `training.save_id`.
    pub fn save(&self) -> Result<()> {
        let store = self.stats.lock();
        self.persistence
            .save(&store, self.zobrist.seed(), &self.config.training.save_id)
    }
}

fn describe(status: GameStatus) -> String {
    match status {
        GameStatus::Win(p) => format!("{p} wins"),
        GameStatus::Stalemate => "stalemate".to_string(),
        GameStatus::InProgress => "unfinished".to_string(),
    }
}

/// Results of MCTS-vs-random evaluation games.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvaluationSummary {
    pub games: u32,
    pub mcts_wins: u32,
    pub random_wins: u32,
    pub stalemates: u32,
}

impl EvaluationSummary {
    /// Fraction of games the MCTS actor won.
    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.mcts_wins as f64 / self.games as f64
        }
    }
}

/// Plays `evaluation.games` games of MCTS against the random actor in parallel.
///
/// The MCTS actor takes White in even-numbered games and Black in odd ones.
/// Every game searches on its own clone of `store`, so games stay
/// independent and `store` is left untouched.
///
/// # Arguments
/// * `config` - Board, search and evaluation settings
/// * `zobrist` - Table `store` was keyed with
/// * `store` - Statistics to start every game from
pub fn evaluate(config: &ArenaConfig, zobrist: Arc<Zobrist>, store: &StatsStore) -> Result<EvaluationSummary> {
    config.validate()?;
    if zobrist.size() != config.board_size {
        return Err(DraughtsError::InvalidConfig(format!(
            "zobrist table is for a {0}x{0} board, config has {1}x{1}",
            zobrist.size(),
            config.board_size
        )));
    }
    let threads = match config.evaluation.threads {
        0 => num_cpus::get(),
        n => n,
    };
    let pool = ThreadPoolBuilder::new().num_threads(threads).build()?;
    info!("evaluating {} games on {threads} threads", config.evaluation.games);

    let results: Vec<(Player, GameStatus)> = pool.install(|| {
        (0..config.evaluation.games)
            .into_par_iter()
            .map(|game| evaluation_game(config, &zobrist, store, game))
            .collect::<Result<Vec<_>>>()
    })?;

    let mut summary = EvaluationSummary::default();
    for (mcts_side, status) in results {
        summary.games += 1;
        match status {
            GameStatus::Win(p) if p == mcts_side => summary.mcts_wins += 1,
            GameStatus::Win(_) => summary.random_wins += 1,
            _ => summary.stalemates += 1,
        }
    }
    info!(
        "evaluation: {} MCTS wins, {} random wins, {} stalemates",
        summary.mcts_wins, summary.random_wins, summary.stalemates
    );
    Ok(summary)
}

fn evaluation_game(
    config: &ArenaConfig,
    zobrist: &Arc<Zobrist>,
    store: &StatsStore,
    game: u32,
) -> Result<(Player, GameStatus)> {
    let mcts_side = if game % 2 == 0 { Player::White } else { Player::Black };
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.seed.wrapping_add(game as u64));
    let engine = MctsEngine::new(
        mcts_side,
        config.mcts.clone(),
        Arc::clone(zobrist),
        store.clone().into_shared(),
        rng.clone(),
    );
    rng.jump();
    let mut mcts = MctsActor::new(engine);
    let mut random = RandomActor::new(mcts_side.opponent(), rng);

    let mut controller = GameController::new(Board::new(config.board_size)?, config.training.max_rounds);
    let status = match mcts_side {
        Player::White => controller.play_game(&mut mcts, &mut random, &mut NullRenderer, DisplayMode::Off)?,
        Player::Black => controller.play_game(&mut random, &mut mcts, &mut NullRenderer, DisplayMode::Off)?,
    };
    debug!("evaluation game {game}: MCTS as {mcts_side}, {}", describe(status));
    Ok((mcts_side, status))
}
