//! Runtime configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes. Files are TOML:
//!
//! ```toml
//! board_size = 8
//! seed = 42
//!
//! [mcts]
//! simulations = 200
//!
//! [training]
//! games = 50
//! save_id = "run1"
//! ```

use crate::error::{DraughtsError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Search parameters for one MCTS agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    /// Simulations run per real decision.
    pub simulations: u32,
    /// UCB1 exploration constant.
    pub exploration: f64,
    /// Plies after which a simulation is declared a stalemate.
    pub max_moves: u32,
    /// A simulation is a stalemate once fewer pieces than this remain.
    pub min_pieces: usize,
}

impl Default for MctsConfig {
    fn default() -> Self {
        MctsConfig {
            simulations: 100,
            exploration: 1.5,
            max_moves: 200,
            min_pieces: 3,
        }
    }
}

/// Self-play training loop settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub games: u32,
    /// Full rounds (one White and one Black move) before a game is a
    /// stalemate; 0 plays until a side cannot move.
    pub max_rounds: u32,
    /// Persist statistics after every this many games; 0 disables saving.
    pub save_every: u32,
    pub stats_dir: PathBuf,
    pub save_id: String,
    /// Statistics to resume from, if any.
    pub load_id: Option<String>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            games: 10,
            max_rounds: 100,
            save_every: 1,
            stats_dir: PathBuf::from("values"),
            save_id: "default".to_string(),
            load_id: None,
        }
    }
}

/// Settings for evaluation matches against the random actor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub games: u32,
    /// Worker threads; 0 uses one per CPU.
    pub threads: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        EvaluationConfig { games: 20, threads: 0 }
    }
}

/// Top-level configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub board_size: usize,
    /// Seed for move and simulation randomness.
    pub seed: u64,
    /// Seed for the position hash table. Statistics are only reusable under
    /// the seed they were recorded with.
    pub zobrist_seed: u64,
    pub mcts: MctsConfig,
    pub training: TrainingConfig,
    pub evaluation: EvaluationConfig,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        ArenaConfig {
            board_size: 8,
            seed: 0x5eed,
            zobrist_seed: 0x2b0b_157a,
            mcts: MctsConfig::default(),
            training: TrainingConfig::default(),
            evaluation: EvaluationConfig::default(),
        }
    }
}

impl ArenaConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ArenaConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.board_size < 4 || self.board_size % 2 != 0 {
            return Err(DraughtsError::InvalidBoardSize(self.board_size));
        }
        if self.mcts.simulations == 0 {
            return Err(DraughtsError::InvalidConfig(
                "mcts.simulations must be at least 1".to_string(),
            ));
        }
        if !self.mcts.exploration.is_finite() || self.mcts.exploration < 0.0 {
            return Err(DraughtsError::InvalidConfig(format!(
                "mcts.exploration must be a non-negative number, got {}",
                self.mcts.exploration
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ArenaConfig::default();
        assert_eq!(config.mcts.simulations, 100);
        assert_eq!(config.mcts.exploration, 1.5);
        assert_eq!(config.mcts.max_moves, 200);
        assert_eq!(config.mcts.min_pieces, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = ArenaConfig::from_toml_str(
            "board_size = 6\n[mcts]\nsimulations = 12\n[training]\nload_id = \"old\"\n",
        )
        .unwrap();
        assert_eq!(config.board_size, 6);
        assert_eq!(config.mcts.simulations, 12);
        assert_eq!(config.mcts.exploration, 1.5);
        assert_eq!(config.training.load_id.as_deref(), Some("old"));
        assert_eq!(config.training.max_rounds, 100);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            ArenaConfig::from_toml_str("board_size = 5"),
            Err(DraughtsError::InvalidBoardSize(5))
        ));
        assert!(matches!(
            ArenaConfig::from_toml_str("[mcts]\nsimulations = 0"),
            Err(DraughtsError::InvalidConfig(_))
        ));
        assert!(matches!(
            ArenaConfig::from_toml_str("board_size = \"big\""),
            Err(DraughtsError::Config(_))
        ));
    }

    #[test]
    fn test_zero_max_rounds_is_uncapped() {
        let config = ArenaConfig::from_toml_str("[training]\nmax_rounds = 0\n").unwrap();
        assert_eq!(config.training.max_rounds, 0);
        assert!(config.validate().is_ok());
    }
}
