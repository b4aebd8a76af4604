//! # Statistics Persistence
//!
//! Saves and restores a [`StatsStore`] between runs. [`JsonStatsFiles`] writes
//! two JSON documents per save id, `plays{id}.json` (visit counts) and
//! `values{id}.json` (value estimates), each tagged with the zobrist seed the
//! hashes were computed under.

use crate::error::{DraughtsError, Result};
use crate::stats::StatsStore;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Storage for statistics snapshots.
pub trait StatsPersistence {
    /// Writes `store`, recorded under `zobrist_seed`, as snapshot `id`.
    fn save(&self, store: &StatsStore, zobrist_seed: u64, id: &str) -> Result<()>;

    /// Reads snapshot `id`, returning the store and the seed it was recorded with.
    fn load(&self, id: &str) -> Result<(StatsStore, u64)>;
}

#[derive(Serialize, Deserialize)]
struct Table<T> {
    zobrist_seed: u64,
    entries: HashMap<u64, T>,
}

/// Snapshots as JSON files in one directory.
#[derive(Clone, Debug)]
pub struct JsonStatsFiles {
    dir: PathBuf,
}

impl JsonStatsFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonStatsFiles { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn plays_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("plays{id}.json"))
    }

    pub fn values_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("values{id}.json"))
    }

    fn write_table<T: Serialize>(path: &Path, table: &Table<T>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, table)?;
        writer.flush()?;
        Ok(())
    }

    fn read_table<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Table<T>> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl StatsPersistence for JsonStatsFiles {
    fn save(&self, store: &StatsStore, zobrist_seed: u64, id: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Self::write_table(
            &self.plays_path(id),
            &Table {
                zobrist_seed,
                entries: store.plays(),
            },
        )?;
        Self::write_table(
            &self.values_path(id),
            &Table {
                zobrist_seed,
                entries: store.values(),
            },
        )?;
        info!("saved {} positions to {} as '{id}'", store.len(), self.dir.display());
        Ok(())
    }

    fn load(&self, id: &str) -> Result<(StatsStore, u64)> {
        let plays: Table<u32> = Self::read_table(&self.plays_path(id))?;
        let values: Table<f64> = Self::read_table(&self.values_path(id))?;
        if plays.zobrist_seed != values.zobrist_seed {
            return Err(DraughtsError::SeedMismatch {
                expected: plays.zobrist_seed,
                found: values.zobrist_seed,
            });
        }
        let store = StatsStore::from_parts(plays.entries, values.entries);
        info!("loaded {} positions from {} as '{id}'", store.len(), self.dir.display());
        Ok((store, plays.zobrist_seed))
    }
}

/// Loads snapshot `id` and checks it was recorded under `zobrist_seed`.
pub fn load_checked<P: StatsPersistence + ?Sized>(persistence: &P, id: &str, zobrist_seed: u64) -> Result<StatsStore> {
    let (store, found) = persistence.load(id)?;
    if found != zobrist_seed {
        return Err(DraughtsError::SeedMismatch {
            expected: zobrist_seed,
            found,
        });
    }
    Ok(store)
}
