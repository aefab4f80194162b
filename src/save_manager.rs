//! Checksummed binary persistence for the two save records: the current
//! run and the permanent meta-progression.
//!
//! Record format:
//! - Magic (8 bytes, little endian, distinct per record kind)
//! - Payload length (4 bytes)
//! - Bincode payload, wrapped with a `saved_at` timestamp
//! - SHA256 checksum over everything above (32 bytes)

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::content::ContentRegistry;
use crate::core::constants::{AUTOSAVE_INTERVAL_SECONDS, META_SAVE_MAGIC, RUN_SAVE_MAGIC};
use crate::core::run_state::RunState;
use crate::error::PersistenceError;
use crate::meta::MetaProgression;

#[derive(Serialize, Deserialize)]
struct Record<T> {
    saved_at: DateTime<Utc>,
    payload: T,
}

pub struct SaveManager {
    run_path: PathBuf,
    meta_path: PathBuf,
}

impl SaveManager {
    /// Sets up the save directory at the platform's config location.
    pub fn new() -> Result<Self, PersistenceError> {
        let project_dirs = ProjectDirs::from("", "", "soulbound").ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "could not determine config directory")
        })?;
        Self::with_dir(project_dirs.config_dir())
    }

    /// Uses an explicit directory instead of the platform default.
    pub fn with_dir(dir: &Path) -> Result<Self, PersistenceError> {
        fs::create_dir_all(dir)?;
        Ok(SaveManager {
            run_path: dir.join("run.dat"),
            meta_path: dir.join("souls.dat"),
        })
    }

    pub fn save_run(&self, run: &RunState) -> Result<(), PersistenceError> {
        write_record(&self.run_path, RUN_SAVE_MAGIC, run)
    }

    /// Loads the raw run record. Most callers want [`SaveManager::restore_run`],
    /// which also validates keys against the content registry.
    pub fn load_run(&self) -> Result<(RunState, DateTime<Utc>), PersistenceError> {
        read_record(&self.run_path, RUN_SAVE_MAGIC)
    }

    /// Loads the run and cross-checks every content key it carries, so a
    /// record written against different content tables fails loudly
    /// instead of panicking mid-combat.
    pub fn restore_run(
        &self,
        registry: &ContentRegistry,
    ) -> Result<RunState, PersistenceError> {
        let (mut run, _) = self.load_run()?;

        for key in run.player.artifacts.iter().chain(&run.player.banished_artifacts) {
            if registry.artifact(key).is_none() {
                return Err(PersistenceError::InvalidRecord(format!(
                    "unknown artifact '{key}' in save"
                )));
            }
        }
        for key in run.player.inventory.keys().chain(run.player.shop.keys()) {
            if registry.item(key).is_none() {
                return Err(PersistenceError::InvalidRecord(format!(
                    "unknown item '{key}' in save"
                )));
            }
        }
        for enemy in &run.enemies {
            if registry.archetype(&enemy.archetype).is_none() {
                return Err(PersistenceError::InvalidRecord(format!(
                    "unknown enemy archetype '{}' in save",
                    enemy.archetype
                )));
            }
        }

        run.recompute_phase();
        run.prune_selection();
        Ok(run)
    }

    pub fn save_meta(&self, meta: &MetaProgression) -> Result<(), PersistenceError> {
        write_record(&self.meta_path, META_SAVE_MAGIC, meta)
    }

    pub fn load_meta(&self) -> Result<(MetaProgression, DateTime<Utc>), PersistenceError> {
        read_record(&self.meta_path, META_SAVE_MAGIC)
    }

    pub fn run_save_exists(&self) -> bool {
        self.run_path.exists()
    }

    pub fn meta_save_exists(&self) -> bool {
        self.meta_path.exists()
    }

    /// Removes the run record, as on defeat. The meta record stays.
    pub fn delete_run_save(&self) -> Result<(), PersistenceError> {
        if self.run_path.exists() {
            fs::remove_file(&self.run_path)?;
        }
        Ok(())
    }

    /// Writes a human-readable JSON snapshot next to the binary record,
    /// for inspecting save issues. Never read back by the engine.
    pub fn export_run_json(&self, run: &RunState) -> Result<PathBuf, PersistenceError> {
        let path = self.run_path.with_extension("json");
        let text = serde_json::to_string_pretty(run)
            .map_err(|e| PersistenceError::InvalidRecord(e.to_string()))?;
        fs::write(&path, text)?;
        Ok(path)
    }
}

fn write_record<T: Serialize>(path: &Path, magic: u64, payload: &T) -> Result<(), PersistenceError> {
    let record = Record {
        saved_at: Utc::now(),
        payload,
    };
    let data = bincode::serialize(&record)
        .map_err(|e| PersistenceError::InvalidRecord(e.to_string()))?;
    let data_len = data.len() as u32;

    let mut hasher = Sha256::new();
    hasher.update(magic.to_le_bytes());
    hasher.update(data_len.to_le_bytes());
    hasher.update(&data);
    let checksum = hasher.finalize();

    let mut file = fs::File::create(path)?;
    file.write_all(&magic.to_le_bytes())?;
    file.write_all(&data_len.to_le_bytes())?;
    file.write_all(&data)?;
    file.write_all(&checksum)?;
    Ok(())
}

fn read_record<T: DeserializeOwned>(
    path: &Path,
    magic: u64,
) -> Result<(T, DateTime<Utc>), PersistenceError> {
    let mut file = fs::File::open(path)?;

    let mut magic_bytes = [0u8; 8];
    file.read_exact(&mut magic_bytes)?;
    let found = u64::from_le_bytes(magic_bytes);
    if found != magic {
        return Err(PersistenceError::InvalidRecord(format!(
            "bad magic: expected 0x{magic:016X}, got 0x{found:016X}"
        )));
    }

    let mut length_bytes = [0u8; 4];
    file.read_exact(&mut length_bytes)?;
    let data_len = u32::from_le_bytes(length_bytes);

    let mut data = vec![0u8; data_len as usize];
    file.read_exact(&mut data)?;

    let mut stored_checksum = [0u8; 32];
    file.read_exact(&mut stored_checksum)?;

    let mut hasher = Sha256::new();
    hasher.update(magic_bytes);
    hasher.update(length_bytes);
    hasher.update(&data);
    if stored_checksum != hasher.finalize().as_slice() {
        return Err(PersistenceError::InvalidRecord(
            "checksum verification failed".to_string(),
        ));
    }

    let record: Record<T> = bincode::deserialize(&data)
        .map_err(|e| PersistenceError::InvalidRecord(e.to_string()))?;
    Ok((record.payload, record.saved_at))
}

/// When to persist. A pending request is only replaced by an equal or
/// higher priority, so a routine autosave never clobbers a checkpoint
/// already queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SavePriority {
    /// Periodic background save.
    Auto,
    /// Wave boundary or purchase.
    Checkpoint,
    /// Defeat or shutdown; must not be lost.
    Critical,
}

/// Tracks the autosave clock and the highest-priority save request since
/// the last flush. The caller owns the actual disk writes.
pub struct SaveScheduler {
    last_flush: Instant,
    pending: Option<SavePriority>,
}

impl Default for SaveScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl SaveScheduler {
    pub fn new() -> Self {
        SaveScheduler {
            last_flush: Instant::now(),
            pending: None,
        }
    }

    pub fn request(&mut self, priority: SavePriority) {
        self.pending = Some(match self.pending {
            Some(current) => current.max(priority),
            None => priority,
        });
    }

    pub fn autosave_due(&self) -> bool {
        self.last_flush.elapsed().as_secs() >= AUTOSAVE_INTERVAL_SECONDS
    }

    /// What to flush now: any pending request, or an `Auto` save once the
    /// interval has elapsed. Clears the pending state and resets the clock.
    pub fn take(&mut self) -> Option<SavePriority> {
        let due = match self.pending.take() {
            Some(p) => Some(p),
            None if self.autosave_due() => Some(SavePriority::Auto),
            None => None,
        };
        if due.is_some() {
            self.last_flush = Instant::now();
        }
        due
    }
}
