//! Engine error taxonomy.
//!
//! Every failure falls into one of four classes: configuration problems in
//! the content tables (fatal to the operation that hit them), missing
//! resources, actions that are not legal right now, and persistence
//! failures. All of them leave combat and economy state untouched; the
//! engine narrates each failure into the game log before returning it.

use thiserror::Error;

/// Content-table problems: unknown keys and impossible wave setups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown enemy archetype '{0}'")]
    UnknownArchetype(String),
    #[error("no area covers wave {0}")]
    NoAreaForWave(u32),
    #[error("area '{0}' has an empty enemy pool")]
    EmptyEnemyPool(String),
    #[error("unknown item '{0}'")]
    UnknownItem(String),
    #[error("unknown artifact '{0}'")]
    UnknownArtifact(String),
    #[error("unknown meta upgrade '{0}'")]
    UnknownUpgrade(String),
}

/// The player asked for something they cannot afford.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    #[error("not enough gold (need {need}, have {have})")]
    Gold { need: u64, have: u64 },
    #[error("not enough souls (need {need}, have {have})")]
    Souls { need: u64, have: u64 },
    #[error("no '{0}' left in the inventory")]
    Inventory(String),
    #[error("upgrade '{0}' is already at its cap")]
    UpgradeAtCap(String),
}

/// An action that is not legal in the current turn phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("it is not the player's turn")]
    OutOfTurn,
    #[error("no enemy turn is pending")]
    NoEnemyActing,
    #[error("no target selected")]
    NoTarget,
    #[error("target index {0} is out of range")]
    BadTarget(usize),
    #[error("artifact slot {0} is out of range")]
    BadArtifactSlot(usize),
    #[error("'{0}' was already used this wave")]
    AlreadyUsed(&'static str),
    #[error("the run is over")]
    RunOver,
    #[error("shops and items are only available between waves")]
    NotBetweenWaves,
    #[error("the wave is not cleared yet")]
    WaveNotCleared,
}

/// Saved-record problems. Recoverable by starting a fresh run.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("save record failed validation: {0}")]
    InvalidRecord(String),
}

/// Top-level error surfaced by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
    #[error("{0}")]
    Insufficient(#[from] ResourceError),
    #[error("invalid action: {0}")]
    InvalidAction(#[from] ActionError),
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl EngineError {
    /// True for errors a running game can simply report and carry on from.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, EngineError::Configuration(_))
    }
}
