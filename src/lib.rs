//! Soulbound - Wave-Survival RPG Engine
//!
//! The combat and progression core of a wave-survival RPG: turn-based
//! fights against escalating enemy rosters, artifact and item effects, a
//! between-wave economy, and a souls-based meta-progression that persists
//! across runs. The engine is frontend-agnostic; all randomness comes in
//! through `&mut impl Rng`, and all state worth keeping serializes through
//! the save manager.

pub mod character;
pub mod combat;
pub mod content;
pub mod core;
pub mod economy;
pub mod error;
pub mod meta;
pub mod save_manager;
pub mod waves;

pub use crate::core::{CombatEngine, GameLog, Phase, RunState};
pub use error::EngineError;
pub use meta::{MetaProgression, MetaUpgrade};
pub use save_manager::{SaveManager, SavePriority, SaveScheduler};
