//! Engine core: the turn machine, combat arithmetic, and run state.

pub mod combat_math;
pub mod constants;
pub mod engine;
pub mod run_state;

pub use engine::CombatEngine;
pub use run_state::{GameLog, Phase, RunState};
