//! Enemy types and the enemy factory.

pub mod types;

pub use types::{create_enemy, EnemyArchetype, EnemyInstance, SpecialAttack};
