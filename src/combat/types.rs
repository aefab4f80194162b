//! Enemy archetypes, live enemy instances, and the enemy factory.

use serde::{Deserialize, Serialize};

use crate::content::ContentRegistry;
use crate::error::ConfigError;

/// Occasional stronger strike carried by some archetypes: on `chance`, the
/// retaliation uses `round(attack * damage_mult)` instead of plain attack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialAttack {
    pub name: String,
    pub chance: f64,
    pub damage_mult: f64,
}

/// Immutable template for an enemy category. Base stats are scaled by the
/// run's difficulty multiplier when an instance is created.
#[derive(Debug, Clone)]
pub struct EnemyArchetype {
    pub key: String,
    pub name: String,
    pub max_health: u32,
    pub health: u32,
    pub attack: u32,
    pub defense: u32,
    pub experience: u32,
    /// Gold reward. Deliberately not scaled by difficulty.
    pub gold: u64,
    pub special: Option<SpecialAttack>,
}

/// A live enemy in the current wave. Created by [`create_enemy`], mutated
/// only during combat resolution, removed from the roster at 0 health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyInstance {
    pub archetype: String,
    /// Display label; carries a letter suffix when the wave holds duplicates.
    pub label: String,
    pub max_health: u32,
    pub health: u32,
    pub attack: u32,
    pub defense: u32,
    pub experience: u32,
    pub gold: u64,
    #[serde(default)]
    pub special: Option<SpecialAttack>,

    /// Reset to 0 at the start of this enemy's own turn.
    #[serde(default)]
    pub temp_defense: u32,
    #[serde(default)]
    pub shattered: bool,
    #[serde(default)]
    pub weakness: bool,
    /// Turns left frozen; a frozen enemy skips its action.
    #[serde(default)]
    pub frozen_counter: u32,
}

impl EnemyInstance {
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    pub fn at_full_health(&self) -> bool {
        self.health == self.max_health
    }
}

/// Scales `base` by the difficulty multiplier, rounding each stat
/// independently (not rounded-then-multiplied).
fn scale(base: u32, stat_mod: f64) -> u32 {
    (base as f64 * stat_mod).round() as u32
}

/// Builds a combat-ready enemy from an archetype and the run's current
/// difficulty multiplier. Unknown keys fail so the caller can abort wave
/// generation instead of pushing a malformed entry.
pub fn create_enemy(
    registry: &ContentRegistry,
    archetype_key: &str,
    label: String,
    stat_mod: f64,
) -> Result<EnemyInstance, ConfigError> {
    let base = registry
        .archetype(archetype_key)
        .ok_or_else(|| ConfigError::UnknownArchetype(archetype_key.to_string()))?;

    Ok(EnemyInstance {
        archetype: base.key.clone(),
        label,
        max_health: scale(base.max_health, stat_mod),
        health: scale(base.health, stat_mod),
        attack: scale(base.attack, stat_mod),
        defense: scale(base.defense, stat_mod),
        experience: scale(base.experience, stat_mod),
        gold: base.gold,
        special: base.special.clone(),
        temp_defense: 0,
        shattered: false,
        weakness: false,
        frozen_counter: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_enemy_scales_each_field_independently() {
        let registry = ContentRegistry::builtin();
        let base = registry.archetype("wolf").unwrap().clone();

        let enemy = create_enemy(&registry, "wolf", "Wolf".to_string(), 1.03).unwrap();

        assert_eq!(enemy.max_health, (base.max_health as f64 * 1.03).round() as u32);
        assert_eq!(enemy.attack, (base.attack as f64 * 1.03).round() as u32);
        assert_eq!(enemy.defense, (base.defense as f64 * 1.03).round() as u32);
        assert_eq!(enemy.experience, (base.experience as f64 * 1.03).round() as u32);
        // Gold is never scaled.
        assert_eq!(enemy.gold, base.gold);
    }

    #[test]
    fn test_per_field_rounding() {
        // Base attack 10 at 1.03 rounds back down to 10.
        let registry = ContentRegistry::builtin();
        let enemy = create_enemy(&registry, "wolf", "Wolf".to_string(), 1.03).unwrap();
        let base = registry.archetype("wolf").unwrap();
        assert_eq!(base.attack, 10);
        assert_eq!(enemy.attack, 10);
    }

    #[test]
    fn test_create_enemy_zeroes_combat_state() {
        let registry = ContentRegistry::builtin();
        let enemy = create_enemy(&registry, "slime", "Slime".to_string(), 1.0).unwrap();
        assert_eq!(enemy.temp_defense, 0);
        assert!(!enemy.shattered);
        assert!(!enemy.weakness);
        assert_eq!(enemy.frozen_counter, 0);
        assert_eq!(enemy.health, enemy.max_health);
    }

    #[test]
    fn test_unknown_archetype_is_an_error() {
        let registry = ContentRegistry::builtin();
        let err = create_enemy(&registry, "gazebo", "Gazebo".to_string(), 1.0).unwrap_err();
        assert_eq!(err, ConfigError::UnknownArchetype("gazebo".to_string()));
    }

    #[test]
    fn test_take_damage_no_underflow() {
        let registry = ContentRegistry::builtin();
        let mut enemy = create_enemy(&registry, "slime", "Slime".to_string(), 1.0).unwrap();
        enemy.take_damage(enemy.max_health + 50);
        assert_eq!(enemy.health, 0);
        assert!(!enemy.is_alive());
    }
}
