//! Effect opcodes.
//!
//! Artifact and item effects arrive in content tables as data, never as
//! executable script. Each effect is one opcode from this closed set,
//! interpreted against the player and the narration log, the only
//! capabilities effects get.

use serde::{Deserialize, Serialize};

use crate::character::player::{PlayerCharacter, PlayerFlag};
use crate::core::run_state::GameLog;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Restore a flat amount of health, capped at max health.
    Heal(u32),
    /// Restore a fraction of max health, capped at max health.
    HealFraction(f64),
    AddMaxHealth(i32),
    AddAttack(i32),
    AddDefense(i32),
    AddCritChance(f64),
    /// Crit chance granted on top of Bravery, not passively.
    AddBonusCritChance(f64),
    AddExperienceBonus(f64),
    AddVampiricHeal(f64),
    AddWither(f64),
    AddAge(f64),
    AddMirrorShield(f64),
    SetFullHealthBonus(f64),
    Grant(PlayerFlag),
    Revoke(PlayerFlag),
    ArmRevival,
    DisarmRevival,
}

fn add_u32(value: u32, delta: i32) -> u32 {
    (value as i64 + delta as i64).max(0) as u32
}

impl Effect {
    pub fn apply(&self, player: &mut PlayerCharacter, log: &mut GameLog) {
        match *self {
            Effect::Heal(amount) => {
                let healed = player.heal(amount);
                log.push(format!("You recover {healed} HP."));
            }
            Effect::HealFraction(fraction) => {
                let amount = (player.max_health as f64 * fraction).round() as u32;
                let healed = player.heal(amount);
                log.push(format!("You recover {healed} HP."));
            }
            Effect::AddMaxHealth(delta) => {
                player.max_health = add_u32(player.max_health, delta).max(1);
                player.health = player.health.min(player.max_health);
                if delta > 0 {
                    player.health = add_u32(player.health, delta);
                }
            }
            Effect::AddAttack(delta) => player.attack = add_u32(player.attack, delta),
            Effect::AddDefense(delta) => player.defense = add_u32(player.defense, delta),
            Effect::AddCritChance(delta) => {
                player.crit_chance = (player.crit_chance + delta).max(0.0)
            }
            Effect::AddBonusCritChance(delta) => {
                player.bonus_crit_chance = (player.bonus_crit_chance + delta).max(0.0)
            }
            Effect::AddExperienceBonus(delta) => {
                player.bonus_experience = (player.bonus_experience + delta).max(0.0)
            }
            Effect::AddVampiricHeal(delta) => {
                player.vampiric_heal = (player.vampiric_heal + delta).max(0.0)
            }
            Effect::AddWither(delta) => player.wither = (player.wither + delta).max(0.0),
            Effect::AddAge(delta) => player.age = (player.age + delta).max(0.0),
            Effect::AddMirrorShield(delta) => {
                player.mirror_shield_chance = (player.mirror_shield_chance + delta).max(0.0)
            }
            Effect::SetFullHealthBonus(value) => player.full_health_bonus = value,
            Effect::Grant(flag) => player.set_flag(flag, true),
            Effect::Revoke(flag) => player.set_flag(flag, false),
            Effect::ArmRevival => player.phoenix_armed = true,
            Effect::DisarmRevival => player.phoenix_armed = false,
        }
    }
}

/// Applies a whole effect list in order.
pub fn apply_all(effects: &[Effect], player: &mut PlayerCharacter, log: &mut GameLog) {
    for effect in effects {
        effect.apply(player, log);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentRegistry;
    use crate::economy::fresh_player;
    use crate::meta::MetaProgression;

    fn test_player() -> PlayerCharacter {
        let registry = ContentRegistry::builtin();
        fresh_player(&registry, &MetaProgression::default())
    }

    #[test]
    fn test_heal_fraction_rounds_and_caps() {
        let mut player = test_player();
        let mut log = GameLog::default();
        player.health = 1;

        Effect::HealFraction(0.5).apply(&mut player, &mut log);

        let expected = 1 + (player.max_health as f64 * 0.5).round() as u32;
        assert_eq!(player.health, expected.min(player.max_health));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_grant_and_revoke_round_trip() {
        let mut player = test_player();
        let mut log = GameLog::default();

        Effect::Grant(PlayerFlag::IceCharm).apply(&mut player, &mut log);
        assert!(player.ice_charm);
        Effect::Revoke(PlayerFlag::IceCharm).apply(&mut player, &mut log);
        assert!(!player.ice_charm);
    }

    #[test]
    fn test_add_attack_never_goes_negative() {
        let mut player = test_player();
        let mut log = GameLog::default();

        Effect::AddAttack(-(player.attack as i32) - 10).apply(&mut player, &mut log);
        assert_eq!(player.attack, 0);
    }

    #[test]
    fn test_add_max_health_grows_current_health_too() {
        let mut player = test_player();
        let mut log = GameLog::default();
        let (hp, max) = (player.health, player.max_health);

        Effect::AddMaxHealth(10).apply(&mut player, &mut log);
        assert_eq!(player.max_health, max + 10);
        assert_eq!(player.health, hp + 10);
    }

    #[test]
    fn test_apply_all_runs_in_order() {
        let mut player = test_player();
        let mut log = GameLog::default();

        apply_all(
            &[Effect::Grant(PlayerFlag::Phoenix), Effect::ArmRevival],
            &mut player,
            &mut log,
        );
        assert!(player.phoenix);
        assert!(player.phoenix_armed);
    }
}
