//! Player character state.
//!
//! IMPORTANT: When adding new fields, use `#[serde(default)]` to maintain
//! backward compatibility with old save files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::meta::MetaProgression;

/// Boolean combat modifiers granted (and revoked) by artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerFlag {
    /// Hits may inflict Shattered (target defense zeroed for the fight).
    ShatterImbue,
    /// Hits may inflict Weakness (target attack reduced).
    WeaknessImbue,
    /// Hits may freeze the target for a few turns.
    IceCharm,
    /// Each attack builds temporary attack before the hit lands.
    BerserkerRage,
    /// Damage is multiplied by a random roll in [0.5, 1.5).
    Fortune,
    /// Damage dampened to 90%, but every hit pays out gold.
    Midas,
    /// Defending grants stacks of Stone Skin.
    StoneIdol,
    /// A one-shot revival is re-armed at each wave boundary.
    Phoenix,
}

/// One shop listing as the player sees it: prices are per-run state and
/// climb with every purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopEntry {
    pub price: u64,
    pub price_increment: u64,
}

/// The run-scoped player: core stats, per-wave transients, permanent
/// modifiers unlocked by artifacts/items, and the owned collections.
///
/// Invariants: `health <= max_health` except transiently between a lethal
/// hit and defeat/revival resolution; an artifact key appears in at most one
/// of `artifacts` / `banished_artifacts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerCharacter {
    pub level: u32,
    pub experience: u64,
    pub gold: u64,
    pub max_health: u32,
    pub health: u32,
    pub attack: u32,
    pub defense: u32,

    // Per-wave transients, reset at every wave boundary.
    #[serde(default)]
    pub temp_attack: u32,
    #[serde(default)]
    pub temp_defense: u32,
    #[serde(default)]
    pub temp_crit_chance: f64,
    #[serde(default)]
    pub stone_skin_stacks: u32,
    #[serde(default)]
    pub used_defend: bool,
    #[serde(default)]
    pub used_bravery: bool,

    // Permanent modifiers.
    pub crit_chance: f64,
    #[serde(default)]
    pub bonus_crit_chance: f64,
    /// Attack multiplier against targets at full health (1.0 = no bonus).
    pub full_health_bonus: f64,
    #[serde(default)]
    pub vampiric_heal: f64,
    #[serde(default)]
    pub wither: f64,
    #[serde(default)]
    pub age: f64,
    #[serde(default)]
    pub mirror_shield_chance: f64,
    pub base_experience_mult: f64,
    /// Extra experience multiplier from artifacts and consumed items.
    #[serde(default)]
    pub bonus_experience: f64,

    #[serde(default)]
    pub shatter_imbue: bool,
    #[serde(default)]
    pub weakness_imbue: bool,
    #[serde(default)]
    pub ice_charm: bool,
    #[serde(default)]
    pub berserker_rage: bool,
    #[serde(default)]
    pub fortune: bool,
    #[serde(default)]
    pub midas: bool,
    #[serde(default)]
    pub stone_idol: bool,
    #[serde(default)]
    pub phoenix: bool,
    /// One-shot revival charge; consumed on defeat, re-armed each wave while
    /// the phoenix artifact is held.
    #[serde(default)]
    pub phoenix_armed: bool,

    /// Owned artifact keys, resolved against the content registry.
    pub artifacts: Vec<String>,
    /// Banished artifact keys; permanently excluded from acquisition.
    pub banished_artifacts: Vec<String>,
    /// Item key -> count.
    pub inventory: BTreeMap<String, u32>,
    /// Item key -> current per-run shop listing.
    pub shop: BTreeMap<String, ShopEntry>,
}

impl PlayerCharacter {
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    /// Heals up to `amount`, capped at max health. Returns the HP actually
    /// restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let healed = amount.min(self.max_health - self.health.min(self.max_health));
        self.health += healed;
        healed
    }

    /// Effective experience multiplier: base + meta bonus + artifact/item
    /// bonus.
    pub fn experience_mult(&self, meta: &MetaProgression) -> f64 {
        self.base_experience_mult + meta.bonus_experience() + self.bonus_experience
    }

    /// Clears everything scoped to a single wave. Called at wave boundaries.
    pub fn reset_wave_transients(&mut self) {
        self.temp_attack = 0;
        self.temp_defense = 0;
        self.temp_crit_chance = 0.0;
        self.stone_skin_stacks = 0;
        self.used_defend = false;
        self.used_bravery = false;
    }

    pub fn has_flag(&self, flag: PlayerFlag) -> bool {
        match flag {
            PlayerFlag::ShatterImbue => self.shatter_imbue,
            PlayerFlag::WeaknessImbue => self.weakness_imbue,
            PlayerFlag::IceCharm => self.ice_charm,
            PlayerFlag::BerserkerRage => self.berserker_rage,
            PlayerFlag::Fortune => self.fortune,
            PlayerFlag::Midas => self.midas,
            PlayerFlag::StoneIdol => self.stone_idol,
            PlayerFlag::Phoenix => self.phoenix,
        }
    }

    pub fn set_flag(&mut self, flag: PlayerFlag, value: bool) {
        match flag {
            PlayerFlag::ShatterImbue => self.shatter_imbue = value,
            PlayerFlag::WeaknessImbue => self.weakness_imbue = value,
            PlayerFlag::IceCharm => self.ice_charm = value,
            PlayerFlag::BerserkerRage => self.berserker_rage = value,
            PlayerFlag::Fortune => self.fortune = value,
            PlayerFlag::Midas => self.midas = value,
            PlayerFlag::StoneIdol => self.stone_idol = value,
            PlayerFlag::Phoenix => self.phoenix = value,
        }
    }

    pub fn owns_artifact(&self, key: &str) -> bool {
        self.artifacts.iter().any(|k| k == key)
    }

    pub fn has_banished(&self, key: &str) -> bool {
        self.banished_artifacts.iter().any(|k| k == key)
    }
}
