//! Built-in content tables.
//!
//! These mirror the external JSON content definitions; the effect columns
//! are expressed directly as [`Effect`] opcodes.

use std::collections::BTreeMap;

use crate::character::player::PlayerFlag;
use crate::combat::types::{EnemyArchetype, SpecialAttack};
use crate::content::{Area, Artifact, Effect, Item, PlayerDefaults};
use crate::meta::{MetaProgression, MetaUpgrade};

fn archetype(
    key: &str,
    name: &str,
    max_health: u32,
    attack: u32,
    defense: u32,
    experience: u32,
    gold: u64,
    special: Option<SpecialAttack>,
) -> EnemyArchetype {
    EnemyArchetype {
        key: key.to_string(),
        name: name.to_string(),
        max_health,
        health: max_health,
        attack,
        defense,
        experience,
        gold,
        special,
    }
}

fn special(name: &str, chance: f64, damage_mult: f64) -> Option<SpecialAttack> {
    Some(SpecialAttack {
        name: name.to_string(),
        chance,
        damage_mult,
    })
}

pub fn builtin_archetypes() -> Vec<EnemyArchetype> {
    vec![
        archetype("slime", "Slime", 10, 3, 1, 5, 2, None),
        archetype("boar", "Boar", 14, 4, 0, 6, 3, None),
        archetype("wasp", "Wasp", 8, 5, 0, 5, 2, None),
        archetype("bandit", "Bandit", 12, 4, 2, 7, 5, None),
        archetype("wolf", "Wolf", 18, 10, 2, 10, 5, None),
        archetype(
            "spider",
            "Giant Spider",
            16,
            6,
            3,
            9,
            4,
            special("Venomous Bite", 0.2, 1.5),
        ),
        archetype("ghoul", "Ghoul", 22, 8, 4, 12, 6, None),
        archetype(
            "witch",
            "Bog Witch",
            20,
            10,
            2,
            14,
            8,
            special("Hex Bolt", 0.25, 1.6),
        ),
        archetype("skeleton", "Skeleton", 26, 9, 6, 14, 6, None),
        archetype("knight", "Hollow Knight", 30, 10, 10, 18, 10, None),
        archetype(
            "warlock",
            "Warlock",
            28,
            14,
            6,
            20,
            12,
            special("Soul Blast", 0.2, 1.8),
        ),
        archetype("imp", "Imp", 20, 12, 4, 12, 8, None),
        archetype(
            "drake",
            "Ember Drake",
            40,
            18,
            10,
            28,
            16,
            special("Fire Breath", 0.3, 1.7),
        ),
        archetype(
            "ogre",
            "Ogre Warchief",
            60,
            16,
            8,
            40,
            25,
            special("Crushing Blow", 0.25, 1.5),
        ),
        archetype("elder_treant", "Elder Treant", 80, 14, 12, 60, 40, None),
        archetype(
            "bone_colossus",
            "Bone Colossus",
            120,
            18,
            16,
            90,
            60,
            special("Gravequake", 0.25, 1.6),
        ),
    ]
}

fn item(key: &str, name: &str, base_price: u64, price_increment: u64, on_use: Vec<Effect>) -> Item {
    Item {
        key: key.to_string(),
        name: name.to_string(),
        base_price,
        price_increment,
        on_use,
    }
}

pub fn builtin_items() -> Vec<Item> {
    vec![
        item("potion", "Potion", 5, 5, vec![Effect::HealFraction(0.5)]),
        item("whetstone", "Whetstone", 50, 10, vec![Effect::AddAttack(2)]),
        item(
            "shred_of_wisdom",
            "Shred of Wisdom",
            50,
            25,
            vec![Effect::AddExperienceBonus(0.1)],
        ),
        item("tank_brew", "Tank Brew", 40, 10, vec![Effect::AddDefense(2)]),
    ]
}

fn artifact(key: &str, description: &str, on_acquire: Vec<Effect>, on_remove: Vec<Effect>) -> Artifact {
    Artifact {
        key: key.to_string(),
        description: description.to_string(),
        on_acquire,
        on_remove,
    }
}

pub fn builtin_artifacts() -> Vec<Artifact> {
    vec![
        artifact(
            "shatter_imbue",
            "Your hits have a chance to inflict /Shattered/.",
            vec![Effect::Grant(PlayerFlag::ShatterImbue)],
            vec![Effect::Revoke(PlayerFlag::ShatterImbue)],
        ),
        artifact(
            "weakness_imbue",
            "Your hits have a chance to inflict /Weakness/.",
            vec![Effect::Grant(PlayerFlag::WeaknessImbue)],
            vec![Effect::Revoke(PlayerFlag::WeaknessImbue)],
        ),
        artifact(
            "ice_charm",
            "Your hits have a chance to leave the target /Frozen/.",
            vec![Effect::Grant(PlayerFlag::IceCharm)],
            vec![Effect::Revoke(PlayerFlag::IceCharm)],
        ),
        artifact(
            "berserkers_rage",
            "Every swing stokes your fury, building attack for the wave.",
            vec![Effect::Grant(PlayerFlag::BerserkerRage)],
            vec![Effect::Revoke(PlayerFlag::BerserkerRage)],
        ),
        artifact(
            "ambush_cloak",
            "Strike unsuspecting foes at full health for 150% attack.",
            vec![Effect::SetFullHealthBonus(1.5)],
            vec![Effect::SetFullHealthBonus(1.0)],
        ),
        artifact(
            "dice_of_fate",
            "Your damage swings wildly between half and one-and-a-half.",
            vec![Effect::Grant(PlayerFlag::Fortune)],
            vec![Effect::Revoke(PlayerFlag::Fortune)],
        ),
        artifact(
            "midas_gauntlet",
            "Your blows land softer but shake gold loose with every hit.",
            vec![Effect::Grant(PlayerFlag::Midas)],
            vec![Effect::Revoke(PlayerFlag::Midas)],
        ),
        artifact(
            "vampiric_amulet",
            "Heal for a tenth of the damage you deal.",
            vec![Effect::AddVampiricHeal(0.1)],
            vec![Effect::AddVampiricHeal(-0.1)],
        ),
        artifact(
            "withering_brand",
            "Enemies rot for 5% of their max health on their turn.",
            vec![Effect::AddWither(0.05)],
            vec![Effect::AddWither(-0.05)],
        ),
        artifact(
            "hourglass_of_decay",
            "Enemies age on their turn, slowly losing attack and defense.",
            vec![Effect::AddAge(0.05)],
            vec![Effect::AddAge(-0.05)],
        ),
        artifact(
            "mirror_shield",
            "A quarter of incoming blows reflect back at the attacker.",
            vec![Effect::AddMirrorShield(0.25)],
            vec![Effect::AddMirrorShield(-0.25)],
        ),
        artifact(
            "phoenix_feather",
            "Once per wave, return from death with 1 HP.",
            vec![Effect::Grant(PlayerFlag::Phoenix), Effect::ArmRevival],
            vec![Effect::Revoke(PlayerFlag::Phoenix), Effect::DisarmRevival],
        ),
        artifact(
            "stone_idol",
            "Defending grants 6 stacks of /Stone Skin/.",
            vec![Effect::Grant(PlayerFlag::StoneIdol)],
            vec![Effect::Revoke(PlayerFlag::StoneIdol)],
        ),
        artifact(
            "lucky_clover",
            "Bravery sharpens your eye, adding 15% crit chance.",
            vec![Effect::AddBonusCritChance(0.15)],
            vec![Effect::AddBonusCritChance(-0.15)],
        ),
        artifact(
            "ancient_tome",
            "Gain 25% more experience from every kill.",
            vec![Effect::AddExperienceBonus(0.25)],
            vec![Effect::AddExperienceBonus(-0.25)],
        ),
    ]
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

pub fn builtin_areas() -> Vec<Area> {
    vec![
        Area {
            key: "verdant_fields".to_string(),
            name: "Verdant Fields".to_string(),
            starting_wave: 1,
            ending_wave: Some(11),
            enemies: keys(&["slime", "boar", "wasp", "bandit"]),
            final_wave: Some(keys(&["ogre", "bandit", "bandit"])),
        },
        Area {
            key: "gloom_forest".to_string(),
            name: "Gloom Forest".to_string(),
            starting_wave: 11,
            ending_wave: Some(21),
            enemies: keys(&["wolf", "spider", "ghoul", "witch"]),
            final_wave: Some(keys(&["elder_treant", "wolf", "wolf"])),
        },
        Area {
            key: "ruined_keep".to_string(),
            name: "Ruined Keep".to_string(),
            starting_wave: 21,
            ending_wave: Some(31),
            enemies: keys(&["skeleton", "ghoul", "knight", "warlock"]),
            final_wave: Some(keys(&["bone_colossus", "skeleton", "skeleton", "skeleton"])),
        },
        Area {
            key: "dragons_maw".to_string(),
            name: "Dragon's Maw".to_string(),
            starting_wave: 31,
            ending_wave: None,
            enemies: keys(&["drake", "imp", "knight", "warlock", "ogre"]),
            final_wave: None,
        },
    ]
}

pub fn builtin_glossary() -> BTreeMap<String, String> {
    [
        ("Shattered", "Defense reduced to 0 for the rest of the fight."),
        ("Weakness", "Attack reduced by 20%."),
        ("Frozen", "Skips its turn while frozen."),
        ("Stone Skin", "Each stack absorbs 1 point of incoming damage."),
        ("Souls", "Permanent currency earned from kills; survives new runs."),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

pub fn builtin_player_defaults() -> PlayerDefaults {
    PlayerDefaults {
        max_health: 30,
        attack: 10,
        defense: 5,
        gold: 20,
        crit_chance: 0.05,
        base_experience_mult: 1.0,
        full_health_bonus: 1.0,
    }
}

pub fn builtin_meta_defaults() -> MetaProgression {
    let mut upgrades = BTreeMap::new();
    upgrades.insert(
        "bonus_health".to_string(),
        MetaUpgrade {
            value: 0.0,
            increment: 5.0,
            cap: 50.0,
            price: 10,
        },
    );
    upgrades.insert(
        "bonus_experience".to_string(),
        MetaUpgrade {
            value: 0.0,
            increment: 0.05,
            cap: 0.5,
            price: 15,
        },
    );
    MetaProgression { souls: 0, upgrades }
}
