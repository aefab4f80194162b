//! The between-waves economy: shop purchases, item use, and artifact
//! management. Phase gating lives in the engine; these functions assume
//! they are legal to run and only validate resources and keys.

use crate::character::{PlayerCharacter, ShopEntry};
use crate::content::{effects, ContentRegistry};
use crate::core::run_state::GameLog;
use crate::error::{ActionError, ConfigError, EngineError, ResourceError};
use crate::meta::MetaProgression;

/// Builds a level-1 player from the content defaults plus the permanent
/// meta bonuses, with the shop priced at its base listings.
pub fn fresh_player(registry: &ContentRegistry, meta: &MetaProgression) -> PlayerCharacter {
    let defaults = registry.player_defaults();
    let max_health = defaults.max_health + meta.bonus_health();

    let shop = registry
        .items()
        .map(|item| {
            (
                item.key.clone(),
                ShopEntry {
                    price: item.base_price,
                    price_increment: item.price_increment,
                },
            )
        })
        .collect();

    PlayerCharacter {
        level: 1,
        experience: 0,
        gold: defaults.gold,
        max_health,
        health: max_health,
        attack: defaults.attack,
        defense: defaults.defense,
        temp_attack: 0,
        temp_defense: 0,
        temp_crit_chance: 0.0,
        stone_skin_stacks: 0,
        used_defend: false,
        used_bravery: false,
        crit_chance: defaults.crit_chance,
        bonus_crit_chance: 0.0,
        full_health_bonus: defaults.full_health_bonus,
        vampiric_heal: 0.0,
        wither: 0.0,
        age: 0.0,
        mirror_shield_chance: 0.0,
        base_experience_mult: defaults.base_experience_mult,
        bonus_experience: 0.0,
        shatter_imbue: false,
        weakness_imbue: false,
        ice_charm: false,
        berserker_rage: false,
        fortune: false,
        midas: false,
        stone_idol: false,
        phoenix: false,
        phoenix_armed: false,
        artifacts: Vec::new(),
        banished_artifacts: Vec::new(),
        inventory: std::collections::BTreeMap::new(),
        shop,
    }
}

/// Buys one unit of an item. Debits gold, bumps the listing price, and
/// adds the unit to the inventory.
pub fn buy_item(
    player: &mut PlayerCharacter,
    registry: &ContentRegistry,
    key: &str,
    log: &mut GameLog,
) -> Result<(), EngineError> {
    let item = registry
        .item(key)
        .ok_or_else(|| ConfigError::UnknownItem(key.to_string()))?;
    let entry = player
        .shop
        .get(key)
        .cloned()
        .ok_or_else(|| ConfigError::UnknownItem(key.to_string()))?;

    if player.gold < entry.price {
        return Err(ResourceError::Gold {
            need: entry.price,
            have: player.gold,
        }
        .into());
    }

    player.gold -= entry.price;
    *player.inventory.entry(key.to_string()).or_insert(0) += 1;
    if let Some(listing) = player.shop.get_mut(key) {
        listing.price += listing.price_increment;
    }
    log.push(format!("You buy a {} for {} gold.", item.name, entry.price));
    Ok(())
}

/// Consumes one unit from the inventory and applies the item's effects.
pub fn use_item(
    player: &mut PlayerCharacter,
    registry: &ContentRegistry,
    key: &str,
    log: &mut GameLog,
) -> Result<(), EngineError> {
    let item = registry
        .item(key)
        .ok_or_else(|| ConfigError::UnknownItem(key.to_string()))?;

    match player.inventory.get_mut(key) {
        Some(count) if *count > 0 => {
            *count -= 1;
            if *count == 0 {
                player.inventory.remove(key);
            }
        }
        _ => return Err(ResourceError::Inventory(key.to_string()).into()),
    }

    log.push(format!("You use a {}.", item.name));
    effects::apply_all(&item.on_use, player, log);
    Ok(())
}

/// Artifact keys still eligible to drop: not owned, not banished.
pub fn droppable_artifacts<'a>(
    player: &PlayerCharacter,
    registry: &'a ContentRegistry,
) -> Vec<&'a str> {
    registry
        .artifact_keys()
        .filter(|k| !player.owns_artifact(k) && !player.has_banished(k))
        .collect()
}

/// Grants an artifact and applies its acquisition effects. Owned and
/// banished keys are skipped without error so drop resolution stays
/// idempotent.
pub fn acquire_artifact(
    player: &mut PlayerCharacter,
    registry: &ContentRegistry,
    key: &str,
    log: &mut GameLog,
) -> Result<(), EngineError> {
    let artifact = registry
        .artifact(key)
        .ok_or_else(|| ConfigError::UnknownArtifact(key.to_string()))?;

    if player.owns_artifact(key) || player.has_banished(key) {
        return Ok(());
    }

    player.artifacts.push(key.to_string());
    log.push(format!("You obtain an artifact: {}!", artifact.key));
    effects::apply_all(&artifact.on_acquire, player, log);
    Ok(())
}

fn remove_artifact_at(
    player: &mut PlayerCharacter,
    registry: &ContentRegistry,
    slot: usize,
    log: &mut GameLog,
) -> Result<String, EngineError> {
    if slot >= player.artifacts.len() {
        return Err(ActionError::BadArtifactSlot(slot).into());
    }
    let key = player.artifacts.remove(slot);
    let artifact = registry
        .artifact(&key)
        .ok_or_else(|| ConfigError::UnknownArtifact(key.clone()))?;
    effects::apply_all(&artifact.on_remove, player, log);
    Ok(key)
}

/// Drops the artifact in `slot`, reversing its effects. It may drop again
/// later.
pub fn discard_artifact(
    player: &mut PlayerCharacter,
    registry: &ContentRegistry,
    slot: usize,
    log: &mut GameLog,
) -> Result<(), EngineError> {
    let key = remove_artifact_at(player, registry, slot, log)?;
    log.push(format!("You discard the {key}."));
    Ok(())
}

/// Like [`discard_artifact`], but the key is excluded from all future
/// drops this run.
pub fn banish_artifact(
    player: &mut PlayerCharacter,
    registry: &ContentRegistry,
    slot: usize,
    log: &mut GameLog,
) -> Result<(), EngineError> {
    let key = remove_artifact_at(player, registry, slot, log)?;
    log.push(format!("You banish the {key}. It will not return."));
    player.banished_artifacts.push(key);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (PlayerCharacter, ContentRegistry, GameLog) {
        let registry = ContentRegistry::builtin();
        let player = fresh_player(&registry, &MetaProgression::default());
        (player, registry, GameLog::default())
    }

    #[test]
    fn test_fresh_player_uses_defaults() {
        let (player, registry, _) = setup();
        let defaults = registry.player_defaults();
        assert_eq!(player.level, 1);
        assert_eq!(player.max_health, defaults.max_health);
        assert_eq!(player.health, player.max_health);
        assert_eq!(player.gold, defaults.gold);
        assert!(player.shop.contains_key("potion"));
    }

    #[test]
    fn test_fresh_player_applies_meta_bonus_health() {
        let registry = ContentRegistry::builtin();
        let mut meta = MetaProgression::default();
        meta.upgrades.get_mut("bonus_health").unwrap().value = 15.0;

        let player = fresh_player(&registry, &meta);
        assert_eq!(
            player.max_health,
            registry.player_defaults().max_health + 15
        );
        assert_eq!(player.health, player.max_health);
    }

    #[test]
    fn test_buy_item_debits_gold_and_raises_price() {
        let (mut player, registry, mut log) = setup();
        assert_eq!(player.gold, 20);

        buy_item(&mut player, &registry, "potion", &mut log).unwrap();
        assert_eq!(player.gold, 15);
        assert_eq!(player.inventory["potion"], 1);
        assert_eq!(player.shop["potion"].price, 10);

        buy_item(&mut player, &registry, "potion", &mut log).unwrap();
        assert_eq!(player.gold, 5);
        assert_eq!(player.inventory["potion"], 2);
        assert_eq!(player.shop["potion"].price, 15);
    }

    #[test]
    fn test_buy_item_without_gold_is_rejected() {
        let (mut player, registry, mut log) = setup();
        player.gold = 2;
        let err = buy_item(&mut player, &registry, "potion", &mut log).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Insufficient(ResourceError::Gold { need: 5, have: 2 })
        ));
        assert_eq!(player.gold, 2);
        assert!(player.inventory.is_empty());
    }

    #[test]
    fn test_use_item_heals_and_consumes() {
        let (mut player, registry, mut log) = setup();
        player.inventory.insert("potion".to_string(), 1);
        player.health = 10;

        use_item(&mut player, &registry, "potion", &mut log).unwrap();

        // The potion restores half of max health.
        assert_eq!(player.health, 10 + player.max_health / 2);
        assert!(!player.inventory.contains_key("potion"));
    }

    #[test]
    fn test_use_item_empty_inventory() {
        let (mut player, registry, mut log) = setup();
        let err = use_item(&mut player, &registry, "potion", &mut log).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Insufficient(ResourceError::Inventory(_))
        ));
    }

    #[test]
    fn test_acquire_artifact_applies_effects() {
        let (mut player, registry, mut log) = setup();
        acquire_artifact(&mut player, &registry, "midas_gauntlet", &mut log).unwrap();
        assert!(player.owns_artifact("midas_gauntlet"));
        assert!(player.midas);
    }

    #[test]
    fn test_discard_reverses_effects() {
        let (mut player, registry, mut log) = setup();
        acquire_artifact(&mut player, &registry, "midas_gauntlet", &mut log).unwrap();
        discard_artifact(&mut player, &registry, 0, &mut log).unwrap();
        assert!(!player.owns_artifact("midas_gauntlet"));
        assert!(!player.midas);
        // Discarded artifacts stay in the drop pool.
        assert!(droppable_artifacts(&player, &registry).contains(&"midas_gauntlet"));
    }

    #[test]
    fn test_banish_excludes_from_drop_pool() {
        let (mut player, registry, mut log) = setup();
        acquire_artifact(&mut player, &registry, "vampiric_amulet", &mut log).unwrap();
        banish_artifact(&mut player, &registry, 0, &mut log).unwrap();
        assert!(!player.owns_artifact("vampiric_amulet"));
        assert!(player.has_banished("vampiric_amulet"));
        assert!(!droppable_artifacts(&player, &registry).contains(&"vampiric_amulet"));
        // Re-acquisition is a silent no-op.
        acquire_artifact(&mut player, &registry, "vampiric_amulet", &mut log).unwrap();
        assert!(!player.owns_artifact("vampiric_amulet"));
    }

    #[test]
    fn test_bad_artifact_slot() {
        let (mut player, registry, mut log) = setup();
        let err = discard_artifact(&mut player, &registry, 3, &mut log).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidAction(ActionError::BadArtifactSlot(3))
        ));
    }
}
