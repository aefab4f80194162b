//! Content registry: read-only lookup tables the engine consumes by value.
//!
//! The tables mirror the external content definitions (player defaults,
//! artifacts, items, enemy archetypes, areas, glossary, meta defaults). The
//! crate ships a built-in set; a collaborator that loads content from
//! elsewhere can assemble a registry from its own tables, with effect
//! bodies already resolved into [`Effect`] opcodes.

pub mod data;
pub mod effects;

use std::collections::BTreeMap;

use crate::combat::types::EnemyArchetype;
use crate::meta::MetaProgression;
pub use effects::{apply_all, Effect};

/// Permanent player-held modifier with optional acquire/remove effects.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub key: String,
    /// May embed glossary cross references written as `/term/`.
    pub description: String,
    pub on_acquire: Vec<Effect>,
    pub on_remove: Vec<Effect>,
}

/// Consumable shop item.
#[derive(Debug, Clone)]
pub struct Item {
    pub key: String,
    pub name: String,
    pub base_price: u64,
    pub price_increment: u64,
    pub on_use: Vec<Effect>,
}

/// A contiguous wave range with its own enemy pool and an optional scripted
/// final-wave roster.
#[derive(Debug, Clone)]
pub struct Area {
    pub key: String,
    pub name: String,
    pub starting_wave: u32,
    /// Exclusive upper bound; `None` leaves the final area open-ended (and
    /// without a final wave).
    pub ending_wave: Option<u32>,
    pub enemies: Vec<String>,
    pub final_wave: Option<Vec<String>>,
}

impl Area {
    pub fn contains_wave(&self, wave: u32) -> bool {
        wave >= self.starting_wave && self.ending_wave.map_or(true, |end| wave < end)
    }
}

/// Starting stats for a fresh run, before meta bonuses.
#[derive(Debug, Clone)]
pub struct PlayerDefaults {
    pub max_health: u32,
    pub attack: u32,
    pub defense: u32,
    pub gold: u64,
    pub crit_chance: f64,
    pub base_experience_mult: f64,
    pub full_health_bonus: f64,
}

/// All content tables, keyed by string identifiers.
#[derive(Debug, Clone)]
pub struct ContentRegistry {
    archetypes: BTreeMap<String, EnemyArchetype>,
    items: BTreeMap<String, Item>,
    artifacts: BTreeMap<String, Artifact>,
    /// Ordered: area selection takes the first range containing the wave.
    areas: Vec<Area>,
    glossary: BTreeMap<String, String>,
    player_defaults: PlayerDefaults,
    meta_defaults: MetaProgression,
}

impl ContentRegistry {
    /// The crate's built-in content set.
    pub fn builtin() -> Self {
        Self::new(
            data::builtin_archetypes(),
            data::builtin_items(),
            data::builtin_artifacts(),
            data::builtin_areas(),
            data::builtin_glossary(),
            data::builtin_player_defaults(),
            data::builtin_meta_defaults(),
        )
    }

    /// Assembles a registry from caller-supplied tables.
    pub fn new(
        archetypes: Vec<EnemyArchetype>,
        items: Vec<Item>,
        artifacts: Vec<Artifact>,
        areas: Vec<Area>,
        glossary: BTreeMap<String, String>,
        player_defaults: PlayerDefaults,
        meta_defaults: MetaProgression,
    ) -> Self {
        Self {
            archetypes: archetypes
                .into_iter()
                .map(|a| (a.key.clone(), a))
                .collect(),
            items: items.into_iter().map(|i| (i.key.clone(), i)).collect(),
            artifacts: artifacts
                .into_iter()
                .map(|a| (a.key.clone(), a))
                .collect(),
            areas,
            glossary,
            player_defaults,
            meta_defaults,
        }
    }

    pub fn archetype(&self, key: &str) -> Option<&EnemyArchetype> {
        self.archetypes.get(key)
    }

    pub fn item(&self, key: &str) -> Option<&Item> {
        self.items.get(key)
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn artifact(&self, key: &str) -> Option<&Artifact> {
        self.artifacts.get(key)
    }

    pub fn artifact_keys(&self) -> impl Iterator<Item = &str> {
        self.artifacts.keys().map(String::as_str)
    }

    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    pub fn glossary(&self, term: &str) -> Option<&str> {
        self.glossary.get(term).map(String::as_str)
    }

    pub fn player_defaults(&self) -> &PlayerDefaults {
        &self.player_defaults
    }

    pub fn meta_defaults(&self) -> &MetaProgression {
        &self.meta_defaults
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_is_consistent() {
        let registry = ContentRegistry::builtin();

        // Every area pool entry and scripted roster entry must resolve.
        for area in registry.areas() {
            assert!(!area.enemies.is_empty(), "area '{}' has no pool", area.key);
            for key in &area.enemies {
                assert!(
                    registry.archetype(key).is_some(),
                    "area '{}' references unknown archetype '{}'",
                    area.key,
                    key
                );
            }
            if let Some(final_wave) = &area.final_wave {
                for key in final_wave {
                    assert!(registry.archetype(key).is_some());
                }
            }
        }
    }

    #[test]
    fn test_builtin_areas_tile_the_wave_axis() {
        let registry = ContentRegistry::builtin();
        let areas = registry.areas();

        assert_eq!(areas[0].starting_wave, 1);
        for pair in areas.windows(2) {
            assert_eq!(pair[0].ending_wave, Some(pair[1].starting_wave));
        }
        // Last area is open-ended so every wave number has an area.
        assert_eq!(areas.last().unwrap().ending_wave, None);
    }

    #[test]
    fn test_area_contains_wave_is_half_open() {
        let area = Area {
            key: "a".to_string(),
            name: "A".to_string(),
            starting_wave: 1,
            ending_wave: Some(11),
            enemies: vec!["slime".to_string()],
            final_wave: None,
        };
        assert!(area.contains_wave(1));
        assert!(area.contains_wave(10));
        assert!(!area.contains_wave(11));
    }

    #[test]
    fn test_builtin_meta_defaults_start_empty() {
        let registry = ContentRegistry::builtin();
        let meta = registry.meta_defaults();
        assert_eq!(meta.souls, 0);
        assert!(meta.upgrades.contains_key("bonus_health"));
        assert!(meta.upgrades.contains_key("bonus_experience"));
        for upgrade in meta.upgrades.values() {
            assert_eq!(upgrade.value, 0.0);
            assert!(upgrade.price > 0);
        }
    }

    #[test]
    fn test_glossary_covers_status_terms() {
        let registry = ContentRegistry::builtin();
        for term in ["Shattered", "Weakness", "Frozen", "Stone Skin"] {
            assert!(registry.glossary(term).is_some(), "missing term '{term}'");
        }
    }
}
