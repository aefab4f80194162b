//! Meta-progression: souls and permanent upgrades that outlive a run.
//!
//! Souls are earned one per enemy kill and spent on capped, monotonic
//! upgrades. A "new game" resets the run, never this state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::content;
use crate::error::{ConfigError, EngineError, ResourceError};

/// One purchasable permanent upgrade. `value` climbs by `increment` per
/// purchase and never exceeds `cap`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaUpgrade {
    pub value: f64,
    pub increment: f64,
    pub cap: f64,
    pub price: u64,
}

impl MetaUpgrade {
    pub fn at_cap(&self) -> bool {
        self.value >= self.cap
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaProgression {
    pub souls: u64,
    pub upgrades: BTreeMap<String, MetaUpgrade>,
}

impl Default for MetaProgression {
    fn default() -> Self {
        content::data::builtin_meta_defaults()
    }
}

impl MetaProgression {
    /// Flat max-health bonus applied when a run starts.
    pub fn bonus_health(&self) -> u32 {
        self.upgrades
            .get("bonus_health")
            .map_or(0, |u| u.value.round() as u32)
    }

    /// Additive experience-multiplier bonus.
    pub fn bonus_experience(&self) -> f64 {
        self.upgrades.get("bonus_experience").map_or(0.0, |u| u.value)
    }

    /// Buys one step of an upgrade. Rejected outright at the cap or with
    /// insufficient souls; the balance is untouched on failure.
    pub fn purchase(&mut self, key: &str) -> Result<(), EngineError> {
        let upgrade = self
            .upgrades
            .get_mut(key)
            .ok_or_else(|| ConfigError::UnknownUpgrade(key.to_string()))?;

        if upgrade.at_cap() {
            return Err(ResourceError::UpgradeAtCap(key.to_string()).into());
        }
        if self.souls < upgrade.price {
            return Err(ResourceError::Souls {
                need: upgrade.price,
                have: self.souls,
            }
            .into());
        }

        self.souls -= upgrade.price;
        upgrade.value = (upgrade.value + upgrade.increment).min(upgrade.cap);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchase_debits_souls_and_grows_value() {
        let mut meta = MetaProgression::default();
        meta.souls = 25;

        meta.purchase("bonus_health").unwrap();

        assert_eq!(meta.souls, 15);
        assert_eq!(meta.bonus_health(), 5);
    }

    #[test]
    fn test_purchase_without_souls_is_rejected() {
        let mut meta = MetaProgression::default();
        meta.souls = 3;

        let err = meta.purchase("bonus_health").unwrap_err();
        assert!(matches!(
            err,
            EngineError::Insufficient(ResourceError::Souls { need: 10, have: 3 })
        ));
        assert_eq!(meta.souls, 3);
    }

    #[test]
    fn test_purchase_at_cap_is_rejected_with_souls_untouched() {
        let mut meta = MetaProgression::default();
        meta.souls = 1000;
        meta.upgrades.get_mut("bonus_health").unwrap().value = 50.0;

        let err = meta.purchase("bonus_health").unwrap_err();
        assert!(matches!(
            err,
            EngineError::Insufficient(ResourceError::UpgradeAtCap(_))
        ));
        assert_eq!(meta.souls, 1000);
        assert_eq!(meta.bonus_health(), 50);
    }

    #[test]
    fn test_value_clamps_to_cap() {
        let mut meta = MetaProgression::default();
        meta.souls = 1000;
        let upgrade = meta.upgrades.get_mut("bonus_health").unwrap();
        upgrade.value = 48.0; // One increment would overshoot the cap of 50.

        meta.purchase("bonus_health").unwrap();
        assert_eq!(meta.upgrades["bonus_health"].value, 50.0);
    }

    #[test]
    fn test_unknown_upgrade_key() {
        let mut meta = MetaProgression::default();
        assert!(matches!(
            meta.purchase("bonus_luck").unwrap_err(),
            EngineError::Configuration(ConfigError::UnknownUpgrade(_))
        ));
    }
}
