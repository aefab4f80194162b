//! Wave generation: area lookup, roster sizing and sampling, duplicate
//! disambiguation, and the difficulty escalation curve.

use rand::Rng;

use crate::combat::{create_enemy, EnemyInstance};
use crate::content::{Area, ContentRegistry};
use crate::core::constants::{MAX_ROSTER_SIZE, ROSTER_WAVE_DIVISOR, STAT_MOD_GROWTH_RATE};
use crate::error::ConfigError;

/// Finds the area whose wave band covers `wave`. Areas are checked in
/// their declared order, so earlier entries win if bands ever overlapped.
pub fn select_area(registry: &ContentRegistry, wave: u32) -> Result<&Area, ConfigError> {
    registry
        .areas()
        .iter()
        .find(|a| a.contains_wave(wave))
        .ok_or(ConfigError::NoAreaForWave(wave))
}

/// A wave is final when it is the last one before the area's exclusive
/// upper bound and the area scripts a final roster.
pub fn is_final_wave(area: &Area, wave: u32) -> bool {
    area.final_wave.is_some() && area.ending_wave == Some(wave + 1)
}

/// How many enemies a random wave holds.
pub fn roster_size(wave: u32) -> usize {
    let raw = (1.0 + wave as f64 / ROSTER_WAVE_DIVISOR).floor() as usize;
    raw.clamp(1, MAX_ROSTER_SIZE)
}

/// Builds the roster for `wave`. Final waves use the area's scripted
/// lineup; all other waves sample uniformly from the area's pool. Labels
/// get letter suffixes (" B", " C", ...) from the second duplicate on.
pub fn generate_roster(
    registry: &ContentRegistry,
    wave: u32,
    stat_mod: f64,
    rng: &mut impl Rng,
) -> Result<Vec<EnemyInstance>, ConfigError> {
    let area = select_area(registry, wave)?;

    let keys: Vec<String> = if is_final_wave(area, wave) {
        let scripted = area.final_wave.clone().unwrap_or_default();
        if scripted.is_empty() {
            return Err(ConfigError::EmptyEnemyPool(area.key.clone()));
        }
        scripted
    } else {
        if area.enemies.is_empty() {
            return Err(ConfigError::EmptyEnemyPool(area.key.clone()));
        }
        (0..roster_size(wave))
            .map(|_| area.enemies[rng.gen_range(0..area.enemies.len())].clone())
            .collect()
    };

    let mut roster = Vec::with_capacity(keys.len());
    let mut seen: std::collections::BTreeMap<String, u32> = std::collections::BTreeMap::new();

    for key in &keys {
        let base = registry
            .archetype(key)
            .ok_or_else(|| ConfigError::UnknownArchetype(key.clone()))?;
        let count = seen.entry(base.name.clone()).or_insert(0);
        let label = if *count == 0 {
            base.name.clone()
        } else {
            // Second copy gets " B", third " C", and so on.
            let suffix = (b'A' + (*count as u8).min(25)) as char;
            format!("{} {}", base.name, suffix)
        };
        *count += 1;
        roster.push(create_enemy(registry, key, label, stat_mod)?);
    }

    Ok(roster)
}

/// Compounds the difficulty multiplier, keeping it to two decimals so
/// scaling stays stable across save round trips.
pub fn escalate(stat_mod: f64) -> f64 {
    (stat_mod * STAT_MOD_GROWTH_RATE * 100.0).round() / 100.0
}
