//! Pure combat arithmetic. The player's strike pipeline works in f64 and
//! rounds exactly once at the end, so multiplicative modifiers compose
//! without accumulating per-step rounding error.

use rand::Rng;

use crate::core::constants::{
    CRIT_MULTIPLIER, FORTUNE_ROLL_OFFSET, MIDAS_DAMPENING, MIDAS_GOLD_DIVISOR,
};

/// Attack-minus-defense base damage, floored at zero. Still fractional;
/// the pipeline rounds once after all multipliers.
pub fn strike_damage(attack: u32, temp_attack: u32, defense: u32, temp_defense: u32) -> f64 {
    let raw = (attack + temp_attack) as f64 - (defense + temp_defense) as f64;
    raw.max(0.0)
}

/// Variant against an unscratched target: the bonus multiplies the attack
/// total, not the post-defense damage.
pub fn full_health_strike(
    attack: u32,
    temp_attack: u32,
    bonus: f64,
    defense: u32,
    temp_defense: u32,
) -> f64 {
    let raw = (attack + temp_attack) as f64 * bonus - (defense + temp_defense) as f64;
    raw.max(0.0)
}

/// Rescales damage by a uniform roll in [0.5, 1.5).
pub fn fortune_roll(damage: f64, rng: &mut impl Rng) -> f64 {
    damage * (rng.gen::<f64>() + FORTUNE_ROLL_OFFSET)
}

/// One probability check. A chance of 1.0 or more always passes.
pub fn roll(chance: f64, rng: &mut impl Rng) -> bool {
    chance > 0.0 && rng.gen::<f64>() < chance
}

pub fn crit_damage(damage: f64) -> f64 {
    damage * CRIT_MULTIPLIER
}

pub fn midas_damage(damage: f64) -> f64 {
    damage * MIDAS_DAMPENING
}

/// Gold paid out by a Midas hit, from the already-rounded final damage.
pub fn midas_gold(final_damage: u32) -> u64 {
    (final_damage as f64 / MIDAS_GOLD_DIVISOR).round() as u64
}

/// Health restored by a vampiric strike, from the final damage.
pub fn vampiric_heal(final_damage: u32, fraction: f64) -> u32 {
    (final_damage as f64 * fraction).round() as u32
}

/// What an enemy strike gets through the player's layered defenses.
pub fn retaliation_damage(attack: u32, defense: u32, temp_defense: u32, stone_skin: u32) -> u32 {
    attack.saturating_sub(defense + temp_defense + stone_skin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_strike_damage_floors_at_zero() {
        assert_eq!(strike_damage(10, 0, 3, 0), 7.0);
        assert_eq!(strike_damage(10, 2, 3, 1), 8.0);
        assert_eq!(strike_damage(3, 0, 10, 0), 0.0);
    }

    #[test]
    fn test_full_health_strike_scales_attack_not_damage() {
        // (10 * 1.5) - 3 = 12, not (10 - 3) * 1.5 = 10.5.
        assert_eq!(full_health_strike(10, 0, 1.5, 3, 0), 12.0);
        assert_eq!(full_health_strike(2, 0, 1.5, 10, 0), 0.0);
    }

    #[test]
    fn test_fortune_roll_matches_probe_draw() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut probe = ChaCha8Rng::seed_from_u64(7);
        let expected = 10.0 * (probe.gen::<f64>() + FORTUNE_ROLL_OFFSET);
        assert_eq!(fortune_roll(10.0, &mut rng), expected);
    }

    #[test]
    fn test_fortune_roll_stays_in_band() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..100 {
            let d = fortune_roll(100.0, &mut rng);
            assert!((50.0..150.0).contains(&d), "out of band: {d}");
        }
    }

    #[test]
    fn test_roll_extremes() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(!roll(0.0, &mut rng));
        assert!(roll(1.0, &mut rng));
    }

    #[test]
    fn test_crit_and_midas_multipliers() {
        assert_eq!(crit_damage(7.0), 14.0);
        assert_eq!(midas_damage(100.0), 90.0);
        assert_eq!(midas_gold(90), 9);
    }

    #[test]
    fn test_vampiric_heal_rounds() {
        assert_eq!(vampiric_heal(25, 0.1), 3);
        assert_eq!(vampiric_heal(14, 0.1), 1);
    }

    #[test]
    fn test_retaliation_layers_all_defenses() {
        assert_eq!(retaliation_damage(20, 5, 3, 6), 6);
        assert_eq!(retaliation_damage(10, 5, 3, 6), 0);
    }
}
