//! Experience curve and level-up resolution.

use crate::character::player::PlayerCharacter;
use crate::core::constants::{
    LEVEL_ATTACK_OFFSET, LEVEL_DEFENSE_DIVISOR, LEVEL_HEALTH_GROWTH, XP_CURVE_BASE,
    XP_CURVE_EXPONENT,
};
use crate::core::run_state::GameLog;

/// Experience required to go from `level` to `level + 1`.
pub fn xp_to_next_level(level: u32) -> u64 {
    (XP_CURVE_BASE * (level as f64).powf(XP_CURVE_EXPONENT)).round() as u64
}

/// Applies pending level-ups, cascading while the remaining experience still
/// crosses the next threshold. Returns the number of levels gained.
///
/// Per level: threshold subtracted from experience, max health and health
/// grow by 2 x new level, attack by max(1, new level - 3), defense by
/// round(max(1, new level / 8)).
pub fn check_level_up(player: &mut PlayerCharacter, log: &mut GameLog) -> u32 {
    let mut levels = 0;
    loop {
        let threshold = xp_to_next_level(player.level);
        if player.experience < threshold {
            break;
        }
        player.experience -= threshold;
        player.level += 1;
        levels += 1;

        let health_growth = LEVEL_HEALTH_GROWTH * player.level;
        player.max_health += health_growth;
        player.health += health_growth;
        player.attack += player.level.saturating_sub(LEVEL_ATTACK_OFFSET).max(1);
        player.defense += (player.level as f64 / LEVEL_DEFENSE_DIVISOR).max(1.0).round() as u32;

        log.push(format!("Level up! You are now level {}!", player.level));
        log.push("Your stats have increased!".to_string());
    }
    levels
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
    fn test_xp_curve_values() {
        // round(10 * level^1.7)
        assert_eq!(xp_to_next_level(1), 10);
        assert_eq!(xp_to_next_level(2), 32);
        assert_eq!(xp_to_next_level(3), 65);
        assert_eq!(xp_to_next_level(10), 501);
    }

    #[test]
    fn test_single_level_up() {
        let mut player = test_player();
        let mut log = GameLog::default();
        player.experience = 10;

        let gained = check_level_up(&mut player, &mut log);

        assert_eq!(gained, 1);
        assert_eq!(player.level, 2);
        assert_eq!(player.experience, 0);
    }

    #[test]
    fn test_level_up_stat_growth() {
        let mut player = test_player();
        let mut log = GameLog::default();
        let (hp, max_hp, atk, def) = (
            player.health,
            player.max_health,
            player.attack,
            player.defense,
        );
        player.experience = 10;

        check_level_up(&mut player, &mut log);

        // New level 2: health +4, attack +max(1, -1)=1, defense +round(max(1, 0.25))=1
        assert_eq!(player.max_health, max_hp + 4);
        assert_eq!(player.health, hp + 4);
        assert_eq!(player.attack, atk + 1);
        assert_eq!(player.defense, def + 1);
    }

    #[test]
    fn test_level_up_cascades_across_two_thresholds() {
        let mut player = test_player();
        let mut log = GameLog::default();
        // 10 to reach level 2, 32 more to reach level 3.
        player.experience = 10 + 32;

        let gained = check_level_up(&mut player, &mut log);

        assert_eq!(gained, 2);
        assert_eq!(player.level, 3);
        assert_eq!(player.experience, 0);
    }

    #[test]
    fn test_no_level_up_below_threshold() {
        let mut player = test_player();
        let mut log = GameLog::default();
        player.experience = 9;

        assert_eq!(check_level_up(&mut player, &mut log), 0);
        assert_eq!(player.level, 1);
        assert_eq!(player.experience, 9);
    }

    #[test]
    fn test_high_level_attack_growth() {
        let mut player = test_player();
        let mut log = GameLog::default();
        player.level = 9;
        player.experience = xp_to_next_level(9);
        let atk = player.attack;

        check_level_up(&mut player, &mut log);

        // New level 10: attack grows by 10 - 3 = 7.
        assert_eq!(player.attack, atk + 7);
    }
}
