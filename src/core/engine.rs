//! The combat engine: owns the content registry, the current run, and the
//! meta-progression, and drives the turn machine through player actions,
//! enemy retaliation, and wave boundaries.
//!
//! All RNG flows in through `&mut impl Rng` so tests can drive the engine
//! with a seeded generator.

use rand::Rng;

use crate::character::check_level_up;
use crate::content::ContentRegistry;
use crate::core::combat_math;
use crate::core::constants::{
    ARTIFACT_DROP_WAVE_INTERVAL, BRAVERY_ATTACK_DIVISOR, DEFEND_DEFENSE_DIVISOR, FREEZE_CHANCE,
    FREEZE_TURNS, RAGE_ATTACK_DIVISOR, SHATTER_CHANCE, STONE_IDOL_STACKS, WEAKNESS_ATTACK_FACTOR,
    WEAKNESS_CHANCE,
};
use crate::core::run_state::{GameLog, Phase, RunState};
use crate::economy;
use crate::error::{ActionError, EngineError};
use crate::meta::MetaProgression;
use crate::waves;

#[derive(Debug)]
pub struct CombatEngine {
    registry: ContentRegistry,
    run: RunState,
    meta: MetaProgression,
}

impl CombatEngine {
    /// Starts a fresh run against the given registry and meta state.
    pub fn new(
        registry: ContentRegistry,
        meta: MetaProgression,
        rng: &mut impl Rng,
    ) -> Result<Self, EngineError> {
        let player = economy::fresh_player(&registry, &meta);
        let mut engine = CombatEngine {
            registry,
            run: RunState::new(player),
            meta,
        };
        engine.spawn_wave(rng)?;
        Ok(engine)
    }

    /// Rebuilds an engine from previously saved state. The transient phase
    /// is recomputed from what was persisted.
    pub fn from_parts(registry: ContentRegistry, mut run: RunState, meta: MetaProgression) -> Self {
        run.recompute_phase();
        run.prune_selection();
        CombatEngine { registry, run, meta }
    }

    pub fn registry(&self) -> &ContentRegistry {
        &self.registry
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn meta(&self) -> &MetaProgression {
        &self.meta
    }

    pub fn log(&self) -> &GameLog {
        &self.run.log
    }

    pub fn phase(&self) -> Phase {
        self.run.phase
    }

    /// Consumes the engine, handing back the pieces worth persisting.
    pub fn into_parts(self) -> (RunState, MetaProgression) {
        (self.run, self.meta)
    }

    /// Abandons the current run and starts over. Meta-progression and its
    /// souls persist across runs.
    pub fn new_game(&mut self, rng: &mut impl Rng) -> Result<(), EngineError> {
        let player = economy::fresh_player(&self.registry, &self.meta);
        self.run = RunState::new(player);
        self.spawn_wave(rng)?;
        Ok(())
    }

    /// Every failed operation also narrates itself: the error's display
    /// text lands in the game log before the error is returned.
    fn narrate_failure(&mut self, err: EngineError) -> EngineError {
        self.run.log.push(err.to_string());
        err
    }

    fn spawn_wave(&mut self, rng: &mut impl Rng) -> Result<(), EngineError> {
        let roster =
            match waves::generate_roster(&self.registry, self.run.wave, self.run.stat_mod, rng) {
                Ok(roster) => roster,
                Err(err) => return Err(self.narrate_failure(err.into())),
            };
        let area = waves::select_area(&self.registry, self.run.wave)?;
        self.run
            .log
            .push(format!("Wave {} begins in the {}!", self.run.wave, area.name));
        self.run.enemies = roster;
        self.run.phase = Phase::PlayerTurn;
        self.run.selected = Some(0);
        let label = self.run.enemies[0].label.clone();
        self.run.log.push(format!("Targeting {label}."));
        Ok(())
    }

    fn ensure_player_turn(&mut self) -> Result<(), EngineError> {
        let err = match self.run.phase {
            Phase::PlayerTurn => return Ok(()),
            Phase::RunOver => ActionError::RunOver,
            _ => ActionError::OutOfTurn,
        };
        Err(self.narrate_failure(err.into()))
    }

    fn ensure_between_waves(&mut self) -> Result<(), EngineError> {
        let err = match self.run.phase {
            Phase::WaveCleared => return Ok(()),
            Phase::RunOver => ActionError::RunOver,
            _ => ActionError::NotBetweenWaves,
        };
        Err(self.narrate_failure(err.into()))
    }

    /// Picks which enemy the next attack lands on.
    pub fn select_target(&mut self, idx: usize) -> Result<(), EngineError> {
        self.ensure_player_turn()?;
        if !self.run.enemies.get(idx).is_some_and(|e| e.is_alive()) {
            return Err(self.narrate_failure(ActionError::BadTarget(idx).into()));
        }
        let label = self.run.enemies[idx].label.clone();
        self.run.selected = Some(idx);
        self.run.log.push(format!("Targeting {label}."));
        Ok(())
    }

    /// Strikes the selected enemy, running the full damage pipeline:
    /// status infliction, rage buildup, base damage (with the full-health
    /// variant), fortune, crit, midas, then vampiric healing. Ends the
    /// player's turn.
    pub fn attack(&mut self, rng: &mut impl Rng) -> Result<(), EngineError> {
        self.ensure_player_turn()?;
        let idx = match self.run.selected {
            Some(idx) => idx,
            None => return Err(self.narrate_failure(ActionError::NoTarget.into())),
        };
        if !self.run.enemies.get(idx).is_some_and(|e| e.is_alive()) {
            return Err(self.narrate_failure(ActionError::BadTarget(idx).into()));
        }

        self.inflict_statuses(idx, rng);

        if self.run.player.berserker_rage {
            let gain =
                ((self.run.player.attack as f64 / RAGE_ATTACK_DIVISOR).round() as u32).max(1);
            self.run.player.temp_attack += gain;
        }

        let enemy = &self.run.enemies[idx];
        let p = &self.run.player;
        let mut damage = if enemy.at_full_health() {
            combat_math::full_health_strike(
                p.attack,
                p.temp_attack,
                p.full_health_bonus,
                enemy.defense,
                enemy.temp_defense,
            )
        } else {
            combat_math::strike_damage(p.attack, p.temp_attack, enemy.defense, enemy.temp_defense)
        };

        if p.fortune {
            damage = combat_math::fortune_roll(damage, rng);
        }
        let mut crit_note = "";
        if combat_math::roll(p.crit_chance + p.temp_crit_chance, rng) {
            damage = combat_math::crit_damage(damage);
            crit_note = " (Crit!)";
        }
        if p.midas {
            damage = combat_math::midas_damage(damage);
        }
        let final_damage = damage.round() as u32;

        if self.run.player.midas {
            let gold = combat_math::midas_gold(final_damage);
            self.run.player.gold += gold;
        }
        if self.run.player.vampiric_heal > 0.0 {
            let heal = combat_math::vampiric_heal(final_damage, self.run.player.vampiric_heal);
            let healed = self.run.player.heal(heal);
            self.run
                .log
                .push(format!("You drain {healed} HP from the wound."));
        }

        let enemy = &mut self.run.enemies[idx];
        enemy.take_damage(final_damage);
        let label = enemy.label.clone();
        self.run
            .log
            .push(format!("You dealt {final_damage} damage to the {label}{crit_note}."));

        if !self.run.enemies[idx].is_alive() {
            self.grant_kill_rewards(idx);
        }

        if self.run.wave_cleared() {
            self.finish_wave();
        } else {
            self.run.prune_selection();
            if self.run.selected.is_none() {
                self.retarget();
            }
            self.begin_enemy_phase();
        }
        Ok(())
    }

    fn inflict_statuses(&mut self, idx: usize, rng: &mut impl Rng) {
        if self.run.player.shatter_imbue
            && !self.run.enemies[idx].shattered
            && combat_math::roll(SHATTER_CHANCE, rng)
        {
            let enemy = &mut self.run.enemies[idx];
            enemy.shattered = true;
            enemy.defense = 0;
            let label = enemy.label.clone();
            self.run
                .log
                .push(format!("{label} has been inflicted with Shattered!"));
        }

        if self.run.player.weakness_imbue
            && !self.run.enemies[idx].weakness
            && combat_math::roll(WEAKNESS_CHANCE, rng)
        {
            let enemy = &mut self.run.enemies[idx];
            enemy.weakness = true;
            enemy.attack = (enemy.attack as f64 * WEAKNESS_ATTACK_FACTOR).round() as u32;
            let label = enemy.label.clone();
            self.run
                .log
                .push(format!("{label} has been inflicted with Weakness!"));
        }

        if self.run.player.ice_charm
            && self.run.enemies[idx].frozen_counter == 0
            && combat_math::roll(FREEZE_CHANCE, rng)
        {
            let enemy = &mut self.run.enemies[idx];
            enemy.frozen_counter = FREEZE_TURNS;
            let label = enemy.label.clone();
            self.run.log.push(format!("{label} has been frozen solid!"));
        }
    }

    /// Raise the guard for the wave. Usable once per wave and ends the
    /// player's turn.
    pub fn defend(&mut self) -> Result<(), EngineError> {
        self.ensure_player_turn()?;
        if self.run.player.used_defend {
            return Err(self.narrate_failure(ActionError::AlreadyUsed("defend").into()));
        }

        let player = &mut self.run.player;
        player.temp_defense = 1 + (player.defense as f64 / DEFEND_DEFENSE_DIVISOR).round() as u32;
        player.used_defend = true;
        self.run.log.push("You brace behind your guard.".to_string());
        if self.run.player.stone_idol {
            self.run.player.stone_skin_stacks += STONE_IDOL_STACKS;
            self.run
                .log
                .push(format!("The Stone Idol grants {STONE_IDOL_STACKS} stacks of Stone Skin."));
        }
        self.begin_enemy_phase();
        Ok(())
    }

    /// Commit to the offense for the wave. Usable once per wave and ends
    /// the player's turn.
    pub fn bravery(&mut self) -> Result<(), EngineError> {
        self.ensure_player_turn()?;
        if self.run.player.used_bravery {
            return Err(self.narrate_failure(ActionError::AlreadyUsed("bravery").into()));
        }

        let player = &mut self.run.player;
        player.temp_attack = (player.attack as f64 / BRAVERY_ATTACK_DIVISOR).round() as u32;
        player.temp_crit_chance += player.bonus_crit_chance;
        player.used_bravery = true;
        self.run.log.push("You steel yourself for the offense.".to_string());
        self.begin_enemy_phase();
        Ok(())
    }

    fn begin_enemy_phase(&mut self) {
        match self.first_living_from(0) {
            Some(idx) => self.run.phase = Phase::EnemyActing(idx),
            // Callers already route cleared waves elsewhere.
            None => self.finish_wave(),
        }
    }

    fn first_living_from(&self, start: usize) -> Option<usize> {
        (start..self.run.enemies.len()).find(|&i| self.run.enemies[i].is_alive())
    }

    /// Resolves one pending enemy turn: thaw countdown, wither and aging
    /// auras, then retaliation (possibly a special attack, possibly
    /// mirrored back).
    pub fn enemy_tick(&mut self, rng: &mut impl Rng) -> Result<(), EngineError> {
        let idx = match self.run.phase {
            Phase::EnemyActing(i) => i,
            _ => return Err(self.narrate_failure(ActionError::NoEnemyActing.into())),
        };

        self.run.enemies[idx].temp_defense = 0;

        if self.run.enemies[idx].frozen_counter > 0 {
            let enemy = &mut self.run.enemies[idx];
            enemy.frozen_counter -= 1;
            let label = enemy.label.clone();
            self.run.log.push(format!("{label} is frozen and cannot act!"));
            self.advance_acting(idx);
            return Ok(());
        }

        if self.run.player.wither > 0.0 {
            let wither = self.run.player.wither;
            let enemy = &mut self.run.enemies[idx];
            let dmg = (enemy.max_health as f64 * wither).round() as u32;
            enemy.take_damage(dmg);
            let label = enemy.label.clone();
            self.run.log.push(format!("{label} withers for {dmg} damage."));
            if !self.run.enemies[idx].is_alive() {
                self.run.log.push(format!("The {label} withers away..."));
                self.grant_kill_rewards(idx);
                if self.run.wave_cleared() {
                    self.finish_wave();
                } else {
                    self.advance_acting(idx);
                }
                return Ok(());
            }
        }

        if self.run.player.age > 0.0 {
            let age = self.run.player.age;
            let enemy = &mut self.run.enemies[idx];
            enemy.attack = (enemy.attack as f64 * (1.0 - age)).floor() as u32;
            enemy.defense = (enemy.defense as f64 * (1.0 - age)).floor() as u32;
            let label = enemy.label.clone();
            self.run
                .log
                .push(format!("{label} ages, losing a bit of combat prowess."));
        }

        let (mut attack, label) = {
            let enemy = &self.run.enemies[idx];
            (enemy.attack, enemy.label.clone())
        };
        let mut special_note = String::new();
        if let Some(special) = self.run.enemies[idx].special.clone() {
            if combat_math::roll(special.chance, rng) {
                attack = (attack as f64 * special.damage_mult).round() as u32;
                special_note = format!(" with {}", special.name);
            }
        }

        let p = &self.run.player;
        let damage =
            combat_math::retaliation_damage(attack, p.defense, p.temp_defense, p.stone_skin_stacks);

        if combat_math::roll(self.run.player.mirror_shield_chance, rng) {
            self.run.enemies[idx].take_damage(damage);
            self.run.log.push(format!(
                "Your Mirror Shield reflected {damage} damage back to the {label}!"
            ));
            if !self.run.enemies[idx].is_alive() {
                self.run
                    .log
                    .push(format!("The {label} was defeated by the reflected damage!"));
                self.grant_kill_rewards(idx);
                if self.run.wave_cleared() {
                    self.finish_wave();
                    return Ok(());
                }
            }
        } else {
            self.run.player.take_damage(damage);
            self.run
                .log
                .push(format!("The {label} dealt {damage} damage to you{special_note}."));
        }

        if !self.run.player.is_alive() {
            if self.run.player.phoenix_armed {
                self.run.player.health = 1;
                self.run.player.phoenix_armed = false;
                self.run
                    .log
                    .push("Your Phoenix Feather brought you back from the brink of death!".to_string());
                // The remaining enemies forfeit their turns.
                self.run.phase = Phase::PlayerTurn;
            } else {
                self.run.log.push("You have been defeated.".to_string());
                self.run.phase = Phase::RunOver;
            }
            return Ok(());
        }

        self.advance_acting(idx);
        Ok(())
    }

    /// Runs enemy turns until control returns to the player (or the run
    /// ends).
    pub fn resolve_enemy_turns(&mut self, rng: &mut impl Rng) -> Result<(), EngineError> {
        while matches!(self.run.phase, Phase::EnemyActing(_)) {
            self.enemy_tick(rng)?;
        }
        Ok(())
    }

    fn advance_acting(&mut self, idx: usize) {
        match self.first_living_from(idx + 1) {
            Some(next) => self.run.phase = Phase::EnemyActing(next),
            None => {
                self.run.phase = Phase::PlayerTurn;
                self.run.prune_selection();
                if self.run.selected.is_none() {
                    self.retarget();
                }
                self.run.log.push("It's your turn!".to_string());
            }
        }
    }

    fn grant_kill_rewards(&mut self, idx: usize) {
        let (experience, gold, label) = {
            let enemy = &self.run.enemies[idx];
            (enemy.experience, enemy.gold, enemy.label.clone())
        };
        let mult = self.run.player.experience_mult(&self.meta);
        let xp = (experience as f64 * mult).round() as u64;
        self.run.player.experience += xp;
        self.run.player.gold += gold;
        self.meta.souls += 1;
        self.run.log.push(format!("You defeated the {label}!"));
        self.run
            .log
            .push(format!("You gained {xp} EXP and {gold} gold!"));
        check_level_up(&mut self.run.player, &mut self.run.log);
    }

    fn retarget(&mut self) {
        self.run.selected = self.first_living_from(0);
        if let Some(idx) = self.run.selected {
            let label = self.run.enemies[idx].label.clone();
            self.run.log.push(format!("Targeting {label}."));
        }
    }

    fn finish_wave(&mut self) {
        self.run.selected = None;
        self.run.phase = Phase::WaveCleared;
        self.run.log.push("Wave cleared!".to_string());
    }

    /// Moves to the next wave: escalates difficulty, regenerates the
    /// roster, resets per-wave state, re-arms the phoenix, and hands out
    /// the periodic artifact drop. Roster generation happens first so a
    /// configuration error leaves the cleared wave intact.
    pub fn advance_wave(&mut self, rng: &mut impl Rng) -> Result<(), EngineError> {
        match self.run.phase {
            Phase::WaveCleared => {}
            Phase::RunOver => return Err(self.narrate_failure(ActionError::RunOver.into())),
            _ => return Err(self.narrate_failure(ActionError::WaveNotCleared.into())),
        }

        let cleared_wave = self.run.wave;
        let next_wave = cleared_wave + 1;
        let next_mod = waves::escalate(self.run.stat_mod);
        let roster = match waves::generate_roster(&self.registry, next_wave, next_mod, rng) {
            Ok(roster) => roster,
            Err(err) => return Err(self.narrate_failure(err.into())),
        };
        let area_name = waves::select_area(&self.registry, next_wave)?.name.clone();

        self.run.wave = next_wave;
        self.run.stat_mod = next_mod;
        self.run.enemies = roster;
        self.run.player.reset_wave_transients();

        if self.run.player.phoenix && !self.run.player.phoenix_armed {
            self.run.player.phoenix_armed = true;
            self.run
                .log
                .push("Your Phoenix Feather is ready to revive you once more!".to_string());
        }

        self.run
            .log
            .push(format!("Wave {next_wave} begins in the {area_name}! Enemy stats increased."));

        if cleared_wave % ARTIFACT_DROP_WAVE_INTERVAL == 0 {
            self.drop_artifact(rng)?;
        }

        self.run.selected = Some(0);
        let label = self.run.enemies[0].label.clone();
        self.run.log.push(format!("Targeting {label}."));
        self.run.phase = Phase::PlayerTurn;
        Ok(())
    }

    fn drop_artifact(&mut self, rng: &mut impl Rng) -> Result<(), EngineError> {
        let pool = economy::droppable_artifacts(&self.run.player, &self.registry);
        if pool.is_empty() {
            self.run
                .log
                .push("Every artifact is already claimed or banished.".to_string());
            return Ok(());
        }
        let key = pool[rng.gen_range(0..pool.len())].to_string();
        economy::acquire_artifact(&mut self.run.player, &self.registry, &key, &mut self.run.log)
    }

    // Between-wave economy, gated on the cleared phase.

    pub fn buy_item(&mut self, key: &str) -> Result<(), EngineError> {
        self.ensure_between_waves()?;
        economy::buy_item(&mut self.run.player, &self.registry, key, &mut self.run.log)
            .map_err(|err| self.narrate_failure(err))
    }

    pub fn use_item(&mut self, key: &str) -> Result<(), EngineError> {
        self.ensure_between_waves()?;
        economy::use_item(&mut self.run.player, &self.registry, key, &mut self.run.log)
            .map_err(|err| self.narrate_failure(err))
    }

    pub fn discard_artifact(&mut self, slot: usize) -> Result<(), EngineError> {
        self.ensure_between_waves()?;
        economy::discard_artifact(&mut self.run.player, &self.registry, slot, &mut self.run.log)
            .map_err(|err| self.narrate_failure(err))
    }

    pub fn banish_artifact(&mut self, slot: usize) -> Result<(), EngineError> {
        self.ensure_between_waves()?;
        economy::banish_artifact(&mut self.run.player, &self.registry, slot, &mut self.run.log)
            .map_err(|err| self.narrate_failure(err))
    }

    /// Spends souls on a permanent upgrade. Legal in any phase since it
    /// only touches meta state; the bonus applies from the next fresh run.
    pub fn purchase_upgrade(&mut self, key: &str) -> Result<(), EngineError> {
        self.meta
            .purchase(key)
            .map_err(|err| self.narrate_failure(err))
    }

    /// Direct mutable access for frontends that manage state outside the
    /// action surface (debug menus, migrations).
    pub fn run_mut(&mut self) -> &mut RunState {
        &mut self.run
    }

    pub fn meta_mut(&mut self) -> &mut MetaProgression {
        &mut self.meta
    }
}
