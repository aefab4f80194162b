//! Integration tests for persistence: a run saved mid-combat comes back
//! with identical player and roster state, the meta record travels
//! separately, and a rebuilt engine lands in a sensible phase.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tempfile::tempdir;

use soulbound::content::ContentRegistry;
use soulbound::{CombatEngine, MetaProgression, Phase, SaveManager};

fn engine() -> (CombatEngine, ChaCha8Rng) {
    let mut rng = ChaCha8Rng::seed_from_u64(13);
    let engine =
        CombatEngine::new(ContentRegistry::builtin(), MetaProgression::default(), &mut rng)
            .unwrap();
    (engine, rng)
}

#[test]
fn test_mid_run_save_and_restore() {
    let dir = tempdir().unwrap();
    let manager = SaveManager::with_dir(dir.path()).unwrap();
    let (mut engine, mut rng) = engine();

    // Play a little so there is state worth keeping.
    engine.attack(&mut rng).unwrap();
    engine.resolve_enemy_turns(&mut rng).unwrap();
    engine.meta_mut().souls += 3;

    manager.save_run(engine.run()).unwrap();
    manager.save_meta(engine.meta()).unwrap();

    let (saved_run, saved_meta) = engine.into_parts();
    let registry = ContentRegistry::builtin();
    let restored_run = manager.restore_run(&registry).unwrap();
    let (restored_meta, _) = manager.load_meta().unwrap();

    assert_eq!(restored_run.player, saved_run.player);
    assert_eq!(restored_run.enemies, saved_run.enemies);
    assert_eq!(restored_run.wave, saved_run.wave);
    assert_eq!(restored_run.stat_mod, saved_run.stat_mod);
    assert_eq!(restored_meta, saved_meta);
}

#[test]
fn test_restored_engine_resumes_on_the_player_turn() {
    let dir = tempdir().unwrap();
    let manager = SaveManager::with_dir(dir.path()).unwrap();
    let (engine, _) = engine();

    manager.save_run(engine.run()).unwrap();
    manager.save_meta(engine.meta()).unwrap();

    let registry = ContentRegistry::builtin();
    let run = manager.restore_run(&registry).unwrap();
    let (meta, _) = manager.load_meta().unwrap();
    let restored = CombatEngine::from_parts(registry, run, meta);

    assert_eq!(restored.phase(), Phase::PlayerTurn);
    assert!(restored.run().enemies.iter().any(|e| e.is_alive()));
}

#[test]
fn test_cleared_wave_restores_as_cleared() {
    let dir = tempdir().unwrap();
    let manager = SaveManager::with_dir(dir.path()).unwrap();
    let (mut engine, _) = engine();

    for enemy in &mut engine.run_mut().enemies {
        enemy.health = 0;
    }
    manager.save_run(engine.run()).unwrap();

    let registry = ContentRegistry::builtin();
    let run = manager.restore_run(&registry).unwrap();
    assert_eq!(run.phase, Phase::WaveCleared);
    assert_eq!(run.selected, None);
}

#[test]
fn test_defeat_restores_as_run_over() {
    let dir = tempdir().unwrap();
    let manager = SaveManager::with_dir(dir.path()).unwrap();
    let (mut engine, _) = engine();

    engine.run_mut().player.health = 0;
    manager.save_run(engine.run()).unwrap();

    let registry = ContentRegistry::builtin();
    let run = manager.restore_run(&registry).unwrap();
    assert_eq!(run.phase, Phase::RunOver);
}

#[test]
fn test_deleting_the_run_keeps_the_souls() {
    let dir = tempdir().unwrap();
    let manager = SaveManager::with_dir(dir.path()).unwrap();
    let (mut engine, _) = engine();
    engine.meta_mut().souls = 99;

    manager.save_run(engine.run()).unwrap();
    manager.save_meta(engine.meta()).unwrap();
    manager.delete_run_save().unwrap();

    assert!(!manager.run_save_exists());
    let (meta, _) = manager.load_meta().unwrap();
    assert_eq!(meta.souls, 99);
}

#[test]
fn test_missing_run_save_is_an_io_error() {
    let dir = tempdir().unwrap();
    let manager = SaveManager::with_dir(dir.path()).unwrap();
    assert!(!manager.run_save_exists());
    assert!(manager.load_run().is_err());
}
