//! Per-run state: the turn phase machine, the narration log, and the
//! serializable snapshot of a run in progress.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::character::PlayerCharacter;
use crate::combat::EnemyInstance;
use crate::core::constants::GAME_LOG_CAPACITY;

/// Where the turn machine currently sits. Player actions are only legal
/// in `PlayerTurn`; economy actions only in `WaveCleared`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    PlayerTurn,
    /// An enemy turn is pending; the index points into the live roster.
    EnemyActing(usize),
    WaveCleared,
    RunOver,
}

/// Bounded narration log. Oldest lines fall off once the cap is hit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameLog {
    lines: VecDeque<String>,
}

impl GameLog {
    pub fn push(&mut self, line: String) {
        if self.lines.len() >= GAME_LOG_CAPACITY {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines in order, oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// True if any line contains `needle`. Test convenience, mostly.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }
}

/// Everything about the current run. The phase and the log are transient;
/// loading a save drops back into `PlayerTurn` (or `WaveCleared`/`RunOver`,
/// rebuilt by [`RunState::recompute_phase`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub player: PlayerCharacter,
    pub wave: u32,
    pub enemies: Vec<EnemyInstance>,
    pub selected: Option<usize>,
    pub stat_mod: f64,
    #[serde(skip)]
    pub phase: Phase,
    #[serde(skip)]
    pub log: GameLog,
}

impl RunState {
    pub fn new(player: PlayerCharacter) -> Self {
        RunState {
            player,
            wave: 1,
            enemies: Vec::new(),
            selected: None,
            stat_mod: 1.0,
            phase: Phase::PlayerTurn,
            log: GameLog::default(),
        }
    }

    pub fn living_enemies(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_alive()).count()
    }

    pub fn wave_cleared(&self) -> bool {
        self.enemies.iter().all(|e| !e.is_alive())
    }

    /// Rebuilds the transient phase after deserialization.
    pub fn recompute_phase(&mut self) {
        self.phase = if !self.player.is_alive() {
            Phase::RunOver
        } else if self.wave_cleared() {
            Phase::WaveCleared
        } else {
            Phase::PlayerTurn
        };
    }

    /// Drops the selection if the target died or the roster shrank.
    pub fn prune_selection(&mut self) {
        if let Some(idx) = self.selected {
            if idx >= self.enemies.len() || !self.enemies[idx].is_alive() {
                self.selected = None;
            }
        }
    }
}
