// Wave generation
pub const ROSTER_WAVE_DIVISOR: f64 = 8.0;
pub const MAX_ROSTER_SIZE: usize = 6;
pub const STAT_MOD_GROWTH_RATE: f64 = 1.03;
pub const ARTIFACT_DROP_WAVE_INTERVAL: u32 = 5;

// XP curve: threshold = round(XP_CURVE_BASE * level^XP_CURVE_EXPONENT)
pub const XP_CURVE_BASE: f64 = 10.0;
pub const XP_CURVE_EXPONENT: f64 = 1.7;

// Status infliction (rolled once per player hit, one-shot per enemy)
pub const SHATTER_CHANCE: f64 = 0.33;
pub const WEAKNESS_CHANCE: f64 = 0.33;
pub const WEAKNESS_ATTACK_FACTOR: f64 = 0.8;
pub const FREEZE_CHANCE: f64 = 0.15;
pub const FREEZE_TURNS: u32 = 3;

// Damage pipeline
pub const CRIT_MULTIPLIER: f64 = 2.0;
pub const FORTUNE_ROLL_OFFSET: f64 = 0.5; // roll lands in [0.5, 1.5)
pub const MIDAS_DAMPENING: f64 = 0.9;
pub const MIDAS_GOLD_DIVISOR: f64 = 10.0;

// Player stances
pub const DEFEND_DEFENSE_DIVISOR: f64 = 5.0;
pub const BRAVERY_ATTACK_DIVISOR: f64 = 2.0;
pub const STONE_IDOL_STACKS: u32 = 6;
pub const RAGE_ATTACK_DIVISOR: f64 = 100.0;

// Level-up growth
pub const LEVEL_HEALTH_GROWTH: u32 = 2;
pub const LEVEL_ATTACK_OFFSET: u32 = 3;
pub const LEVEL_DEFENSE_DIVISOR: f64 = 8.0;

// Narration log
pub const GAME_LOG_CAPACITY: usize = 50;

// Persistence
pub const AUTOSAVE_INTERVAL_SECONDS: u64 = 3;
pub const RUN_SAVE_MAGIC: u64 = 0x534F_554C_5F52_554E; // "SOUL_RUN"
pub const META_SAVE_MAGIC: u64 = 0x534F_554C_5F4D_4554; // "SOUL_MET"
