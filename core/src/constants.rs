//! Game-wide tuning constants shared by the engine and the systems.

/// Ticks per unit of the `reload` and `duration` attributes.
pub const RELOAD_BASE_TICKS: f64 = 10.0;

/// Cells travelled per tick by bullets and glue bullets.
pub const BULLET_SPEED: f64 = 0.85;

/// Cells travelled per tick by mortar shells.
pub const MORTAR_SPEED: f64 = 0.45;

/// Cells travelled per tick by mines on their way to the path.
pub const MINE_SPEED: f64 = 0.85;

/// Multiple of the spawn interval that must elapse between wave launches.
pub const INITIAL_TICKS_WAVE: u64 = 4;

/// Relative ticks inserted between replicas of an extended wave.
pub const REPLICA_GAP: u64 = 2;

/// Linear term of the damage-possible estimate.
pub const DIFFICULTY_LINEAR: f64 = 20.0;

/// Coefficient of the superlinear damage-possible term.
pub const DIFFICULTY_MODIFIER: f64 = 8e-4;

/// Exponent of the superlinear damage-possible term.
pub const DIFFICULTY_EXPONENT: f64 = 1.9;

/// Lower bound of the enemy health multiplier.
pub const MIN_HEALTH_MODIFIER: f64 = 0.5;

/// Scale of the enemy reward multiplier.
pub const REWARD_MODIFIER: f64 = 0.4;

/// Exponent applied to the health multiplier when deriving rewards.
pub const REWARD_EXPONENT: f64 = 0.5;

/// Lower bound of the enemy reward multiplier.
pub const MIN_REWARD_MODIFIER: f64 = 1.0;

/// Scale of the early-completion bonus.
pub const EARLY_BONUS_MODIFIER: f64 = 3.0;

/// Exponent applied to the remaining reward in the early-completion bonus.
pub const EARLY_BONUS_EXPONENT: f64 = 0.6;

/// Damage multiplier against enemies weak to a turret family.
pub const WEAK_AGAINST_DAMAGE_MODIFIER: f64 = 3.0;

/// Damage multiplier against enemies strong against a turret family.
pub const STRONG_AGAINST_DAMAGE_MODIFIER: f64 = 0.3;

/// Ticks a healer walks between two healing pulses.
pub const HEALER_HEALING_TICKS: u32 = 100;

/// Ticks a healer stands still after a pulse.
pub const HEALER_STOP_TICKS: u32 = 30;

/// Radius of a healing pulse in cells.
pub const HEALER_HEALING_RADIUS: f64 = 2.0;

/// Ticks a teleported enemy stays untargetable.
pub const TELEPORT_TICKS: u32 = 8;

/// Live mines a single launch turret may have on the board.
pub const MAX_MINES_PER_TURRET: u32 = 3;

/// Radius of a glue puddle in cells.
pub const GLUE_PUDDLE_RADIUS: f64 = 1.0;

/// Ticks between two progress reports of the replay runner.
pub const PROGRESS_INTERVAL: u64 = 100;

/// Share of a purchase refunded when selling.
pub const DOWNGRADE_PERCENT: f64 = 0.8;

/// Share of the invested value a turret never sells below after aging.
pub const AGED_VALUE_FLOOR: f64 = 0.5;

/// Default highest level of grades one and two.
pub const DEFAULT_MAX_LEVEL: u32 = 10;

/// Highest level of grade three for every family except glue.
pub const TOP_GRADE_MAX_LEVEL: u32 = 15;

/// Highest level of every glue grade.
pub const GLUE_MAX_LEVEL: u32 = 5;

/// Highest reachable grade.
pub const MAX_GRADE: u32 = 3;

/// Progress margin before the last path cell inside which enemies are no longer targeted.
pub const EXIT_TARGETING_MARGIN: f64 = 1.5;

/// Hit radius scale for projectiles looking for their first target.
pub const ACQUIRE_RADIUS_SCALE: f64 = 1.25;

/// Hit radius scale once a locked target already died.
pub const FALLEN_RADIUS_SCALE: f64 = 1.65;

/// Margin around the board beyond which projectiles are discarded.
pub const BOARD_MARGIN: f64 = 1.0;
