#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Siegeline simulator.
//!
//! This crate defines the message surface that connects the replay runner,
//! the authoritative engine, and the pure systems. Hosts submit [`Command`]
//! values describing desired mutations, the engine executes those commands
//! through its `apply` entry point and reports a [`CommandOutcome`] or a
//! [`Rejection`], and every tick step broadcasts [`Event`] values describing
//! what happened. Systems consume immutable snapshots such as
//! [`EnemySnapshot`] and never touch engine state directly.

use serde::{Deserialize, Serialize};

pub mod constants;
mod level;
mod math;

pub use level::{
    BoardSize, EnemyAttributes, GameConfig, LevelDefinition, LevelError, TurretAttributes,
    WaveAttributes, WaveEnemy,
};
pub use math::{
    fix_number, merge_sort, point_in_circle, point_on_segment, round_half_up,
    segment_intersects_circle, Point,
};

/// Version tag every level definition must carry to be replayed by this engine.
pub const ENGINE_VERSION: &str = "1.0.0";

/// Commands that express all permissible engine mutations.
///
/// The serialized form matches the action log wire format: a `type` tag in
/// kebab case followed by the type-specific payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Command {
    /// Launches the next wave of enemies once the cooldown elapsed.
    LaunchWave,
    /// Requests construction of a turret on a buildable cell.
    AddTurret {
        /// Name of the turret family to construct.
        #[serde(rename = "turretType")]
        turret_type: String,
        /// Cell the turret should occupy.
        position: CellCoord,
    },
    /// Requests that a turret be sold for its current sell value.
    SellTurret {
        /// Identifier of the turret to sell.
        id: TurretId,
    },
    /// Requests that a turret advance to its next grade.
    UpgradeTurret {
        /// Identifier of the turret to upgrade.
        id: TurretId,
    },
    /// Requests that a turret advance to its next level within the grade.
    LevelUpTurret {
        /// Identifier of the turret to improve.
        id: TurretId,
    },
    /// Cycles the turret to the next shooting strategy.
    ChangeStrategy {
        /// Identifier of the turret whose strategy changes.
        id: TurretId,
    },
    /// Toggles whether the turret keeps following its current target.
    ChangeFixedTarget {
        /// Identifier of the turret whose fixed-target flag flips.
        id: TurretId,
    },
}

impl Command {
    /// Wire names of every action type accepted in an action log.
    pub const TYPE_NAMES: [&'static str; 7] = [
        "launch-wave",
        "add-turret",
        "sell-turret",
        "upgrade-turret",
        "level-up-turret",
        "change-strategy",
        "change-fixed-target",
    ];

    /// Wire name of the command's action type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::LaunchWave => Self::TYPE_NAMES[0],
            Self::AddTurret { .. } => Self::TYPE_NAMES[1],
            Self::SellTurret { .. } => Self::TYPE_NAMES[2],
            Self::UpgradeTurret { .. } => Self::TYPE_NAMES[3],
            Self::LevelUpTurret { .. } => Self::TYPE_NAMES[4],
            Self::ChangeStrategy { .. } => Self::TYPE_NAMES[5],
            Self::ChangeFixedTarget { .. } => Self::TYPE_NAMES[6],
        }
    }
}

/// Single entry of a recorded action log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Tick at which the command must be dispatched.
    pub tick: u64,
    /// Command dispatched once the engine reaches `tick`.
    #[serde(flatten)]
    pub command: Command,
}

/// Events broadcast by the engine while processing ticks.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Lives dropped to zero; emitted exactly once per run.
    GameOver,
    /// Every enemy of the active wave was handled and the field is clear.
    WaveOver {
        /// Number of waves launched so far.
        round: u32,
    },
    /// The launch cooldown elapsed and the next wave may be launched.
    ActiveNextWave,
    /// A new wave was merged into the spawn schedule.
    WaveLaunched {
        /// Number of waves launched so far, including this one.
        round: u32,
        /// Number of enemies the wave added to the schedule.
        enemies: usize,
        /// Early-completion bonus paid out when the wave was launched.
        bonus_paid: i64,
    },
    /// The last enemy left the field after every scheduled enemy spawned.
    NoEnemiesOnStage {
        /// Early-completion bonus credited to the player.
        bonus: i64,
    },
    /// An enemy entered the path.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Kind of the spawned enemy.
        kind: EnemyKind,
        /// First cell of the path.
        cell: CellCoord,
    },
    /// An enemy's life reached zero.
    EnemyKilled {
        /// Identifier of the killed enemy.
        enemy: EnemyId,
        /// Credits awarded for the kill.
        value: i64,
    },
    /// An enemy reached the end of the path and cost a life.
    EnemyReachedExit {
        /// Identifier of the escaping enemy.
        enemy: EnemyId,
    },
    /// Damage was applied to one or more enemies.
    EnemyHit {
        /// Enemies that received damage, in application order.
        enemies: Vec<EnemyId>,
        /// Turret credited with the damage.
        turret: TurretId,
    },
    /// A glue bullet slowed an enemy.
    EnemyGlueHit {
        /// Identifier of the slowed enemy.
        enemy: EnemyId,
        /// Identifier of the glue bullet that hit.
        bullet: BulletId,
    },
    /// A projectile turret fired a bullet.
    BulletShot {
        /// Identifier assigned to the bullet.
        bullet: BulletId,
        /// Turret that fired.
        turret: TurretId,
    },
    /// A glue turret fired a glue bullet.
    GlueBulletShot {
        /// Identifier assigned to the glue bullet.
        bullet: BulletId,
        /// Turret that fired.
        turret: TurretId,
    },
    /// A glue turret dropped a glue puddle.
    GlueShot {
        /// Identifier assigned to the puddle.
        glue: GlueId,
        /// Turret that dropped it.
        turret: TurretId,
    },
    /// A launch turret fired a mortar.
    MortarShot {
        /// Identifier assigned to the mortar.
        mortar: MortarId,
        /// Turret that fired.
        turret: TurretId,
    },
    /// A launch turret laid a mine.
    MineShot {
        /// Identifier assigned to the mine.
        mine: MineId,
        /// Turret that fired.
        turret: TurretId,
    },
    /// A laser turret fired its beam.
    LaserShot {
        /// Turret that fired.
        turret: TurretId,
        /// Enemies struck by the beam.
        enemies: Vec<EnemyId>,
    },
    /// A bullet left the board or lost its target without hitting.
    BulletRemoved {
        /// Identifier of the removed bullet.
        bullet: BulletId,
    },
    /// A glue bullet left the board or lost its target without hitting.
    GlueBulletRemoved {
        /// Identifier of the removed glue bullet.
        bullet: BulletId,
    },
    /// A glue puddle dried out.
    GlueConsumed {
        /// Identifier of the consumed puddle.
        glue: GlueId,
    },
    /// Enemies were pushed back along the path by glue turrets.
    EnemiesTeleported {
        /// Teleported enemies, in the order they were flagged.
        enemies: Vec<EnemyId>,
    },
    /// A healer restored health to nearby enemies.
    EnemiesHealed {
        /// Identifier of the healer.
        healer: EnemyId,
        /// Enemies whose life was restored.
        enemies: Vec<EnemyId>,
    },
}

/// Unique identifier assigned to a turret.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TurretId(u32);

impl TurretId {
    /// Creates a new turret identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the turret identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the enemy identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier shared by bullets and glue bullets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BulletId(u32);

impl BulletId {
    /// Creates a new bullet identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the bullet identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a mortar shell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MortarId(u32);

impl MortarId {
    /// Creates a new mortar identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the mortar identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a mine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MineId(u32);

impl MineId {
    /// Creates a new mine identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the mine identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a glue puddle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GlueId(u32);

impl GlueId {
    /// Creates a new glue identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the glue identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single board cell expressed as row and column indices.
///
/// The wire form uses the compact `{"r": .., "c": ..}` layout of level files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    #[serde(rename = "r")]
    row: i32,
    #[serde(rename = "c")]
    column: i32,
}

impl CellCoord {
    /// Creates a new cell coordinate from a row and a column.
    #[must_use]
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Continuous position of the cell's centre.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(f64::from(self.column) + 0.5, f64::from(self.row) + 0.5)
    }
}

/// Enemy families known to the simulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    /// Baseline walker without resistances.
    Soldier,
    /// Fast enemy, weak against explosives and strong against lasers.
    Runner,
    /// Periodically restores the health of nearby enemies.
    Healer,
    /// Bulky enemy, weak against explosives and strong against bullets.
    Blob,
    /// Flying enemy that ignores glue puddles.
    Flier,
}

impl EnemyKind {
    /// Radius of the enemy's collision circle measured in cells.
    #[must_use]
    pub const fn bounding_radius(self) -> f64 {
        match self {
            Self::Runner => 0.5,
            _ => 0.475,
        }
    }

    /// Reports whether glue puddles can slow the enemy.
    #[must_use]
    pub const fn walks(self) -> bool {
        !matches!(self, Self::Flier)
    }
}

/// Turret families that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurretKind {
    /// Fires bullets that hit a single enemy.
    Projectile,
    /// Hits enemies instantly with a beam.
    Laser,
    /// Lobs mortars or lays mines that damage an area.
    Launch,
    /// Slows or teleports enemies instead of damaging them.
    Glue,
}

impl TurretKind {
    /// Every turret family in declaration order.
    pub const ALL: [Self; 4] = [Self::Projectile, Self::Laser, Self::Launch, Self::Glue];

    /// Wire name used by action logs and level files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Projectile => "projectile",
            Self::Laser => "laser",
            Self::Launch => "launch",
            Self::Glue => "glue",
        }
    }

    /// Resolves a wire name into a turret family.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

/// Ordering a turret applies to the enemies within its range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Furthest along the path first.
    #[default]
    First,
    /// Least along the path first.
    Last,
    /// Nearest to the turret first.
    Closest,
    /// Lowest remaining life first.
    Weakest,
    /// Highest remaining life first.
    Strongest,
}

impl Strategy {
    /// Strategy selected after this one when a turret cycles strategies.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::First => Self::Last,
            Self::Last => Self::Closest,
            Self::Closest => Self::Weakest,
            Self::Weakest => Self::Strongest,
            Self::Strongest => Self::First,
        }
    }
}

/// Reasons a command may be rejected by the engine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The cell is off the board, on the path, occupied, or not buildable.
    #[error("invalid position for adding turret (r: {}, c: {})", .position.row(), .position.column())]
    InvalidTurretPosition {
        /// Cell requested for the turret.
        position: CellCoord,
    },
    /// No turret family carries the provided name.
    #[error("wrong turret type name '{name}'")]
    UnknownTurretType {
        /// Name supplied by the caller.
        name: String,
    },
    /// No live turret carries the provided identifier.
    #[error("turret '{}' does not exist", .id.get())]
    TurretNotFound {
        /// Identifier supplied by the caller.
        id: TurretId,
    },
    /// The player cannot afford the requested operation.
    #[error("not enough credits")]
    InsufficientCredits,
    /// The turret already reached grade three.
    #[error("can't upgrade the turret '{}' with max grade", .id.get())]
    MaxGradeReached {
        /// Identifier of the turret.
        id: TurretId,
    },
    /// The turret already reached the last level of its grade.
    #[error("can't level up the turret '{}' with max level", .id.get())]
    MaxLevelReached {
        /// Identifier of the turret.
        id: TurretId,
    },
    /// The launch cooldown since the previous wave has not elapsed.
    #[error("wave launched before the cooldown elapsed")]
    WaveCooldown,
}

impl Rejection {
    /// Stable classification of the rejection without its context.
    #[must_use]
    pub const fn kind(&self) -> RejectionKind {
        match self {
            Self::InvalidTurretPosition { .. } => RejectionKind::InvalidTurretPosition,
            Self::UnknownTurretType { .. } => RejectionKind::UnknownTurretType,
            Self::TurretNotFound { .. } => RejectionKind::TurretNotFound,
            Self::InsufficientCredits => RejectionKind::InsufficientCredits,
            Self::MaxGradeReached { .. } => RejectionKind::MaxGradeReached,
            Self::MaxLevelReached { .. } => RejectionKind::MaxLevelReached,
            Self::WaveCooldown => RejectionKind::WaveCooldown,
        }
    }
}

/// Context-free classification of a [`Rejection`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionKind {
    /// See [`Rejection::InvalidTurretPosition`].
    InvalidTurretPosition,
    /// See [`Rejection::UnknownTurretType`].
    UnknownTurretType,
    /// See [`Rejection::TurretNotFound`].
    TurretNotFound,
    /// See [`Rejection::InsufficientCredits`].
    InsufficientCredits,
    /// See [`Rejection::MaxGradeReached`].
    MaxGradeReached,
    /// See [`Rejection::MaxLevelReached`].
    MaxLevelReached,
    /// See [`Rejection::WaveCooldown`].
    WaveCooldown,
}

impl RejectionKind {
    /// Human readable tag for diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidTurretPosition => "invalid turret position",
            Self::UnknownTurretType => "unknown turret type",
            Self::TurretNotFound => "turret not found",
            Self::InsufficientCredits => "insufficient credits",
            Self::MaxGradeReached => "max grade reached",
            Self::MaxLevelReached => "max level reached",
            Self::WaveCooldown => "wave cooldown",
        }
    }
}

/// Successful result of a mutating command.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CommandOutcome {
    /// Turret created by an `AddTurret` command.
    pub turret: Option<TurretSnapshot>,
}

/// Immutable representation of a single turret's state.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TurretSnapshot {
    /// Identifier allocated to the turret.
    pub id: TurretId,
    /// Turret family.
    pub kind: TurretKind,
    /// Cell occupied by the turret.
    pub cell: CellCoord,
    /// Current level within the grade.
    pub level: u32,
    /// Highest level reachable in the current grade.
    pub max_level: u32,
    /// Current grade, from one to three.
    pub grade: u32,
    /// Active shooting strategy.
    pub strategy: Strategy,
    /// Whether the turret keeps following its current target.
    pub fixed_target: bool,
    /// Credits invested into the turret.
    pub value: i64,
    /// Credits refunded when selling the turret.
    pub sell_value: i64,
    /// Total damage the turret inflicted.
    pub inflicted: i64,
    /// Mines the turret has on the board.
    pub mines: u32,
    /// Damage per hit for the current grade and level.
    pub damage: f64,
    /// Reload duration in attribute units.
    pub reload: f64,
    /// Targeting range measured in cells.
    pub range: f64,
    /// Price of the next level.
    pub price_improvement: i64,
    /// Price of the next grade, zero at grade three.
    pub price_upgrade: i64,
}

/// Immutable representation of a single enemy's state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EnemySnapshot {
    /// Identifier allocated to the enemy.
    pub id: EnemyId,
    /// Enemy family.
    pub kind: EnemyKind,
    /// Continuous position on the board.
    pub position: Point,
    /// Progress along the path expressed as a fractional cell index.
    pub progress: f64,
    /// Remaining life.
    pub life: f64,
    /// Life at spawn time.
    pub max_life: f64,
    /// Base speed in cells per tick.
    pub speed: f64,
    /// Credits awarded for the kill.
    pub value: i64,
    /// Whether the enemy is mid-teleport and untargetable.
    pub teleporting: bool,
    /// Whether the enemy was teleported at least once.
    pub has_been_teleported: bool,
    /// Whether a glue puddle currently slows the enemy.
    pub glued: bool,
    /// Whether a glue bullet debuff is active.
    pub glue_bullet: bool,
}

/// Scalar state of the engine exposed to hosts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GameSnapshot {
    /// Number of completed ticks.
    pub tick: u64,
    /// Spendable credits.
    pub credits: i64,
    /// Credits earned through kills and bonuses.
    pub credits_earned: i64,
    /// Remaining lives.
    pub lives: i64,
    /// Accumulated score.
    pub score: i64,
    /// Number of launched waves.
    pub round: u32,
    /// Pending early-completion bonus.
    pub bonus: i64,
    /// Whether a wave is in progress.
    pub wave_activated: bool,
    /// Whether the next wave may be launched.
    pub can_launch_next_wave: bool,
    /// Whether lives ran out.
    pub game_over: bool,
}

/// Pending enemy spawn produced by wave generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduledSpawn {
    /// Enemy family to spawn.
    pub kind: EnemyKind,
    /// Absolute tick at which the enemy enters the path.
    pub tick: u64,
}
