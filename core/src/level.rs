//! Static level description consumed by the engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{CellCoord, EnemyKind, TurretKind};

/// Complete static configuration of a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDefinition {
    /// Engine version the level and its action logs were recorded with.
    pub engine_version: String,
    /// Board, economy and pacing configuration.
    pub game_config: GameConfig,
    /// Base attributes of every enemy family used by the waves.
    pub enemies_data: BTreeMap<EnemyKind, EnemyAttributes>,
    /// Base price of every buildable turret family.
    pub turrets_data: BTreeMap<TurretKind, TurretAttributes>,
    /// Wave templates, cycled through as rounds progress.
    pub waves_data: Vec<WaveAttributes>,
}

impl LevelDefinition {
    /// Checks the structural requirements the engine relies on.
    pub fn validate(&self) -> Result<(), LevelError> {
        let config = &self.game_config;
        if config.board_size.rows <= 0 || config.board_size.columns <= 0 {
            return Err(LevelError::EmptyBoard);
        }

        if config.enemy_spawning_delta_ticks == 0 {
            return Err(LevelError::ZeroSpawnInterval);
        }

        if config.enemies_path_cells.is_empty() {
            return Err(LevelError::EmptyPath);
        }

        if let Some(cell) = config
            .enemies_path_cells
            .iter()
            .chain(config.plateaus_cells.iter())
            .find(|cell| !config.board_size.contains(**cell))
        {
            return Err(LevelError::CellOutOfBoard { cell: *cell });
        }

        if self.waves_data.is_empty() {
            return Err(LevelError::NoWaves);
        }

        for (index, wave) in self.waves_data.iter().enumerate() {
            if wave.enemies.is_empty() {
                return Err(LevelError::EmptyWave { index });
            }

            if let Some(entry) = wave
                .enemies
                .iter()
                .find(|entry| !self.enemies_data.contains_key(&entry.kind))
            {
                return Err(LevelError::MissingEnemyAttributes { kind: entry.kind });
            }
        }

        Ok(())
    }
}

/// Board, economy and pacing configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    /// Milliseconds per tick for hosts that pace the simulation in real time.
    #[serde(default)]
    pub time_step: u64,
    /// Ticks between two consecutive relative spawn slots.
    pub enemy_spawning_delta_ticks: u64,
    /// Starting credits.
    pub credits: i64,
    /// Starting lives.
    pub lifes: i64,
    /// Board dimensions.
    pub board_size: BoardSize,
    /// Ordered cells enemies walk from entry to exit.
    pub enemies_path_cells: Vec<CellCoord>,
    /// Buildable cells; when empty every non-path cell is buildable.
    #[serde(default)]
    pub plateaus_cells: Vec<CellCoord>,
}

/// Board dimensions measured in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSize {
    /// Number of rows.
    #[serde(rename = "r")]
    pub rows: i32,
    /// Number of columns.
    #[serde(rename = "c")]
    pub columns: i32,
}

impl BoardSize {
    /// Reports whether the cell lies on the board.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.row() >= 0 && cell.column() >= 0 && cell.row() < self.rows && cell.column() < self.columns
    }
}

/// Base attributes of an enemy family.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyAttributes {
    /// Life before difficulty scaling.
    pub life: f64,
    /// Cells travelled per tick.
    pub speed: f64,
    /// Credits awarded before reward scaling.
    pub value: i64,
}

/// Base attributes of a turret family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurretAttributes {
    /// Construction price.
    pub price: i64,
}

/// Template of a wave.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveAttributes {
    /// Credits granted on top of the early-completion bonus.
    pub wave_reward: i64,
    /// Replicas added per completed cycle through the templates.
    pub extend: u32,
    /// Upper bound of extra replicas.
    pub max_extend: u32,
    /// Enemies in spawn order with their relative spawn slots.
    pub enemies: Vec<WaveEnemy>,
}

/// Entry of a wave template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveEnemy {
    /// Enemy family to spawn.
    #[serde(rename = "type")]
    pub kind: EnemyKind,
    /// Relative spawn slot, scaled by the spawn interval.
    pub t: u64,
}

/// Structural problems that make a level unplayable.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    /// The board has no cells.
    #[error("board must have at least one row and one column")]
    EmptyBoard,
    /// Spawn slots would collapse onto a single tick.
    #[error("enemy spawning interval must be positive")]
    ZeroSpawnInterval,
    /// Enemies have nowhere to walk.
    #[error("enemy path must contain at least one cell")]
    EmptyPath,
    /// A path or plateau cell lies outside the board.
    #[error("cell (r: {}, c: {}) lies outside the board", .cell.row(), .cell.column())]
    CellOutOfBoard {
        /// Offending cell.
        cell: CellCoord,
    },
    /// No wave templates were provided.
    #[error("level must define at least one wave")]
    NoWaves,
    /// A wave template lists no enemies.
    #[error("wave {index} has no enemies")]
    EmptyWave {
        /// Position of the wave in the template list.
        index: usize,
    },
    /// A wave references an enemy family without attributes.
    #[error("no attributes for enemy type {kind:?}")]
    MissingEnemyAttributes {
        /// Enemy family lacking attributes.
        kind: EnemyKind,
    },
}
