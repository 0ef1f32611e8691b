#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Replay validator that drives the engine from a recorded action log.
//!
//! A replay is only accepted when every action is well formed, dispatched in
//! non-decreasing tick order, accepted by the engine, and the log drives the
//! run all the way to game over. Any violation aborts the whole replay; no
//! action is ever skipped.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use siegeline_core::{
    constants::PROGRESS_INTERVAL, Action, Command, Event, GameSnapshot, LevelDefinition,
    LevelError, Rejection, ENGINE_VERSION,
};
use siegeline_world::{apply, query, Engine};
use tracing::{info, trace, warn};

/// Recorded player actions in dispatch order.
///
/// Entries stay raw JSON so that malformed actions are reported with their
/// position in the log instead of failing the whole file at parse time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionLog {
    /// Actions to replay; a missing list is a replay error.
    #[serde(default)]
    pub actions: Option<Vec<Value>>,
}

/// Periodic report handed to the progress callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Simulated milliseconds elapsed, derived from the level's time step.
    pub timestamp: u64,
    /// Engine tick counter.
    pub tick_count: u64,
    /// Tick of the last action in the log, when it carries a valid one.
    pub last_action_tick: Option<u64>,
    /// Current score.
    pub score: i64,
    /// Remaining lives.
    pub lives: i64,
    /// Waves launched so far.
    pub round: u32,
    /// Spendable credits.
    pub credits: i64,
}

/// Outcome of a replay that reached game over.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Final score.
    pub score: i64,
    /// Tick counter when the replay stopped.
    pub tick: u64,
    /// Waves launched.
    pub round: u32,
    /// Credits left.
    pub credits: i64,
    /// Lives left, never positive.
    pub lives: i64,
    /// Hex SHA-256 over the per-tick state trajectory.
    pub digest: String,
}

/// Reasons a replay is refused.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// The level was recorded with another engine version.
    #[error("version mismatch: engine version {engine}, logs version {level}")]
    VersionMismatch {
        /// Version of this engine.
        engine: String,
        /// Version the level carries.
        level: String,
    },
    /// The log has no actions.
    #[error("actions array is empty or missing")]
    EmptyActionLog,
    /// An action has no integral, non-negative tick.
    #[error("action {index} has a missing or non-integer tick")]
    InvalidTick {
        /// Position of the action in the log.
        index: usize,
    },
    /// An action is scheduled before the engine's current tick.
    #[error("action {index} at tick {tick} precedes the current tick {current}")]
    TickOrder {
        /// Position of the action in the log.
        index: usize,
        /// Tick the action asked for.
        tick: u64,
        /// Engine tick when the action was read.
        current: u64,
    },
    /// An action has a missing or unknown type tag.
    #[error("action {index} has a missing or wrong action type '{name}'")]
    UnknownActionType {
        /// Position of the action in the log.
        index: usize,
        /// Type tag found, empty when missing.
        name: String,
    },
    /// An action's payload does not match its type.
    #[error("action {index} of type '{action_type}' has a missing or wrong value")]
    InvalidActionValue {
        /// Position of the action in the log.
        index: usize,
        /// Type tag of the action.
        action_type: String,
        /// Decoding failure.
        source: serde_json::Error,
    },
    /// The level cannot be played.
    #[error("invalid level")]
    Level(#[from] LevelError),
    /// The engine refused an action.
    #[error("action {index} ('{action_type}' at tick {tick}) was rejected")]
    Rejected {
        /// Position of the action in the log.
        index: usize,
        /// Tick the action was dispatched at.
        tick: u64,
        /// Type tag of the action.
        action_type: &'static str,
        /// Engine diagnostic.
        #[source]
        rejection: Rejection,
    },
    /// Every action ran and lives remain.
    #[error("all actions were executed without reaching game over (score {score}, lives {lives})")]
    NoGameOver {
        /// Score when the replay stopped.
        score: i64,
        /// Lives left.
        lives: i64,
    },
}

/// Replays action logs against one level.
#[derive(Clone, Debug)]
pub struct Runner {
    level: LevelDefinition,
}

impl Runner {
    /// Creates a runner for the provided level.
    #[must_use]
    pub fn new(level: LevelDefinition) -> Self {
        Self { level }
    }

    /// Replays `log` from a fresh engine.
    ///
    /// `progress` is invoked every [`PROGRESS_INTERVAL`] ticks while the
    /// engine is advanced towards the next action.
    ///
    /// # Errors
    ///
    /// Returns a [`ReplayError`] for version mismatches, malformed or
    /// out-of-order actions, rejected commands and logs that never reach game
    /// over.
    pub fn run(
        &self,
        log: &ActionLog,
        progress: Option<&mut dyn FnMut(&Progress)>,
    ) -> Result<RunSummary, ReplayError> {
        if self.level.engine_version != ENGINE_VERSION {
            return Err(ReplayError::VersionMismatch {
                engine: ENGINE_VERSION.to_owned(),
                level: self.level.engine_version.clone(),
            });
        }

        let engine = Engine::new(&self.level)?;

        let actions = match log.actions.as_deref() {
            Some(actions) if !actions.is_empty() => actions,
            _ => return Err(ReplayError::EmptyActionLog),
        };

        let mut replay = Replay {
            engine,
            events: Vec::new(),
            trajectory: Sha256::new(),
            time_step: self.level.game_config.time_step,
            last_action_tick: actions
                .last()
                .and_then(|action| action.get("tick"))
                .and_then(Value::as_u64),
            progress,
        };

        for (index, raw) in actions.iter().enumerate() {
            let action = decode(index, raw, replay.game().tick)?;
            replay.advance_to(action.tick);

            let action_type = action.command.type_name();
            if let Err(rejection) = apply(&mut replay.engine, action.command, &mut replay.events) {
                warn!(index, tick = action.tick, action_type, %rejection, "action rejected");
                return Err(ReplayError::Rejected {
                    index,
                    tick: action.tick,
                    action_type,
                    rejection,
                });
            }
            replay.record();

            if replay.game().lives <= 0 {
                break;
            }
        }

        loop {
            let game = replay.game();
            if !game.wave_activated || game.lives <= 0 {
                break;
            }
            replay.step();
        }

        let game = replay.game();
        if game.lives > 0 {
            return Err(ReplayError::NoGameOver {
                score: game.score,
                lives: game.lives,
            });
        }

        info!(score = game.score, tick = game.tick, round = game.round, "replay complete");
        Ok(RunSummary {
            score: game.score,
            tick: game.tick,
            round: game.round,
            credits: game.credits,
            lives: game.lives,
            digest: format!("{:x}", replay.trajectory.finalize()),
        })
    }
}

struct Replay<'a> {
    engine: Engine,
    events: Vec<Event>,
    trajectory: Sha256,
    time_step: u64,
    last_action_tick: Option<u64>,
    progress: Option<&'a mut dyn FnMut(&Progress)>,
}

impl Replay<'_> {
    fn game(&self) -> GameSnapshot {
        query::game(&self.engine)
    }

    /// Ticks towards `tick` while lives remain, reporting progress on the way.
    fn advance_to(&mut self, tick: u64) {
        loop {
            let game = self.game();
            if game.tick >= tick || game.lives <= 0 {
                return;
            }

            self.step();

            let game = self.game();
            if game.tick % PROGRESS_INTERVAL != 0 {
                continue;
            }

            if let Some(callback) = self.progress.as_mut() {
                callback(&Progress {
                    timestamp: game.tick.saturating_mul(self.time_step),
                    tick_count: game.tick,
                    last_action_tick: self.last_action_tick,
                    score: game.score,
                    lives: game.lives,
                    round: game.round,
                    credits: game.credits,
                });
            }
        }
    }

    fn step(&mut self) {
        self.engine.update(&mut self.events);
        trace!(tick = self.game().tick, events = self.events.len(), "tick");
        self.record();
    }

    /// Folds the current state and the events since the last record into the digest.
    fn record(&mut self) {
        let game = self.game();
        for value in [
            game.tick as i64,
            game.credits,
            game.credits_earned,
            game.lives,
            game.score,
            i64::from(game.round),
            game.bonus,
            self.events.len() as i64,
        ] {
            self.trajectory.update(value.to_le_bytes());
        }
        self.events.clear();
    }
}

fn decode(index: usize, raw: &Value, current: u64) -> Result<Action, ReplayError> {
    let tick = raw
        .get("tick")
        .and_then(Value::as_u64)
        .ok_or(ReplayError::InvalidTick { index })?;
    if tick < current {
        return Err(ReplayError::TickOrder {
            index,
            tick,
            current,
        });
    }

    let name = raw.get("type").and_then(Value::as_str).unwrap_or_default();
    if !Command::TYPE_NAMES.contains(&name) {
        return Err(ReplayError::UnknownActionType {
            index,
            name: name.to_owned(),
        });
    }

    serde_json::from_value(raw.clone()).map_err(|source| ReplayError::InvalidActionValue {
        index,
        action_type: name.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_checks_tick_before_type() {
        let raw = json!({ "tick": "soon", "type": "teleport-everyone" });
        assert!(matches!(
            decode(3, &raw, 0),
            Err(ReplayError::InvalidTick { index: 3 })
        ));
    }

    #[test]
    fn decode_accepts_the_current_tick() {
        let raw = json!({ "tick": 7, "type": "change-strategy", "id": 2 });
        let action = decode(0, &raw, 7).expect("same tick is allowed");
        assert_eq!(action.tick, 7);
        assert_eq!(action.command.type_name(), "change-strategy");
    }

    #[test]
    fn decode_reports_missing_type_as_empty_name() {
        let raw = json!({ "tick": 1 });
        match decode(0, &raw, 0) {
            Err(ReplayError::UnknownActionType { name, .. }) => assert!(name.is_empty()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn decode_rejects_negative_ticks() {
        let raw = json!({ "tick": -1, "type": "launch-wave" });
        assert!(matches!(
            decode(0, &raw, 0),
            Err(ReplayError::InvalidTick { index: 0 })
        ));
    }
}
