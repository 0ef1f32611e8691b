use std::error::Error as _;

use serde_json::json;
use siegeline_core::{LevelDefinition, Rejection, TurretId};
use siegeline_runner::{ActionLog, Progress, ReplayError, RunSummary, Runner};

#[test]
fn five_cell_path_runs_to_game_over() {
    let runner = Runner::new(level(1));
    let summary = runner
        .run(&five_cell_actions(), None)
        .expect("the only life leaks on the first enemy");

    assert_eq!(summary.score, 5);
    assert_eq!(summary.lives, 0);
    assert_eq!(summary.round, 1);
    assert_eq!(summary.credits, 500 - 50);
    assert_eq!(summary.digest.len(), 64);
}

#[test]
fn replays_are_reproducible() {
    let runner = Runner::new(level(1));
    let first: RunSummary = runner.run(&five_cell_actions(), None).expect("game over");
    let second: RunSummary = runner.run(&five_cell_actions(), None).expect("game over");
    assert_eq!(first, second);
}

#[test]
fn surviving_the_log_is_a_failure() {
    let runner = Runner::new(level(10));
    let error = runner
        .run(&five_cell_actions(), None)
        .expect_err("lives remain after the wave");

    match error {
        ReplayError::NoGameOver { score, lives } => {
            assert!(score >= 0);
            assert!(lives > 0);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn version_mismatch_is_checked_first() {
    let mut level = level(1);
    level.engine_version = "0.9.0".to_owned();

    let error = Runner::new(level)
        .run(&ActionLog::default(), None)
        .expect_err("old level");
    assert!(matches!(error, ReplayError::VersionMismatch { .. }));
}

#[test]
fn empty_or_missing_logs_are_refused() {
    let runner = Runner::new(level(1));
    assert!(matches!(
        runner.run(&ActionLog::default(), None),
        Err(ReplayError::EmptyActionLog)
    ));
    assert!(matches!(
        runner.run(&log(json!({ "actions": [] })), None),
        Err(ReplayError::EmptyActionLog)
    ));
}

#[test]
fn ticks_must_not_go_backwards() {
    let runner = Runner::new(level(10));
    let actions = log(json!({ "actions": [
        { "tick": 5, "type": "launch-wave" },
        { "tick": 3, "type": "change-strategy", "id": 0 }
    ]}));

    assert!(matches!(
        runner.run(&actions, None),
        Err(ReplayError::TickOrder {
            index: 1,
            tick: 3,
            current: 5
        })
    ));
}

#[test]
fn unknown_types_and_bad_payloads_are_protocol_errors() {
    let runner = Runner::new(level(10));

    let unknown = log(json!({ "actions": [{ "tick": 0, "type": "build-castle" }] }));
    match runner.run(&unknown, None) {
        Err(ReplayError::UnknownActionType { index, name }) => {
            assert_eq!(index, 0);
            assert_eq!(name, "build-castle");
        }
        other => panic!("unexpected {other:?}"),
    }

    let missing = log(json!({
        "actions": [{ "tick": 0, "type": "add-turret", "turretType": "laser" }]
    }));
    let error = runner.run(&missing, None).expect_err("no position");
    assert!(matches!(error, ReplayError::InvalidActionValue { index: 0, .. }));
    assert!(error.source().is_some());
}

#[test]
fn rejected_commands_abort_the_replay() {
    let runner = Runner::new(level(10));
    let actions = log(json!({ "actions": [{ "tick": 4, "type": "sell-turret", "id": 9 }] }));

    let error = runner.run(&actions, None).expect_err("turret 9 was never built");
    let rejection = error
        .source()
        .and_then(|source| source.downcast_ref::<Rejection>())
        .cloned();
    assert_eq!(
        rejection,
        Some(Rejection::TurretNotFound {
            id: TurretId::new(9)
        })
    );
    assert!(matches!(
        error,
        ReplayError::Rejected {
            index: 0,
            tick: 4,
            action_type: "sell-turret",
            ..
        }
    ));
}

#[test]
fn progress_reports_every_hundred_ticks_before_actions() {
    let runner = Runner::new(level(10));
    let actions = log(json!({ "actions": [
        { "tick": 0, "type": "launch-wave" },
        { "tick": 250, "type": "add-turret", "turretType": "laser", "position": { "r": 2, "c": 0 } }
    ]}));

    let mut reports: Vec<Progress> = Vec::new();
    let mut collect = |progress: &Progress| reports.push(*progress);
    let result = runner.run(&actions, Some(&mut collect));
    assert!(matches!(result, Err(ReplayError::NoGameOver { .. })));

    let ticks: Vec<u64> = reports.iter().map(|report| report.tick_count).collect();
    assert_eq!(ticks, vec![100, 200]);
    assert!(reports
        .iter()
        .all(|report| report.last_action_tick == Some(250)));
    assert_eq!(reports[0].timestamp, 100 * 100);
}

#[test]
fn progress_timestamps_saturate_on_huge_time_steps() {
    let mut level = level(10);
    level.game_config.time_step = u64::MAX / 2;
    let actions = log(json!({ "actions": [
        { "tick": 0, "type": "launch-wave" },
        { "tick": 150, "type": "change-strategy", "id": 0 }
    ]}));

    let mut reports: Vec<Progress> = Vec::new();
    let mut collect = |progress: &Progress| reports.push(*progress);
    let result = Runner::new(level).run(&actions, Some(&mut collect));

    assert!(matches!(
        result,
        Err(ReplayError::Rejected {
            index: 1,
            tick: 150,
            ..
        })
    ));
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].timestamp, u64::MAX);
}

fn five_cell_actions() -> ActionLog {
    log(json!({ "actions": [
        {
            "tick": 1,
            "type": "add-turret",
            "turretType": "projectile",
            "position": { "r": 0, "c": 2 }
        },
        { "tick": 2, "type": "launch-wave" }
    ]}))
}

fn log(value: serde_json::Value) -> ActionLog {
    serde_json::from_value(value).expect("valid action log")
}

fn level(lives: i64) -> LevelDefinition {
    serde_json::from_value(json!({
        "engineVersion": "1.0.0",
        "gameConfig": {
            "timeStep": 100,
            "enemySpawningDeltaTicks": 5,
            "credits": 500,
            "lifes": lives,
            "boardSize": { "r": 3, "c": 5 },
            "enemiesPathCells": [
                { "r": 1, "c": 0 }, { "r": 1, "c": 1 }, { "r": 1, "c": 2 },
                { "r": 1, "c": 3 }, { "r": 1, "c": 4 }
            ]
        },
        "enemiesData": {
            "soldier": { "life": 10, "speed": 1, "value": 5 }
        },
        "turretsData": {
            "projectile": { "price": 50 },
            "laser": { "price": 80 }
        },
        "wavesData": [{
            "waveReward": 20,
            "extend": 0,
            "maxExtend": 0,
            "enemies": [
                { "type": "soldier", "t": 0 },
                { "type": "soldier", "t": 1 }
            ]
        }]
    }))
    .expect("valid level")
}
