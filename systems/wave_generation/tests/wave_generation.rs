use std::collections::BTreeMap;

use siegeline_core::{
    constants::MIN_REWARD_MODIFIER, EnemyAttributes, EnemyKind, ScheduledSpawn, WaveAttributes,
    WaveEnemy,
};
use siegeline_system_wave_generation::{early_bonus, Modifiers, WaveGeneration, WaveRequest};

#[test]
fn first_round_schedules_template_after_current_tick() {
    let mut generation = WaveGeneration::new();
    let plan = generation
        .generate(request(0, 40, 0), &waves(), &enemies())
        .expect("templates exist");

    assert_eq!(
        plan.spawns,
        vec![
            ScheduledSpawn {
                kind: EnemyKind::Soldier,
                tick: 41,
            },
            ScheduledSpawn {
                kind: EnemyKind::Runner,
                tick: 71,
            },
        ],
        "relative slots scale by the spawn interval and start one tick later"
    );
    assert_eq!(plan.wave_reward, 25);
    assert_eq!(plan.reward, 15, "values are 5 and 10 with a unit reward modifier");
}

#[test]
fn later_cycles_replicate_the_template() {
    let mut generation = WaveGeneration::new();
    let plan = generation
        .generate(request(4, 0, 0), &waves(), &enemies())
        .expect("templates exist");

    let ticks: Vec<u64> = plan.spawns.iter().map(|spawn| spawn.tick).collect();
    assert_eq!(
        ticks,
        vec![1, 31, 51, 81, 101, 131],
        "two cycles with extend 1 add two replicas offset by the last slot plus the gap"
    );
}

#[test]
fn replicas_are_capped_by_max_extend() {
    let mut generation = WaveGeneration::new();
    let plan = generation
        .generate(request(40, 0, 0), &waves(), &enemies())
        .expect("templates exist");

    assert_eq!(plan.spawns.len(), 2 * (1 + 3));
}

#[test]
fn rounds_cycle_through_templates() {
    let mut generation = WaveGeneration::new();
    let plan = generation
        .generate(request(1, 0, 0), &waves(), &enemies())
        .expect("templates exist");

    assert_eq!(plan.wave_reward, 40);
    assert!(plan
        .spawns
        .iter()
        .all(|spawn| spawn.kind == EnemyKind::Blob));
}

#[test]
fn distant_slots_saturate_instead_of_overflowing() {
    let mut waves = waves();
    waves[0].enemies[1].t = u64::MAX - 1;

    let mut generation = WaveGeneration::new();
    let plan = generation
        .generate(request(2, 0, 0), &waves, &enemies())
        .expect("templates exist");

    let ticks: Vec<u64> = plan.spawns.iter().map(|spawn| spawn.tick).collect();
    assert_eq!(ticks, vec![1, u64::MAX, u64::MAX, u64::MAX]);
}

#[test]
fn no_templates_produce_no_plan() {
    let mut generation = WaveGeneration::new();
    assert!(generation
        .generate(request(0, 0, 0), &[], &enemies())
        .is_none());
}

#[test]
fn experienced_players_face_tougher_and_richer_waves() {
    let modifiers = Modifiers::derive(1_000, 2_000.0);
    assert!(
        modifiers.health > 10.0 && modifiers.health < 10.5,
        "unexpected health modifier {}",
        modifiers.health
    );
    assert!(modifiers.reward > MIN_REWARD_MODIFIER);

    let balanced = Modifiers::derive(1_000, 40_802.0);
    assert_eq!(balanced.health, 0.5);
}

#[test]
fn early_bonus_grows_with_remaining_reward() {
    assert_eq!(early_bonus(10, 100), 58);
    assert!(early_bonus(10, 1_000) > early_bonus(10, 100));
}

fn request(round: u32, tick: u64, credits_earned: i64) -> WaveRequest {
    WaveRequest {
        round,
        tick,
        spawn_interval: 10,
        credits_earned,
    }
}

fn waves() -> Vec<WaveAttributes> {
    vec![
        WaveAttributes {
            wave_reward: 25,
            extend: 1,
            max_extend: 3,
            enemies: vec![
                WaveEnemy {
                    kind: EnemyKind::Soldier,
                    t: 0,
                },
                WaveEnemy {
                    kind: EnemyKind::Runner,
                    t: 3,
                },
            ],
        },
        WaveAttributes {
            wave_reward: 40,
            extend: 2,
            max_extend: 4,
            enemies: vec![WaveEnemy {
                kind: EnemyKind::Blob,
                t: 0,
            }],
        },
    ]
}

fn enemies() -> BTreeMap<EnemyKind, EnemyAttributes> {
    let mut table = BTreeMap::new();
    let _ = table.insert(
        EnemyKind::Soldier,
        EnemyAttributes {
            life: 100.0,
            speed: 0.1,
            value: 5,
        },
    );
    let _ = table.insert(
        EnemyKind::Runner,
        EnemyAttributes {
            life: 60.0,
            speed: 0.2,
            value: 10,
        },
    );
    let _ = table.insert(
        EnemyKind::Blob,
        EnemyAttributes {
            life: 300.0,
            speed: 0.05,
            value: 15,
        },
    );
    table
}
