#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave generation with compounding difficulty scaling.
//!
//! A launch picks the template for the current round, replicates it once the
//! templates have been cycled through, converts relative spawn slots into
//! absolute ticks, and derives the health and reward multipliers applied to
//! every enemy spawned from the wave.

use std::collections::BTreeMap;

use siegeline_core::{
    constants::{
        DIFFICULTY_EXPONENT, DIFFICULTY_LINEAR, DIFFICULTY_MODIFIER, EARLY_BONUS_EXPONENT,
        EARLY_BONUS_MODIFIER, MIN_HEALTH_MODIFIER, MIN_REWARD_MODIFIER, REPLICA_GAP,
        REWARD_EXPONENT, REWARD_MODIFIER,
    },
    fix_number, round_half_up, EnemyAttributes, EnemyKind, ScheduledSpawn, WaveAttributes,
    WaveEnemy,
};

/// Engine state a wave launch depends on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveRequest {
    /// Number of waves launched before this one.
    pub round: u32,
    /// Engine tick at launch time.
    pub tick: u64,
    /// Ticks between two relative spawn slots.
    pub spawn_interval: u64,
    /// Credits earned so far through kills and bonuses.
    pub credits_earned: i64,
}

/// Outcome of a wave launch.
#[derive(Clone, Debug, PartialEq)]
pub struct WavePlan {
    /// Spawns to merge into the pending schedule, in template order.
    pub spawns: Vec<ScheduledSpawn>,
    /// Flat reward of the wave template.
    pub wave_reward: i64,
    /// Multipliers applied to enemies spawned after the launch.
    pub modifiers: Modifiers,
    /// Scaled credits the new enemies are worth in total.
    pub reward: i64,
}

/// Health and reward multipliers derived from the player's earnings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Modifiers {
    /// Multiplier applied to enemy life.
    pub health: f64,
    /// Multiplier applied to enemy value.
    pub reward: f64,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            health: 1.0,
            reward: 1.0,
        }
    }
}

impl Modifiers {
    /// Derives the multipliers for a wave whose enemies total `wave_health`.
    #[must_use]
    pub fn derive(credits_earned: i64, wave_health: f64) -> Self {
        let earned = credits_earned as f64;
        let damage_possible = round_half_up(
            DIFFICULTY_LINEAR * earned + DIFFICULTY_MODIFIER * earned.powf(DIFFICULTY_EXPONENT),
        );

        let ratio = if wave_health > 0.0 {
            fix_number(damage_possible / wave_health)
        } else {
            MIN_HEALTH_MODIFIER
        };
        let health = ratio.max(MIN_HEALTH_MODIFIER);
        let reward = (REWARD_MODIFIER * health.powf(REWARD_EXPONENT)).max(MIN_REWARD_MODIFIER);

        Self { health, reward }
    }

    /// Life of a freshly spawned enemy.
    #[must_use]
    pub fn scale_life(&self, life: f64) -> f64 {
        fix_number(life * self.health)
    }

    /// Credits a freshly spawned enemy is worth.
    #[must_use]
    pub fn scale_value(&self, value: i64) -> i64 {
        round_half_up(value as f64 * self.reward) as i64
    }
}

/// Early-completion bonus for the remaining reward of the active waves.
#[must_use]
pub fn early_bonus(wave_reward: i64, remaining_reward: i64) -> i64 {
    let remaining = remaining_reward.max(0) as f64;
    let scaled = round_half_up(EARLY_BONUS_MODIFIER * remaining.powf(EARLY_BONUS_EXPONENT));
    round_half_up(wave_reward as f64 + scaled) as i64
}

/// Wave generation system that reuses its replica buffer between launches.
#[derive(Debug, Default)]
pub struct WaveGeneration {
    replicas: Vec<WaveEnemy>,
}

impl WaveGeneration {
    /// Creates a new wave generation system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expands the template for `request.round` into a [`WavePlan`].
    ///
    /// Returns `None` when no templates exist.
    pub fn generate(
        &mut self,
        request: WaveRequest,
        waves: &[WaveAttributes],
        enemies: &BTreeMap<EnemyKind, EnemyAttributes>,
    ) -> Option<WavePlan> {
        let count = u32::try_from(waves.len()).ok().filter(|count| *count > 0)?;
        let template = waves.get((request.round % count) as usize)?;

        self.expand(template, request.round / count);

        let wave_health: f64 = self
            .replicas
            .iter()
            .filter_map(|entry| enemies.get(&entry.kind))
            .map(|attributes| attributes.life)
            .sum();
        let modifiers = Modifiers::derive(request.credits_earned, wave_health);

        let reward: i64 = self
            .replicas
            .iter()
            .filter_map(|entry| enemies.get(&entry.kind))
            .map(|attributes| round_half_up(modifiers.reward * attributes.value as f64) as i64)
            .sum();

        let spawns = self
            .replicas
            .iter()
            .map(|entry| ScheduledSpawn {
                kind: entry.kind,
                tick: entry
                    .t
                    .saturating_mul(request.spawn_interval)
                    .saturating_add(request.tick)
                    .saturating_add(1),
            })
            .collect();

        Some(WavePlan {
            spawns,
            wave_reward: template.wave_reward,
            modifiers,
            reward,
        })
    }

    fn expand(&mut self, template: &WaveAttributes, cycles: u32) {
        self.replicas.clear();
        self.replicas.extend_from_slice(&template.enemies);

        let extra = cycles
            .saturating_mul(template.extend)
            .min(template.max_extend);

        for _ in 0..extra {
            let Some(last) = self.replicas.last().map(|entry| entry.t) else {
                break;
            };

            let offset = last.saturating_add(REPLICA_GAP);
            self.replicas
                .extend(template.enemies.iter().map(|entry| WaveEnemy {
                    kind: entry.kind,
                    t: entry.t.saturating_add(offset),
                }));
        }
    }
}
