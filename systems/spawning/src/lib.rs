#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawn schedule that hands out due enemies in tick order.
//!
//! Wave generation produces batches of [`ScheduledSpawn`] entries. The
//! schedule merges every batch into the pending queue with a stable merge
//! sort keyed on the scheduled tick, so entries sharing a tick leave the queue
//! in the order they were scheduled: older batches first, and template order
//! within a batch.

use std::collections::VecDeque;

use siegeline_core::{merge_sort, ScheduledSpawn};

/// Pending enemy spawns ordered by scheduled tick.
#[derive(Debug, Default)]
pub struct Spawning {
    pending: VecDeque<ScheduledSpawn>,
}

impl Spawning {
    /// Creates an empty schedule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a freshly generated batch into the pending schedule.
    pub fn schedule(&mut self, batch: Vec<ScheduledSpawn>) {
        if batch.is_empty() {
            return;
        }

        let mut combined: Vec<ScheduledSpawn> = std::mem::take(&mut self.pending).into();
        combined.extend(batch);
        self.pending = merge_sort(combined, |left, right| left.tick < right.tick).into();
    }

    /// Pops the next enemy whose scheduled tick is not after `tick`.
    ///
    /// Returns `None` once no pending entry is due.
    pub fn next_due(&mut self, tick: u64) -> Option<ScheduledSpawn> {
        match self.pending.front() {
            Some(entry) if entry.tick <= tick => self.pending.pop_front(),
            _ => None,
        }
    }

    /// Iterator over the pending entries in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &ScheduledSpawn> {
        self.pending.iter()
    }

    /// Number of pending entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Reports whether no spawns are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siegeline_core::EnemyKind;

    #[test]
    fn empty_batch_leaves_schedule_untouched() {
        let mut spawning = Spawning::new();
        spawning.schedule(vec![ScheduledSpawn {
            kind: EnemyKind::Soldier,
            tick: 3,
        }]);
        spawning.schedule(Vec::new());
        assert_eq!(spawning.len(), 1);
    }

    #[test]
    fn nothing_is_due_before_its_tick() {
        let mut spawning = Spawning::new();
        spawning.schedule(vec![ScheduledSpawn {
            kind: EnemyKind::Runner,
            tick: 5,
        }]);

        assert_eq!(spawning.next_due(4), None);
        assert_eq!(
            spawning.next_due(5).map(|entry| entry.kind),
            Some(EnemyKind::Runner)
        );
        assert!(spawning.is_empty());
    }
}
