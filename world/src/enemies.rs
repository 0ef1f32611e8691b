//! Enemy state and its local per-tick rules.

use siegeline_core::{
    constants::{HEALER_HEALING_TICKS, HEALER_STOP_TICKS, TELEPORT_TICKS},
    fix_number, EnemyAttributes, EnemyId, EnemyKind, EnemySnapshot, Point, TurretKind,
};
use siegeline_system_tower_combat::{resolve_hit, Affinity, HitOutcome};
use siegeline_system_wave_generation::Modifiers;

use crate::path::EnemyPath;

/// What an enemy did during its update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    /// Advanced along the path.
    Moved,
    /// Reached the end of the path.
    Exited,
    /// Stood still, either mid-teleport or resting after a pulse.
    Held,
    /// A healer emitted a healing pulse.
    Healed,
}

#[derive(Clone, Copy, Debug)]
struct GlueDebuff {
    intensity: f64,
    duration: u32,
    elapsed: u32,
}

#[derive(Clone, Copy, Debug, Default)]
struct HealingCycle {
    walked: u32,
    resting: u32,
}

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    pub(crate) life: f64,
    pub(crate) max_life: f64,
    pub(crate) speed: f64,
    pub(crate) value: i64,
    pub(crate) progress: f64,
    pub(crate) position: Point,
    pub(crate) has_been_teleported: bool,
    glued: bool,
    glue_intensity: f64,
    glue_bullet: Option<GlueDebuff>,
    teleport_ticks: Option<u32>,
    healing: Option<HealingCycle>,
}

impl Enemy {
    pub(crate) fn new(
        id: EnemyId,
        kind: EnemyKind,
        attributes: &EnemyAttributes,
        modifiers: Modifiers,
        start: Point,
    ) -> Self {
        let life = modifiers.scale_life(attributes.life);
        Self {
            id,
            kind,
            life,
            max_life: life,
            speed: attributes.speed,
            value: modifiers.scale_value(attributes.value),
            progress: 0.0,
            position: start,
            has_been_teleported: false,
            glued: false,
            glue_intensity: 0.0,
            glue_bullet: None,
            teleport_ticks: None,
            healing: (kind == EnemyKind::Healer).then(HealingCycle::default),
        }
    }

    pub(crate) fn bounding_radius(&self) -> f64 {
        self.kind.bounding_radius()
    }

    pub(crate) fn is_teleporting(&self) -> bool {
        self.teleport_ticks.is_some()
    }

    /// Advances the enemy by one tick.
    pub(crate) fn update(&mut self, path: &EnemyPath) -> Step {
        if let Some(elapsed) = self.teleport_ticks.as_mut() {
            *elapsed += 1;
            if *elapsed >= TELEPORT_TICKS {
                self.teleport_ticks = None;
            }
            return Step::Held;
        }

        if let Some(cycle) = self.healing.as_mut() {
            if cycle.resting > 0 {
                cycle.resting -= 1;
                return Step::Held;
            }

            cycle.walked += 1;
            if cycle.walked >= HEALER_HEALING_TICKS {
                cycle.walked = 0;
                cycle.resting = HEALER_STOP_TICKS;
                return Step::Healed;
            }
        }

        let speed = self.current_speed();
        self.progress = fix_number(self.progress + speed);

        if self.progress >= path.exit_progress() {
            self.position = path.exit_point();
            return Step::Exited;
        }

        if let Some(position) = path.position(self.progress) {
            self.position = position;
        }
        Step::Moved
    }

    // The glue bullet debuff overrides the puddle slowdown and counts down
    // only while the enemy walks.
    fn current_speed(&mut self) -> f64 {
        let mut speed = self.speed;
        if self.glued {
            speed = fix_number(self.speed / self.glue_intensity);
        }

        if let Some(debuff) = self.glue_bullet.as_mut() {
            speed = fix_number(self.speed / debuff.intensity);
            debuff.elapsed += 1;
            if debuff.elapsed >= debuff.duration {
                self.glue_bullet = None;
            }
        }

        speed
    }

    /// Where the enemy will be after `ticks` more ticks at its puddle speed.
    pub(crate) fn predicted_position(&self, path: &EnemyPath, ticks: u64) -> Option<Point> {
        let speed = if self.glued {
            fix_number(self.speed / self.glue_intensity)
        } else {
            self.speed
        };

        path.position(fix_number(self.progress + speed * ticks as f64))
    }

    pub(crate) fn hit(&mut self, damage: f64, source: TurretKind) -> Option<HitOutcome> {
        let outcome = resolve_hit(self.life, damage, Affinity::of(self.kind, source))?;
        self.life = outcome.life;
        Some(outcome)
    }

    pub(crate) fn restore_health(&mut self) {
        self.life = (self.life + fix_number(self.max_life / 20.0)).min(self.max_life);
    }

    pub(crate) fn teleport(&mut self, distance: f64, path: &EnemyPath) {
        self.has_been_teleported = true;
        self.teleport_ticks = Some(0);
        self.progress = (self.progress - distance).max(0.0);

        if let Some(position) = path.position(self.progress) {
            self.position = position;
        }
    }

    pub(crate) fn hit_by_glue_bullet(&mut self, intensity: f64, duration: u32) {
        self.glue_bullet = Some(GlueDebuff {
            intensity,
            duration,
            elapsed: 0,
        });
    }

    pub(crate) fn glue(&mut self, intensity: f64) {
        self.glued = true;
        self.glue_intensity = intensity;
    }

    pub(crate) fn unglue(&mut self) {
        self.glued = false;
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            progress: self.progress,
            life: self.life,
            max_life: self.max_life,
            speed: self.speed,
            value: self.value,
            teleporting: self.is_teleporting(),
            has_been_teleported: self.has_been_teleported,
            glued: self.glued,
            glue_bullet: self.glue_bullet.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siegeline_core::CellCoord;

    #[test]
    fn walker_exits_at_the_last_cell_corner() {
        let path = straight(3);
        let mut enemy = enemy(EnemyKind::Soldier, 1.0);

        assert_eq!(enemy.update(&path), Step::Moved);
        assert_eq!(enemy.position, Point::new(1.5, 0.5));
        assert_eq!(enemy.update(&path), Step::Exited);
        assert_eq!(enemy.position, Point::new(2.0, 0.0));
    }

    #[test]
    fn glue_bullet_overrides_puddle_and_expires() {
        let path = straight(20);
        let mut enemy = enemy(EnemyKind::Soldier, 1.0);
        enemy.glue(2.0);
        enemy.hit_by_glue_bullet(4.0, 2);

        let _ = enemy.update(&path);
        assert_eq!(enemy.progress, 0.25);
        let _ = enemy.update(&path);
        assert_eq!(enemy.progress, 0.5);
        let _ = enemy.update(&path);
        assert_eq!(enemy.progress, 1.0, "puddle slowdown applies once the debuff expired");
    }

    #[test]
    fn teleport_pushes_back_and_freezes() {
        let path = straight(20);
        let mut enemy = enemy(EnemyKind::Soldier, 1.0);
        enemy.progress = 3.0;
        enemy.teleport(15.0, &path);

        assert_eq!(enemy.progress, 0.0);
        assert!(enemy.snapshot().teleporting);
        for _ in 0..TELEPORT_TICKS {
            assert_eq!(enemy.update(&path), Step::Held);
        }
        assert!(!enemy.is_teleporting());
        assert_eq!(enemy.update(&path), Step::Moved);
        assert!(enemy.has_been_teleported);
    }

    #[test]
    fn healer_pulses_then_rests() {
        let path = straight(1000);
        let mut healer = enemy(EnemyKind::Healer, 0.01);

        for _ in 1..HEALER_HEALING_TICKS {
            assert_eq!(healer.update(&path), Step::Moved);
        }
        assert_eq!(healer.update(&path), Step::Healed);
        for _ in 0..HEALER_STOP_TICKS {
            assert_eq!(healer.update(&path), Step::Held);
        }
        assert_eq!(healer.update(&path), Step::Moved);
    }

    #[test]
    fn restoring_health_caps_at_max() {
        let mut enemy = enemy(EnemyKind::Soldier, 1.0);
        enemy.life = 4.0;
        enemy.restore_health();
        assert_eq!(enemy.life, 4.5);
        enemy.life = 9.9;
        enemy.restore_health();
        assert_eq!(enemy.life, 10.0);
    }

    #[test]
    fn fliers_take_triple_laser_damage() {
        let mut flier = enemy(EnemyKind::Flier, 1.0);
        let outcome = flier.hit(2.0, TurretKind::Laser).expect("alive");
        assert_eq!(outcome.life, 4.0);
        assert_eq!(flier.hit(5.0, TurretKind::Laser).map(|hit| hit.killed), Some(true));
        assert_eq!(flier.hit(5.0, TurretKind::Laser), None);
    }

    fn straight(length: i32) -> EnemyPath {
        EnemyPath::new((0..length).map(|column| CellCoord::new(0, column)).collect())
            .expect("non-empty path")
    }

    fn enemy(kind: EnemyKind, speed: f64) -> Enemy {
        let attributes = EnemyAttributes {
            life: 10.0,
            speed,
            value: 5,
        };
        Enemy::new(
            EnemyId::new(0),
            kind,
            &attributes,
            Modifiers::default(),
            Point::new(0.5, 0.5),
        )
    }
}
