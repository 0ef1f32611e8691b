//! Bullets, explosives and glue puddles owned by the engine.

use siegeline_core::{
    constants::{ACQUIRE_RADIUS_SCALE, BOARD_MARGIN, FALLEN_RADIUS_SCALE},
    fix_number, segment_intersects_circle, BoardSize, BulletId, EnemyId, GlueId, MineId,
    MortarId, Point, TurretId,
};
use siegeline_system_tower_combat::area_damage;

use crate::enemies::Enemy;

/// Target a direct-fire projectile is committed to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Lock {
    /// Still looking for the first enemy on its course.
    Unassigned,
    /// Locked onto a live enemy.
    Enemy(EnemyId),
    /// The locked enemy left the field; the projectile only expires.
    Fallen { position: Point, radius: f64 },
}

/// Slowdown carried by a glue bullet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct GlueDose {
    pub(crate) intensity: f64,
    pub(crate) duration: u32,
}

/// Direct-fire projectile; `P` is its payload, damage for bullets and a
/// [`GlueDose`] for glue bullets.
#[derive(Clone, Debug)]
pub(crate) struct Bullet<P> {
    pub(crate) id: BulletId,
    pub(crate) turret: TurretId,
    pub(crate) position: Point,
    pub(crate) velocity: Point,
    pub(crate) lock: Lock,
    pub(crate) out_of_bounds: bool,
    pub(crate) payload: P,
}

impl<P> Bullet<P> {
    pub(crate) fn new(
        id: BulletId,
        turret: TurretId,
        origin: Point,
        velocity: Point,
        target: EnemyId,
        payload: P,
    ) -> Self {
        Self {
            id,
            turret,
            position: origin,
            velocity,
            lock: Lock::Enemy(target),
            out_of_bounds: false,
            payload,
        }
    }

    pub(crate) fn update(&mut self, board: BoardSize) {
        self.position = self.next_position();

        let Point { x, y } = self.position;
        let columns = f64::from(board.columns);
        let rows = f64::from(board.rows);
        if x < -BOARD_MARGIN
            || x > columns + BOARD_MARGIN
            || y < -BOARD_MARGIN
            || y > rows + BOARD_MARGIN
        {
            self.out_of_bounds = true;
        }
    }

    fn next_position(&self) -> Point {
        Point::new(
            fix_number(self.position.x + self.velocity.x),
            fix_number(self.position.y + self.velocity.y),
        )
    }

    /// Tests the travel segment of this tick; may lock an unassigned projectile.
    pub(crate) fn collides(&mut self, enemies: &[Enemy]) -> bool {
        if self.out_of_bounds {
            return true;
        }

        let from = self.position;
        let to = self.next_position();

        match self.lock {
            Lock::Enemy(id) => enemies
                .iter()
                .find(|enemy| enemy.id == id)
                .is_some_and(|enemy| {
                    let radius = if enemy.life > 0.0 {
                        enemy.bounding_radius()
                    } else {
                        FALLEN_RADIUS_SCALE * enemy.bounding_radius()
                    };
                    segment_intersects_circle(from, to, enemy.position, radius)
                }),
            Lock::Fallen { position, radius } => {
                segment_intersects_circle(from, to, position, radius)
            }
            Lock::Unassigned => {
                let hit = enemies.iter().find(|enemy| {
                    segment_intersects_circle(
                        from,
                        to,
                        enemy.position,
                        ACQUIRE_RADIUS_SCALE * enemy.bounding_radius(),
                    )
                });

                match hit {
                    Some(enemy) => {
                        self.lock = Lock::Enemy(enemy.id);
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// Releases the lock so the projectile may hit whatever crosses its course.
    pub(crate) fn release(&mut self, enemy: EnemyId) {
        if self.lock == Lock::Enemy(enemy) {
            self.lock = Lock::Unassigned;
        }
    }

    /// Keeps flying towards where `enemy` left the field.
    pub(crate) fn lose(&mut self, enemy: &Enemy, killed: bool) {
        if self.lock != Lock::Enemy(enemy.id) {
            return;
        }

        let scale = if killed { FALLEN_RADIUS_SCALE } else { 1.0 };
        self.lock = Lock::Fallen {
            position: enemy.position,
            radius: scale * enemy.bounding_radius(),
        };
    }

    /// Enemy the projectile will damage when it resolves, if any.
    pub(crate) fn target(&self) -> Option<EnemyId> {
        match self.lock {
            Lock::Enemy(id) if !self.out_of_bounds => Some(id),
            _ => None,
        }
    }
}

/// Area damage of one explosion against the live enemies, in collection order.
pub(crate) fn blast(
    enemies: &[Enemy],
    center: Point,
    damage: f64,
    radius: f64,
    out: &mut Vec<(EnemyId, f64)>,
) {
    out.clear();
    for enemy in enemies.iter().filter(|enemy| enemy.life > 0.0) {
        if let Some(amount) = area_damage(damage, center.distance(enemy.position), radius) {
            out.push((enemy.id, amount));
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Mortar {
    pub(crate) id: MortarId,
    pub(crate) turret: TurretId,
    pub(crate) position: Point,
    pub(crate) damage: f64,
    pub(crate) explosion_range: f64,
    pub(crate) detonate: bool,
    velocity: Point,
    ticks_to_impact: u64,
    elapsed: u64,
}

impl Mortar {
    pub(crate) fn new(
        id: MortarId,
        turret: TurretId,
        origin: Point,
        velocity: Point,
        ticks_to_impact: u64,
        damage: f64,
        explosion_range: f64,
    ) -> Self {
        Self {
            id,
            turret,
            position: origin,
            damage,
            explosion_range,
            detonate: false,
            velocity,
            ticks_to_impact,
            elapsed: 0,
        }
    }

    pub(crate) fn update(&mut self) {
        if self.detonate {
            return;
        }

        self.position = Point::new(
            fix_number(self.position.x + self.velocity.x),
            fix_number(self.position.y + self.velocity.y),
        );
        self.elapsed += 1;
        if self.elapsed >= self.ticks_to_impact {
            self.detonate = true;
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Mine {
    pub(crate) id: MineId,
    pub(crate) turret: TurretId,
    pub(crate) position: Point,
    pub(crate) damage: f64,
    pub(crate) explosion_range: f64,
    pub(crate) armed: bool,
    pub(crate) detonate: bool,
    destination: Point,
    velocity: Point,
    travel_ticks: u64,
    elapsed: u64,
}

impl Mine {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: MineId,
        turret: TurretId,
        origin: Point,
        destination: Point,
        velocity: Point,
        travel_ticks: u64,
        damage: f64,
        explosion_range: f64,
    ) -> Self {
        Self {
            id,
            turret,
            position: origin,
            damage,
            explosion_range,
            armed: false,
            detonate: false,
            destination,
            velocity,
            travel_ticks,
            elapsed: 0,
        }
    }

    pub(crate) fn update(&mut self) {
        if self.armed {
            return;
        }

        self.elapsed += 1;
        if self.elapsed >= self.travel_ticks {
            self.position = self.destination;
            self.armed = true;
        } else {
            self.position = Point::new(
                fix_number(self.position.x + self.velocity.x),
                fix_number(self.position.y + self.velocity.y),
            );
        }
    }

    /// Flags the mine once a live enemy stands inside its blast.
    pub(crate) fn sense(&mut self, enemies: &[Enemy]) {
        if !self.armed || self.detonate {
            return;
        }

        let squared_range = fix_number(self.explosion_range * self.explosion_range);
        self.detonate = enemies.iter().any(|enemy| {
            enemy.life > 0.0 && self.position.squared_distance(enemy.position) <= squared_range
        });
    }
}

/// Puddle that slows walking enemies until it dries out.
#[derive(Clone, Debug)]
pub(crate) struct Glue {
    pub(crate) id: GlueId,
    pub(crate) position: Point,
    pub(crate) intensity: f64,
    pub(crate) consumed: bool,
    squared_radius: f64,
    duration: u32,
    elapsed: u32,
}

impl Glue {
    pub(crate) fn new(
        id: GlueId,
        position: Point,
        intensity: f64,
        radius: f64,
        duration: u32,
    ) -> Self {
        Self {
            id,
            position,
            intensity,
            consumed: false,
            squared_radius: fix_number(radius * radius),
            duration,
            elapsed: 0,
        }
    }

    pub(crate) fn update(&mut self) {
        if self.consumed {
            return;
        }

        self.elapsed += 1;
        if self.elapsed >= self.duration {
            self.consumed = true;
        }
    }

    pub(crate) fn covers(&self, position: Point) -> bool {
        !self.consumed && self.position.squared_distance(position) <= self.squared_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siegeline_core::{EnemyAttributes, EnemyKind};
    use siegeline_system_wave_generation::Modifiers;

    const BOARD: BoardSize = BoardSize { rows: 3, columns: 3 };

    #[test]
    fn bullet_leaving_the_margin_is_flagged() {
        let mut bullet = bullet(Point::new(2.5, 0.5), Point::new(0.85, 0.0));
        bullet.update(BOARD);
        assert!(!bullet.out_of_bounds);
        bullet.update(BOARD);
        assert!(bullet.out_of_bounds);
        assert!(bullet.collides(&[]));
        assert_eq!(bullet.target(), None);
    }

    #[test]
    fn unassigned_bullet_locks_onto_first_enemy_on_course() {
        let enemies = [
            enemy(1, Point::new(5.0, 5.0)),
            enemy(2, Point::new(1.5, 0.5)),
            enemy(3, Point::new(1.2, 0.5)),
        ];
        let mut bullet = bullet(Point::new(0.5, 0.5), Point::new(0.85, 0.0));
        bullet.lock = Lock::Unassigned;

        assert!(bullet.collides(&enemies));
        assert_eq!(bullet.lock, Lock::Enemy(EnemyId::new(2)));
    }

    #[test]
    fn locked_bullet_ignores_other_enemies() {
        let enemies = [enemy(1, Point::new(1.2, 0.5)), enemy(2, Point::new(9.0, 9.0))];
        let mut bullet = bullet(Point::new(0.5, 0.5), Point::new(0.85, 0.0));
        assert!(!bullet.collides(&enemies));
    }

    #[test]
    fn released_and_fallen_locks() {
        let fallen = enemy(2, Point::new(1.2, 0.5));
        let mut bullet = bullet(Point::new(0.5, 0.5), Point::new(0.85, 0.0));

        bullet.release(EnemyId::new(7));
        assert_eq!(bullet.lock, Lock::Enemy(EnemyId::new(2)));

        bullet.lose(&fallen, true);
        assert!(matches!(bullet.lock, Lock::Fallen { .. }));
        assert!(bullet.collides(&[]));
        assert_eq!(bullet.target(), None);
    }

    #[test]
    fn mortar_detonates_and_stops() {
        let mut mortar = Mortar::new(
            MortarId::new(0),
            TurretId::new(0),
            Point::new(0.5, 0.5),
            Point::new(0.5, 0.0),
            2,
            100.0,
            1.5,
        );
        mortar.update();
        assert!(!mortar.detonate);
        mortar.update();
        assert!(mortar.detonate);
        mortar.update();
        assert_eq!(mortar.position, Point::new(1.5, 0.5));
    }

    #[test]
    fn mine_arms_on_landing_and_senses_enemies() {
        let mut mine = Mine::new(
            MineId::new(0),
            TurretId::new(0),
            Point::new(0.5, 1.5),
            Point::new(0.5, 0.5),
            Point::new(0.0, -0.5),
            2,
            100.0,
            1.0,
        );
        let nearby = [enemy(1, Point::new(1.0, 0.5))];

        mine.update();
        mine.sense(&nearby);
        assert!(!mine.armed && !mine.detonate);

        mine.update();
        assert!(mine.armed);
        assert_eq!(mine.position, Point::new(0.5, 0.5));
        mine.sense(&[enemy(1, Point::new(2.5, 0.5))]);
        assert!(!mine.detonate);
        mine.sense(&nearby);
        assert!(mine.detonate);
    }

    #[test]
    fn blast_skips_enemies_outside_radius() {
        let enemies = [enemy(1, Point::new(1.0, 0.0)), enemy(2, Point::new(3.0, 0.0))];
        let mut hits = Vec::new();
        blast(&enemies, Point::new(0.0, 0.0), 100.0, 2.0, &mut hits);
        assert_eq!(hits, vec![(EnemyId::new(1), 50.0)]);
    }

    #[test]
    fn glue_dries_out() {
        let mut glue = Glue::new(GlueId::new(0), Point::new(0.5, 0.5), 1.2, 1.0, 2);
        assert!(glue.covers(Point::new(1.5, 0.5)));
        assert!(!glue.covers(Point::new(1.6, 0.5)));
        glue.update();
        glue.update();
        assert!(glue.consumed);
        assert!(!glue.covers(Point::new(0.5, 0.5)));
    }

    fn bullet(position: Point, velocity: Point) -> Bullet<f64> {
        Bullet::new(
            BulletId::new(0),
            TurretId::new(0),
            position,
            velocity,
            EnemyId::new(2),
            10.0,
        )
    }

    fn enemy(id: u32, position: Point) -> Enemy {
        let attributes = EnemyAttributes {
            life: 10.0,
            speed: 1.0,
            value: 1,
        };
        Enemy::new(
            EnemyId::new(id),
            EnemyKind::Soldier,
            &attributes,
            Modifiers::default(),
            position,
        )
    }
}
