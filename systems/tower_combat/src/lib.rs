#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure combat rules shared by the engine's turrets and projectiles.
//!
//! The module covers the damage affinity table between enemy and turret
//! families, single-target hit resolution, the linear falloff of explosions,
//! and [`fire`], which decides what a ready turret launches at its chosen
//! target. Nothing here owns entities: callers pass snapshots in and apply the
//! returned values to their own state.

use siegeline_core::{
    constants::{
        BULLET_SPEED, MAX_MINES_PER_TURRET, MINE_SPEED, MORTAR_SPEED,
        STRONG_AGAINST_DAMAGE_MODIFIER, WEAK_AGAINST_DAMAGE_MODIFIER,
    },
    fix_number, round_half_up, segment_intersects_circle, EnemyId, EnemyKind, EnemySnapshot,
    Point, TurretKind,
};

/// Enemies a grade two laser strikes with a single beam.
const SPLIT_BEAM_TARGETS: usize = 3;

/// How strongly an enemy family reacts to a turret family's damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Affinity {
    /// Damage applies unchanged.
    Neutral,
    /// Damage is multiplied by [`WEAK_AGAINST_DAMAGE_MODIFIER`].
    Weak,
    /// Damage is multiplied by [`STRONG_AGAINST_DAMAGE_MODIFIER`].
    Strong,
}

impl Affinity {
    /// Looks up the affinity of `enemy` against damage dealt by `turret`.
    #[must_use]
    pub const fn of(enemy: EnemyKind, turret: TurretKind) -> Self {
        match (enemy, turret) {
            (EnemyKind::Healer | EnemyKind::Flier, TurretKind::Laser | TurretKind::Projectile) => {
                Self::Weak
            }
            (EnemyKind::Runner | EnemyKind::Blob, TurretKind::Launch) => Self::Weak,
            (EnemyKind::Runner, TurretKind::Laser) => Self::Strong,
            (EnemyKind::Blob, TurretKind::Projectile) => Self::Strong,
            _ => Self::Neutral,
        }
    }

    /// Multiplier applied to raw damage.
    #[must_use]
    pub const fn damage_modifier(self) -> f64 {
        match self {
            Self::Neutral => 1.0,
            Self::Weak => WEAK_AGAINST_DAMAGE_MODIFIER,
            Self::Strong => STRONG_AGAINST_DAMAGE_MODIFIER,
        }
    }
}

/// Result of applying one hit to an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitOutcome {
    /// Remaining life, never negative.
    pub life: f64,
    /// Damage credited to the turret's statistics.
    pub inflicted: i64,
    /// Whether this hit brought the life to zero.
    pub killed: bool,
}

/// Applies `damage` to an enemy with `life` remaining.
///
/// Returns `None` when the enemy is already dead. The turret is credited with
/// the rounded raw damage regardless of affinity or overkill.
#[must_use]
pub fn resolve_hit(life: f64, damage: f64, affinity: Affinity) -> Option<HitOutcome> {
    if life <= 0.0 {
        return None;
    }

    let remaining = life - fix_number(damage * affinity.damage_modifier());
    let killed = remaining <= 0.0;

    Some(HitOutcome {
        life: if killed { 0.0 } else { remaining },
        inflicted: round_half_up(damage) as i64,
        killed,
    })
}

/// Damage an explosion of `radius` deals at `distance` from its centre.
///
/// Returns `None` outside the blast.
#[must_use]
pub fn area_damage(damage: f64, distance: f64, radius: f64) -> Option<f64> {
    if distance > radius {
        return None;
    }

    Some(fix_number(damage * (1.0 - distance / radius)))
}

/// Whole ticks a projectile moving at `speed` needs to cover `distance`.
#[must_use]
pub fn travel_ticks(distance: f64, speed: f64) -> u64 {
    fix_number(distance / speed).floor().max(0.0) as u64
}

/// Per-tick velocity of length `speed` pointing from `from` to `to`.
///
/// Coincident points yield a zero velocity.
#[must_use]
pub fn velocity_towards(from: Point, to: Point, speed: f64) -> Point {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return Point::default();
    }

    Point::new(fix_number(speed * dx / length), fix_number(speed * dy / length))
}

fn velocity_over(from: Point, to: Point, ticks: u64) -> Point {
    let ticks = ticks.max(1) as f64;
    Point::new(
        fix_number((to.x - from.x) / ticks),
        fix_number((to.y - from.y) / ticks),
    )
}

/// Turret state that shapes its shot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FireRequest {
    /// Family of the firing turret.
    pub kind: TurretKind,
    /// Grade of the firing turret.
    pub grade: u32,
    /// Centre of the turret's cell.
    pub origin: Point,
    /// Targeting range in cells.
    pub range: f64,
    /// Mines the turret currently has on the board.
    pub live_mines: u32,
}

/// What a ready turret launches at its target.
#[derive(Clone, Debug, PartialEq)]
pub enum Shot {
    /// A bullet locked onto the target.
    Bullet {
        /// Per-tick velocity.
        velocity: Point,
    },
    /// A glue bullet locked onto the target.
    GlueBullet {
        /// Per-tick velocity.
        velocity: Point,
    },
    /// An instant beam striking the listed enemies in order.
    Laser {
        /// Enemies struck by the beam.
        enemies: Vec<EnemyId>,
    },
    /// A mortar shell that detonates after a fixed flight.
    Mortar {
        /// Per-tick velocity.
        velocity: Point,
        /// Ticks until detonation.
        ticks_to_impact: u64,
    },
    /// A mine travelling to a path cell where it arms.
    Mine {
        /// Centre of the path cell the mine lands on.
        destination: Point,
        /// Per-tick velocity.
        velocity: Point,
        /// Ticks until the mine lands and arms.
        travel_ticks: u64,
    },
    /// A glue puddle dropped under the target.
    Glue {
        /// Centre of the puddle.
        position: Point,
    },
    /// The target is pushed back along the path.
    Teleport,
    /// The turret spends its shot without launching anything.
    Hold,
}

/// Plans the shot of a ready turret at `target`.
///
/// `ranked` holds every candidate in ranking order and feeds the multi-target
/// lasers. `path` lists the centres of the path cells for mine placement.
/// `predict` returns where the target will be after the given number of
/// ticks, or `None` once that lies beyond the path.
pub fn fire<F>(
    request: &FireRequest,
    target: &EnemySnapshot,
    ranked: &[EnemySnapshot],
    path: &[Point],
    predict: F,
) -> Shot
where
    F: Fn(u64) -> Option<Point>,
{
    let origin = request.origin;
    let distance = origin.distance(target.position);

    match (request.kind, request.grade) {
        (TurretKind::Projectile, _) => {
            let aim = predict(travel_ticks(distance, BULLET_SPEED)).unwrap_or(target.position);
            Shot::Bullet {
                velocity: velocity_towards(origin, aim, BULLET_SPEED),
            }
        }
        (TurretKind::Laser, grade) => Shot::Laser {
            enemies: beam(request, grade, target, ranked),
        },
        (TurretKind::Launch, 2) => {
            if request.live_mines >= MAX_MINES_PER_TURRET {
                return Shot::Hold;
            }

            let aim = predict(travel_ticks(distance, MINE_SPEED)).unwrap_or(target.position);
            let destination = nearest(path, aim).unwrap_or(aim);
            let travel_ticks = travel_ticks(origin.distance(destination), MINE_SPEED).max(1);
            Shot::Mine {
                destination,
                velocity: velocity_over(origin, destination, travel_ticks),
                travel_ticks,
            }
        }
        (TurretKind::Launch, _) => {
            let ticks_to_impact = travel_ticks(distance, MORTAR_SPEED).max(1);
            let aim = predict(ticks_to_impact).unwrap_or(target.position);
            Shot::Mortar {
                velocity: velocity_over(origin, aim, ticks_to_impact),
                ticks_to_impact,
            }
        }
        (TurretKind::Glue, 1) => Shot::Glue {
            position: target.position,
        },
        (TurretKind::Glue, 2) => {
            let aim = predict(travel_ticks(distance, BULLET_SPEED)).unwrap_or(target.position);
            Shot::GlueBullet {
                velocity: velocity_towards(origin, aim, BULLET_SPEED),
            }
        }
        (TurretKind::Glue, _) => Shot::Teleport,
    }
}

fn beam(
    request: &FireRequest,
    grade: u32,
    target: &EnemySnapshot,
    ranked: &[EnemySnapshot],
) -> Vec<EnemyId> {
    match grade {
        1 => vec![target.id],
        2 => std::iter::once(target.id)
            .chain(
                ranked
                    .iter()
                    .map(|enemy| enemy.id)
                    .filter(|id| *id != target.id),
            )
            .take(SPLIT_BEAM_TARGETS)
            .collect(),
        _ => {
            let end = beam_end(request.origin, target.position, request.range);
            ranked
                .iter()
                .filter(|enemy| {
                    segment_intersects_circle(
                        request.origin,
                        end,
                        enemy.position,
                        enemy.kind.bounding_radius(),
                    )
                })
                .map(|enemy| enemy.id)
                .collect()
        }
    }
}

fn beam_end(origin: Point, through: Point, range: f64) -> Point {
    let dx = through.x - origin.x;
    let dy = through.y - origin.y;
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return through;
    }

    Point::new(
        fix_number(origin.x + dx / length * range),
        fix_number(origin.y + dy / length * range),
    )
}

fn nearest(points: &[Point], to: Point) -> Option<Point> {
    let mut best: Option<(f64, Point)> = None;
    for point in points {
        let squared = point.squared_distance(to);
        match best {
            Some((closest, _)) if closest <= squared => {}
            _ => best = Some((squared, *point)),
        }
    }

    best.map(|(_, point)| point)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affinity_table_matches_enemy_families() {
        assert_eq!(Affinity::of(EnemyKind::Flier, TurretKind::Laser), Affinity::Weak);
        assert_eq!(Affinity::of(EnemyKind::Healer, TurretKind::Projectile), Affinity::Weak);
        assert_eq!(Affinity::of(EnemyKind::Runner, TurretKind::Laser), Affinity::Strong);
        assert_eq!(Affinity::of(EnemyKind::Blob, TurretKind::Projectile), Affinity::Strong);
        assert_eq!(Affinity::of(EnemyKind::Blob, TurretKind::Launch), Affinity::Weak);
        assert_eq!(Affinity::of(EnemyKind::Soldier, TurretKind::Launch), Affinity::Neutral);
        assert_eq!(Affinity::of(EnemyKind::Flier, TurretKind::Glue), Affinity::Neutral);
    }

    #[test]
    fn hits_on_dead_enemies_are_ignored() {
        assert_eq!(resolve_hit(0.0, 50.0, Affinity::Neutral), None);
    }

    #[test]
    fn overkill_clamps_life_but_credits_full_damage() {
        let outcome = resolve_hit(10.0, 99.6, Affinity::Weak).expect("enemy alive");
        assert_eq!(outcome.life, 0.0);
        assert!(outcome.killed);
        assert_eq!(outcome.inflicted, 100);
    }

    #[test]
    fn strong_affinity_reduces_damage() {
        let outcome = resolve_hit(100.0, 100.0, Affinity::Strong).expect("enemy alive");
        assert_eq!(outcome.life, 70.0);
        assert!(!outcome.killed);
    }

    #[test]
    fn area_damage_falls_off_linearly() {
        assert_eq!(area_damage(100.0, 0.0, 2.0), Some(100.0));
        assert_eq!(area_damage(100.0, 1.0, 2.0), Some(50.0));
        assert_eq!(area_damage(100.0, 2.0, 2.0), Some(0.0));
        assert_eq!(area_damage(100.0, 2.5, 2.0), None);
    }

    #[test]
    fn nearest_prefers_earlier_point_on_ties() {
        let points = [Point::new(0.5, 0.5), Point::new(2.5, 0.5)];
        assert_eq!(nearest(&points, Point::new(1.5, 0.5)), Some(points[0]));
        assert_eq!(nearest(&[], Point::new(1.5, 0.5)), None);
    }
}
