use proptest::prelude::*;
use siegeline_core::{EnemyId, EnemyKind, EnemySnapshot, Point, Strategy, TurretKind};
use siegeline_system_tower_targeting::{TargetingRequest, TowerTargeting};

const STRATEGIES: [Strategy; 5] = [
    Strategy::First,
    Strategy::Last,
    Strategy::Closest,
    Strategy::Weakest,
    Strategy::Strongest,
];

#[test]
fn equal_progress_resolves_to_lower_id_for_every_strategy() {
    let mut targeting = TowerTargeting::new();
    let enemies = vec![
        enemy(12, Point::new(2.5, 1.5), 2.0, 50.0),
        enemy(4, Point::new(2.5, 1.5), 2.0, 50.0),
    ];

    for strategy in STRATEGIES {
        let mut out = Vec::new();
        targeting.handle(&request(strategy), &enemies, &mut out);
        assert_eq!(
            out,
            vec![EnemyId::new(4), EnemyId::new(12)],
            "{strategy:?} must prefer the older enemy"
        );
    }
}

#[test]
fn strategies_rank_by_their_primary_key() {
    let mut targeting = TowerTargeting::new();
    let enemies = vec![
        enemy(1, Point::new(1.5, 2.5), 1.0, 80.0),
        enemy(2, Point::new(3.5, 2.5), 3.0, 20.0),
        enemy(3, Point::new(2.5, 2.0), 2.0, 50.0),
    ];
    let mut out = Vec::new();

    targeting.handle(&request(Strategy::First), &enemies, &mut out);
    assert_eq!(ids(&out), vec![2, 3, 1]);

    targeting.handle(&request(Strategy::Last), &enemies, &mut out);
    assert_eq!(ids(&out), vec![1, 3, 2]);

    targeting.handle(&request(Strategy::Closest), &enemies, &mut out);
    assert_eq!(ids(&out)[0], 3, "enemy 3 stands next to the turret");

    targeting.handle(&request(Strategy::Weakest), &enemies, &mut out);
    assert_eq!(ids(&out), vec![2, 3, 1]);

    targeting.handle(&request(Strategy::Strongest), &enemies, &mut out);
    assert_eq!(ids(&out), vec![1, 3, 2]);
}

#[test]
fn ineligible_enemies_are_filtered() {
    let mut targeting = TowerTargeting::new();
    let mut dead = enemy(1, Point::new(2.5, 2.5), 1.0, 0.0);
    dead.life = 0.0;
    let near_exit = enemy(2, Point::new(2.5, 2.5), 8.6, 10.0);
    let mut teleporting = enemy(3, Point::new(2.5, 2.5), 1.0, 10.0);
    teleporting.teleporting = true;
    let far = enemy(4, Point::new(9.5, 9.5), 1.0, 10.0);
    let eligible = enemy(5, Point::new(2.5, 3.5), 1.0, 10.0);

    let mut out = Vec::new();
    targeting.handle(
        &request(Strategy::First),
        &[dead, near_exit, teleporting, far, eligible],
        &mut out,
    );

    assert_eq!(out, vec![EnemyId::new(5)]);
}

#[test]
fn top_grade_glue_skips_already_teleported_enemies() {
    let mut targeting = TowerTargeting::new();
    let mut returned = enemy(1, Point::new(2.5, 2.5), 3.0, 10.0);
    returned.has_been_teleported = true;
    let fresh = enemy(2, Point::new(2.5, 2.5), 1.0, 10.0);

    let mut glue = request(Strategy::First);
    glue.kind = TurretKind::Glue;
    glue.grade = 3;

    let mut out = Vec::new();
    targeting.handle(&glue, &[returned, fresh], &mut out);
    assert_eq!(out, vec![EnemyId::new(2)]);

    glue.grade = 2;
    targeting.handle(&glue, &[returned, fresh], &mut out);
    assert_eq!(out, vec![EnemyId::new(1), EnemyId::new(2)]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn ranking_ignores_collection_order(
        raw in prop::collection::vec((0u8..4, 0u8..4, 1u8..4), 1..10),
        rotation in 0usize..10,
        strategy_index in 0usize..5,
    ) {
        let enemies: Vec<EnemySnapshot> = raw
            .iter()
            .enumerate()
            .map(|(index, (column, progress, life))| {
                enemy(
                    index as u32,
                    Point::new(f64::from(*column) + 0.5, 2.5),
                    f64::from(*progress),
                    f64::from(*life) * 10.0,
                )
            })
            .collect();
        let mut shuffled = enemies.clone();
        shuffled.rotate_left(rotation % enemies.len());
        shuffled.reverse();

        let strategy = STRATEGIES[strategy_index];
        let mut targeting = TowerTargeting::new();
        let mut first = Vec::new();
        let mut second = Vec::new();
        targeting.handle(&request(strategy), &enemies, &mut first);
        targeting.handle(&request(strategy), &shuffled, &mut second);

        prop_assert_eq!(first, second);
    }
}

fn request(strategy: Strategy) -> TargetingRequest {
    TargetingRequest {
        kind: TurretKind::Projectile,
        grade: 1,
        origin: Point::new(2.5, 2.5),
        squared_range: 6.25,
        strategy,
        exit_progress: 8.5,
    }
}

fn enemy(id: u32, position: Point, progress: f64, life: f64) -> EnemySnapshot {
    EnemySnapshot {
        id: EnemyId::new(id),
        kind: EnemyKind::Soldier,
        position,
        progress,
        life,
        max_life: 100.0,
        speed: 0.1,
        value: 5,
        teleporting: false,
        has_been_teleported: false,
        glued: false,
        glue_bullet: false,
    }
}

fn ids(out: &[EnemyId]) -> Vec<u32> {
    out.iter().map(|id| id.get()).collect()
}
