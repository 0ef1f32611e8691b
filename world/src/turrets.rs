//! Turret state, reload cycle and economy.

use siegeline_core::{
    constants::{AGED_VALUE_FLOOR, DOWNGRADE_PERCENT, RELOAD_BASE_TICKS},
    fix_number, round_half_up, CellCoord, EnemyId, Point, Strategy, TurretId, TurretKind,
    TurretSnapshot,
};
use siegeline_system_tower_combat::FireRequest;
use siegeline_system_tower_targeting::{follow, TargetingRequest};

use crate::attributes::{AttributeTable, LevelStats};

#[derive(Clone, Debug)]
pub(crate) struct Turret {
    pub(crate) id: TurretId,
    pub(crate) kind: TurretKind,
    pub(crate) cell: CellCoord,
    pub(crate) origin: Point,
    pub(crate) level: u32,
    pub(crate) max_level: u32,
    pub(crate) grade: u32,
    pub(crate) strategy: Strategy,
    pub(crate) fixed_target: bool,
    pub(crate) followed: Option<EnemyId>,
    pub(crate) value: i64,
    pub(crate) sell_value: i64,
    pub(crate) inflicted: i64,
    pub(crate) mines: u32,
    pub(crate) stats: LevelStats,
    squared_range: f64,
    reload_ticks: u64,
    elapsed: u64,
    ready: bool,
}

impl Turret {
    /// Builds a grade one, level one turret; `None` when the table lacks the family.
    pub(crate) fn new(
        id: TurretId,
        kind: TurretKind,
        cell: CellCoord,
        price: i64,
        table: &AttributeTable,
    ) -> Option<Self> {
        let grade = table.grade(kind, 1)?;
        let stats = grade.at(1)?;

        let mut turret = Self {
            id,
            kind,
            cell,
            origin: cell.center(),
            level: 1,
            max_level: grade.max_level,
            grade: 1,
            strategy: Strategy::default(),
            fixed_target: true,
            followed: None,
            value: price,
            sell_value: refund(price),
            inflicted: 0,
            mines: 0,
            stats,
            squared_range: 0.0,
            reload_ticks: 0,
            elapsed: 0,
            ready: false,
        };
        turret.derive_parameters();
        Some(turret)
    }

    /// Advances the reload counter; `true` when the turret may shoot this tick.
    pub(crate) fn reload(&mut self) -> bool {
        if self.ready {
            return true;
        }

        self.elapsed += 1;
        if self.elapsed >= self.reload_ticks {
            self.ready = true;
            self.elapsed = 0;
        }
        false
    }

    /// Updates the followed enemy from the ranked candidates.
    pub(crate) fn choose_target(&mut self, ranked: &[EnemyId]) -> Option<EnemyId> {
        self.followed = follow(self.fixed_target, self.followed, ranked);
        self.followed
    }

    pub(crate) fn disarm(&mut self) {
        self.ready = false;
    }

    pub(crate) fn improve(&mut self, table: &AttributeTable) {
        let price = self.stats.price_improvement;
        self.value += price;
        self.sell_value += refund(price);
        self.level += 1;
        self.refresh(table);
    }

    pub(crate) fn upgrade(&mut self, table: &AttributeTable) {
        let price = self.stats.price_upgrade;
        self.value += price;
        self.sell_value += refund(price);
        self.grade += 1;
        self.level = 1;
        self.elapsed = 0;

        if let Some(grade) = table.grade(self.kind, self.grade) {
            self.max_level = grade.max_level;
        }
        self.refresh(table);
    }

    /// Depreciates the sell value after a wave, never below half the investment.
    pub(crate) fn age(&mut self) {
        let depreciated = round_half_up(self.sell_value as f64 * DOWNGRADE_PERCENT) as i64;
        let floor = round_half_up(self.value as f64 * AGED_VALUE_FLOOR) as i64;
        self.sell_value = depreciated.max(floor);
    }

    pub(crate) fn next_strategy(&mut self) {
        self.strategy = self.strategy.next();
    }

    pub(crate) fn toggle_fixed_target(&mut self) {
        self.fixed_target = !self.fixed_target;
    }

    pub(crate) fn targeting_request(&self, exit_progress: f64) -> TargetingRequest {
        TargetingRequest {
            kind: self.kind,
            grade: self.grade,
            origin: self.origin,
            squared_range: self.squared_range,
            strategy: self.strategy,
            exit_progress,
        }
    }

    pub(crate) fn fire_request(&self) -> FireRequest {
        FireRequest {
            kind: self.kind,
            grade: self.grade,
            origin: self.origin,
            range: self.stats.range,
            live_mines: self.mines,
        }
    }

    pub(crate) fn snapshot(&self) -> TurretSnapshot {
        TurretSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            level: self.level,
            max_level: self.max_level,
            grade: self.grade,
            strategy: self.strategy,
            fixed_target: self.fixed_target,
            value: self.value,
            sell_value: self.sell_value,
            inflicted: self.inflicted,
            mines: self.mines,
            damage: self.stats.damage,
            reload: self.stats.reload,
            range: self.stats.range,
            price_improvement: self.stats.price_improvement,
            price_upgrade: self.stats.price_upgrade,
        }
    }

    fn refresh(&mut self, table: &AttributeTable) {
        if let Some(stats) = table.stats(self.kind, self.grade, self.level) {
            self.stats = stats;
        }
        self.derive_parameters();
    }

    fn derive_parameters(&mut self) {
        self.reload_ticks = (RELOAD_BASE_TICKS * self.stats.reload).floor() as u64;
        self.squared_range = fix_number(self.stats.range * self.stats.range);
    }
}

fn refund(price: i64) -> i64 {
    round_half_up(price as f64 * DOWNGRADE_PERCENT) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turret(kind: TurretKind) -> Turret {
        Turret::new(
            TurretId::new(0),
            kind,
            CellCoord::new(1, 2),
            100,
            &AttributeTable::standard(),
        )
        .expect("standard table covers every family")
    }

    #[test]
    fn new_turret_refunds_eighty_percent() {
        let turret = turret(TurretKind::Projectile);
        assert_eq!(turret.sell_value, 80);
        assert_eq!(turret.origin, Point::new(2.5, 1.5));
        assert!(turret.fixed_target);
        assert_eq!(turret.max_level, 10);
    }

    #[test]
    fn reload_counts_up_before_the_first_shot() {
        let mut turret = turret(TurretKind::Projectile);
        let ticks = (RELOAD_BASE_TICKS * turret.stats.reload).floor() as u64;

        for _ in 0..ticks {
            assert!(!turret.reload());
        }
        assert!(turret.reload());
        assert!(turret.reload(), "stays ready until it fires");

        turret.disarm();
        assert!(!turret.reload());
    }

    #[test]
    fn improving_adds_price_to_value_and_refund() {
        let table = AttributeTable::standard();
        let mut turret = turret(TurretKind::Projectile);
        turret.improve(&table);

        assert_eq!(turret.level, 2);
        assert_eq!(turret.value, 150);
        assert_eq!(turret.sell_value, 120);
        assert_eq!(turret.stats.damage, 140.0);
    }

    #[test]
    fn upgrading_resets_level_and_extends_top_grade() {
        let table = AttributeTable::standard();
        let mut laser = turret(TurretKind::Laser);
        laser.upgrade(&table);
        laser.upgrade(&table);

        assert_eq!((laser.grade, laser.level, laser.max_level), (3, 1, 15));
        assert_eq!(laser.stats.damage, 44_000.0);
        assert_eq!(laser.stats.price_upgrade, 0);

        let mut glue = turret(TurretKind::Glue);
        glue.upgrade(&table);
        glue.upgrade(&table);
        assert_eq!(glue.max_level, 5);
    }

    #[test]
    fn aging_never_drops_below_half_the_value() {
        let mut turret = turret(TurretKind::Projectile);
        turret.age();
        assert_eq!(turret.sell_value, 64);
        turret.age();
        assert_eq!(turret.sell_value, 51);
        turret.age();
        assert_eq!(turret.sell_value, 50);
    }
}
