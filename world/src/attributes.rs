//! Per-grade turret attribute progressions.
//!
//! Every turret family has three grades. Each grade stores one series per
//! attribute, indexed by `level - 1`, generated once from two seed values and
//! a [`Recurrence`]. Generated values are rounded to two decimals.

use std::collections::BTreeMap;

use siegeline_core::{
    constants::{DEFAULT_MAX_LEVEL, GLUE_MAX_LEVEL, MAX_GRADE, TOP_GRADE_MAX_LEVEL},
    round_half_up, TurretKind,
};

use Recurrence::{Additive, Constant, Indexed, SecondDifference};

/// Growth rule producing the next value of a series from the two before it.
///
/// `index` is the zero-based position of the value being generated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Recurrence {
    /// Repeats the previous value.
    Constant,
    /// Adds a fixed step to the previous value.
    Additive {
        /// Amount added per level.
        step: f64,
    },
    /// Adds `constant + (index + offset) * scale` to the previous value.
    Indexed {
        /// Fixed part of the increment.
        constant: f64,
        /// Shift applied to the index.
        offset: f64,
        /// Multiplier of the shifted index.
        scale: f64,
    },
    /// Repeats the previous increment and adds `constant + (index + offset) * scale`.
    SecondDifference {
        /// Fixed part of the extra increment.
        constant: f64,
        /// Shift applied to the index.
        offset: f64,
        /// Multiplier of the shifted index.
        scale: f64,
    },
    /// Multiplies the previous value by a fixed factor.
    Multiplicative {
        /// Factor applied per level.
        factor: f64,
    },
}

impl Recurrence {
    fn next(self, index: usize, before_previous: f64, previous: f64) -> f64 {
        let index = index as f64;
        match self {
            Self::Constant => previous,
            Self::Additive { step } => previous + step,
            Self::Indexed {
                constant,
                offset,
                scale,
            } => previous + constant + (index + offset) * scale,
            Self::SecondDifference {
                constant,
                offset,
                scale,
            } => previous + (previous - before_previous) + constant + (index + offset) * scale,
            Self::Multiplicative { factor } => previous * factor,
        }
    }
}

/// Generates `length` values starting with the two seeds.
#[must_use]
pub fn progression(first: f64, second: f64, recurrence: Recurrence, length: u32) -> Vec<f64> {
    let length = length as usize;
    let mut values: Vec<f64> = Vec::with_capacity(length);

    for index in 0..length {
        let value = match index {
            0 => first,
            1 => second,
            _ => {
                let generated = recurrence.next(index, values[index - 2], values[index - 1]);
                round_half_up(generated * 100.0) / 100.0
            }
        };
        values.push(value);
    }

    values
}

/// Attribute series of one turret grade.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GradeTable {
    /// Highest level of the grade; every series has this many entries.
    pub max_level: u32,
    /// Damage per hit.
    pub damage: Vec<f64>,
    /// Reload duration in attribute units.
    pub reload: Vec<f64>,
    /// Targeting range in cells.
    pub range: Vec<f64>,
    /// Price of the next level.
    pub price_improvement: Vec<f64>,
    /// Blast radius of mortars and mines.
    pub explosion_range: Vec<f64>,
    /// Speed divisor applied by glue.
    pub intensity: Vec<f64>,
    /// Glue lifetime in attribute units.
    pub duration: Vec<f64>,
    /// Cells an enemy is pushed back by a teleport.
    pub teleport_distance: Vec<f64>,
    /// Price of the next grade; zero at the last grade.
    pub price_upgrade: i64,
}

impl GradeTable {
    /// Attribute values for `level`, counted from one.
    #[must_use]
    pub fn at(&self, level: u32) -> Option<LevelStats> {
        if level == 0 || level > self.max_level {
            return None;
        }

        let index = (level - 1) as usize;
        Some(LevelStats {
            damage: pick(&self.damage, index),
            reload: pick(&self.reload, index),
            range: pick(&self.range, index),
            price_improvement: round_half_up(pick(&self.price_improvement, index)) as i64,
            explosion_range: pick(&self.explosion_range, index),
            intensity: pick(&self.intensity, index),
            duration: pick(&self.duration, index),
            teleport_distance: pick(&self.teleport_distance, index),
            price_upgrade: self.price_upgrade,
        })
    }
}

/// Attributes of a turret at one grade and level.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LevelStats {
    /// Damage per hit.
    pub damage: f64,
    /// Reload duration in attribute units.
    pub reload: f64,
    /// Targeting range in cells.
    pub range: f64,
    /// Price of the next level.
    pub price_improvement: i64,
    /// Blast radius of mortars and mines.
    pub explosion_range: f64,
    /// Speed divisor applied by glue.
    pub intensity: f64,
    /// Glue lifetime in attribute units.
    pub duration: f64,
    /// Cells an enemy is pushed back by a teleport.
    pub teleport_distance: f64,
    /// Price of the next grade.
    pub price_upgrade: i64,
}

/// Attribute tables of every turret family.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeTable {
    grades: BTreeMap<TurretKind, [GradeTable; 3]>,
}

impl AttributeTable {
    /// Builds the standard progression of every turret family.
    #[must_use]
    pub fn standard() -> Self {
        let grades = BTreeMap::from([
            (TurretKind::Projectile, projectile()),
            (TurretKind::Laser, laser()),
            (TurretKind::Launch, launch()),
            (TurretKind::Glue, glue()),
        ]);

        Self { grades }
    }

    /// Series of the given family and grade, counted from one.
    #[must_use]
    pub fn grade(&self, kind: TurretKind, grade: u32) -> Option<&GradeTable> {
        if grade == 0 || grade > MAX_GRADE {
            return None;
        }

        self.grades
            .get(&kind)
            .and_then(|grades| grades.get((grade - 1) as usize))
    }

    /// Attribute values for a family at a grade and level.
    #[must_use]
    pub fn stats(&self, kind: TurretKind, grade: u32, level: u32) -> Option<LevelStats> {
        self.grade(kind, grade).and_then(|table| table.at(level))
    }
}

fn pick(series: &[f64], index: usize) -> f64 {
    series.get(index).copied().unwrap_or(0.0)
}

fn projectile() -> [GradeTable; 3] {
    let (low, top) = (DEFAULT_MAX_LEVEL, TOP_GRADE_MAX_LEVEL);
    [
        GradeTable {
            max_level: low,
            damage: progression(100.0, 140.0, second_difference(0.0, 2.0, 2.0), low),
            reload: progression(1.0, 0.95, Additive { step: -0.05 }, low),
            range: progression(2.5, 2.55, Additive { step: 0.05 }, low),
            price_improvement: progression(50.0, 60.0, indexed(0.0, 4.0, 2.0), low),
            price_upgrade: 5600,
            ..GradeTable::default()
        },
        GradeTable {
            max_level: low,
            damage: progression(3400.0, 3560.0, second_difference(64.0, -2.0, 26.0), low),
            reload: progression(0.55, 0.5, Additive { step: -0.05 }, low),
            range: progression(3.0, 3.05, Additive { step: 0.05 }, low),
            price_improvement: progression(470.0, 658.0, second_difference(75.0, -2.0, 31.0), low),
            price_upgrade: 88_500,
            ..GradeTable::default()
        },
        GradeTable {
            max_level: top,
            damage: progression(20_000.0, 20_100.0, indexed(0.0, 0.0, 100.0), top),
            reload: progression(0.2, 0.19, Additive { step: -0.01 }, top),
            range: progression(3.5, 3.55, Additive { step: 0.05 }, top),
            price_improvement: progression(750.0, 1125.0, second_difference(188.0, -2.0, 92.0), top),
            ..GradeTable::default()
        },
    ]
}

fn launch() -> [GradeTable; 3] {
    let (low, top) = (DEFAULT_MAX_LEVEL, TOP_GRADE_MAX_LEVEL);
    [
        GradeTable {
            max_level: low,
            damage: progression(100.0, 160.0, second_difference(0.0, 4.0, 2.0), low),
            explosion_range: progression(1.5, 1.55, Additive { step: 0.05 }, low),
            reload: progression(2.0, 1.95, Additive { step: -0.05 }, low),
            range: progression(2.5, 2.55, Additive { step: 0.05 }, low),
            price_improvement: progression(125.0, 150.0, second_difference(0.0, 3.0, 1.0), low),
            price_upgrade: 10_000,
            ..GradeTable::default()
        },
        GradeTable {
            max_level: low,
            damage: progression(3287.0, 3744.0, second_difference(150.0, -2.0, 3.0), low),
            explosion_range: progression(2.0, 2.05, Additive { step: 0.05 }, low),
            reload: progression(2.55, 2.5, Additive { step: -0.05 }, low),
            range: progression(2.5, 2.5, Constant, low),
            price_improvement: progression(750.0, 1050.0, second_difference(120.0, -2.0, 48.0), low),
            price_upgrade: 103_000,
            ..GradeTable::default()
        },
        GradeTable {
            max_level: top,
            damage: progression(48_000.0, 48_333.0, second_difference(34.0, 0.0, 0.0), top),
            explosion_range: progression(1.75, 1.8, Additive { step: 0.05 }, top),
            reload: progression(3.0, 2.95, Additive { step: -0.05 }, top),
            range: progression(3.0, 3.1, Additive { step: 0.1 }, top),
            price_improvement: progression(950.0, 1425.0, second_difference(238.0, -2.0, 117.0), top),
            ..GradeTable::default()
        },
    ]
}

fn laser() -> [GradeTable; 3] {
    let (low, top) = (DEFAULT_MAX_LEVEL, TOP_GRADE_MAX_LEVEL);
    [
        GradeTable {
            max_level: low,
            damage: progression(230.0, 270.0, second_difference(0.0, 2.0, 2.0), low),
            reload: progression(1.5, 1.4, Additive { step: -0.1 }, low),
            range: progression(3.0, 3.05, Additive { step: 0.05 }, low),
            price_improvement: progression(50.0, 60.0, indexed(0.0, 4.0, 2.0), low),
            price_upgrade: 7000,
            ..GradeTable::default()
        },
        GradeTable {
            max_level: low,
            damage: progression(4300.0, 4460.0, second_difference(64.0, -2.0, 26.0), low),
            reload: progression(1.5, 1.4, Additive { step: -0.1 }, low),
            range: progression(3.0, 3.05, Additive { step: 0.05 }, low),
            price_improvement: progression(580.0, 812.0, second_difference(93.0, -2.0, 37.0), low),
            price_upgrade: 96_400,
            ..GradeTable::default()
        },
        GradeTable {
            max_level: top,
            damage: progression(44_000.0, 44_333.0, second_difference(34.0, 0.0, 0.0), top),
            reload: progression(3.0, 2.95, Additive { step: -0.05 }, top),
            range: progression(3.05, 3.1, Additive { step: 0.05 }, top),
            price_improvement: progression(839.0, 1203.0, second_difference(239.0, -2.0, 115.0), top),
            ..GradeTable::default()
        },
    ]
}

fn glue() -> [GradeTable; 3] {
    let levels = GLUE_MAX_LEVEL;
    [
        GradeTable {
            max_level: levels,
            intensity: progression(1.2, 1.4, Additive { step: 0.2 }, levels),
            duration: progression(1.5, 1.5, Constant, levels),
            reload: progression(2.0, 2.0, Constant, levels),
            range: progression(1.5, 1.6, Additive { step: 0.1 }, levels),
            price_improvement: progression(100.0, 120.0, second_difference(4.0, -2.0, 1.0), levels),
            price_upgrade: 800,
            ..GradeTable::default()
        },
        GradeTable {
            max_level: levels,
            intensity: progression(1.2, 1.5, Additive { step: 5.0 }, levels),
            duration: progression(2.5, 2.5, Constant, levels),
            reload: progression(3.0, 3.0, Constant, levels),
            range: progression(2.5, 2.7, Additive { step: 0.2 }, levels),
            price_improvement: progression(200.0, 240.0, second_difference(0.0, 2.0, 2.0), levels),
            price_upgrade: 1700,
            ..GradeTable::default()
        },
        GradeTable {
            max_level: levels,
            teleport_distance: progression(15.0, 20.0, Additive { step: 5.0 }, levels),
            reload: progression(5.0, 4.5, Additive { step: -0.5 }, levels),
            range: progression(3.5, 3.5, Constant, levels),
            price_improvement: progression(2000.0, 2400.0, second_difference(0.0, 2.0, 20.0), levels),
            ..GradeTable::default()
        },
    ]
}

const fn indexed(constant: f64, offset: f64, scale: f64) -> Recurrence {
    Indexed {
        constant,
        offset,
        scale,
    }
}

const fn second_difference(constant: f64, offset: f64, scale: f64) -> Recurrence {
    SecondDifference {
        constant,
        offset,
        scale,
    }
}
