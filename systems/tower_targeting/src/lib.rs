#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that ranks the enemies a turret may shoot at.
//!
//! Candidates are live enemies inside the turret's squared range that are
//! neither about to leave the path nor mid-teleport. The ranking applies the
//! turret's [`Strategy`] and always falls back to path progress and then to
//! the enemy id, which makes the order independent of collection order.

use siegeline_core::{merge_sort, EnemyId, EnemySnapshot, Point, Strategy, TurretKind};

/// Turret state the ranking depends on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetingRequest {
    /// Family of the turret looking for targets.
    pub kind: TurretKind,
    /// Grade of the turret.
    pub grade: u32,
    /// Centre of the turret's cell.
    pub origin: Point,
    /// Fixed squared targeting range.
    pub squared_range: f64,
    /// Ordering applied to the candidates.
    pub strategy: Strategy,
    /// Enemies at or beyond this path progress are ignored.
    pub exit_progress: f64,
}

/// Tower targeting system that reuses its scratch buffer between turrets.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    workspace: Vec<Candidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ranks the enemies within range of the requesting turret.
    ///
    /// The output buffer is cleared before it receives the ranked ids, best
    /// target first.
    pub fn handle(
        &mut self,
        request: &TargetingRequest,
        enemies: &[EnemySnapshot],
        out: &mut Vec<EnemyId>,
    ) {
        out.clear();
        self.prepare_workspace(request, enemies);

        if self.workspace.len() > 1 {
            let strategy = request.strategy;
            let candidates = std::mem::take(&mut self.workspace);
            self.workspace = merge_sort(candidates, |left, right| left.precedes(right, strategy));
        }

        out.extend(self.workspace.iter().map(|candidate| candidate.id));
    }

    fn prepare_workspace(&mut self, request: &TargetingRequest, enemies: &[EnemySnapshot]) {
        self.workspace.clear();
        let skips_teleported = request.kind == TurretKind::Glue && request.grade == 3;

        for enemy in enemies {
            if skips_teleported && enemy.has_been_teleported {
                continue;
            }

            if enemy.life <= 0.0 || enemy.progress >= request.exit_progress || enemy.teleporting {
                continue;
            }

            let squared_distance = request.origin.squared_distance(enemy.position);
            if squared_distance > request.squared_range {
                continue;
            }

            self.workspace.push(Candidate {
                id: enemy.id,
                progress: enemy.progress,
                life: enemy.life,
                squared_distance,
            });
        }
    }
}

/// Picks the enemy a turret fires at from the ranked candidates.
///
/// With `fixed_target` set the previously followed enemy is kept while it is
/// still ranked; otherwise the best ranked enemy wins.
#[must_use]
pub fn follow(fixed_target: bool, followed: Option<EnemyId>, ranked: &[EnemyId]) -> Option<EnemyId> {
    if fixed_target {
        if let Some(current) = followed.filter(|id| ranked.contains(id)) {
            return Some(current);
        }
    }

    ranked.first().copied()
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    id: EnemyId,
    progress: f64,
    life: f64,
    squared_distance: f64,
}

impl Candidate {
    fn precedes(&self, other: &Self, strategy: Strategy) -> bool {
        match strategy {
            Strategy::First => {
                if self.progress != other.progress {
                    return self.progress > other.progress;
                }
                self.id < other.id
            }
            Strategy::Last => {
                if self.progress != other.progress {
                    return self.progress < other.progress;
                }
                self.id < other.id
            }
            Strategy::Closest => {
                if self.squared_distance != other.squared_distance {
                    return self.squared_distance < other.squared_distance;
                }
                self.further_along(other)
            }
            Strategy::Weakest => {
                if self.life != other.life {
                    return self.life < other.life;
                }
                self.further_along(other)
            }
            Strategy::Strongest => {
                if self.life != other.life {
                    return self.life > other.life;
                }
                self.further_along(other)
            }
        }
    }

    fn further_along(&self, other: &Self) -> bool {
        if self.progress != other.progress {
            return self.progress > other.progress;
        }

        self.id < other.id
    }
}
