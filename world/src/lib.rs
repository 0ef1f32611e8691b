#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation state for Siegeline.
//!
//! The [`Engine`] owns every entity collection and advances them through a
//! fixed nine-step tick in [`Engine::update`]. Damage detected by one tick's
//! collision pass is applied at the start of the next tick. Hosts mutate the
//! engine only through its command methods or [`apply`], and observe it
//! through the events pushed into their buffer and the [`query`] module.

use std::collections::BTreeMap;

use siegeline_core::{
    constants::{
        GLUE_PUDDLE_RADIUS, HEALER_HEALING_RADIUS, INITIAL_TICKS_WAVE, MAX_GRADE,
        RELOAD_BASE_TICKS,
    },
    point_in_circle, BoardSize, BulletId, CellCoord, Command, CommandOutcome, EnemyAttributes,
    EnemyId, EnemyKind, EnemySnapshot, Event, GlueId, LevelDefinition, LevelError, MineId,
    MortarId, Point, Rejection, TurretId, TurretKind, WaveAttributes,
};
use siegeline_system_spawning::Spawning;
use siegeline_system_tower_combat::{fire, Shot};
use siegeline_system_tower_targeting::TowerTargeting;
use siegeline_system_wave_generation::{early_bonus, Modifiers, WaveGeneration, WaveRequest};
use tracing::{debug, info, warn};

pub mod attributes;
mod enemies;
mod path;
mod projectiles;
mod turrets;

use attributes::AttributeTable;
use enemies::{Enemy, Step};
use path::EnemyPath;
use projectiles::{blast, Bullet, Glue, GlueDose, Mine, Mortar};
use turrets::Turret;

/// Deterministic tower-defense simulation of a single run.
#[derive(Debug)]
pub struct Engine {
    path: EnemyPath,
    board: BoardSize,
    plateaus: Vec<CellCoord>,
    spawn_interval: u64,
    enemies_data: BTreeMap<EnemyKind, EnemyAttributes>,
    turret_prices: BTreeMap<TurretKind, i64>,
    attributes: AttributeTable,
    waves: Vec<WaveAttributes>,

    tick: u64,
    credits: i64,
    credits_earned: i64,
    lives: i64,
    score: i64,
    round: u32,
    bonus: i64,
    game_over: bool,
    wave_activated: bool,
    can_launch_next_wave: bool,
    no_enemies_on_stage: bool,
    all_enemies_spawned: bool,
    wave_enemies_length: usize,
    enemies_spawned: usize,
    last_wave_tick: u64,
    wave_reward: i64,
    remaining_reward: i64,
    modifiers: Modifiers,
    ids: IdCounters,

    turrets: Vec<Turret>,
    enemies: Vec<Enemy>,
    bullets: Vec<Bullet<f64>>,
    glue_bullets: Vec<Bullet<GlueDose>>,
    mortars: Vec<Mortar>,
    mines: Vec<Mine>,
    glues: Vec<Glue>,

    colliding_bullets: Vec<BulletId>,
    colliding_glue_bullets: Vec<BulletId>,
    impacting_mortars: Vec<MortarId>,
    impacting_mines: Vec<MineId>,
    consumed_glues: Vec<GlueId>,
    teleports: Vec<(EnemyId, f64)>,

    spawning: Spawning,
    wave_generation: WaveGeneration,
    targeting: TowerTargeting,
    snapshots: Vec<EnemySnapshot>,
    ranked: Vec<EnemyId>,
    ranked_snapshots: Vec<EnemySnapshot>,
    blast_hits: Vec<(EnemyId, f64)>,
}

#[derive(Debug, Default)]
struct IdCounters {
    turrets: u32,
    enemies: u32,
    bullets: u32,
    mortars: u32,
    mines: u32,
    glues: u32,
}

fn bump(counter: &mut u32) -> u32 {
    let id = *counter;
    *counter += 1;
    id
}

impl Engine {
    /// Creates an engine for the provided level.
    ///
    /// # Errors
    ///
    /// Returns a [`LevelError`] when the level cannot be played.
    pub fn new(level: &LevelDefinition) -> Result<Self, LevelError> {
        level.validate()?;

        let config = &level.game_config;
        let path = EnemyPath::new(config.enemies_path_cells.clone()).ok_or(LevelError::EmptyPath)?;
        let turret_prices = level
            .turrets_data
            .iter()
            .map(|(kind, attributes)| (*kind, attributes.price))
            .collect();

        Ok(Self {
            path,
            board: config.board_size,
            plateaus: config.plateaus_cells.clone(),
            spawn_interval: config.enemy_spawning_delta_ticks,
            enemies_data: level.enemies_data.clone(),
            turret_prices,
            attributes: AttributeTable::standard(),
            waves: level.waves_data.clone(),
            tick: 0,
            credits: config.credits,
            credits_earned: 0,
            lives: config.lifes,
            score: 0,
            round: 0,
            bonus: 0,
            game_over: false,
            wave_activated: false,
            can_launch_next_wave: true,
            no_enemies_on_stage: true,
            all_enemies_spawned: false,
            wave_enemies_length: 0,
            enemies_spawned: 0,
            last_wave_tick: 0,
            wave_reward: 0,
            remaining_reward: 0,
            modifiers: Modifiers::default(),
            ids: IdCounters::default(),
            turrets: Vec::new(),
            enemies: Vec::new(),
            bullets: Vec::new(),
            glue_bullets: Vec::new(),
            mortars: Vec::new(),
            mines: Vec::new(),
            glues: Vec::new(),
            colliding_bullets: Vec::new(),
            colliding_glue_bullets: Vec::new(),
            impacting_mortars: Vec::new(),
            impacting_mines: Vec::new(),
            consumed_glues: Vec::new(),
            teleports: Vec::new(),
            spawning: Spawning::new(),
            wave_generation: WaveGeneration::new(),
            targeting: TowerTargeting::new(),
            snapshots: Vec::new(),
            ranked: Vec::new(),
            ranked_snapshots: Vec::new(),
            blast_hits: Vec::new(),
        })
    }

    /// Advances the simulation by one tick.
    pub fn update(&mut self, out: &mut Vec<Event>) {
        if self.lives <= 0 && !self.game_over {
            self.game_over = true;
            info!(tick = self.tick, score = self.score, round = self.round, "game over");
            out.push(Event::GameOver);
        }

        if self.wave_activated && self.field_cleared() {
            self.wave_activated = false;
            for turret in &mut self.turrets {
                turret.age();
            }

            if self.lives > 0 {
                out.push(Event::WaveOver { round: self.round });
            }
        }

        let cooldown = INITIAL_TICKS_WAVE.saturating_mul(self.spawn_interval);
        if !self.can_launch_next_wave && self.tick.saturating_sub(self.last_wave_tick) >= cooldown {
            self.can_launch_next_wave = true;
            out.push(Event::ActiveNextWave);
        }

        if self.wave_activated {
            self.resolve_collisions(out);
        }

        self.apply_teleports(out);
        self.detect_collisions();
        self.spawn_enemies(out);

        self.update_enemies(out);
        self.update_turrets(out);

        let board = self.board;
        for bullet in &mut self.bullets {
            bullet.update(board);
        }
        for bullet in &mut self.glue_bullets {
            bullet.update(board);
        }
        for mortar in &mut self.mortars {
            mortar.update();
        }
        for mine in &mut self.mines {
            mine.update();
        }
        for glue in &mut self.glues {
            glue.update();
        }

        self.tick += 1;
    }

    /// Builds a turret of the named family on `cell`.
    ///
    /// # Errors
    ///
    /// Rejects cells off the board, on the path, occupied or outside the
    /// plateaus, unknown families and unaffordable prices.
    pub fn add_turret(
        &mut self,
        turret_type: &str,
        cell: CellCoord,
    ) -> Result<CommandOutcome, Rejection> {
        let invalid = Rejection::InvalidTurretPosition { position: cell };
        if !self.board.contains(cell)
            || self.path.contains(cell)
            || self.turrets.iter().any(|turret| turret.cell == cell)
        {
            return Err(invalid);
        }

        if !self.plateaus.is_empty() && !self.plateaus.contains(&cell) {
            return Err(invalid);
        }

        let unknown = || Rejection::UnknownTurretType {
            name: turret_type.to_owned(),
        };
        let kind = TurretKind::from_name(turret_type).ok_or_else(unknown)?;
        let price = *self.turret_prices.get(&kind).ok_or_else(unknown)?;

        if self.credits < price {
            return Err(Rejection::InsufficientCredits);
        }

        let id = TurretId::new(self.ids.turrets);
        let turret = Turret::new(id, kind, cell, price, &self.attributes).ok_or_else(unknown)?;
        self.ids.turrets += 1;
        self.credits -= price;

        debug!(turret = id.get(), kind = kind.as_str(), price, "turret added");
        let snapshot = turret.snapshot();
        self.turrets.push(turret);

        Ok(CommandOutcome {
            turret: Some(snapshot),
        })
    }

    /// Removes a turret and refunds its sell value.
    ///
    /// # Errors
    ///
    /// Rejects unknown identifiers.
    pub fn sell_turret(&mut self, id: TurretId) -> Result<CommandOutcome, Rejection> {
        let index = self.turret_index(id)?;
        let turret = self.turrets.remove(index);
        self.credits += turret.sell_value;

        debug!(turret = id.get(), refund = turret.sell_value, "turret sold");
        Ok(CommandOutcome::default())
    }

    /// Moves a turret to its next grade.
    ///
    /// # Errors
    ///
    /// Rejects unknown identifiers, turrets at the last grade and
    /// unaffordable prices.
    pub fn upgrade_turret(&mut self, id: TurretId) -> Result<CommandOutcome, Rejection> {
        let index = self.turret_index(id)?;
        let turret = &mut self.turrets[index];

        if turret.grade >= MAX_GRADE {
            return Err(Rejection::MaxGradeReached { id });
        }

        let price = turret.stats.price_upgrade;
        if self.credits < price {
            return Err(Rejection::InsufficientCredits);
        }

        self.credits -= price;
        turret.upgrade(&self.attributes);

        debug!(turret = id.get(), grade = turret.grade, price, "turret upgraded");
        Ok(CommandOutcome::default())
    }

    /// Moves a turret to its next level within the grade.
    ///
    /// # Errors
    ///
    /// Rejects unknown identifiers, turrets at their last level and
    /// unaffordable prices.
    pub fn improve_turret(&mut self, id: TurretId) -> Result<CommandOutcome, Rejection> {
        let index = self.turret_index(id)?;
        let turret = &mut self.turrets[index];

        if turret.level >= turret.max_level {
            return Err(Rejection::MaxLevelReached { id });
        }

        let price = turret.stats.price_improvement;
        if self.credits < price {
            return Err(Rejection::InsufficientCredits);
        }

        self.credits -= price;
        turret.improve(&self.attributes);

        debug!(turret = id.get(), level = turret.level, price, "turret improved");
        Ok(CommandOutcome::default())
    }

    /// Cycles a turret to its next targeting strategy.
    ///
    /// # Errors
    ///
    /// Rejects unknown identifiers.
    pub fn set_next_strategy(&mut self, id: TurretId) -> Result<CommandOutcome, Rejection> {
        let index = self.turret_index(id)?;
        self.turrets[index].next_strategy();
        Ok(CommandOutcome::default())
    }

    /// Toggles whether a turret keeps following its current target.
    ///
    /// # Errors
    ///
    /// Rejects unknown identifiers.
    pub fn set_fixed_target(&mut self, id: TurretId) -> Result<CommandOutcome, Rejection> {
        let index = self.turret_index(id)?;
        self.turrets[index].toggle_fixed_target();
        Ok(CommandOutcome::default())
    }

    /// Pays the pending bonus and merges the next wave into the schedule.
    ///
    /// # Errors
    ///
    /// Rejects launches before the cooldown since the previous launch elapsed.
    pub fn launch_next_wave(&mut self, out: &mut Vec<Event>) -> Result<CommandOutcome, Rejection> {
        if !self.can_launch_next_wave {
            return Err(Rejection::WaveCooldown);
        }

        let bonus_paid = self.bonus;
        let request = WaveRequest {
            round: self.round,
            tick: self.tick,
            spawn_interval: self.spawn_interval,
            credits_earned: self.credits_earned + bonus_paid,
        };
        let Some(plan) = self
            .wave_generation
            .generate(request, &self.waves, &self.enemies_data)
        else {
            warn!(round = self.round, "no wave template available");
            return Ok(CommandOutcome::default());
        };

        self.credits += bonus_paid;
        self.credits_earned += bonus_paid;
        self.can_launch_next_wave = false;
        self.no_enemies_on_stage = false;
        self.all_enemies_spawned = false;
        self.round += 1;

        let enemies = plan.spawns.len();
        self.spawning.schedule(plan.spawns);
        self.last_wave_tick = self.tick;
        self.wave_reward = plan.wave_reward;
        self.wave_activated = true;
        self.wave_enemies_length += enemies;
        self.remaining_reward += plan.reward;
        self.modifiers = plan.modifiers;
        self.bonus = early_bonus(self.wave_reward, self.remaining_reward);

        debug!(
            round = self.round,
            enemies,
            bonus_paid,
            health = self.modifiers.health,
            reward = self.modifiers.reward,
            "wave launched"
        );
        out.push(Event::WaveLaunched {
            round: self.round,
            enemies,
            bonus_paid,
        });

        Ok(CommandOutcome::default())
    }

    fn turret_index(&self, id: TurretId) -> Result<usize, Rejection> {
        self.turrets
            .iter()
            .position(|turret| turret.id == id)
            .ok_or(Rejection::TurretNotFound { id })
    }

    fn enemy_index(&self, id: EnemyId) -> Option<usize> {
        self.enemies.iter().position(|enemy| enemy.id == id)
    }

    fn field_cleared(&self) -> bool {
        self.no_enemies_on_stage
            && self.all_enemies_spawned
            && self.bullets.is_empty()
            && self.glue_bullets.is_empty()
            && self.glues.is_empty()
            && self.mortars.is_empty()
    }

    fn resolve_collisions(&mut self, out: &mut Vec<Event>) {
        let mut queue = std::mem::take(&mut self.colliding_bullets);
        for id in queue.drain(..) {
            let Some(index) = self.bullets.iter().position(|bullet| bullet.id == id) else {
                continue;
            };

            let bullet = self.bullets.remove(index);
            let target = bullet.target().and_then(|enemy| self.enemy_index(enemy));
            match target {
                Some(index) => {
                    out.push(Event::EnemyHit {
                        enemies: vec![self.enemies[index].id],
                        turret: bullet.turret,
                    });
                    self.strike(
                        index,
                        bullet.payload,
                        TurretKind::Projectile,
                        bullet.turret,
                        out,
                    );
                }
                None => out.push(Event::BulletRemoved { bullet: bullet.id }),
            }
        }
        self.colliding_bullets = queue;

        let mut queue = std::mem::take(&mut self.colliding_glue_bullets);
        for id in queue.drain(..) {
            let Some(index) = self.glue_bullets.iter().position(|bullet| bullet.id == id) else {
                continue;
            };

            let bullet = self.glue_bullets.remove(index);
            let target = bullet.target().and_then(|enemy| self.enemy_index(enemy));
            match target {
                Some(index) => {
                    let enemy = &mut self.enemies[index];
                    enemy.hit_by_glue_bullet(bullet.payload.intensity, bullet.payload.duration);
                    out.push(Event::EnemyGlueHit {
                        enemy: enemy.id,
                        bullet: bullet.id,
                    });
                }
                None => out.push(Event::GlueBulletRemoved { bullet: bullet.id }),
            }
        }
        self.colliding_glue_bullets = queue;

        let mut queue = std::mem::take(&mut self.impacting_mortars);
        for id in queue.drain(..) {
            let Some(index) = self.mortars.iter().position(|mortar| mortar.id == id) else {
                continue;
            };

            let mortar = self.mortars.remove(index);
            self.explode(
                mortar.position,
                mortar.damage,
                mortar.explosion_range,
                mortar.turret,
                out,
            );
        }
        self.impacting_mortars = queue;

        let mut queue = std::mem::take(&mut self.impacting_mines);
        for id in queue.drain(..) {
            let Some(index) = self.mines.iter().position(|mine| mine.id == id) else {
                continue;
            };

            let mine = self.mines.remove(index);
            self.explode(
                mine.position,
                mine.damage,
                mine.explosion_range,
                mine.turret,
                out,
            );
            if let Some(owner) = self.turrets.iter_mut().find(|turret| turret.id == mine.turret) {
                owner.mines = owner.mines.saturating_sub(1);
            }
        }
        self.impacting_mines = queue;

        let mut queue = std::mem::take(&mut self.consumed_glues);
        for id in queue.drain(..) {
            let Some(index) = self.glues.iter().position(|glue| glue.id == id) else {
                continue;
            };

            let glue = self.glues.remove(index);
            out.push(Event::GlueConsumed { glue: glue.id });
        }
        self.consumed_glues = queue;
    }

    fn explode(
        &mut self,
        center: Point,
        damage: f64,
        radius: f64,
        turret: TurretId,
        out: &mut Vec<Event>,
    ) {
        let mut hits = std::mem::take(&mut self.blast_hits);
        blast(&self.enemies, center, damage, radius, &mut hits);

        let mut struck = Vec::with_capacity(hits.len());
        for (enemy, amount) in hits.iter().copied() {
            if self.hit_enemy(enemy, amount, TurretKind::Launch, turret, out) {
                struck.push(enemy);
            }
        }
        self.blast_hits = hits;

        if !struck.is_empty() {
            out.push(Event::EnemyHit {
                enemies: struck,
                turret,
            });
        }
    }

    fn apply_teleports(&mut self, out: &mut Vec<Event>) {
        if self.teleports.is_empty() {
            return;
        }

        let mut teleported = Vec::with_capacity(self.teleports.len());
        for (id, distance) in std::mem::take(&mut self.teleports) {
            let Some(enemy) = self.enemies.iter_mut().find(|enemy| enemy.id == id) else {
                continue;
            };

            enemy.teleport(distance, &self.path);
            teleported.push(id);

            for bullet in &mut self.bullets {
                bullet.release(id);
            }
            for bullet in &mut self.glue_bullets {
                bullet.release(id);
            }
        }

        if !teleported.is_empty() {
            out.push(Event::EnemiesTeleported {
                enemies: teleported,
            });
        }
    }

    fn detect_collisions(&mut self) {
        self.colliding_bullets.clear();
        self.colliding_glue_bullets.clear();
        self.impacting_mortars.clear();
        self.impacting_mines.clear();
        self.consumed_glues.clear();

        for bullet in &mut self.bullets {
            if bullet.collides(&self.enemies) {
                self.colliding_bullets.push(bullet.id);
            }
        }

        for bullet in &mut self.glue_bullets {
            if bullet.collides(&self.enemies) {
                self.colliding_glue_bullets.push(bullet.id);
            }
        }

        self.impacting_mortars.extend(
            self.mortars
                .iter()
                .filter(|mortar| mortar.detonate)
                .map(|mortar| mortar.id),
        );

        for mine in &mut self.mines {
            mine.sense(&self.enemies);
            if mine.detonate {
                self.impacting_mines.push(mine.id);
            }
        }

        self.consumed_glues.extend(
            self.glues
                .iter()
                .filter(|glue| glue.consumed)
                .map(|glue| glue.id),
        );

        for enemy in self.enemies.iter_mut().filter(|enemy| enemy.kind.walks()) {
            enemy.unglue();
            if let Some(glue) = self.glues.iter().find(|glue| glue.covers(enemy.position)) {
                enemy.glue(glue.intensity);
            }
        }
    }

    fn spawn_enemies(&mut self, out: &mut Vec<Event>) {
        while let Some(spawn) = self.spawning.next_due(self.tick) {
            self.enemies_spawned += 1;
            if self.enemies_spawned == self.wave_enemies_length {
                self.all_enemies_spawned = true;
                self.enemies_spawned = 0;
                self.wave_enemies_length = 0;
            }

            let Some(attributes) = self.enemies_data.get(&spawn.kind) else {
                warn!(kind = ?spawn.kind, "no attributes for scheduled enemy");
                continue;
            };

            let id = EnemyId::new(bump(&mut self.ids.enemies));
            self.enemies.push(Enemy::new(
                id,
                spawn.kind,
                attributes,
                self.modifiers,
                self.path.start(),
            ));

            debug!(enemy = id.get(), kind = ?spawn.kind, tick = self.tick, "enemy spawned");
            out.push(Event::EnemySpawned {
                enemy: id,
                kind: spawn.kind,
                cell: self.path.entry(),
            });
        }
    }

    fn update_enemies(&mut self, out: &mut Vec<Event>) {
        let mut index = 0;
        while index < self.enemies.len() {
            match self.enemies[index].update(&self.path) {
                Step::Exited => {
                    self.on_enemy_reached_exit(index, out);
                    continue;
                }
                Step::Healed => self.heal_around(index, out),
                Step::Moved | Step::Held => {}
            }
            index += 1;
        }
    }

    fn heal_around(&mut self, index: usize, out: &mut Vec<Event>) {
        let healer = self.enemies[index].id;
        let center = self.enemies[index].position;

        let mut healed = Vec::new();
        for enemy in &mut self.enemies {
            if enemy.life > 0.0 && point_in_circle(enemy.position, center, HEALER_HEALING_RADIUS) {
                enemy.restore_health();
                healed.push(enemy.id);
            }
        }

        out.push(Event::EnemiesHealed {
            healer,
            enemies: healed,
        });
    }

    fn update_turrets(&mut self, out: &mut Vec<Event>) {
        let limit = self.path.targeting_limit();

        for index in 0..self.turrets.len() {
            if !self.turrets[index].reload() {
                continue;
            }

            self.snapshots.clear();
            self.snapshots.extend(self.enemies.iter().map(Enemy::snapshot));

            let request = self.turrets[index].targeting_request(limit);
            self.targeting.handle(&request, &self.snapshots, &mut self.ranked);

            let Some(target) = self.turrets[index].choose_target(&self.ranked) else {
                continue;
            };

            self.turrets[index].disarm();
            self.shoot(index, target, out);
        }
    }

    fn shoot(&mut self, index: usize, target: EnemyId, out: &mut Vec<Event>) {
        let Some(aimed) = self.snapshots.iter().find(|enemy| enemy.id == target).copied() else {
            return;
        };

        self.ranked_snapshots.clear();
        for id in &self.ranked {
            if let Some(enemy) = self.snapshots.iter().find(|enemy| enemy.id == *id) {
                self.ranked_snapshots.push(*enemy);
            }
        }

        let turret = &self.turrets[index];
        let (owner, origin, stats) = (turret.id, turret.origin, turret.stats);
        let request = turret.fire_request();
        let path = &self.path;
        let walker = self.enemies.iter().find(|enemy| enemy.id == target);
        let shot = fire(&request, &aimed, &self.ranked_snapshots, path.centers(), |ticks| {
            walker.and_then(|enemy| enemy.predicted_position(path, ticks))
        });

        match shot {
            Shot::Bullet { velocity } => {
                let bullet = BulletId::new(bump(&mut self.ids.bullets));
                self.bullets
                    .push(Bullet::new(bullet, owner, origin, velocity, target, stats.damage));
                out.push(Event::BulletShot {
                    bullet,
                    turret: owner,
                });
            }
            Shot::GlueBullet { velocity } => {
                let bullet = BulletId::new(bump(&mut self.ids.bullets));
                let dose = GlueDose {
                    intensity: stats.intensity,
                    duration: glue_ticks(stats.duration),
                };
                self.glue_bullets
                    .push(Bullet::new(bullet, owner, origin, velocity, target, dose));
                out.push(Event::GlueBulletShot {
                    bullet,
                    turret: owner,
                });
            }
            Shot::Laser { enemies } => self.fire_laser(owner, stats.damage, enemies, out),
            Shot::Mortar {
                velocity,
                ticks_to_impact,
            } => {
                let mortar = MortarId::new(bump(&mut self.ids.mortars));
                self.mortars.push(Mortar::new(
                    mortar,
                    owner,
                    origin,
                    velocity,
                    ticks_to_impact,
                    stats.damage,
                    stats.explosion_range,
                ));
                out.push(Event::MortarShot {
                    mortar,
                    turret: owner,
                });
            }
            Shot::Mine {
                destination,
                velocity,
                travel_ticks,
            } => {
                let mine = MineId::new(bump(&mut self.ids.mines));
                self.mines.push(Mine::new(
                    mine,
                    owner,
                    origin,
                    destination,
                    velocity,
                    travel_ticks,
                    stats.damage,
                    stats.explosion_range,
                ));
                self.turrets[index].mines += 1;
                out.push(Event::MineShot { mine, turret: owner });
            }
            Shot::Glue { position } => {
                let glue = GlueId::new(bump(&mut self.ids.glues));
                self.glues.push(Glue::new(
                    glue,
                    position,
                    stats.intensity,
                    GLUE_PUDDLE_RADIUS,
                    glue_ticks(stats.duration),
                ));
                out.push(Event::GlueShot {
                    glue,
                    turret: owner,
                });
            }
            Shot::Teleport => self.teleports.push((target, stats.teleport_distance)),
            Shot::Hold => {}
        }
    }

    fn fire_laser(
        &mut self,
        turret: TurretId,
        damage: f64,
        enemies: Vec<EnemyId>,
        out: &mut Vec<Event>,
    ) {
        let mut struck = Vec::with_capacity(enemies.len());
        for enemy in enemies.iter().copied() {
            if self.hit_enemy(enemy, damage, TurretKind::Laser, turret, out) {
                struck.push(enemy);
            }
        }

        out.push(Event::LaserShot { turret, enemies });
        if !struck.is_empty() {
            out.push(Event::EnemyHit {
                enemies: struck,
                turret,
            });
        }
    }

    /// Applies one hit; `false` when the enemy is gone or already dead.
    fn hit_enemy(
        &mut self,
        enemy: EnemyId,
        damage: f64,
        source: TurretKind,
        turret: TurretId,
        out: &mut Vec<Event>,
    ) -> bool {
        let Some(index) = self.enemy_index(enemy) else {
            return false;
        };
        if self.enemies[index].life <= 0.0 {
            return false;
        }

        self.strike(index, damage, source, turret, out);
        true
    }

    fn strike(
        &mut self,
        index: usize,
        damage: f64,
        source: TurretKind,
        turret: TurretId,
        out: &mut Vec<Event>,
    ) {
        let Some(outcome) = self.enemies[index].hit(damage, source) else {
            return;
        };

        if let Some(owner) = self.turrets.iter_mut().find(|candidate| candidate.id == turret) {
            owner.inflicted += outcome.inflicted;
        }

        if outcome.killed {
            self.on_enemy_killed(index, out);
        }
    }

    fn on_enemy_killed(&mut self, index: usize, out: &mut Vec<Event>) {
        let enemy = self.enemies.remove(index);
        out.push(Event::EnemyKilled {
            enemy: enemy.id,
            value: enemy.value,
        });

        self.credits += enemy.value;
        self.credits_earned += enemy.value;
        self.remaining_reward -= enemy.value;
        if !self.game_over {
            self.score += enemy.value;
        }

        self.lose_track(&enemy, true);
        self.bonus = early_bonus(self.wave_reward, self.remaining_reward);

        if self.enemies.is_empty() && self.all_enemies_spawned {
            self.on_no_enemies_on_stage(out);
        }
    }

    fn on_enemy_reached_exit(&mut self, index: usize, out: &mut Vec<Event>) {
        let enemy = self.enemies.remove(index);

        if !self.game_over {
            self.score += enemy.value;
        }
        self.remaining_reward -= enemy.value;
        self.lives -= 1;

        self.lose_track(&enemy, false);
        self.bonus = early_bonus(self.wave_reward, self.remaining_reward);

        if self.enemies.is_empty() && self.all_enemies_spawned {
            self.on_no_enemies_on_stage(out);
        }

        out.push(Event::EnemyReachedExit { enemy: enemy.id });
    }

    fn on_no_enemies_on_stage(&mut self, out: &mut Vec<Event>) {
        self.no_enemies_on_stage = true;

        let bonus = std::mem::take(&mut self.bonus);
        self.credits += bonus;
        self.credits_earned += bonus;
        out.push(Event::NoEnemiesOnStage { bonus });
    }

    fn lose_track(&mut self, enemy: &Enemy, killed: bool) {
        for bullet in &mut self.bullets {
            bullet.lose(enemy, killed);
        }
        for bullet in &mut self.glue_bullets {
            bullet.lose(enemy, killed);
        }
    }
}

fn glue_ticks(duration: f64) -> u32 {
    (duration * RELOAD_BASE_TICKS).floor() as u32
}

/// Applies the provided command to the engine.
///
/// # Errors
///
/// Returns the [`Rejection`] reported by the corresponding command method.
pub fn apply(
    engine: &mut Engine,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<CommandOutcome, Rejection> {
    match command {
        Command::LaunchWave => engine.launch_next_wave(out_events),
        Command::AddTurret {
            turret_type,
            position,
        } => engine.add_turret(&turret_type, position),
        Command::SellTurret { id } => engine.sell_turret(id),
        Command::UpgradeTurret { id } => engine.upgrade_turret(id),
        Command::LevelUpTurret { id } => engine.improve_turret(id),
        Command::ChangeStrategy { id } => engine.set_next_strategy(id),
        Command::ChangeFixedTarget { id } => engine.set_fixed_target(id),
    }
}

/// Query functions that provide read-only access to the engine state.
pub mod query {
    use super::{Engine, Enemy, Turret};
    use siegeline_core::{
        CellCoord, EnemySnapshot, GameSnapshot, ScheduledSpawn, TurretId, TurretSnapshot,
    };

    /// Captures the scalar state of the run.
    #[must_use]
    pub fn game(engine: &Engine) -> GameSnapshot {
        GameSnapshot {
            tick: engine.tick,
            credits: engine.credits,
            credits_earned: engine.credits_earned,
            lives: engine.lives,
            score: engine.score,
            round: engine.round,
            bonus: engine.bonus,
            wave_activated: engine.wave_activated,
            can_launch_next_wave: engine.can_launch_next_wave,
            game_over: engine.game_over,
        }
    }

    /// Snapshots of every turret in construction order.
    #[must_use]
    pub fn turrets(engine: &Engine) -> Vec<TurretSnapshot> {
        engine.turrets.iter().map(Turret::snapshot).collect()
    }

    /// Snapshot of a single turret, if it exists.
    #[must_use]
    pub fn turret(engine: &Engine, id: TurretId) -> Option<TurretSnapshot> {
        engine
            .turrets
            .iter()
            .find(|turret| turret.id == id)
            .map(Turret::snapshot)
    }

    /// Snapshots of every live enemy in spawn order.
    #[must_use]
    pub fn enemies(engine: &Engine) -> Vec<EnemySnapshot> {
        engine.enemies.iter().map(Enemy::snapshot).collect()
    }

    /// Pending spawns ordered by scheduled tick.
    #[must_use]
    pub fn schedule(engine: &Engine) -> Vec<ScheduledSpawn> {
        engine.spawning.iter().copied().collect()
    }

    /// Cells enemies walk from the entry to the exit.
    #[must_use]
    pub fn path(engine: &Engine) -> &[CellCoord] {
        engine.path.cells()
    }

    /// Scaled credits still to be earned from enemies on the field or scheduled.
    #[must_use]
    pub fn remaining_reward(engine: &Engine) -> i64 {
        engine.remaining_reward
    }

    /// Counts the projectiles currently in flight or on the board.
    #[must_use]
    pub fn projectiles(engine: &Engine) -> ProjectileCounts {
        ProjectileCounts {
            bullets: engine.bullets.len(),
            glue_bullets: engine.glue_bullets.len(),
            mortars: engine.mortars.len(),
            mines: engine.mines.len(),
            glues: engine.glues.len(),
        }
    }

    /// Number of live projectiles per category.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ProjectileCounts {
        /// Bullets in flight.
        pub bullets: usize,
        /// Glue bullets in flight.
        pub glue_bullets: usize,
        /// Mortar shells in flight or about to detonate.
        pub mortars: usize,
        /// Mines travelling or armed on the path.
        pub mines: usize,
        /// Glue puddles on the board.
        pub glues: usize,
    }
}
