use std::collections::VecDeque;
use std::iter::StepBy;
use std::ops::RangeInclusive;
use std::sync::Arc;

use hashbrown::HashSet;
use log::{debug, info, trace, warn};
use strata_blocks::{Block, BlockKind, Face};
use strata_chunk::{
    BlockPos, CHUNK_SIZE, ChunkOrigin, ChunkStore, DEPTH, EntityId, GENERATE_SIZE,
    GENERATED_FLAG_SIZE, HEIGHT, generate_align, in_vertical_range,
};
use strata_eval::{EvalScheduler, QueueKind, TimedInvalidates};
use strata_geom::Vec3;
use strata_runtime::{GenerationPool, PoolStats, RuntimeError};
use strata_worldgen::{GenSettings, GeneratedChunk, WorldGenConfig};

use crate::config::WorldConfig;
use crate::entities::{EntitiesInBox, EntityIndex};
use crate::entity::Entity;
use crate::explosion::{self, PendingExplosion};
use crate::raytrace::Camera;

/// Manhattan radius around a changed cell whose evaluations are invalidated.
const INVALIDATE_RADIUS: i32 = 2;
/// Length of the axis beams invalidated and relit around a changed cell.
const BEAM_LENGTH: i32 = 13;

/// Batch origins covering `c - r ..= c + r` on one axis, clamped at the `i32` limits.
fn batch_span(c: i32, r: i32) -> StepBy<RangeInclusive<i32>> {
    (generate_align(c.saturating_sub(r))..=generate_align(c.saturating_add(r)))
        .step_by(GENERATE_SIZE as usize)
}

/// The simulated block world: chunk store, entities, evaluation queues and the generation pool.
pub struct World {
    pub(crate) store: ChunkStore,
    pub(crate) entities: EntityIndex,
    pub(crate) eval: EvalScheduler,
    pub(crate) timed: TimedInvalidates,
    pub(crate) trees: Vec<BlockPos>,
    pub(crate) explosions: Vec<PendingExplosion>,
    pub(crate) time_of_day: f32,
    pub(crate) pool: GenerationPool,
    pub(crate) generated_batches: HashSet<BlockPos>,
    pub(crate) rng: fastrand::Rng,
    pub(crate) config: WorldConfig,
    pub(crate) ticks: u64,
}

impl World {
    pub fn new(config: WorldConfig, settings: GenSettings) -> Result<Self, RuntimeError> {
        let seed = settings.seed;
        let pool = GenerationPool::new(settings, config.generation.workers)?;
        info!(
            "world created with seed {seed} and {} generation workers",
            pool.worker_count()
        );
        Ok(Self {
            store: ChunkStore::new(),
            entities: EntityIndex::new(),
            eval: EvalScheduler::new(config.ticks.timing()),
            timed: TimedInvalidates::new(),
            trees: Vec::new(),
            explosions: Vec::new(),
            time_of_day: config.day.start_time.rem_euclid(1.0),
            pool,
            generated_batches: HashSet::new(),
            rng: fastrand::Rng::with_seed(seed as i64 as u64),
            config,
            ticks: 0,
        })
    }

    #[inline]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    #[inline]
    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    #[inline]
    pub fn entities(&self) -> &EntityIndex {
        &self.entities
    }

    #[inline]
    pub fn eval(&self) -> &EvalScheduler {
        &self.eval
    }

    #[inline]
    pub fn timed_invalidates(&self) -> &TimedInvalidates {
        &self.timed
    }

    pub fn settings(&self) -> Arc<GenSettings> {
        self.pool.settings()
    }

    pub fn seed(&self) -> i32 {
        self.pool.settings().seed
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[inline]
    pub fn time_of_day(&self) -> f32 {
        self.time_of_day
    }

    pub fn set_time_of_day(&mut self, t: f32) {
        if t.is_finite() {
            self.time_of_day = t.rem_euclid(1.0) % 1.0;
        }
    }

    pub fn sky_brightness(&self) -> f32 {
        strata_lighting::sky_brightness(self.time_of_day)
    }

    pub fn is_batch_generated(&self, origin: BlockPos) -> bool {
        self.generated_batches.contains(&origin)
    }

    // ---- blocks ----------------------------------------------------------------------------

    #[inline]
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Option<&Block> {
        self.store.get_block(x, y, z)
    }

    #[inline]
    pub fn get_block_eval(&self, x: i32, y: i32, z: i32) -> Option<&Block> {
        self.store.get_block_eval(x, y, z)
    }

    /// The single mutation path for blocks. Carries the old cell's light over, relights the
    /// 3×3×3 neighborhood, bumps display tags and invalidates everything that may react.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block: Block) {
        if !in_vertical_range(y) {
            return;
        }
        let chunk = self.store.find_or_insert(ChunkOrigin::containing(x, y, z));
        let mut new = block;
        match chunk.slot(x, y, z) {
            Some(old) => new.copy_lighting_from(old),
            None => {
                new.sky_light = 0;
                new.block_light = new.light_emission();
            }
        }
        let old = chunk.replace_slot(x, y, z, Some(new));
        if old.is_some_and(|b| b.is(BlockKind::Fire)) {
            chunk.fire_count = chunk.fire_count.saturating_sub(1);
        }
        if new.is(BlockKind::Fire) {
            chunk.fire_count += 1;
        }
        self.bump_display_around(x, y, z);

        for (cx, cy, cz) in strata_lighting::relight_neighborhood(&mut self.store, x, y, z) {
            self.enqueue_light_neighbors(cx, cy, cz);
        }

        let r = INVALIDATE_RADIUS;
        for dy in -r..=r {
            for dz in -r..=r {
                for dx in -r..=r {
                    if dx.abs() + dy.abs() + dz.abs() <= r {
                        self.invalidate(x.wrapping_add(dx), y + dy, z.wrapping_add(dz));
                    }
                }
            }
        }
        for face in Face::ALL {
            let (fx, fy, fz) = face.offset();
            for d in 1..=BEAM_LENGTH {
                let (bx, by, bz) = (x.wrapping_add(fx * d), y + fy * d, z.wrapping_add(fz * d));
                if d > r {
                    self.invalidate(bx, by, bz);
                }
                self.enqueue_lighting(bx, by, bz);
            }
        }
        if new.emits_particles() {
            self.eval
                .insert(QueueKind::Particles, BlockPos::new(x, y, z), None);
        }
    }

    /// Writes a cell and marks its sub-cube generated without any lighting, invalidation or
    /// display side effects. Meant for tools and fixtures that build terrain by hand.
    pub fn set_generated_block(&mut self, x: i32, y: i32, z: i32, block: Block) {
        if !in_vertical_range(y) {
            return;
        }
        let chunk = self.store.find_or_insert(ChunkOrigin::containing(x, y, z));
        let old = chunk.replace_slot(x, y, z, Some(block));
        if old.is_some_and(|b| b.is(BlockKind::Fire)) {
            chunk.fire_count = chunk.fire_count.saturating_sub(1);
        }
        if block.is(BlockKind::Fire) {
            chunk.fire_count += 1;
        }
        chunk.set_generated(x, y, z);
    }

    fn bump_display_around(&mut self, x: i32, y: i32, z: i32) {
        let own = ChunkOrigin::containing(x, y, z);
        self.store.bump_display(own);
        for face in Face::ALL {
            let (nx, ny, nz) = face.neighbor(x, y, z);
            let o = ChunkOrigin::containing(nx, ny, nz);
            if o != own && self.store.find(o).is_some() {
                self.store.bump_display(o);
            }
        }
    }

    /// Queues General, Redstone, Pistons and Fire evaluation of one cell.
    pub fn invalidate(&mut self, x: i32, y: i32, z: i32) {
        if in_vertical_range(y) {
            self.eval.invalidate(BlockPos::new(x, y, z));
        }
    }

    pub fn add_timed_invalidate(&mut self, x: i32, y: i32, z: i32, seconds: f32) {
        if in_vertical_range(y) && seconds.is_finite() {
            self.timed.add(BlockPos::new(x, y, z), seconds);
        }
    }

    pub(crate) fn enqueue_lighting(&mut self, x: i32, y: i32, z: i32) {
        if in_vertical_range(y) {
            self.eval
                .insert(QueueKind::Lighting, BlockPos::new(x, y, z), None);
        }
    }

    fn enqueue_light_neighbors(&mut self, x: i32, y: i32, z: i32) {
        for face in Face::ALL {
            let (nx, ny, nz) = face.neighbor(x, y, z);
            if self.store.is_generated(nx, ny, nz) {
                self.enqueue_lighting(nx, ny, nz);
            }
        }
    }

    /// Lighting of the 3×3×3 cells around `(x,y,z)` for draw consumers, indexed `[dx+1][dy+1][dz+1]`.
    pub fn lighting_array(&self, x: i32, y: i32, z: i32) -> [[[f32; 3]; 3]; 3] {
        strata_lighting::lighting_array(&self.store, x, y, z, self.sky_brightness())
    }

    /// Digs a block out: it becomes air and its drop, if any, appears as an item entity.
    /// Returns the dug block. Air, fluids and ungenerated cells cannot be dug.
    pub fn dig_block(&mut self, x: i32, y: i32, z: i32) -> Option<Block> {
        let b = *self.get_block_eval(x, y, z)?;
        if b.is_air() || b.kind.is_fluid() {
            return None;
        }
        self.set_block(x, y, z, Block::AIR);
        if let Some(drop) = b.dig_result() {
            let v = Vec3::new(self.rng.f32() - 0.5, 2.0, self.rng.f32() - 0.5);
            self.insert_entity(Entity::item(Vec3::cell_center(x, y, z), drop, v));
        }
        Some(b)
    }

    /// Flips the lever at `(x,y,z)`. Returns false when the cell holds no lever.
    pub fn toggle_lever(&mut self, x: i32, y: i32, z: i32) -> bool {
        match self.get_block_eval(x, y, z) {
            Some(b) if b.is(BlockKind::Lever) => {
                let on = b.is_lit();
                self.set_block(x, y, z, Block::lever(!on));
                true
            }
            _ => false,
        }
    }

    // ---- entities --------------------------------------------------------------------------

    /// Adds an entity; empty entities are discarded and get no id.
    pub fn insert_entity(&mut self, entity: Entity) -> Option<EntityId> {
        self.entities.insert(&mut self.store, entity)
    }

    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&mut self.store, id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn entities_in_box(&self, min: Vec3, max: Vec3) -> EntitiesInBox<'_> {
        self.entities.in_box(&self.store, min, max)
    }

    fn move_entities(&mut self, dt: f32) {
        for id in self.entities.ids() {
            let Some(mut e) = self.entities.take(&mut self.store, id) else {
                continue;
            };
            e.step(self, dt);
            self.entities.restore(&mut self.store, id, e);
        }
    }

    // ---- explosions ------------------------------------------------------------------------

    pub fn add_explosion(&mut self, center: Vec3, strength: f32, ignore_rails: bool) {
        if !center.is_finite() || !strength.is_finite() || strength <= 0.0 {
            return;
        }
        if !in_vertical_range(center.y.floor() as i32) {
            return;
        }
        self.explosions.push(PendingExplosion {
            center,
            strength,
            ignore_rails,
        });
    }

    fn resolve_explosions(&mut self) {
        for blast in std::mem::take(&mut self.explosions) {
            self.detonate(&blast);
        }
    }

    fn detonate(&mut self, blast: &PendingExplosion) {
        let seed = self.rng.u64(..);
        let cells = explosion::cast_rays(&self.store, blast, seed);
        debug!(
            "explosion at {:?} strength {} destroys {} cells",
            blast.center,
            blast.strength,
            cells.len()
        );
        let drop_chance = self.config.effects.explosion_drop_chance;
        for c in cells {
            let Some(b) = self.get_block_eval(c.x, c.y, c.z).copied() else {
                continue;
            };
            if b.is_air() {
                continue;
            }
            self.set_block(c.x, c.y, c.z, Block::AIR);
            let center = Vec3::cell_center(c.x, c.y, c.z);
            if explosion::primes_instead(&b) {
                let fuse = 0.5 + self.rng.f32();
                self.insert_entity(Entity::primed_tnt(center, fuse));
            } else if self.rng.f32() < drop_chance {
                if let Some(drop) = b.dig_result() {
                    self.insert_entity(Entity::item(center, drop, Vec3::ZERO));
                }
            }
        }

        let reach = 2.0 * blast.strength;
        let lo = blast.center - Vec3::splat(reach);
        let hi = blast.center + Vec3::splat(reach);
        let hit: Vec<EntityId> = self
            .entities
            .in_box(&self.store, lo, hi)
            .filter(|(_, e)| e.pos.distance(blast.center) <= reach)
            .map(|(id, _)| id)
            .collect();
        for id in hit {
            let emptied = match self.entities.get_mut(id) {
                Some(e) => {
                    e.explode(blast.center, blast.strength, &mut self.rng);
                    e.is_empty()
                }
                None => false,
            };
            if emptied {
                self.entities.remove(&mut self.store, id);
            }
        }
    }

    // ---- trees -----------------------------------------------------------------------------

    pub fn queue_tree_growth(&mut self, pos: BlockPos) {
        if !self.trees.contains(&pos) {
            self.trees.push(pos);
        }
    }

    fn grow_trees(&mut self) {
        for pos in std::mem::take(&mut self.trees) {
            self.grow_tree(pos);
        }
    }

    // ---- tick ------------------------------------------------------------------------------

    /// Advances the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let day = self.config.day.length;
        if day > 0.0 {
            self.set_time_of_day(self.time_of_day + dt / day);
        }

        self.generate_particles(dt);
        self.move_entities(dt);

        for pos in self.timed.advance(dt) {
            self.invalidate(pos.x, pos.y, pos.z);
        }

        let due = self.eval.advance(dt);
        if due.general {
            self.drain(QueueKind::General, World::eval_general);
        }
        if due.redstone {
            self.run_redstone();
        }
        self.drain(QueueKind::Pistons, World::eval_piston);
        self.drain(QueueKind::Fire, World::eval_fire);

        self.random_updates();
        self.grow_trees();
        self.resolve_explosions();
        self.run_lighting();

        self.ticks += 1;
        trace!(
            "tick {} done: {} entities, {} queued evaluations",
            self.ticks,
            self.entities.len(),
            self.eval.total_len()
        );
    }

    /// Runs one pass over a queue. Stale cells are dropped; payload nodes are written through
    /// `set_block`; everything else goes to `eval`.
    pub(crate) fn drain(&mut self, kind: QueueKind, eval: fn(&mut World, BlockPos)) {
        for node in self.eval.detach(kind) {
            let p = node.pos;
            if self.store.get_block_eval(p.x, p.y, p.z).is_none() {
                continue;
            }
            match node.payload {
                Some(b) => self.set_block(p.x, p.y, p.z, b),
                None => eval(self, p),
            }
        }
    }

    fn run_redstone(&mut self) {
        let first_cap = self.config.ticks.redstone_first_max_passes;
        let mut passes = 0;
        while !self.eval.queue(QueueKind::RedstoneFirst).is_empty() {
            if passes == first_cap {
                warn!(
                    "redstone component pass cap ({first_cap}) reached with {} cells pending",
                    self.eval.queue(QueueKind::RedstoneFirst).len()
                );
                break;
            }
            self.drain(QueueKind::RedstoneFirst, World::eval_redstone_first);
            passes += 1;
        }
        for _ in 0..self.config.ticks.redstone_dust_max_passes {
            if self.eval.queue(QueueKind::Redstone).is_empty() {
                break;
            }
            self.drain(QueueKind::Redstone, World::eval_redstone);
        }
    }

    fn run_lighting(&mut self) {
        for _ in 0..self.config.ticks.lighting_max_passes {
            let batch = self.eval.detach(QueueKind::Lighting);
            if batch.is_empty() {
                return;
            }
            for node in batch {
                let p = node.pos;
                if strata_lighting::recompute_cell(&mut self.store, p.x, p.y, p.z) {
                    self.store.bump_display(p.chunk_origin());
                    self.enqueue_light_neighbors(p.x, p.y, p.z);
                }
            }
        }
        let left = self.eval.queue(QueueKind::Lighting).len();
        if left > 0 {
            trace!("lighting carries {left} cells into the next tick");
        }
    }

    fn random_updates(&mut self) {
        let n = self.store.origins().len();
        if n == 0 {
            return;
        }
        for _ in 0..self.config.ticks.random_updates_per_tick {
            let o = self.store.origins()[self.rng.usize(..n)];
            let x = o.x + self.rng.i32(0..CHUNK_SIZE);
            let y = o.y + self.rng.i32(0..CHUNK_SIZE);
            let z = o.z + self.rng.i32(0..CHUNK_SIZE);
            let Some(b) = self.get_block_eval(x, y, z).copied() else {
                continue;
            };
            if b.kind.ticks_randomly() {
                self.random_update(BlockPos::new(x, y, z), b);
            }
        }
    }

    // ---- generation ------------------------------------------------------------------------

    /// Requests generation of the batch holding `(x,y,z)` ahead of everything else.
    pub fn flag_generate(&mut self, x: i32, y: i32, z: i32) {
        if !in_vertical_range(y) {
            return;
        }
        let origin = BlockPos::new(generate_align(x), generate_align(y), generate_align(z));
        if !self.generated_batches.contains(&origin) {
            self.pool.offer(origin, -1.0);
        }
    }

    /// Merges finished batches, offers the best batch around the camera and hands it to an
    /// idle worker. Returns the number of batches merged.
    pub fn generate_chunks(&mut self, camera: &Camera) -> usize {
        let merged = self.merge_finished();
        self.scan_visibility(camera, self.config.generation.radius);
        self.pool.dispatch();
        merged
    }

    /// Offers every missing batch within `radius` blocks of the camera, prioritised by
    /// distance and halved for batches inside the view cone.
    pub fn scan_visibility(&mut self, camera: &Camera, radius: i32) {
        if !camera.position.is_finite() {
            return;
        }
        let r = radius.max(0);
        let (cx, cy, cz) = camera.position.floor_i32();
        let own = BlockPos::new(generate_align(cx), generate_align(cy), generate_align(cz));
        let forward = if camera.forward.is_finite() && camera.forward.length_sq() > 0.0 {
            camera.forward.normalized()
        } else {
            Vec3::ZERO
        };
        let half = GENERATE_SIZE as f32 * 0.5;
        for by in batch_span(cy, r) {
            if by < -DEPTH || by >= HEIGHT {
                continue;
            }
            for bz in batch_span(cz, r) {
                for bx in batch_span(cx, r) {
                    let origin = BlockPos::new(bx, by, bz);
                    if self.generated_batches.contains(&origin) {
                        continue;
                    }
                    let center =
                        Vec3::new(bx as f32 + half, by as f32 + half, bz as f32 + half);
                    let to = center - camera.position;
                    let dist = to.length();
                    if dist > r as f32 && origin != own {
                        continue;
                    }
                    let mut priority = dist;
                    if dist > 0.0 && forward.dot(to / dist) >= 0.5 {
                        priority *= 0.5;
                    }
                    self.pool.offer(origin, priority);
                }
            }
        }
    }

    fn merge_finished(&mut self) -> usize {
        let batches = self.pool.collect();
        let n = batches.len();
        for batch in &batches {
            self.merge_batch(batch);
        }
        n
    }

    /// Copies a generated batch into every sub-cube that is not generated yet, so edits
    /// made since the request survive, then schedules lighting along the batch border.
    pub(crate) fn merge_batch(&mut self, batch: &GeneratedChunk) {
        let o = batch.origin;
        let mut seeds = Vec::new();
        for cy in (0..GENERATE_SIZE).step_by(CHUNK_SIZE as usize) {
            for cz in (0..GENERATE_SIZE).step_by(CHUNK_SIZE as usize) {
                for cx in (0..GENERATE_SIZE).step_by(CHUNK_SIZE as usize) {
                    let origin = ChunkOrigin::new(o.x + cx, o.y + cy, o.z + cz);
                    let chunk = self.store.find_or_insert(origin);
                    let mut touched = false;
                    for sy in (0..CHUNK_SIZE).step_by(GENERATED_FLAG_SIZE as usize) {
                        for sz in (0..CHUNK_SIZE).step_by(GENERATED_FLAG_SIZE as usize) {
                            for sx in (0..CHUNK_SIZE).step_by(GENERATED_FLAG_SIZE as usize) {
                                let (x0, y0, z0) = (origin.x + sx, origin.y + sy, origin.z + sz);
                                if chunk.is_generated(x0, y0, z0) {
                                    continue;
                                }
                                for y in y0..y0 + GENERATED_FLAG_SIZE {
                                    for z in z0..z0 + GENERATED_FLAG_SIZE {
                                        for x in x0..x0 + GENERATED_FLAG_SIZE {
                                            let b = batch.get_local(x - o.x, y - o.y, z - o.z);
                                            if b.light_emission() > 0 || b.emits_particles() {
                                                seeds.push((BlockPos::new(x, y, z), b.emits_particles()));
                                            }
                                            chunk.replace_slot(x, y, z, Some(b));
                                        }
                                    }
                                }
                                chunk.set_generated(x0, y0, z0);
                                touched = true;
                            }
                        }
                    }
                    if touched {
                        chunk.recount_fire();
                        self.store.bump_display(origin);
                    }
                }
            }
        }
        self.generated_batches.insert(o);

        let n = GENERATE_SIZE;
        for a in 0..n {
            for b in 0..n {
                for (x, y, z, ox, oy, oz) in [
                    (0, a, b, -1, a, b),
                    (n - 1, a, b, n, a, b),
                    (a, 0, b, a, -1, b),
                    (a, n - 1, b, a, n, b),
                    (a, b, 0, a, b, -1),
                    (a, b, n - 1, a, b, n),
                ] {
                    self.enqueue_lighting(o.x + x, o.y + y, o.z + z);
                    let (nx, ny, nz) = (o.x.wrapping_add(ox), o.y + oy, o.z.wrapping_add(oz));
                    if self.store.is_generated(nx, ny, nz) {
                        self.enqueue_lighting(nx, ny, nz);
                    }
                }
            }
        }
        for (p, particles) in seeds {
            self.enqueue_lighting(p.x, p.y, p.z);
            if particles {
                self.eval.insert(QueueKind::Particles, p, None);
            }
        }
        debug!("merged batch {o:?}");
    }

    /// Generates every batch within `radius` blocks of `center` and waits for the results.
    /// Returns the number of batches merged.
    pub fn generate_around_blocking(&mut self, center: BlockPos, radius: i32) -> usize {
        let r = radius.max(0);
        let mut wanted = Vec::new();
        for by in batch_span(center.y, r) {
            if by < -DEPTH || by >= HEIGHT {
                continue;
            }
            for bz in batch_span(center.z, r) {
                for bx in batch_span(center.x, r) {
                    wanted.push(BlockPos::new(bx, by, bz));
                }
            }
        }
        wanted.sort_by_key(|b| b.manhattan(center));
        let mut todo: VecDeque<BlockPos> = wanted.into();

        let mut merged = 0;
        while let Some(origin) = todo.front().copied() {
            if self.generated_batches.contains(&origin) || self.pool.is_failed(origin) {
                todo.pop_front();
                continue;
            }
            if self.pool.is_covered(origin) {
                todo.pop_front();
                continue;
            }
            self.pool.offer(origin, -1.0);
            if self.pool.dispatch().is_some() {
                todo.pop_front();
                continue;
            }
            let before = (self.pool.stats().failed, merged);
            self.pool.wait_idle();
            merged += self.merge_finished();
            if (self.pool.stats().failed, merged) == before {
                warn!("generation stalled with {} batches left", todo.len());
                break;
            }
        }
        self.pool.wait_idle();
        merged += self.merge_finished();
        info!("generated {merged} batches around {center:?}");
        merged
    }

    /// Swaps the generator configuration; terrain generated so far is kept.
    pub fn update_generation_config(&mut self, config: WorldGenConfig) {
        let seed = self.seed();
        self.pool.update_settings(GenSettings::new(seed, config));
    }

    /// Drops every chunk, entity and queued evaluation. Blocks until no generation worker is
    /// busy so no stale batch is merged afterwards.
    pub fn clear(&mut self) {
        self.pool.reset();
        self.entities.clear(&mut self.store);
        self.store.clear();
        self.eval.clear();
        self.timed.clear();
        self.trees.clear();
        self.explosions.clear();
        self.generated_batches.clear();
        self.time_of_day = self.config.day.start_time.rem_euclid(1.0) % 1.0;
        info!("world cleared");
    }
}
