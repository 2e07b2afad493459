//! Binary save format, little endian throughout:
//!
//! ```text
//! "STRW" u32:version | payload | u32:crc32(payload)
//! payload = seed i32, worldgen toml (u32 len + utf8), time_of_day f32, rng seed u64,
//!           chunks, entities, 7 eval queues, timed invalidations, pending tree growth
//! ```

use std::fs;
use std::path::Path;

use crc32fast::Hasher;
use hashbrown::{HashMap, HashSet};
use log::info;
use strata_blocks::{Block, BlockKind, MAX_LIGHT};
use strata_chunk::{
    BlockPos, CHUNK_SIZE, CHUNK_VOLUME, ChunkOrigin, GENERATE_SIZE, GENERATED_FLAG_SIZE,
    generate_align, in_vertical_range,
};
use strata_eval::{EvalNode, QueueKind};
use strata_geom::Vec3;
use strata_worldgen::{GenSettings, WorldGenConfig};
use thiserror::Error;

use crate::entity::{Entity, EntityKind, ParticleKind};
use crate::world::World;

const MAGIC: &[u8; 4] = b"STRW";
pub const FORMAT_VERSION: u32 = 1;
/// Chunks per generator batch.
const BATCH_CHUNKS: usize = ((GENERATE_SIZE / CHUNK_SIZE) * (GENERATE_SIZE / CHUNK_SIZE) * (GENERATE_SIZE / CHUNK_SIZE)) as usize;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading save: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a world save")]
    BadMagic,
    #[error("unsupported save version {0}")]
    UnsupportedVersion(u32),
    #[error("checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { stored: u32, computed: u32 },
    #[error("corrupt save: {0}")]
    Corrupt(String),
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("writing save: {0}")]
    Io(#[from] std::io::Error),
    #[error("encoding worldgen settings: {0}")]
    Settings(#[from] toml::ser::Error),
}

fn corrupt(msg: impl Into<String>) -> LoadError {
    LoadError::Corrupt(msg.into())
}

/// Generated-flag bit of the sub-cube holding slot `i` of a chunk.
fn sub_cube_bit(i: usize) -> u8 {
    let (cs, fs) = (CHUNK_SIZE as usize, GENERATED_FLAG_SIZE as usize);
    let per_axis = cs / fs;
    let (lx, lz, ly) = (i % cs, (i / cs) % cs, i / (cs * cs));
    1 << (((ly / fs) * per_axis + lz / fs) * per_axis + lx / fs)
}

// ---- writing ---------------------------------------------------------------------------------

#[derive(Default)]
struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }
    fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }
    fn i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }
    fn u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }
    fn f32(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }
    fn len(&mut self, n: usize) {
        self.u32(n as u32);
    }
    fn pos(&mut self, p: BlockPos) {
        self.i32(p.x);
        self.i32(p.y);
        self.i32(p.z);
    }
    fn vec3(&mut self, v: Vec3) {
        self.f32(v.x);
        self.f32(v.y);
        self.f32(v.z);
    }
    fn block_id(&mut self, b: &Block) {
        self.u8(b.kind.id());
        self.u8(b.meta);
    }
    fn block_full(&mut self, b: &Block) {
        self.block_id(b);
        self.u8(b.sky_light);
        self.u8(b.block_light);
    }

    fn entity(&mut self, e: &Entity) {
        let tag = match &e.kind {
            EntityKind::Nothing => return,
            EntityKind::Item { .. } => 0,
            EntityKind::ThrownBlock { .. } => 1,
            EntityKind::Particle { .. } => 2,
            EntityKind::FallingBlock { .. } => 3,
            EntityKind::PrimedTnt { .. } => 4,
            EntityKind::PlaceBlockIfReplaceable { .. } => 5,
            EntityKind::RemoveBlockIfEqual { .. } => 6,
            EntityKind::ApplyBoneMealOrPutBackInContainer => 7,
            EntityKind::TransferItem { .. } => 8,
        };
        self.u8(tag);
        self.vec3(e.pos);
        match &e.kind {
            EntityKind::Nothing | EntityKind::ApplyBoneMealOrPutBackInContainer => {}
            EntityKind::Item {
                block,
                velocity,
                age,
            } => {
                self.block_id(block);
                self.vec3(*velocity);
                self.f32(*age);
            }
            EntityKind::ThrownBlock { block, velocity }
            | EntityKind::FallingBlock { block, velocity } => {
                self.block_id(block);
                self.vec3(*velocity);
            }
            EntityKind::Particle {
                kind,
                velocity,
                age,
                lifetime,
                frame,
            } => {
                self.u8(*kind as u8);
                self.vec3(*velocity);
                self.f32(*age);
                self.f32(*lifetime);
                self.u8(*frame);
            }
            EntityKind::PrimedTnt { fuse, velocity } => {
                self.f32(*fuse);
                self.vec3(*velocity);
            }
            EntityKind::PlaceBlockIfReplaceable { block }
            | EntityKind::RemoveBlockIfEqual { block } => self.block_id(block),
            EntityKind::TransferItem { block, to } => {
                self.block_id(block);
                self.pos(*to);
            }
        }
    }
}

// ---- reading ---------------------------------------------------------------------------------

struct Reader<'a> {
    buf: &'a [u8],
    at: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, at: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.at
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], LoadError> {
        if self.remaining() < n {
            return Err(corrupt(format!("truncated at byte {}", self.at)));
        }
        let s = &self.buf[self.at..self.at + n];
        self.at += n;
        Ok(s)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], LoadError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, LoadError> {
        Ok(self.take(1)?[0])
    }
    fn u32(&mut self) -> Result<u32, LoadError> {
        Ok(u32::from_le_bytes(self.array()?))
    }
    fn i32(&mut self) -> Result<i32, LoadError> {
        Ok(i32::from_le_bytes(self.array()?))
    }
    fn u64(&mut self) -> Result<u64, LoadError> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    fn f32(&mut self) -> Result<f32, LoadError> {
        let v = f32::from_le_bytes(self.array()?);
        if !v.is_finite() {
            return Err(corrupt(format!("non-finite float at byte {}", self.at - 4)));
        }
        Ok(v)
    }

    /// Record count, rejected when even the smallest records would overrun the buffer.
    fn count(&mut self, min_record: usize) -> Result<usize, LoadError> {
        let n = self.u32()? as usize;
        if n.saturating_mul(min_record) > self.remaining() {
            return Err(corrupt(format!("count {n} exceeds remaining data")));
        }
        Ok(n)
    }

    fn pos(&mut self) -> Result<BlockPos, LoadError> {
        let p = BlockPos::new(self.i32()?, self.i32()?, self.i32()?);
        if !in_vertical_range(p.y) {
            return Err(corrupt(format!("position {p:?} outside the world band")));
        }
        Ok(p)
    }

    fn vec3(&mut self) -> Result<Vec3, LoadError> {
        Ok(Vec3::new(self.f32()?, self.f32()?, self.f32()?))
    }

    fn block_id(&mut self) -> Result<Block, LoadError> {
        let id = self.u8()?;
        let kind = BlockKind::from_id(id).ok_or_else(|| corrupt(format!("unknown block kind {id}")))?;
        let meta = self.u8()?;
        if !kind.meta_is_valid(meta) {
            return Err(corrupt(format!("metadata {meta} invalid for {}", kind.name())));
        }
        Ok(Block::with_meta(kind, meta))
    }

    fn block_full(&mut self) -> Result<Block, LoadError> {
        let mut b = self.block_id()?;
        b.sky_light = self.u8()?;
        b.block_light = self.u8()?;
        if b.sky_light > MAX_LIGHT || b.block_light > MAX_LIGHT {
            return Err(corrupt("light level above 15"));
        }
        Ok(b)
    }

    fn entity(&mut self) -> Result<Entity, LoadError> {
        let tag = self.u8()?;
        let pos = self.vec3()?;
        let kind = match tag {
            0 => EntityKind::Item {
                block: self.block_id()?,
                velocity: self.vec3()?,
                age: self.f32()?,
            },
            1 => EntityKind::ThrownBlock {
                block: self.block_id()?,
                velocity: self.vec3()?,
            },
            2 => {
                let k = self.u8()?;
                let kind = ParticleKind::from_index(k)
                    .ok_or_else(|| corrupt(format!("unknown particle kind {k}")))?;
                EntityKind::Particle {
                    kind,
                    velocity: self.vec3()?,
                    age: self.f32()?,
                    lifetime: self.f32()?,
                    frame: self.u8()?,
                }
            }
            3 => EntityKind::FallingBlock {
                block: self.block_id()?,
                velocity: self.vec3()?,
            },
            4 => EntityKind::PrimedTnt {
                fuse: self.f32()?,
                velocity: self.vec3()?,
            },
            5 => EntityKind::PlaceBlockIfReplaceable {
                block: self.block_id()?,
            },
            6 => EntityKind::RemoveBlockIfEqual {
                block: self.block_id()?,
            },
            7 => EntityKind::ApplyBoneMealOrPutBackInContainer,
            // the target may lie outside the band; the item then drops where it is
            8 => EntityKind::TransferItem {
                block: self.block_id()?,
                to: BlockPos::new(self.i32()?, self.i32()?, self.i32()?),
            },
            t => return Err(corrupt(format!("unknown entity tag {t}"))),
        };
        Ok(Entity::new(pos, kind))
    }
}

struct ChunkRecord {
    origin: ChunkOrigin,
    flags: u8,
    slots: Vec<(usize, Block)>,
}

/// Fully decoded and validated save, applied to a world only once everything parsed.
struct SaveData {
    settings: GenSettings,
    time_of_day: f32,
    rng_seed: u64,
    chunks: Vec<ChunkRecord>,
    entities: Vec<Entity>,
    queues: Vec<(QueueKind, Vec<EvalNode>)>,
    timed: Vec<(BlockPos, f32)>,
    trees: Vec<BlockPos>,
}

fn decode(bytes: &[u8]) -> Result<SaveData, LoadError> {
    if bytes.len() < 12 || &bytes[..4] != MAGIC {
        return Err(LoadError::BadMagic);
    }
    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != FORMAT_VERSION {
        return Err(LoadError::UnsupportedVersion(version));
    }
    let (payload, trailer) = bytes[8..].split_at(bytes.len() - 12);
    let stored = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    let mut hasher = Hasher::new();
    hasher.update(payload);
    let computed = hasher.finalize();
    if stored != computed {
        return Err(LoadError::ChecksumMismatch { stored, computed });
    }

    let mut r = Reader::new(payload);
    let seed = r.i32()?;
    let text_len = r.count(1)?;
    let text = std::str::from_utf8(r.take(text_len)?)
        .map_err(|e| corrupt(format!("worldgen settings are not utf-8: {e}")))?;
    let config: WorldGenConfig = GenSettings::config_from_toml(text)
        .map_err(|e| corrupt(format!("worldgen settings: {e}")))?;
    let time_of_day = r.f32()?;
    if !(0.0..1.0).contains(&time_of_day) {
        return Err(corrupt(format!("time of day {time_of_day} outside [0,1)")));
    }
    let rng_seed = r.u64()?;

    let n_chunks = r.count(12 + 1 + 8)?;
    let mut chunks = Vec::with_capacity(n_chunks);
    let mut seen = HashSet::with_capacity(n_chunks);
    for _ in 0..n_chunks {
        let (x, y, z) = (r.i32()?, r.i32()?, r.i32()?);
        let origin = ChunkOrigin::containing(x, y, z);
        if (origin.x, origin.y, origin.z) != (x, y, z) {
            return Err(corrupt(format!("misaligned chunk origin ({x},{y},{z})")));
        }
        if !in_vertical_range(y) {
            return Err(corrupt(format!("chunk origin ({x},{y},{z}) outside the world band")));
        }
        if !seen.insert(origin) {
            return Err(corrupt(format!("duplicate chunk {origin:?}")));
        }
        let flags = r.u8()?;
        if flags == 0 {
            return Err(corrupt(format!("chunk {origin:?} has nothing generated")));
        }
        let mask = r.u64()?;
        let mut slots = Vec::with_capacity(mask.count_ones() as usize);
        let mut written = 0u8;
        for i in 0..CHUNK_VOLUME {
            if mask & (1u64 << i) != 0 {
                slots.push((i, r.block_full()?));
                written |= sub_cube_bit(i);
            }
        }
        // the world only flags a sub-cube after writing into it
        if flags & !written != 0 {
            return Err(corrupt(format!(
                "chunk {origin:?} flags sub-cubes {:#010b} with no blocks",
                flags & !written
            )));
        }
        chunks.push(ChunkRecord {
            origin,
            flags,
            slots,
        });
    }

    let n_entities = r.count(13)?;
    let mut entities = Vec::with_capacity(n_entities);
    for _ in 0..n_entities {
        let e = r.entity()?;
        if !e.in_band() {
            return Err(corrupt(format!("entity at {:?} outside the world band", e.pos)));
        }
        entities.push(e);
    }

    let mut queues = Vec::with_capacity(QueueKind::ALL.len());
    for kind in QueueKind::ALL {
        let n = r.count(13)?;
        let mut nodes = Vec::with_capacity(n);
        for _ in 0..n {
            let pos = r.pos()?;
            let payload = match r.u8()? {
                0 => None,
                1 => Some(r.block_id()?),
                f => return Err(corrupt(format!("bad payload flag {f}"))),
            };
            nodes.push(EvalNode { pos, payload });
        }
        queues.push((kind, nodes));
    }

    let n_timed = r.count(16)?;
    let mut timed = Vec::with_capacity(n_timed);
    for _ in 0..n_timed {
        let pos = r.pos()?;
        let secs = r.f32()?;
        if secs < 0.0 {
            return Err(corrupt("negative timer"));
        }
        timed.push((pos, secs));
    }

    let n_trees = r.count(12)?;
    let mut trees = Vec::with_capacity(n_trees);
    for _ in 0..n_trees {
        trees.push(r.pos()?);
    }

    if r.remaining() != 0 {
        return Err(corrupt(format!("{} trailing bytes", r.remaining())));
    }

    Ok(SaveData {
        settings: GenSettings::new(seed, config),
        time_of_day,
        rng_seed,
        chunks,
        entities,
        queues,
        timed,
        trees,
    })
}

impl World {
    /// Encodes the whole simulation state.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SaveError> {
        let settings = self.settings();
        let mut w = Writer::default();
        w.i32(settings.seed);
        let text = settings.config_to_toml()?;
        w.len(text.len());
        w.buf.extend_from_slice(text.as_bytes());
        w.f32(self.time_of_day);
        w.u64(self.rng.get_seed());

        let chunks: Vec<_> = self.store.chunks().filter(|c| c.any_generated()).collect();
        w.len(chunks.len());
        for c in chunks {
            let o = c.origin();
            w.i32(o.x);
            w.i32(o.y);
            w.i32(o.z);
            w.u8(c.generated_flags());
            let mut mask = 0u64;
            for (i, s) in c.slots().iter().enumerate() {
                if s.is_some() {
                    mask |= 1 << i;
                }
            }
            w.u64(mask);
            for b in c.slots().iter().flatten() {
                w.block_full(b);
            }
        }

        let live: Vec<&Entity> = self.entities.iter().map(|(_, e)| e).filter(|e| !e.is_empty()).collect();
        w.len(live.len());
        for e in live {
            w.entity(e);
        }

        for kind in QueueKind::ALL {
            let q = self.eval.queue(kind);
            w.len(q.len());
            for node in q.iter() {
                w.pos(node.pos);
                match &node.payload {
                    None => w.u8(0),
                    Some(b) => {
                        w.u8(1);
                        w.block_id(b);
                    }
                }
            }
        }

        w.len(self.timed.len());
        for (pos, secs) in self.timed.iter() {
            w.pos(*pos);
            w.f32(*secs);
        }

        w.len(self.trees.len());
        for p in &self.trees {
            w.pos(*p);
        }

        let payload = w.buf;
        let mut hasher = Hasher::new();
        hasher.update(&payload);
        let crc = hasher.finalize();

        let mut out = Vec::with_capacity(payload.len() + 12);
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        out.extend_from_slice(&payload);
        out.extend_from_slice(&crc.to_le_bytes());
        Ok(out)
    }

    pub fn save(&self, path: &Path) -> Result<(), SaveError> {
        let bytes = self.to_bytes()?;
        fs::write(path, &bytes)?;
        info!("saved world to {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    /// Replaces the whole world with a decoded save. On any error the world is untouched.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<(), LoadError> {
        let data = decode(bytes)?;
        self.apply(data);
        Ok(())
    }

    pub fn load(&mut self, path: &Path) -> Result<(), LoadError> {
        let bytes = fs::read(path)?;
        self.load_bytes(&bytes)?;
        info!(
            "loaded world from {}: {} chunks, {} entities",
            path.display(),
            self.store.len(),
            self.entities.len()
        );
        Ok(())
    }

    fn apply(&mut self, data: SaveData) {
        self.clear();
        if *self.pool.settings() != data.settings {
            self.pool.update_settings(data.settings);
        }
        self.time_of_day = data.time_of_day;
        self.rng = fastrand::Rng::with_seed(data.rng_seed);

        let mut per_batch: HashMap<BlockPos, usize> = HashMap::new();
        for rec in data.chunks {
            let o = rec.origin;
            let chunk = self.store.find_or_insert(o);
            for (i, b) in rec.slots {
                let i = i as i32;
                let (lx, lz, ly) = (i % CHUNK_SIZE, (i / CHUNK_SIZE) % CHUNK_SIZE, i / (CHUNK_SIZE * CHUNK_SIZE));
                chunk.replace_slot(o.x + lx, o.y + ly, o.z + lz, Some(b));
            }
            chunk.set_generated_flags(rec.flags);
            chunk.recount_fire();
            if chunk.is_fully_generated() {
                let batch = BlockPos::new(generate_align(o.x), generate_align(o.y), generate_align(o.z));
                *per_batch.entry(batch).or_default() += 1;
            }
        }
        for (batch, n) in per_batch {
            if n == BATCH_CHUNKS {
                self.generated_batches.insert(batch);
            }
        }

        // inserting at the head reverses order, so feed the saved list backwards
        for e in data.entities.into_iter().rev() {
            self.entities.insert(&mut self.store, e);
        }
        for (kind, nodes) in data.queues {
            for node in nodes {
                self.eval.insert(kind, node.pos, node.payload);
            }
        }
        for (pos, secs) in data.timed {
            self.timed.add(pos, secs);
        }
        self.trees = data.trees;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_rejects_overlong_counts() {
        let bytes = 1000u32.to_le_bytes();
        let mut r = Reader::new(&bytes);
        assert!(matches!(r.count(4), Err(LoadError::Corrupt(_))));
    }

    #[test]
    fn sub_cube_bits_follow_chunk_flags() {
        let mut c = strata_chunk::Chunk::new(ChunkOrigin::new(0, 0, 0));
        for i in 0..CHUNK_VOLUME {
            let s = CHUNK_SIZE as usize;
            let (x, z, y) = ((i % s) as i32, ((i / s) % s) as i32, (i / (s * s)) as i32);
            c.set_generated_flags(0);
            c.set_generated(x, y, z);
            assert_eq!(c.generated_flags(), sub_cube_bit(i), "slot {i}");
        }
    }

    #[test]
    fn reader_rejects_non_finite_floats() {
        let bytes = f32::NAN.to_le_bytes();
        let mut r = Reader::new(&bytes);
        assert!(r.f32().is_err());
    }

    #[test]
    fn block_ids_are_validated() {
        let bytes = [BlockKind::Lava.id(), 9];
        assert!(Reader::new(&bytes).block_id().is_err());
        let bytes = [200, 0];
        assert!(Reader::new(&bytes).block_id().is_err());
        let bytes = [BlockKind::Water.id(), 7];
        assert_eq!(Reader::new(&bytes).block_id().unwrap(), Block::fluid(BlockKind::Water, 7));
    }
}
