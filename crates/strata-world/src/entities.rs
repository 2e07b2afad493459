use hashbrown::HashMap;
use strata_chunk::{ChunkOrigin, ChunkStore, EntityId};
use strata_geom::Vec3;

use crate::entity::Entity;

#[derive(Debug)]
struct Node {
    entity: Option<Entity>,
    prev: Option<EntityId>,
    next: Option<EntityId>,
    chunk_prev: Option<EntityId>,
    chunk_next: Option<EntityId>,
    bucket: Option<ChunkOrigin>,
}

/// Arena of entities threaded on two intrusive lists: the global list (head/tail kept here)
/// and one per-chunk bucket list (head/tail kept in the chunk).
///
/// A node whose entity is taken out for stepping stays on the global list but is unlinked
/// from its bucket until it is restored.
#[derive(Debug, Default)]
pub struct EntityIndex {
    nodes: HashMap<EntityId, Node>,
    head: Option<EntityId>,
    tail: Option<EntityId>,
    next_id: u32,
}

fn bucket_of(pos: Vec3) -> ChunkOrigin {
    let (x, y, z) = pos.floor_i32();
    ChunkOrigin::containing(x, y, z)
}

impl EntityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn alloc_id(&mut self) -> EntityId {
        loop {
            let id = EntityId(self.next_id);
            self.next_id = self.next_id.wrapping_add(1);
            if !self.nodes.contains_key(&id) {
                return id;
            }
        }
    }

    /// Links `entity` at the head of the global list and into its chunk bucket.
    /// Empty entities and entities outside the vertical band are dropped and get no id.
    pub fn insert(&mut self, store: &mut ChunkStore, entity: Entity) -> Option<EntityId> {
        if entity.is_empty() || !entity.in_band() {
            return None;
        }
        let id = self.alloc_id();
        self.nodes.insert(
            id,
            Node {
                entity: Some(entity),
                prev: None,
                next: self.head,
                chunk_prev: None,
                chunk_next: None,
                bucket: None,
            },
        );
        match self.head {
            Some(h) => {
                if let Some(n) = self.nodes.get_mut(&h) {
                    n.prev = Some(id);
                }
            }
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        self.link_bucket(store, id);
        Some(id)
    }

    fn link_bucket(&mut self, store: &mut ChunkStore, id: EntityId) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let Some(entity) = &node.entity else {
            return;
        };
        debug_assert!(node.bucket.is_none(), "entity {id:?} already bucketed");
        let origin = bucket_of(entity.pos);
        let list = &mut store.find_or_insert(origin).entities;
        let old_head = list.head;
        list.head = Some(id);
        if old_head.is_none() {
            list.tail = Some(id);
        }
        list.len += 1;
        if let Some(h) = old_head {
            if let Some(n) = self.nodes.get_mut(&h) {
                n.chunk_prev = Some(id);
            }
        }
        if let Some(n) = self.nodes.get_mut(&id) {
            n.chunk_prev = None;
            n.chunk_next = old_head;
            n.bucket = Some(origin);
        }
    }

    fn unlink_bucket(&mut self, store: &mut ChunkStore, id: EntityId) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        let Some(origin) = node.bucket.take() else {
            return;
        };
        let (prev, next) = (node.chunk_prev.take(), node.chunk_next.take());
        if let Some(p) = prev {
            if let Some(n) = self.nodes.get_mut(&p) {
                n.chunk_next = next;
            }
        }
        if let Some(nx) = next {
            if let Some(n) = self.nodes.get_mut(&nx) {
                n.chunk_prev = prev;
            }
        }
        if let Some(chunk) = store.find_mut(origin) {
            let list = &mut chunk.entities;
            if list.head == Some(id) {
                list.head = next;
            }
            if list.tail == Some(id) {
                list.tail = prev;
            }
            list.len = list.len.saturating_sub(1);
        }
    }

    fn unlink_global(&mut self, id: EntityId) -> Option<Node> {
        let node = self.nodes.remove(&id)?;
        match node.prev {
            Some(p) => {
                if let Some(n) = self.nodes.get_mut(&p) {
                    n.next = node.next;
                }
            }
            None => self.head = node.next,
        }
        match node.next {
            Some(nx) => {
                if let Some(n) = self.nodes.get_mut(&nx) {
                    n.prev = node.prev;
                }
            }
            None => self.tail = node.prev,
        }
        Some(node)
    }

    pub fn remove(&mut self, store: &mut ChunkStore, id: EntityId) -> Option<Entity> {
        self.unlink_bucket(store, id);
        self.unlink_global(id)?.entity
    }

    /// Unlinks the entity from its bucket and moves it out for stepping.
    pub fn take(&mut self, store: &mut ChunkStore, id: EntityId) -> Option<Entity> {
        self.unlink_bucket(store, id);
        self.nodes.get_mut(&id)?.entity.take()
    }

    /// Puts a stepped entity back and rebuckets it at its new position. An entity that
    /// became empty or left the vertical band leaves the index entirely.
    pub fn restore(&mut self, store: &mut ChunkStore, id: EntityId, entity: Entity) {
        if entity.is_empty() || !entity.in_band() {
            self.unlink_global(id);
            return;
        }
        let Some(node) = self.nodes.get_mut(&id) else {
            debug_assert!(false, "restoring unknown entity {id:?}");
            return;
        };
        debug_assert!(node.entity.is_none(), "entity {id:?} restored twice");
        node.entity = Some(entity);
        self.link_bucket(store, id);
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.nodes.get(&id)?.entity.as_ref()
    }

    /// Mutable access that must not move the entity to another chunk.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.nodes.get_mut(&id)?.entity.as_mut()
    }

    /// Snapshot of every id in global order.
    pub fn ids(&self) -> Vec<EntityId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut cur = self.head;
        while let Some(id) = cur {
            out.push(id);
            cur = self.nodes.get(&id).and_then(|n| n.next);
        }
        out
    }

    /// Entities in global order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        let mut cur = self.head;
        std::iter::from_fn(move || {
            loop {
                let id = cur?;
                let node = self.nodes.get(&id)?;
                cur = node.next;
                if let Some(e) = &node.entity {
                    return Some((id, e));
                }
            }
        })
    }

    /// Entities bucketed in the chunk at `origin`, following the chunk's links.
    pub fn in_chunk<'a>(
        &'a self,
        store: &'a ChunkStore,
        origin: ChunkOrigin,
    ) -> impl Iterator<Item = (EntityId, &'a Entity)> + 'a {
        let mut cur = store.find(origin).and_then(|c| c.entities.head);
        std::iter::from_fn(move || {
            loop {
                let id = cur?;
                let node = self.nodes.get(&id)?;
                cur = node.chunk_next;
                if let Some(e) = &node.entity {
                    return Some((id, e));
                }
            }
        })
    }

    /// Lazily walks the buckets of every chunk overlapping `[min, max]` and yields the
    /// entities whose position lies inside the box.
    pub fn in_box<'a>(&'a self, store: &'a ChunkStore, min: Vec3, max: Vec3) -> EntitiesInBox<'a> {
        let lo = bucket_of(min);
        let hi = bucket_of(max);
        EntitiesInBox {
            index: self,
            store,
            min,
            max,
            lo,
            hi,
            next_chunk: Some(lo),
            cur: None,
        }
    }

    /// Drops every entity and resets the bucket lists of the chunks they were in.
    pub fn clear(&mut self, store: &mut ChunkStore) {
        for node in self.nodes.values() {
            if let Some(origin) = node.bucket {
                if let Some(c) = store.find_mut(origin) {
                    c.entities = Default::default();
                }
            }
        }
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    /// Verifies that every entity is on the global list once and in exactly the bucket its
    /// position maps to, and that every chunk bucket links back consistently.
    pub fn check_consistency(&self, store: &ChunkStore) -> Result<(), String> {
        let ids = self.ids();
        if ids.len() != self.nodes.len() {
            return Err(format!(
                "global list has {} entries, arena has {}",
                ids.len(),
                self.nodes.len()
            ));
        }
        let mut backward = Vec::with_capacity(ids.len());
        let mut cur = self.tail;
        while let Some(id) = cur {
            backward.push(id);
            cur = self.nodes.get(&id).and_then(|n| n.prev);
        }
        backward.reverse();
        if backward != ids {
            return Err("global list prev links disagree with next links".into());
        }
        let mut seen = hashbrown::HashSet::new();
        for chunk in store.chunks() {
            let mut count = 0u32;
            let mut prev = None;
            let mut cur = chunk.entities.head;
            while let Some(id) = cur {
                let node = self
                    .nodes
                    .get(&id)
                    .ok_or_else(|| format!("bucket of {:?} holds unknown {id:?}", chunk.origin()))?;
                if !seen.insert(id) {
                    return Err(format!("{id:?} is in more than one bucket"));
                }
                if node.bucket != Some(chunk.origin()) || node.chunk_prev != prev {
                    return Err(format!("{id:?} has stale bucket links"));
                }
                match &node.entity {
                    Some(e) if !e.is_empty() => {
                        if bucket_of(e.pos) != chunk.origin() {
                            return Err(format!("{id:?} is bucketed away from its position"));
                        }
                    }
                    _ => return Err(format!("empty {id:?} occupies a bucket")),
                }
                count += 1;
                prev = Some(id);
                cur = node.chunk_next;
            }
            if chunk.entities.tail != prev || chunk.entities.len != count {
                return Err(format!("bucket header of {:?} is stale", chunk.origin()));
            }
        }
        for (id, node) in &self.nodes {
            if node.entity.is_some() && !seen.contains(id) {
                return Err(format!("{id:?} is in no bucket"));
            }
        }
        Ok(())
    }
}

/// Iterator returned by [`EntityIndex::in_box`].
pub struct EntitiesInBox<'a> {
    index: &'a EntityIndex,
    store: &'a ChunkStore,
    min: Vec3,
    max: Vec3,
    lo: ChunkOrigin,
    hi: ChunkOrigin,
    next_chunk: Option<ChunkOrigin>,
    cur: Option<EntityId>,
}

impl EntitiesInBox<'_> {
    fn advance_chunk(&mut self) -> Option<ChunkOrigin> {
        let c = self.next_chunk?;
        // compare before stepping so a range ending at the i32 limit cannot wrap around
        self.next_chunk = if c.x < self.hi.x {
            Some(c.offset_chunks(1, 0, 0))
        } else if c.z < self.hi.z {
            Some(ChunkOrigin::containing(self.lo.x, c.y, c.z).offset_chunks(0, 0, 1))
        } else if c.y < self.hi.y {
            Some(ChunkOrigin::containing(self.lo.x, c.y, self.lo.z).offset_chunks(0, 1, 0))
        } else {
            None
        };
        Some(c)
    }
}

impl<'a> Iterator for EntitiesInBox<'a> {
    type Item = (EntityId, &'a Entity);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            while let Some(id) = self.cur {
                let node = self.index.nodes.get(&id)?;
                self.cur = node.chunk_next;
                if let Some(e) = &node.entity {
                    let p = e.pos;
                    if p.x >= self.min.x
                        && p.y >= self.min.y
                        && p.z >= self.min.z
                        && p.x <= self.max.x
                        && p.y <= self.max.y
                        && p.z <= self.max.z
                    {
                        return Some((id, e));
                    }
                }
            }
            let origin = self.advance_chunk()?;
            self.cur = self.store.find(origin).and_then(|c| c.entities.head);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;
    use strata_blocks::{Block, BlockKind};

    fn item_at(x: f32, y: f32, z: f32) -> Entity {
        Entity::item(Vec3::new(x, y, z), Block::new(BlockKind::Dirt), Vec3::ZERO)
    }

    #[test]
    fn insert_remove_keeps_lists_consistent() {
        let mut store = ChunkStore::new();
        let mut idx = EntityIndex::new();
        let a = idx.insert(&mut store, item_at(0.5, 0.5, 0.5)).unwrap();
        let b = idx.insert(&mut store, item_at(1.5, 0.5, 0.5)).unwrap();
        let c = idx.insert(&mut store, item_at(9.5, 0.5, 0.5)).unwrap();
        idx.check_consistency(&store).unwrap();
        assert_eq!(idx.ids(), vec![c, b, a]);
        assert_eq!(idx.in_chunk(&store, ChunkOrigin::new(0, 0, 0)).count(), 2);

        assert!(idx.remove(&mut store, b).is_some());
        idx.check_consistency(&store).unwrap();
        assert_eq!(idx.ids(), vec![c, a]);
        assert_eq!(store.find(ChunkOrigin::new(0, 0, 0)).unwrap().entities.len, 1);
    }

    #[test]
    fn empty_entities_are_not_indexed() {
        let mut store = ChunkStore::new();
        let mut idx = EntityIndex::new();
        assert!(idx.insert(&mut store, Entity::new(Vec3::ZERO, EntityKind::Nothing)).is_none());
        assert!(idx.is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn entities_outside_the_band_are_not_indexed() {
        let mut store = ChunkStore::new();
        let mut idx = EntityIndex::new();
        assert!(idx.insert(&mut store, item_at(0.5, -64.5, 0.5)).is_none());
        assert!(idx.insert(&mut store, item_at(0.5, 10_000.5, 0.5)).is_none());
        assert!(store.is_empty());

        let id = idx.insert(&mut store, item_at(0.5, -63.5, 0.5)).unwrap();
        let mut e = idx.take(&mut store, id).unwrap();
        e.pos.y = -70.0;
        idx.restore(&mut store, id, e);
        assert!(idx.is_empty());
        assert!(store.origins().iter().all(|o| o.y >= -64));
        idx.check_consistency(&store).unwrap();
    }

    #[test]
    fn take_and_restore_rebuckets() {
        let mut store = ChunkStore::new();
        let mut idx = EntityIndex::new();
        let id = idx.insert(&mut store, item_at(0.5, 0.5, 0.5)).unwrap();
        let mut e = idx.take(&mut store, id).unwrap();
        assert_eq!(idx.in_chunk(&store, ChunkOrigin::new(0, 0, 0)).count(), 0);
        e.pos = Vec3::new(-3.5, 0.5, 0.5);
        idx.restore(&mut store, id, e);
        idx.check_consistency(&store).unwrap();
        assert_eq!(idx.in_chunk(&store, ChunkOrigin::new(-4, 0, 0)).count(), 1);

        let mut e = idx.take(&mut store, id).unwrap();
        e.clear();
        idx.restore(&mut store, id, e);
        assert!(idx.is_empty());
        idx.check_consistency(&store).unwrap();
    }

    #[test]
    fn box_query_spans_chunks() {
        let mut store = ChunkStore::new();
        let mut idx = EntityIndex::new();
        for x in -10..10 {
            idx.insert(&mut store, item_at(x as f32 + 0.5, 2.5, 0.5));
        }
        let hits: Vec<_> = idx
            .in_box(&store, Vec3::new(-5.0, 0.0, 0.0), Vec3::new(5.0, 4.0, 1.0))
            .map(|(_, e)| e.pos.x)
            .collect();
        assert_eq!(hits.len(), 10);
        assert!(hits.iter().all(|x| (-5.0..=5.0).contains(x)));
    }
}
