use strata_eval::QueueKind;
use strata_geom::Vec3;

use crate::entity::{Entity, ParticleKind};
use crate::world::World;

impl World {
    /// Drains the Particles queue once. Emitters spawn a particle with probability
    /// `particle_rate * dt` and queue themselves again; cells that stopped emitting drop out.
    pub(crate) fn generate_particles(&mut self, dt: f32) {
        let rate = self.config.effects.particle_rate;
        for node in self.eval.detach(QueueKind::Particles) {
            let p = node.pos;
            let Some(b) = self.block_at(p) else {
                continue;
            };
            let Some(kind) = ParticleKind::for_block(&b) else {
                continue;
            };
            if self.rng.f32() < rate * dt {
                let jitter = |rng: &mut fastrand::Rng| 0.3 + 0.4 * rng.f32();
                let x = p.x as f32 + jitter(&mut self.rng);
                let z = p.z as f32 + jitter(&mut self.rng);
                let (y, vy) = match kind {
                    ParticleKind::LavaDrip => (p.y as f32, -1.0),
                    _ => (p.y as f32 + 0.8, 0.4 + 0.3 * self.rng.f32()),
                };
                let v = Vec3::new(
                    (self.rng.f32() - 0.5) * 0.1,
                    vy,
                    (self.rng.f32() - 0.5) * 0.1,
                );
                let lifetime = 0.8 + self.rng.f32();
                self.insert_entity(Entity::particle(Vec3::new(x, y, z), kind, v, lifetime));
            }
            self.eval.insert(QueueKind::Particles, p, None);
        }
    }
}
