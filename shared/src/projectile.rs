//! Live projectile registry.
//!
//! Projectiles fly in a straight line at constant speed. Each `update` runs in
//! two phases: every projectile is advanced first, then every projectile is
//! checked for retirement, so one projectile's fate never depends on another
//! that has not moved yet and nothing is retired twice in a tick.

use crate::context::{PhysicsProvider, SceneEntity, SceneProvider};
use crate::PlayerId;
use glam::Vec3;
use log::debug;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProjectileId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: ProjectileId,
    pub owner: PlayerId,
    pub position: Vec3,
    /// Unit vector.
    pub direction: Vec3,
    pub speed: f32,
    pub distance_traveled: f32,
    pub range: f32,
    /// Set by the physics collision callback.
    pub collided: bool,
}

impl Projectile {
    fn advance(&mut self, dt: f32) {
        let step = self.speed * dt;
        self.position += self.direction * step;
        self.distance_traveled += step;
    }

    pub fn should_retire(&self) -> bool {
        self.collided || self.distance_traveled >= self.range
    }
}

#[derive(Debug, Default)]
pub struct ProjectileManager {
    live: BTreeMap<ProjectileId, Projectile>,
    next_id: u64,
}

impl ProjectileManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new projectile and adds it to the scene.
    ///
    /// The direction is normalised; a degenerate direction falls back to the
    /// forward axis (-Z).
    pub fn spawn(
        &mut self,
        scene: &mut dyn SceneProvider,
        owner: PlayerId,
        origin: Vec3,
        direction: Vec3,
        speed: f32,
        range: f32,
    ) -> ProjectileId {
        let id = ProjectileId(self.next_id);
        self.next_id += 1;

        let projectile = Projectile {
            id,
            owner,
            position: origin,
            direction: direction.try_normalize().unwrap_or(Vec3::NEG_Z),
            speed,
            distance_traveled: 0.0,
            range,
            collided: false,
        };

        debug!("Projectile {:?} spawned by player {} at {}", id, owner, origin);
        self.live.insert(id, projectile);
        scene.add(SceneEntity::Projectile(id));
        id
    }

    /// Advances all projectiles by `dt`, then retires the ones that ran out
    /// of range or collided. Returns the retired ids.
    pub fn update(&mut self, scene: &mut dyn SceneProvider, dt: f32) -> Vec<ProjectileId> {
        for projectile in self.live.values_mut() {
            projectile.advance(dt);
        }

        let expired: Vec<ProjectileId> = self
            .live
            .values()
            .filter(|p| p.should_retire())
            .map(|p| p.id)
            .collect();

        for id in &expired {
            self.retire(scene, *id);
        }

        expired
    }

    /// Removes a projectile from the registry and the scene.
    ///
    /// Returns false, touching nothing, if the id is not live anymore.
    pub fn retire(&mut self, scene: &mut dyn SceneProvider, id: ProjectileId) -> bool {
        if self.live.remove(&id).is_none() {
            return false;
        }
        scene.remove(SceneEntity::Projectile(id));
        true
    }

    /// Collision callback entry point. Late callbacks for retired
    /// projectiles are ignored.
    pub fn mark_collided(&mut self, id: ProjectileId) -> bool {
        match self.live.get_mut(&id) {
            Some(projectile) => {
                projectile.collided = true;
                true
            }
            None => false,
        }
    }

    pub fn sync_collisions(&mut self, physics: &dyn PhysicsProvider) {
        for projectile in self.live.values_mut() {
            if physics.projectile_collided(projectile.id) {
                projectile.collided = true;
            }
        }
    }

    /// Retires every projectile fired by `owner`; returns how many.
    pub fn retire_owned_by(&mut self, scene: &mut dyn SceneProvider, owner: PlayerId) -> usize {
        let owned: Vec<ProjectileId> = self
            .live
            .values()
            .filter(|p| p.owner == owner)
            .map(|p| p.id)
            .collect();

        owned.into_iter().filter(|id| self.retire(scene, *id)).count()
    }

    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.live.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.live.values()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
