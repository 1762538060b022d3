//! Seams to the externally supplied capabilities (scene, audio, physics,
//! input) and the simulation context that owns the projectile registry.
//!
//! Nothing here is global: the simulation loop builds one context and hands
//! it by reference to whatever needs to spawn projectiles or play sounds.

use crate::projectile::{ProjectileId, ProjectileManager};
use crate::PlayerId;
use glam::Vec3;

/// Something the render scene can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneEntity {
    Projectile(ProjectileId),
    Player(PlayerId),
}

pub trait SceneProvider {
    fn add(&mut self, entity: SceneEntity);
    fn remove(&mut self, entity: SceneEntity);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    Fire { owner: PlayerId },
    Reload { owner: PlayerId },
}

/// Fire-and-forget playback.
pub trait AudioProvider {
    fn play(&mut self, cue: AudioCue);
}

/// Kinematic state of a body as reported by the physics engine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BodyState {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Euler XYZ angles in radians.
    pub rotation: Vec3,
    pub grounded: bool,
}

pub trait PhysicsProvider {
    fn body(&self, player: PlayerId) -> Option<BodyState>;
    fn projectile_collided(&self, id: ProjectileId) -> bool;
}

/// One tick worth of sampled input.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputFrame {
    pub fire: bool,
    pub reload: bool,
    /// Strafe axis in [-1, 1].
    pub move_x: f32,
    /// Forward axis in [-1, 1].
    pub move_z: f32,
    pub jump: bool,
}

pub trait InputProvider {
    fn poll(&mut self) -> InputFrame;
}

/// Registries and collaborators shared by everything simulated in one tick.
pub struct SimulationContext<S, A> {
    pub projectiles: ProjectileManager,
    pub scene: S,
    pub audio: A,
}

impl<S: SceneProvider, A: AudioProvider> SimulationContext<S, A> {
    pub fn new(scene: S, audio: A) -> Self {
        Self {
            projectiles: ProjectileManager::new(),
            scene,
            audio,
        }
    }

    /// Spawns a projectile into the registry and the scene.
    pub fn spawn_projectile(
        &mut self,
        owner: PlayerId,
        origin: Vec3,
        direction: Vec3,
        speed: f32,
        range: f32,
    ) -> ProjectileId {
        self.projectiles
            .spawn(&mut self.scene, owner, origin, direction, speed, range)
    }

    /// Polls physics for collisions, then advances and retires projectiles.
    pub fn step_projectiles(&mut self, physics: &dyn PhysicsProvider, dt: f32) -> Vec<ProjectileId> {
        self.projectiles.sync_collisions(physics);
        self.projectiles.update(&mut self.scene, dt)
    }

    /// Retires every live projectile fired by `owner`.
    pub fn retire_projectiles_of(&mut self, owner: PlayerId) -> usize {
        self.projectiles.retire_owned_by(&mut self.scene, owner)
    }
}
