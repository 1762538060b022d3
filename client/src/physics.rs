//! Minimal kinematic bodies for running the client without a physics engine.
//!
//! Players walk on a flat floor, fall under gravity and turn at a fixed rate.
//! Projectiles never hit anything here; they are retired by range alone.

use shared::{BodyState, InputFrame, PhysicsProvider, PlayerId, ProjectileId, Vec3};
use std::collections::HashMap;

pub const MOVE_SPEED: f32 = 4.0;
pub const JUMP_VELOCITY: f32 = 5.0;
pub const GRAVITY: f32 = -9.82;
/// Eye height of a standing player.
pub const FLOOR_Y: f32 = 1.0;

#[derive(Debug, Default)]
pub struct KinematicPhysics {
    bodies: HashMap<PlayerId, BodyState>,
    /// Yaw change per second, in radians.
    turn_rate: f32,
}

impl KinematicPhysics {
    pub fn new(turn_rate: f32) -> Self {
        Self {
            bodies: HashMap::new(),
            turn_rate,
        }
    }

    pub fn spawn(&mut self, id: PlayerId, position: Vec3) {
        self.bodies.insert(
            id,
            BodyState {
                position,
                grounded: position.y <= FLOOR_Y,
                ..BodyState::default()
            },
        );
    }

    /// Applies one frame of input to a body and integrates it.
    pub fn integrate(&mut self, id: PlayerId, input: &InputFrame, dt: f32) {
        let Some(body) = self.bodies.get_mut(&id) else {
            return;
        };

        body.rotation.y += self.turn_rate * dt;

        let (sin, cos) = body.rotation.y.sin_cos();
        // Forward is -Z at zero yaw.
        let forward = Vec3::new(-sin, 0.0, -cos);
        let right = Vec3::new(cos, 0.0, -sin);
        let walk = (forward * input.move_z + right * input.move_x) * MOVE_SPEED;
        body.velocity.x = walk.x;
        body.velocity.z = walk.z;

        if input.jump && body.grounded {
            body.velocity.y = JUMP_VELOCITY;
            body.grounded = false;
        }
        if !body.grounded {
            body.velocity.y += GRAVITY * dt;
        }

        body.position += body.velocity * dt;

        if body.position.y <= FLOOR_Y {
            body.position.y = FLOOR_Y;
            body.velocity.y = 0.0;
            body.grounded = true;
        }
    }
}

impl PhysicsProvider for KinematicPhysics {
    fn body(&self, player: PlayerId) -> Option<BodyState> {
        self.bodies.get(&player).copied()
    }

    fn projectile_collided(&self, _id: ProjectileId) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_walk_forward() {
        let mut physics = KinematicPhysics::new(0.0);
        physics.spawn(1, Vec3::new(0.0, FLOOR_Y, 0.0));

        let input = InputFrame {
            move_z: 1.0,
            ..InputFrame::default()
        };
        for _ in 0..60 {
            physics.integrate(1, &input, 1.0 / 60.0);
        }

        let body = physics.body(1).unwrap();
        assert_approx_eq!(body.position.z, -MOVE_SPEED, 1e-3);
        assert_approx_eq!(body.position.x, 0.0, 1e-5);
        assert!(body.grounded);
    }

    #[test]
    fn test_jump_lands() {
        let mut physics = KinematicPhysics::new(0.0);
        physics.spawn(1, Vec3::new(0.0, FLOOR_Y, 0.0));

        let jump = InputFrame {
            jump: true,
            ..InputFrame::default()
        };
        physics.integrate(1, &jump, 1.0 / 60.0);
        let airborne = physics.body(1).unwrap();
        assert!(!airborne.grounded);
        assert!(airborne.position.y > FLOOR_Y);

        for _ in 0..120 {
            physics.integrate(1, &InputFrame::default(), 1.0 / 60.0);
        }
        let landed = physics.body(1).unwrap();
        assert!(landed.grounded);
        assert_eq!(landed.position.y, FLOOR_Y);
    }

    #[test]
    fn test_turning_and_unknown_bodies() {
        let mut physics = KinematicPhysics::new(1.0);
        physics.spawn(1, Vec3::new(0.0, FLOOR_Y, 0.0));
        physics.integrate(1, &InputFrame::default(), 0.5);
        assert_approx_eq!(physics.body(1).unwrap().rotation.y, 0.5, 1e-6);

        physics.integrate(9, &InputFrame::default(), 0.5);
        assert!(physics.body(9).is_none());
        assert!(!physics.projectile_collided(ProjectileId(0)));
    }
}
