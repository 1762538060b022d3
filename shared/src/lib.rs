//! Shared combat and replication types used by both the relay and the client.
//!
//! The relay only needs the wire protocol; the client additionally drives the
//! weapon state machine and the projectile registry defined here.

pub mod ammo;
pub mod context;
pub mod projectile;
pub mod protocol;
pub mod weapon;

pub use ammo::{AmmoType, AmmunitionPool, Magazine, ReserveAmmo};
pub use context::{
    AudioCue, AudioProvider, BodyState, InputFrame, InputProvider, PhysicsProvider, SceneEntity,
    SceneProvider, SimulationContext,
};
pub use glam::Vec3;
pub use projectile::{Projectile, ProjectileId, ProjectileManager};
pub use protocol::{check_version, decode, encode, Packet, PlayerAction, PlayerRecord, ProtocolError};
pub use weapon::{
    FireOutcome, MuzzleTransform, ReloadOutcome, WeaponInstance, WeaponSpec, WeaponState,
    STANDARD_WEAPON,
};

/// Identifier of a player. The relay hands out one per connection.
pub type PlayerId = u32;

/// Bumped whenever a `Packet` variant changes shape.
pub const PROTOCOL_VERSION: u32 = 2;
pub const DEFAULT_PORT: u16 = 8080;
/// Receive buffer size. Every packet the relay sends fits, including a
/// `PlayerAll` chunk of `SNAPSHOT_CHUNK` records.
pub const MAX_PACKET_SIZE: usize = 4096;
/// Most records carried by one `PlayerAll` datagram. Larger snapshots are
/// split across several.
pub const SNAPSHOT_CHUNK: usize = 64;
/// Distance at which an ammo station refills the reserve.
pub const AMMO_STATION_RADIUS: f32 = 1.0;
