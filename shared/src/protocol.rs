//! Wire protocol between clients and the relay.
//!
//! Every datagram carries exactly one bincode-encoded `Packet`. The schema is
//! versioned through `PROTOCOL_VERSION`, announced in `Packet::Connect`.

use crate::PlayerId;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("protocol version mismatch: expected {expected}, got {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("player {id} sent a non-finite {field}")]
    NonFinite { id: PlayerId, field: &'static str },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Last known state of one player as replicated over the relay.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub pos: Vec3,
    /// Euler XYZ angles in radians.
    pub rot: Vec3,
    pub vel: Vec3,
    pub is_grounded: bool,
    /// Rounds left in the reserve.
    pub ammo: u32,
    /// Rounds left in the magazine.
    pub magazine: u32,
    /// Index of the held weapon in `WeaponSpec::all()`.
    pub weapon: u8,
}

impl PlayerRecord {
    pub fn new(id: PlayerId, pos: Vec3) -> Self {
        Self {
            id,
            pos,
            rot: Vec3::ZERO,
            vel: Vec3::ZERO,
            is_grounded: true,
            ammo: 0,
            magazine: 0,
            weapon: crate::STANDARD_WEAPON,
        }
    }

    /// Rejects records whose vectors contain NaN or infinities.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        for (field, value) in [("pos", self.pos), ("rot", self.rot), ("vel", self.vel)] {
            if !value.is_finite() {
                return Err(ProtocolError::NonFinite { id: self.id, field });
            }
        }
        Ok(())
    }

    /// Copies the fields carried by an `update` onto this record.
    pub fn merge_update(&mut self, update: &PlayerRecord) {
        self.pos = update.pos;
        self.rot = update.rot;
        self.vel = update.vel;
        self.is_grounded = update.is_grounded;
        self.ammo = update.ammo;
        self.magazine = update.magazine;
        self.weapon = update.weapon;
    }
}

/// Payload of fire and reload events.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct PlayerAction {
    pub id: PlayerId,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Packet {
    // client -> relay
    Connect { protocol_version: u32 },
    Join(PlayerRecord),
    Update(PlayerRecord),
    Fire(PlayerAction),
    Reload(PlayerAction),
    Disconnect,

    // relay -> client
    Connected { client_id: PlayerId },
    Rejected { reason: String },
    PlayerAll(Vec<PlayerRecord>),
    PlayerJoined(PlayerRecord),
    PlayerUpdate(PlayerRecord),
    PlayerShoot(PlayerAction),
    PlayerReload(PlayerAction),
    PlayerLeave(PlayerRecord),
    PlayerCount(u32),
    MessageConnect(String),
    MessageDisconnect(String),
}

impl Packet {
    /// Event name used in logs.
    pub fn event_name(&self) -> &'static str {
        match self {
            Packet::Connect { .. } => "connect",
            Packet::Join(_) => "join",
            Packet::Update(_) => "update",
            Packet::Fire(_) => "fire",
            Packet::Reload(_) => "reload",
            Packet::Disconnect => "disconnect",
            Packet::Connected { .. } => "connected",
            Packet::Rejected { .. } => "rejected",
            Packet::PlayerAll(_) => "player::all",
            Packet::PlayerJoined(_) => "player::joined",
            Packet::PlayerUpdate(_) => "player::update",
            Packet::PlayerShoot(_) => "player::shoot",
            Packet::PlayerReload(_) => "player::reload",
            Packet::PlayerLeave(_) => "player::leave",
            Packet::PlayerCount(_) => "player::count",
            Packet::MessageConnect(_) => "message::connect",
            Packet::MessageDisconnect(_) => "message::disconnect",
        }
    }
}

pub fn encode(packet: &Packet) -> Result<Vec<u8>, ProtocolError> {
    Ok(bincode::serialize(packet)?)
}

pub fn decode(data: &[u8]) -> Result<Packet, ProtocolError> {
    Ok(bincode::deserialize(data)?)
}

/// Checks the version a client announced in `Connect`.
pub fn check_version(found: u32) -> Result<(), ProtocolError> {
    if found == crate::PROTOCOL_VERSION {
        Ok(())
    } else {
        Err(ProtocolError::VersionMismatch {
            expected: crate::PROTOCOL_VERSION,
            found,
        })
    }
}
