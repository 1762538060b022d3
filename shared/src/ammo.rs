//! Typed ammunition bookkeeping.
//!
//! Counts are unsigned and every change is clamped, so neither the magazine
//! nor the reserve can go negative or overflow its capacity.

use serde::{Deserialize, Serialize};

/// Calibre tag. A magazine only accepts rounds of its own type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmmoType {
    Acp45,
    Nato556,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Magazine {
    capacity: u32,
    ammo_type: AmmoType,
    count: u32,
}

impl Magazine {
    /// Creates a magazine holding `count` rounds, clamped to `capacity`.
    pub fn new(capacity: u32, ammo_type: AmmoType, count: u32) -> Self {
        Self {
            capacity,
            ammo_type,
            count: count.min(capacity),
        }
    }

    pub fn full(capacity: u32, ammo_type: AmmoType) -> Self {
        Self::new(capacity, ammo_type, capacity)
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn ammo_type(&self) -> AmmoType {
        self.ammo_type
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count >= self.capacity
    }

    /// Free slots left in the magazine.
    pub fn space(&self) -> u32 {
        self.capacity - self.count
    }

    /// Removes one round. Returns false if the magazine was already empty.
    pub fn take_one(&mut self) -> bool {
        if self.count == 0 {
            return false;
        }
        self.count -= 1;
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveAmmo {
    ammo_type: AmmoType,
    count: u32,
}

impl ReserveAmmo {
    pub fn new(ammo_type: AmmoType, count: u32) -> Self {
        Self { ammo_type, count }
    }

    pub fn ammo_type(&self) -> AmmoType {
        self.ammo_type
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// A magazine together with the reserve that feeds it.
///
/// Owned one-to-one by a weapon instance; never shared between players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmmunitionPool {
    pub magazine: Magazine,
    pub reserve: ReserveAmmo,
}

impl AmmunitionPool {
    pub fn new(magazine: Magazine, reserve: ReserveAmmo) -> Self {
        Self { magazine, reserve }
    }

    /// Whether the reserve may be loaded into the magazine at all.
    pub fn is_compatible(&self) -> bool {
        self.magazine.ammo_type == self.reserve.ammo_type
    }

    /// Moves up to `amount` rounds from the reserve into the magazine.
    ///
    /// The move is clamped by both the free space in the magazine and the
    /// rounds left in the reserve, and is a no-op when the calibres differ.
    /// Returns the number of rounds actually moved.
    pub fn transfer(&mut self, amount: u32) -> u32 {
        if !self.is_compatible() {
            return 0;
        }

        let moved = amount.min(self.magazine.space()).min(self.reserve.count);
        self.reserve.count -= moved;
        self.magazine.count += moved;
        moved
    }

    /// Tops the magazine up as far as the reserve allows.
    pub fn fill_magazine(&mut self) -> u32 {
        self.transfer(self.magazine.space())
    }

    /// Adds rounds to the reserve without letting it exceed `limit`.
    /// Returns the number of rounds added.
    pub fn replenish(&mut self, amount: u32, limit: u32) -> u32 {
        let room = limit.saturating_sub(self.reserve.count);
        let added = amount.min(room);
        self.reserve.count += added;
        added
    }
}
