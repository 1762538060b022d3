//! Weapon behaviour, parameterised entirely by `WeaponSpec` data.

use crate::ammo::{AmmoType, AmmunitionPool, Magazine, ReserveAmmo};
use crate::context::{AudioCue, AudioProvider, SceneProvider, SimulationContext};
use crate::PlayerId;
use glam::{EulerRot, Quat, Vec3};
use log::debug;

/// Static description of a weapon model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponSpec {
    pub name: &'static str,
    /// Minimum seconds between two accepted shots.
    pub fire_interval: f32,
    pub muzzle_speed: f32,
    pub magazine_capacity: u32,
    /// Seconds.
    pub reload_duration: f32,
    pub ammo_type: AmmoType,
    /// Distance a projectile may travel before it is retired.
    pub range: f32,
    /// Upper bound for the reserve when refilled at an ammo station.
    pub reserve_capacity: u32,
    /// Muzzle position relative to the holder's eye, in the holder's frame.
    pub muzzle_offset: Vec3,
}

/// Table index of the weapon every player spawns with.
pub const STANDARD_WEAPON: u8 = 1;

static WEAPON_TABLE: [WeaponSpec; 3] = [
    WeaponSpec {
        name: "carbine",
        fire_interval: 0.4,
        muzzle_speed: 3.0,
        magazine_capacity: 30,
        reload_duration: 2.0,
        ammo_type: AmmoType::Nato556,
        range: 10.0,
        reserve_capacity: 100,
        muzzle_offset: Vec3::new(0.2, -0.035, -0.6),
    },
    WeaponSpec {
        name: "ump47",
        fire_interval: 0.1,
        muzzle_speed: 10.0,
        magazine_capacity: 30,
        reload_duration: 2.0,
        ammo_type: AmmoType::Acp45,
        range: 10.0,
        reserve_capacity: 100,
        muzzle_offset: Vec3::new(0.2, -0.035, -0.485),
    },
    WeaponSpec {
        name: "kriss",
        fire_interval: 0.1,
        muzzle_speed: 10.0,
        magazine_capacity: 30,
        reload_duration: 2.0,
        ammo_type: AmmoType::Acp45,
        range: 10.0,
        reserve_capacity: 100,
        muzzle_offset: Vec3::new(0.2, -0.035, -0.485),
    },
];

impl WeaponSpec {
    pub fn by_name(name: &str) -> Option<&'static WeaponSpec> {
        WEAPON_TABLE
            .iter()
            .find(|spec| spec.name.eq_ignore_ascii_case(name))
    }

    /// Looks up the entry a `PlayerRecord::weapon` index refers to.
    pub fn by_index(index: u8) -> Option<&'static WeaponSpec> {
        WEAPON_TABLE.get(usize::from(index))
    }

    pub fn all() -> &'static [WeaponSpec] {
        &WEAPON_TABLE
    }

    /// The weapon every player spawns with.
    pub fn standard() -> &'static WeaponSpec {
        &WEAPON_TABLE[usize::from(STANDARD_WEAPON)]
    }

    /// Position of this spec in the weapon table, as sent on the wire.
    /// Specs that are not in the table map to the standard weapon.
    pub fn table_index(&self) -> u8 {
        WEAPON_TABLE
            .iter()
            .position(|spec| spec.name == self.name)
            .and_then(|index| u8::try_from(index).ok())
            .unwrap_or(STANDARD_WEAPON)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponState {
    Idle,
    /// Momentary tag for the tick in which a shot went off.
    Firing,
    Reloading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    Fired,
    OutOfAmmo,
    Cooling,
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Started,
    Busy,
    Full,
    OutOfReserve,
}

/// Where a shot leaves the barrel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MuzzleTransform {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl MuzzleTransform {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Muzzle of a weapon held by a body at `position` facing `rotation`
    /// (Euler XYZ radians). Forward is -Z.
    pub fn from_pose(position: Vec3, rotation: Vec3, offset: Vec3) -> Self {
        let orientation = Quat::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z);
        Self {
            origin: position + orientation * offset,
            direction: orientation * Vec3::NEG_Z,
        }
    }
}

/// A weapon held by one player.
#[derive(Debug, Clone)]
pub struct WeaponInstance {
    spec: WeaponSpec,
    owner: PlayerId,
    state: WeaponState,
    ammo: AmmunitionPool,
    cooldown_elapsed: f32,
    reload_elapsed: f32,
    fired_this_tick: bool,
}

impl WeaponInstance {
    /// Equips `spec` with a full magazine and `reserve` rounds of the
    /// weapon's own calibre.
    pub fn new(spec: WeaponSpec, owner: PlayerId, reserve: u32) -> Self {
        let magazine = Magazine::full(spec.magazine_capacity, spec.ammo_type);
        Self::with_ammo(spec, owner, magazine, ReserveAmmo::new(spec.ammo_type, reserve))
    }

    pub fn with_ammo(spec: WeaponSpec, owner: PlayerId, magazine: Magazine, reserve: ReserveAmmo) -> Self {
        Self {
            spec,
            owner,
            state: WeaponState::Idle,
            ammo: AmmunitionPool::new(magazine, reserve),
            // Ready to fire as soon as it is equipped.
            cooldown_elapsed: spec.fire_interval,
            reload_elapsed: 0.0,
            fired_this_tick: false,
        }
    }

    /// Pulls the trigger once.
    pub fn fire<S: SceneProvider, A: AudioProvider>(
        &mut self,
        muzzle: MuzzleTransform,
        ctx: &mut SimulationContext<S, A>,
    ) -> FireOutcome {
        if self.state != WeaponState::Idle {
            return FireOutcome::Busy;
        }
        if self.ammo.magazine.is_empty() {
            return FireOutcome::OutOfAmmo;
        }
        if self.cooldown_elapsed < self.spec.fire_interval {
            return FireOutcome::Cooling;
        }

        self.state = WeaponState::Firing;
        self.ammo.magazine.take_one();
        self.cooldown_elapsed = 0.0;

        ctx.spawn_projectile(
            self.owner,
            muzzle.origin,
            muzzle.direction,
            self.spec.muzzle_speed,
            self.spec.range,
        );
        ctx.audio.play(AudioCue::Fire { owner: self.owner });

        self.fired_this_tick = true;
        self.state = WeaponState::Idle;
        FireOutcome::Fired
    }

    /// Replays a shot another client already fired. The shot always spawns:
    /// the shooter's own weapon did the gating, and the next replicated
    /// update corrects the round counts.
    pub fn replay_shot<S: SceneProvider, A: AudioProvider>(
        &mut self,
        muzzle: MuzzleTransform,
        ctx: &mut SimulationContext<S, A>,
    ) {
        self.ammo.magazine.take_one();
        self.cooldown_elapsed = 0.0;

        ctx.spawn_projectile(
            self.owner,
            muzzle.origin,
            muzzle.direction,
            self.spec.muzzle_speed,
            self.spec.range,
        );
        ctx.audio.play(AudioCue::Fire { owner: self.owner });
        self.fired_this_tick = true;
    }

    pub fn reload<S: SceneProvider, A: AudioProvider>(
        &mut self,
        ctx: &mut SimulationContext<S, A>,
    ) -> ReloadOutcome {
        if self.state != WeaponState::Idle {
            return ReloadOutcome::Busy;
        }
        if self.ammo.magazine.is_full() {
            return ReloadOutcome::Full;
        }
        if self.ammo.reserve.is_empty() || !self.ammo.is_compatible() {
            return ReloadOutcome::OutOfReserve;
        }

        debug!("Player {} reloading {}", self.owner, self.spec.name);
        self.state = WeaponState::Reloading;
        self.reload_elapsed = 0.0;
        ctx.audio.play(AudioCue::Reload { owner: self.owner });
        ReloadOutcome::Started
    }

    /// Advances the fire-rate and reload timers.
    pub fn update(&mut self, dt: f32) {
        self.fired_this_tick = false;
        self.cooldown_elapsed += dt;

        if self.state != WeaponState::Reloading {
            return;
        }

        if self.reload_elapsed + dt >= self.spec.reload_duration {
            let moved = self.ammo.fill_magazine();
            debug!(
                "Player {} reloaded {} rounds ({} left in reserve)",
                self.owner,
                moved,
                self.ammo.reserve.count()
            );
            self.reload_elapsed = 0.0;
            self.state = WeaponState::Idle;
        } else {
            self.reload_elapsed += dt;
        }
    }

    /// Adds rounds to the reserve, up to `WeaponSpec::reserve_capacity`.
    pub fn replenish_reserve(&mut self, amount: u32) -> u32 {
        self.ammo.replenish(amount, self.spec.reserve_capacity)
    }

    /// Overwrites the round counts with a replicated `(reserve, magazine)`
    /// snapshot. The magazine count is clamped to capacity.
    pub fn restore(&mut self, reserve: u32, magazine: u32) {
        self.ammo.magazine = Magazine::new(self.spec.magazine_capacity, self.spec.ammo_type, magazine);
        self.ammo.reserve = ReserveAmmo::new(self.spec.ammo_type, reserve);
    }

    pub fn state(&self) -> WeaponState {
        if self.fired_this_tick && self.state == WeaponState::Idle {
            WeaponState::Firing
        } else {
            self.state
        }
    }

    pub fn fired_this_tick(&self) -> bool {
        self.fired_this_tick
    }

    pub fn is_reloading(&self) -> bool {
        self.state == WeaponState::Reloading
    }

    pub fn spec(&self) -> &WeaponSpec {
        &self.spec
    }

    pub fn owner(&self) -> PlayerId {
        self.owner
    }

    pub fn ammo(&self) -> &AmmunitionPool {
        &self.ammo
    }

    pub fn magazine_count(&self) -> u32 {
        self.ammo.magazine.count()
    }

    pub fn reserve_count(&self) -> u32 {
        self.ammo.reserve.count()
    }

    /// `(reserve, magazine)` as carried in a `PlayerRecord`.
    pub fn snapshot(&self) -> (u32, u32) {
        (self.reserve_count(), self.magazine_count())
    }

    pub fn ammo_display(&self) -> String {
        format!("Ammo {} / {}", self.magazine_count(), self.reserve_count())
    }
}
