//! Client-side simulation: the local player, the mirror of remote players and
//! every projectile either of them shoots.
//!
//! Nothing inbound is applied mid-tick. Packets received between ticks are
//! queued with [`ClientGame::queue`] and drained at the start of the next
//! [`ClientGame::tick`].

use crate::roster::{PlayerRoster, RosterEvent};
use log::{debug, info, warn};
use shared::{
    AudioProvider, FireOutcome, InputFrame, MuzzleTransform, Packet, PhysicsProvider, PlayerAction,
    PlayerId, PlayerRecord, ProjectileManager, ReloadOutcome, SceneEntity, SceneProvider,
    SimulationContext, Vec3, WeaponInstance, WeaponSpec, AMMO_STATION_RADIUS,
};
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub weapon: WeaponSpec,
    pub starting_reserve: u32,
    pub spawn_point: Vec3,
    /// Pickup points that refill the reserve.
    pub ammo_stations: Vec<Vec3>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            weapon: *WeaponSpec::standard(),
            starting_reserve: 100,
            spawn_point: Vec3::new(0.0, 1.0, 0.0),
            ammo_stations: vec![
                Vec3::new(-20.0, 0.0, 0.0),
                Vec3::new(20.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, -20.0),
                Vec3::new(0.0, 0.0, 20.0),
            ],
        }
    }
}

/// The player this client controls.
#[derive(Debug, Clone)]
pub struct LocalPlayer {
    pub record: PlayerRecord,
    pub weapon: WeaponInstance,
}

impl LocalPlayer {
    fn muzzle(&self) -> MuzzleTransform {
        muzzle_of(&self.record, &self.weapon)
    }

    fn sync_ammo(&mut self) {
        let (ammo, magazine) = self.weapon.snapshot();
        self.record.ammo = ammo;
        self.record.magazine = magazine;
    }
}

fn muzzle_of(record: &PlayerRecord, weapon: &WeaponInstance) -> MuzzleTransform {
    MuzzleTransform::from_pose(record.pos, record.rot, weapon.spec().muzzle_offset)
}

fn within_station(position: Vec3, station: Vec3) -> bool {
    let offset = position - station;
    offset.x * offset.x + offset.z * offset.z < AMMO_STATION_RADIUS * AMMO_STATION_RADIUS
}

pub struct ClientGame<S, A> {
    ctx: SimulationContext<S, A>,
    config: GameConfig,
    roster: PlayerRoster,
    local: Option<LocalPlayer>,
    /// Replays remote fire and reload events locally.
    remote_weapons: HashMap<PlayerId, WeaponInstance>,
    inbound: VecDeque<Packet>,
    rejection: Option<String>,
    ticks: u64,
}

impl<S: SceneProvider, A: AudioProvider> ClientGame<S, A> {
    pub fn new(config: GameConfig, scene: S, audio: A) -> Self {
        Self {
            ctx: SimulationContext::new(scene, audio),
            config,
            roster: PlayerRoster::new(),
            local: None,
            remote_weapons: HashMap::new(),
            inbound: VecDeque::new(),
            rejection: None,
            ticks: 0,
        }
    }

    /// Defers a packet to the start of the next tick.
    pub fn queue(&mut self, packet: Packet) {
        self.inbound.push_back(packet);
    }

    /// Runs one simulation step and returns the packets to send to the relay.
    pub fn tick(&mut self, dt: f32, input: InputFrame, physics: &dyn PhysicsProvider) -> Vec<Packet> {
        let mut outbound = Vec::new();

        while let Some(packet) = self.inbound.pop_front() {
            self.apply(packet, &mut outbound);
        }

        if let Some(local) = self.local.as_mut() {
            let id = local.record.id;

            if input.reload && local.weapon.reload(&mut self.ctx) == ReloadOutcome::Started {
                outbound.push(Packet::Reload(PlayerAction { id }));
            }

            if input.fire {
                let muzzle = local.muzzle();
                match local.weapon.fire(muzzle, &mut self.ctx) {
                    FireOutcome::Fired => outbound.push(Packet::Fire(PlayerAction { id })),
                    outcome => debug!("Trigger pulled but not fired: {:?}", outcome),
                }
            }

            if let Some(body) = physics.body(id) {
                local.record.pos = body.position;
                local.record.vel = body.velocity;
                local.record.rot = body.rotation;
                local.record.is_grounded = body.grounded;
            }

            let position = local.record.pos;
            if self
                .config
                .ammo_stations
                .iter()
                .any(|&station| within_station(position, station))
            {
                let capacity = local.weapon.spec().reserve_capacity;
                let added = local.weapon.replenish_reserve(capacity);
                if added > 0 {
                    info!("Picked up {} rounds", added);
                }
            }

            local.weapon.update(dt);
        }

        for weapon in self.remote_weapons.values_mut() {
            weapon.update(dt);
        }

        let retired = self.ctx.step_projectiles(physics, dt);
        if !retired.is_empty() {
            debug!("Retired {} projectiles", retired.len());
        }

        if let Some(local) = self.local.as_mut() {
            local.sync_ammo();
            outbound.push(Packet::Update(local.record.clone()));
        }

        self.ticks += 1;
        outbound
    }

    fn apply(&mut self, packet: Packet, outbound: &mut Vec<Packet>) {
        match packet {
            Packet::Connected { client_id } => self.spawn_local(client_id, outbound),

            Packet::Rejected { reason } => {
                warn!("Relay rejected connection: {}", reason);
                self.local = None;
                self.rejection = Some(reason);
            }

            Packet::PlayerAll(records) => {
                debug!("Snapshot of {} players", records.len());
                for event in self.roster.apply_all(records) {
                    self.on_roster_event(event);
                }
            }

            Packet::PlayerJoined(record) => {
                if let Some(event) = self.roster.apply_join(record) {
                    self.on_roster_event(event);
                }
            }

            Packet::PlayerUpdate(record) => {
                let id = record.id;
                if self.roster.apply_update(record) {
                    self.sync_remote_weapon(id);
                }
            }

            Packet::PlayerShoot(PlayerAction { id }) => self.replay_fire(id),
            Packet::PlayerReload(PlayerAction { id }) => self.replay_reload(id),
            Packet::PlayerLeave(record) => self.remove_remote(record.id),
            Packet::PlayerCount(count) => self.roster.apply_count(count),

            Packet::MessageConnect(text) | Packet::MessageDisconnect(text) => info!("{}", text),

            other => warn!("Unexpected {} from relay", other.event_name()),
        }
    }

    fn spawn_local(&mut self, id: PlayerId, outbound: &mut Vec<Packet>) {
        info!("Connected as player {}", id);

        let mut local = LocalPlayer {
            record: PlayerRecord::new(id, self.config.spawn_point),
            weapon: WeaponInstance::new(self.config.weapon, id, self.config.starting_reserve),
        };
        local.record.weapon = self.config.weapon.table_index();
        local.sync_ammo();

        self.roster.set_local_id(id);
        outbound.push(Packet::Join(local.record.clone()));
        self.local = Some(local);
    }

    fn on_roster_event(&mut self, event: RosterEvent) {
        match event {
            RosterEvent::Added(id) if Some(id) != self.local_id() => {
                self.sync_remote_weapon(id);
                self.ctx.scene.add(SceneEntity::Player(id));
                debug!("Player {} added to scene", id);
            }
            RosterEvent::Replaced(id) if Some(id) != self.local_id() => self.sync_remote_weapon(id),
            _ => {}
        }
    }

    /// Matches a remote player's replay weapon to their latest record:
    /// re-equips when the weapon index changed, then restores round counts.
    fn sync_remote_weapon(&mut self, id: PlayerId) {
        let Some(record) = self.roster.get(id) else {
            return;
        };
        let spec = match WeaponSpec::by_index(record.weapon) {
            Some(spec) => spec,
            None => {
                warn!("Player {} holds unknown weapon {}", id, record.weapon);
                WeaponSpec::standard()
            }
        };

        let weapon = self
            .remote_weapons
            .entry(id)
            .or_insert_with(|| WeaponInstance::new(*spec, id, 0));
        if weapon.spec().name != spec.name {
            debug!("Player {} switched to {}", id, spec.name);
            *weapon = WeaponInstance::new(*spec, id, 0);
        }
        weapon.restore(record.ammo, record.magazine);
    }

    fn replay_fire(&mut self, id: PlayerId) {
        let (Some(record), Some(weapon)) = (self.roster.get(id), self.remote_weapons.get_mut(&id))
        else {
            debug!("Shot from unknown player {}", id);
            return;
        };

        let muzzle = muzzle_of(record, weapon);
        weapon.replay_shot(muzzle, &mut self.ctx);
    }

    fn replay_reload(&mut self, id: PlayerId) {
        let Some(weapon) = self.remote_weapons.get_mut(&id) else {
            debug!("Reload from unknown player {}", id);
            return;
        };

        let outcome = weapon.reload(&mut self.ctx);
        if outcome != ReloadOutcome::Started {
            debug!("Replayed reload from {} not started: {:?}", id, outcome);
        }
    }

    fn remove_remote(&mut self, id: PlayerId) {
        if let Some(RosterEvent::Removed(_)) = self.roster.apply_leave(id) {
            self.ctx.scene.remove(SceneEntity::Player(id));
            self.remote_weapons.remove(&id);
        }

        let retired = self.ctx.retire_projectiles_of(id);
        if retired > 0 {
            debug!("Retired {} projectiles left behind by {}", retired, id);
        }
    }

    pub fn local(&self) -> Option<&LocalPlayer> {
        self.local.as_ref()
    }

    pub fn local_id(&self) -> Option<PlayerId> {
        self.local.as_ref().map(|local| local.record.id)
    }

    pub fn roster(&self) -> &PlayerRoster {
        &self.roster
    }

    pub fn remote_weapon(&self, id: PlayerId) -> Option<&WeaponInstance> {
        self.remote_weapons.get(&id)
    }

    pub fn projectiles(&self) -> &ProjectileManager {
        &self.ctx.projectiles
    }

    pub fn scene(&self) -> &S {
        &self.ctx.scene
    }

    pub fn audio(&self) -> &A {
        &self.ctx.audio
    }

    /// Reason given by the relay if it refused the connection.
    pub fn rejection(&self) -> Option<&str> {
        self.rejection.as_deref()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// HUD text: ammo counter and online counter.
    pub fn hud(&self) -> String {
        match &self.local {
            Some(local) => format!("{} | {}", local.weapon.ammo_display(), self.roster.online_display()),
            None => self.roster.online_display(),
        }
    }
}
