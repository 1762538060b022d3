//! Integration tests for the combat core and the replication path
//!
//! These tests drive the public API of the shared, client and server crates
//! together, without sockets.

use assert_approx_eq::assert_approx_eq;
use client::game::{ClientGame, GameConfig};
use client::physics::KinematicPhysics;
use client::scene::{HeadlessScene, LogAudio};
use server::relay::{Outbound, Relay};
use shared::{
    AmmoType, AudioCue, AudioProvider, FireOutcome, InputFrame, Magazine, MuzzleTransform, Packet,
    PhysicsProvider, PlayerRecord, ProjectileId, ReloadOutcome, ReserveAmmo, SceneEntity,
    SceneProvider, SimulationContext, Vec3, WeaponInstance, WeaponSpec, PROTOCOL_VERSION,
    SNAPSHOT_CHUNK,
};
use std::net::SocketAddr;
use std::time::Duration;

const DT: f32 = 1.0 / 60.0;

/// COMBAT CORE TESTS
mod combat_tests {
    use super::*;

    fn context() -> SimulationContext<HeadlessScene, LogAudio> {
        SimulationContext::new(HeadlessScene::new(), LogAudio::new())
    }

    /// Walks the weapon through fire, cooldown, refire and a full reload
    #[test]
    fn weapon_fire_and_reload_timeline() {
        let mut ctx = context();
        let spec = *WeaponSpec::by_name("ump47").unwrap();
        assert_approx_eq!(spec.fire_interval, 0.1, 1e-6);

        let mut weapon = WeaponInstance::with_ammo(
            spec,
            1,
            Magazine::full(30, AmmoType::Acp45),
            ReserveAmmo::new(AmmoType::Acp45, 60),
        );
        let muzzle = MuzzleTransform::new(Vec3::ZERO, Vec3::NEG_Z);

        // t = 0
        assert_eq!(weapon.fire(muzzle, &mut ctx), FireOutcome::Fired);
        assert_eq!(weapon.magazine_count(), 29);

        // t = 0.05
        weapon.update(0.05);
        assert_eq!(weapon.fire(muzzle, &mut ctx), FireOutcome::Cooling);
        assert_eq!(weapon.magazine_count(), 29);

        // t = 0.11
        weapon.update(0.06);
        assert_eq!(weapon.fire(muzzle, &mut ctx), FireOutcome::Fired);
        assert_eq!(weapon.magazine_count(), 28);
        assert_eq!(ctx.projectiles.len(), 2);

        assert_eq!(weapon.reload(&mut ctx), ReloadOutcome::Started);
        assert_eq!(weapon.fire(muzzle, &mut ctx), FireOutcome::Busy);

        // t = 2.11
        weapon.update(2.0);
        assert_eq!(weapon.snapshot(), (58, 30));
        assert!(!weapon.is_reloading());
        assert_eq!(ctx.audio.played(), 3);
    }

    /// A projectile that reaches its range in one step is retired in that step
    #[test]
    fn projectile_retired_at_range() {
        let mut ctx = context();
        let id = ctx.spawn_projectile(1, Vec3::ZERO, Vec3::Z, 10.0, 10.0);
        assert!(ctx.scene.contains(SceneEntity::Projectile(id)));

        let retired = ctx.step_projectiles(&KinematicPhysics::default(), 1.0);

        assert_eq!(retired, vec![id]);
        assert!(ctx.projectiles.is_empty());
        assert!(ctx.scene.is_empty());
    }

    struct AlwaysHit;

    impl PhysicsProvider for AlwaysHit {
        fn body(&self, _player: u32) -> Option<shared::BodyState> {
            None
        }
        fn projectile_collided(&self, _id: ProjectileId) -> bool {
            true
        }
    }

    #[derive(Default)]
    struct CountingScene {
        removed: usize,
    }

    impl SceneProvider for CountingScene {
        fn add(&mut self, _entity: SceneEntity) {}
        fn remove(&mut self, _entity: SceneEntity) {
            self.removed += 1;
        }
    }

    #[derive(Default)]
    struct Silent;

    impl AudioProvider for Silent {
        fn play(&mut self, _cue: AudioCue) {}
    }

    /// Collision and range in the same step still retire exactly once
    #[test]
    fn collided_projectile_at_range_retired_once() {
        let mut ctx = SimulationContext::new(CountingScene::default(), Silent);
        ctx.spawn_projectile(1, Vec3::ZERO, Vec3::Z, 10.0, 10.0);

        let retired = ctx.step_projectiles(&AlwaysHit, 1.0);
        assert_eq!(retired.len(), 1);
        assert_eq!(ctx.scene.removed, 1);

        assert!(ctx.step_projectiles(&AlwaysHit, 1.0).is_empty());
        assert_eq!(ctx.scene.removed, 1);
    }

    /// Rounds are conserved across many partial reloads
    #[test]
    fn reload_conserves_rounds() {
        let mut ctx = context();
        let spec = *WeaponSpec::standard();
        let mut weapon = WeaponInstance::new(spec, 1, 45);
        let muzzle = MuzzleTransform::new(Vec3::ZERO, Vec3::NEG_Z);

        let mut fired = 0;
        for _ in 0..200 {
            if weapon.fire(muzzle, &mut ctx) == FireOutcome::Fired {
                fired += 1;
            }
            if weapon.magazine_count() == 0 {
                weapon.reload(&mut ctx);
            }
            weapon.update(0.1);
            assert!(weapon.magazine_count() <= spec.magazine_capacity);
        }

        assert_eq!(fired + weapon.magazine_count() + weapon.reserve_count(), 30 + 45);
    }
}

/// REPLICATION TESTS
mod replication_tests {
    use super::*;

    struct Peer {
        addr: SocketAddr,
        game: ClientGame<HeadlessScene, LogAudio>,
    }

    struct Session {
        relay: Relay,
        peers: Vec<Peer>,
    }

    impl Session {
        fn new() -> Self {
            Self {
                relay: Relay::new(8, Duration::from_secs(5)),
                peers: Vec::new(),
            }
        }

        fn route(&mut self, outbound: Vec<Outbound>) {
            for Outbound { addr, packet } in outbound {
                if let Some(peer) = self.peers.iter_mut().find(|peer| peer.addr == addr) {
                    peer.game.queue(packet);
                }
            }
        }

        fn connect(&mut self, port: u16) -> usize {
            let addr: SocketAddr = format!("127.0.0.1:{}", port).parse().unwrap();
            self.peers.push(Peer {
                addr,
                game: ClientGame::new(GameConfig::default(), HeadlessScene::new(), LogAudio::new()),
            });

            let outbound = self.relay.handle_packet(
                Packet::Connect {
                    protocol_version: PROTOCOL_VERSION,
                },
                addr,
            );
            self.route(outbound);
            self.peers.len() - 1
        }

        fn step(&mut self, index: usize, input: InputFrame) {
            let physics = KinematicPhysics::default();
            let addr = self.peers[index].addr;
            let sent = self.peers[index].game.tick(DT, input, &physics);

            for packet in sent {
                let outbound = self.relay.handle_packet(packet, addr);
                self.route(outbound);
            }
        }

        fn disconnect(&mut self, index: usize) {
            let addr = self.peers[index].addr;
            let outbound = self.relay.handle_packet(Packet::Disconnect, addr);
            self.route(outbound);
        }

        fn game(&self, index: usize) -> &ClientGame<HeadlessScene, LogAudio> {
            &self.peers[index].game
        }
    }

    /// Two clients see each other, see each other's shots, and clean up on leave
    #[test]
    fn join_shoot_and_leave() {
        let mut session = Session::new();

        let a = session.connect(5001);
        session.step(a, InputFrame::default());
        let b = session.connect(5002);
        session.step(b, InputFrame::default());

        session.step(a, InputFrame::default());
        session.step(b, InputFrame::default());

        let a_id = session.game(a).local_id().unwrap();
        let b_id = session.game(b).local_id().unwrap();
        assert!(session.game(a).roster().contains(b_id));
        assert!(session.game(b).roster().contains(a_id));
        assert_eq!(session.game(a).roster().online_display(), "online : 2");
        assert!(session.game(b).scene().contains(SceneEntity::Player(a_id)));

        session.step(
            a,
            InputFrame {
                fire: true,
                ..InputFrame::default()
            },
        );
        session.step(b, InputFrame::default());

        let replayed: Vec<_> = session.game(b).projectiles().iter().collect();
        assert_eq!(replayed.len(), 1);
        assert_eq!(replayed[0].owner, a_id);
        assert_eq!(session.game(b).roster().get(a_id).unwrap().magazine, 29);

        session.disconnect(a);
        session.step(b, InputFrame::default());

        assert!(!session.game(b).roster().contains(a_id));
        assert!(session.game(b).projectiles().is_empty());
        assert!(session.game(b).scene().is_empty());
        assert_eq!(session.game(b).roster().connection_count(), 1);
    }

    /// A late joiner receives the relay's mirror of everyone already in
    #[test]
    fn late_joiner_gets_snapshot() {
        let mut session = Session::new();
        for port in 6001..6004 {
            let index = session.connect(port);
            session.step(index, InputFrame::default());
        }
        let late = session.connect(6010);
        session.step(late, InputFrame::default());
        session.step(late, InputFrame::default());

        assert_eq!(session.game(late).roster().len(), 3);
        assert_eq!(session.relay.roster().len(), 4);
        assert_eq!(session.game(late).roster().connection_count(), 4);
    }

    /// A roster too large for one datagram still reaches a late joiner whole
    #[test]
    fn late_joiner_gets_split_snapshot() {
        let mut session = Session::new();
        let host = session.connect(6101);
        session.step(host, InputFrame::default());

        let host_addr = session.peers[host].addr;
        let extra = SNAPSHOT_CHUNK as u32 + 10;
        for id in 0..extra {
            let record = PlayerRecord::new(2000 + id, Vec3::new(id as f32, 1.0, 0.0));
            let outbound = session.relay.handle_packet(Packet::Join(record), host_addr);
            session.route(outbound);
        }

        let late = session.connect(6102);
        session.step(late, InputFrame::default());
        session.step(late, InputFrame::default());

        assert_eq!(session.game(late).roster().len(), extra as usize + 1);

        session.disconnect(host);
        session.step(late, InputFrame::default());
        assert!(session.game(late).roster().is_empty());
        assert_eq!(session.relay.roster().len(), 1);
    }

    /// Corrupt records never reach another client's roster
    #[test]
    fn non_finite_update_dropped_at_roster() {
        let mut session = Session::new();
        let a = session.connect(7001);
        session.step(a, InputFrame::default());
        let b = session.connect(7002);
        session.step(b, InputFrame::default());
        session.step(b, InputFrame::default());

        let a_id = session.game(a).local_id().unwrap();
        let a_addr = session.peers[a].addr;
        let mut corrupt = PlayerRecord::new(a_id, Vec3::new(f32::NAN, 0.0, 0.0));
        corrupt.magazine = 30;
        let outbound = session.relay.handle_packet(Packet::Update(corrupt), a_addr);
        session.route(outbound);
        session.step(b, InputFrame::default());

        assert!(session.game(b).roster().get(a_id).unwrap().pos.is_finite());
    }
}
