use crate::game::{ClientGame, GameConfig};
use crate::input::ScriptedInput;
use crate::physics::KinematicPhysics;
use crate::scene::{HeadlessScene, LogAudio};
use log::{debug, error, info, warn};
use shared::{
    decode, encode, InputProvider, Packet, PlayerId, ProtocolError, Vec3,
    MAX_PACKET_SIZE, PROTOCOL_VERSION,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::interval;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub game: GameConfig,
    pub tick_rate: u32,
    /// Yaw rate of the headless body, radians per second.
    pub turn_rate: f32,
    /// Seconds between HUD log lines.
    pub hud_every_secs: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            tick_rate: 60,
            turn_rate: 0.0,
            hud_every_secs: 1,
        }
    }
}

pub struct Client {
    socket: UdpSocket,
    server_addr: SocketAddr,
    client_id: Option<PlayerId>,

    game: ClientGame<HeadlessScene, LogAudio>,
    input: ScriptedInput,
    physics: KinematicPhysics,
    spawn_point: Vec3,

    tick_rate: u32,
    hud_every_ticks: u64,
}

impl Client {
    pub async fn new(
        server_addr: &str,
        config: ClientConfig,
        input: ScriptedInput,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        let server_addr = server_addr.parse()?;
        let tick_rate = config.tick_rate.max(1);
        let spawn_point = config.game.spawn_point;

        Ok(Client {
            socket,
            server_addr,
            client_id: None,
            game: ClientGame::new(config.game, HeadlessScene::new(), LogAudio::new()),
            input,
            physics: KinematicPhysics::new(config.turn_rate),
            spawn_point,
            tick_rate,
            hud_every_ticks: u64::from(tick_rate) * u64::from(config.hud_every_secs.max(1)),
        })
    }

    pub fn game(&self) -> &ClientGame<HeadlessScene, LogAudio> {
        &self.game
    }

    async fn connect(&mut self) -> Result<(), ProtocolError> {
        info!("Connecting to relay at {}...", self.server_addr);

        let packet = Packet::Connect {
            protocol_version: PROTOCOL_VERSION,
        };
        self.send_packet(&packet).await
    }

    /// Tells the relay this client is leaving. Only needed when connected.
    pub async fn disconnect(&mut self) -> Result<(), ProtocolError> {
        if self.client_id.take().is_some() {
            info!("Disconnecting");
            self.send_packet(&Packet::Disconnect).await?;
        }
        Ok(())
    }

    async fn send_packet(&self, packet: &Packet) -> Result<(), ProtocolError> {
        let data = encode(packet)?;
        self.socket.send_to(&data, self.server_addr).await?;
        Ok(())
    }

    /// Decodes a datagram and queues it. Anything not sent by the relay is
    /// dropped.
    fn receive(&mut self, data: &[u8], from: SocketAddr) {
        if from != self.server_addr {
            debug!("Dropping datagram from {}, not the relay", from);
            return;
        }

        match decode(data) {
            Ok(packet) => self.handle_packet(packet),
            Err(e) => warn!("Dropping malformed datagram: {}", e),
        }
    }

    fn handle_packet(&mut self, packet: Packet) {
        if let Packet::Connected { client_id } = packet {
            self.client_id = Some(client_id);
            self.physics.spawn(client_id, self.spawn_point);
        }

        self.game.queue(packet);
    }

    async fn step(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let dt = 1.0 / self.tick_rate as f32;
        let frame = self.input.poll();

        if let Some(id) = self.client_id {
            self.physics.integrate(id, &frame, dt);
        }

        let outbound = self.game.tick(dt, frame, &self.physics);

        if let Some(reason) = self.game.rejection() {
            return Err(format!("Relay rejected connection: {}", reason).into());
        }

        for packet in outbound {
            if let Err(e) = self.send_packet(&packet).await {
                error!("Error sending {}: {}", packet.event_name(), e);
            }
        }

        if self.game.ticks() % self.hud_every_ticks == 0 {
            info!("{}", self.game.hud());
        }

        Ok(())
    }

    /// Runs until the relay rejects the connection or a socket error occurs.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.connect().await?;

        let mut tick_interval = interval(Duration::from_secs_f64(1.0 / f64::from(self.tick_rate)));
        let mut buffer = [0u8; MAX_PACKET_SIZE];

        loop {
            tokio::select! {
                result = self.socket.recv_from(&mut buffer) => {
                    match result {
                        Ok((len, from)) => self.receive(&buffer[..len], from),
                        Err(e) => error!("Error receiving packet: {}", e),
                    }
                },

                _ = tick_interval.tick() => {
                    self.step().await?;
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_rejects_bad_address() {
        let result = Client::new("not an address", ClientConfig::default(), ScriptedInput::default()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_new_clamps_tick_rate() {
        let config = ClientConfig {
            tick_rate: 0,
            ..ClientConfig::default()
        };
        let client = tokio_test::assert_ok!(
            Client::new("127.0.0.1:8080", config, ScriptedInput::default()).await
        );
        assert_eq!(client.tick_rate, 1);
        assert!(client.game().local().is_none());
    }

    #[tokio::test]
    async fn test_datagrams_from_strangers_dropped() {
        let mut client = Client::new("127.0.0.1:8080", ClientConfig::default(), ScriptedInput::default())
            .await
            .unwrap();
        let connected = encode(&Packet::Connected { client_id: 9 }).unwrap();

        client.receive(&connected, "127.0.0.1:9999".parse().unwrap());
        assert!(client.client_id.is_none());

        client.receive(&connected, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(client.client_id, Some(9));
    }

    #[tokio::test]
    async fn test_step_after_connected_sends_join() {
        let relay = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let relay_addr = relay.local_addr().unwrap().to_string();
        let mut client = Client::new(&relay_addr, ClientConfig::default(), ScriptedInput::default())
            .await
            .unwrap();

        client.handle_packet(Packet::Connected { client_id: 7 });
        tokio_test::assert_ok!(client.step().await);

        let mut buffer = [0u8; MAX_PACKET_SIZE];
        let (len, _) = tokio::time::timeout(Duration::from_secs(2), relay.recv_from(&mut buffer))
            .await
            .unwrap()
            .unwrap();
        match decode(&buffer[..len]).unwrap() {
            Packet::Join(record) => assert_eq!(record.id, 7),
            other => panic!("expected Join, got {:?}", other),
        }

        tokio_test::assert_ok!(client.disconnect().await);
        let (len, _) = tokio::time::timeout(Duration::from_secs(2), relay.recv_from(&mut buffer))
            .await
            .unwrap()
            .unwrap();
        // The Update from the same tick comes first.
        assert!(matches!(decode(&buffer[..len]).unwrap(), Packet::Update(_)));
    }
}
