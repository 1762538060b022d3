//! Relay network layer: UDP transport around the `Relay` fan-out logic

use crate::relay::{Outbound, Relay};
use log::{debug, error, info, warn};
use shared::{decode, encode, Packet, ProtocolError, MAX_PACKET_SIZE};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::interval;

/// Messages sent from network tasks to the relay loop
#[derive(Debug)]
pub enum ServerMessage {
    PacketReceived { packet: Packet, addr: SocketAddr },
    Shutdown,
}

/// Relay configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub max_clients: usize,
    /// Silence after which a connection is dropped.
    pub client_timeout: Duration,
    /// How often silent connections are looked for.
    pub sweep_interval: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_clients: 32,
            client_timeout: Duration::from_secs(5),
            sweep_interval: Duration::from_secs(1),
        }
    }
}

/// Relay server owning the socket and all relay state
pub struct Server {
    socket: Arc<UdpSocket>,
    relay: Relay,
    sweep_interval: Duration,

    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    outbound_tx: mpsc::UnboundedSender<Outbound>,
    outbound_rx: Option<mpsc::UnboundedReceiver<Outbound>>,
}

impl Server {
    pub async fn new(addr: &str, config: RelayConfig) -> std::io::Result<Self> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        info!("Relay listening on {}", socket.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        Ok(Server {
            socket,
            relay: Relay::new(config.max_clients, config.client_timeout),
            sweep_interval: config.sweep_interval,
            server_tx,
            server_rx,
            outbound_tx,
            outbound_rx: Some(outbound_rx),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Handle for stopping a running relay from another task.
    pub fn shutdown_handle(&self) -> mpsc::UnboundedSender<ServerMessage> {
        self.server_tx.clone()
    }

    /// Spawns task that continuously listens for incoming datagrams
    fn spawn_network_receiver(&self) {
        let socket = Arc::clone(&self.socket);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut buffer = [0u8; MAX_PACKET_SIZE];

            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, addr)) => match decode(&buffer[..len]) {
                        Ok(packet) => {
                            if let Err(e) =
                                server_tx.send(ServerMessage::PacketReceived { packet, addr })
                            {
                                error!("Failed to send packet to relay loop: {}", e);
                                break;
                            }
                        }
                        Err(e) => warn!("Dropping malformed datagram from {}: {}", addr, e),
                    },
                    Err(e) => {
                        error!("Error receiving packet: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Spawns task that drains the outgoing queue onto the socket
    fn spawn_network_sender(&mut self) {
        let socket = Arc::clone(&self.socket);
        let Some(mut outbound_rx) = self.outbound_rx.take() else {
            return;
        };

        tokio::spawn(async move {
            while let Some(Outbound { addr, packet }) = outbound_rx.recv().await {
                if let Err(e) = Self::send_packet_impl(&socket, &packet, addr).await {
                    error!("Failed to send {} to {}: {}", packet.event_name(), addr, e);
                }
            }
        });
    }

    async fn send_packet_impl(
        socket: &UdpSocket,
        packet: &Packet,
        addr: SocketAddr,
    ) -> Result<(), ProtocolError> {
        let data = encode(packet)?;
        socket.send_to(&data, addr).await?;
        Ok(())
    }

    fn dispatch(&self, outbound: Vec<Outbound>) {
        for message in outbound {
            debug!("-> {} {}", message.addr, message.packet.event_name());
            if let Err(e) = self.outbound_tx.send(message) {
                error!("Failed to queue packet for sending: {}", e);
            }
        }
    }

    /// Main relay loop
    pub async fn run(&mut self) -> std::io::Result<()> {
        self.spawn_network_receiver();
        self.spawn_network_sender();

        let mut sweep = interval(self.sweep_interval);

        info!("Relay started");

        loop {
            tokio::select! {
                message = self.server_rx.recv() => {
                    match message {
                        Some(ServerMessage::PacketReceived { packet, addr }) => {
                            debug!("<- {} {}", addr, packet.event_name());
                            let outbound = self.relay.handle_packet(packet, addr);
                            self.dispatch(outbound);
                        },
                        Some(ServerMessage::Shutdown) | None => {
                            info!("Relay shutting down");
                            break;
                        }
                    }
                },

                _ = sweep.tick() => {
                    let outbound = self.relay.sweep_timeouts();
                    self.dispatch(outbound);
                },
            }
        }

        Ok(())
    }
}
