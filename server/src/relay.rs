//! Relay fan-out logic, independent of the socket.
//!
//! The relay is not an authority. It rebroadcasts what clients send and keeps
//! a mirror of the last record seen for every joined player so that late
//! joiners can be handed a snapshot. Nothing a client claims is checked: any
//! connection may join under any id or speak for another player.

use crate::client_manager::ClientManager;
use log::{debug, info, warn};
use shared::{check_version, Packet, PlayerAction, PlayerId, PlayerRecord, SNAPSHOT_CHUNK};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

/// A packet addressed to one client.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub addr: SocketAddr,
    pub packet: Packet,
}

pub struct Relay {
    clients: ClientManager,
    /// Last known records in join order.
    roster: Vec<PlayerRecord>,
    /// Connection that last joined each roster entry.
    joined_by: HashMap<PlayerId, PlayerId>,
}

impl Relay {
    pub fn new(max_clients: usize, timeout: Duration) -> Self {
        Self {
            clients: ClientManager::new(max_clients, timeout),
            roster: Vec::new(),
            joined_by: HashMap::new(),
        }
    }

    /// Processes one datagram and returns everything that must be sent.
    pub fn handle_packet(&mut self, packet: Packet, addr: SocketAddr) -> Vec<Outbound> {
        if let Packet::Connect { protocol_version } = packet {
            return self.connect(addr, protocol_version);
        }

        let Some(client_id) = self.clients.find_client_by_addr(addr) else {
            warn!("Dropping {} from unconnected address {}", packet.event_name(), addr);
            return Vec::new();
        };
        self.clients.touch(client_id);

        match packet {
            Packet::Join(record) => self.join(client_id, record),
            Packet::Update(record) => self.relay_update(client_id, record),
            Packet::Fire(action) => self.relay_action(client_id, action, Packet::PlayerShoot),
            Packet::Reload(action) => self.relay_action(client_id, action, Packet::PlayerReload),
            Packet::Disconnect => self.disconnect(client_id),
            other => {
                warn!(
                    "Unexpected {} packet from client {}",
                    other.event_name(),
                    client_id
                );
                Vec::new()
            }
        }
    }

    fn connect(&mut self, addr: SocketAddr, protocol_version: u32) -> Vec<Outbound> {
        info!("Client connecting from {} (protocol {})", addr, protocol_version);

        if let Err(e) = check_version(protocol_version) {
            warn!("Rejecting {}: {}", addr, e);
            return vec![Outbound {
                addr,
                packet: Packet::Rejected {
                    reason: e.to_string(),
                },
            }];
        }

        // A reconnect from the same address replaces the old connection.
        let mut out = match self.clients.find_client_by_addr(addr) {
            Some(existing_id) => {
                info!("Replacing existing client {} from {}", existing_id, addr);
                self.disconnect(existing_id)
            }
            None => Vec::new(),
        };

        let packet = match self.clients.add_client(addr) {
            Some(client_id) => Packet::Connected { client_id },
            None => Packet::Rejected {
                reason: "Server full".to_string(),
            },
        };
        out.push(Outbound { addr, packet });
        out
    }

    fn join(&mut self, client_id: PlayerId, record: PlayerRecord) -> Vec<Outbound> {
        let mut out = Vec::new();

        // The snapshot goes out before the joiner is added, so a first
        // joiner receives an empty list.
        if self.roster.is_empty() {
            self.send_to(&mut out, client_id, Packet::PlayerAll(Vec::new()));
        }
        for chunk in self.roster.chunks(SNAPSHOT_CHUNK) {
            self.send_to(&mut out, client_id, Packet::PlayerAll(chunk.to_vec()));
        }

        match self.roster.iter_mut().find(|p| p.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => self.roster.push(record.clone()),
        }
        self.joined_by.insert(record.id, client_id);
        info!("Player {} joined via client {}", record.id, client_id);

        self.broadcast_except(&mut out, client_id, Packet::PlayerJoined(record));
        self.broadcast(&mut out, Packet::PlayerCount(self.connection_count()));
        self.broadcast_except(
            &mut out,
            client_id,
            Packet::MessageConnect(format!("{} connected to the game.", client_id)),
        );
        out
    }

    fn relay_update(&mut self, client_id: PlayerId, record: PlayerRecord) -> Vec<Outbound> {
        let Some(mirror) = self.roster.iter_mut().find(|p| p.id == record.id) else {
            debug!("Update for unknown player {} from client {}", record.id, client_id);
            return Vec::new();
        };
        mirror.merge_update(&record);

        let mut out = Vec::new();
        self.broadcast_except(&mut out, client_id, Packet::PlayerUpdate(record));
        out
    }

    fn relay_action(
        &mut self,
        client_id: PlayerId,
        action: PlayerAction,
        event: fn(PlayerAction) -> Packet,
    ) -> Vec<Outbound> {
        if !self.roster.iter().any(|p| p.id == action.id) {
            debug!("Action for unknown player {} from client {}", action.id, client_id);
            return Vec::new();
        }

        let mut out = Vec::new();
        self.broadcast_except(&mut out, client_id, event(action));
        out
    }

    /// Closes a connection and tells everyone else about it.
    ///
    /// Removes the entry under the connection's own id and every entry the
    /// connection joined under another id, with one `PlayerLeave` each.
    pub fn disconnect(&mut self, client_id: PlayerId) -> Vec<Outbound> {
        if !self.clients.remove_client(&client_id) {
            return Vec::new();
        }

        let mut out = Vec::new();
        if let Some(index) = self.roster.iter().position(|p| p.id == client_id) {
            let record = self.roster.remove(index);
            self.joined_by.remove(&record.id);
            self.broadcast(&mut out, Packet::PlayerLeave(record));
        }

        let joined_by = &self.joined_by;
        let (owned, kept): (Vec<_>, Vec<_>) = self
            .roster
            .drain(..)
            .partition(|p| joined_by.get(&p.id) == Some(&client_id));
        self.roster = kept;
        for record in owned {
            debug!("Dropping player {} joined by client {}", record.id, client_id);
            self.joined_by.remove(&record.id);
            self.broadcast(&mut out, Packet::PlayerLeave(record));
        }

        self.broadcast(&mut out, Packet::PlayerCount(self.connection_count()));
        self.broadcast(
            &mut out,
            Packet::MessageDisconnect(format!("{} disconnected from the game.", client_id)),
        );
        out
    }

    /// Disconnects every connection that went silent.
    pub fn sweep_timeouts(&mut self) -> Vec<Outbound> {
        let mut out = Vec::new();
        for client_id in self.clients.timed_out() {
            info!("Client {} timed out", client_id);
            out.extend(self.disconnect(client_id));
        }
        out
    }

    pub fn connection_count(&self) -> u32 {
        self.clients.len() as u32
    }

    pub fn roster(&self) -> &[PlayerRecord] {
        &self.roster
    }

    fn send_to(&self, out: &mut Vec<Outbound>, client_id: PlayerId, packet: Packet) {
        if let Some(addr) = self.clients.addr_of(client_id) {
            out.push(Outbound { addr, packet });
        }
    }

    fn broadcast_except(&self, out: &mut Vec<Outbound>, exclude: PlayerId, packet: Packet) {
        for (id, addr) in self.clients.get_client_addrs() {
            if id != exclude {
                out.push(Outbound {
                    addr,
                    packet: packet.clone(),
                });
            }
        }
    }

    fn broadcast(&self, out: &mut Vec<Outbound>, packet: Packet) {
        for (_, addr) in self.clients.get_client_addrs() {
            out.push(Outbound {
                addr,
                packet: packet.clone(),
            });
        }
    }

    #[cfg(test)]
    pub(crate) fn clients_mut(&mut self) -> &mut ClientManager {
        &mut self.clients
    }
}
