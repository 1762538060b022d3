//! Connection registry for the relay
//!
//! This module tracks the transport-level side of every client:
//! - Connection lifecycle (connect, disconnect, timeout)
//! - Address lookup so incoming datagrams can be attributed to a connection
//! - Capacity limits and connection-id allocation
//!
//! A connection exists from `Connect` until `Disconnect` or timeout. It says
//! nothing about whether the client has joined with a player record; that is
//! the relay's roster mirror.

use log::info;
use shared::PlayerId;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// A connected client
#[derive(Debug)]
pub struct Client {
    /// Connection identifier assigned by the relay
    pub id: PlayerId,
    /// Network address for outgoing datagrams
    pub addr: SocketAddr,
    /// Last time any datagram arrived from this client
    pub last_seen: Instant,
}

impl Client {
    pub fn new(id: PlayerId, addr: SocketAddr) -> Self {
        Self {
            id,
            addr,
            last_seen: Instant::now(),
        }
    }

    /// Returns true if nothing was heard from this client within `timeout`.
    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

/// Tracks all open connections
///
/// Connections are kept ordered by id so that fan-out happens in a stable
/// order. Ids start at 1 and are never reused within a relay's lifetime.
pub struct ClientManager {
    clients: BTreeMap<PlayerId, Client>,
    next_client_id: PlayerId,
    max_clients: usize,
    timeout: Duration,
}

impl ClientManager {
    pub fn new(max_clients: usize, timeout: Duration) -> Self {
        Self {
            clients: BTreeMap::new(),
            next_client_id: 1,
            max_clients,
            timeout,
        }
    }

    /// Attempts to register a new connection
    ///
    /// Returns None if the relay is at capacity.
    pub fn add_client(&mut self, addr: SocketAddr) -> Option<PlayerId> {
        if self.clients.len() >= self.max_clients {
            return None;
        }

        let client_id = self.next_client_id;
        self.next_client_id += 1;

        info!("Client {} connected from {}", client_id, addr);
        self.clients.insert(client_id, Client::new(client_id, addr));

        Some(client_id)
    }

    /// Removes a connection. Returns false if it was already gone.
    pub fn remove_client(&mut self, client_id: &PlayerId) -> bool {
        if let Some(client) = self.clients.remove(client_id) {
            info!("Client {} disconnected", client.id);
            true
        } else {
            false
        }
    }

    pub fn find_client_by_addr(&self, addr: SocketAddr) -> Option<PlayerId> {
        self.clients
            .values()
            .find(|client| client.addr == addr)
            .map(|client| client.id)
    }

    pub fn addr_of(&self, client_id: PlayerId) -> Option<SocketAddr> {
        self.clients.get(&client_id).map(|client| client.addr)
    }

    /// Records activity from a connection.
    pub fn touch(&mut self, client_id: PlayerId) {
        if let Some(client) = self.clients.get_mut(&client_id) {
            client.last_seen = Instant::now();
        }
    }

    /// Lists connections that have been silent for longer than the timeout.
    ///
    /// The connections are not removed here; the relay disconnects them so
    /// that the usual leave notifications go out.
    pub fn timed_out(&self) -> Vec<PlayerId> {
        self.clients
            .values()
            .filter(|client| client.is_timed_out(self.timeout))
            .map(|client| client.id)
            .collect()
    }

    /// All connections as `(id, address)` pairs, ordered by id.
    pub fn get_client_addrs(&self) -> Vec<(PlayerId, SocketAddr)> {
        self.clients
            .values()
            .map(|client| (client.id, client.addr))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn backdate(&mut self, client_id: PlayerId, by: Duration) {
        if let Some(client) = self.clients.get_mut(&client_id) {
            client.last_seen = Instant::now() - by;
        }
    }
}
