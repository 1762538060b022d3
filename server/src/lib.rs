//! # Relay Server Library
//!
//! This library implements the broadcast relay that connects the shooter's
//! clients. The relay is deliberately *not* an authority: it never simulates
//! anything, never validates what clients claim, and only fans messages out.
//!
//! ## Core Responsibilities
//!
//! ### Fan-out
//! Join, update, fire and reload events from one client are rebroadcast to
//! every other connected client. The sender never gets its own event back.
//!
//! ### Late-join Snapshots
//! The relay mirrors the last record it saw for every joined player. A client
//! that joins receives that mirror (`player::all`) before it is added to it,
//! so the first client to join receives an empty list.
//!
//! ### Connection Accounting
//! Connections are registered on `Connect` and dropped on `Disconnect` or
//! after a period of silence. Every change in the number of connections is
//! broadcast as `player::count`, along with a human-readable notice.
//!
//! ## Module Organization
//!
//! ### Client Manager Module (`client_manager`)
//! Transport-level bookkeeping:
//! - Connection ids and addresses
//! - Capacity limits
//! - Silence detection
//!
//! ### Relay Module (`relay`)
//! The socket-free fan-out logic. Every handler takes one inbound packet and
//! returns the list of addressed packets to send, which keeps the protocol
//! testable without any networking.
//!
//! ### Network Module (`network`)
//! UDP socket ownership, the receiver and sender tasks, and the main loop.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::{RelayConfig, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut server = Server::new("0.0.0.0:8080", RelayConfig::default()).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Trust Model
//!
//! Any client may claim any id, overwrite any other player's record or speak
//! for another player. Message loss and reordering are not corrected either;
//! the worst outcome is cosmetic desynchronisation on the clients.

pub mod client_manager;
pub mod network;
pub mod relay;
