//! # Game Client Library
//!
//! The client side of the relayed shooter. It owns the local player's weapon
//! and the projectile registry, mirrors every remote player it hears about,
//! and talks to the relay over UDP.
//!
//! ## Architecture Overview
//!
//! Each client simulates its own player and announces what it did: its
//! transform every tick, plus a fire or reload event whenever the local weapon
//! accepted one. Remote players are not simulated; their last reported record
//! is mirrored as-is, and their fire and reload events are replayed through a
//! local copy of their weapon so their shots appear here too.
//!
//! ### Tick Order
//! 1. Packets received since the last tick are applied to the roster.
//! 2. Input resolution: reload, then fire.
//! 3. Physics read-back into the local player's record.
//! 4. Weapon timers advance.
//! 5. Projectiles poll for collisions, move and retire.
//! 6. The local record is sent to the relay.
//!
//! ## Module Organization
//!
//! ### Roster Module (`roster`)
//! The mirror of known players, fed by relay events.
//!
//! ### Game Module (`game`)
//! The per-tick loop, remote action replay, ammo stations and HUD text.
//!
//! ### Scene, Physics and Input Modules (`scene`, `physics`, `input`)
//! Headless stand-ins for the renderer, audio, physics engine and keyboard,
//! so a client can run as a bot from the command line.
//!
//! ### Network Module (`network`)
//! UDP socket management and the `select!` loop that feeds the game.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::input::ScriptedInput;
//! use client::network::{Client, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let input = ScriptedInput::new(10, 0);
//!     let mut client = Client::new("127.0.0.1:8080", ClientConfig::default(), input).await?;
//!     client.run().await
//! }
//! ```

pub mod game;
pub mod input;
pub mod network;
pub mod physics;
pub mod roster;
pub mod scene;
