//! Umbrella package for the workspace integration tests.
//!
//! The combat core and wire protocol live in `shared`, the broadcast relay in
//! `server` and the headless client in `client`.
