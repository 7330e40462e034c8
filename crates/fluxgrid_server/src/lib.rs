//! # Fluxgrid Server
//!
//! The authoritative session layer: room lifecycle, turn enforcement, rate
//! limiting, and relay of accepted moves to the opponent.
//!
//! The [`session::SessionManager`] is transport-agnostic - it consumes
//! connection ids and returns the messages to deliver - so the whole state
//! machine is unit-testable without a socket in sight. The binary in
//! `main.rs` wires it to an axum WebSocket endpoint.

/// Server configuration (`config.toml`)
pub mod config;
/// Room state machine and authoritative move relay
pub mod session;

pub use config::ServerConfig;
pub use session::{ConnId, SessionManager};
