//! # Fluxgrid Net
//!
//! The wire protocol between game clients and the relay server.
//!
//! Messages are JSON text frames. No full board state ever crosses the
//! wire: an accepted move is relayed to the opponent as the same
//! `(cell_id, gate, seed)` triple the sender submitted, and the opponent
//! replays it through its own rule engine to reach the identical board.

use fluxgrid_core::{Gate, Player};
use serde::{Deserialize, Serialize};

/// The role a connection holds inside a room.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    A,
    B,
    /// Connected but not seated; receives nothing and may not move.
    Spectator,
}

/// Client-to-server messages.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Join (and implicitly create) a room by identifier.
    Join { room_id: String },
    /// Submit a move with the seed the opponent must replay it with.
    SubmitMove {
        room_id: String,
        cell_id: usize,
        gate: Gate,
        seed: u32,
    },
}

/// Server-to-client messages.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Reply to a join: which seat the connection got.
    RoleAssigned { role: Role },
    /// Both seats are filled; play begins.
    GameStart { start_turn: Player },
    /// The opponent's accepted move, relayed verbatim. Sent only to the
    /// other seat, never echoed to the sender.
    RelayedMove { cell_id: usize, gate: Gate, seed: u32 },
    /// The other occupant disconnected.
    PlayerLeft,
    /// Explicitly reported failures (currently only room capacity).
    Error { message: String },
}

/// One row of the waiting-room listing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub id: String,
    pub occupant_count: usize,
}
