//! Room state machine and authoritative move relay.
//!
//! One [`SessionManager`] instance owns every room and every per-connection
//! rate-limit record; the transport wraps it in a single mutex, which makes
//! turn flips and rate checks atomic relative to concurrent moves from the
//! same connection.
//!
//! Error policy (deliberate asymmetry): room capacity is reported to the
//! joining client, but structural violations, turn-order violations and
//! rate-limit hits are dropped without any reply - a probing client learns
//! nothing. All drops are logged server-side.

use crate::config::ServerConfig;
use fluxgrid_core::{Board, Gate, Mulberry32, Player, RuleEngine};
use fluxgrid_net::{Role, RoomSummary, ServerMessage};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Opaque connection identity, assigned by the transport.
pub type ConnId = Uuid;

/// A message owed to a connection; the transport delivers these.
pub type Outbound = (ConnId, ServerMessage);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    Waiting,
    Playing,
}

/// One game room. Slots are retained through disconnects so a vacated seat
/// can be rejoined; the room dies only when fully empty.
pub struct Room {
    id: String,
    slot_a: Option<ConnId>,
    slot_b: Option<ConnId>,
    board: Board,
    turn: Player,
    status: RoomStatus,
    last_move_at: Instant,
}

impl Room {
    fn new(id: String) -> Self {
        Self {
            id,
            slot_a: None,
            slot_b: None,
            board: Board::new(),
            turn: Player::A,
            status: RoomStatus::Waiting,
            last_move_at: Instant::now(),
        }
    }

    #[must_use]
    pub fn status(&self) -> RoomStatus {
        self.status
    }

    #[must_use]
    pub fn turn(&self) -> Player {
        self.turn
    }

    /// The authoritative mirror board.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// When the last move was accepted (room creation time before that).
    #[must_use]
    pub fn last_move_at(&self) -> Instant {
        self.last_move_at
    }

    #[must_use]
    pub fn occupant_count(&self) -> usize {
        usize::from(self.slot_a.is_some()) + usize::from(self.slot_b.is_some())
    }

    fn seat_of(&self, conn: ConnId) -> Option<Player> {
        if self.slot_a == Some(conn) {
            Some(Player::A)
        } else if self.slot_b == Some(conn) {
            Some(Player::B)
        } else {
            None
        }
    }

    fn occupant(&self, player: Player) -> Option<ConnId> {
        match player {
            Player::A => self.slot_a,
            Player::B => self.slot_b,
        }
    }
}

/// Owns all rooms and rate-limit state. See the module docs for the drop
/// policy.
pub struct SessionManager {
    engine: RuleEngine,
    rooms: HashMap<String, Room>,
    /// Instant of the last move *attempt* per connection (matching the
    /// limiter's spam-resistant behavior: rejected attempts also re-arm it).
    last_attempt: HashMap<ConnId, Instant>,
    /// Which room each connection joined.
    membership: HashMap<ConnId, String>,
    move_interval: Duration,
    room_id_max_len: usize,
}

impl SessionManager {
    #[must_use]
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            engine: RuleEngine::new(),
            rooms: HashMap::new(),
            last_attempt: HashMap::new(),
            membership: HashMap::new(),
            move_interval: Duration::from_millis(config.move_interval_ms),
            room_id_max_len: config.room_id_max_len,
        }
    }

    /// Trim, case-fold and cap the raw identifier. Empty results are
    /// invalid.
    fn normalize_room_id(&self, raw: &str) -> Option<String> {
        let id: String = raw.trim().to_uppercase().chars().take(self.room_id_max_len).collect();
        if id.is_empty() {
            None
        } else {
            Some(id)
        }
    }

    #[must_use]
    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.get(id)
    }

    /// Rooms still waiting for an opponent.
    #[must_use]
    pub fn waiting_rooms(&self) -> Vec<RoomSummary> {
        let mut rooms: Vec<RoomSummary> = self
            .rooms
            .values()
            .filter(|r| r.status == RoomStatus::Waiting)
            .map(|r| RoomSummary {
                id: r.id.clone(),
                occupant_count: r.occupant_count(),
            })
            .collect();
        rooms.sort_by(|a, b| a.id.cmp(&b.id));
        rooms
    }

    /// Seats `conn` in the room named by `raw_room_id`, creating the room
    /// on first reference. A full room is the one failure the client hears
    /// about.
    pub fn join(&mut self, conn: ConnId, raw_room_id: &str) -> Vec<Outbound> {
        let Some(room_id) = self.normalize_room_id(raw_room_id) else {
            tracing::warn!(%conn, "join with unusable room id dropped");
            return Vec::new();
        };

        let room = self
            .rooms
            .entry(room_id.clone())
            .or_insert_with(|| Room::new(room_id.clone()));

        if room.slot_a.is_some() && room.slot_b.is_some() {
            tracing::info!(%conn, room = %room_id, "join rejected: room full");
            return vec![(
                conn,
                ServerMessage::Error {
                    message: "Room is full.".to_string(),
                },
            )];
        }

        let role = if room.slot_a.is_none() {
            room.slot_a = Some(conn);
            Role::A
        } else if room.slot_b.is_none() {
            room.slot_b = Some(conn);
            Role::B
        } else {
            // Both seats checked above; anyone slipping through watches.
            Role::Spectator
        };
        self.membership.insert(conn, room_id.clone());
        tracing::info!(%conn, room = %room_id, ?role, "joined");

        let mut out = vec![(conn, ServerMessage::RoleAssigned { role })];

        if let (Some(a), Some(b)) = (room.slot_a, room.slot_b) {
            room.status = RoomStatus::Playing;
            tracing::info!(room = %room_id, "game started");
            for seat in [a, b] {
                out.push((
                    seat,
                    ServerMessage::GameStart {
                        start_turn: Player::A,
                    },
                ));
            }
        }

        out
    }

    /// Evaluates a submitted move. On acceptance the authoritative board is
    /// advanced through the rule engine with the submitted seed, the turn
    /// flips, and the triple is relayed to the opponent only. Every
    /// rejection is silent towards the sender.
    pub fn submit_move(
        &mut self,
        conn: ConnId,
        room_id: &str,
        cell_id: usize,
        gate: Gate,
        seed: u32,
    ) -> Vec<Outbound> {
        let now = Instant::now();
        if let Some(&last) = self.last_attempt.get(&conn) {
            if now.duration_since(last) < self.move_interval {
                tracing::warn!(%conn, "move dropped: rate limited");
                return Vec::new();
            }
        }
        self.last_attempt.insert(conn, now);

        let Some(room) = self.rooms.get_mut(room_id) else {
            tracing::warn!(%conn, room = room_id, "move dropped: unknown room");
            return Vec::new();
        };
        if room.status != RoomStatus::Playing {
            tracing::warn!(%conn, room = room_id, "move dropped: room not playing");
            return Vec::new();
        }
        let Some(seat) = room.seat_of(conn) else {
            tracing::warn!(%conn, room = room_id, "move dropped: not seated");
            return Vec::new();
        };
        if room.turn != seat {
            tracing::warn!(%conn, room = room_id, "move dropped: out of turn");
            return Vec::new();
        }
        if let Err(err) = self.engine.validate_move(&room.board, cell_id) {
            tracing::warn!(%conn, room = room_id, %err, "move dropped: invalid");
            return Vec::new();
        }

        let mut chance = Mulberry32::new(seed);
        room.board = self
            .engine
            .apply_move(&room.board, cell_id, gate, seat, &mut chance);
        room.turn = room.turn.opponent();
        room.last_move_at = now;

        match room.occupant(seat.opponent()) {
            Some(opponent) => vec![(
                opponent,
                ServerMessage::RelayedMove {
                    cell_id,
                    gate,
                    seed,
                },
            )],
            None => Vec::new(),
        }
    }

    /// Tears down a connection: rate-limit record cleared, seat vacated,
    /// remaining occupant notified, and the room destroyed if this was its
    /// last occupant.
    pub fn disconnect(&mut self, conn: ConnId) -> Vec<Outbound> {
        self.last_attempt.remove(&conn);
        let Some(room_id) = self.membership.remove(&conn) else {
            return Vec::new();
        };
        let Some(room) = self.rooms.get_mut(&room_id) else {
            return Vec::new();
        };

        if room.slot_a == Some(conn) {
            room.slot_a = None;
        }
        if room.slot_b == Some(conn) {
            room.slot_b = None;
        }
        tracing::info!(%conn, room = %room_id, "left");

        if room.occupant_count() == 0 {
            self.rooms.remove(&room_id);
            tracing::info!(room = %room_id, "room destroyed");
            return Vec::new();
        }

        [room.slot_a, room.slot_b]
            .into_iter()
            .flatten()
            .map(|remaining| (remaining, ServerMessage::PlayerLeft))
            .collect()
    }
}
