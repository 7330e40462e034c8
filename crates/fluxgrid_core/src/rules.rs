//! The rule engine: gate application, collapse, validation.
//!
//! All mutation is copy-on-write: `apply_move` and `collapse` take a board
//! by reference and return a new one. Neighbor reads always happen against
//! the input board, never the board under construction, so a capture on one
//! neighbor can never cascade into the evaluation of the next.
//!
//! The neighbor table is precomputed once at engine construction and never
//! mutated afterwards.

use crate::board::{Board, CellState, Gate, Player, GRID_SIZE, TOTAL_CELLS};
use crate::error::MoveError;
use crate::rng::ChanceSource;

/// Fixed neighbor evaluation order: the four orthogonals, then the four
/// diagonals. Both peers must walk neighbors in exactly this order or the
/// chance draws go out of sync.
const NEIGHBOR_OFFSETS: [(i32, i32, bool); 8] = [
    (0, 1, false),
    (0, -1, false),
    (1, 0, false),
    (-1, 0, false),
    (1, 1, true),
    (1, -1, true),
    (-1, 1, true),
    (-1, -1, true),
];

/// An adjacent cell, with the diagonal flag that gates the 50% collide roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    pub idx: usize,
    pub diagonal: bool,
}

/// Per-cell adjacency in fixed order; off-grid slots are `None`.
#[derive(Debug, Clone)]
pub struct NeighborTable {
    entries: [[Option<Neighbor>; 8]; TOTAL_CELLS],
}

impl NeighborTable {
    #[must_use]
    pub fn new() -> Self {
        let mut entries = [[None; 8]; TOTAL_CELLS];
        for (id, slots) in entries.iter_mut().enumerate() {
            let x = (id / GRID_SIZE) as i32;
            let y = (id % GRID_SIZE) as i32;
            for (slot, &(dx, dy, diagonal)) in slots.iter_mut().zip(NEIGHBOR_OFFSETS.iter()) {
                let (nx, ny) = (x + dx, y + dy);
                if (0..GRID_SIZE as i32).contains(&nx) && (0..GRID_SIZE as i32).contains(&ny) {
                    *slot = Some(Neighbor {
                        idx: (nx * GRID_SIZE as i32 + ny) as usize,
                        diagonal,
                    });
                }
            }
        }
        Self { entries }
    }

    #[must_use]
    pub fn of(&self, id: usize) -> &[Option<Neighbor>; 8] {
        &self.entries[id]
    }
}

impl Default for NeighborTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies moves and collapses boards. Pure and value-semantic: safe to
/// call from any thread without locking.
pub struct RuleEngine {
    neighbors: NeighborTable,
}

impl RuleEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            neighbors: NeighborTable::new(),
        }
    }

    #[must_use]
    pub fn neighbors(&self) -> &NeighborTable {
        &self.neighbors
    }

    /// Structural validation used by the session layer before accepting a
    /// move: bounds and occupancy. Gate validity is the type system's job.
    pub fn validate_move(&self, board: &Board, cell_id: usize) -> Result<(), MoveError> {
        let cell = board.get(cell_id).ok_or(MoveError::OutOfRange(cell_id))?;
        if !cell.state.is_empty() {
            return Err(MoveError::Occupied(cell_id));
        }
        Ok(())
    }

    /// Applies `gate` at `cell_id` for `player`, drawing from `chance` once
    /// per diagonal collide attempt. Invalid moves return the board
    /// unchanged.
    #[must_use]
    pub fn apply_move(
        &self,
        board: &Board,
        cell_id: usize,
        gate: Gate,
        player: Player,
        chance: &mut dyn ChanceSource,
    ) -> Board {
        if self.validate_move(board, cell_id).is_err() {
            return board.clone();
        }

        let mut next = board.clone();

        match gate {
            Gate::Lock => {
                next.cells_mut()[cell_id].state = CellState::Locked(player);
                // A lock has no neighbor effects.
                return next;
            }
            Gate::Collide => next.cells_mut()[cell_id].state = CellState::Stable(player),
            Gate::Destabilize => next.cells_mut()[cell_id].state = CellState::Flux(player),
        }

        let enemy = player.opponent();
        for neighbor in self.neighbors.of(cell_id).iter().flatten() {
            // Read the pre-move state; locked and empty cells are inert.
            let state = board.state(neighbor.idx);
            if matches!(state, CellState::Empty | CellState::Locked(_)) {
                continue;
            }

            match gate {
                Gate::Collide => {
                    // Diagonal effects are dropped half the time. The draw
                    // happens for every live diagonal neighbor, whether or
                    // not the effect below would change anything.
                    if neighbor.diagonal && chance.next() > 0.5 {
                        continue;
                    }
                    match state {
                        CellState::Stable(owner) if owner == enemy => {
                            next.cells_mut()[neighbor.idx].state = CellState::Stable(player);
                        }
                        CellState::Flux(_) => {
                            next.cells_mut()[neighbor.idx].state = CellState::Stable(player);
                        }
                        _ => {}
                    }
                }
                Gate::Destabilize => match state {
                    CellState::Stable(owner) if owner == enemy => {
                        next.cells_mut()[neighbor.idx].state = CellState::Flux(player);
                    }
                    CellState::Flux(_) => {
                        next.cells_mut()[neighbor.idx].state = CellState::Flux(player);
                    }
                    _ => {}
                },
                Gate::Lock => unreachable!("lock returns before neighbor propagation"),
            }
        }

        next
    }

    /// End-of-game resolution: every flux cell, in ascending id order,
    /// draws once and resolves to A on `> 0.5`, otherwise B. A no-op on
    /// boards without flux.
    #[must_use]
    pub fn collapse(&self, board: &Board, chance: &mut dyn ChanceSource) -> Board {
        let mut next = board.clone();
        for cell in next.cells_mut().iter_mut() {
            if let CellState::Flux(_) = cell.state {
                let winner = if chance.next() > 0.5 {
                    Player::A
                } else {
                    Player::B
                };
                cell.state = CellState::Stable(winner);
            }
        }
        next
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Mulberry32;

    fn board_with(states: &[(usize, CellState)]) -> Board {
        let mut board = Board::new();
        for &(id, state) in states {
            board.cells_mut()[id].state = state;
        }
        board
    }

    #[test]
    fn test_neighbor_table_corner_and_center() {
        let table = NeighborTable::new();
        // Corner (0,0): E, S, SE only.
        let corner: Vec<_> = table.of(0).iter().flatten().map(|n| n.idx).collect();
        assert_eq!(corner, vec![1, 6, 7]);
        // Center (2,2): all 8 present.
        assert_eq!(table.of(14).iter().flatten().count(), 8);
        let diagonals: Vec<_> = table
            .of(14)
            .iter()
            .flatten()
            .filter(|n| n.diagonal)
            .map(|n| n.idx)
            .collect();
        assert_eq!(diagonals, vec![21, 19, 9, 7]);
    }

    #[test]
    fn test_lock_has_no_neighbor_effects() {
        let engine = RuleEngine::new();
        let board = board_with(&[(15, CellState::Stable(Player::A))]);
        let mut chance = Mulberry32::new(9);
        let next = engine.apply_move(&board, 14, Gate::Lock, Player::B, &mut chance);
        assert_eq!(next.state(14), CellState::Locked(Player::B));
        assert_eq!(next.state(15), CellState::Stable(Player::A));
    }

    #[test]
    fn test_collide_captures_orthogonal_enemy() {
        let engine = RuleEngine::new();
        let board = board_with(&[(15, CellState::Stable(Player::B))]);
        let mut chance = Mulberry32::new(1);
        let next = engine.apply_move(&board, 14, Gate::Collide, Player::A, &mut chance);
        assert_eq!(next.state(14), CellState::Stable(Player::A));
        assert_eq!(next.state(15), CellState::Stable(Player::A));
    }

    #[test]
    fn test_collide_diagonal_roll_drops_or_lands() {
        let engine = RuleEngine::new();
        // Cell 21 is the (+1,+1) diagonal of 14 and the only live neighbor,
        // so exactly one chance value is drawn.
        let board = board_with(&[(21, CellState::Stable(Player::B))]);

        // Seed 1: first draw 0.627... > 0.5, effect dropped.
        let mut chance = Mulberry32::new(1);
        let next = engine.apply_move(&board, 14, Gate::Collide, Player::A, &mut chance);
        assert_eq!(next.state(21), CellState::Stable(Player::B));

        // Seed 7: first draw 0.0117... <= 0.5, capture lands.
        let mut chance = Mulberry32::new(7);
        let next = engine.apply_move(&board, 14, Gate::Collide, Player::A, &mut chance);
        assert_eq!(next.state(21), CellState::Stable(Player::A));
    }

    #[test]
    fn test_collide_stabilizes_own_flux() {
        let engine = RuleEngine::new();
        let board = board_with(&[(15, CellState::Flux(Player::A))]);
        let mut chance = Mulberry32::new(1);
        let next = engine.apply_move(&board, 14, Gate::Collide, Player::A, &mut chance);
        assert_eq!(next.state(15), CellState::Stable(Player::A));
    }

    #[test]
    fn test_destabilize_spreads_and_steals() {
        let engine = RuleEngine::new();
        let board = board_with(&[
            (15, CellState::Stable(Player::B)),
            (13, CellState::Flux(Player::B)),
            (20, CellState::Stable(Player::A)),
        ]);
        let mut chance = Mulberry32::new(1);
        let next = engine.apply_move(&board, 14, Gate::Destabilize, Player::A, &mut chance);
        assert_eq!(next.state(14), CellState::Flux(Player::A));
        // Enemy stable becomes flux held by the mover.
        assert_eq!(next.state(15), CellState::Flux(Player::A));
        // Existing flux is stolen.
        assert_eq!(next.state(13), CellState::Flux(Player::A));
        // Own stable material is untouched.
        assert_eq!(next.state(20), CellState::Stable(Player::A));
    }

    #[test]
    fn test_destabilize_ignores_locked() {
        let engine = RuleEngine::new();
        let board = board_with(&[(15, CellState::Locked(Player::B))]);
        let mut chance = Mulberry32::new(1);
        let next = engine.apply_move(&board, 14, Gate::Destabilize, Player::A, &mut chance);
        assert_eq!(next.state(15), CellState::Locked(Player::B));
    }

    #[test]
    fn test_invalid_moves_return_board_unchanged() {
        let engine = RuleEngine::new();
        let board = board_with(&[(14, CellState::Stable(Player::A))]);
        let mut chance = Mulberry32::new(1);

        let occupied = engine.apply_move(&board, 14, Gate::Collide, Player::B, &mut chance);
        assert_eq!(occupied, board);

        let out_of_range = engine.apply_move(&board, 99, Gate::Collide, Player::B, &mut chance);
        assert_eq!(out_of_range, board);

        assert_eq!(
            engine.validate_move(&board, 14),
            Err(MoveError::Occupied(14))
        );
        assert_eq!(
            engine.validate_move(&board, 36),
            Err(MoveError::OutOfRange(36))
        );
    }

    #[test]
    fn test_collapse_resolves_all_flux() {
        let engine = RuleEngine::new();
        let mut board = Board::new();
        for id in 0..TOTAL_CELLS {
            board.cells_mut()[id].state = CellState::Flux(Player::A);
        }
        let mut chance = Mulberry32::new(1);
        let collapsed = engine.collapse(&board, &mut chance);
        assert!(collapsed
            .cells()
            .all(|c| matches!(c.state, CellState::Stable(_))));
    }

    #[test]
    fn test_collapse_is_noop_without_flux() {
        let engine = RuleEngine::new();
        let board = board_with(&[
            (0, CellState::Stable(Player::A)),
            (1, CellState::Locked(Player::B)),
        ]);
        let mut chance = Mulberry32::new(1);
        let collapsed = engine.collapse(&board, &mut chance);
        assert_eq!(collapsed, board);
    }
}
