//! Board, cell and move value types.
//!
//! A [`Board`] is plain immutable value data: every rule application clones
//! and returns a new board, so the UI, search engine and session layer can
//! share references without locking.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Side length of the fixed grid.
pub const GRID_SIZE: usize = 6;
/// Total cell count; cell ids live in `0..TOTAL_CELLS`.
pub const TOTAL_CELLS: usize = GRID_SIZE * GRID_SIZE;

/// One of the two players. A always takes the first turn.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    A,
    B,
}

impl Player {
    #[must_use]
    pub fn opponent(self) -> Self {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
        }
    }

    /// Sign convention used by the search engine's byte board: A = +1, B = -1.
    #[must_use]
    pub fn sign(self) -> i8 {
        match self {
            Player::A => 1,
            Player::B => -1,
        }
    }
}

/// The three move types a player may apply to an empty cell.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
    /// Claims the target permanently. No neighbor effects.
    Lock,
    /// Claims the target and captures/stabilizes adjacent material;
    /// diagonal effects succeed with 50% probability.
    Collide,
    /// Puts the target in flux and spreads flux to adjacent enemy material.
    Destabilize,
}

/// Cell state with its ownership payload.
///
/// Owner is carried inside the variant, so "owner set iff stable/locked" and
/// "flux owner set iff flux" hold by construction. The `Flux` payload is the
/// flux owner - the player who will win the cell if it survives to collapse
/// uncontested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellState {
    #[default]
    Empty,
    Stable(Player),
    /// Terminal: no future operation may alter a locked cell.
    Locked(Player),
    Flux(Player),
}

impl CellState {
    #[must_use]
    pub fn is_empty(self) -> bool {
        matches!(self, CellState::Empty)
    }

    #[must_use]
    pub fn is_locked(self) -> bool {
        matches!(self, CellState::Locked(_))
    }

    /// The scoring owner. Flux cells have no owner until collapsed.
    #[must_use]
    pub fn owner(self) -> Option<Player> {
        match self {
            CellState::Stable(p) | CellState::Locked(p) => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub fn flux_owner(self) -> Option<Player> {
        match self {
            CellState::Flux(p) => Some(p),
            _ => None,
        }
    }
}

/// A grid position and its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub id: usize,
    pub state: CellState,
}

impl Cell {
    #[must_use]
    pub fn x(&self) -> usize {
        self.id / GRID_SIZE
    }

    #[must_use]
    pub fn y(&self) -> usize {
        self.id % GRID_SIZE
    }
}

/// Cell counts per player. Locked and stable both count; flux does not
/// until collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Score {
    pub a: u32,
    pub b: u32,
}

/// The fixed 36-cell grid, indexed by cell id (`id = x * 6 + y`).
///
/// Boards never cross the wire - peers reconstruct them by replaying the
/// same moves - so only the small wire types carry serde.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Cell; TOTAL_CELLS],
}

impl Board {
    /// An all-empty board.
    #[must_use]
    pub fn new() -> Self {
        let mut id = 0;
        Self {
            cells: [(); TOTAL_CELLS].map(|()| {
                let cell = Cell {
                    id,
                    state: CellState::Empty,
                };
                id += 1;
                cell
            }),
        }
    }

    #[must_use]
    pub fn get(&self, id: usize) -> Option<&Cell> {
        self.cells.get(id)
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell; TOTAL_CELLS] {
        &mut self.cells
    }

    #[must_use]
    pub fn state(&self, id: usize) -> CellState {
        self.cells[id].state
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| !c.state.is_empty())
    }

    #[must_use]
    pub fn score(&self) -> Score {
        let mut score = Score::default();
        for cell in &self.cells {
            match cell.state.owner() {
                Some(Player::A) => score.a += 1,
                Some(Player::B) => score.b += 1,
                None => {}
            }
        }
        score
    }

    /// First empty cell id in ascending order, if any.
    #[must_use]
    pub fn first_empty(&self) -> Option<usize> {
        self.cells.iter().position(|c| c.state.is_empty())
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Compact grid rendering for the CLI and logs.
///
/// `.` empty, `a`/`b` stable, `A`/`B` locked, `x`/`y` flux held by A/B.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for x in 0..GRID_SIZE {
            for y in 0..GRID_SIZE {
                let glyph = match self.cells[x * GRID_SIZE + y].state {
                    CellState::Empty => '.',
                    CellState::Stable(Player::A) => 'a',
                    CellState::Stable(Player::B) => 'b',
                    CellState::Locked(Player::A) => 'A',
                    CellState::Locked(Player::B) => 'B',
                    CellState::Flux(Player::A) => 'x',
                    CellState::Flux(Player::B) => 'y',
                };
                write!(f, "{glyph} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        assert!(!board.is_full());
        assert_eq!(board.score(), Score { a: 0, b: 0 });
        for (i, cell) in board.cells().enumerate() {
            assert_eq!(cell.id, i);
            assert!(cell.state.is_empty());
        }
    }

    #[test]
    fn test_coordinate_derivation() {
        let board = Board::new();
        let cell = board.get(14).expect("cell 14 exists");
        assert_eq!((cell.x(), cell.y()), (2, 2));
        let corner = board.get(35).expect("cell 35 exists");
        assert_eq!((corner.x(), corner.y()), (5, 5));
    }

    #[test]
    fn test_score_ignores_flux() {
        let mut board = Board::new();
        board.cells_mut()[0].state = CellState::Stable(Player::A);
        board.cells_mut()[1].state = CellState::Locked(Player::A);
        board.cells_mut()[2].state = CellState::Flux(Player::A);
        board.cells_mut()[3].state = CellState::Stable(Player::B);
        assert_eq!(board.score(), Score { a: 2, b: 1 });
    }

    #[test]
    fn test_owner_invariants() {
        assert_eq!(CellState::Empty.owner(), None);
        assert_eq!(CellState::Flux(Player::A).owner(), None);
        assert_eq!(CellState::Flux(Player::A).flux_owner(), Some(Player::A));
        assert_eq!(CellState::Stable(Player::B).owner(), Some(Player::B));
        assert_eq!(CellState::Stable(Player::B).flux_owner(), None);
    }

    #[test]
    fn test_player_gate_serde() {
        let json = serde_json::to_string(&Player::A).expect("Failed to serialize player");
        assert_eq!(json, "\"A\"");
        let gate: Gate = serde_json::from_str("\"Collide\"").expect("Failed to deserialize gate");
        assert_eq!(gate, Gate::Collide);
    }
}
