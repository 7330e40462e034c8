//! # Fluxgrid Core
//!
//! The deterministic game core for Fluxgrid - a two-player territory game
//! played on a fixed 6x6 grid.
//!
//! This crate contains the pure, value-semantic game logic:
//! - Seeded pseudo-random number generation (bit-reproducible across peers)
//! - Board and cell state modeling
//! - The rule engine: gate application, neighbor propagation, end-of-game
//!   collapse, scoring
//!
//! ## Determinism
//!
//! Networked play never transfers full board state. Both peers replay the
//! same `(cell, gate, seed)` triple through [`RuleEngine::apply_move`] and
//! must arrive at byte-identical boards. Everything here therefore uses
//! fixed-width integer arithmetic and a fixed neighbor evaluation order;
//! the only chance source is an explicitly injected [`ChanceSource`].
//!
//! ## Example
//!
//! ```
//! use fluxgrid_core::{Board, Gate, Mulberry32, Player, RuleEngine};
//!
//! let engine = RuleEngine::new();
//! let board = Board::new();
//!
//! let mut chance = Mulberry32::new(1);
//! let board = engine.apply_move(&board, 14, Gate::Collide, Player::A, &mut chance);
//! assert_eq!(board.score().a, 1);
//! ```

/// Board, cell and move value types
pub mod board;
/// Structural move validation errors
pub mod error;
/// Seeded deterministic RNG and the injected chance seam
pub mod rng;
/// The rule engine: gate semantics, collapse, validation
pub mod rules;

pub use board::{Board, Cell, CellState, Gate, Player, Score, GRID_SIZE, TOTAL_CELLS};
pub use error::MoveError;
pub use rng::{AmbientChance, ChanceSource, Mulberry32};
pub use rules::{Neighbor, NeighborTable, RuleEngine};
