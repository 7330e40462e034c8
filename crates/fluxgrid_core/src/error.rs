//! Structural validation errors for moves.

use thiserror::Error;

/// Why a move is structurally invalid against a given board.
///
/// The session layer logs these and drops the offending request without
/// replying; the rule engine itself degrades to a no-op instead.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    /// Target cell id is outside `0..36`.
    #[error("cell id {0} is out of range")]
    OutOfRange(usize),

    /// Target cell is not empty.
    #[error("cell {0} is already occupied")]
    Occupied(usize),
}
