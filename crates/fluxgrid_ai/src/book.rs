//! Opening book for high-difficulty play.

use crate::board::SearchBoard;
use crate::search::AiMove;
use fluxgrid_core::Gate;

/// Pre-calculated strong replies, indexed by the number of stones already
/// on the board. Only consulted at difficulty 5+; a match bypasses search
/// entirely. An entry whose cell has since been taken is ignored so the
/// book can never emit an invalid move.
#[must_use]
pub fn opening_move(board: &SearchBoard, stones: usize, difficulty: u8) -> Option<AiMove> {
    if difficulty < 5 {
        return None;
    }
    let entry = match stones {
        // Opponent opened: lock down center-right immediately.
        1 => Some(AiMove {
            cell_id: 20,
            gate: Gate::Lock,
        }),
        // Aggressive center-left take on the second reply.
        3 => Some(AiMove {
            cell_id: 14,
            gate: Gate::Collide,
        }),
        _ => None,
    };
    entry.filter(|mv| board.0[mv.cell_id] == 0)
}
