//! Heuristic board evaluation.
//!
//! A board's utility for one perspective is the signed sum of per-cell
//! values (material + position + clustering) plus a penalty for fortified
//! enemy clusters. Scores are plain `i32`; the search only ever compares
//! them.

use crate::board::{SearchBoard, FLUX, LOCKED, STABLE};
use fluxgrid_core::{NeighborTable, TOTAL_CELLS};

/// Positional value per cell id. Center control is king: the four center
/// cells are worth 12, the corners 2.
pub const HEATMAP: [i32; TOTAL_CELLS] = [
    2, 3, 4, 4, 3, 2, //
    3, 6, 8, 8, 6, 3, //
    4, 8, 12, 12, 8, 4, //
    4, 8, 12, 12, 8, 4, //
    3, 6, 8, 8, 6, 3, //
    2, 3, 4, 4, 3, 2,
];

/// Locked cells are permanent points; flux is weak until collapsed.
fn material_value(magnitude: i8) -> i32 {
    match magnitude {
        LOCKED => 80,
        STABLE => 25,
        FLUX => 10,
        _ => 0,
    }
}

/// Neighbors of `idx` owned by the side with sign `owner`.
pub(crate) fn friendly_neighbors(
    neighbors: &NeighborTable,
    board: &SearchBoard,
    idx: usize,
    owner: i8,
) -> i32 {
    neighbors
        .of(idx)
        .iter()
        .flatten()
        .filter(|n| board.0[n.idx].signum() == owner)
        .count() as i32
}

/// Penalty for fortified enemy clusters: -20 for each enemy cell with 3+
/// same-owner neighbors, a further -40 at 5+ (stacking).
fn threat_adjustment(neighbors: &NeighborTable, board: &SearchBoard, me: i8) -> i32 {
    let enemy = -me;
    let mut score = 0;
    for idx in 0..TOTAL_CELLS {
        if board.0[idx].signum() != enemy {
            continue;
        }
        let connections = friendly_neighbors(neighbors, board, idx, enemy);
        if connections >= 3 {
            score -= 20;
        }
        if connections >= 5 {
            score -= 40;
        }
    }
    score
}

/// Utility of `board` for the side with sign `me`. Higher is better.
pub fn evaluate(neighbors: &NeighborTable, board: &SearchBoard, me: i8) -> i32 {
    let mut score = 0;
    for idx in 0..TOTAL_CELLS {
        let val = board.0[idx];
        if val == 0 {
            continue;
        }
        let owner = val.signum();
        let mut cell_value = material_value(val.abs());
        cell_value += HEATMAP[idx] * 3;
        cell_value += friendly_neighbors(neighbors, board, idx, owner) * 6;

        if owner == me {
            score += cell_value;
        } else {
            score -= cell_value;
        }
    }
    score + threat_adjustment(neighbors, board, me)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::SearchBoard;

    #[test]
    fn test_heatmap_shape() {
        assert_eq!(HEATMAP[0], 2);
        assert_eq!(HEATMAP[14], 12);
        assert_eq!(HEATMAP[21], 12);
        assert_eq!(HEATMAP[35], 2);
        // Symmetric under 180-degree rotation.
        for i in 0..TOTAL_CELLS {
            assert_eq!(HEATMAP[i], HEATMAP[TOTAL_CELLS - 1 - i]);
        }
    }

    #[test]
    fn test_empty_board_is_neutral() {
        let neighbors = NeighborTable::new();
        assert_eq!(evaluate(&neighbors, &SearchBoard::empty(), 1), 0);
    }

    #[test]
    fn test_evaluation_is_antisymmetric() {
        let neighbors = NeighborTable::new();
        let mut board = SearchBoard::empty();
        board.0[14] = LOCKED;
        board.0[0] = -STABLE;
        board.0[1] = -STABLE;
        assert_eq!(
            evaluate(&neighbors, &board, 1),
            -evaluate(&neighbors, &board, -1)
        );
    }

    #[test]
    fn test_locked_center_beats_stable_corner() {
        let neighbors = NeighborTable::new();
        let mut locked_center = SearchBoard::empty();
        locked_center.0[14] = LOCKED;
        let mut stable_corner = SearchBoard::empty();
        stable_corner.0[0] = STABLE;
        assert!(
            evaluate(&neighbors, &locked_center, 1) > evaluate(&neighbors, &stable_corner, 1)
        );
    }

    #[test]
    fn test_threat_penalty_applies_to_enemy_clusters() {
        let neighbors = NeighborTable::new();
        // T-shaped enemy cluster: 14 touches 15, 13 and 19; every other
        // member touches at most two, so exactly one -20 fires.
        let mut board = SearchBoard::empty();
        for &idx in &[14, 15, 13, 19] {
            board.0[idx] = -STABLE;
        }
        let base: i32 = [14usize, 15, 13, 19]
            .iter()
            .map(|&idx| {
                -(25 + HEATMAP[idx] * 3
                    + friendly_neighbors(&neighbors, &board, idx, -1) * 6)
            })
            .sum();
        assert_eq!(evaluate(&neighbors, &board, 1), base - 20);
    }
}
