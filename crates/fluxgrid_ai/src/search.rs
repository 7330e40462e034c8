//! Alpha-beta minimax, move ordering and difficulty tiers.
//!
//! The [`Searcher`] owns the precomputed neighbor table; everything else is
//! stateless, so one instance can serve any number of searches.

use crate::board::{SearchBoard, FLUX, LOCKED, STABLE};
use crate::book;
use crate::eval::{self, HEATMAP};
use fluxgrid_core::{Gate, NeighborTable, Player, TOTAL_CELLS};
use rand::seq::SliceRandom;
use rand::Rng;

/// A chosen move: target cell plus gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiMove {
    pub cell_id: usize,
    pub gate: Gate,
}

/// Gate order matters: the first entry doubles as the fallback gate.
const ALL_GATES: [Gate; 3] = [Gate::Collide, Gate::Lock, Gate::Destabilize];

/// The adversarial search engine.
pub struct Searcher {
    neighbors: NeighborTable,
}

impl Searcher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            neighbors: NeighborTable::new(),
        }
    }

    /// Heuristic utility of `board` for the side with sign `me`.
    #[must_use]
    pub fn evaluate(&self, board: &SearchBoard, me: i8) -> i32 {
        eval::evaluate(&self.neighbors, board, me)
    }

    /// Search-time move application. Mirrors the rule engine except for the
    /// chance element: diagonal collide effects are treated as guaranteed
    /// failures and skipped, keeping every node deterministic.
    #[must_use]
    pub fn apply(&self, board: &SearchBoard, cell_id: usize, gate: Gate, sign: i8) -> SearchBoard {
        let mut next = *board;
        let enemy = -sign;

        match gate {
            Gate::Lock => {
                next.0[cell_id] = LOCKED * sign;
                return next;
            }
            Gate::Collide => next.0[cell_id] = STABLE * sign,
            Gate::Destabilize => next.0[cell_id] = FLUX * sign,
        }

        for neighbor in self.neighbors.of(cell_id).iter().flatten() {
            let val = next.0[neighbor.idx];
            if val == 0 || val.abs() == LOCKED {
                continue;
            }
            match gate {
                Gate::Collide => {
                    if neighbor.diagonal {
                        continue;
                    }
                    if val == STABLE * enemy || val.abs() == FLUX {
                        next.0[neighbor.idx] = STABLE * sign;
                    }
                }
                Gate::Destabilize => {
                    if val == STABLE * enemy || val.abs() == FLUX {
                        next.0[neighbor.idx] = FLUX * sign;
                    }
                }
                Gate::Lock => unreachable!("lock has no neighbor effects"),
            }
        }

        next
    }

    fn occupied_neighbors(&self, board: &SearchBoard, idx: usize) -> i32 {
        self.neighbors
            .of(idx)
            .iter()
            .flatten()
            .filter(|n| board.0[n.idx] != 0)
            .count() as i32
    }

    /// Sorts candidate cells so the strongest are searched first, which is
    /// what makes the alpha-beta cutoffs bite.
    fn order_moves(&self, board: &SearchBoard, moves: &mut [usize]) {
        moves.sort_by_key(|&id| -(HEATMAP[id] + 2 * self.occupied_neighbors(board, id)));
    }

    /// Standard alpha-beta minimax. Terminal at depth zero or a full
    /// board; always evaluates from the root player's perspective.
    #[must_use]
    pub fn minimax(
        &self,
        board: &SearchBoard,
        depth: u32,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
        root: i8,
        gates: &[Gate],
    ) -> i32 {
        if depth == 0 || board.is_full() {
            return self.evaluate(board, root);
        }

        let mut moves = board.empty_cells();
        self.order_moves(board, &mut moves);
        let current = if maximizing { root } else { -root };

        if maximizing {
            let mut best = i32::MIN;
            'cells: for &id in &moves {
                for &gate in gates {
                    let next = self.apply(board, id, gate, current);
                    let score = self.minimax(&next, depth - 1, alpha, beta, false, root, gates);
                    best = best.max(score);
                    alpha = alpha.max(score);
                    if beta <= alpha {
                        break 'cells;
                    }
                }
            }
            best
        } else {
            let mut best = i32::MAX;
            'cells: for &id in &moves {
                for &gate in gates {
                    let next = self.apply(board, id, gate, current);
                    let score = self.minimax(&next, depth - 1, alpha, beta, true, root, gates);
                    best = best.min(score);
                    beta = beta.min(score);
                    if beta <= alpha {
                        break 'cells;
                    }
                }
            }
            best
        }
    }

    /// Root search over `scan_limit` candidate cells.
    ///
    /// `randomize` replaces the heuristic ordering with a shuffle - the low
    /// tiers' "blindness". Exact-score ties are broken by replacing the
    /// incumbent with probability 0.2, which keeps repeated games varied.
    #[must_use]
    pub fn search_best_move(
        &self,
        board: &SearchBoard,
        sign: i8,
        depth: u32,
        gates: &[Gate],
        scan_limit: usize,
        randomize: bool,
        rng: &mut impl Rng,
    ) -> Option<AiMove> {
        let mut moves = board.empty_cells();
        if moves.is_empty() {
            return None;
        }

        if randomize {
            moves.shuffle(rng);
        } else {
            self.order_moves(board, &mut moves);
        }

        let mut best_score = i32::MIN;
        let mut best: Option<AiMove> = None;

        for &id in moves.iter().take(scan_limit) {
            for &gate in gates {
                let next = self.apply(board, id, gate, sign);
                let score =
                    self.minimax(&next, depth.saturating_sub(1), i32::MIN, i32::MAX, false, sign, gates);

                let replace_tie = best.is_some() && score == best_score && rng.gen::<f64>() > 0.8;
                if score > best_score || replace_tie {
                    best_score = score;
                    best = Some(AiMove { cell_id: id, gate });
                }
            }
        }

        // Degenerate scan limits still owe the caller a move.
        best.or_else(|| {
            moves.first().map(|&cell_id| AiMove {
                cell_id,
                gate: gates[0],
            })
        })
    }

    /// Difficulty-tiered move selection, 1 (scans a single random cell) to
    /// 10 (full-board depth 4-6 search with the opening book).
    ///
    /// Returns `None` only for a full board.
    #[must_use]
    pub fn find_best_move(
        &self,
        board: &SearchBoard,
        player: Player,
        difficulty: u8,
        rng: &mut impl Rng,
    ) -> Option<AiMove> {
        let sign = player.sign();
        let stones = board.stones();
        let empty = TOTAL_CELLS - stones;
        let collide = [Gate::Collide];
        let collide_lock = [Gate::Collide, Gate::Lock];

        match difficulty {
            0 | 1 => self.search_best_move(board, sign, 1, &collide, 1, true, rng),
            2 => self.search_best_move(board, sign, 1, &collide, 3, true, rng),
            3 => self.search_best_move(board, sign, 1, &collide_lock, 6, true, rng),
            4 => self.search_best_move(board, sign, 2, &collide_lock, 12, true, rng),
            5 | 6 => book::opening_move(board, stones, difficulty).or_else(|| {
                self.search_best_move(board, sign, 3, &ALL_GATES, TOTAL_CELLS, false, rng)
            }),
            7 | 8 => book::opening_move(board, stones, difficulty).or_else(|| {
                let depth = if empty < 10 { 5 } else { 4 };
                self.search_best_move(board, sign, depth, &ALL_GATES, TOTAL_CELLS, false, rng)
            }),
            _ => book::opening_move(board, stones, difficulty).or_else(|| {
                let depth = if empty < 8 { 6 } else { 4 };
                self.search_best_move(board, sign, depth, &ALL_GATES, TOTAL_CELLS, false, rng)
            }),
        }
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}
