//! Async worker facade around the blocking search.
//!
//! The searcher is CPU-bound and not preemptible mid-search; it runs as an
//! isolated unit of work on the blocking pool, bounded by depth and scan
//! limit. The response is withheld until a difficulty-scaled minimum
//! latency has elapsed so the opponent appears to think - cosmetic pacing,
//! not a correctness requirement.

use crate::board::SearchBoard;
use crate::search::{AiMove, Searcher};
use fluxgrid_core::{Gate, Player, TOTAL_CELLS};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// A move request: the byte board, whose move it is, and the tier.
#[derive(Debug, Clone, Copy)]
pub struct AiRequest {
    pub board: [i8; TOTAL_CELLS],
    pub player: Player,
    /// Difficulty tier, 1-10.
    pub difficulty: u8,
}

/// Artificial response pacing: `base + per_level * difficulty` milliseconds
/// minimum latency.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PacingConfig {
    pub base_delay_ms: u64,
    pub per_level_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 400,
            per_level_ms: 100,
        }
    }
}

/// Owns the pacing policy and dispatches search requests.
#[derive(Debug, Clone, Default)]
pub struct AiWorker {
    pacing: PacingConfig,
}

impl AiWorker {
    #[must_use]
    pub fn new(pacing: PacingConfig) -> Self {
        Self { pacing }
    }

    #[must_use]
    pub fn min_delay(&self, difficulty: u8) -> Duration {
        Duration::from_millis(
            self.pacing.base_delay_ms + self.pacing.per_level_ms * u64::from(difficulty),
        )
    }

    /// Computes a move, then delivers it after
    /// `max(0, min_delay(difficulty) - compute_time)`.
    ///
    /// Returns `None` only for a full board. A failed search task is
    /// recovered locally by falling back to the first empty cell; it is
    /// never propagated to the caller.
    pub async fn choose(&self, request: AiRequest) -> Option<AiMove> {
        let started = Instant::now();
        let board = SearchBoard(request.board);

        let result = tokio::task::spawn_blocking(move || {
            let searcher = Searcher::new();
            let mut rng = SmallRng::from_entropy();
            searcher.find_best_move(&board, request.player, request.difficulty, &mut rng)
        })
        .await;

        let chosen = match result {
            Ok(mv) => mv,
            Err(err) => {
                tracing::warn!("search task failed: {err}; falling back to first empty cell");
                board.empty_cells().first().map(|&cell_id| AiMove {
                    cell_id,
                    gate: Gate::Collide,
                })
            }
        };

        if let Some(remaining) = self.min_delay(request.difficulty).checked_sub(started.elapsed())
        {
            tokio::time::sleep(remaining).await;
        }

        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::STABLE;

    #[test]
    fn test_min_delay_scales_with_difficulty() {
        let worker = AiWorker::default();
        assert_eq!(worker.min_delay(1), Duration::from_millis(500));
        assert_eq!(worker.min_delay(10), Duration::from_millis(1400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_choose_returns_a_legal_move() {
        let worker = AiWorker::default();
        let request = AiRequest {
            board: [0; TOTAL_CELLS],
            player: Player::B,
            difficulty: 3,
        };
        let mv = worker.choose(request).await.expect("empty board has moves");
        assert!(mv.cell_id < TOTAL_CELLS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_choose_on_full_board_yields_none() {
        let worker = AiWorker::default();
        let request = AiRequest {
            board: [STABLE; TOTAL_CELLS],
            player: Player::B,
            difficulty: 5,
        };
        assert_eq!(worker.choose(request).await, None);
    }
}
