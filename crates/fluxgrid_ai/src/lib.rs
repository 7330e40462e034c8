//! # Fluxgrid AI
//!
//! The adversarial search engine: alpha-beta minimax over a compact byte
//! board, with heuristic evaluation, move ordering, difficulty-tiered move
//! generation and a small opening book.
//!
//! ## Search model
//!
//! The searcher never models the rule engine's 50% diagonal collide rolls
//! as chance branches. Look-ahead treats diagonal collide effects as
//! guaranteed failures and skips them - a deliberate risk-averse
//! approximation that keeps every search node deterministic.
//!
//! Search results are local-only and intentionally non-reproducible across
//! peers: each AI instance runs independently, and exact-score ties break
//! randomly. Tests pin the injected [`rand::Rng`] to make runs repeatable.
//!
//! ## Example
//!
//! ```
//! use fluxgrid_ai::{SearchBoard, Searcher};
//! use fluxgrid_core::Player;
//! use rand::{rngs::SmallRng, SeedableRng};
//!
//! let searcher = Searcher::new();
//! let mut rng = SmallRng::seed_from_u64(42);
//! let mv = searcher
//!     .find_best_move(&SearchBoard::empty(), Player::B, 3, &mut rng)
//!     .expect("empty board has moves");
//! assert!(mv.cell_id < 36);
//! ```

/// Compact signed-byte board representation
pub mod board;
/// Opening book for high-difficulty play
pub mod book;
/// Heuristic evaluation: material, position, clustering, threats
pub mod eval;
/// Alpha-beta minimax, move ordering, difficulty tiers
pub mod search;
/// Async worker facade with paced responses
pub mod worker;

pub use board::{SearchBoard, FLUX, LOCKED, STABLE};
pub use search::{AiMove, Searcher};
pub use worker::{AiRequest, AiWorker, PacingConfig};
