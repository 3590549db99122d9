//! ucb-go: a 9x9 stone-capture game engine driven by Monte Carlo Tree Search.
//!
//! The engine builds a tree of game states, picks children by UCB1, and
//! scores leaves with uniformly random playouts.
//!
//! ## Modules
//!
//! - [`constants`] - Board dimensions, komi and search parameters
//! - [`moves`] - Moves and coordinate conversion
//! - [`board`] - Immutable board states and the game rules
//! - [`node`] / [`arena`] - Search tree nodes and their storage
//! - [`playout`] - Random game simulation
//! - [`mcts`] - The search engine
//! - [`driver`] - Self-play loop
//! - [`gtp`] - Go Text Protocol front end
//!
//! ## Example
//!
//! ```
//! use ucb_go::board::BoardState;
//! use ucb_go::mcts::{Mcts, MctsConfig, Policy};
//!
//! let state = BoardState::new();
//! let mut mcts = Mcts::new(MctsConfig { seed: Some(7), ..Default::default() });
//!
//! // Every legal move has to be tried once before a move can be chosen.
//! let n = state.legal_moves().len() as u64;
//! mcts.run_iterations(&state, n).unwrap();
//!
//! let best = mcts.best_move(&state, Policy::Max).unwrap();
//! let state = state.next_state(best);
//! assert_eq!(state.history().len(), 1);
//! ```

pub mod arena;
pub mod board;
pub mod constants;
pub mod driver;
pub mod error;
pub mod gtp;
pub mod mcts;
pub mod moves;
pub mod node;
pub mod playout;

pub use board::{BoardState, Color};
pub use error::SearchError;
pub use mcts::{Mcts, MctsConfig, Policy};
pub use moves::Move;
