//! Constants for board geometry, scoring and search parameters.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN). The rules and the search are written for 9x9.
pub const N: usize = 9;

/// Number of cells on the board.
pub const BOARD_CELLS: usize = N * N;

// =============================================================================
// Scoring
// =============================================================================

/// Komi (compensation points added to White's score).
pub const KOMI: f64 = 6.5;

/// Number of consecutive passes that ends the game.
pub const FINISH_PASSES: usize = 3;

// =============================================================================
// MCTS Parameters
// =============================================================================

/// Default UCB1 exploration constant (the square of the bias term).
pub const DEFAULT_EXPLORATION: f64 = 2.0;

/// Default wall-clock budget per search, in seconds.
pub const DEFAULT_SEARCH_SECS: f64 = 1.0;

/// Upper bound on plies in a driven game before it is abandoned.
pub const MAX_GAME_MOVES: usize = BOARD_CELLS * 4;

// =============================================================================
// Stone Markers
// =============================================================================

/// Black stone marker.
pub const BLACK: i8 = 1;

/// White stone marker.
pub const WHITE: i8 = -1;

/// Empty cell.
pub const EMPTY: i8 = 0;
