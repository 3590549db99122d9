//! Monte Carlo playouts (random game simulation).
//!
//! A playout picks uniformly random legal moves (pass included) until the
//! game is finished, then reports the final score.

use fastrand::Rng;

use crate::board::BoardState;
use crate::moves::Move;

/// Pick a uniformly random legal move.
pub fn random_move(state: &BoardState, rng: &mut Rng) -> Move {
    let moves = state.legal_moves();
    // Pass is always legal, so the list is never empty.
    moves[rng.usize(..moves.len())]
}

/// Play random moves from `state` until the game ends.
///
/// Returns the final score: positive if Black wins, negative if White wins.
pub fn mcplayout(state: &BoardState, rng: &mut Rng) -> f64 {
    let mut state = state.clone();
    loop {
        if let Some(score) = state.winner() {
            return score;
        }
        let mv = random_move(&state, rng);
        state.apply(mv);
    }
}
