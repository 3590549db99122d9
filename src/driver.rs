//! Game driver: search, pick a move, advance, until the game ends.

use std::time::Duration;

use tracing::info;

use crate::board::BoardState;
use crate::constants::MAX_GAME_MOVES;
use crate::error::SearchError;
use crate::mcts::{Mcts, Policy};
use crate::moves::{Move, vertex_string};

/// How much search to spend per move.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Budget {
    Time(Duration),
    Iterations(u64),
}

#[derive(Clone, Copy, Debug)]
pub struct PlayConfig {
    pub budget: Budget,
    pub policy: Policy,
    /// Plies after which a game is abandoned unfinished.
    pub max_moves: usize,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            budget: Budget::Time(Duration::from_secs(1)),
            policy: Policy::default(),
            max_moves: MAX_GAME_MOVES,
        }
    }
}

/// Outcome of a driven game.
#[derive(Clone, Debug)]
pub struct GameRecord {
    pub state: BoardState,
    /// Final score, `None` if the game hit the move limit.
    pub winner: Option<f64>,
}

/// Search `state` with `budget` and return the chosen move.
///
/// If the budget ran out before every legal move was tried once, the
/// remaining moves are expanded before choosing.
pub fn genmove(
    mcts: &mut Mcts,
    state: &BoardState,
    budget: Budget,
    policy: Policy,
) -> Result<Move, SearchError> {
    match budget {
        Budget::Time(d) => mcts.run_search(state, d)?,
        Budget::Iterations(n) => mcts.run_iterations(state, n)?,
    };
    let missing = mcts
        .node(state)
        .map_or(0, |node| node.unexpanded_moves().len());
    if missing > 0 && !state.is_finished() {
        mcts.run_iterations(state, missing as u64)?;
    }
    mcts.dump_children(state);
    mcts.best_move(state, policy)
}

/// Play a whole game from `start`, calling `on_move` after every move.
pub fn play_game(
    mcts: &mut Mcts,
    start: BoardState,
    cfg: &PlayConfig,
    mut on_move: impl FnMut(&BoardState, Move),
) -> Result<GameRecord, SearchError> {
    let mut state = start;
    let mut winner = state.winner();
    while winner.is_none() {
        if state.history().len() >= cfg.max_moves {
            info!(moves = state.history().len(), "move limit reached, abandoning game");
            break;
        }
        let mv = genmove(mcts, &state, cfg.budget, cfg.policy)?;
        info!(
            ply = state.history().len() + 1,
            color = %state.color(),
            mv = %vertex_string(mv),
            "move"
        );
        state = state.next_state(mv);
        on_move(&state, mv);
        winner = state.winner();
    }
    Ok(GameRecord { state, winner })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcts::MctsConfig;

    fn seeded() -> Mcts {
        Mcts::new(MctsConfig {
            seed: Some(99),
            ..MctsConfig::default()
        })
    }

    #[test]
    fn test_genmove_tops_up_expansion() {
        let mut mcts = seeded();
        let state = BoardState::new();
        let mv = genmove(&mut mcts, &state, Budget::Iterations(3), Policy::Max).unwrap();
        assert!(state.is_legal(mv));
        assert!(mcts.node(&state).unwrap().is_fully_expanded());
    }

    #[test]
    fn test_play_game_respects_move_limit() {
        let mut mcts = seeded();
        let cfg = PlayConfig {
            budget: Budget::Iterations(1),
            policy: Policy::Robust,
            max_moves: 4,
        };
        let mut seen = Vec::new();
        let record = play_game(&mut mcts, BoardState::new(), &cfg, |_, mv| seen.push(mv)).unwrap();
        assert_eq!(record.state.history(), seen.as_slice());
        assert!(seen.len() <= 4);
        if record.winner.is_none() {
            assert_eq!(seen.len(), 4);
        }
    }

    #[test]
    fn test_play_game_from_finished_state() {
        let mut mcts = seeded();
        let state = BoardState::new()
            .next_state(Move::Pass)
            .next_state(Move::Pass)
            .next_state(Move::Pass);
        let record = play_game(&mut mcts, state, &PlayConfig::default(), |_, _| {
            panic!("no move expected")
        })
        .unwrap();
        assert_eq!(record.winner, Some(-6.5));
    }
}
