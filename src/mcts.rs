//! Monte Carlo Tree Search (MCTS) with UCB1 selection.
//!
//! Every iteration runs four phases in order:
//! - selection: descend through fully expanded nodes by highest UCB1
//! - expansion: materialize one random unexpanded child
//! - simulation: random playout from that child to the end of the game
//! - backpropagation: update play/win counts up to the root of the tree
//!
//! Nodes are stored in an [`Arena`] and indexed by the history key of their
//! state, so the same engine can be searched repeatedly over a whole game and
//! keeps accumulating statistics. Win counts are stored from the point of view
//! of the side that moved into a node, so a parent picks the child with the
//! best statistics for itself.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use fastrand::Rng;
use tracing::{debug, trace};

use crate::arena::Arena;
use crate::board::{BoardState, Color};
use crate::constants::DEFAULT_EXPLORATION;
use crate::error::SearchError;
use crate::moves::{Move, vertex_string};
use crate::node::{NodeId, SearchNode};
use crate::playout::mcplayout;

#[derive(Clone, Copy, Debug)]
pub struct MctsConfig {
    /// UCB1 exploration constant (the square of the bias term).
    pub exploration: f64,
    /// Seed for the engine's random source; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            exploration: DEFAULT_EXPLORATION,
            seed: None,
        }
    }
}

/// How [`Mcts::best_move`] ranks the root's children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Policy {
    /// Most played child.
    Robust,
    /// Highest win rate.
    #[default]
    Max,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Iterations completed by this call.
    pub iterations: u64,
    /// Nodes in the tree after the call.
    pub nodes: usize,
}

/// Statistics of one root child, for reporting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveStats {
    pub mv: Move,
    pub plays: u32,
    pub wins: u32,
}

impl MoveStats {
    pub fn win_rate(&self) -> f64 {
        if self.plays > 0 {
            self.wins as f64 / self.plays as f64
        } else {
            0.0
        }
    }
}

pub struct Mcts {
    cfg: MctsConfig,
    arena: Arena,
    // State key (move history) -> the one node for that state.
    nodes: HashMap<String, NodeId>,
    rng: Rng,
}

impl Default for Mcts {
    fn default() -> Self {
        Self::new(MctsConfig::default())
    }
}

impl Mcts {
    pub fn new(cfg: MctsConfig) -> Self {
        let rng = match cfg.seed {
            Some(seed) => Rng::with_seed(seed),
            None => Rng::new(),
        };
        Self {
            cfg,
            arena: Arena::new(),
            nodes: HashMap::new(),
            rng,
        }
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Id of the node for `state`, if search has reached it.
    pub fn node_id(&self, state: &BoardState) -> Option<NodeId> {
        self.nodes.get(&state.key()).copied()
    }

    pub fn node(&self, state: &BoardState) -> Option<&SearchNode> {
        self.node_id(state).map(|id| self.arena.get(id))
    }

    /// Create a parentless node for `state` unless one exists.
    fn make_node(&mut self, state: &BoardState) -> NodeId {
        if let Some(id) = self.node_id(state) {
            return id;
        }
        let node = SearchNode::new(None, None, state.clone(), state.legal_moves());
        let id = self.arena.push(node);
        self.nodes.insert(state.key(), id);
        id
    }

    /// Run search iterations from `state` until `duration` has elapsed.
    pub fn run_search(
        &mut self,
        state: &BoardState,
        duration: Duration,
    ) -> Result<SearchStats, SearchError> {
        let root = self.make_node(state);
        let deadline = Instant::now() + duration;
        let mut iterations = 0;
        while Instant::now() < deadline {
            self.iterate(root)?;
            iterations += 1;
        }
        Ok(self.finish(root, iterations))
    }

    /// Run exactly `iterations` search iterations from `state`.
    pub fn run_iterations(
        &mut self,
        state: &BoardState,
        iterations: u64,
    ) -> Result<SearchStats, SearchError> {
        let root = self.make_node(state);
        for _ in 0..iterations {
            self.iterate(root)?;
        }
        Ok(self.finish(root, iterations))
    }

    fn finish(&self, root: NodeId, iterations: u64) -> SearchStats {
        let node = self.arena.get(root);
        debug!(
            iterations,
            nodes = self.arena.len(),
            root_plays = node.plays,
            fully_expanded = node.is_fully_expanded(),
            "search finished"
        );
        SearchStats {
            iterations,
            nodes: self.arena.len(),
        }
    }

    fn iterate(&mut self, root: NodeId) -> Result<(), SearchError> {
        let mut node = self.select(root)?;
        if !self.arena.get(node).state.is_finished() {
            node = self.expand(node)?;
        }
        let winner = self.simulate(node);
        self.backpropagate(node, winner);
        Ok(())
    }

    /// Phase 1: descend by UCB1 until a node that is not fully expanded or is terminal.
    fn select(&self, root: NodeId) -> Result<NodeId, SearchError> {
        let mut id = root;
        loop {
            let node = self.arena.get(id);
            if node.state.is_finished() || !node.is_fully_expanded() {
                return Ok(id);
            }

            let mut best: Option<NodeId> = None;
            let mut best_ucb1 = f64::NEG_INFINITY;
            for mv in node.state.legal_moves() {
                let child = node.child_node(mv)?;
                let ucb1 = self.arena.ucb1(child, self.cfg.exploration);
                if ucb1 > best_ucb1 {
                    best = Some(child);
                    best_ucb1 = ucb1;
                }
            }
            match best {
                Some(child) => {
                    if let Some(mv) = self.arena.get(child).mv {
                        trace!(mv = %vertex_string(mv), ucb1 = best_ucb1, "select");
                    }
                    id = child;
                }
                None => return Ok(id),
            }
        }
    }

    /// Phase 2: expand one random unexpanded move of `id` and register the child.
    fn expand(&mut self, id: NodeId) -> Result<NodeId, SearchError> {
        let node = self.arena.get(id);
        let moves = node.unexpanded_moves();
        if moves.is_empty() {
            return Ok(id);
        }
        let mv = moves[self.rng.usize(..moves.len())];
        let child_state = node.state.next_state(mv);
        let key = child_state.key();

        // A state searched from directly before its parent was expanded
        // already has a parentless node: hang it under this parent.
        if let Some(&existing) = self.nodes.get(&key) {
            self.arena.get_mut(id).attach(mv, existing)?;
            let child = self.arena.get_mut(existing);
            child.parent = Some(id);
            child.mv = Some(mv);
            return Ok(existing);
        }

        let child_moves = child_state.legal_moves();
        let child = self.arena.expand(id, mv, child_state, child_moves)?;
        self.nodes.insert(key, child);
        Ok(child)
    }

    /// Phase 3: random playout from `id`; returns the final score.
    fn simulate(&mut self, id: NodeId) -> f64 {
        mcplayout(&self.arena.get(id).state, &mut self.rng)
    }

    /// Phase 4: credit the playout to every node from `id` up to the tree root.
    ///
    /// A node counts a win when the side that moved into it won the playout.
    fn backpropagate(&mut self, id: NodeId, winner: f64) {
        let winning_color = Color::from_score(winner);
        let mut cur = Some(id);
        while let Some(i) = cur {
            let node = self.arena.get_mut(i);
            node.plays += 1;
            if winning_color == Some(node.state.color().opponent()) {
                node.wins += 1;
            }
            cur = node.parent;
        }
    }

    /// Choose a move for `state` from the statistics gathered so far.
    ///
    /// Fails with [`SearchError::InsufficientInformation`] until every legal
    /// move of `state` has been visited at least once.
    pub fn best_move(&self, state: &BoardState, policy: Policy) -> Result<Move, SearchError> {
        let node = self
            .node(state)
            .ok_or(SearchError::InsufficientInformation)?;
        if !node.is_fully_expanded() {
            return Err(SearchError::InsufficientInformation);
        }

        let mut best: Option<Move> = None;
        let mut best_score = f64::NEG_INFINITY;
        for (mv, id) in node.expanded_children() {
            let child = self.arena.get(id);
            let score = match policy {
                Policy::Robust => child.plays as f64,
                Policy::Max => child.win_rate(),
            };
            if score > best_score {
                best = Some(mv);
                best_score = score;
            }
        }
        best.ok_or(SearchError::InsufficientInformation)
    }

    /// Statistics of every expanded child of `state`'s node, in move order.
    pub fn root_children(&self, state: &BoardState) -> Vec<MoveStats> {
        let Some(node) = self.node(state) else {
            return Vec::new();
        };
        node.expanded_children()
            .map(|(mv, id)| {
                let child = self.arena.get(id);
                MoveStats {
                    mv,
                    plays: child.plays,
                    wins: child.wins,
                }
            })
            .collect()
    }

    /// Log the statistics of `state`'s children.
    pub fn dump_children(&self, state: &BoardState) {
        for s in self.root_children(state) {
            debug!(
                "move {} v={} w={} wr={:.3}",
                vertex_string(s.mv),
                s.plays,
                s.wins,
                s.win_rate()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Mcts {
        Mcts::new(MctsConfig {
            seed: Some(1234),
            ..MctsConfig::default()
        })
    }

    /// Black owns rows 0..8 while White passes; only the bottom row is open.
    fn crowded_state() -> BoardState {
        let mut state = BoardState::new();
        for y in 0..8 {
            for x in 0..9 {
                state = state.next_state(Move::Place(x, y)).next_state(Move::Pass);
            }
        }
        state
    }

    #[test]
    fn test_best_move_before_search() {
        let mcts = seeded();
        assert_eq!(
            mcts.best_move(&BoardState::new(), Policy::Max),
            Err(SearchError::InsufficientInformation)
        );
    }

    #[test]
    fn test_best_move_root_not_fully_expanded() {
        let mut mcts = seeded();
        let state = BoardState::new();
        mcts.run_iterations(&state, 5).unwrap();
        assert_eq!(
            mcts.best_move(&state, Policy::Robust),
            Err(SearchError::InsufficientInformation)
        );
    }

    #[test]
    fn test_each_iteration_adds_one_node() {
        let mut mcts = seeded();
        let state = BoardState::new();
        let stats = mcts.run_iterations(&state, 10).unwrap();
        assert_eq!(stats.iterations, 10);
        assert_eq!(stats.nodes, 11);
        let root = mcts.node(&state).unwrap();
        assert_eq!(root.plays, 10);
        assert_eq!(root.expanded_children().count(), 10);
    }

    #[test]
    fn test_best_move_after_full_expansion() {
        let mut mcts = seeded();
        let state = crowded_state();
        let n_moves = state.legal_moves().len() as u64;
        mcts.run_iterations(&state, n_moves * 4).unwrap();
        assert!(mcts.node(&state).unwrap().is_fully_expanded());
        for policy in [Policy::Robust, Policy::Max] {
            let mv = mcts.best_move(&state, policy).unwrap();
            assert!(state.is_legal(mv));
        }
    }

    #[test]
    fn test_robust_and_max_follow_statistics() {
        let mut mcts = seeded();
        let state = crowded_state();
        let n_moves = state.legal_moves().len() as u64;
        mcts.run_iterations(&state, n_moves * 4).unwrap();

        let children = mcts.root_children(&state);
        let most_played = children.iter().map(|c| c.plays).max().unwrap();
        let best_rate = children.iter().map(|c| c.win_rate()).fold(0.0, f64::max);

        let robust = mcts.best_move(&state, Policy::Robust).unwrap();
        let max = mcts.best_move(&state, Policy::Max).unwrap();
        let first_robust = children.iter().find(|c| c.plays == most_played).unwrap();
        let first_max = children.iter().find(|c| c.win_rate() == best_rate).unwrap();
        assert_eq!(robust, first_robust.mv);
        assert_eq!(max, first_max.mv);
    }

    #[test]
    fn test_wins_never_exceed_plays() {
        let mut mcts = seeded();
        let state = crowded_state();
        mcts.run_iterations(&state, 200).unwrap();
        for i in 0..mcts.arena().len() as NodeId {
            let node = mcts.arena().get(i);
            assert!(node.wins <= node.plays);
        }
    }

    #[test]
    fn test_terminal_root_is_backpropagated() {
        let mut mcts = seeded();
        let state = BoardState::new()
            .next_state(Move::Pass)
            .next_state(Move::Pass)
            .next_state(Move::Pass);
        mcts.run_iterations(&state, 3).unwrap();
        let node = mcts.node(&state).unwrap();
        assert_eq!(node.plays, 3);
        // White wins by komi, but Black made the last pass into this node.
        assert_eq!(node.state.color(), Color::White);
        assert_eq!(node.wins, 0);
        assert_eq!(mcts.arena().len(), 1);
    }

    #[test]
    fn test_winning_mover_is_credited() {
        let mut mcts = seeded();
        // Negative komi: Black wins the empty board and made the third pass.
        let state = BoardState::with_komi(-0.5)
            .next_state(Move::Pass)
            .next_state(Move::Pass)
            .next_state(Move::Pass);
        assert_eq!(state.winner(), Some(0.5));
        mcts.run_iterations(&state, 4).unwrap();
        let node = mcts.node(&state).unwrap();
        assert_eq!(node.plays, 4);
        assert_eq!(node.wins, 4);
    }

    #[test]
    fn test_root_wins_count_for_the_opponent_of_its_children() {
        let mut mcts = seeded();
        // Black to move; passing ends the game as a Black win.
        let state = BoardState::with_komi(-0.5)
            .next_state(Move::Pass)
            .next_state(Move::Pass);
        let n_moves = state.legal_moves().len() as u64;
        mcts.run_iterations(&state, n_moves * 2).unwrap();

        let children = mcts.root_children(&state);
        let pass = children.iter().find(|c| c.mv == Move::Pass).unwrap();
        assert!(pass.plays > 0);
        assert_eq!(pass.wins, pass.plays);

        // Half-point komi rules out draws, so every playout is a win for
        // exactly one of root and child.
        let root = mcts.node(&state).unwrap();
        let child_losses: u32 = children.iter().map(|c| c.plays - c.wins).sum();
        assert_eq!(root.wins, child_losses);
    }

    #[test]
    fn test_select_breaks_ties_by_move_order() {
        let mut mcts = seeded();
        let state = crowded_state();
        let n_moves = state.legal_moves().len() as u64;
        mcts.run_iterations(&state, n_moves).unwrap();
        let root = mcts.node_id(&state).unwrap();
        assert!(mcts.arena.get(root).is_fully_expanded());

        let children: Vec<NodeId> = mcts
            .arena
            .get(root)
            .expanded_children()
            .map(|(_, id)| id)
            .collect();
        for &id in &children {
            let child = mcts.arena.get_mut(id);
            child.plays = 3;
            child.wins = 1;
        }
        mcts.arena.get_mut(root).plays = 3 * children.len() as u32;

        let pass = mcts.arena.get(root).child_node(Move::Pass).unwrap();
        assert_eq!(mcts.select(root), Ok(pass));
    }

    #[test]
    fn test_parentless_node_is_adopted() {
        let mut mcts = seeded();
        let parent = BoardState::new().next_state(Move::Place(0, 0));
        let child = parent.next_state(Move::Pass);
        mcts.run_iterations(&child, 1).unwrap();
        let child_id = mcts.node_id(&child).unwrap();

        // Expand the parent until the pass child is reached.
        let n_moves = parent.legal_moves().len() as u64;
        mcts.run_iterations(&parent, n_moves).unwrap();
        let parent_id = mcts.node_id(&parent).unwrap();
        assert_eq!(mcts.arena().get(parent_id).child_node(Move::Pass), Ok(child_id));
        assert_eq!(mcts.arena().get(child_id).parent, Some(parent_id));
    }
}
