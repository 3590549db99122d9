//! Arena-backed node storage.

use crate::board::BoardState;
use crate::error::SearchError;
use crate::moves::Move;
use crate::node::{NodeId, SearchNode};

#[derive(Default)]
pub struct Arena {
    nodes: Vec<SearchNode>,
}

impl Arena {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn push(&mut self, n: SearchNode) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(n);
        id
    }

    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id as usize]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id as usize]
    }

    /// Create the child of `parent` reached by `mv` and store it in its slot.
    ///
    /// The child starts with one unexpanded slot per move in `child_moves`.
    pub fn expand(
        &mut self,
        parent: NodeId,
        mv: Move,
        child_state: BoardState,
        child_moves: Vec<Move>,
    ) -> Result<NodeId, SearchError> {
        self.get(parent).check_expandable(mv)?;
        let child = self.push(SearchNode::new(Some(parent), Some(mv), child_state, child_moves));
        self.get_mut(parent).attach(mv, child)?;
        Ok(child)
    }

    /// UCB1 of `id` against its parent's play count.
    ///
    /// A root node is scored against its own play count.
    pub fn ucb1(&self, id: NodeId, exploration: f64) -> f64 {
        let node = self.get(id);
        let parent_plays = node.parent.map_or(node.plays, |p| self.get(p).plays);
        node.ucb1(parent_plays, exploration)
    }
}
