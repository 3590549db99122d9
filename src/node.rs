//! Search tree nodes.
//!
//! Nodes live in an [`Arena`](crate::arena::Arena) and refer to each other by
//! [`NodeId`]: the parent link is a plain index and each child slot holds the
//! index of the node it owns once expanded.

use crate::board::BoardState;
use crate::error::SearchError;
use crate::moves::Move;

pub type NodeId = u32;

/// A legal move from a node and, once expanded, the child it leads to.
#[derive(Clone, Debug)]
pub struct Slot {
    pub mv: Move,
    pub child: Option<NodeId>,
}

/// A node in the MCTS search tree.
#[derive(Clone, Debug)]
pub struct SearchNode {
    /// The game state at this node
    pub state: BoardState,
    /// The move that led here from the parent (none at the root)
    pub mv: Option<Move>,
    pub parent: Option<NodeId>,
    /// Number of playouts through this node
    pub plays: u32,
    /// Playouts won by the side that moved into this node
    pub wins: u32,
    slots: Vec<Slot>,
}

impl SearchNode {
    /// Create a node with one unexpanded slot per move in `legal_moves`.
    pub fn new(
        parent: Option<NodeId>,
        mv: Option<Move>,
        state: BoardState,
        legal_moves: Vec<Move>,
    ) -> Self {
        Self {
            state,
            mv,
            parent,
            plays: 0,
            wins: 0,
            slots: legal_moves
                .into_iter()
                .map(|mv| Slot { mv, child: None })
                .collect(),
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn is_fully_expanded(&self) -> bool {
        self.slots.iter().all(|s| s.child.is_some())
    }

    /// Moves whose slot has no child yet, in slot order.
    pub fn unexpanded_moves(&self) -> Vec<Move> {
        self.slots
            .iter()
            .filter(|s| s.child.is_none())
            .map(|s| s.mv)
            .collect()
    }

    /// Children that exist, in slot order.
    pub fn expanded_children(&self) -> impl Iterator<Item = (Move, NodeId)> + '_ {
        self.slots
            .iter()
            .filter_map(|s| s.child.map(|id| (s.mv, id)))
    }

    fn slot_mut(&mut self, mv: Move) -> Result<&mut Slot, SearchError> {
        self.slots
            .iter_mut()
            .find(|s| s.mv == mv)
            .ok_or(SearchError::UnknownMove(mv))
    }

    /// The child reached by `mv`.
    pub fn child_node(&self, mv: Move) -> Result<NodeId, SearchError> {
        let slot = self
            .slots
            .iter()
            .find(|s| s.mv == mv)
            .ok_or(SearchError::UnknownMove(mv))?;
        slot.child.ok_or(SearchError::NotExpanded(mv))
    }

    /// Attach `child` to the empty slot for `mv`.
    pub(crate) fn attach(&mut self, mv: Move, child: NodeId) -> Result<(), SearchError> {
        let slot = self.slot_mut(mv)?;
        if slot.child.is_some() {
            return Err(SearchError::AlreadyExpanded(mv));
        }
        slot.child = Some(child);
        Ok(())
    }

    /// Check that `mv` has an empty slot, without attaching anything.
    pub(crate) fn check_expandable(&self, mv: Move) -> Result<(), SearchError> {
        match self.child_node(mv) {
            Ok(_) => Err(SearchError::AlreadyExpanded(mv)),
            Err(SearchError::NotExpanded(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    #[inline]
    pub fn win_rate(&self) -> f64 {
        self.wins as f64 / self.plays as f64
    }

    /// UCB1 value given the parent's play count.
    ///
    /// Undefined for a node with zero plays.
    #[inline]
    pub fn ucb1(&self, parent_plays: u32, exploration: f64) -> f64 {
        self.win_rate() + (exploration * (parent_plays as f64).ln() / self.plays as f64).sqrt()
    }
}
