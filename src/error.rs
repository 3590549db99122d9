use thiserror::Error;

use crate::moves::Move;

/// Failures surfaced by the search tree and the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The move is not among the node's legal-move slots.
    #[error("unknown move {0}")]
    UnknownMove(Move),
    /// The slot exists but no child node has been created for it yet.
    #[error("child for move {0} is not expanded")]
    NotExpanded(Move),
    /// The slot already owns a child node.
    #[error("child for move {0} is already expanded")]
    AlreadyExpanded(Move),
    /// Not every legal move from the root has been visited yet.
    #[error("insufficient information: root is not fully expanded")]
    InsufficientInformation,
}
