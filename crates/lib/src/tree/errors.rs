//! Error types for tree operations.
//!
//! Every structural failure of a [`Forest`](super::Forest), a sibling view or a
//! label group is reported through [`TreeError`]. These are programming errors
//! rather than transient conditions: nothing here is retried, and a failed
//! operation leaves the tree exactly as it was.

use thiserror::Error;

use super::NodeId;

/// Structured error types for tree operations.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// No member of the view carries the label
    #[error("No node labeled '{label}'")]
    LabelNotFound { label: String },

    /// Position outside the view after resolving negative indices
    #[error("Position {index} out of range for {len} nodes")]
    IndexOutOfRange { index: isize, len: usize },

    /// The node is not a current member of the view
    #[error("{node} is not a member of this tree")]
    NotAMember { node: NodeId },

    /// A single-node accessor was used on a group of another size
    #[error("Label '{label}' matches {count} nodes, expected exactly one")]
    Cardinality { label: String, count: usize },

    /// Malformed arguments for the requested operation
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// The node would become its own ancestor
    #[error("Cannot move {node} into its own descendant")]
    MoveIntoDescendant { node: NodeId },

    /// The node must be removed from its current view before it can be inserted
    #[error("{node} is already attached to a tree")]
    AlreadyAttached { node: NodeId },

    /// The id does not belong to this forest
    #[error("{node} does not belong to this forest")]
    UnknownNode { node: NodeId },

    /// The operation needs an owning view and the node has none
    #[error("{node} is detached: {operation} requires an owning tree")]
    Detached {
        node: NodeId,
        operation: &'static str,
    },
}

impl TreeError {
    /// Check if this error is a failed lookup (label, position or membership)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TreeError::LabelNotFound { .. }
                | TreeError::IndexOutOfRange { .. }
                | TreeError::NotAMember { .. }
                | TreeError::UnknownNode { .. }
        )
    }

    /// Check if this error comes from a single-node accessor on a group
    pub fn is_cardinality_error(&self) -> bool {
        matches!(self, TreeError::Cardinality { .. })
    }

    /// Check if this error rejects the arguments of the call
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            TreeError::InvalidArgument { .. }
                | TreeError::MoveIntoDescendant { .. }
                | TreeError::AlreadyAttached { .. }
        )
    }

    /// Check if this error reports an operation on a detached node
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, TreeError::Detached { .. })
    }

    /// Get the label if this is a label-related error
    pub fn label(&self) -> Option<&str> {
        match self {
            TreeError::LabelNotFound { label } | TreeError::Cardinality { label, .. } => {
                Some(label)
            }
            _ => None,
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        TreeError::InvalidArgument {
            reason: reason.into(),
        }
    }
}

// Conversion from TreeError to the main Error type
impl From<TreeError> for crate::Error {
    fn from(err: TreeError) -> Self {
        crate::Error::Tree(err)
    }
}
