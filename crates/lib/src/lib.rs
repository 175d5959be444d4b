//!
//! Heracles: ordered, labeled configuration trees.
//! This library provides the in-memory tree that a lens engine parses configuration files into,
//! and that it renders back to text after the caller has edited it.
//!
//! ## Core Concepts
//!
//! * **Native records (`native::NativeHeap`)**: The flat, pointer-linked records the lens engine reads and writes. Every node mirrors its links into one of these records.
//! * **Forests (`tree::Forest`)**: An arena of nodes plus one root sibling chain. Nodes are addressed by `tree::NodeId` and compared by identity.
//! * **Sibling views (`tree::TreeRef`, `tree::TreeMut`)**: The ordered children of one parent (or of the root). A view is classified once, when it is derived, as either a plain labeled tree or a sequential list whose integer labels are renumbered automatically.
//! * **Label groups (`tree::LabelGroup`, `tree::LabelGroupMut`)**: The members of one view sharing a label, with single-value convenience access.
//! * **Lenses (`lens::Lens`)**: The external engine, seen only through `get`/`put` and its include/exclude path filters.
//! * **Handle (`handle::Heracles`)**: Registry of lenses that parses text into forests and renders forests back to text.

pub mod config;
pub mod handle;
pub mod lens;
pub mod native;
pub mod tree;

pub use config::{Config, InsertPolicy, TreeConfig};
pub use handle::Heracles;
pub use lens::{Filter, Lens, LensError};
pub use native::{NativeHeap, RawId, RawNode};
pub use tree::{Forest, Item, NodeId, NodeRecord, Owner, TreeKind, TreeMut, TreeRef};

/// Result type used throughout the Heracles library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Heracles library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed configuration JSON
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// Structured tree errors from the tree module
    #[error(transparent)]
    Tree(tree::TreeError),

    /// Structured native record errors from the native module
    #[error(transparent)]
    Native(native::NativeError),

    /// Lens failures, passed through exactly as the engine reported them
    #[error(transparent)]
    Lens(lens::LensError),

    /// Invalid include/exclude filters
    #[error(transparent)]
    Filter(lens::FilterError),

    /// Structured handle errors from the handle module
    #[error(transparent)]
    Handle(handle::HandleError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::Tree(_) => "tree",
            Error::Native(_) => "native",
            Error::Lens(_) | Error::Filter(_) => "lens",
            Error::Handle(_) => "handle",
        }
    }

    /// Check if this error indicates a lookup found nothing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Tree(tree_err) => tree_err.is_not_found(),
            Error::Native(native_err) => native_err.is_not_found(),
            Error::Handle(handle_err) => handle_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error was produced by the lens engine rather than by this crate.
    pub fn is_foreign(&self) -> bool {
        matches!(self, Error::Lens(_))
    }
}
