//! The lens engine interface.
//!
//! A lens is a bidirectional transform between the text of a configuration
//! file and a chain of [`RawNode`](crate::native::RawNode) records. This crate
//! never parses or renders text itself: [`Lens::get`] builds records into a
//! [`NativeHeap`], [`Lens::put`] reads them back, and any failure is reported
//! as a [`LensError`] that callers see unmodified.

use thiserror::Error;

use crate::native::{NativeHeap, RawId};

mod filter;

pub use filter::{Filter, FilterError, check_path};

/// Failure reported by a lens.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Lens error at {path}: {message}")]
pub struct LensError {
    /// Offset into the input text, when the lens knows it
    pub position: Option<usize>,
    /// Tree path or file location the lens was working on
    pub path: String,
    pub message: String,
}

impl LensError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            position: None,
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }
}

impl From<LensError> for crate::Error {
    fn from(err: LensError) -> Self {
        crate::Error::Lens(err)
    }
}

/// A bidirectional text transform.
///
/// Implementations must allocate every record of the tree they return through
/// the heap passed to [`get`](Lens::get); the forest built over them releases
/// each one with [`NativeHeap::free_tree_node`].
pub trait Lens: Send + Sync {
    /// Name the lens is registered under.
    fn name(&self) -> &str;

    /// Paths this lens applies to. Empty means it applies to none.
    fn filters(&self) -> &[Filter] {
        &[]
    }

    /// Parses `text` into records stored in `heap`, returning the head of the
    /// top-level chain.
    fn get(&self, heap: &mut NativeHeap, text: &str) -> Result<Option<RawId>, LensError>;

    /// Renders the chain starting at `head` back to text, using `text` as the
    /// original to preserve formatting from.
    fn put(&self, heap: &NativeHeap, head: Option<RawId>, text: &str) -> Result<String, LensError>;

    /// Returns true if this lens' filters accept `path`.
    fn applies_to(&self, path: &str) -> bool {
        check_path(self.filters(), path)
    }
}

impl std::fmt::Debug for dyn Lens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lens")
            .field("name", &self.name())
            .field("filters", &self.filters())
            .finish()
    }
}
