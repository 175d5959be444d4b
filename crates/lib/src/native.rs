//! Foreign-layout node records.
//!
//! The lens engine works on a flat forest of fixed-shape records. Each record
//! links to its next sibling, its parent and its first child through a
//! [`RawId`], and carries an optional label and value. [`NativeHeap`] is the
//! store those records live in.
//!
//! The [`tree`](crate::tree) layer keeps its own ordered view of these records
//! and writes every link change back here, so whatever the caller builds can be
//! handed to [`Lens::put`](crate::lens::Lens::put) unchanged.
//!
//! Records allocated by the engine must be released through
//! [`NativeHeap::free_tree_node`] exactly once. Records created on behalf of
//! the caller are dropped with [`NativeHeap::reclaim`] instead.

use std::fmt;

use thiserror::Error;

/// Address of a record inside a [`NativeHeap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawId(u32);

impl RawId {
    /// Returns the slot index of this record.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One record in the engine's layout.
///
/// Field order follows the engine's own structure: sibling link, parent link,
/// label, first-child link, value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawNode {
    /// Next sibling in the parent's chain
    pub next: Option<RawId>,
    /// Parent record, `None` for top-level records
    pub parent: Option<RawId>,
    /// Label, `None` when the node is unlabeled
    pub label: Option<String>,
    /// Head of the child chain
    pub children: Option<RawId>,
    /// Scalar value
    pub value: Option<String>,
}

impl RawNode {
    /// Creates a detached record with the given label and value.
    pub fn new(label: Option<&str>, value: Option<&str>) -> Self {
        Self {
            label: label.map(str::to_string),
            value: value.map(str::to_string),
            ..Default::default()
        }
    }
}

/// Errors raised by the record store.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NativeError {
    /// The id does not name a record of this heap
    #[error("Native record {id} does not exist")]
    UnknownRecord { id: RawId },

    /// The record was already released or reclaimed
    #[error("Native record {id} was already released")]
    AlreadyReleased { id: RawId },
}

impl NativeError {
    /// Check if this error is a failed lookup
    pub fn is_not_found(&self) -> bool {
        matches!(self, NativeError::UnknownRecord { .. })
    }
}

impl From<NativeError> for crate::Error {
    fn from(err: NativeError) -> Self {
        crate::Error::Native(err)
    }
}

#[derive(Debug)]
enum Slot {
    Live(RawNode),
    Released,
    Reclaimed,
}

/// Slab of [`RawNode`] records shared between the lens engine and the tree layer.
#[derive(Debug, Default)]
pub struct NativeHeap {
    slots: Vec<Slot>,
    released: usize,
}

impl NativeHeap {
    /// Creates an empty heap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a record and returns its address.
    pub fn alloc(&mut self, record: RawNode) -> RawId {
        let id = RawId(self.slots.len() as u32);
        self.slots.push(Slot::Live(record));
        id
    }

    /// Returns the record at `id` if it is still live.
    pub fn get(&self, id: RawId) -> Option<&RawNode> {
        match self.slots.get(id.index()) {
            Some(Slot::Live(record)) => Some(record),
            _ => None,
        }
    }

    /// Returns the record at `id` mutably if it is still live.
    pub fn get_mut(&mut self, id: RawId) -> Option<&mut RawNode> {
        match self.slots.get_mut(id.index()) {
            Some(Slot::Live(record)) => Some(record),
            _ => None,
        }
    }

    /// Like [`get`](Self::get), but reports why the record is unavailable.
    pub fn record(&self, id: RawId) -> Result<&RawNode, NativeError> {
        match self.slots.get(id.index()) {
            Some(Slot::Live(record)) => Ok(record),
            Some(_) => Err(NativeError::AlreadyReleased { id }),
            None => Err(NativeError::UnknownRecord { id }),
        }
    }

    /// Like [`get_mut`](Self::get_mut), but reports why the record is unavailable.
    pub fn record_mut(&mut self, id: RawId) -> Result<&mut RawNode, NativeError> {
        match self.slots.get_mut(id.index()) {
            Some(Slot::Live(record)) => Ok(record),
            Some(_) => Err(NativeError::AlreadyReleased { id }),
            None => Err(NativeError::UnknownRecord { id }),
        }
    }

    /// Releases one engine-allocated record.
    ///
    /// Only the record itself is released; its children and siblings are untouched.
    pub fn free_tree_node(&mut self, id: RawId) -> Result<(), NativeError> {
        self.retire(id, Slot::Released)?;
        self.released += 1;
        Ok(())
    }

    /// Drops a record that was created on the caller's side.
    pub fn reclaim(&mut self, id: RawId) -> Result<(), NativeError> {
        self.retire(id, Slot::Reclaimed)
    }

    fn retire(&mut self, id: RawId, to: Slot) -> Result<(), NativeError> {
        let slot = self
            .slots
            .get_mut(id.index())
            .ok_or(NativeError::UnknownRecord { id })?;
        if !matches!(slot, Slot::Live(_)) {
            return Err(NativeError::AlreadyReleased { id });
        }
        *slot = to;
        Ok(())
    }

    /// Number of records released through [`free_tree_node`](Self::free_tree_node).
    pub fn release_count(&self) -> usize {
        self.released
    }

    /// Number of records that are neither released nor reclaimed.
    pub fn live_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Live(_)))
            .count()
    }

    /// Returns true if `id` names a live record.
    pub fn is_live(&self, id: RawId) -> bool {
        self.get(id).is_some()
    }

    /// Walks a sibling chain starting at `head` by following `next`.
    ///
    /// The walk stops at the first dead link and never visits more records than
    /// the heap holds, so a cyclic chain terminates.
    pub fn chain(&self, head: Option<RawId>) -> Chain<'_> {
        Chain {
            heap: self,
            cursor: head,
            remaining: self.slots.len(),
        }
    }
}

/// Iterator returned by [`NativeHeap::chain`].
pub struct Chain<'a> {
    heap: &'a NativeHeap,
    cursor: Option<RawId>,
    remaining: usize,
}

impl<'a> Iterator for Chain<'a> {
    type Item = (RawId, &'a RawNode);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.cursor?;
        let record = self.heap.get(id)?;
        self.remaining -= 1;
        self.cursor = record.next;
        Some((id, record))
    }
}
