//! Ordered, labeled node trees.
//!
//! A [`Forest`] is an arena of nodes plus one root sibling chain. Every node has
//! an optional label, an optional value and an ordered list of children, and is
//! addressed by a [`NodeId`]. Two ids are equal only if they name the same node;
//! there is no structural equality between nodes.
//!
//! Each node is backed by a [`RawNode`] record in the forest's
//! [`NativeHeap`]. The forest keeps two representations of every sibling chain
//! in lockstep: the ordered sequence of ids held for each parent, and the
//! `next`/`parent`/first-child links of the records. Every completed mutation
//! leaves them in agreement, so the heap can be handed to a lens at any time.
//!
//! # Views
//!
//! The children of a node (or the root chain) are accessed through a sibling
//! view, [`TreeRef`] for reads and [`TreeMut`] for structural changes. A view
//! is classified once, when it is derived, as [`TreeKind::Plain`] or
//! [`TreeKind::SequentialList`] (see [`classify`]). List views renumber their
//! integer labels on insert and remove.
//!
//! ```
//! use heracles::{Forest, TreeKind};
//!
//! let mut forest = Forest::new();
//! let mut root = forest.root_mut();
//! root.append_new(Some("1"), Some("a"))?;
//! root.append_new(Some("2"), Some("b"))?;
//! root.append_new(Some("3"), Some("c"))?;
//!
//! let mut list = forest.root_mut();
//! assert_eq!(list.kind(), TreeKind::SequentialList);
//! list.insert(1, "x")?;
//!
//! let root = forest.root();
//! assert_eq!(root.labels(), vec![Some("1"), Some("2"), Some("3"), Some("4")]);
//! assert_eq!(root.values(), vec![Some("a"), Some("x"), Some("b"), Some("c")]);
//! # Ok::<(), heracles::Error>(())
//! ```
//!
//! # Ownership of records
//!
//! Nodes created with [`Forest::create_node`] are exclusively owned by the
//! forest. Nodes materialized by [`Forest::from_native`] are bound to records
//! the lens engine allocated; each of those is released through
//! [`NativeHeap::free_tree_node`] exactly once, when the forest is torn down.
//! Removing a node from a view never releases anything.
//!
//! A forest is single-writer: all mutation goes through `&mut Forest`, and no
//! internal locking exists.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use tracing::{debug, warn};

use crate::config::TreeConfig;
use crate::native::{NativeHeap, RawId, RawNode};

mod errors;
mod group;
mod list;
mod node;
mod path;
mod record;
mod siblings;

pub use errors::TreeError;
pub use group::{LabelGroup, LabelGroupMut};
pub use list::{TreeKind, classify, sequence_number};
pub use node::{NodeRef, Ownership};
pub use record::NodeRecord;
pub use siblings::{Item, TreeMut, TreeRef};

use node::NodeData;
use siblings::Children;

static NEXT_FOREST: AtomicU32 = AtomicU32::new(1);

/// Identity of a node inside one [`Forest`].
///
/// Ids carry the identity of the forest that issued them, so an id handed to
/// another forest is rejected instead of aliasing one of its nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    forest: u32,
    index: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {}.{}", self.forest, self.index)
    }
}

/// Who owns a sibling chain: the root slot of the forest, or a parent node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    /// The forest's top-level chain
    Root,
    /// The children of a node
    Node(NodeId),
}

impl Owner {
    /// The parent node of members of this chain, `None` for the root chain.
    pub fn parent(self) -> Option<NodeId> {
        match self {
            Owner::Root => None,
            Owner::Node(node) => Some(node),
        }
    }
}

/// Arena of nodes with one root sibling chain.
///
/// Nodes are never freed individually. A removed or never-attached node keeps
/// its slot and its record until the forest is torn down, since its id may
/// still be held and reinserted, so a forest that keeps creating and removing
/// nodes grows for as long as it lives. Long-running callers rebuild the
/// forest (for example by parsing again) to reclaim that space.
#[derive(Debug)]
pub struct Forest {
    id: u32,
    config: TreeConfig,
    heap: NativeHeap,
    nodes: Vec<NodeData>,
    root: Children,
    root_head: Option<RawId>,
    torn_down: bool,
}

impl Forest {
    /// Creates an empty, detached forest with the default configuration.
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    /// Creates an empty forest with the given configuration.
    pub fn with_config(config: TreeConfig) -> Self {
        Self::on_heap(NativeHeap::new(), config)
    }

    fn on_heap(heap: NativeHeap, config: TreeConfig) -> Self {
        Self {
            id: NEXT_FOREST.fetch_add(1, Ordering::Relaxed),
            config,
            heap,
            nodes: Vec::new(),
            root: Children::default(),
            root_head: None,
            torn_down: false,
        }
    }

    /// Builds a forest over records produced by the lens engine.
    ///
    /// The chain starting at `head` is walked once, recursively, and every
    /// record becomes a bound node. The `next` links are rewritten from the
    /// order of the walk, so stale links left behind in the records cannot
    /// survive into the forest. A record reachable twice is rejected, since it
    /// would otherwise be released twice.
    pub fn from_native(
        heap: NativeHeap,
        head: Option<RawId>,
        config: TreeConfig,
    ) -> crate::Result<Self> {
        let mut forest = Self::on_heap(heap, config);
        let mut seen = HashSet::new();
        let items = forest.materialize(head, None, &mut seen)?;
        forest.root_head = match items.first() {
            Some(&first) => Some(forest.data(first)?.raw),
            None => None,
        };
        forest.root.items = items;
        debug!(
            forest = forest.id,
            nodes = forest.nodes.len(),
            "Materialized forest from native records"
        );
        Ok(forest)
    }

    fn materialize(
        &mut self,
        head: Option<RawId>,
        parent: Option<NodeId>,
        seen: &mut HashSet<RawId>,
    ) -> crate::Result<Vec<NodeId>> {
        // A chain that loops back on itself ends where it first repeats.
        let mut in_chain = HashSet::new();
        let raws: Vec<RawId> = self
            .heap
            .chain(head)
            .map(|(raw, _)| raw)
            .take_while(|&raw| in_chain.insert(raw))
            .collect();
        let owner = parent.map_or(Owner::Root, Owner::Node);
        let mut items: Vec<NodeId> = Vec::with_capacity(raws.len());

        for raw in raws {
            if !seen.insert(raw) {
                return Err(TreeError::invalid(format!(
                    "native record {raw} is linked into the tree more than once"
                ))
                .into());
            }
            let id = self.push(NodeData::bound(raw));
            self.set_parent(id, parent)?;
            if let Some(&previous) = items.last() {
                self.set_next(previous, Some(id))?;
            }
            self.data_mut(id)?.owner = Some(owner);
            items.push(id);

            let child_head = self.heap.record(raw)?.children;
            let children = self.materialize(child_head, Some(id), seen)?;
            self.data_mut(id)?.children.items = children;
        }
        if let Some(&last) = items.last() {
            self.set_next(last, None)?;
        }
        Ok(items)
    }

    /// The configuration views of this forest follow.
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// The record store backing this forest.
    pub fn native(&self) -> &NativeHeap {
        &self.heap
    }

    /// The external root slot: the record heading the top-level chain.
    pub fn root_head(&self) -> Option<RawId> {
        self.root_head
    }

    /// Number of nodes ever created in this forest, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if no node has been created yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Tears the forest down and hands back its record store.
    ///
    /// Bound nodes release their records through
    /// [`NativeHeap::free_tree_node`]; exclusively owned records are reclaimed.
    pub fn into_native(mut self) -> NativeHeap {
        self.teardown();
        std::mem::take(&mut self.heap)
    }

    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        let mut released = 0usize;
        for node in &mut self.nodes {
            let result = match node.release.take() {
                Some(token) => token.release(&mut self.heap).map(|()| released += 1),
                None => match node.ownership {
                    Ownership::Exclusive => self.heap.reclaim(node.raw),
                    Ownership::Bound => Ok(()),
                },
            };
            if let Err(err) = result {
                warn!(raw = %node.raw, error = %err, "Failed to release native record");
            }
        }
        debug!(forest = self.id, released, "Tore down forest");
    }

    // Arena access

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId {
            forest: self.id,
            index: self.nodes.len() as u32,
        };
        self.nodes.push(data);
        id
    }

    pub(crate) fn data(&self, id: NodeId) -> Result<&NodeData, TreeError> {
        if id.forest != self.id {
            return Err(TreeError::UnknownNode { node: id });
        }
        self.nodes
            .get(id.index as usize)
            .ok_or(TreeError::UnknownNode { node: id })
    }

    pub(crate) fn data_mut(&mut self, id: NodeId) -> Result<&mut NodeData, TreeError> {
        if id.forest != self.id {
            return Err(TreeError::UnknownNode { node: id });
        }
        self.nodes
            .get_mut(id.index as usize)
            .ok_or(TreeError::UnknownNode { node: id })
    }

    pub(crate) fn record(&self, id: NodeId) -> crate::Result<&RawNode> {
        let raw = self.data(id)?.raw;
        Ok(self.heap.record(raw)?)
    }

    pub(crate) fn record_mut(&mut self, id: NodeId) -> crate::Result<&mut RawNode> {
        let raw = self.data(id)?.raw;
        Ok(self.heap.record_mut(raw)?)
    }

    /// Label lookup that treats unknown ids as unlabeled.
    pub(crate) fn label_of(&self, id: NodeId) -> Option<&str> {
        let raw = self.data(id).ok()?.raw;
        self.heap.get(raw)?.label.as_deref()
    }

    pub(crate) fn value_of(&self, id: NodeId) -> Option<&str> {
        let raw = self.data(id).ok()?.raw;
        self.heap.get(raw)?.value.as_deref()
    }

    pub(crate) fn items(&self, owner: Owner) -> Result<&[NodeId], TreeError> {
        match owner {
            Owner::Root => Ok(&self.root.items),
            Owner::Node(parent) => Ok(&self.data(parent)?.children.items),
        }
    }

    pub(crate) fn items_mut(&mut self, owner: Owner) -> Result<&mut Vec<NodeId>, TreeError> {
        match owner {
            Owner::Root => Ok(&mut self.root.items),
            Owner::Node(parent) => Ok(&mut self.data_mut(parent)?.children.items),
        }
    }

    // Link mirroring

    /// Sets the parent link of `id` and of its record.
    pub(crate) fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> crate::Result<()> {
        let parent_raw = parent.map(|p| self.data(p).map(|d| d.raw)).transpose()?;
        self.data_mut(id)?.parent = parent;
        self.record_mut(id)?.parent = parent_raw;
        Ok(())
    }

    /// Sets the next-sibling link of `id` and of its record.
    pub(crate) fn set_next(&mut self, id: NodeId, next: Option<NodeId>) -> crate::Result<()> {
        let next_raw = next.map(|n| self.data(n).map(|d| d.raw)).transpose()?;
        self.data_mut(id)?.next = next;
        self.record_mut(id)?.next = next_raw;
        Ok(())
    }

    /// The record slot holding the head of `owner`'s chain.
    pub fn head_slot(&self, owner: Owner) -> crate::Result<Option<RawId>> {
        match owner {
            Owner::Root => Ok(self.root_head),
            Owner::Node(parent) => Ok(self.record(parent)?.children),
        }
    }

    pub(crate) fn set_head(&mut self, owner: Owner, first: Option<NodeId>) -> crate::Result<()> {
        let raw = first.map(|n| self.data(n).map(|d| d.raw)).transpose()?;
        match owner {
            Owner::Root => self.root_head = raw,
            Owner::Node(parent) => self.record_mut(parent)?.children = raw,
        }
        Ok(())
    }
}

impl Default for Forest {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Forest {
    fn drop(&mut self) {
        self.teardown();
    }
}
