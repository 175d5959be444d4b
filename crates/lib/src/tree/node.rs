use std::fmt;

use tracing::trace;

use super::record::NodeRecord;
use super::siblings::{Children, TreeRef};
use super::{Forest, NodeId, Owner, TreeError};
use crate::native::{NativeError, NativeHeap, RawId, RawNode};

/// How a node's record is released when its forest is torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Created by the caller; the record is reclaimed
    Exclusive,
    /// Allocated by the engine; the record must go back through `free_tree_node`
    Bound,
}

/// Obligation to release one engine record. Consumed by [`Release::release`].
#[derive(Debug)]
pub(crate) struct Release(RawId);

impl Release {
    pub(crate) fn release(self, heap: &mut NativeHeap) -> Result<(), NativeError> {
        heap.free_tree_node(self.0)
    }
}

#[derive(Debug)]
pub(crate) struct NodeData {
    pub(crate) raw: RawId,
    pub(crate) ownership: Ownership,
    pub(crate) release: Option<Release>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
    pub(crate) owner: Option<Owner>,
    pub(crate) children: Children,
}

impl NodeData {
    fn exclusive(raw: RawId) -> Self {
        Self::with(raw, Ownership::Exclusive, None)
    }

    pub(crate) fn bound(raw: RawId) -> Self {
        Self::with(raw, Ownership::Bound, Some(Release(raw)))
    }

    fn with(raw: RawId, ownership: Ownership, release: Option<Release>) -> Self {
        Self {
            raw,
            ownership,
            release,
            parent: None,
            next: None,
            owner: None,
            children: Children::default(),
        }
    }
}

/// Empty labels and values are stored as absent.
pub(crate) fn normalize(text: Option<&str>) -> Option<String> {
    text.filter(|t| !t.is_empty()).map(str::to_string)
}

/// Read-only handle to one node.
#[derive(Clone, Copy)]
pub struct NodeRef<'f> {
    forest: &'f Forest,
    id: NodeId,
    data: &'f NodeData,
    record: &'f RawNode,
}

impl<'f> NodeRef<'f> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn label(&self) -> Option<&'f str> {
        self.record.label.as_deref()
    }

    pub fn value(&self) -> Option<&'f str> {
        self.record.value.as_deref()
    }

    /// Parent node, `None` for top-level and detached nodes.
    pub fn parent(&self) -> Option<NodeId> {
        self.data.parent
    }

    /// Next sibling in physical order.
    pub fn next(&self) -> Option<NodeId> {
        self.data.next
    }

    /// The chain this node is a member of, `None` while detached.
    pub fn owner(&self) -> Option<Owner> {
        self.data.owner
    }

    pub fn is_attached(&self) -> bool {
        self.data.owner.is_some()
    }

    pub fn ownership(&self) -> Ownership {
        self.data.ownership
    }

    /// Address of the backing record.
    pub fn raw(&self) -> RawId {
        self.data.raw
    }

    /// The backing record itself.
    pub fn record(&self) -> &'f RawNode {
        self.record
    }

    /// Freshly classified view of this node's children.
    pub fn children(&self) -> TreeRef<'f> {
        self.forest.view_of(Owner::Node(self.id))
    }

    /// Plain serialization of this node and its subtree.
    pub fn serialize(&self) -> NodeRecord {
        self.forest.record_tree(self.id)
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("label", &self.label())
            .field("value", &self.value())
            .field("owner", &self.owner())
            .finish()
    }
}

impl Forest {
    /// Creates a detached node owned by this forest.
    ///
    /// Empty labels and values are stored as absent.
    pub fn create_node(&mut self, label: Option<&str>, value: Option<&str>) -> NodeId {
        let raw = self.heap.alloc(RawNode {
            label: normalize(label),
            value: normalize(value),
            ..Default::default()
        });
        let id = self.push(NodeData::exclusive(raw));
        trace!(node = %id, ?label, ?value, "Created node");
        id
    }

    pub fn node(&self, id: NodeId) -> crate::Result<NodeRef<'_>> {
        let data = self.data(id)?;
        let record = self.heap.record(data.raw)?;
        Ok(NodeRef {
            forest: self,
            id,
            data,
            record,
        })
    }

    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.node(id).ok()
    }

    /// Returns true if `id` was issued by this forest.
    pub fn contains(&self, id: NodeId) -> bool {
        self.data(id).is_ok()
    }

    pub fn label(&self, id: NodeId) -> crate::Result<Option<&str>> {
        Ok(self.record(id)?.label.as_deref())
    }

    pub fn value(&self, id: NodeId) -> crate::Result<Option<&str>> {
        Ok(self.record(id)?.value.as_deref())
    }

    /// Relabels a node without touching the order of its chain.
    ///
    /// On a sequential list this can break the 1..N run; the next derived
    /// view is classified from whatever labels are present.
    pub fn set_label(&mut self, id: NodeId, label: Option<&str>) -> crate::Result<()> {
        self.record_mut(id)?.label = normalize(label);
        trace!(node = %id, ?label, "Set label");
        Ok(())
    }

    pub fn set_value(&mut self, id: NodeId, value: Option<&str>) -> crate::Result<()> {
        self.record_mut(id)?.value = normalize(value);
        trace!(node = %id, ?value, "Set value");
        Ok(())
    }

    /// The sibling whose `next` is this node, found by scanning the owning chain.
    pub fn previous(&self, id: NodeId) -> crate::Result<Option<NodeId>> {
        let owner = self.data(id)?.owner.ok_or(TreeError::Detached {
            node: id,
            operation: "previous",
        })?;
        let items = self.items(owner)?;
        let mut previous = None;
        let mut cursor = items.first().copied();
        while let Some(current) = cursor {
            if current == id {
                return Ok(previous);
            }
            previous = Some(current);
            cursor = self.data(current)?.next;
        }
        Err(TreeError::NotAMember { node: id }.into())
    }

    /// Physical position of the node within its owning chain.
    pub fn index(&self, id: NodeId) -> crate::Result<Option<usize>> {
        let Some(owner) = self.data(id)?.owner else {
            return Ok(None);
        };
        Ok(self.items(owner)?.iter().position(|&member| member == id))
    }

    /// Plain serialization of a node and its subtree.
    pub fn serialize_node(&self, id: NodeId) -> crate::Result<NodeRecord> {
        self.data(id)?;
        Ok(self.record_tree(id))
    }

    /// True if `candidate` is the parent node of `owner` or one of its ancestors.
    pub(crate) fn is_ancestor_of(&self, candidate: NodeId, owner: Owner) -> crate::Result<bool> {
        let mut cursor = owner.parent();
        while let Some(current) = cursor {
            if current == candidate {
                return Ok(true);
            }
            cursor = self.data(current)?.parent;
        }
        Ok(false)
    }
}
