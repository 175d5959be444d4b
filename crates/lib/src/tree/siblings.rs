//! Sibling views over one chain of a [`Forest`].
//!
//! A view is identified by its [`Owner`] and is re-derived every time it is
//! requested, so its [`TreeKind`] always reflects the labels present at that
//! moment. Views never hold node state of their own: positions, lengths and
//! label lookups are all computed from the owner's ordered sequence.

use std::fmt;

use tracing::{debug, trace, warn};

use super::group::{LabelGroup, LabelGroupMut};
use super::list::{TreeKind, classify, sequence_number};
use super::node::normalize;
use super::record::NodeRecord;
use super::{Forest, NodeId, Owner, TreeError};
use crate::config::InsertPolicy;

/// Ordered members of one chain.
#[derive(Debug, Default)]
pub(crate) struct Children {
    pub(crate) items: Vec<NodeId>,
}

/// Payload of insert and set operations.
///
/// A value creates a fresh node (or sets the value of an existing one); a node
/// is linked in as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Value(String),
    Node(NodeId),
}

impl From<&str> for Item {
    fn from(value: &str) -> Self {
        Item::Value(value.to_string())
    }
}

impl From<String> for Item {
    fn from(value: String) -> Self {
        Item::Value(value)
    }
}

impl From<NodeId> for Item {
    fn from(node: NodeId) -> Self {
        Item::Node(node)
    }
}

/// Resolves a signed position against `len` members.
///
/// Negative positions count from the end and are offset by `len` exactly once.
pub(crate) fn resolve_position(index: isize, len: usize) -> Result<usize, TreeError> {
    let resolved = if index < 0 {
        index + len as isize
    } else {
        index
    };
    if resolved < 0 || resolved as usize >= len {
        return Err(TreeError::IndexOutOfRange { index, len });
    }
    Ok(resolved as usize)
}

/// Resolves an insert position, where `len` itself means "append".
pub(crate) fn resolve_insert(
    index: isize,
    len: usize,
    policy: InsertPolicy,
) -> Result<usize, TreeError> {
    let resolved = if index < 0 {
        index + len as isize
    } else {
        index
    };
    if (0..=len as isize).contains(&resolved) {
        return Ok(resolved as usize);
    }
    match policy {
        InsertPolicy::Strict => Err(TreeError::IndexOutOfRange { index, len }),
        InsertPolicy::Clamp => {
            let clamped = if resolved < 0 { 0 } else { len };
            warn!(index, len, clamped, "Clamped out-of-range insert position");
            Ok(clamped)
        }
    }
}

/// Read-only sibling view.
#[derive(Clone, Copy)]
pub struct TreeRef<'f> {
    forest: &'f Forest,
    owner: Owner,
    kind: TreeKind,
}

impl<'f> TreeRef<'f> {
    pub(crate) fn new(forest: &'f Forest, owner: Owner, kind: TreeKind) -> Self {
        Self {
            forest,
            owner,
            kind,
        }
    }

    pub fn owner(&self) -> Owner {
        self.owner
    }

    pub fn kind(&self) -> TreeKind {
        self.kind
    }

    pub fn is_list(&self) -> bool {
        self.kind == TreeKind::SequentialList
    }

    pub fn forest(&self) -> &'f Forest {
        self.forest
    }

    fn items(&self) -> &'f [NodeId] {
        self.forest.items(self.owner).unwrap_or(&[])
    }

    /// Logical members in order. On a list only integer-labeled nodes count.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + use<'f> {
        let forest = self.forest;
        let list = self.is_list();
        self.items()
            .iter()
            .copied()
            .filter(move |&id| !list || sequence_number(forest.label_of(id)).is_some())
    }

    /// Every member in physical order, including non-integer members of a list.
    pub fn iter_all(&self) -> impl Iterator<Item = NodeId> + use<'f> {
        self.items().iter().copied()
    }

    /// Number of logical members.
    pub fn len(&self) -> usize {
        match self.kind {
            TreeKind::Plain => self.items().len(),
            TreeKind::SequentialList => self.iter().count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of physical members.
    pub fn physical_len(&self) -> usize {
        self.items().len()
    }

    pub fn first(&self) -> Option<NodeId> {
        self.iter().next()
    }

    pub fn last(&self) -> Option<NodeId> {
        self.iter().last()
    }

    /// Member at a logical position; negative positions count from the end.
    pub fn get_by_position(&self, index: isize) -> crate::Result<NodeId> {
        let at = resolve_position(index, self.len())?;
        self.iter()
            .nth(at)
            .ok_or_else(|| TreeError::IndexOutOfRange { index, len: self.len() }.into())
    }

    /// All physical members carrying `label`.
    pub fn get_by_label(&self, label: &str) -> crate::Result<LabelGroup<'f>> {
        LabelGroup::build(self.forest, self.owner, self.kind, label)
    }

    pub fn has_label(&self, label: &str) -> bool {
        !self.forest.labeled(self.owner, label).is_empty()
    }

    pub fn has_position(&self, index: isize) -> bool {
        resolve_position(index, self.len()).is_ok()
    }

    /// Logical position of `node`, `None` if it is not a logical member.
    pub fn position_of(&self, node: NodeId) -> Option<usize> {
        self.iter().position(|member| member == node)
    }

    /// Returns true if `node` is a physical member of this chain.
    pub fn contains(&self, node: NodeId) -> bool {
        self.items().contains(&node)
    }

    /// Labels of the logical members.
    pub fn labels(&self) -> Vec<Option<&'f str>> {
        let forest = self.forest;
        self.iter().map(|id| forest.label_of(id)).collect()
    }

    /// Values of the logical members.
    pub fn values(&self) -> Vec<Option<&'f str>> {
        let forest = self.forest;
        self.iter().map(|id| forest.value_of(id)).collect()
    }

    /// Plain serialization of every physical member and its subtree.
    pub fn serialize(&self) -> Vec<NodeRecord> {
        self.forest.records(self.items())
    }

    /// Indented outline of the chain, one line per node.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.forest.write_outline(self.items(), 0, &mut out);
        out
    }
}

impl fmt::Display for TreeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.outline())
    }
}

impl fmt::Debug for TreeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeRef")
            .field("owner", &self.owner)
            .field("kind", &self.kind)
            .field("len", &self.len())
            .finish()
    }
}

/// Mutable sibling view.
///
/// All structural changes to a chain go through here. Each operation validates
/// its arguments before touching the chain, so an error leaves both the ordered
/// sequence and the record links unchanged.
pub struct TreeMut<'f> {
    forest: &'f mut Forest,
    owner: Owner,
    kind: TreeKind,
}

impl<'f> TreeMut<'f> {
    pub(crate) fn new(forest: &'f mut Forest, owner: Owner, kind: TreeKind) -> Self {
        Self {
            forest,
            owner,
            kind,
        }
    }

    pub fn view(&self) -> TreeRef<'_> {
        TreeRef::new(&*self.forest, self.owner, self.kind)
    }

    pub fn forest(&self) -> &Forest {
        &*self.forest
    }

    pub fn forest_mut(&mut self) -> &mut Forest {
        &mut *self.forest
    }

    /// Drops list semantics for the rest of this view's life.
    pub fn as_plain(mut self) -> Self {
        self.kind = TreeKind::Plain;
        self
    }

    pub fn owner(&self) -> Owner {
        self.owner
    }

    pub fn kind(&self) -> TreeKind {
        self.kind
    }

    pub fn is_list(&self) -> bool {
        self.kind == TreeKind::SequentialList
    }

    pub fn len(&self) -> usize {
        self.view().len()
    }

    pub fn is_empty(&self) -> bool {
        self.view().is_empty()
    }

    pub fn get_by_position(&self, index: isize) -> crate::Result<NodeId> {
        self.view().get_by_position(index)
    }

    pub fn get_by_label(&self, label: &str) -> crate::Result<LabelGroup<'_>> {
        self.view().get_by_label(label)
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.view().has_label(label)
    }

    pub fn has_position(&self, index: isize) -> bool {
        self.view().has_position(index)
    }

    pub fn serialize(&self) -> Vec<NodeRecord> {
        self.view().serialize()
    }

    /// Inserts before the member at logical position `index`.
    ///
    /// `index == len` appends. A value creates a new unlabeled node. A node
    /// must be detached. On a list the new member takes the label `index + 1`
    /// and later integer labels are shifted up.
    pub fn insert(&mut self, index: isize, item: impl Into<Item>) -> crate::Result<NodeId> {
        let at = resolve_insert(index, self.len(), self.forest.config.insert_policy)?;
        let node = self.forest.prepare(self.owner, item.into())?;
        self.place(at, node)?;
        Ok(node)
    }

    pub fn append(&mut self, item: impl Into<Item>) -> crate::Result<NodeId> {
        let end = self.len() as isize;
        self.insert(end, item)
    }

    /// Creates a node with the given label and value and inserts it.
    ///
    /// On a list the label is replaced by the node's sequence number.
    pub fn insert_new(
        &mut self,
        index: isize,
        label: Option<&str>,
        value: Option<&str>,
    ) -> crate::Result<NodeId> {
        let at = resolve_insert(index, self.len(), self.forest.config.insert_policy)?;
        let node = self.forest.create_node(label, value);
        self.place(at, node)?;
        Ok(node)
    }

    pub fn append_new(&mut self, label: Option<&str>, value: Option<&str>) -> crate::Result<NodeId> {
        let end = self.len() as isize;
        self.insert_new(end, label, value)
    }

    /// Unlinks a member from this chain.
    ///
    /// The node keeps its label, value and children and can be inserted
    /// elsewhere. Its record is not released. Removing an integer member of a
    /// list shifts later integer labels down.
    pub fn remove(&mut self, node: NodeId) -> crate::Result<()> {
        match self.kind {
            TreeKind::Plain => self.forest.unlink(self.owner, node),
            TreeKind::SequentialList => self.forest.unlink_from_sequence(self.owner, node),
        }
    }

    /// Sets the value of the member at `index`, or replaces that member.
    ///
    /// A replacing node is moved out of its current chain first; the previous
    /// occupant is removed and left detached.
    pub fn set_by_position(&mut self, index: isize, item: impl Into<Item>) -> crate::Result<NodeId> {
        match item.into() {
            Item::Value(value) => {
                let node = self.get_by_position(index)?;
                self.forest.set_value(node, Some(&value))?;
                Ok(node)
            }
            Item::Node(node) => self.replace_at(index, node),
        }
    }

    fn replace_at(&mut self, index: isize, node: NodeId) -> crate::Result<NodeId> {
        self.forest.check_movable(self.owner, node)?;
        let len = self.len();
        let occupant = match resolve_position(index, len) {
            Ok(at) => self.view().iter().nth(at),
            Err(err) => match self.forest.config.insert_policy {
                InsertPolicy::Strict => return Err(err.into()),
                InsertPolicy::Clamp if index < 0 => {
                    warn!(index, len, "Clamped out-of-range replace position");
                    self.view().first()
                }
                InsertPolicy::Clamp => {
                    warn!(index, len, "Clamped out-of-range replace position");
                    None
                }
            },
        };

        match occupant {
            Some(occupant) if occupant == node => {}
            Some(occupant) => {
                self.detach(node)?;
                let target = self
                    .view()
                    .position_of(occupant)
                    .ok_or(TreeError::NotAMember { node: occupant })?;
                self.remove(occupant)?;
                self.place(target, node)?;
            }
            None => {
                self.detach(node)?;
                let end = self.len();
                self.place(end, node)?;
            }
        }
        Ok(node)
    }

    /// Sets the value of the only member labeled `label`, or places a node there.
    ///
    /// Missing labels are created by appending. With a node payload, the node
    /// is moved to the end of this chain and relabeled.
    pub fn set_by_label(&mut self, label: &str, item: impl Into<Item>) -> crate::Result<NodeId> {
        let matches = self.forest.labeled(self.owner, label);
        match item.into() {
            Item::Value(value) => match matches.as_slice() {
                [node] => {
                    self.forest.set_value(*node, Some(&value))?;
                    Ok(*node)
                }
                [] => {
                    self.check_appended_label(label, self.len())?;
                    let node = self.forest.create_node(Some(label), Some(&value));
                    self.append_labeled(node)?;
                    Ok(node)
                }
                many => Err(TreeError::Cardinality {
                    label: label.to_string(),
                    count: many.len(),
                }
                .into()),
            },
            Item::Node(node) => {
                self.forest.check_movable(self.owner, node)?;
                let remaining = self.len() - usize::from(self.view().position_of(node).is_some());
                self.check_appended_label(label, remaining)?;
                self.detach(node)?;
                self.forest.set_label(node, Some(label))?;
                self.append_labeled(node)?;
                Ok(node)
            }
        }
    }

    /// Returns the only member labeled `label`, creating it if absent.
    pub fn child_or_insert(&mut self, label: &str) -> crate::Result<NodeId> {
        let matches = self.forest.labeled(self.owner, label);
        match matches.as_slice() {
            [node] => Ok(*node),
            [] => {
                self.check_appended_label(label, self.len())?;
                let node = self.forest.create_node(Some(label), None);
                self.append_labeled(node)?;
                Ok(node)
            }
            many => Err(TreeError::Cardinality {
                label: label.to_string(),
                count: many.len(),
            }
            .into()),
        }
    }

    /// Rebuilds a serialized subtree and appends it to this chain.
    pub fn append_record(&mut self, record: &NodeRecord) -> crate::Result<NodeId> {
        let node = self
            .forest
            .create_node(record.label.as_deref(), record.value.as_deref());
        self.append_labeled(node)?;
        let mut children = self.forest.tree_mut(Owner::Node(node))?.as_plain();
        for child in &record.children {
            children.append_record(child)?;
        }
        Ok(node)
    }

    /// Mutable access to the members labeled `label`.
    pub fn group_mut(&mut self, label: &str) -> crate::Result<LabelGroupMut<'_>> {
        LabelGroupMut::build(&mut *self.forest, self.owner, self.kind, label)
    }

    /// Links `node` at logical position `at`, renumbering on lists.
    fn place(&mut self, at: usize, node: NodeId) -> crate::Result<()> {
        match self.kind {
            TreeKind::Plain => self.forest.link_at(self.owner, at, node),
            TreeKind::SequentialList => self.forest.link_in_sequence(self.owner, at, node),
        }
    }

    /// Links an already-labeled node at the end of the chain.
    ///
    /// On a list an integer label joins the sequence; anything else goes to the
    /// physical end.
    fn append_labeled(&mut self, node: NodeId) -> crate::Result<()> {
        if self.is_list() && sequence_number(self.forest.label_of(node)).is_some() {
            let end = self.len();
            self.forest.link_in_sequence(self.owner, end, node)
        } else {
            let end = self.view().physical_len();
            self.forest.link_at(self.owner, end, node)
        }
    }

    /// A list only accepts new integer labels that continue its sequence.
    fn check_appended_label(&self, label: &str, len: usize) -> crate::Result<()> {
        if !self.is_list() {
            return Ok(());
        }
        match sequence_number(Some(label)) {
            Some(number) if number != len as i64 + 1 => Err(TreeError::invalid(format!(
                "label '{label}' does not continue the sequence 1..{len}"
            ))
            .into()),
            _ => Ok(()),
        }
    }

    /// Unlinks `node` from whichever chain owns it.
    pub(crate) fn detach(&mut self, node: NodeId) -> crate::Result<()> {
        match self.forest.data(node)?.owner {
            None => Ok(()),
            Some(owner) if owner == self.owner => self.remove(node),
            Some(owner) => self.forest.tree_mut(owner)?.remove(node),
        }
    }
}

impl fmt::Debug for TreeMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeMut")
            .field("owner", &self.owner)
            .field("kind", &self.kind)
            .field("len", &self.len())
            .finish()
    }
}

impl Forest {
    /// Derives a view over `owner`'s chain, classifying it from its labels.
    pub fn tree(&self, owner: Owner) -> crate::Result<TreeRef<'_>> {
        let items = self.items(owner)?;
        let kind = self.kind_of(items);
        debug!(?owner, ?kind, len = items.len(), "Derived tree view");
        Ok(TreeRef::new(self, owner, kind))
    }

    pub fn tree_mut(&mut self, owner: Owner) -> crate::Result<TreeMut<'_>> {
        let items = self.items(owner)?;
        let kind = self.kind_of(items);
        debug!(?owner, ?kind, len = items.len(), "Derived mutable tree view");
        Ok(TreeMut::new(self, owner, kind))
    }

    pub fn root(&self) -> TreeRef<'_> {
        self.view_of(Owner::Root)
    }

    pub fn root_mut(&mut self) -> TreeMut<'_> {
        let kind = self.kind_of(&self.root.items);
        TreeMut::new(self, Owner::Root, kind)
    }

    pub fn children(&self, node: NodeId) -> crate::Result<TreeRef<'_>> {
        self.tree(Owner::Node(node))
    }

    pub fn children_mut(&mut self, node: NodeId) -> crate::Result<TreeMut<'_>> {
        self.tree_mut(Owner::Node(node))
    }

    /// View over a chain known to exist; unknown owners read as empty.
    pub(crate) fn view_of(&self, owner: Owner) -> TreeRef<'_> {
        let kind = self.kind_of(self.items(owner).unwrap_or(&[]));
        TreeRef::new(self, owner, kind)
    }

    fn kind_of(&self, items: &[NodeId]) -> TreeKind {
        if !self.config.classify_lists {
            return TreeKind::Plain;
        }
        classify(items.iter().map(|&id| self.label_of(id)))
    }

    /// Physical members of `owner` whose label equals `label`.
    pub(crate) fn labeled(&self, owner: Owner, label: &str) -> Vec<NodeId> {
        let target = normalize(Some(label));
        self.items(owner)
            .unwrap_or(&[])
            .iter()
            .copied()
            .filter(|&id| self.label_of(id) == target.as_deref())
            .collect()
    }

    /// Validates that `node` may be placed under `owner` once detached.
    pub(crate) fn check_movable(&self, owner: Owner, node: NodeId) -> crate::Result<()> {
        self.data(node)?;
        if let Some(parent) = owner.parent() {
            self.data(parent)?;
        }
        if self.is_ancestor_of(node, owner)? {
            return Err(TreeError::MoveIntoDescendant { node }.into());
        }
        Ok(())
    }

    /// Validates that `node` may be linked under `owner` as it is.
    pub(crate) fn check_attachable(&self, owner: Owner, node: NodeId) -> crate::Result<()> {
        self.check_movable(owner, node)?;
        if self.data(node)?.owner.is_some() {
            return Err(TreeError::AlreadyAttached { node }.into());
        }
        Ok(())
    }

    /// Turns an insert payload into a detached node ready to be linked.
    pub(crate) fn prepare(&mut self, owner: Owner, item: Item) -> crate::Result<NodeId> {
        match item {
            Item::Value(value) => Ok(self.create_node(None, Some(&value))),
            Item::Node(node) => {
                self.check_attachable(owner, node)?;
                Ok(node)
            }
        }
    }

    /// Links a detached node so it becomes the `physical`-th member of `owner`.
    ///
    /// Updates the parent link, the node's `next`, then the preceding sibling's
    /// `next` or the owner's head slot.
    pub(crate) fn link_at(&mut self, owner: Owner, physical: usize, node: NodeId) -> crate::Result<()> {
        self.check_attachable(owner, node)?;
        let items = self.items(owner)?;
        if physical > items.len() {
            return Err(TreeError::IndexOutOfRange {
                index: physical as isize,
                len: items.len(),
            }
            .into());
        }
        let following = items.get(physical).copied();
        let preceding = physical.checked_sub(1).and_then(|p| items.get(p).copied());

        self.set_parent(node, owner.parent())?;
        self.set_next(node, following)?;
        match preceding {
            Some(preceding) => self.set_next(preceding, Some(node))?,
            None => self.set_head(owner, Some(node))?,
        }
        self.data_mut(node)?.owner = Some(owner);
        self.items_mut(owner)?.insert(physical, node);
        trace!(node = %node, ?owner, physical, "Linked node");
        Ok(())
    }

    /// Unlinks a member of `owner`, leaving it detached with its subtree intact.
    pub(crate) fn unlink(&mut self, owner: Owner, node: NodeId) -> crate::Result<()> {
        if self.data(node)?.owner != Some(owner) {
            return Err(TreeError::NotAMember { node }.into());
        }
        let physical = self
            .items(owner)?
            .iter()
            .position(|&member| member == node)
            .ok_or(TreeError::NotAMember { node })?;
        let previous = self.previous(node)?;
        let following = self.data(node)?.next;

        match previous {
            Some(previous) => self.set_next(previous, following)?,
            None => self.set_head(owner, following)?,
        }
        self.items_mut(owner)?.remove(physical);
        self.set_next(node, None)?;
        self.set_parent(node, None)?;
        self.data_mut(node)?.owner = None;
        trace!(node = %node, ?owner, physical, "Unlinked node");
        Ok(())
    }
}
