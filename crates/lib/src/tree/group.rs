//! Members of one chain that share a label.
//!
//! A group is always computed from its chain, never stored: after any change
//! reads see the current members, in physical order. Positions inside a group
//! are local to it; inserting at a local position links the new node next to
//! the group member at that position.

use super::list::{TreeKind, sequence_number};
use super::node::normalize;
use super::siblings::{Item, TreeMut, resolve_insert, resolve_position};
use super::{Forest, NodeId, Owner, TreeError};

/// Read-only access to the members labeled alike.
#[derive(Clone, Debug)]
pub struct LabelGroup<'f> {
    forest: &'f Forest,
    owner: Owner,
    kind: TreeKind,
    label: Option<String>,
}

impl<'f> LabelGroup<'f> {
    pub(crate) fn build(
        forest: &'f Forest,
        owner: Owner,
        kind: TreeKind,
        label: &str,
    ) -> crate::Result<Self> {
        let group = Self {
            forest,
            owner,
            kind,
            label: normalize(Some(label)),
        };
        if group.is_empty() {
            return Err(TreeError::LabelNotFound {
                label: label.to_string(),
            }
            .into());
        }
        Ok(group)
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or_default()
    }

    pub fn owner(&self) -> Owner {
        self.owner
    }

    pub fn kind(&self) -> TreeKind {
        self.kind
    }

    pub fn members(&self) -> Vec<NodeId> {
        self.forest.labeled(self.owner, self.label())
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + use<'f> {
        self.members().into_iter()
    }

    pub fn len(&self) -> usize {
        self.members().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: isize) -> crate::Result<NodeId> {
        let members = self.members();
        let at = resolve_position(index, members.len())?;
        Ok(members[at])
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.members().contains(&node)
    }

    /// The only member of the group.
    pub fn single(&self) -> crate::Result<NodeId> {
        match self.members().as_slice() {
            [node] => Ok(*node),
            members => Err(TreeError::Cardinality {
                label: self.label().to_string(),
                count: members.len(),
            }
            .into()),
        }
    }

    /// Value of the only member of the group.
    pub fn value(&self) -> crate::Result<Option<&'f str>> {
        let node = self.single()?;
        Ok(self.forest.value_of(node))
    }

    pub fn values(&self) -> Vec<Option<&'f str>> {
        let forest = self.forest;
        self.members()
            .into_iter()
            .map(|id| forest.value_of(id))
            .collect()
    }
}

/// Mutable access to the members labeled alike.
///
/// On a sequential list, groups of integer labels cannot be restructured:
/// their positions are owned by the list's numbering.
#[derive(Debug)]
pub struct LabelGroupMut<'f> {
    forest: &'f mut Forest,
    owner: Owner,
    kind: TreeKind,
    label: Option<String>,
}

impl<'f> LabelGroupMut<'f> {
    pub(crate) fn build(
        forest: &'f mut Forest,
        owner: Owner,
        kind: TreeKind,
        label: &str,
    ) -> crate::Result<Self> {
        LabelGroup::build(&*forest, owner, kind, label)?;
        Ok(Self {
            forest,
            owner,
            kind,
            label: normalize(Some(label)),
        })
    }

    pub fn view(&self) -> LabelGroup<'_> {
        LabelGroup {
            forest: &*self.forest,
            owner: self.owner,
            kind: self.kind,
            label: self.label.clone(),
        }
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.view().len()
    }

    pub fn is_empty(&self) -> bool {
        self.view().is_empty()
    }

    pub fn get(&self, index: isize) -> crate::Result<NodeId> {
        self.view().get(index)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.view().contains(node)
    }

    pub fn single(&self) -> crate::Result<NodeId> {
        self.view().single()
    }

    pub fn value(&self) -> crate::Result<Option<&str>> {
        let node = self.single()?;
        Ok(self.forest.value_of(node))
    }

    /// Sets the value of the only member of the group.
    pub fn set_value(&mut self, value: Option<&str>) -> crate::Result<()> {
        let node = self.single()?;
        self.forest.set_value(node, value)
    }

    /// Inserts a member at a position local to the group.
    ///
    /// The node is relabeled to the group's label and linked directly before
    /// the member at that position, or directly after the last member when
    /// `index` equals the group's length.
    pub fn insert(&mut self, index: isize, item: impl Into<Item>) -> crate::Result<NodeId> {
        self.check_structural()?;
        let members = self.view().members();
        let local = resolve_insert(index, members.len(), self.forest.config.insert_policy)?;
        let physical = self.physical_slot(&members, local)?;
        let node = self.forest.prepare(self.owner, item.into())?;
        self.forest.set_label(node, self.label.as_deref())?;
        self.forest.link_at(self.owner, physical, node)?;
        Ok(node)
    }

    pub fn append(&mut self, item: impl Into<Item>) -> crate::Result<NodeId> {
        let end = self.len() as isize;
        self.insert(end, item)
    }

    /// Removes one member from its chain.
    pub fn remove(&mut self, node: NodeId) -> crate::Result<()> {
        if !self.contains(node) {
            return Err(TreeError::NotAMember { node }.into());
        }
        TreeMut::new(&mut *self.forest, self.owner, self.kind).remove(node)
    }

    /// Sets the value of the member at `index`, or puts a node in its place.
    pub fn set(&mut self, index: isize, item: impl Into<Item>) -> crate::Result<NodeId> {
        match item.into() {
            Item::Value(value) => {
                let node = self.get(index)?;
                self.forest.set_value(node, Some(&value))?;
                Ok(node)
            }
            Item::Node(node) => {
                self.check_structural()?;
                self.forest.check_movable(self.owner, node)?;
                let occupant = self.get(index)?;
                if occupant == node {
                    return Ok(node);
                }
                TreeMut::new(&mut *self.forest, self.owner, self.kind).detach(node)?;
                let physical = self
                    .forest
                    .index(occupant)?
                    .ok_or(TreeError::NotAMember { node: occupant })?;
                self.forest.unlink(self.owner, occupant)?;
                self.forest.set_label(node, self.label.as_deref())?;
                self.forest.link_at(self.owner, physical, node)?;
                Ok(node)
            }
        }
    }

    fn check_structural(&self) -> crate::Result<()> {
        if self.kind == TreeKind::SequentialList && sequence_number(self.label.as_deref()).is_some()
        {
            return Err(TreeError::invalid(format!(
                "positions of label '{}' are fixed by the list sequence",
                self.label()
            ))
            .into());
        }
        Ok(())
    }

    fn physical_slot(&self, members: &[NodeId], local: usize) -> crate::Result<usize> {
        let (anchor, after) = match members.get(local) {
            Some(&member) => (Some(member), false),
            None => (members.last().copied(), true),
        };
        let Some(anchor) = anchor else {
            return Ok(self.forest.items(self.owner)?.len());
        };
        let at = self
            .forest
            .index(anchor)?
            .ok_or(TreeError::NotAMember { node: anchor })?;
        Ok(if after { at + 1 } else { at })
    }
}
