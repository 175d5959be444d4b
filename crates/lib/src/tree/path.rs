//! Slash-separated label paths.
//!
//! A path such as `"section/key"` names a node by the labels on the way down
//! from the root chain. Every segment must match exactly one node.

use super::{Forest, NodeId, Owner, TreeError};

fn segments(path: &str) -> crate::Result<Vec<&str>> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return Err(TreeError::invalid(format!("empty path '{path}'")).into());
    }
    Ok(segments)
}

impl Forest {
    /// Follows `path` from the root chain.
    pub fn find(&self, path: &str) -> crate::Result<NodeId> {
        let mut owner = Owner::Root;
        let mut found = None;
        for segment in segments(path)? {
            let node = self.tree(owner)?.get_by_label(segment)?.single()?;
            owner = Owner::Node(node);
            found = Some(node);
        }
        found.ok_or_else(|| TreeError::invalid(format!("empty path '{path}'")).into())
    }

    /// Follows `path` from the root chain, creating missing nodes on the way.
    pub fn find_or_create(&mut self, path: &str) -> crate::Result<NodeId> {
        let mut owner = Owner::Root;
        let mut found = None;
        for segment in segments(path)? {
            let node = self.tree_mut(owner)?.child_or_insert(segment)?;
            owner = Owner::Node(node);
            found = Some(node);
        }
        found.ok_or_else(|| TreeError::invalid(format!("empty path '{path}'")).into())
    }
}
