//! Plain serialization of subtrees.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use super::{Forest, NodeId};

/// A node and its subtree as plain data.
///
/// Records carry no identity, so two records compare equal whenever their
/// labels, values and children do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub label: Option<String>,
    pub value: Option<String>,
    #[serde(default)]
    pub children: Vec<NodeRecord>,
}

impl NodeRecord {
    pub fn new(label: Option<&str>, value: Option<&str>) -> Self {
        Self {
            label: label.map(str::to_string),
            value: value.map(str::to_string),
            children: Vec::new(),
        }
    }

    /// A labeled leaf with a value.
    pub fn leaf(label: &str, value: &str) -> Self {
        Self::new(Some(label), Some(value))
    }

    pub fn with_child(mut self, child: NodeRecord) -> Self {
        self.children.push(child);
        self
    }
}

impl Forest {
    pub(crate) fn record_tree(&self, id: NodeId) -> NodeRecord {
        let children = self
            .data(id)
            .map(|data| self.records(&data.children.items))
            .unwrap_or_default();
        NodeRecord {
            label: self.label_of(id).map(str::to_string),
            value: self.value_of(id).map(str::to_string),
            children,
        }
    }

    pub(crate) fn records(&self, items: &[NodeId]) -> Vec<NodeRecord> {
        items.iter().map(|&id| self.record_tree(id)).collect()
    }

    /// Writes `- label:'l' value:'v'` lines, four spaces of indent per level.
    pub(crate) fn write_outline(&self, items: &[NodeId], depth: usize, out: &mut String) {
        for &id in items {
            let _ = writeln!(
                out,
                "{:indent$}- label:'{}' value:'{}'",
                "",
                self.label_of(id).unwrap_or_default(),
                self.value_of(id).unwrap_or_default(),
                indent = depth * 4
            );
            if let Ok(data) = self.data(id) {
                self.write_outline(&data.children.items, depth + 1, out);
            }
        }
    }
}
