//! Sequential list classification and renumbering.
//!
//! A chain is a sequential list when its integer-parseable labels, read in
//! physical order, run 1, 2, 3, ... without gaps and at least one exists.
//! Members whose labels are not integers (comments, blank entries) are
//! ignored by the check and by every logical operation on the list, but keep
//! their physical place in the chain.

use tracing::trace;

use super::{Forest, NodeId, Owner, TreeError};

/// Classification of a sibling view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeKind {
    Plain,
    SequentialList,
}

/// The integer a label denotes on a list, if any.
pub fn sequence_number(label: Option<&str>) -> Option<i64> {
    label?.parse().ok()
}

/// True for labels written as an integer, whether or not it fits in an `i64`.
fn is_integer_text(label: &str) -> bool {
    let digits = label.strip_prefix(['+', '-']).unwrap_or(label);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Classifies a chain from its labels in physical order.
///
/// An integer label too large for an `i64` can never continue the run, so it
/// makes the chain plain.
pub fn classify<'a>(labels: impl IntoIterator<Item = Option<&'a str>>) -> TreeKind {
    let mut expected = 1;
    for label in labels {
        match sequence_number(label) {
            Some(number) if number == expected => expected += 1,
            Some(_) => return TreeKind::Plain,
            None if label.is_some_and(is_integer_text) => return TreeKind::Plain,
            None => {}
        }
    }
    if expected > 1 {
        TreeKind::SequentialList
    } else {
        TreeKind::Plain
    }
}

impl Forest {
    /// New labels for every integer member of `owner`'s chain that is at least
    /// `from`, shifted by `delta`.
    ///
    /// Nothing is written; a label that would leave the `i64` range fails the
    /// whole shift.
    fn plan_shift(
        &self,
        owner: Owner,
        from: i64,
        delta: i64,
        skip: NodeId,
    ) -> crate::Result<Vec<(NodeId, i64)>> {
        let mut planned = Vec::new();
        for &member in self.items(owner)? {
            if member == skip {
                continue;
            }
            let Some(number) = sequence_number(self.label_of(member)) else {
                continue;
            };
            if number < from {
                continue;
            }
            let shifted = number.checked_add(delta).ok_or_else(|| {
                TreeError::invalid(format!("label '{number}' cannot be renumbered by {delta}"))
            })?;
            planned.push((member, shifted));
        }
        Ok(planned)
    }

    fn apply_shift(&mut self, owner: Owner, planned: Vec<(NodeId, i64)>) -> crate::Result<()> {
        let shifted = planned.len();
        for (member, number) in planned {
            self.record_mut(member)?.label = Some(number.to_string());
        }
        trace!(?owner, shifted, "Shifted sequence labels");
        Ok(())
    }

    /// Inserts `node` as logical member `logical` of a list and renumbers.
    ///
    /// The node is linked physically before the current `logical`-th integer
    /// member, or at the physical end when appending. It then takes label
    /// `logical + 1`, and the members it displaced move up by one. The new
    /// labels are computed before anything is linked.
    pub(crate) fn link_in_sequence(
        &mut self,
        owner: Owner,
        logical: usize,
        node: NodeId,
    ) -> crate::Result<()> {
        self.check_attachable(owner, node)?;
        let items = self.items(owner)?;
        let physical = {
            let mut members = items
                .iter()
                .enumerate()
                .filter(|&(_, &id)| sequence_number(self.label_of(id)).is_some());
            match members.nth(logical) {
                Some((at, _)) => at,
                None => items.len(),
            }
        };
        let number = logical as i64 + 1;
        let planned = self.plan_shift(owner, number, 1, node)?;

        self.link_at(owner, physical, node)?;
        self.apply_shift(owner, planned)?;
        self.record_mut(node)?.label = Some(number.to_string());
        Ok(())
    }

    /// Removes `node` from a list, closing the gap its label leaves.
    pub(crate) fn unlink_from_sequence(&mut self, owner: Owner, node: NodeId) -> crate::Result<()> {
        if self.data(node)?.owner != Some(owner) {
            return Err(TreeError::NotAMember { node }.into());
        }
        let planned = match sequence_number(self.label_of(node)) {
            Some(number) => match number.checked_add(1) {
                Some(from) => self.plan_shift(owner, from, -1, node)?,
                None => Vec::new(),
            },
            None => Vec::new(),
        };
        self.unlink(owner, node)?;
        self.apply_shift(owner, planned)
    }
}
