//! Sibling view tests
//!
//! Positional and label access, insertion, removal and the agreement between
//! the ordered sequence and the record links.

use heracles::tree::TreeError;
use heracles::{Error, Forest, InsertPolicy, Owner, TreeConfig, TreeKind};

use crate::helpers::{assert_mirrored, labels, plain_forest, values};

fn clamping() -> Forest {
    Forest::with_config(TreeConfig {
        insert_policy: InsertPolicy::Clamp,
        ..Default::default()
    })
}

// ===== ORDER AND HEAD SLOT =====

#[test]
fn test_order_invariant_after_inserts_and_removes() {
    let mut forest = plain_forest(&[("a", "1"), ("b", "2"), ("c", "3")]);
    assert_mirrored(&forest, Owner::Root);

    let mut root = forest.root_mut();
    let front = root.insert_new(0, Some("front"), None).unwrap();
    let middle = root.insert_new(2, Some("middle"), None).unwrap();
    let end = root.insert_new(5, Some("end"), None).unwrap();
    assert_mirrored(&forest, Owner::Root);
    assert_eq!(
        labels(&forest.root()),
        vec!["front", "a", "middle", "b", "c", "end"]
    );

    let mut root = forest.root_mut();
    root.remove(middle).unwrap();
    root.remove(end).unwrap();
    root.remove(front).unwrap();
    assert_mirrored(&forest, Owner::Root);
    assert_eq!(labels(&forest.root()), vec!["a", "b", "c"]);
}

#[test]
fn test_head_slot_follows_first_member() {
    let mut forest = plain_forest(&[("a", "1"), ("b", "2")]);
    let first = forest.root().get_by_position(0).unwrap();
    forest.root_mut().remove(first).unwrap();

    let new_first = forest.root().get_by_position(0).unwrap();
    assert_eq!(
        forest.root_head(),
        Some(forest.node(new_first).unwrap().raw())
    );

    forest.root_mut().remove(new_first).unwrap();
    assert_eq!(forest.root_head(), None);
    assert!(forest.root().is_empty());
}

#[test]
fn test_head_slot_of_children() {
    let mut forest = Forest::new();
    let section = forest.root_mut().append_new(Some("section"), None).unwrap();
    let mut children = forest.children_mut(section).unwrap();
    let a = children.append_new(Some("a"), Some("1")).unwrap();
    let b = children.append_new(Some("b"), Some("2")).unwrap();

    let raw_a = forest.node(a).unwrap().raw();
    assert_eq!(forest.node(section).unwrap().record().children, Some(raw_a));
    assert_mirrored(&forest, Owner::Root);

    forest.children_mut(section).unwrap().remove(a).unwrap();
    let raw_b = forest.node(b).unwrap().raw();
    assert_eq!(forest.head_slot(Owner::Node(section)).unwrap(), Some(raw_b));
    assert_eq!(forest.node(b).unwrap().parent(), Some(section));
    assert_mirrored(&forest, Owner::Root);
}

// ===== REMOVAL =====

#[test]
fn test_remove_detaches_node() {
    let mut forest = plain_forest(&[("a", "1"), ("b", "2"), ("c", "3")]);
    let b = forest.root().get_by_position(1).unwrap();
    forest
        .children_mut(b)
        .unwrap()
        .append_new(Some("child"), None)
        .unwrap();

    forest.root_mut().remove(b).unwrap();

    let node = forest.node(b).unwrap();
    assert_eq!(node.parent(), None);
    assert_eq!(node.next(), None);
    assert_eq!(node.owner(), None);
    assert_eq!(node.record().next, None);
    assert_eq!(node.label(), Some("b"));
    assert_eq!(node.value(), Some("2"));
    assert_eq!(node.children().len(), 1);
    assert!(!forest.root().contains(b));
    assert_eq!(labels(&forest.root()), vec!["a", "c"]);
}

#[test]
fn test_remove_requires_membership() {
    let mut forest = plain_forest(&[("a", "1")]);
    let stray = forest.create_node(Some("stray"), None);

    let err = forest.root_mut().remove(stray).unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, Error::Tree(TreeError::NotAMember { node }) if node == stray));
}

#[test]
fn test_removed_node_can_be_reinserted() {
    let mut forest = plain_forest(&[("a", "1"), ("b", "2")]);
    let a = forest.root().get_by_position(0).unwrap();

    let mut root = forest.root_mut();
    root.remove(a).unwrap();
    root.append(a).unwrap();

    assert_eq!(labels(&forest.root()), vec!["b", "a"]);
    assert_mirrored(&forest, Owner::Root);
}

// ===== POSITIONS =====

#[test]
fn test_negative_positions_resolve_once() {
    let forest = plain_forest(&[("a", "1"), ("b", "2"), ("c", "3")]);
    let root = forest.root();

    assert_eq!(root.get_by_position(-1).unwrap(), root.get_by_position(2).unwrap());
    assert_eq!(root.get_by_position(-3).unwrap(), root.get_by_position(0).unwrap());
    assert!(matches!(
        root.get_by_position(-4),
        Err(Error::Tree(TreeError::IndexOutOfRange { index: -4, len: 3 }))
    ));
    assert!(root.has_position(-3));
    assert!(!root.has_position(3));
}

#[test]
fn test_insert_negative_position() {
    let mut forest = plain_forest(&[("a", "1"), ("b", "2")]);
    forest.root_mut().insert(-1, "x").unwrap();

    assert_eq!(values(&forest.root()), vec!["1", "x", "2"]);
    assert_eq!(forest.root().labels()[1], None);
}

#[test]
fn test_insert_out_of_range_is_strict_by_default() {
    let mut forest = plain_forest(&[("a", "1")]);
    let err = forest.root_mut().insert(5, "x").unwrap_err();

    assert!(matches!(err, Error::Tree(TreeError::IndexOutOfRange { index: 5, len: 1 })));
    assert_eq!(forest.root().len(), 1);
    assert_mirrored(&forest, Owner::Root);
}

#[test]
fn test_insert_out_of_range_clamps_when_configured() {
    let mut forest = clamping();
    let mut root = forest.root_mut();
    root.append_new(Some("a"), None).unwrap();
    root.insert_new(10, Some("end"), None).unwrap();
    root.insert_new(-10, Some("start"), None).unwrap();

    assert_eq!(labels(&forest.root()), vec!["start", "a", "end"]);
    assert_mirrored(&forest, Owner::Root);
}

// ===== ATTACHMENT GUARDS =====

#[test]
fn test_insert_attached_node_rejected() {
    let mut forest = plain_forest(&[("a", "1")]);
    let a = forest.root().get_by_position(0).unwrap();
    let section = forest.root_mut().append_new(Some("section"), None).unwrap();

    let err = forest.children_mut(section).unwrap().append(a).unwrap_err();
    assert!(matches!(err, Error::Tree(TreeError::AlreadyAttached { .. })));
    assert!(forest.children(section).unwrap().is_empty());
}

#[test]
fn test_move_into_descendant_rejected() {
    let mut forest = Forest::new();
    let outer = forest.create_node(Some("outer"), None);
    let inner = forest
        .children_mut(outer)
        .unwrap()
        .append_new(Some("inner"), None)
        .unwrap();

    let err = forest.children_mut(inner).unwrap().append(outer).unwrap_err();
    assert!(matches!(err, Error::Tree(TreeError::MoveIntoDescendant { node }) if node == outer));

    let err = forest.children_mut(outer).unwrap().append(outer).unwrap_err();
    assert!(matches!(err, Error::Tree(TreeError::MoveIntoDescendant { .. })));
}

#[test]
fn test_foreign_node_rejected() {
    let mut other = Forest::new();
    let foreign = other.create_node(Some("foreign"), None);
    let mut forest = Forest::new();

    let err = forest.root_mut().append(foreign).unwrap_err();
    assert!(matches!(err, Error::Tree(TreeError::UnknownNode { .. })));
    assert!(forest.root().is_empty());
}

// ===== SET =====

#[test]
fn test_set_by_position_value() {
    let mut forest = plain_forest(&[("a", "1"), ("b", "2")]);
    let b = forest.root_mut().set_by_position(-1, "20").unwrap();

    assert_eq!(forest.value(b).unwrap(), Some("20"));
    assert_eq!(values(&forest.root()), vec!["1", "20"]);
}

#[test]
fn test_set_by_position_replaces_node() {
    let mut forest = plain_forest(&[("a", "1"), ("b", "2"), ("c", "3")]);
    let b = forest.root().get_by_position(1).unwrap();
    let n = forest.create_node(Some("n"), Some("9"));

    forest.root_mut().set_by_position(1, n).unwrap();

    assert_eq!(labels(&forest.root()), vec!["a", "n", "c"]);
    assert!(!forest.node(b).unwrap().is_attached());
    assert_mirrored(&forest, Owner::Root);
}

#[test]
fn test_set_by_position_moves_within_view() {
    let mut forest = plain_forest(&[("a", "1"), ("b", "2"), ("c", "3"), ("d", "4")]);
    let a = forest.root().get_by_position(0).unwrap();
    let d = forest.root().get_by_position(3).unwrap();

    // shift right: a replaces c
    forest.root_mut().set_by_position(2, a).unwrap();
    assert_eq!(labels(&forest.root()), vec!["b", "a", "d"]);

    // shift left: d replaces b
    forest.root_mut().set_by_position(0, d).unwrap();
    assert_eq!(labels(&forest.root()), vec!["d", "a"]);
    assert_mirrored(&forest, Owner::Root);
}

#[test]
fn test_set_by_position_moves_across_views() {
    let mut forest = plain_forest(&[("a", "1")]);
    let section = forest.root_mut().append_new(Some("section"), None).unwrap();
    let key = forest
        .children_mut(section)
        .unwrap()
        .append_new(Some("key"), Some("v"))
        .unwrap();

    forest.root_mut().set_by_position(0, key).unwrap();

    assert_eq!(labels(&forest.root()), vec!["key", "section"]);
    assert!(forest.children(section).unwrap().is_empty());
    assert_eq!(forest.node(key).unwrap().parent(), None);
    assert_mirrored(&forest, Owner::Root);
}

#[test]
fn test_set_by_label_updates_or_appends() {
    let mut forest = plain_forest(&[("a", "1"), ("b", "2")]);
    let mut root = forest.root_mut();
    let a = root.set_by_label("a", "10").unwrap();
    let c = root.set_by_label("c", "3").unwrap();

    assert_eq!(forest.value(a).unwrap(), Some("10"));
    assert_eq!(forest.root().get_by_position(-1).unwrap(), c);
    assert_eq!(values(&forest.root()), vec!["10", "2", "3"]);
}

#[test]
fn test_set_by_label_duplicate_is_cardinality_error() {
    let mut forest = plain_forest(&[("a", "1"), ("a", "2")]);
    let err = forest.root_mut().set_by_label("a", "3").unwrap_err();

    assert!(matches!(err, Error::Tree(TreeError::Cardinality { count: 2, .. })));
    assert_eq!(values(&forest.root()), vec!["1", "2"]);
}

#[test]
fn test_set_by_label_relabels_node() {
    let mut forest = plain_forest(&[("a", "1"), ("b", "2")]);
    let a = forest.root().get_by_position(0).unwrap();

    forest.root_mut().set_by_label("z", a).unwrap();

    assert_eq!(labels(&forest.root()), vec!["b", "z"]);
    assert_eq!(forest.value(a).unwrap(), Some("1"));
    assert_mirrored(&forest, Owner::Root);
}

// ===== LOOKUPS =====

#[test]
fn test_child_or_insert() {
    let mut forest = plain_forest(&[("a", "1"), ("dup", "x"), ("dup", "y")]);
    let mut root = forest.root_mut();

    let a = root.child_or_insert("a").unwrap();
    assert_eq!(root.get_by_position(0).unwrap(), a);

    let created = root.child_or_insert("new").unwrap();
    assert_eq!(root.len(), 4);
    assert_eq!(root.get_by_position(-1).unwrap(), created);

    assert!(matches!(
        root.child_or_insert("dup"),
        Err(Error::Tree(TreeError::Cardinality { count: 2, .. }))
    ));
}

#[test]
fn test_has_label_and_empty_label() {
    let mut forest = plain_forest(&[("a", "1")]);
    let blank = forest.root_mut().append_new(Some(""), Some("v")).unwrap();

    let root = forest.root();
    assert!(root.has_label("a"));
    assert!(!root.has_label("b"));
    assert_eq!(forest.label(blank).unwrap(), None);
    assert_eq!(root.get_by_label("").unwrap().single().unwrap(), blank);
}

#[test]
fn test_previous_and_index() {
    let forest = plain_forest(&[("a", "1"), ("b", "2"), ("c", "3")]);
    let root = forest.root();
    let a = root.get_by_position(0).unwrap();
    let c = root.get_by_position(2).unwrap();

    assert_eq!(forest.previous(a).unwrap(), None);
    assert_eq!(forest.previous(c).unwrap(), root.get_by_position(1).ok());
    assert_eq!(forest.index(c).unwrap(), Some(2));
}

#[test]
fn test_previous_of_detached_node_is_illegal_state() {
    let mut forest = Forest::new();
    let node = forest.create_node(None, None);

    let err = forest.previous(node).unwrap_err();
    assert!(matches!(&err, Error::Tree(tree_err) if tree_err.is_illegal_state()));
    assert_eq!(forest.index(node).unwrap(), None);
}

#[test]
fn test_node_identity() {
    let mut forest = plain_forest(&[("a", "1")]);
    let twin = forest.create_node(Some("a"), Some("1"));
    let a = forest.root().get_by_position(0).unwrap();

    assert_ne!(a, twin);
    assert_eq!(forest.root().kind(), TreeKind::Plain);
}
