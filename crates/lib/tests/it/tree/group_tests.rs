//! Label group tests

use heracles::tree::TreeError;
use heracles::{Error, Owner};

use crate::helpers::{COMMENT, assert_mirrored, labels, list_forest, plain_forest, values};

// ===== CARDINALITY =====

#[test]
fn test_group_requires_members() {
    let forest = plain_forest(&[("a", "1")]);
    let err = forest.root().get_by_label("missing").unwrap_err();

    assert!(err.is_not_found());
    assert!(matches!(&err, Error::Tree(TreeError::LabelNotFound { label }) if label == "missing"));
}

#[test]
fn test_single_member_value() {
    let mut forest = plain_forest(&[("a", "1"), ("b", "2")]);
    assert_eq!(forest.root().get_by_label("a").unwrap().value().unwrap(), Some("1"));

    forest
        .root_mut()
        .group_mut("a")
        .unwrap()
        .set_value(Some("10"))
        .unwrap();
    assert_eq!(values(&forest.root()), vec!["10", "2"]);
}

#[test]
fn test_multiple_members_value_is_cardinality_error() {
    let mut forest = plain_forest(&[("a", "1"), ("b", "2"), ("a", "3")]);
    let root = forest.root();
    let group = root.get_by_label("a").unwrap();

    assert_eq!(group.len(), 2);
    assert_eq!(group.values(), vec![Some("1"), Some("3")]);
    let err = group.value().unwrap_err();
    assert!(matches!(&err, Error::Tree(err) if err.is_cardinality_error()));

    let mut root = forest.root_mut();
    let mut group = root.group_mut("a").unwrap();
    assert!(matches!(
        group.set_value(Some("x")),
        Err(Error::Tree(TreeError::Cardinality { count: 2, .. }))
    ));
    assert_eq!(values(&forest.root()), vec!["1", "2", "3"]);
}

// ===== LOCAL POSITIONS =====

#[test]
fn test_group_positions_are_local() {
    let forest = plain_forest(&[("a", "1"), ("b", "2"), ("a", "3")]);
    let root = forest.root();
    let group = root.get_by_label("a").unwrap();

    assert_eq!(group.get(1).unwrap(), root.get_by_position(2).unwrap());
    assert_eq!(group.get(-1).unwrap(), root.get_by_position(2).unwrap());
    assert!(group.get(2).is_err());
}

#[test]
fn test_group_insert_links_before_local_member() {
    let mut forest = plain_forest(&[("a", "1"), ("b", "2"), ("a", "3")]);
    let inserted = forest.root_mut().group_mut("a").unwrap().insert(1, "new").unwrap();

    assert_eq!(labels(&forest.root()), vec!["a", "b", "a", "a"]);
    assert_eq!(values(&forest.root()), vec!["1", "2", "new", "3"]);
    assert_eq!(forest.label(inserted).unwrap(), Some("a"));
    assert_mirrored(&forest, Owner::Root);
}

#[test]
fn test_group_append_follows_last_member() {
    let mut forest = plain_forest(&[("a", "1"), ("b", "2"), ("c", "3")]);
    forest.root_mut().group_mut("a").unwrap().append("4").unwrap();

    assert_eq!(labels(&forest.root()), vec!["a", "a", "b", "c"]);
    assert_eq!(values(&forest.root()), vec!["1", "4", "2", "3"]);
    assert_mirrored(&forest, Owner::Root);
}

#[test]
fn test_group_insert_relabels_node() {
    let mut forest = plain_forest(&[("a", "1")]);
    let node = forest.create_node(Some("other"), Some("2"));
    forest.root_mut().group_mut("a").unwrap().insert(0, node).unwrap();

    assert_eq!(labels(&forest.root()), vec!["a", "a"]);
    assert_eq!(forest.root().get_by_position(0).unwrap(), node);
}

// ===== REMOVE AND SET =====

#[test]
fn test_group_remove_checks_membership() {
    let mut forest = plain_forest(&[("a", "1"), ("b", "2"), ("a", "3")]);
    let b = forest.root().get_by_position(1).unwrap();
    let first_a = forest.root().get_by_position(0).unwrap();

    let mut root = forest.root_mut();
    let mut group = root.group_mut("a").unwrap();
    assert!(matches!(
        group.remove(b),
        Err(Error::Tree(TreeError::NotAMember { .. }))
    ));
    group.remove(first_a).unwrap();
    assert_eq!(group.len(), 1);

    assert_eq!(labels(&forest.root()), vec!["b", "a"]);
    assert!(!forest.node(first_a).unwrap().is_attached());
    assert_mirrored(&forest, Owner::Root);
}

#[test]
fn test_group_set_replaces_member() {
    let mut forest = plain_forest(&[("a", "1"), ("b", "2"), ("a", "3")]);
    let old = forest.root().get_by_position(2).unwrap();
    let node = forest.create_node(None, Some("new"));

    forest.root_mut().group_mut("a").unwrap().set(1, node).unwrap();

    assert_eq!(values(&forest.root()), vec!["1", "2", "new"]);
    assert_eq!(forest.label(node).unwrap(), Some("a"));
    assert!(!forest.node(old).unwrap().is_attached());
    assert_mirrored(&forest, Owner::Root);
}

// ===== LISTS =====

#[test]
fn test_comment_group_on_list() {
    let mut forest = plain_forest(&[("1", "a"), (COMMENT, "first"), ("2", "b")]);
    forest
        .root_mut()
        .group_mut(COMMENT)
        .unwrap()
        .append("second")
        .unwrap();

    let root = forest.root();
    assert_eq!(labels(&root), vec!["1", "2"]);
    assert_eq!(root.physical_len(), 4);
    assert_eq!(
        root.get_by_label(COMMENT).unwrap().values(),
        vec![Some("first"), Some("second")]
    );
}

#[test]
fn test_integer_group_on_list_is_fixed() {
    let mut forest = list_forest(&["a", "b"]);
    let mut root = forest.root_mut();
    let mut group = root.group_mut("1").unwrap();

    assert!(matches!(
        group.insert(0, "x"),
        Err(Error::Tree(TreeError::InvalidArgument { .. }))
    ));
    group.set_value(Some("A")).unwrap();
    assert_eq!(values(&forest.root()), vec!["A", "b"]);
}
