//! Tree integration tests
//!
//! These tests cover sibling views, label groups, sequential lists,
//! serialization and the release of native records.

mod group_tests;
mod siblings_tests;
