/*! Integration tests for Heracles.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - tree: Sibling views, label groups, sequential lists, serialization and teardown
 * - lens: Path filters and pass-through of lens results and errors
 * - handle: The Heracles handle and its lens registry
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("heracles=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod tree;
