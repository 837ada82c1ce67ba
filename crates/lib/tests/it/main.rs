/*! Integration tests for YSpotify.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - membership: Join/unlink scenarios and leadership invariants over random event sequences
 * - store: JSON file and in-memory record stores, including legacy record files
 * - hub: Request-level operations, identity sync on sign-in, write serialization
 * - identity: The Spotify client against a local HTTP stand-in
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("yspotify=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod hub;
mod identity;
mod membership;
mod store;
