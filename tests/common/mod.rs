//! Common test infrastructure
//!
//! Spawns a fixture HTTP server that serves a package catalog and artifact
//! files, and builds stores wired against it. Tests should only import from
//! this module, not from internal submodules.

mod constants;
mod server;
mod store;

pub use constants::*;
pub use server::TestServer;
#[allow(unused_imports)]
pub use store::{build_test_store, RecordingLauncher, TestStore};
