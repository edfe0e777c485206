//! Common test utilities for assetplan integration tests.
//!
//! This module provides:
//! - `TestEnv`: an isolated site directory plus CLI helpers
//! - `MemFs`: an in-memory FileSystem for execution tests
//! - Fixtures: reusable file contents and configs

#![allow(dead_code)]

pub mod env;
pub mod fixtures;
pub mod memfs;

pub use env::*;
pub use fixtures::*;
pub use memfs::*;
