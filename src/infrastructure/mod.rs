//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `glob` - SourceTree over the local disk
//! - `fs/` - FileSystem implementations

pub mod fs;
mod glob;

pub use fs::LocalFs;
pub use glob::GlobWalker;
