//! Application Layer
//!
//! Orchestrates a build on top of the domain layer:
//!
//! - `state` - the mutable build context resolvers and plugins share
//! - `resolvers` - turn asset definitions into ops, URLs and manifest entries
//! - `plan` - the parse / plugin / manifest pipeline
//! - `plugins` - post-resolution rewrites
//! - `execute` - carry the finished plan out through a FileSystem port

pub mod execute;
pub mod plan;
pub mod plugins;
pub mod resolvers;
pub mod state;

pub use execute::{execute, ExecuteOptions, ExecutionReport};
pub use plan::{parse, parse_with, run, run_with};
pub use plugins::{
    run_plugins, CodeManifest, FileInput, FilenameTest, Html, Inline, InlineArg, InlineDecision,
    ManifestUrls, Modify, Plugin,
};
pub use state::{Modification, PlanResults, State};
