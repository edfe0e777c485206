//! assetplan - static-asset build planner
//!
//! Resolves a table of named assets (local files, external URLs, CDN
//! resources, aliases and bundles of those) into a plan of copy and write
//! operations, a name to URL manifest and a dependency graph. Plugins can
//! rewrite the plan before it is carried out.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

// Re-exports for convenience
pub use application::{
    execute, parse, run, ExecuteOptions, ExecutionReport, PlanResults, Plugin, State,
};
pub use config::{Config, ConfigWarning};
pub use error::{PlanError, PlanResult};
