//! Error types for assetplan
//!
//! Uses `thiserror` for library errors. Problems with the asset
//! configuration itself are *not* errors in this sense: they are collected
//! as diagnostics on the build [`State`](crate::application::State) so a
//! single run reports all of them. `PlanError` is reserved for failures
//! that stop a run outright.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for assetplan operations
pub type PlanResult<T> = Result<T, PlanError>;

/// Main error type for assetplan operations
#[derive(Error, Debug)]
pub enum PlanError {
    /// Config file could not be parsed
    #[error("invalid config in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// No config file found in the search directory
    #[error("no assetplan.toml or assetplan.json found in {dir}")]
    ConfigNotFound { dir: PathBuf },

    /// A source file could not be read
    #[error("unable to read {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// A glob pattern could not be compiled or walked
    #[error("invalid glob '{pattern}': {message}")]
    Glob { pattern: String, message: String },

    /// A plugin broke the State mutation contract
    #[error("plugin contract violation: {0}")]
    Contract(String),

    /// A plugin specification could not be built
    #[error("invalid plugin '{plugin}': {message}")]
    InvalidPlugin { plugin: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialisation error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
