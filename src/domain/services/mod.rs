//! Domain Services
//!
//! Pure logic over domain entities: filename templates and the frozen
//! dependency graph.

mod dependency_graph;
mod output_name;

pub use dependency_graph::DependencyGraph;
pub use output_name::{NameOptions, OutputNameFn};
