//! Domain Layer
//!
//! The planning model without the orchestration around it.
//!
//! ## Structure
//!
//! - `entities/` - Source and output descriptors, ops, manifest, asset definitions
//! - `value_objects/` - Hash algorithms, path helpers, URL entries
//! - `services/` - Filename templates, dependency graph
//! - `ports/` - Interfaces for globbing and for carrying out ops
//!
//! Source content is read lazily through [`entities::LocalSrc`]; everything
//! else that touches the disk goes through a port.

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
