//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod hash;
pub mod path;
mod url;

pub use hash::{HashAlgo, UnknownHashAlgo};
pub use url::{As, CrossOrigin, UrlEntry};
