//! Domain Entities
//!
//! - `LocalSrc` / `OutputFile` - source and destination descriptors
//! - `Op` - a planned copy or write
//! - `Manifest` - manifest name to URL mapping
//! - `AssetValue` - what an asset name is declared as

mod asset;
mod local_src;
mod manifest;
mod op;
mod output_file;

pub use asset::{
    render_manifest_template, AssetTable, AssetValue, CdnAsset, ExternalAsset, Integrity,
    InvalidAsset, LocalAsset, ManifestNameFn, ManifestSetting, ValidateFn, Validator,
};
pub use local_src::{LocalSrc, SourceCache};
pub use manifest::{CdnRef, Manifest, ManifestEntry};
pub use op::{CopyOp, Op, OpId, PlannedOp, WriteOp};
pub use output_file::OutputFile;
