//! Plugins
//!
//! A plugin runs after the plan is resolved and the dependency graph is
//! frozen. It may only change the build through [`State`], and must use
//! [`State::modify_op`] for any op it rewrites so URLs and manifest entries
//! follow renamed files.
//!
//! Domain problems (a tag that names an unknown asset, a file that was
//! expected to change) are recorded as State errors. Returning `Err` means
//! the plugin broke the mutation contract and aborts the whole run.
//!
//! ## Plugins
//!
//! - [`Modify`] - rename files or rewrite their content
//! - [`Inline`] - replace small assets with `data:` URLs
//! - [`Html`] - expand `<require/>` tags and `assetplan://` URLs
//! - [`ManifestUrls`] - rewrite `assetplan://` URLs in any text file
//! - [`CodeManifest`] - generate a Scala object of manifest URLs

mod code_manifest;
mod declarative;
mod html;
mod inline;
mod modify;

use std::rc::Rc;

use tracing::debug;

use super::state::State;
use crate::error::PlanResult;

pub use code_manifest::CodeManifest;
pub use html::{load_tag, replace_manifest_urls, Html, ManifestUrls};
pub use inline::{Inline, InlineArg, InlineDecision};
pub use modify::{FileInput, FilenameTest, Modify};

pub trait Plugin {
    /// Short name used in logs
    fn name(&self) -> &str;

    fn run(&self, state: &mut State) -> PlanResult<()>;
}

/// Run `plugins` in order, stopping at the first one that leaves errors
pub fn run_plugins(state: &mut State, plugins: &[Rc<dyn Plugin>]) -> PlanResult<()> {
    for plugin in plugins {
        if !state.ok() {
            debug!(plugin = plugin.name(), "skipping plugin after errors");
            break;
        }
        debug!(plugin = plugin.name(), "running plugin");
        plugin.run(state)?;
    }
    Ok(())
}
