//! Paths served by something else. No op; a URL and maybe a manifest entry.

use super::arity_aware_manifest_name;
use crate::application::state::State;
use crate::domain::entities::{ExternalAsset, ManifestSetting};
use crate::domain::value_objects::path::with_leading_slash;
use crate::domain::value_objects::UrlEntry;

pub(super) fn resolve(state: &mut State, name: &str, asset: &ExternalAsset, in_array: bool) {
    state.check_then_run_if_no_errors(
        |state| {
            if asset.path.is_none() {
                state.add_error(format!("Invalid config in {}: path is missing.", name));
            }
            if let ManifestSetting::Invalid(shown) = &asset.manifest {
                state.add_error(format!("{} has an invalid manifest: {}", name, shown));
            }
            asset.path.clone()
        },
        |state, path| {
            let url = with_leading_slash(&path);
            state.register_now(name);
            state.add_url(name, UrlEntry::new(url.clone()));
            if let Some(key) =
                arity_aware_manifest_name(state, name, &path, in_array, &asset.manifest)
            {
                state.manifest_mut().add_path_local(key, url);
            }
        },
    );
}
