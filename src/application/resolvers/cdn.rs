//! Remote resources, optionally pinned with Subresource Integrity

use super::{arity_aware_manifest_name, ResolveContext};
use crate::application::state::State;
use crate::domain::entities::{CdnAsset, CdnRef, Integrity, ManifestSetting};
use crate::domain::value_objects::{As, CrossOrigin, HashAlgo, UrlEntry};

pub(super) fn resolve(
    ctx: &ResolveContext,
    state: &mut State,
    name: &str,
    asset: &CdnAsset,
    in_array: bool,
) {
    state.check_then_run_if_no_errors(
        |state| {
            if asset.url.is_none() {
                state.add_error(format!("Invalid config in {}: url is missing.", name));
            }
            let as_ = match asset.as_.as_deref() {
                None => None,
                Some(raw) => match As::parse(raw) {
                    Some(as_) => Some(as_),
                    None => {
                        state.add_error(format!(
                            "Invalid \"as\" value: {}. Must be either 'script' or 'style'.",
                            raw
                        ));
                        None
                    }
                },
            };
            if let ManifestSetting::Invalid(shown) = &asset.manifest {
                state.add_error(format!("{} has an invalid manifest: {}", name, shown));
            }
            asset.url.clone().map(|url| (url, as_))
        },
        |state, (url, as_)| {
            let Some(integrity) = integrity(ctx, state, name, asset.integrity.as_ref()) else {
                return;
            };

            state.register_now(name);
            state.add_url(
                name,
                UrlEntry::new(url.clone())
                    .with_crossorigin(CrossOrigin::Anonymous)
                    .with_as(as_)
                    .with_integrity(integrity.clone()),
            );
            if let Some(key) = arity_aware_manifest_name(state, name, &url, in_array, &asset.manifest)
            {
                let cdn = CdnRef {
                    url,
                    as_,
                    integrity,
                };
                state.manifest_mut().add_path_cdn(key, cdn);
            }
        },
    );
}

/// The SRI attribute value: `None` outside means resolution failed and
/// errors were recorded; `Some(None)` means no integrity was requested.
fn integrity(
    ctx: &ResolveContext,
    state: &mut State,
    name: &str,
    integrity: Option<&Integrity>,
) -> Option<Option<String>> {
    match integrity {
        None => Some(None),
        Some(Integrity::Literal(value)) => Some(Some(value.clone())),
        Some(Integrity::Invalid(shown)) => {
            state.add_error(format!("{} has an invalid integrity value: {}", name, shown));
            None
        }
        Some(Integrity::FromFiles { files: None, .. }) => {
            state.add_error(format!("{} integrity missing key: files", name));
            None
        }
        Some(Integrity::FromFiles {
            files: Some(files),
            algos,
        }) => hash_files(ctx, state, name, files, algos).map(Some),
    }
}

/// `algo-base64digest` tokens: algorithms outermost, then sorted files
fn hash_files(
    ctx: &ResolveContext,
    state: &mut State,
    name: &str,
    files: &str,
    algos: &[String],
) -> Option<String> {
    let mut parsed = Vec::with_capacity(algos.len());
    for algo in algos {
        match algo.parse::<HashAlgo>() {
            Ok(algo) => parsed.push(algo),
            Err(_) => {
                state.add_error(format!("{} has an unsupported hash algorithm: {}", name, algo));
                return None;
            }
        }
    }

    let src_dir = state.src().to_path_buf();
    let matched = match ctx.tree.glob(&src_dir, files) {
        Ok(matched) => matched,
        Err(e) => {
            state.add_error(format!("{} integrity {}", name, e));
            return None;
        }
    };
    if matched.is_empty() {
        state.add_error(format!("{} integrity file(s) not found: {}", name, files));
        return None;
    }

    let sources: Vec<_> = matched
        .iter()
        .map(|file| state.local_src(&src_dir, file))
        .collect();
    let mut tokens = Vec::with_capacity(parsed.len() * sources.len());
    for algo in &parsed {
        for src in &sources {
            match src.content() {
                Ok(bytes) => tokens.push(algo.integrity(bytes)),
                Err(e) => {
                    state.add_error(format!("{} integrity {}", name, e));
                    return None;
                }
            }
        }
    }
    Some(tokens.join(" "))
}
