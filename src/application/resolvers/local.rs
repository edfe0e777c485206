//! Local files: glob, validate, name, copy

use super::{Arity, ResolveContext};
use crate::application::state::State;
use crate::domain::entities::{render_manifest_template, LocalAsset, ManifestSetting};
use crate::domain::services::OutputNameFn;
use crate::domain::value_objects::path::{fix_relative_path, resolve as resolve_path, to_url};
use crate::domain::value_objects::UrlEntry;

/// Output layout for transitive assets: they keep their relative path
const TRANSITIVE_NAME: &str = "[path]/[basename]";

pub(super) fn resolve(
    ctx: &ResolveContext,
    state: &mut State,
    name: &str,
    asset: &LocalAsset,
    arity: Arity,
) {
    state.check_then_run_if_no_errors(
        |state| {
            if asset.files.is_none() {
                state.add_error(format!("{} missing key: files", name));
            }
            if let ManifestSetting::Invalid(shown) = &asset.manifest {
                state.add_error(format!("{} has an invalid manifest: {}", name, shown));
            }
            asset.files.clone()
        },
        |state, files| register(ctx, state, name, asset, arity, &files),
    );
}

fn register(
    ctx: &ResolveContext,
    state: &mut State,
    name: &str,
    asset: &LocalAsset,
    arity: Arity,
    files: &str,
) {
    let src_dir = match &asset.src {
        Some(dir) => resolve_path(state.src(), dir),
        None => state.src().to_path_buf(),
    };
    let desc = match &asset.src {
        Some(dir) => format!("{}:{}/{}", name, dir, files),
        None => format!("{}:{}", name, files),
    };

    let matched = match ctx.tree.glob(&src_dir, files) {
        Ok(matched) => matched,
        Err(e) => {
            state.add_error(format!("{} - {}", desc, e));
            return;
        }
    };

    let problems = asset.validate.check(&matched, files, &src_dir);
    if !problems.is_empty() {
        for problem in problems {
            state.add_error(format!("{} - {}", desc, problem));
        }
        return;
    }

    if asset.manifest.is_derive() && (matched.len() > 1 || arity.shared()) {
        if arity.in_array() {
            state.add_error(format!(
                "{} has {{manifest: true}} but requires an explicit name or function.",
                name
            ));
        } else {
            state.add_error(format!(
                "{} has {{manifest: true}} but '{}' matches more than 1 file.",
                name, files
            ));
        }
        return;
    }

    let transitive = asset.transitive.unwrap_or(false);
    let name_fn: OutputNameFn = if transitive {
        ctx.compile_name(TRANSITIVE_NAME)
    } else {
        match &asset.output_name {
            Some(template) => ctx.compile_name(template),
            None => ctx.default_name.clone(),
        }
    };

    state.register_now(name);

    for file in &matched {
        let src = state.local_src(&src_dir, file);
        let rendered = match name_fn.render(file, || src.content()) {
            Ok(rendered) => rendered,
            Err(e) => {
                state.add_error(format!("{} - {}", desc, e));
                continue;
            }
        };
        let new_name = match &asset.output_path {
            Some(dir) => fix_relative_path(&format!("{}/{}", dir, rendered)),
            None => fix_relative_path(&rendered),
        };

        state.add_op_copy(src, &new_name, transitive);

        let url = to_url(&new_name);
        state.add_url(
            name,
            UrlEntry::new(url.clone()).with_transitive(asset.transitive),
        );

        let key = match &asset.manifest {
            ManifestSetting::None | ManifestSetting::Invalid(_) => None,
            ManifestSetting::Derive => Some(name.to_string()),
            ManifestSetting::Name(key) => Some(key.clone()),
            ManifestSetting::Template(template) => Some(render_manifest_template(template, file)),
            ManifestSetting::Fn(f) => f(file).filter(|key| !key.is_empty()),
        };
        if let Some(key) = key {
            state.manifest_mut().add_path_local(key, url);
        }
    }
}
