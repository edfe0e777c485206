//! Asset resolvers
//!
//! [`fold`] is the single dispatch point over [`AssetValue`]: bundles are
//! flattened with an [`Arity::Array`], references become dependency edges, and
//! local / external / CDN assets go to their resolver. [`defer`] wraps the
//! same dispatch in a registrar for optional assets.
//!
//! Every resolver validates first and only registers anything once the
//! validation added no errors.

mod cdn;
mod external;
mod local;
mod reference;

use std::rc::Rc;

use tracing::trace;

use super::state::State;
use crate::domain::entities::{render_manifest_template, AssetValue, ManifestSetting};
use crate::domain::ports::SourceTree;
use crate::domain::services::{NameOptions, OutputNameFn};

/// What resolvers share for one build
pub struct ResolveContext {
    /// Compiled `output.name`
    pub default_name: OutputNameFn,
    pub name_options: NameOptions,
    pub tree: Rc<dyn SourceTree>,
}

impl ResolveContext {
    pub fn new(default_name: &str, name_options: NameOptions, tree: Rc<dyn SourceTree>) -> Self {
        Self {
            default_name: OutputNameFn::compile(default_name, &name_options),
            name_options,
            tree,
        }
    }

    pub fn compile_name(&self, template: &str) -> OutputNameFn {
        OutputNameFn::compile(template, &self.name_options)
    }
}

/// Where a value sits: on its own, or inside a bundle where `deriving`
/// members have `manifest = true` and so claim the bundle's name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Single,
    Array { deriving: usize },
}

impl Arity {
    pub fn in_array(self) -> bool {
        matches!(self, Arity::Array { .. })
    }

    /// More than one bundle member would write the bundle's manifest key
    pub fn shared(self) -> bool {
        matches!(self, Arity::Array { deriving } if deriving > 1)
    }

    /// Arity for the members of `items`; nested bundles share the outer count
    fn of_bundle(self, items: &[AssetValue]) -> Self {
        match self {
            Arity::Array { .. } => self,
            Arity::Single => Arity::Array {
                deriving: deriving_members(items),
            },
        }
    }
}

fn deriving_members(items: &[AssetValue]) -> usize {
    items
        .iter()
        .map(|item| match item {
            AssetValue::Bundle(inner) => deriving_members(inner),
            AssetValue::Local(asset) => usize::from(asset.manifest.is_derive()),
            AssetValue::External(asset) => usize::from(asset.manifest.is_derive()),
            AssetValue::Cdn(asset) => usize::from(asset.manifest.is_derive()),
            AssetValue::Ref(_) | AssetValue::Invalid(_) => 0,
        })
        .sum()
}

/// Resolve `value` as asset `name` now
pub fn fold(ctx: &ResolveContext, state: &mut State, name: &str, value: &AssetValue, arity: Arity) {
    trace!(asset = name, ?arity, "resolving");
    match value {
        AssetValue::Bundle(items) => {
            let members = arity.of_bundle(items);
            for item in items {
                fold(ctx, state, name, item, members);
            }
        }
        AssetValue::Ref(target) => reference::resolve(state, name, target),
        AssetValue::Local(asset) => local::resolve(ctx, state, name, asset, arity),
        AssetValue::External(asset) => external::resolve(state, name, asset, arity.in_array()),
        AssetValue::Cdn(asset) => cdn::resolve(ctx, state, name, asset, arity.in_array()),
        AssetValue::Invalid(reason) => state.add_error(reason.message(name)),
    }
}

/// Register `value` as asset `name`, to be resolved only if something
/// depends on it. Malformed values are reported straight away.
pub fn defer(ctx: &Rc<ResolveContext>, state: &mut State, name: &str, value: &AssetValue, arity: Arity) {
    match value {
        AssetValue::Bundle(items) => {
            let members = arity.of_bundle(items);
            for item in items {
                defer(ctx, state, name, item, members);
            }
        }
        AssetValue::Invalid(reason) => state.add_error(reason.message(name)),
        other => {
            let ctx = Rc::clone(ctx);
            let owned_name = name.to_string();
            let value = other.clone();
            state.register_for_later(
                name,
                Box::new(move |state: &mut State| fold(&ctx, state, &owned_name, &value, arity)),
            );
        }
    }
}

/// Manifest key for an external or CDN asset. `true` is never allowed
/// inside an array, whatever it would match.
fn arity_aware_manifest_name(
    state: &mut State,
    name: &str,
    subname: &str,
    in_array: bool,
    setting: &ManifestSetting,
) -> Option<String> {
    let desc = if in_array {
        format!("{}:{}", name, subname)
    } else {
        name.to_string()
    };
    match setting {
        ManifestSetting::None => None,
        ManifestSetting::Derive if in_array => {
            state.add_error(format!(
                "{} requires an explicit manifest name because it's in an array.",
                desc
            ));
            None
        }
        ManifestSetting::Derive => Some(name.to_string()),
        ManifestSetting::Name(key) => Some(key.clone()),
        ManifestSetting::Template(template) => Some(render_manifest_template(template, subname)),
        ManifestSetting::Fn(f) => f(subname).filter(|key| !key.is_empty()),
        ManifestSetting::Invalid(shown) => {
            state.add_error(format!("{} has an invalid manifest: {}", desc, shown));
            None
        }
    }
}
