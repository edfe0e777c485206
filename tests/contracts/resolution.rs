//! Contracts for asset resolution: names, references, optional activation,
//! cycles and manifest naming.

use assetplan::application::plan;
use assetplan::Config;
use assetplan::domain::entities::{
    AssetTable, AssetValue, CdnAsset, ExternalAsset, Integrity, LocalAsset, ManifestEntry,
    ManifestSetting, Validator,
};

use crate::common::*;

fn bundle(items: Vec<AssetValue>) -> AssetValue {
    AssetValue::Bundle(items)
}

/// TOML rejects repeated keys while parsing, JSON hands them through
fn load_json(env: &TestEnv, content: &str) -> Config {
    env.write("assetplan.json", content);
    Config::load(&env.path("assetplan.json")).unwrap()
}

/// CONTRACT: a name declared in both tables is reported exactly once.
#[test]
fn contract_duplicate_name_reported_once() {
    let env = TestEnv::new().with_src("a.js", "a");
    let mut config = env.config();
    config.optional = AssetTable::new().with("a", LocalAsset::new("a.js"));
    config.assets = AssetTable::new().with("a", LocalAsset::new("a.js"));

    let state = plan::run(&config).unwrap();

    assert_eq!(state.errors(), ["Duplicate asset: a"]);
}

/// CONTRACT: optional assets are only built when something depends on them.
#[test]
fn contract_optional_assets_activate_on_demand() {
    let env = TestEnv::new()
        .with_src("b.js", "b")
        .with_src("unused.js", "u");
    let mut config = env.config();
    config.optional = AssetTable::new()
        .with("b", LocalAsset::new("b.js"))
        .with("unused", LocalAsset::new("unused.js"));
    config.assets = AssetTable::new().with("a", "b");

    let state = plan::run(&config).unwrap();

    assert!(state.ok(), "{:?}", state.errors());
    let paths: Vec<&str> = state.ops().iter().map(|p| p.op.to().path()).collect();
    assert_eq!(paths, vec!["b.js", "manifest.json"]);
    assert_eq!(state.graph().unwrap().load_order("a"), Some(vec!["b", "a"]));
    assert!(!state.is_registered("unused"));
}

/// CONTRACT: two required assets with one name are reported once, and the
/// first declaration wins.
#[test]
fn contract_duplicate_required_names() {
    let env = TestEnv::new().with_src("a.js", "a").with_src("b.js", "b");
    let config = load_json(
        &env,
        r#"{
  "src": "src",
  "output": { "dir": "dist", "manifest": false },
  "assets": {
    "app": { "type": "local", "files": "a.js" },
    "app": { "type": "local", "files": "b.js" }
  }
}"#,
    );

    let state = plan::parse(&config);

    assert_eq!(state.errors(), ["Duplicate asset: app"]);
    assert_eq!(state.urls("app")[0].url, "/a.js");
}

/// CONTRACT: two optional assets with one name are reported once, whether
/// or not anything depends on them.
#[test]
fn contract_duplicate_optional_names() {
    let env = TestEnv::new().with_src("a.js", "a").with_src("b.js", "b");
    let config = load_json(
        &env,
        r#"{
  "src": "src",
  "output": { "dir": "dist", "manifest": false },
  "optional": {
    "lib": { "type": "local", "files": "a.js" },
    "lib": { "type": "local", "files": "b.js" }
  },
  "assets": { "main": "lib" }
}"#,
    );

    let state = plan::parse(&config);

    assert_eq!(state.errors(), ["Duplicate asset: lib"]);
}

/// CONTRACT: an activated optional asset gets its manifest entry; nothing
/// else is planned.
#[test]
fn contract_optional_asset_with_manifest() {
    let env = TestEnv::new().with_src("x.js", "x");
    let mut config = env.config();
    config.optional =
        AssetTable::new().with("b", LocalAsset::new("x.js").manifest(ManifestSetting::Derive));
    config.assets = AssetTable::new().with("a", "b");

    let state = plan::parse(&config);

    assert!(state.ok(), "{:?}", state.errors());
    assert_eq!(state.ops().len(), 1);
    assert_eq!(state.ops()[0].op.to().path(), "x.js");
    assert_eq!(state.manifest().len(), 1);
    assert_eq!(
        state.manifest().get("b"),
        Some(&ManifestEntry::Local("/x.js".to_string()))
    );
}

/// CONTRACT: optional assets activate transitively through other optionals.
#[test]
fn contract_optional_chain_activates() {
    let env = TestEnv::new().with_src("c.js", "c");
    let mut config = env.config();
    config.optional = AssetTable::new()
        .with("b", "c")
        .with("c", LocalAsset::new("c.js"));
    config.assets = AssetTable::new().with("a", "b");

    let state = plan::run(&config).unwrap();

    assert!(state.ok(), "{:?}", state.errors());
    assert_eq!(
        state.graph().unwrap().load_order("a"),
        Some(vec!["c", "b", "a"])
    );
}

/// CONTRACT: a reference to a name nobody declared is an error.
#[test]
fn contract_unspecified_reference() {
    let env = TestEnv::new();
    let mut config = env.config();
    config.assets = AssetTable::new().with("a", "ghost");

    let state = plan::run(&config).unwrap();

    assert_eq!(state.errors(), ["a referenced an unspecified asset: ghost"]);
}

/// CONTRACT: cycles are reported and leave no graph behind.
#[test]
fn contract_cycle_has_no_graph() {
    let env = TestEnv::new();
    let mut config = env.config();
    config.assets = AssetTable::new().with("a", "b").with("b", "a");

    let state = plan::run(&config).unwrap();

    assert_eq!(state.errors(), ["Circular dependency on asset: a"]);
    assert!(state.graph().is_none());
    assert!(state.ops().is_empty());
}

/// CONTRACT: bundles keep member order in the load order.
#[test]
fn contract_bundle_members_load_in_order() {
    let env = TestEnv::new().with_src("x.js", "x");
    let mut config = env.config();
    config.assets = AssetTable::new()
        .with("x", LocalAsset::new("x.js"))
        .with("y", ExternalAsset::new("/y.js"))
        .with("main", bundle(vec!["y".into(), "x".into()]));

    let state = plan::run(&config).unwrap();

    assert!(state.ok(), "{:?}", state.errors());
    assert_eq!(
        state.graph().unwrap().load_order("main"),
        Some(vec!["y", "x", "main"])
    );
}

/// CONTRACT: `manifest = true` on a local glob needs exactly one match.
#[test]
fn contract_manifest_true_single_match_only() {
    let env = TestEnv::new().with_src("a.js", "a").with_src("b.js", "b");
    let mut config = env.config();
    config.assets = AssetTable::new()
        .with("one", LocalAsset::new("a.js").manifest(ManifestSetting::Derive))
        .with("many", LocalAsset::new("*.js").manifest(ManifestSetting::Derive));

    let state = plan::run(&config).unwrap();

    assert_eq!(
        state.errors(),
        ["many has {manifest: true} but '*.js' matches more than 1 file."]
    );
}

/// CONTRACT: in an array, the one local member with `manifest = true` and
/// a single match may derive its name, but external and CDN entries never
/// can.
#[test]
fn contract_manifest_true_in_arrays() {
    let env = TestEnv::new().with_src("a.js", "a");
    let mut config = env.config();
    config.assets = AssetTable::new()
        .with(
            "group",
            bundle(vec![
                LocalAsset::new("a.js")
                    .manifest(ManifestSetting::Derive)
                    .into(),
                ExternalAsset::new("/vendor.js").into(),
            ]),
        )
        .with(
            "cdn",
            bundle(vec![CdnAsset::new("https://cdn.example/x.js")
                .manifest(ManifestSetting::Derive)
                .into()]),
        );

    let state = plan::parse(&config);

    assert_eq!(
        state.errors(),
        ["cdn:https://cdn.example/x.js requires an explicit manifest name because it's in an array."]
    );
    assert_eq!(
        state.manifest().get("group"),
        Some(&ManifestEntry::Local("/a.js".to_string()))
    );
}

/// CONTRACT: several bundle members deriving the bundle's name is an
/// error, even when each matches a single file.
#[test]
fn contract_manifest_true_shared_by_bundle_members() {
    let env = TestEnv::new().with_src("a.js", "a").with_src("b.js", "b");
    let mut config = env.config();
    config.assets = AssetTable::new().with(
        "group",
        bundle(vec![
            LocalAsset::new("a.js")
                .manifest(ManifestSetting::Derive)
                .into(),
            bundle(vec![LocalAsset::new("b.js")
                .manifest(ManifestSetting::Derive)
                .into()]),
        ]),
    );

    let mut state = plan::parse(&config);

    assert_eq!(
        state.errors(),
        [
            "group has {manifest: true} but requires an explicit name or function.",
            "group has {manifest: true} but requires an explicit name or function.",
        ]
    );
    assert!(state.manifest().get("group").is_none());
    assert!(state.warnings().is_empty());
}

/// CONTRACT: the same rule holds for optional bundles once activated.
#[test]
fn contract_manifest_true_shared_in_optional_bundle() {
    let env = TestEnv::new().with_src("a.js", "a").with_src("b.js", "b");
    let mut config = env.config();
    config.optional = AssetTable::new().with(
        "group",
        bundle(vec![
            LocalAsset::new("a.js")
                .manifest(ManifestSetting::Derive)
                .into(),
            LocalAsset::new("b.js")
                .manifest(ManifestSetting::Derive)
                .into(),
        ]),
    );
    config.assets = AssetTable::new().with("main", "group");

    let state = plan::parse(&config);

    assert_eq!(state.errors().len(), 2);
    assert!(state.ops().is_empty());
}

/// CONTRACT: validation failures name the asset and glob, and stop it.
#[test]
fn contract_validation_messages() {
    let env = TestEnv::new().with_src("js/a.js", "a");
    let mut config = env.config();
    config.assets = AssetTable::new()
        .with("none", LocalAsset::new("*.css"))
        .with(
            "bounded",
            LocalAsset::new("*.js")
                .src("js")
                .validate(Validator::Count {
                    min: Some(2),
                    max: None,
                }),
        )
        .with(
            "anything",
            LocalAsset::new("*.css").validate(Validator::Disabled),
        );

    let mut state = plan::parse(&config);
    let mut errors = state.errors().to_vec();
    errors.sort();

    assert_eq!(
        errors,
        vec![
            "bounded:js/*.js - Expected at least 2 files, found 1.",
            "none:*.css - 0 files found.",
        ]
    );
    assert!(state.warnings().is_empty());
}

/// CONTRACT: CDN integrity is computed per algorithm, then per file.
#[test]
fn contract_cdn_integrity_from_files() {
    let env = TestEnv::new().with_src("vendor/lib.js", DATA);
    let mut config = env.config();
    config.assets = AssetTable::new().with(
        "lib",
        CdnAsset::new("https://cdn.example/lib.js")
            .integrity(Integrity::from_files("vendor/*.js", &["sha384", "sha256"]))
            .manifest(ManifestSetting::Derive),
    );

    let state = plan::parse(&config);

    assert!(state.ok(), "{:?}", state.errors());
    let url = &state.urls("lib")[0];
    assert_eq!(
        url.integrity.as_deref(),
        Some(format!("{} {}", DATA_SHA384_SRI, DATA_SHA256_SRI).as_str())
    );
    assert!(state.ops().is_empty());
}

/// CONTRACT: content hashes in output names are the hex digest, truncated.
#[test]
fn contract_hashed_output_names() {
    let env = TestEnv::new().with_src("app.js", DATA);
    let mut config = env.config();
    config.assets = AssetTable::new()
        .with("a", LocalAsset::new("app.js").output_name("[name]-[hash:8].[ext]"))
        .with("b", LocalAsset::new("app.js").output_name("[md5].[ext]"));

    let state = plan::parse(&config);

    assert!(state.ok(), "{:?}", state.errors());
    let paths: Vec<&str> = state.ops().iter().map(|p| p.op.to().path()).collect();
    let expected_a = format!("app-{}.js", &DATA_SHA256_HEX[..8]);
    let expected_b = format!("{}.js", DATA_MD5_HEX);
    assert_eq!(paths, vec![expected_a.as_str(), expected_b.as_str()]);
}

/// CONTRACT: transitive assets keep their relative layout and are marked.
#[test]
fn contract_transitive_keeps_layout() {
    let env = TestEnv::new().with_src("fonts/a.woff", "f");
    let mut config = env.config();
    config.assets =
        AssetTable::new().with("fonts", LocalAsset::new("fonts/*").transitive(true));

    let state = plan::parse(&config);

    assert_eq!(state.ops()[0].op.to().path(), "fonts/a.woff");
    assert!(state.ops()[0].op.is_transitive());
    assert!(state.urls("fonts")[0].is_transitive());
}
