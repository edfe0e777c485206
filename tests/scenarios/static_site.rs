//! Scenario: a small site with hashed scripts, images and a manifest.

use assetplan::application::{execute, plan, ExecuteOptions, Inline};
use assetplan::domain::entities::ManifestEntry;
use assetplan::infrastructure::LocalFs;

use crate::common::*;

const CONFIG: &str = r#"
src = "src"

[output]
dir = "dist"
name = "[path]/[name]-[hash:8].[ext]"

[assets]
app = { type = "local", files = "js/app.js", manifest = true }
logo = { type = "local", files = "img/logo.svg", output_name = "[basename]", manifest = "logo" }
"#;

fn site() -> TestEnv {
    TestEnv::new()
        .with_src("js/app.js", DATA)
        .with_src("img/logo.svg", "<svg/>")
}

#[test]
fn scenario_build_writes_hashed_files_and_manifest() {
    let env = site();
    let config = env.load_toml(CONFIG);

    let state = plan::run(&config).unwrap();
    assert!(state.ok(), "{:?}", state.errors());
    let results = state.into_results();
    let report = execute::execute(&results, &LocalFs::new(), &ExecuteOptions::default());

    assert!(report.ok(), "{:?}", report.errors);
    assert_eq!(report.files, 3);
    let hashed = format!("js/app-{}.js", &DATA_SHA256_HEX[..8]);
    assert_eq!(env.read_dist(&hashed), DATA);
    assert_eq!(env.read_dist("logo.svg"), "<svg/>");

    let manifest: serde_json::Value =
        serde_json::from_str(&env.read_dist("manifest.json")).unwrap();
    assert_eq!(manifest["app"]["local"], format!("/{}", hashed));
    assert_eq!(manifest["logo"]["local"], "/logo.svg");
}

#[test]
fn scenario_dry_run_writes_nothing() {
    let env = site();
    let config = env.load_toml(CONFIG);

    let results = plan::run(&config).unwrap().into_results();
    let report = execute::execute(
        &results,
        &LocalFs::new(),
        &ExecuteOptions::default().dry_run(true),
    );

    assert_eq!(report.files, 3);
    assert!(!env.path("dist").exists());
}

#[test]
fn scenario_execution_order_is_stable() {
    let env = site();
    let config = env.load_toml(CONFIG);
    let fs = MemFs::new();

    let results = plan::run(&config).unwrap().into_results();
    execute::execute(&results, &fs, &ExecuteOptions::default());

    // Copies by source path (img/ before js/), then writes by path
    let hashed = format!("copy app-{}.js", &DATA_SHA256_HEX[..8]);
    assert_eq!(
        *fs.log.borrow(),
        vec!["copy logo.svg".to_string(), hashed, "write manifest.json".to_string()]
    );
}

#[test]
fn scenario_small_images_are_inlined() {
    let env = site();
    let config = env.load_toml(CONFIG).with_plugin(Inline::max_size(6, None));

    let state = plan::run(&config).unwrap();

    assert!(state.ok(), "{:?}", state.errors());
    assert!(state.ops().iter().all(|p| p.op.to().path() != "logo.svg"));
    match state.manifest().get("logo") {
        Some(ManifestEntry::Url(entry)) => {
            assert_eq!(entry.url, "data:image/svg+xml;base64,PHN2Zy8+")
        }
        other => panic!("expected an inlined url, got {:?}", other),
    }
}
