//! Contracts for configuration files driving a plan.

use assetplan::application::plan;
use assetplan::Config;

use crate::common::*;

fn site() -> TestEnv {
    TestEnv::new()
        .with_src("js/app.js", "console.log(1)")
        .with_src("img/a.png", "a")
        .with_src("img/b.png", "b")
}

/// CONTRACT: every asset kind in a TOML config resolves into ops, URLs
/// and manifest entries.
#[test]
fn contract_toml_site_plans() {
    let env = site();
    let config = env.load_toml(SITE_TOML);

    let state = plan::run(&config).unwrap();

    assert!(state.ok(), "{:?}", state.errors());
    let paths: Vec<&str> = state.ops().iter().map(|p| p.op.to().path()).collect();
    assert_eq!(paths, vec!["app.js", "a.png", "b.png", "manifest.json"]);
    assert_eq!(
        state.graph().unwrap().load_order("main"),
        Some(vec!["react", "app", "main"])
    );
    insta::assert_snapshot!(state.manifest().serialize().unwrap(), @r###"
    {
      "app": {
        "local": "/app.js"
      },
      "img/a": {
        "local": "/a.png"
      },
      "img/b": {
        "local": "/b.png"
      },
      "home": {
        "local": "/index.html"
      },
      "react": {
        "cdn": {
          "url": "https://cdn.example/react.js",
          "as": "script"
        }
      }
    }
    "###);
}

/// CONTRACT: relative dirs resolve against the config file, not the cwd.
#[test]
fn contract_dirs_relative_to_config_file() {
    let env = site();
    let config = env.load_toml(SITE_TOML);

    let state = plan::parse(&config);

    assert_eq!(state.src(), env.path("src"));
    assert_eq!(state.target(), env.path("dist"));
}

/// CONTRACT: JSON configs behave like TOML ones, including duplicate keys
/// being reported instead of collapsed.
#[test]
fn contract_json_config_duplicates_reported() {
    let env = site();
    env.write(
        "assetplan.json",
        r#"{
  "src": "src",
  "output": { "dir": "dist", "manifest": false },
  "assets": {
    "app": { "type": "local", "files": "js/app.js" },
    "app": { "type": "external", "path": "/x" }
  }
}"#,
    );
    let config = Config::load(&env.path("assetplan.json")).unwrap();

    let state = plan::run(&config).unwrap();

    assert_eq!(state.errors(), ["Duplicate asset: app"]);
}

/// CONTRACT: malformed assets are reported per asset, never as a load failure.
#[test]
fn contract_invalid_assets_are_plan_errors() {
    let env = site();
    let config = env.load_toml(
        r#"
src = "src"
output = { dir = "dist" }

[assets]
weird = { type = "mystery" }
number = 42
badkey = { type = "local", files = 1 }
"#,
    );

    let state = plan::parse(&config);
    let mut errors = state.errors().to_vec();
    errors.sort();

    assert_eq!(
        errors,
        vec![
            "Invalid config in badkey: files must be of type string but is number.",
            "number has an invalid value: 42",
            "weird has invalid asset type: \"mystery\"",
        ]
    );
}

/// CONTRACT: declarative plugins run in the order they are listed.
#[test]
fn contract_declarative_plugins_in_order() {
    let env = TestEnv::new().with_src("app.js", "let x = 1;");
    let config = env.load_toml(
        r#"
src = "src"
output = { dir = "dist", manifest = "assets.json" }

[assets]
app = { type = "local", files = "app.js", manifest = true }

[[plugins]]
type = "rename"
match = "^(.+)\\.js$"
replace = "$1.v1.js"

[[plugins]]
type = "replace-content"
files = "\\.v1\\.js$"
find = "let"
replace = "const"
fail_unless_change = true
"#,
    );

    let state = plan::run(&config).unwrap();

    assert!(state.ok(), "{:?}", state.errors());
    let app = state
        .ops()
        .iter()
        .find(|p| p.op.to().path() == "app.v1.js")
        .unwrap();
    assert_eq!(&*app.op.content().unwrap(), b"const x = 1;");
    assert!(state.ops().iter().any(|p| p.op.to().path() == "assets.json"));
}
