//! Scenario: HTML pages pulling in their scripts and styles.

use assetplan::application::{execute, plan, ExecuteOptions};
use assetplan::infrastructure::LocalFs;

use crate::common::*;

const CONFIG: &str = r#"
src = "src"
output = { dir = "dist" }

[assets]
app = { type = "local", files = "js/app.js", manifest = true }
style = { type = "local", files = "css/site.css" }
main = ["app", "style"]
pages = { type = "local", files = "*.html" }

[[plugins]]
type = "html"
"#;

fn site(page: &str) -> TestEnv {
    TestEnv::new()
        .with_src("js/app.js", "app()")
        .with_src("css/site.css", "body {}")
        .with_src("index.html", page)
}

fn page_output(state: &assetplan::State) -> String {
    let op = state
        .ops()
        .iter()
        .find(|p| p.op.to().path() == "index.html")
        .unwrap();
    String::from_utf8(op.op.content().unwrap().into_owned()).unwrap()
}

#[test]
fn scenario_require_expands_to_load_tags() {
    let env = site(
        "<head><require asset=\"main\"/></head>\
         <body><a href=\"assetplan://manifest/app\">app</a></body>",
    );
    let config = env.load_toml(CONFIG);

    let state = plan::run(&config).unwrap();

    assert!(state.ok(), "{:?}", state.errors());
    assert_eq!(
        page_output(&state),
        "<head><script src=\"/app.js\"></script>\n\
         <link rel=\"stylesheet\" href=\"/site.css\"></head>\
         <body><a href=\"/app.js\">app</a></body>"
    );
}

#[test]
fn scenario_rewritten_page_is_written_to_disk() {
    let env = site("<require asset=\"app\"/>");
    let config = env.load_toml(CONFIG);

    let results = plan::run(&config).unwrap().into_results();
    let report = execute::execute(&results, &LocalFs::new(), &ExecuteOptions::default());

    assert!(report.ok(), "{:?}", report.errors);
    assert_eq!(env.read_dist("index.html"), "<script src=\"/app.js\"></script>");
    assert_eq!(env.read_dist("app.js"), "app()");
}

#[test]
fn scenario_bad_references_are_reported_per_page() {
    let env = site("<require asset=\"nope\"/><img src=\"assetplan://manifest/logo\">");
    let config = env.load_toml(CONFIG);

    let state = plan::run(&config).unwrap();

    assert_eq!(
        state.errors(),
        [
            "index.html: Asset referenced in <require/> not found: nope",
            "index.html: Manifest entry not found: logo",
        ]
    );
    assert!(state
        .ops()
        .iter()
        .all(|p| p.op.to().path() != "manifest.json"));
}
