//! Reusable test content

/// File content whose digests are pinned below
pub const DATA: &str = "12345678";

pub const DATA_SHA256_HEX: &str =
    "ef797c8118f02dfb649607dd5d3f8c7623048c9c063d532cc95c5ed7a898a64f";
pub const DATA_MD5_HEX: &str = "25d55ad283aa400af464c76d713c07ad";
pub const DATA_SHA256_SRI: &str = "sha256-73l8gRjwLftklgfdXT+MdiMEjJwGPVMsyVxe16iYpk8=";
pub const DATA_SHA384_SRI: &str =
    "sha384-jK/tIjU4bMWFXnXw008QPMwYORLl8CRGt3xmU593bkvyv4czm0UYp8scJEHFaLD4";

/// A small site config exercising every asset kind
pub const SITE_TOML: &str = r#"
src = "src"

[output]
dir = "dist"

[assets]
app = { type = "local", files = "js/app.js", manifest = true }
images = { type = "local", files = "img/*.png", manifest = { template = "img/[name]" } }
home = { type = "external", path = "index.html", manifest = "home" }
react = { type = "cdn", url = "https://cdn.example/react.js", as = "script", manifest = "react" }
main = ["react", "app"]
"#;
