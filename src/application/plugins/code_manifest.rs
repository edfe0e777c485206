//! Code manifest plugin
//!
//! Writes the manifest as a Scala `object` of string constants so server
//! code can refer to asset URLs without reading `manifest.json` at runtime.
//! CDN entries are left out; only locally served URLs are emitted.

use super::Plugin;
use crate::application::state::State;
use crate::error::PlanResult;

const GENERATED_BY: &str = "/** Generated by assetplan. */";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeManifest {
    /// Fully qualified object name, e.g. `app.Assets`
    object: String,
    filename: Option<String>,
    output_path: Option<String>,
}

impl CodeManifest {
    pub fn scala(object: impl Into<String>) -> Self {
        Self {
            object: object.into(),
            filename: None,
            output_path: None,
        }
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn output_path(mut self, output_path: impl Into<String>) -> Self {
        self.output_path = Some(output_path.into());
        self
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A Scala term, back-quoted unless it is a plain identifier
fn term(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        format!("`{}`", name)
    }
}

fn string_literal(s: &str) -> String {
    if s.contains(['"', '\n', '\r', '\t', '\\']) {
        format!("\"\"\"{}\"\"\"", s)
    } else {
        format!("\"{}\"", s)
    }
}

impl Plugin for CodeManifest {
    fn name(&self) -> &str {
        "code-manifest"
    }

    fn run(&self, state: &mut State) -> PlanResult<()> {
        let Some((package, object)) = self
            .object
            .rsplit_once('.')
            .filter(|(pkg, obj)| !pkg.is_empty() && !obj.is_empty())
        else {
            state.add_error(format!("Invalid object FQCN: {}", self.object));
            return Ok(());
        };

        let mut keys: Vec<&String> = state.manifest().entries().keys().collect();
        keys.sort();
        let defs: Vec<String> = keys
            .into_iter()
            .filter_map(|key| {
                let url = state.manifest().get(key)?.resolve_url(false)?;
                Some(format!("  def {} = {}", term(key), string_literal(url)))
            })
            .collect();

        let content = [
            format!("package {}", package),
            String::new(),
            GENERATED_BY.to_string(),
            format!("object {} {{", object),
            String::new(),
            defs.join("\n\n"),
            "}".to_string(),
        ]
        .join("\n");

        let filename = self
            .filename
            .clone()
            .unwrap_or_else(|| format!("{}.scala", object));
        let path = match &self.output_path {
            Some(dir) => format!("{}/{}", dir.trim_end_matches('/'), filename),
            None => filename,
        };
        state.add_op_write(&path, content, None);
        Ok(())
    }
}
