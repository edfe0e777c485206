//! Plugins built from `[[plugins]]` config entries

use std::rc::Rc;

use regex::Regex;

use super::{CodeManifest, Html, Inline, ManifestUrls, Modify, Plugin};
use crate::config::PluginSpec;
use crate::error::{PlanError, PlanResult};

impl PluginSpec {
    /// Name of the `type` tag this spec was declared with
    pub fn kind(&self) -> &'static str {
        match self {
            PluginSpec::Rename { .. } => "rename",
            PluginSpec::ReplaceContent { .. } => "replace-content",
            PluginSpec::ManifestUrls { .. } => "manifest-urls",
            PluginSpec::Inline { .. } => "inline",
            PluginSpec::Html { .. } => "html",
            PluginSpec::CodeManifest { .. } => "code-manifest",
        }
    }

    pub fn build(&self) -> PlanResult<Rc<dyn Plugin>> {
        let regex = |pattern: &str| {
            Regex::new(pattern).map_err(|e| PlanError::InvalidPlugin {
                plugin: self.kind().to_string(),
                message: e.to_string(),
            })
        };

        Ok(match self {
            PluginSpec::Rename { pattern, replace } => {
                let re = regex(pattern)?;
                let replace = replace.clone();
                Rc::new(Modify::rename(re.clone(), move |filename| {
                    re.replace_all(filename, replace.as_str()).into_owned()
                }))
            }
            PluginSpec::ReplaceContent {
                files,
                find,
                replace,
                fail_unless_change,
            } => {
                let find = regex(find)?;
                let replace = replace.clone();
                Rc::new(Modify::content(
                    regex(files)?,
                    move |content| find.replace_all(content, replace.as_str()).into_owned(),
                    *fail_unless_change,
                ))
            }
            PluginSpec::ManifestUrls { files } => Rc::new(ManifestUrls::matching(regex(files)?)?),
            PluginSpec::Inline { max_size, mime } => {
                Rc::new(Inline::max_size(*max_size, mime.clone()))
            }
            PluginSpec::Html { files } => Rc::new(Html::matching(regex(files)?)?),
            PluginSpec::CodeManifest {
                object,
                filename,
                output_path,
            } => {
                let mut plugin = CodeManifest::scala(object.clone());
                if let Some(filename) = filename {
                    plugin = plugin.filename(filename.clone());
                }
                if let Some(output_path) = output_path {
                    plugin = plugin.output_path(output_path.clone());
                }
                Rc::new(plugin)
            }
        })
    }
}
