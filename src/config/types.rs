//! Configuration type definitions

use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::Deserialize;

use crate::application::plugins::Plugin;
use crate::domain::entities::AssetTable;
use crate::domain::services::NameOptions;
use crate::domain::value_objects::HashAlgo;
use crate::error::PlanResult;

use super::loader::{self, ConfigWarning};

/// Where (and whether) to write the manifest
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ManifestOutput {
    Enabled(bool),
    File(String),
}

impl Default for ManifestOutput {
    fn default() -> Self {
        ManifestOutput::Enabled(true)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Target directory; required
    #[serde(default)]
    pub dir: Option<String>,

    /// Default output filename template for local assets
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default)]
    pub manifest: ManifestOutput,

    /// Algorithm behind `[hash]`
    #[serde(default)]
    pub hash_algo: HashAlgo,

    /// Width of `[hash]` when none is given
    #[serde(default = "default_hash_width")]
    pub hash_width: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            name: default_name(),
            manifest: ManifestOutput::default(),
            hash_algo: HashAlgo::default(),
            hash_width: default_hash_width(),
        }
    }
}

impl OutputConfig {
    /// Manifest filename, or `None` when disabled
    pub fn manifest_file(&self) -> Option<&str> {
        match &self.manifest {
            ManifestOutput::Enabled(true) => Some("manifest.json"),
            ManifestOutput::Enabled(false) => None,
            ManifestOutput::File(name) => Some(name),
        }
    }

    pub fn name_options(&self) -> NameOptions {
        NameOptions {
            default_hash_algo: self.hash_algo,
            default_hash_width: self.hash_width,
        }
    }
}

fn default_name() -> String {
    "[basename]".to_string()
}

fn default_hash_width() -> usize {
    32
}

fn default_src() -> String {
    ".".to_string()
}

fn default_html_files() -> String {
    r"\.html$".to_string()
}

/// A plugin described in the config file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PluginSpec {
    /// Rename files whose path matches `pattern`
    Rename {
        #[serde(rename = "match")]
        pattern: String,
        replace: String,
    },
    /// Regex find/replace over the content of matching files
    ReplaceContent {
        files: String,
        find: String,
        replace: String,
        #[serde(default)]
        fail_unless_change: bool,
    },
    /// Rewrite `assetplan://manifest/NAME` references in matching files
    ManifestUrls { files: String },
    /// Inline files up to `max_size` bytes as `data:` URLs
    Inline {
        max_size: u64,
        #[serde(default)]
        mime: Option<String>,
    },
    Html {
        #[serde(default = "default_html_files")]
        files: String,
    },
    CodeManifest {
        object: String,
        #[serde(default)]
        filename: Option<String>,
        #[serde(default)]
        output_path: Option<String>,
    },
}

/// Main configuration structure
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Source directory, relative to the config file
    #[serde(default = "default_src")]
    pub src: String,

    #[serde(default)]
    pub output: OutputConfig,

    /// Required assets
    #[serde(default)]
    pub assets: AssetTable,

    /// Assets only built when something depends on them
    #[serde(default)]
    pub optional: AssetTable,

    #[serde(default)]
    pub plugins: Vec<PluginSpec>,

    /// Directory relative paths are resolved against; the working
    /// directory when unset
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,

    /// Plugins supplied from code, run after the declarative ones
    #[serde(skip)]
    pub extra_plugins: Vec<Rc<dyn Plugin>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            src: default_src(),
            output: OutputConfig::default(),
            assets: AssetTable::new(),
            optional: AssetTable::new(),
            plugins: Vec::new(),
            base_dir: None,
            extra_plugins: Vec::new(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("src", &self.src)
            .field("output", &self.output)
            .field("assets", &self.assets)
            .field("optional", &self.optional)
            .field("plugins", &self.plugins)
            .field("base_dir", &self.base_dir)
            .field("extra_plugins", &self.extra_plugins.len())
            .finish()
    }
}

impl Config {
    /// Load configuration from a TOML or JSON file
    pub fn load(path: &Path) -> PlanResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> PlanResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Apply environment variable overrides (ASSETPLAN_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self)
    }

    pub fn with_output_dir(mut self, dir: impl Into<String>) -> Self {
        self.output.dir = Some(dir.into());
        self
    }

    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn with_plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.extra_plugins.push(Rc::new(plugin));
        self
    }

    /// Declarative plugins followed by programmatic ones, in run order
    pub fn build_plugins(&self) -> PlanResult<Vec<Rc<dyn Plugin>>> {
        let mut plugins = self
            .plugins
            .iter()
            .map(PluginSpec::build)
            .collect::<PlanResult<Vec<_>>>()?;
        plugins.extend(self.extra_plugins.iter().cloned());
        Ok(plugins)
    }
}
