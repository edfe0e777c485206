//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{PlanError, PlanResult};

use super::types::Config;

/// File names [`discover`] looks for, in order
pub const CONFIG_FILES: [&str; 2] = ["assetplan.toml", "assetplan.json"];

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown config key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
///
/// TOML unless the file ends in `.json`. `base_dir` is set to the file's
/// directory so relative `src` / `output.dir` resolve against it.
pub fn load_with_warnings(path: &Path) -> PlanResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;
    let invalid = |message: String| PlanError::InvalidConfig {
        file: path.to_path_buf(),
        message,
    };

    let mut unknown_paths: Vec<String> = Vec::new();
    let mut config: Config = if is_json(path) {
        let mut deserializer = serde_json::Deserializer::from_str(&content);
        serde_ignored::deserialize(&mut deserializer, |p| unknown_paths.push(p.to_string()))
            .map_err(|e| invalid(e.to_string()))?
    } else {
        let deserializer = toml::de::Deserializer::new(&content);
        serde_ignored::deserialize(deserializer, |p| unknown_paths.push(p.to_string()))
            .map_err(|e| invalid(e.to_string()))?
    };

    let base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    debug!(config = %path.display(), base_dir = %base_dir.display(), "loaded config");
    config.base_dir = Some(base_dir);

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Find the config file in `dir`
pub fn discover(dir: &Path) -> PlanResult<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| PlanError::ConfigNotFound {
            dir: dir.to_path_buf(),
        })
}

/// Apply environment variable overrides (ASSETPLAN_* prefix)
pub fn with_env_overrides(mut config: Config) -> Config {
    // ASSETPLAN_OUTPUT_DIR
    if let Ok(dir) = std::env::var("ASSETPLAN_OUTPUT_DIR") {
        if !dir.is_empty() {
            config.output.dir = Some(dir);
        }
    }
    config
}

/// ASSETPLAN_DRY_RUN: anything but empty, `0` or `false` enables dry-run
pub fn dry_run_from_env() -> bool {
    std::env::var("ASSETPLAN_DRY_RUN")
        .map(|val| !val.is_empty() && val != "0" && !val.eq_ignore_ascii_case("false"))
        .unwrap_or(false)
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "src",
        "output",
        "dir",
        "name",
        "manifest",
        "hash_algo",
        "hash_width",
        "assets",
        "optional",
        "plugins",
        "type",
        "files",
        "find",
        "replace",
        "match",
        "fail_unless_change",
        "max_size",
        "mime",
        "object",
        "filename",
        "output_path",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] =
                std::cmp::min(std::cmp::min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
