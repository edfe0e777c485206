//! Test environment for isolated assetplan runs.
//!
//! `TestEnv` owns a temp directory laid out like a small site: source files
//! under `src/`, the config at the root, output under `dist/`.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use assetplan::Config;
use tempfile::TempDir;

/// Result of running the assetplan binary
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl From<Output> for TestResult {
    fn from(output: Output) -> Self {
        Self {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

pub struct TestEnv {
    pub root: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("src")).unwrap();
        Self { root }
    }

    /// Builder form of [`TestEnv::write_src`]
    pub fn with_src(self, path: &str, content: impl AsRef<[u8]>) -> Self {
        self.write_src(path, content);
        self
    }

    /// Write a file under `src/`
    pub fn write_src(&self, path: &str, content: impl AsRef<[u8]>) {
        self.write(&format!("src/{}", path), content);
    }

    /// Write a file relative to the root
    pub fn write(&self, path: &str, content: impl AsRef<[u8]>) {
        let path = self.path(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    pub fn dist(&self, relative: &str) -> PathBuf {
        self.path(&format!("dist/{}", relative))
    }

    pub fn read_dist(&self, relative: &str) -> String {
        std::fs::read_to_string(self.dist(relative)).unwrap()
    }

    /// A config rooted here with `src/` and `dist/`
    pub fn config(&self) -> Config {
        Config {
            src: "src".into(),
            ..Config::default()
        }
        .with_base_dir(self.root.path())
        .with_output_dir("dist")
    }

    /// Load `assetplan.toml` written into this environment
    pub fn load_toml(&self, content: &str) -> Config {
        self.write("assetplan.toml", content);
        Config::load(&self.path("assetplan.toml")).unwrap()
    }

    /// Run the binary from the root directory
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        run_in(self.root.path(), args, env_vars)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

pub fn run_in(cwd: &Path, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
    let bin = env!("CARGO_BIN_EXE_assetplan");
    let mut cmd = Command::new(bin);
    cmd.current_dir(cwd)
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("ASSETPLAN_OUTPUT_DIR")
        .env_remove("ASSETPLAN_DRY_RUN");
    for (key, value) in env_vars {
        cmd.env(key, value);
    }
    cmd.output().unwrap().into()
}
