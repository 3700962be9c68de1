//! Shared harness for texkit CLI tests.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Isolated thesis project for one CLI exercise.
#[allow(dead_code)]
pub struct TestContext {
    root: TempDir,
    thesis_dir: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let root = TempDir::new().expect("failed to create temp directory for tests");
        let thesis_dir = root.path().join("thesis");
        fs::create_dir_all(&thesis_dir).expect("failed to create thesis directory");
        Self { root, thesis_dir }
    }

    pub fn thesis_dir(&self) -> &Path {
        &self.thesis_dir
    }

    /// Absolute path below the thesis directory.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.thesis_dir.join(rel)
    }

    /// Command for the compiled binary, invoked inside the thesis directory.
    pub fn cli(&self) -> Command {
        self.cli_in(&self.thesis_dir)
    }

    /// Same, but invoked from an arbitrary directory. `HOME` and
    /// `XDG_CONFIG_HOME` point into the sandbox so a user-level config on
    /// the host never leaks into a test.
    pub fn cli_in<P: AsRef<Path>>(&self, dir: P) -> Command {
        let mut cmd = Command::cargo_bin("texkit").expect("failed to locate texkit binary");
        cmd.current_dir(dir.as_ref())
            .env("HOME", self.root.path())
            .env("XDG_CONFIG_HOME", self.root.path().join(".config"));
        cmd
    }

    /// Write a file below the thesis directory, creating parents as needed.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent directories");
        }
        fs::write(&path, content).expect("failed to write fixture file");
        path
    }

    pub fn mkdir(&self, rel: &str) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(&path).expect("failed to create fixture directory");
        path
    }
}
