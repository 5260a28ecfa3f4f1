use anyhow::Result;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestEnvironment {
    temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: tempfile::tempdir()?,
        })
    }

    /// Get the temp directory path holding the test inputs
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Config file used instead of the user's own
    pub fn config_path(&self) -> PathBuf {
        self.path().join("config").join("planfuse.toml")
    }

    pub fn write_json(&self, name: &str, value: &Value) -> Result<PathBuf> {
        let path = self.path().join(name);
        fs::write(&path, serde_json::to_string_pretty(value)?)?;
        Ok(path)
    }

    pub fn write_text(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.path().join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }
}
