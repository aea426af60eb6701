#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! へ移行

use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn write_config(&self, name: &str, content: &serde_json::Value) -> PathBuf {
        let path = self.root.path().join(name);
        fs::write(&path, serde_json::to_string_pretty(content).unwrap()).unwrap();
        path
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    pub fn state_path(&self) -> PathBuf {
        self.root.path().join(".cloudglue").join("state.json")
    }

    /// プロジェクトをカレントディレクトリにした cloudglue コマンド
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("cloudglue").unwrap();
        cmd.current_dir(self.path())
            .env("CLOUDGLUE_CONFIG_PATH", self.path().join("cloudglue.yaml"))
            .env_remove("CLOUDGLUE_PROJECT_ROOT")
            .env_remove("AWS_REGION")
            .env_remove("AWS_PROFILE")
            .env_remove("RUST_LOG");
        cmd
    }
}
