#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::path::Path;
use tempfile::TempDir;

pub fn sc() -> Command {
    cargo_bin_cmd!("stencil-control")
}

/// Scratch directory holding both databases of one test.
pub struct TestDbs {
    pub dir: TempDir,
    pub stencil: String,
    pub cred: String,
}

impl TestDbs {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let stencil = path_str(&dir.path().join("stencil.sqlite"));
        let cred = path_str(&dir.path().join("credenciales.sqlite"));
        Self { dir, stencil, cred }
    }

    /// Command with both database overrides and test mode.
    pub fn cmd(&self) -> Command {
        let mut cmd = sc();
        cmd.args(["--stencil-db", &self.stencil, "--cred-db", &self.cred, "--test"]);
        cmd
    }

    pub fn out(&self, name: &str) -> String {
        path_str(&self.dir.path().join(name))
    }

    /// Initialize both databases (creates tables).
    pub fn init(&self) {
        self.cmd().arg("init").assert().success();
    }
}

fn path_str(p: &Path) -> String {
    p.to_string_lossy().to_string()
}
