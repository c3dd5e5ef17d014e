use assert_cmd::{cargo::cargo_bin_cmd, Command};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get a Command for zettelflow, isolated from the user's environment
pub fn zettelflow(config_dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("zettelflow");
    cmd.env_remove("ZETTELFLOW_VAULT")
        .env_remove("ZETTELFLOW_LLM_URL")
        .env_remove("ZETTELFLOW_LLM_MODEL")
        .env_remove("ZETTELFLOW_LLM_TIMEOUT")
        .env_remove("RUST_LOG")
        .env("ZETTELFLOW_CONFIG_DIR", config_dir);
    cmd
}

/// A vault under a temp dir, initialized and with LLM calls disabled
pub struct TestVault {
    pub dir: TempDir,
}

impl TestVault {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let vault = Self { dir };
        vault.cmd().arg("init").assert().success();
        fs::write(
            vault.root().join(".zettelflow.toml"),
            "[llm]\nenabled = false\n",
        )
        .unwrap();
        vault
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().join("vault")
    }

    /// Command bound to this vault
    pub fn cmd(&self) -> Command {
        let mut cmd = zettelflow(&self.dir.path().join("global-config"));
        cmd.arg("--vault").arg(self.root());
        cmd
    }

    pub fn write(&self, dir: &str, name: &str, content: &str) -> PathBuf {
        let path = self.root().join(dir).join(name);
        fs::write(&path, content).unwrap();
        path
    }

    pub fn read(&self, dir: &str, name: &str) -> String {
        fs::read_to_string(self.root().join(dir).join(name)).unwrap()
    }
}

/// Parse the stdout of a `--format json` run
#[allow(dead_code)]
pub fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

/// Every file under `root` with its bytes
#[allow(dead_code)]
pub fn snapshot(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let bytes = fs::read(&path).unwrap();
                files.push((path, bytes));
            }
        }
    }
    files.sort();
    files
}
