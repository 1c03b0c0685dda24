use assert_cmd::{cargo::cargo_bin_cmd, Command};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch area holding a project tree (`proj/`), the archive location
/// (`out/`), a key file and a configuration file.
pub struct Workspace {
    pub temp: TempDir,
}

#[allow(dead_code)]
impl Workspace {
    pub fn new(files: &[(&str, &str)]) -> Self {
        let temp = TempDir::new().expect("failed to create temp dir");
        let ws = Self { temp };
        fs::create_dir_all(ws.select()).expect("failed to create project dir");
        for (name, content) in files {
            ws.write(name, content);
        }
        ws
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn select(&self) -> PathBuf {
        self.root().join("proj")
    }

    pub fn archive(&self) -> PathBuf {
        self.root().join("out")
    }

    pub fn key_file(&self) -> PathBuf {
        self.root().join("test.key")
    }

    /// Write a file inside the project tree.
    pub fn write(&self, name: &str, content: &str) {
        let path = self.select().join(name);
        fs::create_dir_all(path.parent().unwrap()).expect("failed to create parent dir");
        fs::write(path, content).expect("failed to write project file");
    }

    /// Write a configuration document and return its path.
    pub fn config(&self, body: serde_json::Value) -> PathBuf {
        let path = self.root().join("seal.json");
        fs::write(&path, body.to_string()).expect("failed to write config");
        path
    }

    /// Standard configuration selecting `proj/` into `out/`.
    pub fn default_config(&self, except: &[&str]) -> PathBuf {
        self.config(serde_json::json!({
            "select": self.select().to_str().unwrap(),
            "archive": self.archive().to_str().unwrap(),
            "except": except,
        }))
    }

    /// Write a fixed test key and return its path.
    pub fn write_key(&self) -> PathBuf {
        let path = self.key_file();
        fs::write(&path, [0x42u8; 32]).expect("failed to write key");
        path
    }
}

/// Convenience helper for spawning the srcseal binary via assert_cmd.
#[allow(dead_code)]
pub fn srcseal_cmd() -> Command {
    let mut cmd = cargo_bin_cmd!("srcseal");
    cmd.env_remove("SRCSEAL_KEY_FILE").env_remove("RUST_LOG");
    cmd
}

/// Convenience helper for spawning the single-file binary.
#[allow(dead_code)]
pub fn srcseal_file_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_srcseal-file"));
    cmd.env_remove("SRCSEAL_KEY_FILE");
    cmd
}
