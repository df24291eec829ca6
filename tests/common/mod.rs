#![allow(dead_code)]

use std::{path::Path, path::PathBuf, sync::Mutex};

use assert_cmd::Command;
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub const OWNER: &str = "0244123456";

/// Creates an isolated application home for one test.
pub fn test_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// The shell in script mode, pinned to `home`, the test owner and `now`.
pub fn script_command(home: &Path, now: &str) -> Command {
    let mut cmd = Command::cargo_bin("momo_budget_cli").expect("binary");
    cmd.env("MOMO_BUDGET_CLI_SCRIPT", "1")
        .env("MOMO_BUDGET_HOME", home)
        .env("MOMO_BUDGET_OWNER", OWNER)
        .env("MOMO_BUDGET_NOW", now)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}
