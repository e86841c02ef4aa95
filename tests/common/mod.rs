#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use flow_core::{
    config::ConfigManager,
    core::FlowManager,
    storage::JsonStorage,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Creates an isolated manager and config manager sharing one base directory.
pub fn setup_test_env() -> (FlowManager, ConfigManager, PathBuf) {
    let base = temp_base();
    let config_manager =
        ConfigManager::with_base_dir(base.clone()).expect("create config manager for temp dir");
    let storage = JsonStorage::new(base.join("data"), Some(3)).expect("create json storage");
    let manager = FlowManager::open(Box::new(storage), Default::default()).expect("open manager");
    (manager, config_manager, base)
}
