use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const APP_DIR: &str = ".waypoint";
pub const STATE_FILE: &str = "state.json";
pub const CONFIG_FILE: &str = "config.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn app_dir(root: &Path) -> PathBuf {
    root.join(APP_DIR)
}

pub fn state_path(root: &Path) -> PathBuf {
    app_dir(root).join(STATE_FILE)
}

pub fn config_path(root: &Path) -> PathBuf {
    app_dir(root).join(CONFIG_FILE)
}

/// Express `path` relative to `root` when it lives under it, otherwise return it
/// unchanged. Used to keep `files_touched` workspace-relative.
pub fn relative_to(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
