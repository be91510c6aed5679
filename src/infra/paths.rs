// src/infra/paths.rs — Config and data locations
//
// All paths respect the EGO_AUDITOR_HOME environment variable for isolation.
// When EGO_AUDITOR_HOME is set, config and data live under that directory.
// When unset, config uses ~/.ego-auditor/ and data uses XDG_DATA_HOME/ego-auditor.

use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Returns the EGO_AUDITOR_HOME override, if set.
fn auditor_home() -> Option<PathBuf> {
    std::env::var_os("EGO_AUDITOR_HOME").map(PathBuf::from)
}

/// Home directory, or the current directory when none can be determined.
pub fn dirs_home() -> PathBuf {
    BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Configuration directory: $EGO_AUDITOR_HOME/ or ~/.ego-auditor/
pub fn config_dir() -> PathBuf {
    if let Some(home) = auditor_home() {
        return home;
    }
    dirs_home().join(".ego-auditor")
}

/// Data directory: $EGO_AUDITOR_HOME/data/ or ~/.local/share/ego-auditor/
pub fn data_dir() -> PathBuf {
    if let Some(home) = auditor_home() {
        return home.join("data");
    }
    ProjectDirs::from("", "", "ego-auditor")
        .map(|d| d.data_local_dir().to_path_buf())
        .unwrap_or_else(|| config_dir().join("data"))
}

pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Default key-value database.
pub fn db_path() -> PathBuf {
    data_dir().join("ego-auditor.db")
}

/// Ensure the data directory exists.
pub fn ensure_dirs() -> std::io::Result<()> {
    std::fs::create_dir_all(data_dir())
}
