use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("timesense"),
            )
        } else {
            ProjectDirs::from("", "", "timesense")
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    /// Session snapshot, rewritten on every state mutation.
    pub fn snapshot_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("session.json"))
    }

    /// Append-only log of completed sessions.
    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("log.csv"))
    }
}
