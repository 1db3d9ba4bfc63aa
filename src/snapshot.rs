use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::game::Game;

/// Storage port for the session snapshot. The state machine itself never
/// touches storage; the binary saves through this trait on every mutation
/// and loads once at startup.
pub trait SnapshotStore {
    /// A malformed or missing snapshot falls back to the default initial state.
    fn load(&self) -> Game;
    fn save(&self, game: &Game) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::snapshot_path()
            .unwrap_or_else(|| PathBuf::from("timesense_session.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileSnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> Game {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(mut game) = serde_json::from_slice::<Game>(&bytes) {
                game.normalize_after_restore();
                return game;
            }
        }
        Game::default()
    }

    fn save(&self, game: &Game) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(game).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Phase;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_game() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileSnapshotStore::with_path(&path);
        let game = Game::default();
        store.save(&game).unwrap();
        let loaded = store.load();
        assert_eq!(game, loaded);
    }

    #[test]
    fn save_and_load_mid_session() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileSnapshotStore::with_path(&path);

        let mut game = Game::default();
        game.start_game();
        game.begin_round();
        game.record_result(9_800.0);
        game.next_round();
        store.save(&game).unwrap();

        let loaded = store.load();
        assert_eq!(game, loaded);
        assert_eq!(loaded.current_round(), 2);
        assert_eq!(loaded.results()[0].error, -200.0);
    }

    #[test]
    fn missing_file_loads_default() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::with_path(dir.path().join("nope.json"));
        assert_eq!(store.load(), Game::default());
    }

    #[test]
    fn malformed_file_loads_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, b"{ not json").unwrap();
        let store = FileSnapshotStore::with_path(&path);
        assert_eq!(store.load(), Game::default());
    }

    #[test]
    fn load_demotes_an_interrupted_round() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileSnapshotStore::with_path(&path);

        let mut game = Game::default();
        game.start_game();
        game.begin_round();
        assert_eq!(game.phase(), Phase::Playing);
        store.save(&game).unwrap();

        // the timer died with the process; the round restarts from Ready
        let loaded = store.load();
        assert_eq!(loaded.phase(), Phase::Ready);
        assert_eq!(loaded.current_round(), 1);
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state").join("deep").join("session.json");
        let store = FileSnapshotStore::with_path(&path);
        store.save(&Game::default()).unwrap();
        assert!(path.exists());
    }
}
