//! Save/Load functionality for persisting game state
//!
//! The whole state is written as one JSON blob under a fixed key. The blob
//! carries a version string; any other version is treated as no save.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use super::error::PersistenceError;
use super::game_state::GameState;

/// Storage key for the single save slot
pub const SAVE_KEY: &str = "city_trader_save";

/// Save format version (change whenever `GameState` changes shape)
pub const SAVE_VERSION: &str = "2";

/// Serializable snapshot of the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub version: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub state: GameState,
}

/// Key-value store the manager persists into
pub trait SaveStorage {
    fn save(&mut self, key: &str, payload: &str) -> Result<(), PersistenceError>;

    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError>;
}

/// Volatile storage for tests and throwaway games
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveStorage for MemoryStorage {
    fn save(&mut self, key: &str, payload: &str) -> Result<(), PersistenceError> {
        self.entries.insert(key.to_string(), payload.to_string());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Stores each key as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SaveStorage for FileStorage {
    fn save(&mut self, key: &str, payload: &str) -> Result<(), PersistenceError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), payload)?;
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Wrap a state in a versioned, timestamped blob
pub fn encode_save(state: &GameState) -> Result<String, PersistenceError> {
    let save_data = SaveData {
        version: SAVE_VERSION.to_string(),
        timestamp: chrono::Utc::now().timestamp_millis(),
        state: state.clone(),
    };
    Ok(serde_json::to_string(&save_data)?)
}

/// Parse a blob, rejecting other save versions
pub fn decode_save(text: &str) -> Result<GameState, PersistenceError> {
    let save_data: SaveData = serde_json::from_str(text)?;
    if save_data.version != SAVE_VERSION {
        return Err(PersistenceError::VersionMismatch {
            expected: SAVE_VERSION.to_string(),
            found: save_data.version,
        });
    }
    Ok(save_data.state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::types::{Candle, GoodId, LocationId};

    fn sample_state() -> GameState {
        let mut state = GameState::default();
        state.cash = 12_345;
        state.inventory[2].good = Some(GoodId(2));
        state.inventory[2].quantity = 7;
        state.inventory[2].avg_price = 31;
        state.current_location = Some(LocationId(13));
        state.stock_prices = vec![10; 10];
        state.stock_history[0].push(Candle {
            open: 10,
            high: 12,
            low: 9,
            close: 11,
        });
        state.player_name = "阿强".to_string();
        state
    }

    #[test]
    fn test_save_load_roundtrip() {
        let state = sample_state();
        let text = encode_save(&state).expect("encode");
        let loaded = decode_save(&text).expect("decode");
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_version_mismatch_is_rejected() {
        let mut save_data: SaveData =
            serde_json::from_str(&encode_save(&sample_state()).expect("encode")).expect("parse");
        save_data.version = "1".to_string();
        let text = serde_json::to_string(&save_data).expect("serialize");
        assert!(matches!(
            decode_save(&text),
            Err(PersistenceError::VersionMismatch { .. })
        ));
        assert!(matches!(
            decode_save("{not json"),
            Err(PersistenceError::Json(_))
        ));
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut storage = FileStorage::new(dir.path().join("saves"));
        assert_eq!(storage.load(SAVE_KEY).expect("load"), None);

        storage.save(SAVE_KEY, "{}").expect("save");
        assert_eq!(storage.load(SAVE_KEY).expect("load"), Some("{}".to_string()));

        storage.remove(SAVE_KEY).expect("remove");
        assert_eq!(storage.load(SAVE_KEY).expect("load"), None);
        storage.remove(SAVE_KEY).expect("removing twice is fine");
    }
}
