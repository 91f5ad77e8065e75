//! High score persistence
//!
//! A single best score, read once per session and written whenever it is
//! beaten. The combat core only sees the [`HighScoreStore`] port.

use crate::persistence::{KeyValueStore, MemoryStore, StorageError};

/// Storage port for the best score
pub trait HighScoreStore {
    fn get_high_score(&self) -> u64;
    fn set_high_score(&mut self, score: u64);
}

/// Volatile high score (native builds and tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryHighScore(pub u64);

impl HighScoreStore for MemoryHighScore {
    fn get_high_score(&self) -> u64 {
        self.0
    }

    fn set_high_score(&mut self, score: u64) {
        self.0 = score;
    }
}

/// High score kept in a key/value store
///
/// Storage failures are logged and never surface to the game: an unreadable
/// value counts as zero and a failed write keeps the value in memory.
pub struct StoredHighScore<S: KeyValueStore> {
    store: S,
    cached: u64,
}

impl<S: KeyValueStore> StoredHighScore<S> {
    /// Storage key, shared with older builds
    pub const STORAGE_KEY: &'static str = "highScore";

    pub fn new(store: S) -> Self {
        let cached = match Self::read(&store) {
            Ok(score) => score,
            Err(e) => {
                log::warn!("High score unreadable, starting from 0: {}", e);
                0
            }
        };
        log::info!("Loaded high score {}", cached);
        Self { store, cached }
    }

    fn read(store: &S) -> Result<u64, StorageError> {
        match store.get(Self::STORAGE_KEY)? {
            None => Ok(0),
            Some(raw) => raw.trim().parse().map_err(|_| StorageError::Corrupt {
                key: Self::STORAGE_KEY.to_string(),
                value: raw,
            }),
        }
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S: KeyValueStore> HighScoreStore for StoredHighScore<S> {
    fn get_high_score(&self) -> u64 {
        self.cached
    }

    fn set_high_score(&mut self, score: u64) {
        self.cached = score;
        if let Err(e) = self.store.set(Self::STORAGE_KEY, &score.to_string()) {
            log::warn!("High score {} not persisted: {}", score, e);
        }
    }
}

impl StoredHighScore<MemoryStore> {
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }
}

/// High score backed by LocalStorage (WASM only)
#[cfg(target_arch = "wasm32")]
pub fn load_local() -> Box<dyn HighScoreStore> {
    match crate::persistence::LocalStorage::open() {
        Ok(storage) => Box::new(StoredHighScore::new(storage)),
        Err(e) => {
            log::warn!("{}; high score will not persist", e);
            Box::new(MemoryHighScore::default())
        }
    }
}
