//! Locally persisted favorites

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::{Error, Result};
use super::types::Podcast;

/// Storage key for the favorites blob
pub const FAVORITES_KEY: &str = "podcastFavorites";

/// Blob persistence used by the favorites store
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
}

/// One `<key>.json` file per key under a directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        use std::fs;

        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        use std::fs;

        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store
#[derive(Default)]
pub struct MemoryStore {
    entries: std::sync::Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.entries_mut().insert(key.to_string(), value.to_string());
        store
    }

    fn entries_mut(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries_mut().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.entries_mut().remove(key);
        Ok(())
    }
}

#[derive(Default)]
struct FavoritesState {
    entries: Vec<Podcast>,
    loaded: bool,
}

/// Insertion-ordered favorites, unique by podcast id
///
/// Nothing is written back to storage until [`FavoritesStore::load`] has run,
/// so an early toggle can never clobber the persisted list with the empty
/// pre-load state.
#[derive(Clone)]
pub struct FavoritesStore {
    state: Arc<RwLock<FavoritesState>>,
    storage: Arc<dyn KeyValueStore>,
}

impl FavoritesStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            state: Arc::new(RwLock::new(FavoritesState::default())),
            storage,
        }
    }

    pub async fn load(&self) {
        let mut state = self.state.write().await;
        if state.loaded {
            tracing::warn!("Favorites already loaded, ignoring repeated load");
            return;
        }

        state.entries = match self.storage.get(FAVORITES_KEY) {
            Ok(None) => Vec::new(),
            Ok(Some(blob)) => match parse_favorites(&blob) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(error = %e, "Invalid favorites data in storage, resetting");
                    if let Err(e) = self.storage.delete(FAVORITES_KEY) {
                        tracing::error!(error = %e, "Could not clear corrupted favorites");
                    }
                    Vec::new()
                }
            },
            Err(e) => {
                tracing::error!(error = %e, "Could not read favorites");
                Vec::new()
            }
        };

        tracing::info!(count = state.entries.len(), "Favorites loaded");
        state.loaded = true;
    }

    pub async fn is_loaded(&self) -> bool {
        self.state.read().await.loaded
    }

    /// Returns true if the podcast was inserted
    pub async fn add(&self, podcast: &Podcast) -> bool {
        if !podcast.has_id() {
            tracing::error!(title = %podcast.title, "Invalid podcast data for adding to favorites");
            return false;
        }

        let mut state = self.state.write().await;
        if state.entries.iter().any(|fav| fav.id == podcast.id) {
            tracing::debug!(id = %podcast.id, "Podcast already in favorites");
            return false;
        }

        state.entries.push(podcast.clone());
        tracing::info!(id = %podcast.id, title = %podcast.title, total = state.entries.len(), "Added to favorites");
        self.save(&state);
        true
    }

    /// Returns true if an entry was removed
    pub async fn remove(&self, id: &str) -> bool {
        if id.trim().is_empty() {
            tracing::error!("Invalid podcast ID for removing from favorites");
            return false;
        }

        let mut state = self.state.write().await;
        let before = state.entries.len();
        state.entries.retain(|fav| fav.id != id);
        if state.entries.len() == before {
            return false;
        }

        tracing::info!(id, total = state.entries.len(), "Removed from favorites");
        self.save(&state);
        true
    }

    /// Returns the new favorited state
    pub async fn toggle(&self, podcast: &Podcast) -> bool {
        if !podcast.has_id() {
            tracing::error!(title = %podcast.title, "Invalid podcast data for toggling favorites");
            return false;
        }

        if self.is_favorited(&podcast.id).await {
            self.remove(&podcast.id).await;
            false
        } else {
            self.add(podcast).await
        }
    }

    pub async fn is_favorited(&self, id: &str) -> bool {
        self.state.read().await.entries.iter().any(|fav| fav.id == id)
    }

    pub async fn favorites(&self) -> Vec<Podcast> {
        self.state.read().await.entries.clone()
    }

    pub async fn count(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn clear_all(&self) {
        let mut state = self.state.write().await;
        state.entries.clear();
        if let Err(e) = self.storage.delete(FAVORITES_KEY) {
            tracing::error!(error = %e, "Could not delete persisted favorites");
        }
        tracing::info!("All favorites cleared");
    }

    fn save(&self, state: &FavoritesState) {
        if !state.loaded {
            tracing::debug!("Favorites not loaded yet, skipping save");
            return;
        }

        let result = serde_json::to_string(&state.entries)
            .map_err(Error::from)
            .and_then(|blob| self.storage.set(FAVORITES_KEY, &blob));
        if let Err(e) = result {
            tracing::error!(error = %e, "Could not persist favorites");
        }
    }
}

/// Validate a persisted blob: an array of objects, each carrying a non-empty id
fn parse_favorites(blob: &str) -> Result<Vec<Podcast>> {
    let value: Value = serde_json::from_str(blob)?;
    let Value::Array(items) = value else {
        return Err(Error::validation("favorites blob is not an array"));
    };

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(items.len());
    for item in items {
        let has_id = match item.get("id") {
            Some(Value::String(id)) => !id.trim().is_empty(),
            Some(Value::Number(_)) => true,
            _ => false,
        };
        if !item.is_object() || !has_id {
            return Err(Error::validation("favorite entry without an id"));
        }

        let podcast: Podcast = serde_json::from_value(item)?;
        if seen.insert(podcast.id.clone()) {
            entries.push(podcast);
        }
    }
    Ok(entries)
}
