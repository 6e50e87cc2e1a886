//! Model module - Catalog data and application state
//!
//! This module contains the data structures and state management for the application.
//! It is organized into submodules by responsibility:
//!
//! - `types`: Catalog feed types (podcasts, shows, seasons, episodes)
//! - `genres`: Static genre lookup table
//! - `query`: Filtering, sorting and pagination over the catalog
//! - `content`: Browse and show-detail view state
//! - `favorites`: Locally persisted favorites and their storage
//! - `playback`: Playback session and audio output events
//! - `catalog_client`: Remote catalog HTTP client
//! - `app_model`: Main application model with state management methods

mod types;
mod genres;
mod query;
mod content;
mod favorites;
mod playback;
mod catalog_client;
mod app_model;

pub use types::{
    parse_timestamp, Episode, GenreTag, Podcast, Season, ShowDetail,
    MISSING_EPISODE_DESCRIPTION, MISSING_EPISODE_TITLE,
};

pub use genres::{genre_labels, genre_names, genre_title, GENRES};

pub use query::{
    has_more, normalize_search, paginate, query, GenreFilter, Pager, QueryParams, SortMode,
    DEFAULT_PAGE_SIZE,
};

pub use content::{BrowseState, PageSnapshot, ShowState};

pub use favorites::{FavoritesStore, FileStore, KeyValueStore, MemoryStore, FAVORITES_KEY};

pub use playback::{AudioEvent, OutputEvent, PlaybackSession, PlaybackStatus};

pub use catalog_client::{Catalog, CatalogClient, CatalogClientBuilder, DEFAULT_BASE_URL};

pub use app_model::{AppModel, CatalogState, UiState};
