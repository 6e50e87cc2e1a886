//! Main application model with state management

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

use super::content::{BrowseState, PageSnapshot, ShowState};
use super::query::{GenreFilter, SortMode};
use super::types::{Episode, Podcast, ShowDetail};

const ERROR_DISPLAY_TIME: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, Default)]
pub struct CatalogState {
    pub podcasts: Vec<Podcast>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
}

/// Main application model containing all browse state
pub struct AppModel {
    catalog: Arc<RwLock<CatalogState>>,
    browse: Arc<Mutex<BrowseState>>,
    show: Arc<Mutex<ShowState>>,
    ui_state: Arc<Mutex<UiState>>,
    should_quit: Arc<Mutex<bool>>,
}

impl AppModel {
    pub fn new(page_size: usize) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(CatalogState::default())),
            browse: Arc::new(Mutex::new(BrowseState::new(page_size))),
            show: Arc::new(Mutex::new(ShowState::default())),
            ui_state: Arc::new(Mutex::new(UiState::default())),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    pub async fn set_catalog_loading(&self, loading: bool) {
        let mut catalog = self.catalog.write().await;
        catalog.is_loading = loading;
        if loading {
            catalog.error = None;
        }
    }

    pub async fn set_catalog(&self, podcasts: Vec<Podcast>) {
        let mut catalog = self.catalog.write().await;
        catalog.podcasts = podcasts;
        catalog.is_loading = false;
        catalog.error = None;
    }

    pub async fn set_catalog_error(&self, message: String) {
        let mut catalog = self.catalog.write().await;
        catalog.is_loading = false;
        catalog.error = Some(message);
    }

    pub async fn get_catalog_state(&self) -> CatalogState {
        self.catalog.read().await.clone()
    }

    pub async fn find_podcast(&self, id: &str) -> Option<Podcast> {
        self.catalog
            .read()
            .await
            .podcasts
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    // ========================================================================
    // Browse (search / genre / sort / pagination)
    // ========================================================================

    pub async fn set_search_term(&self, term: String) {
        self.browse.lock().await.set_search_term(term);
    }

    pub async fn set_genre_filter(&self, genre: GenreFilter) {
        self.browse.lock().await.set_genre(genre);
    }

    pub async fn set_sort_mode(&self, sort: SortMode) {
        self.browse.lock().await.set_sort(sort);
    }

    pub async fn load_more(&self) {
        self.browse.lock().await.load_more();
    }

    pub async fn get_page(&self) -> PageSnapshot {
        let catalog = self.catalog.read().await;
        self.browse.lock().await.snapshot(&catalog.podcasts)
    }

    // ========================================================================
    // Show detail
    // ========================================================================

    pub async fn set_show_loading(&self, loading: bool) {
        self.show.lock().await.is_loading = loading;
    }

    pub async fn set_show_detail(&self, detail: ShowDetail) {
        self.show.lock().await.set_detail(detail);
    }

    pub async fn select_season(&self, number: u32) -> bool {
        self.show.lock().await.select_season(number)
    }

    pub async fn get_show_state(&self) -> ShowState {
        self.show.lock().await.clone()
    }

    pub async fn get_episode(&self, position: usize) -> Option<Episode> {
        self.show.lock().await.episode_at(position).cloned()
    }

    // ========================================================================
    // Errors & lifecycle
    // ========================================================================

    pub async fn set_error(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        state.error_message = Some(message);
        state.error_timestamp = Some(Instant::now());
    }

    pub async fn clear_error(&self) {
        let mut state = self.ui_state.lock().await;
        state.error_message = None;
        state.error_timestamp = None;
    }

    pub async fn get_error(&self) -> Option<String> {
        self.ui_state.lock().await.error_message.clone()
    }

    pub async fn auto_clear_old_errors(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(timestamp) = state.error_timestamp {
            if timestamp.elapsed() > ERROR_DISPLAY_TIME {
                state.error_message = None;
                state.error_timestamp = None;
            }
        }
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }
}

impl Default for AppModel {
    fn default() -> Self {
        Self::new(super::query::DEFAULT_PAGE_SIZE)
    }
}
