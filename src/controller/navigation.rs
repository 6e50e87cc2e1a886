//! Navigation-related controller methods (catalog, browsing, show detail)

use crate::model::{GenreFilter, SortMode};
use super::AppController;

impl AppController {
    pub async fn load_catalog(&self) {
        self.model.set_catalog_loading(true).await;

        match self.catalog.fetch_all_podcasts().await {
            Ok(podcasts) => {
                tracing::debug!(count = podcasts.len(), "Applying catalog to model");
                self.model.set_catalog(podcasts).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load catalog");
                let error_msg = Self::format_error(&e);
                self.model.set_catalog_error(error_msg.clone()).await;
                self.model.set_error(error_msg).await;
            }
        }
    }

    pub async fn set_search_term(&self, term: &str) {
        tracing::debug!(term, "Search term changed");
        self.model.set_search_term(term.to_string()).await;
    }

    pub async fn set_genre_filter(&self, genre: GenreFilter) {
        tracing::debug!(genre = %genre, "Genre filter changed");
        self.model.set_genre_filter(genre).await;
    }

    pub async fn set_sort_mode(&self, sort: SortMode) {
        tracing::debug!(sort = %sort, "Sort mode changed");
        self.model.set_sort_mode(sort).await;
    }

    pub async fn load_more(&self) {
        let page = self.model.get_page().await;
        if !page.has_more {
            tracing::trace!("Load more ignored: no further results");
            return;
        }
        self.model.load_more().await;
    }

    /// Fetch the full detail of a show; the first season becomes selected
    pub async fn open_show(&self, show_id: &str) -> bool {
        let show_id = show_id.trim();
        if show_id.is_empty() {
            return false;
        }

        self.model.set_show_loading(true).await;
        match self.catalog.fetch_show(show_id).await {
            Ok(detail) => {
                tracing::debug!(show_id, title = %detail.title, "Opening show");
                self.model.set_show_detail(detail).await;
                true
            }
            Err(e) => {
                tracing::error!(show_id, error = %e, "Failed to load show detail");
                self.model.set_show_loading(false).await;
                self.model.set_error(Self::format_error(&e)).await;
                false
            }
        }
    }

    pub async fn select_season(&self, number: u32) -> bool {
        if self.model.select_season(number).await {
            tracing::debug!(season = number, "Season selected");
            true
        } else {
            self.model
                .set_error(format!("Season {} does not exist for this show.", number))
                .await;
            false
        }
    }
}
