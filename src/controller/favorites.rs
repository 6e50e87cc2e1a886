//! Favorite toggling from the catalog grid and the show detail view

use crate::model::Podcast;
use super::AppController;

impl AppController {
    /// Toggle by id; returns the new favorited state, or None when the id is unknown
    ///
    /// The id is looked up in the catalog, then in the open show, then in the
    /// favorites themselves so entries that left the catalog can still be removed.
    pub async fn toggle_favorite(&self, podcast_id: &str) -> Option<bool> {
        let podcast_id = podcast_id.trim();
        let Some(podcast) = self.resolve_podcast(podcast_id).await else {
            tracing::warn!(podcast_id, "Cannot toggle favorite for unknown podcast");
            self.model
                .set_error(format!("No podcast with id {} is loaded.", podcast_id))
                .await;
            return None;
        };

        let favorited = self.favorites.toggle(&podcast).await;
        tracing::info!(podcast_id, favorited, "Favorite toggled");
        Some(favorited)
    }

    pub async fn clear_favorites(&self) {
        self.favorites.clear_all().await;
    }

    pub async fn get_favorites(&self) -> (Vec<Podcast>, usize) {
        let favorites = self.favorites.favorites().await;
        let count = favorites.len();
        (favorites, count)
    }

    async fn resolve_podcast(&self, podcast_id: &str) -> Option<Podcast> {
        if podcast_id.is_empty() {
            return None;
        }
        if let Some(podcast) = self.model.find_podcast(podcast_id).await {
            return Some(podcast);
        }
        if let Some(detail) = self.model.get_show_state().await.detail {
            if detail.id == podcast_id {
                return Some(detail.to_podcast());
            }
        }
        self.favorites
            .favorites()
            .await
            .into_iter()
            .find(|fav| fav.id == podcast_id)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{harness, FakeCatalog};
    use crate::model::{GenreTag, KeyValueStore, Podcast, ShowDetail, FAVORITES_KEY};

    fn catalog() -> FakeCatalog {
        FakeCatalog {
            podcasts: vec![
                Podcast {
                    id: "1".into(),
                    title: "Alpha".into(),
                    ..Default::default()
                },
                Podcast {
                    id: "2".into(),
                    title: "Beta".into(),
                    ..Default::default()
                },
            ],
            shows: vec![
                ShowDetail {
                    id: "99".into(),
                    title: "Hidden Show".into(),
                    genres: vec![GenreTag::Label("All".into()), GenreTag::Id(4)],
                    ..Default::default()
                },
                ShowDetail {
                    id: "100".into(),
                    title: "Other Show".into(),
                    ..Default::default()
                },
            ],
            unavailable: false,
        }
    }

    #[tokio::test]
    async fn toggle_from_catalog_persists() {
        let h = harness(catalog()).await;
        h.controller.load_catalog().await;

        assert_eq!(h.controller.toggle_favorite("2").await, Some(true));
        assert_eq!(h.controller.toggle_favorite("1").await, Some(true));

        let (favorites, count) = h.controller.get_favorites().await;
        assert_eq!(count, 2);
        assert_eq!(favorites[0].title, "Beta");

        let blob = h.storage.get(FAVORITES_KEY).unwrap().unwrap();
        let persisted: Vec<Podcast> = serde_json::from_str(&blob).unwrap();
        assert_eq!(persisted, favorites);

        assert_eq!(h.controller.toggle_favorite("2").await, Some(false));
        assert_eq!(h.controller.get_favorites().await.1, 1);
    }

    #[tokio::test]
    async fn toggle_from_show_detail_and_unknown_ids() {
        let h = harness(catalog()).await;

        assert_eq!(h.controller.toggle_favorite("99").await, None);
        assert!(h.controller.model().get_error().await.is_some());

        h.controller.open_show("99").await;
        assert_eq!(h.controller.toggle_favorite("99").await, Some(true));
        let (favorites, _) = h.controller.get_favorites().await;
        assert_eq!(favorites[0].title, "Hidden Show");
        assert_eq!(favorites[0].genres, vec![4]);

        h.controller.clear_favorites().await;
        assert_eq!(h.controller.get_favorites().await.1, 0);
        assert!(h.storage.get(FAVORITES_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn favorites_outside_catalog_can_be_removed() {
        let h = harness(catalog()).await;
        h.controller.open_show("99").await;
        h.controller.toggle_favorite("99").await;

        assert!(h.controller.open_show("100").await);
        assert_eq!(h.controller.toggle_favorite("99").await, Some(false));
    }
}
