//! Browse and show-detail view state

use super::query::{self, GenreFilter, Pager, QueryParams, SortMode};
use super::types::{Episode, Podcast, ShowDetail};

/// Search/genre/sort selection plus the "load more" counter
#[derive(Clone, Debug)]
pub struct BrowseState {
    pub params: QueryParams,
    pub pager: Pager,
}

impl BrowseState {
    pub fn new(page_size: usize) -> Self {
        Self {
            params: QueryParams::default(),
            pager: Pager::new(page_size),
        }
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        let term = term.into();
        if term != self.params.search_term {
            self.params.search_term = term;
            self.pager.reset();
        }
    }

    pub fn set_genre(&mut self, genre: GenreFilter) {
        if genre != self.params.genre {
            self.params.genre = genre;
            self.pager.reset();
        }
    }

    pub fn set_sort(&mut self, sort: SortMode) {
        self.params.sort = sort;
    }

    pub fn load_more(&mut self) {
        self.pager.load_more();
    }

    pub fn snapshot(&self, catalog: &[Podcast]) -> PageSnapshot {
        let matches = query::query(catalog, &self.params);
        let page = self.pager.page(&matches);
        PageSnapshot {
            podcasts: page.iter().map(|p| (*p).clone()).collect(),
            has_more: self.pager.has_more(&matches),
            total_matches: matches.len(),
            page_count: self.pager.page_count(),
            params: self.params.clone(),
        }
    }
}

impl Default for BrowseState {
    fn default() -> Self {
        Self::new(query::DEFAULT_PAGE_SIZE)
    }
}

/// What the view renders for the podcast grid
#[derive(Clone, Debug, Default)]
pub struct PageSnapshot {
    pub podcasts: Vec<Podcast>,
    pub has_more: bool,
    pub total_matches: usize,
    pub page_count: usize,
    pub params: QueryParams,
}

#[derive(Clone, Debug, Default)]
pub struct ShowState {
    pub detail: Option<ShowDetail>,
    pub selected_season: Option<u32>,
    pub is_loading: bool,
}

impl ShowState {
    /// Replace any previous detail and select its first season
    pub fn set_detail(&mut self, detail: ShowDetail) {
        self.selected_season = detail.first_season_number();
        self.detail = Some(detail);
        self.is_loading = false;
    }

    pub fn select_season(&mut self, number: u32) -> bool {
        let exists = self
            .detail
            .as_ref()
            .is_some_and(|d| d.season(number).is_some());
        if exists {
            self.selected_season = Some(number);
        }
        exists
    }

    pub fn selected_episodes(&self) -> &[Episode] {
        self.detail
            .as_ref()
            .zip(self.selected_season)
            .and_then(|(detail, number)| detail.season(number))
            .map(|season| season.episodes.as_slice())
            .unwrap_or_default()
    }

    /// 1-based position within the selected season
    pub fn episode_at(&self, position: usize) -> Option<&Episode> {
        position
            .checked_sub(1)
            .and_then(|index| self.selected_episodes().get(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::{parse_timestamp, Season};

    fn catalog(n: usize) -> Vec<Podcast> {
        (0..n)
            .map(|i| Podcast {
                id: i.to_string(),
                title: format!("Show {:02}", i),
                genres: vec![(i % 3) as u32 + 1],
                updated: parse_timestamp("2024-01-01"),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn filters_reset_pagination_but_sort_does_not() {
        let shows = catalog(50);
        let mut browse = BrowseState::new(20);

        browse.load_more();
        assert_eq!(browse.snapshot(&shows).podcasts.len(), 40);

        browse.set_sort(SortMode::TitleDesc);
        assert_eq!(browse.pager.page_count(), 2);

        browse.set_search_term("show");
        assert_eq!(browse.pager.page_count(), 1);

        browse.load_more();
        browse.set_search_term("show");
        assert_eq!(browse.pager.page_count(), 2);

        browse.set_genre(GenreFilter::Genre(1));
        let snapshot = browse.snapshot(&shows);
        assert_eq!(snapshot.page_count, 1);
        assert_eq!(snapshot.total_matches, 17);
        assert_eq!(snapshot.podcasts.len(), 17);
        assert!(!snapshot.has_more);
    }

    #[test]
    fn snapshot_reports_has_more() {
        let shows = catalog(25);
        let mut browse = BrowseState::new(20);
        let snapshot = browse.snapshot(&shows);
        assert_eq!(snapshot.podcasts.len(), 20);
        assert!(snapshot.has_more);

        browse.load_more();
        assert!(!browse.snapshot(&shows).has_more);
    }

    #[test]
    fn show_state_selects_existing_seasons() {
        let mut show = ShowState::default();
        assert!(show.selected_episodes().is_empty());

        show.set_detail(ShowDetail {
            id: "1".into(),
            seasons: vec![
                Season {
                    season: 2,
                    title: "Two".into(),
                    episodes: vec![Episode {
                        episode: Some(1),
                        ..Default::default()
                    }],
                },
                Season {
                    season: 5,
                    title: "Five".into(),
                    episodes: vec![],
                },
            ],
            ..Default::default()
        });

        assert_eq!(show.selected_season, Some(2));
        assert_eq!(show.episode_at(1).and_then(|e| e.episode), Some(1));
        assert!(show.episode_at(0).is_none());
        assert!(!show.select_season(3));
        assert!(show.select_season(5));
        assert!(show.selected_episodes().is_empty());
    }
}
