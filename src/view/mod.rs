//! View module - Text rendering
//!
//! Turns model snapshots into plain text for the command loop.
//! It is organized into:
//!
//! - `utils`: Shared formatting helpers (times, dates, truncation)
//! - `AppView`: One renderer per screen (catalog grid, show, favorites, player)

mod utils;

pub use utils::{format_date, format_time, progress_bar, truncate_string};

use std::collections::HashSet;
use std::fmt::Write;

use crate::model::{
    CatalogState, PageSnapshot, PlaybackSession, PlaybackStatus, Podcast, ShowState, GENRES,
};

const TITLE_WIDTH: usize = 40;
const GENRE_WIDTH: usize = 28;
const PROGRESS_WIDTH: usize = 30;

pub struct AppView;

impl AppView {
    pub fn render_catalog(
        catalog: &CatalogState,
        page: &PageSnapshot,
        favorite_ids: &HashSet<String>,
    ) -> String {
        if catalog.is_loading {
            return "Loading podcasts...\n".to_string();
        }
        if let Some(error) = &catalog.error {
            return format!("{}\n", error);
        }

        let mut out = String::new();
        let _ = writeln!(
            out,
            "Podcasts ({} of {}) | search: \"{}\" | genre: {} | sort: {}",
            page.podcasts.len(),
            page.total_matches,
            page.params.search_term,
            page.params.genre,
            page.params.sort,
        );
        if page.podcasts.is_empty() {
            let _ = writeln!(out, "  No podcasts match your filters.");
            return out;
        }

        let num_width = utils::calculate_num_width(page.podcasts.len());
        for (index, podcast) in page.podcasts.iter().enumerate() {
            let _ = writeln!(
                out,
                " {:>num_width$} {} {} {} {}",
                index + 1,
                Self::favorite_marker(favorite_ids.contains(&podcast.id)),
                Self::podcast_row(podcast),
                truncate_string(&podcast.genre_names(), GENRE_WIDTH),
                format_date(podcast.updated.as_ref()),
            );
        }
        if page.has_more {
            let _ = writeln!(out, "  ... type `more` to load more");
        }
        out
    }

    pub fn render_show(show: &ShowState, favorited: bool) -> String {
        if show.is_loading {
            return "Loading show...\n".to_string();
        }
        let Some(detail) = &show.detail else {
            return "No show open. Use `show <id>`.\n".to_string();
        };

        let mut out = String::new();
        let _ = writeln!(out, "{} {}", Self::favorite_marker(favorited), detail.title);
        let _ = writeln!(out, "  Genres: {}", detail.genre_labels());
        let _ = writeln!(out, "  Last updated: {}", format_date(detail.updated.as_ref()));
        let _ = writeln!(
            out,
            "  {} season{}, {} episode{}",
            detail.season_count(),
            plural(detail.season_count()),
            detail.episode_count(),
            plural(detail.episode_count()),
        );
        if !detail.description.trim().is_empty() {
            let _ = writeln!(out, "\n  {}", detail.description.trim());
        }

        let seasons: Vec<String> = detail
            .seasons
            .iter()
            .map(|s| {
                let marker = if Some(s.season) == show.selected_season { "*" } else { " " };
                format!("{}{}", marker, s.season)
            })
            .collect();
        let _ = writeln!(out, "\n  Seasons: {}", seasons.join(" "));

        let episodes = show.selected_episodes();
        if episodes.is_empty() {
            let _ = writeln!(out, "  No episodes in this season.");
            return out;
        }
        let num_width = utils::calculate_num_width(episodes.len());
        for (index, episode) in episodes.iter().enumerate() {
            let playable = if episode.is_playable() { " " } else { "x" };
            let _ = writeln!(
                out,
                " {:>num_width$} {} E{} {}",
                index + 1,
                playable,
                episode.display_number(),
                truncate_string(episode.display_title(), TITLE_WIDTH).trim_end(),
            );
        }
        out
    }

    pub fn render_favorites(favorites: &[Podcast]) -> String {
        if favorites.is_empty() {
            return "No favorites yet. Start adding your favorite podcasts with `fav <id>`.\n"
                .to_string();
        }

        let mut out = String::new();
        let _ = writeln!(
            out,
            "My Favorites ({} favorite{})",
            favorites.len(),
            plural(favorites.len())
        );
        for podcast in favorites {
            let _ = writeln!(
                out,
                "  {} {} Updated: {}",
                Self::podcast_row(podcast),
                truncate_string(&podcast.genre_names(), GENRE_WIDTH),
                format_date(podcast.updated.as_ref()),
            );
        }
        out
    }

    pub fn render_playback(session: &PlaybackSession, last_error: Option<&str>) -> String {
        let mut out = String::new();
        match (&session.episode, session.status) {
            (None, _) | (_, PlaybackStatus::Idle) => {
                let _ = writeln!(out, "Nothing playing.");
            }
            (Some(episode), status) => {
                let state = match status {
                    PlaybackStatus::Loading => "Loading",
                    PlaybackStatus::Playing => "Playing",
                    PlaybackStatus::Paused => "Paused",
                    PlaybackStatus::Idle => "Idle",
                };
                let _ = writeln!(
                    out,
                    "{}: {} {} {} / {}",
                    state,
                    episode.display_title(),
                    progress_bar(session.progress_ratio(), PROGRESS_WIDTH),
                    format_time(session.current_time),
                    format_time(session.duration),
                );
            }
        }
        if let Some(error) = last_error {
            let _ = writeln!(out, "  {}", error);
        }
        out
    }

    pub fn render_error(message: &str) -> String {
        format!("! {}\n", message)
    }

    pub fn render_help() -> String {
        let mut out = String::from(
            "Commands:\n\
             \x20 search [text]        filter by title (empty clears)\n\
             \x20 genre <all|id>       filter by genre\n\
             \x20 sort <mode>          newest | a-z | z-a | no-sort\n\
             \x20 more | list          load more results / show the list again\n\
             \x20 show <id>            open a podcast\n\
             \x20 season <n>           switch season in the open podcast\n\
             \x20 fav <id> | favs      toggle a favorite / list favorites\n\
             \x20 clear-favs           remove all favorites\n\
             \x20 play <n>             play episode n of the selected season\n\
             \x20 pause | resume | p   control playback\n\
             \x20 seek <secs|m:ss>     jump within the episode\n\
             \x20 status | help | quit\n\
             Genres:",
        );
        for (id, title) in GENRES {
            let _ = write!(out, " {}={}", id, title);
        }
        out.push('\n');
        out
    }

    fn podcast_row(podcast: &Podcast) -> String {
        format!(
            "[{:>6}] {} {:>2} season{}",
            podcast.id,
            truncate_string(&podcast.title, TITLE_WIDTH),
            podcast.seasons,
            if podcast.seasons == 1 { " " } else { "s" },
        )
    }

    fn favorite_marker(favorited: bool) -> &'static str {
        if favorited { "♥" } else { "♡" }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}
