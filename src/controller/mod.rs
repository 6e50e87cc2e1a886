//! Controller module - Application logic and intent handling
//!
//! This module contains the application controller that receives view intents,
//! coordinates between the model and the services, and manages playback.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Text command parsing and dispatch
//! - `navigation`: Catalog loading, browsing and show detail
//! - `favorites`: Favorite toggling
//! - `playback`: Playback state machine and playback intents
//! - `player_events`: Audio output event listener

mod input;
mod navigation;
mod favorites;
mod playback;
mod player_events;

pub use input::Command;
pub use playback::{PlayOutcome, PlaybackController};

use std::sync::Arc;

use crate::error::Error;
use crate::model::{AppModel, Catalog, FavoritesStore};

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<AppModel>,
    pub(crate) catalog: Arc<dyn Catalog>,
    pub(crate) favorites: FavoritesStore,
    pub(crate) playback: PlaybackController,
}

impl AppController {
    pub fn new(
        model: Arc<AppModel>,
        catalog: Arc<dyn Catalog>,
        favorites: FavoritesStore,
        playback: PlaybackController,
    ) -> Self {
        Self {
            model,
            catalog,
            favorites,
            playback,
        }
    }

    pub fn model(&self) -> &AppModel {
        &self.model
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub(crate) fn format_error(error: &Error) -> String {
        match error {
            Error::CatalogUnavailable { status: Some(404), .. } => {
                "That podcast could not be found.".to_string()
            }
            Error::CatalogUnavailable { .. } => {
                "Failed to load podcasts. Please check your internet connection.".to_string()
            }
            Error::ResourceUnavailable(reason) => {
                format!("This episode's audio is not available ({}).", reason)
            }
            Error::Playback(msg) => format!("Cannot play episode: {}", msg),
            _ => format!("Error: {}", error),
        }
    }
}
