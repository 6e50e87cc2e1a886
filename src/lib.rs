//! Podcast browser and player core
//!
//! - `model`: catalog types, query pipeline, favorites store and app state
//! - `controller`: intents, playback state machine and output event handling
//! - `audio`: audio resolution and output collaborators
//! - `view`: text rendering of model snapshots

pub mod audio;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod model;
pub mod view;

pub use error::{Error, ResolveFailure, Result};
