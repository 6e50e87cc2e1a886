//! Playback state machine over the single audio output

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::audio::{AudioOutput, AudioResolver};
use crate::error::{Error, Result};
use crate::model::{Episode, OutputEvent, PlaybackSession, PlaybackStatus};
use super::AppController;

impl AppController {
    /// Play the episode at a 1-based position in the selected season
    pub async fn play_episode(&self, position: usize) -> Option<PlayOutcome> {
        let Some(episode) = self.model.get_episode(position).await else {
            tracing::warn!(position, "No such episode in the selected season");
            self.model
                .set_error(format!("There is no episode {} in this season.", position))
                .await;
            return None;
        };

        match self.playback.play(episode).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                self.model.set_error(Self::format_error(&e)).await;
                None
            }
        }
    }

    pub async fn pause_playback(&self) {
        if let Err(e) = self.playback.pause().await {
            self.model.set_error(Self::format_error(&e)).await;
        }
    }

    pub async fn resume_playback(&self) {
        if let Err(e) = self.playback.resume().await {
            self.model.set_error(Self::format_error(&e)).await;
        }
    }

    pub async fn toggle_playback(&self) {
        if let Err(e) = self.playback.toggle().await {
            self.model.set_error(Self::format_error(&e)).await;
        }
    }

    pub async fn seek(&self, seconds: f64) {
        if let Err(e) = self.playback.seek(seconds).await {
            self.model.set_error(Self::format_error(&e)).await;
        }
    }

    pub async fn get_session(&self) -> PlaybackSession {
        self.playback.session().await
    }
}

/// How a `play` request ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The output confirmed playback of this episode
    Started,
    /// A newer `play` was issued while this one was in flight; nothing was applied
    Superseded,
}

/// Owns the playback session and the audio output
///
/// Every `play` takes a fresh request token. Results and output events are
/// applied only while their token is still the latest, so a slow resolution
/// for an earlier episode can never overwrite the session of a later one.
#[derive(Clone)]
pub struct PlaybackController {
    pub(crate) session: Arc<Mutex<PlaybackSession>>,
    pub(crate) output: Arc<dyn AudioOutput>,
    resolver: Arc<dyn AudioResolver>,
    latest_token: Arc<AtomicU64>,
    // Serialises load/play/pause/seek commands on the output
    binding: Arc<Mutex<()>>,
    pub(crate) last_error: Arc<Mutex<Option<String>>>,
    pub(crate) events: Arc<std::sync::Mutex<Option<mpsc::UnboundedReceiver<OutputEvent>>>>,
}

impl PlaybackController {
    pub fn new(output: Arc<dyn AudioOutput>, resolver: Arc<dyn AudioResolver>) -> Self {
        let events = output.subscribe();
        Self {
            session: Arc::new(Mutex::new(PlaybackSession::default())),
            output,
            resolver,
            latest_token: Arc::new(AtomicU64::new(0)),
            binding: Arc::new(Mutex::new(())),
            last_error: Arc::new(Mutex::new(None)),
            events: Arc::new(std::sync::Mutex::new(Some(events))),
        }
    }

    pub async fn session(&self) -> PlaybackSession {
        self.session.lock().await.clone()
    }

    pub async fn status(&self) -> PlaybackStatus {
        self.session.lock().await.status
    }

    pub async fn last_error(&self) -> Option<String> {
        self.last_error.lock().await.clone()
    }

    pub async fn clear_error(&self) {
        *self.last_error.lock().await = None;
    }

    pub fn current_token(&self) -> u64 {
        self.latest_token.load(Ordering::SeqCst)
    }

    fn is_current(&self, token: u64) -> bool {
        self.current_token() == token
    }

    pub async fn play(&self, episode: Episode) -> Result<PlayOutcome> {
        let token = self.latest_token.fetch_add(1, Ordering::SeqCst) + 1;

        let Some(file) = playable_url(&episode) else {
            tracing::warn!(token, episode = %episode.display_title(), "Episode has no playable audio file");
            let error = Error::playback(format!(
                "\"{}\" has no audio file",
                episode.display_title()
            ));
            return self.fail(token, error).await;
        };

        {
            let mut session = self.session.lock().await;
            if !self.is_current(token) {
                return Ok(PlayOutcome::Superseded);
            }
            session.begin_loading(episode.clone());
        }
        self.clear_error().await;
        tracing::info!(token, episode = %episode.display_title(), url = %file, "Loading episode");

        let resolved = match self.resolver.resolve(&file).await {
            Ok(resolved) => resolved,
            Err(e) => return self.fail(token, e).await,
        };
        if let Some(warning) = resolved.warning.as_deref() {
            tracing::warn!(token, warning, "Playing despite resolver warning");
        }

        let _binding = self.binding.lock().await;
        if !self.is_current(token) {
            tracing::debug!(token, "Play request superseded after resolution");
            return Ok(PlayOutcome::Superseded);
        }
        if let Err(e) = self.output.load(&resolved, token).await {
            return self.fail_bound(token, e).await;
        }
        if let Err(e) = self.output.play().await {
            return self.fail_bound(token, e).await;
        }

        let mut session = self.session.lock().await;
        if !self.is_current(token) {
            tracing::debug!(token, "Play request superseded before confirmation");
            return Ok(PlayOutcome::Superseded);
        }
        session.status = PlaybackStatus::Playing;
        tracing::info!(token, episode = %episode.display_title(), "Playback started");
        Ok(PlayOutcome::Started)
    }

    /// Playing -> Paused; no-op in any other state
    pub async fn pause(&self) -> Result<()> {
        let _binding = self.binding.lock().await;
        if self.status().await != PlaybackStatus::Playing {
            tracing::trace!("Pause ignored: not playing");
            return Ok(());
        }

        let token = self.current_token();
        if let Err(e) = self.output.pause().await {
            return self.fail_bound(token, e).await.map(|_| ());
        }

        let mut session = self.session.lock().await;
        if session.status == PlaybackStatus::Playing {
            session.status = PlaybackStatus::Paused;
        }
        tracing::debug!(position = session.current_time, "Playback paused");
        Ok(())
    }

    /// Paused -> Playing on the already-bound resource; no-op otherwise
    pub async fn resume(&self) -> Result<()> {
        let _binding = self.binding.lock().await;
        {
            let session = self.session.lock().await;
            if session.status != PlaybackStatus::Paused || session.episode.is_none() {
                tracing::trace!(status = ?session.status, "Resume ignored: nothing paused");
                return Ok(());
            }
        }

        let token = self.current_token();
        if let Err(e) = self.output.play().await {
            return self.fail_bound(token, e).await.map(|_| ());
        }

        let mut session = self.session.lock().await;
        if self.is_current(token) && session.status == PlaybackStatus::Paused {
            session.status = PlaybackStatus::Playing;
        }
        tracing::debug!(position = session.current_time, "Playback resumed");
        Ok(())
    }

    pub async fn toggle(&self) -> Result<()> {
        match self.status().await {
            PlaybackStatus::Playing => self.pause().await,
            PlaybackStatus::Paused => self.resume().await,
            PlaybackStatus::Idle | PlaybackStatus::Loading => Ok(()),
        }
    }

    /// Seek within `[0, duration]`; only while Playing or Paused
    pub async fn seek(&self, seconds: f64) -> Result<()> {
        let _binding = self.binding.lock().await;
        let position = {
            let mut session = self.session.lock().await;
            if !matches!(session.status, PlaybackStatus::Playing | PlaybackStatus::Paused) {
                tracing::trace!(status = ?session.status, "Seek ignored: nothing bound");
                return Ok(());
            }
            let position = session.clamp_position(seconds);
            session.current_time = position;
            position
        };

        tracing::debug!(requested = seconds, position, "Seeking");
        let token = self.current_token();
        if let Err(e) = self.output.seek(position).await {
            return self.fail_bound(token, e).await.map(|_| ());
        }
        Ok(())
    }

    /// Failure outside the binding; waits for any in-flight output command
    /// so the stop lands after it
    async fn fail(&self, token: u64, error: Error) -> Result<PlayOutcome> {
        let _binding = self.binding.lock().await;
        self.fail_bound(token, error).await
    }

    /// Reset to Idle and surface the error, unless the request was superseded.
    /// The caller holds the binding.
    async fn fail_bound(&self, token: u64, error: Error) -> Result<PlayOutcome> {
        let mut session = self.session.lock().await;
        if !self.is_current(token) {
            tracing::debug!(token, error = %error, "Ignoring failure of superseded request");
            return Ok(PlayOutcome::Superseded);
        }

        tracing::error!(token, error = %error, "Playback failed");
        session.reset();
        drop(session);

        if let Err(e) = self.output.stop().await {
            tracing::warn!(error = %e, "Could not stop audio output");
        }
        *self.last_error.lock().await = Some(error.to_string());
        Err(error)
    }
}

fn playable_url(episode: &Episode) -> Option<String> {
    let file = episode.audio_file()?;
    url::Url::parse(file).ok().map(|_| file.to_string())
}
