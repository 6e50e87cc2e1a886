//! Listener folding audio output events into the playback session

use tokio::task::JoinHandle;

use crate::error::Error;
use crate::model::{AudioEvent, OutputEvent, PlaybackStatus};
use super::playback::PlaybackController;

impl PlaybackController {
    /// Spawn the listener task; returns None if it was already started
    pub fn start_event_listener(&self) -> Option<JoinHandle<()>> {
        let mut events = self
            .events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()?;
        let controller = self.clone();
        tracing::info!("Starting audio output event listener");

        Some(tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                controller.handle_output_event(event).await;
            }
            tracing::debug!("Audio output event channel closed");
        }))
    }

    pub async fn handle_output_event(&self, OutputEvent { token, event }: OutputEvent) {
        let mut session = self.session.lock().await;

        if token != self.current_token() || session.status == PlaybackStatus::Idle {
            tracing::trace!(token, event = ?event, "Ignoring output event for a stale source");
            return;
        }

        match event {
            AudioEvent::TimeUpdate(position) => {
                tracing::trace!(position, "AudioEvent::TimeUpdate");
                session.current_time = if session.duration > 0.0 {
                    session.clamp_position(position)
                } else {
                    position.max(0.0)
                };
            }
            AudioEvent::MetadataReady { duration } => {
                tracing::debug!(duration, "AudioEvent::MetadataReady");
                if duration.is_finite() && duration > 0.0 {
                    session.duration = duration;
                    session.current_time = session.current_time.min(duration);
                }
            }
            AudioEvent::PlaybackStarted => {
                tracing::debug!("AudioEvent::PlaybackStarted");
                if matches!(session.status, PlaybackStatus::Loading | PlaybackStatus::Paused) {
                    session.status = PlaybackStatus::Playing;
                }
            }
            AudioEvent::PlaybackPaused => {
                tracing::debug!("AudioEvent::PlaybackPaused");
                if session.status == PlaybackStatus::Playing {
                    session.status = PlaybackStatus::Paused;
                }
            }
            AudioEvent::Ended => {
                tracing::info!("AudioEvent::Ended");
                session.status = PlaybackStatus::Paused;
                session.current_time = session.duration;
            }
            AudioEvent::Failed(reason) => {
                tracing::error!(reason = %reason, "AudioEvent::Failed");
                session.reset();
                drop(session);
                *self.last_error.lock().await = Some(Error::playback(reason).to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::playback::testing::{FakeOutput, FakeResolver};
    use super::*;
    use crate::model::Episode;

    fn episode() -> Episode {
        Episode {
            episode: Some(1),
            title: Some("Pilot".into()),
            description: None,
            file: Some("https://cdn.example.com/pilot.mp3".into()),
        }
    }

    async fn playing() -> (PlaybackController, Arc<FakeOutput>) {
        let output = Arc::new(FakeOutput::default());
        let controller = PlaybackController::new(output.clone(), Arc::new(FakeResolver::default()));
        controller.play(episode()).await.unwrap();
        (controller, output)
    }

    fn event(token: u64, event: AudioEvent) -> OutputEvent {
        OutputEvent { token, event }
    }

    #[tokio::test]
    async fn time_and_metadata_updates() {
        let (controller, _) = playing().await;
        let token = controller.current_token();

        controller.handle_output_event(event(token, AudioEvent::TimeUpdate(12.5))).await;
        assert_eq!(controller.session().await.current_time, 12.5);

        controller
            .handle_output_event(event(token, AudioEvent::MetadataReady { duration: 10.0 }))
            .await;
        let session = controller.session().await;
        assert_eq!(session.duration, 10.0);
        assert_eq!(session.current_time, 10.0);

        controller
            .handle_output_event(event(token, AudioEvent::MetadataReady { duration: f64::NAN }))
            .await;
        assert_eq!(controller.session().await.duration, 10.0);
    }

    #[tokio::test]
    async fn stale_events_are_ignored() {
        let (controller, _) = playing().await;
        let stale = controller.current_token() - 1;

        controller.handle_output_event(event(stale, AudioEvent::TimeUpdate(99.0))).await;
        controller.handle_output_event(event(stale, AudioEvent::PlaybackPaused)).await;

        let session = controller.session().await;
        assert_eq!(session.current_time, 0.0);
        assert_eq!(session.status, PlaybackStatus::Playing);
    }

    #[tokio::test]
    async fn external_pause_end_and_failure() {
        let (controller, _) = playing().await;
        let token = controller.current_token();

        controller.handle_output_event(event(token, AudioEvent::PlaybackPaused)).await;
        assert_eq!(controller.status().await, PlaybackStatus::Paused);
        controller.handle_output_event(event(token, AudioEvent::PlaybackStarted)).await;
        assert_eq!(controller.status().await, PlaybackStatus::Playing);

        controller
            .handle_output_event(event(token, AudioEvent::MetadataReady { duration: 60.0 }))
            .await;
        controller.handle_output_event(event(token, AudioEvent::Ended)).await;
        let session = controller.session().await;
        assert_eq!(session.status, PlaybackStatus::Paused);
        assert_eq!(session.current_time, 60.0);

        controller
            .handle_output_event(event(token, AudioEvent::Failed("decode error".into())))
            .await;
        assert_eq!(controller.status().await, PlaybackStatus::Idle);
        assert!(controller.session().await.episode.is_none());
        assert_eq!(
            controller.last_error().await.as_deref(),
            Some("Playback error: decode error")
        );
    }

    #[tokio::test]
    async fn listener_applies_events_without_polling() {
        let (controller, output) = playing().await;
        let handle = controller.start_event_listener();
        assert!(handle.is_some());
        assert!(controller.start_event_listener().is_none());

        output.emit(controller.current_token(), AudioEvent::TimeUpdate(42.0));

        for _ in 0..100 {
            if controller.session().await.current_time == 42.0 {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("listener never applied the time update");
    }
}
