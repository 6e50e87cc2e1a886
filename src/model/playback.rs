//! Playback-related types and state

use super::types::Episode;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
}

/// The single live audio state
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaybackSession {
    pub episode: Option<Episode>,
    pub status: PlaybackStatus,
    pub current_time: f64,
    pub duration: f64,
}

impl PlaybackSession {
    /// Episode, status and timing for a fresh load
    pub(crate) fn begin_loading(&mut self, episode: Episode) {
        self.episode = Some(episode);
        self.status = PlaybackStatus::Loading;
        self.current_time = 0.0;
        self.duration = 0.0;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    /// Clamp a requested position to `[0, duration]`
    pub fn clamp_position(&self, seconds: f64) -> f64 {
        if seconds.is_nan() {
            return 0.0;
        }
        seconds.clamp(0.0, self.duration.max(0.0))
    }

    pub fn progress_ratio(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Notifications reported by the bound audio output
#[derive(Clone, Debug, PartialEq)]
pub enum AudioEvent {
    TimeUpdate(f64),
    MetadataReady { duration: f64 },
    PlaybackStarted,
    PlaybackPaused,
    Ended,
    Failed(String),
}

/// An [`AudioEvent`] tagged with the request token of the load that produced it
#[derive(Clone, Debug, PartialEq)]
pub struct OutputEvent {
    pub token: u64,
    pub event: AudioEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_position_bounds() {
        let session = PlaybackSession {
            duration: 300.0,
            ..Default::default()
        };
        assert_eq!(session.clamp_position(-5.0), 0.0);
        assert_eq!(session.clamp_position(400.0), 300.0);
        assert_eq!(session.clamp_position(120.5), 120.5);
        assert_eq!(session.clamp_position(f64::NAN), 0.0);

        let unknown = PlaybackSession::default();
        assert_eq!(unknown.clamp_position(10.0), 0.0);
    }

    #[test]
    fn progress_ratio_handles_unknown_duration() {
        let mut session = PlaybackSession::default();
        assert_eq!(session.progress_ratio(), 0.0);
        session.duration = 200.0;
        session.current_time = 50.0;
        assert_eq!(session.progress_ratio(), 0.25);
    }
}
