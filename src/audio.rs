//! Audio collaborators: URL resolution and the output the controller drives

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::error::{Error, ResolveFailure, Result};
use crate::model::{AudioEvent, OutputEvent};

/// Bitrate assumed when estimating a duration from `Content-Length`
const ASSUMED_BITRATE_BPS: f64 = 128_000.0;
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// A playable audio reference
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedAudio {
    pub url: String,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    /// Soft failure: the resource answered but does not look like audio
    pub warning: Option<String>,
}

impl ResolvedAudio {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content_type: None,
            content_length: None,
            warning: None,
        }
    }

    pub fn estimated_duration(&self) -> Option<f64> {
        self.content_length
            .filter(|len| *len > 0)
            .map(|len| len as f64 * 8.0 / ASSUMED_BITRATE_BPS)
    }
}

#[async_trait]
pub trait AudioResolver: Send + Sync {
    async fn resolve(&self, url: &str) -> Result<ResolvedAudio>;
}

/// Checks reachability and content type with a HEAD request
#[derive(Clone, Debug)]
pub struct HttpAudioResolver {
    client: Client,
}

impl HttpAudioResolver {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn is_audio_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime.starts_with("audio/") || mime == "application/octet-stream"
}

#[async_trait]
impl AudioResolver for HttpAudioResolver {
    async fn resolve(&self, url: &str) -> Result<ResolvedAudio> {
        let parsed = url::Url::parse(url.trim())
            .map_err(|_| Error::ResourceUnavailable(ResolveFailure::Missing))?;

        tracing::debug!(url = %parsed, "Resolving audio resource");
        let response = self
            .client
            .head(parsed.clone())
            .send()
            .await
            .map_err(|e| Error::ResourceUnavailable(ResolveFailure::Unreachable(e.to_string())))?;

        let status = response.status();
        let mut resolved = ResolvedAudio::new(parsed.as_str());

        // Some CDNs refuse HEAD; the resource may still stream fine
        if status == StatusCode::METHOD_NOT_ALLOWED {
            tracing::debug!(url = %parsed, "HEAD not allowed, skipping type check");
            return Ok(resolved);
        }
        if !status.is_success() {
            return Err(Error::ResourceUnavailable(ResolveFailure::Unreachable(format!(
                "HTTP {}",
                status.as_u16()
            ))));
        }

        let headers = response.headers();
        resolved.content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        resolved.content_length = headers
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());

        if let Some(content_type) = resolved.content_type.as_deref() {
            if !is_audio_type(content_type) {
                tracing::warn!(url = %parsed, content_type, "Audio resource has an unexpected content type");
                resolved.warning = Some(format!("wrong-type: {}", content_type));
            }
        }

        Ok(resolved)
    }
}

/// The single audio output owned by the playback controller
#[async_trait]
pub trait AudioOutput: Send + Sync {
    /// Bind a source; events it produces carry `token`
    async fn load(&self, source: &ResolvedAudio, token: u64) -> Result<()>;
    /// Resolves once the output has actually started
    async fn play(&self) -> Result<()>;
    async fn pause(&self) -> Result<()>;
    async fn seek(&self, seconds: f64) -> Result<()>;
    async fn stop(&self) -> Result<()>;
    fn subscribe(&self) -> mpsc::UnboundedReceiver<OutputEvent>;
}

#[derive(Default)]
struct Subscribers(std::sync::Mutex<Vec<mpsc::UnboundedSender<OutputEvent>>>);

impl Subscribers {
    fn add(&self) -> mpsc::UnboundedReceiver<OutputEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(tx);
        rx
    }

    fn emit(&self, token: u64, event: AudioEvent) {
        let mut senders = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        senders.retain(|tx| {
            tx.send(OutputEvent {
                token,
                event: event.clone(),
            })
            .is_ok()
        });
    }
}

#[derive(Default)]
struct ClockState {
    token: u64,
    source: Option<String>,
    duration: Option<f64>,
    base_position: f64,
    started_at: Option<Instant>,
}

impl ClockState {
    fn position(&self) -> f64 {
        let elapsed = self
            .started_at
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        let position = self.base_position + elapsed;
        match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        }
    }

    fn freeze(&mut self) {
        self.base_position = self.position();
        self.started_at = None;
    }
}

struct HeadlessInner {
    state: Mutex<ClockState>,
    subscribers: Subscribers,
}

/// Output without a sound device: a wall clock that reports progress like a media element
pub struct HeadlessOutput {
    inner: Arc<HeadlessInner>,
    ticker: JoinHandle<()>,
}

impl HeadlessOutput {
    /// Must be called from within a tokio runtime
    pub fn new() -> Self {
        let inner = Arc::new(HeadlessInner {
            state: Mutex::new(ClockState::default()),
            subscribers: Subscribers::default(),
        });

        let ticker_inner = inner.clone();
        let ticker = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            loop {
                interval.tick().await;
                let mut state = ticker_inner.state.lock().await;
                if state.started_at.is_none() {
                    continue;
                }

                let position = state.position();
                let token = state.token;
                ticker_inner.subscribers.emit(token, AudioEvent::TimeUpdate(position));

                if state.duration.is_some_and(|d| position >= d) {
                    state.freeze();
                    ticker_inner.subscribers.emit(token, AudioEvent::Ended);
                }
            }
        });

        Self { inner, ticker }
    }
}

impl Drop for HeadlessOutput {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}

#[async_trait]
impl AudioOutput for HeadlessOutput {
    async fn load(&self, source: &ResolvedAudio, token: u64) -> Result<()> {
        let mut state = self.inner.state.lock().await;
        *state = ClockState {
            token,
            source: Some(source.url.clone()),
            duration: source.estimated_duration(),
            ..Default::default()
        };
        tracing::debug!(url = %source.url, token, duration = ?state.duration, "Headless output loaded source");

        if let Some(duration) = state.duration {
            self.inner
                .subscribers
                .emit(token, AudioEvent::MetadataReady { duration });
        }
        Ok(())
    }

    async fn play(&self) -> Result<()> {
        let mut state = self.inner.state.lock().await;
        if state.source.is_none() {
            return Err(Error::playback("no source bound to the output"));
        }
        if state.started_at.is_none() {
            state.started_at = Some(Instant::now());
        }
        self.inner
            .subscribers
            .emit(state.token, AudioEvent::PlaybackStarted);
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        let mut state = self.inner.state.lock().await;
        state.freeze();
        self.inner
            .subscribers
            .emit(state.token, AudioEvent::PlaybackPaused);
        Ok(())
    }

    async fn seek(&self, seconds: f64) -> Result<()> {
        let mut state = self.inner.state.lock().await;
        state.base_position = seconds.max(0.0);
        if state.started_at.is_some() {
            state.started_at = Some(Instant::now());
        }
        let position = state.position();
        self.inner
            .subscribers
            .emit(state.token, AudioEvent::TimeUpdate(position));
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let mut state = self.inner.state.lock().await;
        let token = state.token;
        *state = ClockState {
            token,
            ..Default::default()
        };
        Ok(())
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<OutputEvent> {
        self.inner.subscribers.add()
    }
}
