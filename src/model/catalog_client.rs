//! HTTP client for the remote podcast catalog

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use super::types::{Podcast, ShowDetail};

pub const DEFAULT_BASE_URL: &str = "https://podcast-api.netlify.app";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("podcast-rs/", env!("CARGO_PKG_VERSION"));

/// Source of catalog data
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn fetch_all_podcasts(&self) -> Result<Vec<Podcast>>;
    async fn fetch_show(&self, id: &str) -> Result<ShowDetail>;
}

/// Catalog backed by the remote REST service
///
/// `GET /` lists every show, `GET /id/{id}` returns one show with its
/// seasons. Nothing is cached here.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    pub fn builder() -> CatalogClientBuilder {
        CatalogClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Shared HTTP client, reused by the audio resolver
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!(url, "Catalog request started");

        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::error!(url, error = %e, "Catalog request failed");
            Error::catalog(None, e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(url, status = status.as_u16(), "Catalog returned an error status");
            return Err(Error::catalog(
                Some(status.as_u16()),
                status.canonical_reason().unwrap_or("request failed"),
            ));
        }

        response.json::<T>().await.map_err(|e| {
            tracing::error!(url, error = %e, "Catalog response could not be decoded");
            Error::catalog(Some(status.as_u16()), format!("invalid response body: {}", e))
        })
    }
}

#[async_trait]
impl Catalog for CatalogClient {
    async fn fetch_all_podcasts(&self) -> Result<Vec<Podcast>> {
        let url = format!("{}/", self.base_url);
        let podcasts: Vec<Podcast> = self.get_json(&url).await?;
        tracing::info!(count = podcasts.len(), "Catalog loaded");
        Ok(podcasts)
    }

    async fn fetch_show(&self, id: &str) -> Result<ShowDetail> {
        let url = format!("{}/id/{}", self.base_url, id);
        let detail: ShowDetail = self.get_json(&url).await?;
        tracing::info!(
            id,
            title = %detail.title,
            seasons = detail.season_count(),
            episodes = detail.episode_count(),
            "Show detail loaded"
        );
        Ok(detail)
    }
}

pub struct CatalogClientBuilder {
    client: Option<Client>,
    base_url: String,
    timeout: Duration,
    user_agent: String,
}

impl Default for CatalogClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CatalogClientBuilder {
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> Result<CatalogClient> {
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .timeout(self.timeout)
                .user_agent(self.user_agent)
                .build()
                .map_err(|e| Error::catalog(None, format!("could not build HTTP client: {}", e)))?,
        };

        Ok(CatalogClient {
            client,
            base_url: self.base_url.trim_end_matches('/').to_string(),
        })
    }
}
