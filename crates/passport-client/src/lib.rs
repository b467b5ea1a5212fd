//! Passport Client - reqwest access to a Passport server.
//!
//! Every public method logs failures and reports them as `false` or `None`,
//! so callers only see whether the server carried out the request.

use reqwest::{RequestBuilder, StatusCode, Url};
use thiserror::Error;

use passport_core::{
    decode_collector, encode_collector, encode_visit, CodecError, CollectorDocument,
    CountryCollector, Username, Visit, World, WorldDocument, WorldResolver,
};

/// Why a request did not succeed.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error: {0}")]
    Status(StatusCode),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Invalid world: {0}")]
    World(#[from] passport_core::WorldError),

    #[error("Invalid base URL: {0}")]
    BaseUrl(String),
}

/// HTTP client for the `/countryCollector` and `/world` routes.
#[derive(Debug, Clone)]
pub struct PassportClient {
    client: reqwest::Client,
    base_url: String,
}

impl PassportClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `base_url` with `segments` appended, each percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ClientError::BaseUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::BaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn collector_url(&self, user: &Username, tail: &[&str]) -> Result<Url, ClientError> {
        let mut segments = vec!["countryCollector", user.as_str()];
        segments.extend_from_slice(tail);
        self.url(&segments)
    }

    /// The stored collector, decoded with `resolver`. `None` when the user
    /// has no collector or the request failed.
    pub async fn fetch_collector(
        &self,
        user: &Username,
        resolver: &WorldResolver,
    ) -> Option<CountryCollector> {
        match self.try_fetch_collector(user, resolver).await {
            Ok(collector) => collector,
            Err(e) => {
                tracing::warn!(%user, "Failed to fetch collector: {}", e);
                None
            }
        }
    }

    async fn try_fetch_collector(
        &self,
        user: &Username,
        resolver: &WorldResolver,
    ) -> Result<Option<CountryCollector>, ClientError> {
        let response = self
            .client
            .get(self.collector_url(user, &[])?)
            .send()
            .await?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(None),
            status if status.is_success() => {
                let doc: CollectorDocument = response.json().await?;
                Ok(Some(decode_collector(doc, resolver)?))
            }
            status => Err(ClientError::Status(status)),
        }
    }

    /// Replace the user's collector. The world is embedded.
    pub async fn store_collector(&self, user: &Username, collector: &CountryCollector) -> bool {
        let request = self
            .collector_url(user, &[])
            .map(|url| self.client.put(url).json(&encode_collector(collector, true)));
        self.expect_true(request, "store collector").await
    }

    pub async fn delete_collector(&self, user: &Username) -> bool {
        let request = self
            .collector_url(user, &[])
            .map(|url| self.client.delete(url));
        self.expect_true(request, "delete collector").await
    }

    pub async fn rename_collector(&self, from: &Username, to: &Username) -> bool {
        let request = self
            .collector_url(from, &["rename", to.as_str()])
            .map(|url| self.client.post(url));
        self.expect_true(request, "rename collector").await
    }

    pub async fn register_visit(&self, user: &Username, visit: &Visit) -> bool {
        let request = self
            .collector_url(user, &["visit", "register"])
            .map(|url| self.client.put(url).json(&encode_visit(visit)));
        self.expect_true(request, "register visit").await
    }

    /// `false` also when the user had no such visit.
    pub async fn remove_visit(&self, user: &Username, visit: &Visit) -> bool {
        let request = self
            .collector_url(user, &["visit", "remove"])
            .map(|url| self.client.put(url).json(&encode_visit(visit)));
        self.expect_true(request, "remove visit").await
    }

    pub async fn fetch_world(&self, name: &str) -> Option<World> {
        match self.try_fetch_world(name).await {
            Ok(world) => Some(world),
            Err(e) => {
                tracing::warn!(world = name, "Failed to fetch world: {}", e);
                None
            }
        }
    }

    async fn try_fetch_world(&self, name: &str) -> Result<World, ClientError> {
        let response = self.client.get(self.url(&["world", name])?).send().await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }

        let doc: WorldDocument = response.json().await?;
        Ok(World::try_from(doc)?)
    }

    async fn expect_true(
        &self,
        request: Result<RequestBuilder, ClientError>,
        action: &str,
    ) -> bool {
        match Self::send_for_bool(request).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Failed to {}: {}", action, e);
                false
            }
        }
    }

    async fn send_for_bool(
        request: Result<RequestBuilder, ClientError>,
    ) -> Result<bool, ClientError> {
        let response = request?.send().await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }

        Ok(response.json::<bool>().await?)
    }
}
