//! Search backends.
//!
//! The controller talks to a [`SearchBackend`] so tests can substitute a
//! scripted backend; the real one speaks HTTP to the API service.

use serde::Deserialize;
use tracing::instrument;

use shilpkaar_search::{
    ArtisanQueryParams, ArtisanSearchResponse, ProductQueryParams, ProductSearchResponse,
    Suggestion,
};

/// Client-side errors.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server's index is still building. Retryable.
    #[error("search is temporarily unavailable")]
    Unavailable,
    /// The server rejected a query parameter.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("unexpected response status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Something that can answer search requests.
pub trait SearchBackend {
    fn search_products(
        &self,
        params: &ProductQueryParams,
    ) -> impl Future<Output = Result<ProductSearchResponse, ClientError>> + Send;

    fn search_artisans(
        &self,
        params: &ArtisanQueryParams,
    ) -> impl Future<Output = Result<ArtisanSearchResponse, ClientError>> + Send;

    fn suggest(&self, input: &str)
    -> impl Future<Output = Result<Vec<Suggestion>, ClientError>> + Send;
}

/// Error body shape returned by the API.
#[derive(Debug, Deserialize)]
struct ApiError {
    error: String,
}

/// HTTP backend against the API service.
#[derive(Debug, Clone)]
pub struct HttpSearchBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpSearchBackend {
    /// Create a backend for the given base URL (no trailing slash).
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { http, base_url }
    }

    #[instrument(skip(self, query))]
    async fn get_json<T, Q>(&self, path: &str, query: &Q) -> Result<T, ClientError>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + Sync,
    {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = response
            .json::<ApiError>()
            .await
            .map_or_else(|_| status.to_string(), |body| body.error);

        match status.as_u16() {
            503 => Err(ClientError::Unavailable),
            400 => Err(ClientError::InvalidQuery(message)),
            code => Err(ClientError::Status {
                status: code,
                message,
            }),
        }
    }
}

impl SearchBackend for HttpSearchBackend {
    async fn search_products(
        &self,
        params: &ProductQueryParams,
    ) -> Result<ProductSearchResponse, ClientError> {
        self.get_json("/api/products/search", params).await
    }

    async fn search_artisans(
        &self,
        params: &ArtisanQueryParams,
    ) -> Result<ArtisanSearchResponse, ClientError> {
        self.get_json("/api/artisans/search", params).await
    }

    async fn suggest(&self, input: &str) -> Result<Vec<Suggestion>, ClientError> {
        self.get_json("/api/products/suggest", &[("q", input)]).await
    }
}
