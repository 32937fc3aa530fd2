//! Document retrieval
//!
//! One retrieval and one parse per call, no retries. HTTP(S) locations go
//! through `reqwest`; `file://` locations and plain paths are read from disk.

use crate::config::FetchConfig;
use crate::rdf::{ParseError, QuadStore, RdfFormat, RdfParser};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Url};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Fetch errors
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Cannot build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {location} failed: {source}")]
    Http {
        location: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{location} returned HTTP status {status}")]
    Status { location: String, status: u16 },

    #[error("Cannot read {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse {location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: ParseError,
    },

    #[error("Unsupported location scheme: {0}")]
    UnsupportedLocation(String),

    #[error("Not a local file URL: {0}")]
    InvalidFileUrl(String),
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Retrieves and parses one RDF document
#[async_trait]
pub trait GraphFetcher: Send + Sync {
    async fn fetch(&self, location: &str) -> FetchResult<QuadStore>;
}

/// Default fetcher: HTTP(S) with content negotiation, local files from disk
#[derive(Debug, Clone)]
pub struct HttpGraphFetcher {
    client: Client,
}

impl HttpGraphFetcher {
    pub fn new(config: &FetchConfig) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    async fn fetch_http(&self, location: &str) -> FetchResult<QuadStore> {
        let http_error = |source| FetchError::Http {
            location: location.to_string(),
            source,
        };

        let response = self
            .client
            .get(location)
            .header(ACCEPT, RdfFormat::accept_header())
            .send()
            .await
            .map_err(http_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                location: location.to_string(),
                status: status.as_u16(),
            });
        }

        let base = response.url().to_string();
        let format = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(RdfFormat::from_media_type)
            .or_else(|| RdfFormat::from_location(&base))
            .unwrap_or(RdfFormat::Turtle);

        let body = response.text().await.map_err(http_error)?;
        parse_document(location, &body, format, &base)
    }

    async fn fetch_file(&self, location: &str, path: PathBuf) -> FetchResult<QuadStore> {
        let io_error = |source| FetchError::Io {
            location: location.to_string(),
            source,
        };

        let path = tokio::fs::canonicalize(&path).await.map_err(io_error)?;
        let body = tokio::fs::read_to_string(&path).await.map_err(io_error)?;

        let base = Url::from_file_path(&path)
            .map_err(|_| FetchError::InvalidFileUrl(path.display().to_string()))?
            .to_string();
        let format = RdfFormat::from_location(&base).unwrap_or(RdfFormat::Turtle);
        parse_document(location, &body, format, &base)
    }
}

#[async_trait]
impl GraphFetcher for HttpGraphFetcher {
    async fn fetch(&self, location: &str) -> FetchResult<QuadStore> {
        info!(location, "Fetching document");

        let quads = if location.starts_with("http://") || location.starts_with("https://") {
            self.fetch_http(location).await?
        } else if location.starts_with("file://") {
            let path = Url::parse(location)
                .ok()
                .and_then(|url| url.to_file_path().ok())
                .ok_or_else(|| FetchError::InvalidFileUrl(location.to_string()))?;
            self.fetch_file(location, path).await?
        } else if location.contains("://") {
            return Err(FetchError::UnsupportedLocation(location.to_string()));
        } else {
            self.fetch_file(location, PathBuf::from(location)).await?
        };

        debug!(location, quads = quads.len(), "Fetched document");
        Ok(quads)
    }
}

fn parse_document(
    location: &str,
    body: &str,
    format: RdfFormat,
    base: &str,
) -> FetchResult<QuadStore> {
    debug!(location, %format, "Parsing document");
    RdfParser::parse(body, format, Some(base))
        .map(QuadStore::from)
        .map_err(|source| FetchError::Parse {
            location: location.to_string(),
            source,
        })
}
