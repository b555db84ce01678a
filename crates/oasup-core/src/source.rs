//! Source acquisition for local paths and remote URLs
//!
//! A designator is classified once by [`SourceKind::classify`]; remote
//! designators go through an injected [`Fetch`] implementation and local
//! ones are read from disk.

use crate::config::HttpOptions;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, instrument};
use url::Url;

/// How a source designator is acquired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Remote,
    Local,
}

impl SourceKind {
    /// Classify a designator by its shape alone
    pub fn classify(designator: &str) -> Self {
        let has_prefix = |prefix: &str| {
            designator
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        };
        if has_prefix("http://") || has_prefix("https://") {
            SourceKind::Remote
        } else {
            SourceKind::Local
        }
    }
}

/// Location relative references in a source are resolved against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceBase {
    Directory(PathBuf),
    Url(Url),
}

/// Raw source text together with where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSource {
    pub designator: String,
    pub kind: SourceKind,
    pub text: String,
    pub base: SourceBase,
}

impl LoadedSource {
    /// Wrap already-available text as a local source rooted at `dir`
    pub fn from_text(
        designator: impl Into<String>,
        text: impl Into<String>,
        dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            designator: designator.into(),
            kind: SourceKind::Local,
            text: text.into(),
            base: SourceBase::Directory(dir.into()),
        }
    }
}

/// Retrieves the body of a remote document
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String>;
}

/// [`Fetch`] implementation backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: ReqwestClient,
}

impl HttpFetcher {
    pub fn new(options: &HttpOptions) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(options.timeout())
            .user_agent(options.user_agent.clone())
            .build()
            .map_err(|e| Error::Http {
                message: format!("Failed to create HTTP client: {}", e),
                status_code: None,
                source: Some(e),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        let response = self.client.get(url.clone()).send().await.map_err(|e| Error::Http {
            message: format!("Cannot reach {}: {}", url.host_str().unwrap_or("remote host"), e),
            status_code: e.status().map(|s| s.as_u16()),
            source: Some(e),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                message: format!("Request failed with status {}", status),
                status_code: Some(status.as_u16()),
                source: None,
            });
        }

        response.text().await.map_err(|e| Error::Http {
            message: format!("Failed to read response body: {}", e),
            status_code: Some(status.as_u16()),
            source: Some(e),
        })
    }
}

/// Loads source documents by designator
#[derive(Clone)]
pub struct SourceLoader {
    fetcher: Arc<dyn Fetch>,
}

impl std::fmt::Debug for SourceLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceLoader").finish_non_exhaustive()
    }
}

impl SourceLoader {
    /// Create a loader with a custom fetcher
    pub fn new(fetcher: Arc<dyn Fetch>) -> Self {
        Self { fetcher }
    }

    /// Create a loader that fetches over HTTP
    pub fn with_http(options: &HttpOptions) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpFetcher::new(options)?)))
    }

    /// Load a designator through the path matching its kind
    pub async fn load(&self, designator: &str) -> Result<LoadedSource> {
        match SourceKind::classify(designator) {
            SourceKind::Remote => self.load_remote(designator).await,
            SourceKind::Local => self.load_local(designator).await,
        }
    }

    #[instrument(skip(self, designator))]
    pub async fn load_remote(&self, designator: &str) -> Result<LoadedSource> {
        let url = Url::parse(designator).map_err(|e| Error::Http {
            message: format!("Invalid URL: {}", e),
            status_code: None,
            source: None,
        })?;
        debug!(host = url.host_str().unwrap_or_default(), "fetching remote source");

        let text = self.fetcher.fetch(&url).await?;
        Ok(LoadedSource {
            designator: designator.to_string(),
            kind: SourceKind::Remote,
            text,
            base: SourceBase::Url(url),
        })
    }

    #[instrument(skip(self))]
    pub async fn load_local(&self, designator: &str) -> Result<LoadedSource> {
        let path = Path::new(designator);
        let text = tokio::fs::read_to_string(path).await.map_err(|e| Error::Source {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!(bytes = text.len(), "read local source");

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(LoadedSource::from_text(designator, text, dir))
    }
}
