use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;

use crate::{
    capability::ImageFetcher,
    foundation::error::{CoverError, CoverResult},
};

/// Fetches images over HTTP(S).
#[derive(Clone, Debug, Default)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    /// Fetcher using an existing client (timeouts, proxies, user agent).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> CoverResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CoverError::transient(format!("GET {url}: {e}")))?;
        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CoverError::rate_limited(format!("GET {url}: {status}")));
        }
        if !status.is_success() {
            return Err(CoverError::transient(format!("GET {url}: {status}")));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| CoverError::transient(format!("GET {url}: {e}")))?;
        Ok(bytes.to_vec())
    }
}

/// Reads images from the local filesystem (`file://` URLs or bare paths).
#[derive(Clone, Debug, Default)]
pub struct FileImageFetcher {
    root: Option<PathBuf>,
}

impl FileImageFetcher {
    /// Relative paths resolve against `root`.
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, url: &str) -> PathBuf {
        let raw = PathBuf::from(url.strip_prefix("file://").unwrap_or(url));
        match &self.root {
            Some(root) if raw.is_relative() => root.join(raw),
            _ => raw,
        }
    }
}

#[async_trait]
impl ImageFetcher for FileImageFetcher {
    async fn fetch(&self, url: &str) -> CoverResult<Vec<u8>> {
        let path = self.resolve(url);
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("read image {}", path.display()))?;
        Ok(bytes)
    }
}

/// Dispatches `http://`/`https://` to HTTP and everything else to the filesystem.
#[derive(Clone, Debug, Default)]
pub struct DefaultImageFetcher {
    http: HttpImageFetcher,
    files: FileImageFetcher,
}

impl DefaultImageFetcher {
    /// Dispatcher with explicit backends.
    pub fn new(http: HttpImageFetcher, files: FileImageFetcher) -> Self {
        Self { http, files }
    }
}

#[async_trait]
impl ImageFetcher for DefaultImageFetcher {
    async fn fetch(&self, url: &str) -> CoverResult<Vec<u8>> {
        if url.starts_with("http://") || url.starts_with("https://") {
            self.http.fetch(url).await
        } else {
            self.files.fetch(url).await
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
