use std::collections::HashMap;

use crate::{
    assets::decode::{PreparedImage, decode_image},
    capability::ImageFetcher,
    model::cover::CoverRequest,
};

#[derive(Clone, Debug, Default)]
/// Images referenced by one [`CoverRequest`], fetched and decoded ahead of composition.
///
/// A URL that failed to fetch or decode is simply absent; the compositor
/// skips the element that needed it.
pub struct PreparedCoverAssets {
    images: HashMap<String, PreparedImage>,
    failed: Vec<String>,
}

impl PreparedCoverAssets {
    /// Fetch and decode every image URL of `request`, one at a time.
    #[tracing::instrument(skip_all, fields(urls = request.image_urls().len()))]
    pub async fn prepare(request: &CoverRequest, fetcher: &dyn ImageFetcher) -> Self {
        let mut out = Self::default();
        for url in request.image_urls() {
            let bytes = match fetcher.fetch(url).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    tracing::warn!(url, error = %err, "image fetch failed, element will be skipped");
                    out.failed.push(url.to_string());
                    continue;
                }
            };
            match decode_image(&bytes) {
                Ok(img) => {
                    out.images.insert(url.to_string(), img);
                }
                Err(err) => {
                    tracing::warn!(url, error = %err, "image decode failed, element will be skipped");
                    out.failed.push(url.to_string());
                }
            }
        }
        out
    }

    /// Register an already decoded image.
    pub fn insert(&mut self, url: impl Into<String>, image: PreparedImage) {
        self.images.insert(url.into(), image);
    }

    /// Decoded image behind `url`, if it was prepared successfully.
    pub fn image(&self, url: &str) -> Option<&PreparedImage> {
        self.images.get(url)
    }

    /// Look up an optional URL.
    pub fn image_opt(&self, url: Option<&str>) -> Option<&PreparedImage> {
        url.and_then(|u| self.image(u))
    }

    /// URLs that could not be fetched or decoded.
    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    /// Number of decoded images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether no image was prepared.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
