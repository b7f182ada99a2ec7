//! External capabilities the sync engine talks to.
//!
//! Every call is a suspension point; the engine awaits them strictly in sequence.
//! Timeouts are the implementor's business.

use async_trait::async_trait;

use crate::{
    assets::store::PreparedCoverAssets,
    foundation::error::CoverResult,
    model::cover::CoverRequest,
    model::status::{StatusQuery, StatusRecord},
    render::frame::EncodedCover,
};

/// Source of "now playing" records.
#[async_trait]
pub trait StatusProvider: Send + Sync {
    /// Current status for the queried subject, or `None` when nothing is playing.
    ///
    /// Throttling must surface as [`crate::CoverError::RateLimited`].
    async fn fetch_status(&self, query: &StatusQuery) -> CoverResult<Option<StatusRecord>>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// One match returned by a [`DirectoryLookup`].
pub struct DirectoryCandidate {
    /// Name as known to the directory.
    pub name: String,
    /// Avatar image URL, if the entry has one.
    pub avatar_url: Option<String>,
}

/// Artist directory used to find avatars by name.
#[async_trait]
pub trait DirectoryLookup: Send + Sync {
    /// Zero or more candidates for `name`, best match first.
    async fn find_by_name(&self, name: &str) -> CoverResult<Vec<DirectoryCandidate>>;
}

/// Destination banner.
#[async_trait]
pub trait ImagePublisher: Send + Sync {
    /// Upload `cover` as the current banner.
    async fn publish(&self, cover: EncodedCover) -> CoverResult<()>;

    /// Restore the default (empty) banner.
    async fn remove(&self) -> CoverResult<()>;
}

/// Byte source for album art and avatars.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Raw encoded image bytes behind `url`.
    async fn fetch(&self, url: &str) -> CoverResult<Vec<u8>>;
}

/// Turns a request plus its prepared images into an encoded banner.
///
/// Implementations must not perform IO; everything external is in `assets`.
pub trait CoverRenderer: Send + Sync {
    /// Render and encode one banner.
    fn render(
        &self,
        request: &CoverRequest,
        assets: &PreparedCoverAssets,
    ) -> CoverResult<EncodedCover>;
}
