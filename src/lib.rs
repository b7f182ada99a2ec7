//! coversync keeps a group cover banner in sync with "now playing" status.
//!
//! A [`Scheduler`] ticks a [`SyncEngine`], which polls a [`StatusProvider`], decides whether
//! the banner is stale, resolves artist avatars through a [`DirectoryLookup`], renders a new
//! banner with a [`CoverRenderer`] (normally the raster [`Compositor`]) and hands it to an
//! [`ImagePublisher`].
//!
//! - At most one generation runs at a time; overlapping ticks report [`Evaluation::Busy`].
//! - Throttling ([`CoverError::RateLimited`]) pauses ticks with linear backoff and removes
//!   the banner.
//! - Composition is pure: images are fetched up front into [`PreparedCoverAssets`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod artists;
pub(crate) mod assets;
pub(crate) mod capability;
pub(crate) mod config;
/// File-backed capabilities for local runs.
pub mod local;
pub(crate) mod model;
pub(crate) mod render;
pub(crate) mod sync;

pub use crate::foundation::core::{BezPath, Canvas, Point, Rect, Rgba8};
pub use crate::foundation::error::{CoverError, CoverResult};

pub use crate::artists::ArtistResolver;
pub use crate::assets::decode::{PreparedImage, decode_image};
pub use crate::assets::fetch::{DefaultImageFetcher, FileImageFetcher, HttpImageFetcher};
pub use crate::assets::fonts::CoverFonts;
pub use crate::assets::store::PreparedCoverAssets;
pub use crate::capability::{
    CoverRenderer, DirectoryCandidate, DirectoryLookup, ImageFetcher, ImagePublisher,
    StatusProvider,
};
pub use crate::config::{LocalConfig, POLL_INTERVAL_ENV, SyncConfig};
pub use crate::model::cover::{ArtistDisplay, CoverRequest, avatars_first};
pub use crate::model::status::{
    CoverIdentity, ListenerIdentity, StatusQuery, StatusRecord, StatusSubject,
};
pub use crate::render::compose::{ComposeReport, Compositor, CoverElement};
pub use crate::render::frame::{CoverFrame, EncodedCover, OutputFormat};
pub use crate::render::layout::{CoverLayout, rounded_rect_path};
pub use crate::render::text::{FIT_TOLERANCE_PX, FittedText, TextLayoutEngine, fit_font_size};
pub use crate::sync::engine::{Capabilities, EngineSettings, Evaluation, SyncEngine};
pub use crate::sync::scheduler::{AccountRotation, Scheduler, TickOutcome};
pub use crate::sync::state::SyncState;
