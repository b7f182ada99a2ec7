use std::{sync::Arc, time::Duration};

use tokio::time::Instant;

use crate::{
    artists::ArtistResolver,
    assets::store::PreparedCoverAssets,
    capability::{CoverRenderer, DirectoryLookup, ImageFetcher, ImagePublisher, StatusProvider},
    foundation::error::{CoverError, CoverResult},
    model::{
        cover::CoverRequest,
        status::{CoverIdentity, StatusQuery, StatusRecord, StatusSubject},
    },
    sync::state::{GenerationGuard, SharedState, SyncState},
};

/// Result of one [`SyncEngine::evaluate`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Evaluation {
    /// Nothing to do: same track, still fresh (or nothing playing and nothing shown).
    Unchanged,
    /// A new banner went out.
    Published(CoverIdentity),
    /// The destination was reset to its default banner.
    Cleared,
    /// Another generation holds the lock; the next tick retries.
    Busy,
}

/// Engine knobs that do not involve capabilities.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineSettings {
    /// Group whose banner is managed.
    pub destination: i64,
    /// Consulted in order when the destination has no status.
    pub fallbacks: Vec<i64>,
    /// Refresh an unchanged track once its banner is this old. `None` never refreshes.
    pub staleness_window: Option<Duration>,
    /// Width of the time bucket folded into the cover identity.
    pub identity_bucket: Option<Duration>,
}

impl EngineSettings {
    /// Settings for `destination` with no fallbacks, no refresh and no bucketing.
    pub fn new(destination: i64) -> Self {
        Self {
            destination,
            fallbacks: Vec::new(),
            staleness_window: None,
            identity_bucket: None,
        }
    }
}

/// Everything the engine talks to.
#[derive(Clone)]
pub struct Capabilities {
    /// Now-playing source.
    pub status: Arc<dyn StatusProvider>,
    /// Artist avatar directory.
    pub directory: Arc<dyn DirectoryLookup>,
    /// Image bytes for album art and avatars.
    pub fetcher: Arc<dyn ImageFetcher>,
    /// Banner renderer.
    pub renderer: Arc<dyn CoverRenderer>,
    /// Destination banner.
    pub publisher: Arc<dyn ImagePublisher>,
}

/// Single-flight sync state machine for one destination banner.
pub struct SyncEngine {
    settings: EngineSettings,
    caps: Capabilities,
    resolver: ArtistResolver,
    state: SharedState,
    started: Instant,
}

impl SyncEngine {
    /// Engine over `caps`. State starts empty.
    pub fn new(settings: EngineSettings, caps: Capabilities) -> Self {
        let resolver = ArtistResolver::new(Arc::clone(&caps.directory));
        Self {
            settings,
            caps,
            resolver,
            state: SharedState::default(),
            started: Instant::now(),
        }
    }

    /// Settings in use.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> SyncState {
        self.state.snapshot()
    }

    /// Fetch status once and bring the banner in line with it.
    ///
    /// Errors leave the state untouched; the caller decides about backoff.
    #[tracing::instrument(skip(self), fields(destination = self.settings.destination))]
    pub async fn evaluate(&self, account: usize) -> CoverResult<Evaluation> {
        let Some(status) = self.fetch_status(account).await? else {
            return self.clear_if_showing().await;
        };

        let identity = CoverIdentity::from_status(&status, self.bucket());
        let now = Instant::now();
        let (changed, stale) = self.state.with(|s| {
            (
                s.current.as_ref() != Some(&identity),
                s.is_stale(self.settings.staleness_window, now),
            )
        });
        if !changed && !stale {
            tracing::debug!(%identity, "cover unchanged");
            return Ok(Evaluation::Unchanged);
        }

        let Some(guard) = self.state.try_begin_generation() else {
            tracing::debug!(%identity, "generation in flight, skipping");
            return Ok(Evaluation::Busy);
        };
        self.generate(&guard, status, identity, changed).await
    }

    /// Remove the banner unconditionally. Used as the throttle fallback.
    #[tracing::instrument(skip(self))]
    pub async fn force_clear(&self) -> CoverResult<Evaluation> {
        let Some(guard) = self.state.try_begin_generation() else {
            return Ok(Evaluation::Busy);
        };
        self.caps.publisher.remove().await?;
        guard.commit(|s| s.current = None);
        tracing::info!("cover removed");
        Ok(Evaluation::Cleared)
    }

    /// Count one throttle signal; returns the new count.
    pub fn record_throttle(&self) -> u32 {
        self.state.with(|s| {
            s.throttle_count = s.throttle_count.saturating_add(1);
            s.throttle_count
        })
    }

    /// Forget past throttle signals.
    pub fn reset_throttle(&self) {
        self.state.with(|s| s.throttle_count = 0);
    }

    async fn fetch_status(&self, account: usize) -> CoverResult<Option<StatusRecord>> {
        let subjects = std::iter::once(StatusSubject::Destination)
            .chain(self.settings.fallbacks.iter().copied().map(StatusSubject::Fallback));
        for subject in subjects {
            let query = StatusQuery {
                destination: self.settings.destination,
                subject,
                account,
            };
            if let Some(status) = self.caps.status.fetch_status(&query).await? {
                tracing::debug!(?subject, artist = %status.primary_artist, title = %status.title, "status found");
                return Ok(Some(status));
            }
        }
        Ok(None)
    }

    async fn clear_if_showing(&self) -> CoverResult<Evaluation> {
        if self.state.with(|s| s.current.is_none()) {
            return Ok(Evaluation::Unchanged);
        }
        let Some(guard) = self.state.try_begin_generation() else {
            return Ok(Evaluation::Busy);
        };
        self.caps.publisher.remove().await?;
        guard.commit(|s| s.current = None);
        tracing::info!("nothing playing, cover removed");
        Ok(Evaluation::Cleared)
    }

    async fn generate(
        &self,
        guard: &GenerationGuard,
        status: StatusRecord,
        identity: CoverIdentity,
        changed: bool,
    ) -> CoverResult<Evaluation> {
        if changed {
            self.caps.publisher.remove().await?;
            guard.commit(|s| s.current = None);
        }

        let artists = self.resolver.resolve(&status.artist_names()).await;
        let request = CoverRequest::from_status(&status, artists, chrono::Local::now());
        let assets = PreparedCoverAssets::prepare(&request, self.caps.fetcher.as_ref()).await;

        let renderer = Arc::clone(&self.caps.renderer);
        let cover = tokio::task::spawn_blocking(move || renderer.render(&request, &assets))
            .await
            .map_err(|err| CoverError::render(format!("render task failed: {err}")))??;

        self.caps.publisher.publish(cover).await?;
        let published_at = Instant::now();
        guard.commit(|s| {
            s.current = Some(identity.clone());
            s.last_published = Some(published_at);
        });
        tracing::info!(%identity, "cover published");
        Ok(Evaluation::Published(identity))
    }

    fn bucket(&self) -> Option<u64> {
        let width = self.settings.identity_bucket?.as_secs().max(1);
        Some(self.started.elapsed().as_secs() / width)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sync/engine.rs"]
mod tests;
