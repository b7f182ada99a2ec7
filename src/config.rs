//! Process configuration, loaded once at startup.

use std::{collections::BTreeMap, path::Path, path::PathBuf, time::Duration};

use anyhow::Context;

use crate::{
    foundation::error::{CoverError, CoverResult},
    render::{frame::OutputFormat, layout::CoverLayout},
    sync::{engine::EngineSettings, scheduler::AccountRotation},
};

/// Environment variable overriding the computed tick interval (milliseconds).
pub const POLL_INTERVAL_ENV: &str = "COVERSYNC_POLL_INTERVAL_MS";

const MIN_DERIVED_INTERVAL_MS: u64 = 1000;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Everything needed to run one sync engine.
pub struct SyncConfig {
    /// Group whose banner is managed. Must be non-zero.
    pub destination: i64,
    /// Identities consulted in order when the destination has no status.
    pub fallbacks: Vec<i64>,
    /// Size of the account rotation pool.
    pub accounts: usize,
    /// Explicit tick interval. Derived from the pool when absent.
    pub poll_interval_ms: Option<u64>,
    /// Per-account cooldown used to derive the tick interval.
    pub account_cooldown_ms: u64,
    /// Refresh an unchanged track after this long. `None` never refreshes.
    pub staleness_window_ms: Option<u64>,
    /// Optional time bucket folded into the cover identity.
    pub identity_bucket_secs: Option<u64>,
    /// Linear backoff unit applied per consecutive throttle.
    pub backoff_base_ms: u64,
    /// Banner font. System discovery when absent.
    pub font_path: Option<PathBuf>,
    /// Compositor geometry and colors.
    pub layout: CoverLayout,
    /// Encoding of published banners.
    pub output: OutputFormat,
    /// File-backed capabilities for the `watch` command.
    pub local: Option<LocalConfig>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            destination: 0,
            fallbacks: Vec::new(),
            accounts: 1,
            poll_interval_ms: None,
            account_cooldown_ms: 5000,
            staleness_window_ms: None,
            identity_bucket_secs: None,
            backoff_base_ms: 60_000,
            font_path: None,
            layout: CoverLayout::default(),
            output: OutputFormat::Png,
            local: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Paths and tables backing the file-based capabilities.
pub struct LocalConfig {
    /// JSON status record; missing, empty or `null` means nothing is playing.
    pub status_file: PathBuf,
    /// Where published banners are written.
    pub output_file: PathBuf,
    /// Copied over `output_file` on removal. The file is deleted when absent.
    pub default_cover: Option<PathBuf>,
    /// Base directory for relative image paths.
    pub image_root: Option<PathBuf>,
    /// Artist name to avatar URL or path.
    pub artists: BTreeMap<String, String>,
    /// Status file per fallback identity. Unlisted fallbacks report nothing playing.
    pub fallback_status_files: BTreeMap<i64, PathBuf>,
}

impl SyncConfig {
    /// Read, parse and validate a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> CoverResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text).map_err(|err| {
            CoverError::validation(format!("parse config {}: {err}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> CoverResult<()> {
        if self.destination == 0 {
            return Err(CoverError::validation("destination must be set"));
        }
        if self.accounts == 0 {
            return Err(CoverError::validation("accounts must be at least 1"));
        }
        if self.poll_interval_ms == Some(0) {
            return Err(CoverError::validation("poll_interval_ms must be > 0"));
        }
        if self.backoff_base_ms == 0 {
            return Err(CoverError::validation("backoff_base_ms must be > 0"));
        }
        if self.identity_bucket_secs == Some(0) {
            return Err(CoverError::validation("identity_bucket_secs must be > 0"));
        }
        self.layout.canvas.as_u16()?;
        if self.layout.thumb_size == 0 || self.layout.background_downscale == 0 {
            return Err(CoverError::validation(
                "thumb_size and background_downscale must be > 0",
            ));
        }
        if self.layout.text_width() <= 0.0 {
            return Err(CoverError::validation(
                "layout leaves no room for text right of the thumbnail",
            ));
        }
        if let Some(local) = &self.local
            && (local.status_file.as_os_str().is_empty() || local.output_file.as_os_str().is_empty())
        {
            return Err(CoverError::validation(
                "local.status_file and local.output_file are required",
            ));
        }
        Ok(())
    }

    /// Tick interval, honoring [`POLL_INTERVAL_ENV`].
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval_with(std::env::var(POLL_INTERVAL_ENV).ok().as_deref())
    }

    pub(crate) fn poll_interval_with(&self, env_override: Option<&str>) -> Duration {
        let from_env = env_override
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|&ms| ms > 0);
        let ms = from_env.or(self.poll_interval_ms).unwrap_or_else(|| {
            (self.account_cooldown_ms / self.accounts.max(1) as u64).max(MIN_DERIVED_INTERVAL_MS)
        });
        Duration::from_millis(ms)
    }

    /// Backoff unit.
    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    /// Fresh account rotation over the configured pool.
    pub fn rotation(&self) -> AccountRotation {
        AccountRotation::new(self.accounts)
    }

    /// Engine knobs derived from this config.
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            destination: self.destination,
            fallbacks: self.fallbacks.clone(),
            staleness_window: self.staleness_window_ms.map(Duration::from_millis),
            identity_bucket: self.identity_bucket_secs.map(Duration::from_secs),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
