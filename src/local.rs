//! File-backed capabilities used by `coversync watch` and for local runs.

use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Context;
use async_trait::async_trait;

use crate::{
    capability::{DirectoryCandidate, DirectoryLookup, ImagePublisher, StatusProvider},
    config::LocalConfig,
    foundation::error::{CoverError, CoverResult},
    model::status::{StatusQuery, StatusRecord, StatusSubject},
    render::frame::EncodedCover,
};

/// Status read from JSON files on every poll.
///
/// The destination reads its own file and each fallback identity reads the file
/// mapped to it. A missing or blank file, or a literal `null`, means nothing is playing.
#[derive(Clone, Debug)]
pub struct FileStatusProvider {
    path: PathBuf,
    fallbacks: BTreeMap<i64, PathBuf>,
}

impl FileStatusProvider {
    /// Provider reading `path` for the destination and nothing for fallbacks.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_fallbacks(path, BTreeMap::new())
    }

    /// Provider reading `path` for the destination and `fallbacks` per identity.
    pub fn with_fallbacks(path: impl Into<PathBuf>, fallbacks: BTreeMap<i64, PathBuf>) -> Self {
        Self {
            path: path.into(),
            fallbacks,
        }
    }

    fn path_for(&self, subject: StatusSubject) -> Option<&Path> {
        match subject {
            StatusSubject::Destination => Some(&self.path),
            StatusSubject::Fallback(id) => self.fallbacks.get(&id).map(PathBuf::as_path),
        }
    }
}

async fn read_status_file(path: &Path) -> CoverResult<Option<StatusRecord>> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(CoverError::transient(format!(
                "read status {}: {err}",
                path.display()
            )));
        }
    };
    if text.trim().is_empty() {
        return Ok(None);
    }
    // A half-written file parses as garbage; treat it like a flaky network call.
    serde_json::from_str(&text)
        .map_err(|err| CoverError::transient(format!("parse status {}: {err}", path.display())))
}

#[async_trait]
impl StatusProvider for FileStatusProvider {
    async fn fetch_status(&self, query: &StatusQuery) -> CoverResult<Option<StatusRecord>> {
        let Some(path) = self.path_for(query.subject) else {
            tracing::debug!(subject = ?query.subject, "no status file mapped");
            return Ok(None);
        };
        let status = read_status_file(path).await?;
        tracing::trace!(subject = ?query.subject, found = status.is_some(), "file status read");
        Ok(status)
    }
}

/// Writes banners to a file; removal restores a default image or deletes the file.
#[derive(Clone, Debug)]
pub struct FileCoverPublisher {
    output: PathBuf,
    default_cover: Option<PathBuf>,
}

impl FileCoverPublisher {
    /// Publisher writing to `output`.
    pub fn new(output: impl Into<PathBuf>, default_cover: Option<PathBuf>) -> Self {
        Self {
            output: output.into(),
            default_cover,
        }
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.output.file_name().unwrap_or_default().to_os_string();
        name.push(".partial");
        self.output.with_file_name(name)
    }
}

#[async_trait]
impl ImagePublisher for FileCoverPublisher {
    async fn publish(&self, cover: EncodedCover) -> CoverResult<()> {
        let staging = self.staging_path();
        tokio::fs::write(&staging, &cover.bytes)
            .await
            .with_context(|| format!("write {}", staging.display()))?;
        tokio::fs::rename(&staging, &self.output)
            .await
            .with_context(|| format!("move banner into {}", self.output.display()))?;
        Ok(())
    }

    async fn remove(&self) -> CoverResult<()> {
        match &self.default_cover {
            Some(default) => {
                tokio::fs::copy(default, &self.output)
                    .await
                    .with_context(|| format!("restore default cover {}", default.display()))?;
            }
            None => match tokio::fs::remove_file(&self.output).await {
                Ok(()) => {}
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(anyhow::Error::new(err)
                        .context(format!("remove {}", self.output.display()))
                        .into());
                }
            },
        }
        Ok(())
    }
}

/// Fixed name to avatar table. Names match case-insensitively.
#[derive(Clone, Debug, Default)]
pub struct StaticDirectory {
    entries: BTreeMap<String, String>,
}

impl StaticDirectory {
    /// Directory over `entries` (name to avatar URL or path).
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl DirectoryLookup for StaticDirectory {
    async fn find_by_name(&self, name: &str) -> CoverResult<Vec<DirectoryCandidate>> {
        let wanted = name.trim();
        Ok(self
            .entries
            .iter()
            .filter(|(known, _)| known.eq_ignore_ascii_case(wanted))
            .map(|(known, avatar)| DirectoryCandidate {
                name: known.clone(),
                avatar_url: Some(avatar.clone()),
            })
            .collect())
    }
}

/// The three file-backed capabilities described by `local`.
pub fn from_config(local: &LocalConfig) -> (FileStatusProvider, FileCoverPublisher, StaticDirectory) {
    (
        FileStatusProvider::with_fallbacks(
            &local.status_file,
            local.fallback_status_files.clone(),
        ),
        FileCoverPublisher::new(&local.output_file, local.default_cover.clone()),
        StaticDirectory::new(local.artists.clone()),
    )
}

#[cfg(test)]
#[path = "../tests/unit/local.rs"]
mod tests;
