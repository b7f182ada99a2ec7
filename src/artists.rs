use std::sync::Arc;

use crate::{capability::DirectoryLookup, model::cover::ArtistDisplay};

/// Maps artist names to display records through a [`DirectoryLookup`].
///
/// Lookups run one at a time, in input order. A failed lookup degrades to a
/// bare-name record for that entry only.
#[derive(Clone)]
pub struct ArtistResolver {
    directory: Arc<dyn DirectoryLookup>,
}

impl ArtistResolver {
    /// Resolver backed by `directory`.
    pub fn new(directory: Arc<dyn DirectoryLookup>) -> Self {
        Self { directory }
    }

    /// Resolve every name, preserving order. Never fails.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, names: &[String]) -> Vec<ArtistDisplay> {
        let mut out = Vec::with_capacity(names.len());
        for name in names {
            out.push(self.resolve_one(name).await);
        }
        out
    }

    async fn resolve_one(&self, name: &str) -> ArtistDisplay {
        let candidates = match self.directory.find_by_name(name).await {
            Ok(candidates) => candidates,
            Err(err) => {
                tracing::warn!(artist = name, error = %err, "artist lookup failed, using bare name");
                return ArtistDisplay::bare(name);
            }
        };

        let Some((found, avatar)) = candidates
            .into_iter()
            .find_map(|c| c.avatar_url.map(|url| (c.name, url)))
        else {
            return ArtistDisplay::bare(name);
        };

        // Directory names are canonical; an empty one is not.
        let display = if found.trim().is_empty() {
            name.to_string()
        } else {
            found
        };
        ArtistDisplay::with_avatar(display, avatar)
    }
}

#[cfg(test)]
#[path = "../tests/unit/artists.rs"]
mod tests;
