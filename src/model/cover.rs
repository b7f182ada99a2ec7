use chrono::{DateTime, Local};

use crate::model::status::{ListenerIdentity, StatusRecord};

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Artist as drawn on the banner.
pub struct ArtistDisplay {
    /// Display name.
    pub name: String,
    /// Avatar URL. Absence is an expected outcome of resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl ArtistDisplay {
    /// Bare-name record without an avatar.
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            avatar_url: None,
        }
    }

    /// Record with an avatar URL.
    pub fn with_avatar(name: impl Into<String>, avatar_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            avatar_url: Some(avatar_url.into()),
        }
    }
}

/// Stable partition: artists with an avatar first, input order kept within each group.
pub fn avatars_first(artists: &[ArtistDisplay]) -> Vec<&ArtistDisplay> {
    let (with, without): (Vec<_>, Vec<_>) = artists.iter().partition(|a| a.avatar_url.is_some());
    with.into_iter().chain(without).collect()
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Everything the compositor needs for one banner. Built once per generation.
pub struct CoverRequest {
    /// Track title.
    pub title: String,
    /// Optional line under the title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Listener badge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listener: Option<ListenerIdentity>,
    /// Artists in resolution order.
    #[serde(default)]
    pub artists: Vec<ArtistDisplay>,
    /// Album artwork used for the thumbnail and the blurred background.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_art_url: Option<String>,
    /// Time printed under the thumbnail.
    #[serde(default = "chrono::Local::now")]
    pub stamped_at: DateTime<Local>,
}

impl CoverRequest {
    /// Assemble a request from a fetched status and its resolved artists.
    pub fn from_status(
        status: &StatusRecord,
        artists: Vec<ArtistDisplay>,
        stamped_at: DateTime<Local>,
    ) -> Self {
        Self {
            title: status.title.clone(),
            subtitle: status.subtitle.clone(),
            listener: status.listener.clone(),
            artists,
            album_art_url: status.album_art_url.clone(),
            stamped_at,
        }
    }

    /// Every image URL referenced by the request, deduplicated, in draw order.
    pub fn image_urls(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = Vec::new();
        let candidates = self
            .album_art_url
            .iter()
            .chain(self.listener.iter().filter_map(|l| l.avatar_url.as_ref()))
            .chain(self.artists.iter().filter_map(|a| a.avatar_url.as_ref()));
        for url in candidates {
            if !urls.contains(&url.as_str()) {
                urls.push(url);
            }
        }
        urls
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/cover.rs"]
mod tests;
