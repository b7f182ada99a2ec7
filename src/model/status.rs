use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Who is listening, shown as a badge on the banner.
pub struct ListenerIdentity {
    /// Display name of the listener.
    pub display_name: String,
    /// Avatar image URL, if the listener has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// One "now playing" record as returned by a [`crate::StatusProvider`].
pub struct StatusRecord {
    /// Primary (credited) artist.
    pub primary_artist: String,
    /// Track title.
    pub title: String,
    /// Secondary title line (remix, version, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Album artwork URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_art_url: Option<String>,
    /// Contributing artists in credit order.
    #[serde(default)]
    pub contributing_artists: Vec<String>,
    /// Listener shown in the badge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listener: Option<ListenerIdentity>,
}

impl StatusRecord {
    /// Minimal record with just an artist and a title.
    pub fn new(primary_artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            primary_artist: primary_artist.into(),
            title: title.into(),
            subtitle: None,
            album_art_url: None,
            contributing_artists: Vec::new(),
            listener: None,
        }
    }

    /// Names to resolve for the artist list: the contributing artists, or the
    /// primary artist when none are credited.
    pub fn artist_names(&self) -> Vec<String> {
        if self.contributing_artists.is_empty() {
            vec![self.primary_artist.clone()]
        } else {
            self.contributing_artists.clone()
        }
    }
}

/// Key identifying which track a banner represents.
///
/// Equality is structural over `(artist, title, bucket)`, so two different
/// pairs never collide even when their joined text would.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CoverIdentity {
    artist: String,
    title: String,
    bucket: Option<u64>,
}

impl CoverIdentity {
    /// Identity for an `(artist, title)` pair.
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            bucket: None,
        }
    }

    /// Identity derived from a status record, optionally time-bucketed.
    pub fn from_status(status: &StatusRecord, bucket: Option<u64>) -> Self {
        Self {
            bucket,
            ..Self::new(&status.primary_artist, &status.title)
        }
    }

    /// Same identity pinned to a time bucket.
    pub fn bucketed(mut self, bucket: u64) -> Self {
        self.bucket = Some(bucket);
        self
    }

    /// Artist half of the key.
    pub fn artist(&self) -> &str {
        &self.artist
    }

    /// Title half of the key.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Time bucket, if identities are bucketed.
    pub fn bucket(&self) -> Option<u64> {
        self.bucket
    }
}

impl fmt::Display for CoverIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.artist, self.title)?;
        if let Some(bucket) = self.bucket {
            write!(f, "@{bucket}")?;
        }
        Ok(())
    }
}

/// Whose status a [`StatusQuery`] asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusSubject {
    /// The destination group itself.
    Destination,
    /// A fallback identity consulted when the destination has no status.
    Fallback(i64),
}

/// One status lookup as issued by the sync engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusQuery {
    /// Destination whose banner is managed.
    pub destination: i64,
    /// Subject whose status is requested.
    pub subject: StatusSubject,
    /// Rotation slot of the account issuing the request.
    pub account: usize,
}

#[cfg(test)]
#[path = "../../tests/unit/model/status.rs"]
mod tests;
