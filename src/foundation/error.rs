/// Convenience result type used across coversync.
pub type CoverResult<T> = Result<T, CoverError>;

/// Top-level error taxonomy used by engine APIs and capabilities.
///
/// "No current status" is not an error: providers report it as `Ok(None)`.
#[derive(thiserror::Error, Debug)]
pub enum CoverError {
    /// Upstream asked us to slow down. Triggers backoff and cover removal.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Network or remote failure. Logged, retried on the next tick.
    #[error("transient error: {0}")]
    Transient(String),

    /// Malformed configuration or input data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Compositor failure while producing a banner.
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoverError {
    /// Build a [`CoverError::RateLimited`] value.
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Build a [`CoverError::Transient`] value.
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }

    /// Build a [`CoverError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CoverError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Whether this error is an upstream throttling signal.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
