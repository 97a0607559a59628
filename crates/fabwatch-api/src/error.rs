use thiserror::Error;

/// Top-level error type for the `fabwatch-api` crate.
///
/// Covers every failure mode across both gateway surfaces: the REST API
/// (sensor catalog, thresholds, alert store) and the push alert channel.
/// `fabwatch-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── REST API ────────────────────────────────────────────────────
    /// Non-success response from the gateway. `message` carries the
    /// error body text the gateway returned.
    #[error("Gateway error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Push channel ────────────────────────────────────────────────
    /// Alert channel connection failed or dropped mid-stream.
    #[error("Alert channel failure: {0}")]
    Channel(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Channel(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if the gateway rejected the request itself
    /// (as opposed to the request never reaching it).
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Api { .. })
    }
}
