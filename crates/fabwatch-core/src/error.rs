// ── Core error types ──
//
// User-facing errors from fabwatch-core. Consumers never see HTTP status
// codes or JSON parse failures directly -- the `From<fabwatch_api::Error>`
// impl translates transport-layer errors into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the plant gateway at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Console disconnected")]
    Disconnected,

    // ── Validation ───────────────────────────────────────────────────
    /// Input rejected before any network call was made.
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    // ── Threshold persistence ────────────────────────────────────────
    /// A save for this sensor is already in flight.
    #[error("A save for sensor {sensor_id} is already in progress")]
    SaveInFlight { sensor_id: String },

    #[error("Sensor not found: {sensor_id}")]
    SensorNotFound { sensor_id: String },

    /// The gateway rejected the threshold update. The draft is left
    /// untouched so the values can be retried without re-entering them.
    #[error("Threshold update rejected: {message}")]
    SaveRejected {
        message: String,
        status: Option<u16>,
    },

    // ── Alert log ────────────────────────────────────────────────────
    /// The filtered history fetch failed; the visible result is empty.
    #[error("Alert log query failed: {message}")]
    Query { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("Gateway error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<fabwatch_api::Error> for CoreError {
    fn from(err: fabwatch_api::Error) -> Self {
        match err {
            fabwatch_api::Error::Transport(ref e) => {
                if e.is_timeout() || e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            fabwatch_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            fabwatch_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            fabwatch_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            fabwatch_api::Error::Channel(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("Alert channel failure: {reason}"),
            },
            fabwatch_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
