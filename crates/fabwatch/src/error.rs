//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and stable process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use fabwatch_config::ConfigError;
use fabwatch_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const VALIDATION: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the plant gateway")]
    #[diagnostic(
        code(fabwatch::connection_failed),
        help(
            "Check that the gateway is running and accessible.\n\
             {reason}\n\
             Try: fabwatch sensors list -g http://<gateway>:5167"
        )
    )]
    Connection { reason: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid {field}")]
    #[diagnostic(code(fabwatch::validation), help("{reason}"))]
    Validation { field: String, reason: String },

    // ── Threshold persistence ────────────────────────────────────────
    #[error("The gateway rejected the threshold update")]
    #[diagnostic(
        code(fabwatch::save_rejected),
        help("Gateway said: {message}\nYour values were kept -- fix and retry.")
    )]
    SaveRejected { message: String },

    #[error("A save for sensor {sensor_id} is already in progress")]
    #[diagnostic(code(fabwatch::save_in_flight))]
    SaveInFlight { sensor_id: String },

    // ── Lookup ───────────────────────────────────────────────────────
    #[error("{resource} not found: {identifier}")]
    #[diagnostic(
        code(fabwatch::not_found),
        help("List available entries with: fabwatch {list_command}")
    )]
    NotFound {
        resource: String,
        identifier: String,
        list_command: String,
    },

    // ── Query ────────────────────────────────────────────────────────
    #[error("Alert log query failed")]
    #[diagnostic(code(fabwatch::query_failed), help("{message}"))]
    Query { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("No gateway configured")]
    #[diagnostic(
        code(fabwatch::no_gateway),
        help(
            "Set `gateway` in {path}, export FABWATCH_GATEWAY,\n\
             or pass --gateway on the command line."
        )
    )]
    NoGateway { path: String },

    #[error("Configuration error")]
    #[diagnostic(code(fabwatch::config), help("{message}"))]
    Config { message: String },

    // ── Catch-all ────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(fabwatch::gateway))]
    Gateway { message: String },

    #[error("IO error: {0}")]
    #[diagnostic(code(fabwatch::io))]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Stable process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Connection { .. } => exit_code::CONNECTION,
            Self::Validation { .. } => exit_code::VALIDATION,
            Self::SaveInFlight { .. } => exit_code::CONFLICT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::NoGateway { .. } | Self::Config { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::Connection {
                reason: if url.is_empty() {
                    reason
                } else {
                    format!("{url}: {reason}")
                },
            },
            CoreError::Disconnected => Self::Connection {
                reason: "console disconnected".into(),
            },
            CoreError::Validation { field, reason } => Self::Validation { field, reason },
            CoreError::SaveInFlight { sensor_id } => Self::SaveInFlight { sensor_id },
            CoreError::SensorNotFound { sensor_id } => Self::NotFound {
                resource: "Sensor".into(),
                identifier: sensor_id,
                list_command: "sensors list".into(),
            },
            CoreError::SaveRejected { message, .. } => Self::SaveRejected { message },
            CoreError::Query { message } => Self::Query { message },
            CoreError::Config { message } => Self::Config { message },
            CoreError::Api { message, .. } => Self::Gateway { message },
            CoreError::Internal(message) => Self::Gateway { message },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoGateway { path } => Self::NoGateway { path },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}
