// ── Alert domain types ──

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Alert lifecycle status.
///
/// Parsed case-insensitively from wire labels; anything unrecognized
/// maps to [`Unknown`](Self::Unknown) rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Firing,
    Resolved,
    Unknown,
}

impl AlertStatus {
    /// Parse a wire label, ignoring case. `"FIRING"`, `"Firing"`, and
    /// `"firing"` all count as firing.
    pub fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "firing" => Self::Firing,
            "resolved" => Self::Resolved,
            _ => Self::Unknown,
        }
    }

    pub fn is_firing(self) -> bool {
        matches!(self, Self::Firing)
    }

    /// Lowercase display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Firing => "firing",
            Self::Resolved => "resolved",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One event from the live push stream.
///
/// Immutable once received. Optional fields reflect the wire reality:
/// payload shape varies by alert source, and a missing field must never
/// drop the event -- at most it skips the flag fold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub alert_id: String,
    pub sensor_id: Option<String>,
    pub digital_module_id: Option<String>,
    /// `None` when the source omitted the status entirely.
    pub status: Option<AlertStatus>,
    pub alert_type: Option<String>,
    pub description: Option<String>,
    pub started_at: Option<String>,
}

/// One row of the historical alert store. An independent collection --
/// never merged with the live event history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: Option<i64>,
    pub alert_id: Option<String>,
    pub alert_type: Option<String>,
    pub sensor_id: Option<String>,
    pub digital_module_id: Option<String>,
    pub status: Option<AlertStatus>,
    pub description: Option<String>,
    pub started_at: Option<String>,
}

/// Render a gateway timestamp for display.
///
/// The gateway reports local-time strings in either `"%Y-%m-%d %H:%M:%S"`
/// or ISO-8601 `T`-separated form. Anything unparseable is shown verbatim
/// rather than dropped.
pub fn format_timestamp(raw: &str) -> String {
    let normalized = raw.replace(' ', "T");
    let parsed = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f"));

    match parsed {
        Ok(dt) => dt.format("%d %b %Y %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}
