// ── Digital module domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// The fixed fleet of digital modules known at compile time.
///
/// The first four appear on the dashboard with live sensors; `Dps` and
/// `Hbw` show up only in the historical alert log.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
pub enum DigitalModule {
    #[serde(rename = "DRILL001")]
    #[strum(serialize = "DRILL001")]
    Drill,

    #[serde(rename = "MILL001")]
    #[strum(serialize = "MILL001")]
    Mill,

    #[serde(rename = "AIQS001")]
    #[strum(serialize = "AIQS001")]
    Aiqs,

    #[serde(rename = "FTS001")]
    #[strum(serialize = "FTS001")]
    Fts,

    #[serde(rename = "DPS001")]
    #[strum(serialize = "DPS001")]
    Dps,

    #[serde(rename = "HBW001")]
    #[strum(serialize = "HBW001")]
    Hbw,
}

impl DigitalModule {
    /// Human-readable description of what the module does.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Drill => "Drill Module",
            Self::Mill => "Mill Module",
            Self::Aiqs => "AIQS Module",
            Self::Fts => "FTS Conveyor",
            Self::Dps => "DPS Station",
            Self::Hbw => "HBW Warehouse",
        }
    }

    /// Number of live sensors the module exposes on the dashboard.
    pub fn sensor_count(&self) -> usize {
        match self {
            Self::Drill | Self::Mill => 3,
            Self::Aiqs | Self::Fts => 2,
            Self::Dps | Self::Hbw => 0,
        }
    }

    /// `true` for modules that appear only in the historical log.
    pub fn is_log_only(&self) -> bool {
        matches!(self, Self::Dps | Self::Hbw)
    }

    /// The modules shown as dashboard cards, in display order.
    pub fn dashboard() -> impl Iterator<Item = Self> {
        Self::iter().filter(|m| !m.is_log_only())
    }

    /// Every known module, in display order.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}

/// A dashboard card view of one module: static metadata plus the derived
/// alert flag. The flag is recomputed from the live feed, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleSummary {
    pub module: DigitalModule,
    pub description: &'static str,
    pub sensor_count: usize,
    pub has_active_alert: bool,
}
