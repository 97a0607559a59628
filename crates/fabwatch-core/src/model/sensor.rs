// ── Sensor catalog domain types ──

use serde::{Deserialize, Serialize};

/// One sensor from the gateway catalog.
///
/// Replaced wholesale on every catalog fetch; mutated only through an
/// explicit threshold save, never deleted client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub sensor_id: String,
    pub name: String,
    pub unit: Option<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

/// Editable threshold pair for one sensor, kept as raw text so the
/// input field round-trips exactly what the user typed. Validation
/// happens at save time, not on every keystroke.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThresholdDraft {
    pub min: String,
    pub max: String,
}

impl ThresholdDraft {
    /// Seed a draft from the persisted sensor values. A missing
    /// threshold becomes an empty field.
    pub fn from_sensor(sensor: &Sensor) -> Self {
        Self {
            min: sensor.min_value.map(fmt_value).unwrap_or_default(),
            max: sensor.max_value.map(fmt_value).unwrap_or_default(),
        }
    }
}

/// Format a threshold without a trailing `.0` for whole numbers,
/// matching what a user would have typed.
fn fmt_value(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensor(min: Option<f64>, max: Option<f64>) -> Sensor {
        Sensor {
            sensor_id: "drill_temp1".into(),
            name: "Drill Temperature".into(),
            unit: Some("°C".into()),
            min_value: min,
            max_value: max,
        }
    }

    #[test]
    fn draft_seeds_from_sensor_values() {
        let draft = ThresholdDraft::from_sensor(&sensor(Some(10.0), Some(82.5)));
        assert_eq!(draft.min, "10");
        assert_eq!(draft.max, "82.5");
    }

    #[test]
    fn missing_thresholds_become_empty_fields() {
        let draft = ThresholdDraft::from_sensor(&sensor(None, None));
        assert_eq!(draft.min, "");
        assert_eq!(draft.max, "");
    }
}
