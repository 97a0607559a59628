// ── Wire → domain conversions ──
//
// The api crate stays faithful to the gateway's JSON; this module is the
// single place where raw labels become typed domain values.

use fabwatch_api::AlertMessage;
use fabwatch_api::types::{AlertRecord as WireAlertRecord, SensorRecord};

use crate::model::{AlertEvent, AlertRecord, AlertStatus, Sensor};

impl From<SensorRecord> for Sensor {
    fn from(record: SensorRecord) -> Self {
        Self {
            sensor_id: record.sensor_id,
            name: record.name,
            unit: record.unit,
            min_value: record.min_value,
            max_value: record.max_value,
        }
    }
}

impl From<&AlertMessage> for AlertEvent {
    fn from(message: &AlertMessage) -> Self {
        Self {
            alert_id: message.alert_id.clone(),
            sensor_id: message.sensor_id.clone(),
            digital_module_id: message.digital_module_id.clone(),
            // A missing status stays missing -- the feed skips the flag
            // fold for such events instead of guessing.
            status: message.status.as_deref().map(AlertStatus::from_label),
            alert_type: message.alert_type.clone(),
            description: message.description.clone(),
            started_at: message.started_at.clone(),
        }
    }
}

impl From<WireAlertRecord> for AlertRecord {
    fn from(record: WireAlertRecord) -> Self {
        Self {
            id: record.id,
            alert_id: record.alert_id,
            alert_type: record.alert_type,
            sensor_id: record.sensor_id,
            digital_module_id: record.digital_module_id,
            status: record.status.as_deref().map(AlertStatus::from_label),
            description: record.description,
            started_at: record.started_at,
        }
    }
}
