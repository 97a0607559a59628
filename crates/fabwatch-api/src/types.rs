// Wire DTOs for the gateway REST surface.
//
// Field names mirror the gateway's camelCase JSON. Domain types live in
// fabwatch-core; these structs stay faithful to the wire shape, optional
// where the gateway is known to omit fields.

use serde::{Deserialize, Serialize};

/// One entry of the sensor catalog (`GET /api/Sensor`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorRecord {
    pub sensor_id: String,
    pub name: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_value: Option<f64>,
}

/// Threshold persistence request body (`PUT /api/Sensor/thresholds`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdUpdate {
    pub sensor_id: String,
    pub min_value: f64,
    pub max_value: f64,
}

/// One row of the historical alert store (`GET /api/Alert/filter`).
///
/// The store reports timestamps as either `startedAt` or `createdAt`
/// depending on the alert source; both land in `started_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub alert_id: Option<String>,
    #[serde(default)]
    pub alert_type: Option<String>,
    #[serde(default)]
    pub sensor_id: Option<String>,
    #[serde(default)]
    pub digital_module_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub started_at: Option<String>,
}

/// Query parameters for the filtered alert store.
///
/// `None` fields are omitted from the query string entirely, so the
/// gateway's match-all default applies per criterion.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digital_module_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl AlertQuery {
    /// Returns `true` if no criterion is set (the gateway will match all).
    pub fn is_empty(&self) -> bool {
        self.sensor_id.is_none()
            && self.digital_module_id.is_none()
            && self.status.is_none()
            && self.from.is_none()
            && self.to.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_query_skips_unset_fields() {
        let query = AlertQuery {
            sensor_id: Some("drill_temp1".into()),
            status: Some("firing".into()),
            ..AlertQuery::default()
        };

        let encoded = serde_urlencoded_like(&query);
        assert_eq!(encoded, r#"{"sensorId":"drill_temp1","status":"firing"}"#);
    }

    #[test]
    fn empty_alert_query_serializes_to_nothing() {
        let query = AlertQuery::default();
        assert!(query.is_empty());
        assert_eq!(serde_urlencoded_like(&query), "{}");
    }

    #[test]
    fn alert_record_accepts_created_at_alias() {
        let json = r#"{
            "id": 7,
            "alertId": "a-1",
            "alertType": "Threshold",
            "sensorId": "mill_temp1",
            "digitalModuleId": "MILL001",
            "status": "resolved",
            "createdAt": "2026-02-10 12:00:00"
        }"#;

        let record: AlertRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, Some(7));
        assert_eq!(record.started_at.as_deref(), Some("2026-02-10 12:00:00"));
    }

    #[test]
    fn sensor_record_tolerates_missing_thresholds() {
        let json = r#"{ "sensorId": "aiqs_camera1", "name": "AIQS Camera" }"#;
        let record: SensorRecord = serde_json::from_str(json).unwrap();
        assert!(record.unit.is_none());
        assert!(record.min_value.is_none());
        assert!(record.max_value.is_none());
    }

    // JSON stands in for the query-string encoding here; both honor
    // skip_serializing_if, which is the property under test.
    fn serde_urlencoded_like(query: &AlertQuery) -> String {
        serde_json::to_string(query).unwrap()
    }
}
