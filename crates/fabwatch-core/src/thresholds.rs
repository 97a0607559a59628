//! Sensor catalog snapshot and threshold editing.
//!
//! [`ThresholdEditor`] owns the fetched sensor catalog, one editable
//! draft per sensor, and the save lifecycle. Saves are single-flight per
//! sensor: a second save for the same sensor is rejected while one is
//! outstanding, but edits to different sensors may persist concurrently.
//! The gateway stays the source of truth -- every successful save
//! refetches the catalog instead of trusting the local draft.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use fabwatch_api::GatewayClient;
use fabwatch_api::types::ThresholdUpdate;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{Sensor, ThresholdDraft};

/// Sensors shown per catalog page.
pub const DEFAULT_SENSOR_PAGE_SIZE: usize = 5;

/// Which half of a threshold draft an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdField {
    Min,
    Max,
}

/// Editable view over the sensor catalog.
pub struct ThresholdEditor {
    client: Arc<GatewayClient>,
    sensors: Vec<Sensor>,
    drafts: HashMap<String, ThresholdDraft>,
    saving: HashSet<String>,
    loading: bool,
    page: usize,
    page_size: usize,
}

impl ThresholdEditor {
    pub fn new(client: Arc<GatewayClient>) -> Self {
        Self::with_page_size(client, DEFAULT_SENSOR_PAGE_SIZE)
    }

    pub fn with_page_size(client: Arc<GatewayClient>, page_size: usize) -> Self {
        Self {
            client,
            sensors: Vec::new(),
            drafts: HashMap::new(),
            saving: HashSet::new(),
            loading: false,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    // ── Catalog lifecycle ────────────────────────────────────────────

    /// Fetch the catalog and replace it wholesale.
    ///
    /// All drafts are rebuilt from the fetched values, which also clears
    /// any stale draft for a sensor that disappeared. On failure the
    /// previous catalog stays in place.
    pub async fn load(&mut self) -> Result<(), CoreError> {
        self.loading = true;
        let result = self.client.list_sensors().await;
        self.loading = false;

        let records = result?;
        self.sensors = records.into_iter().map(Sensor::from).collect();
        self.drafts = self
            .sensors
            .iter()
            .map(|s| (s.sensor_id.clone(), ThresholdDraft::from_sensor(s)))
            .collect();
        self.page = self.page.clamp(1, self.total_pages());

        debug!(sensors = self.sensors.len(), "sensor catalog loaded");
        Ok(())
    }

    /// `true` while a catalog fetch is outstanding.
    pub fn loading(&self) -> bool {
        self.loading
    }

    // ── Draft editing ────────────────────────────────────────────────

    /// Local edit of one draft field. No network effect.
    ///
    /// Edits for sensors not in the catalog are dropped -- the drafts
    /// map is keyed strictly by the fetched catalog.
    pub fn set_draft(&mut self, sensor_id: &str, field: ThresholdField, value: impl Into<String>) {
        match self.drafts.get_mut(sensor_id) {
            Some(draft) => match field {
                ThresholdField::Min => draft.min = value.into(),
                ThresholdField::Max => draft.max = value.into(),
            },
            None => debug!(sensor_id, "ignoring draft edit for unknown sensor"),
        }
    }

    pub fn draft(&self, sensor_id: &str) -> Option<&ThresholdDraft> {
        self.drafts.get(sensor_id)
    }

    // ── Saving ───────────────────────────────────────────────────────

    /// Persist the current draft for one sensor.
    ///
    /// Fails closed before any network call when the draft does not
    /// parse to finite numbers, and rejects re-entrant saves for the
    /// same sensor. A gateway rejection leaves the draft untouched so
    /// the values can be corrected and retried; success refetches the
    /// catalog so the display reflects persisted state.
    pub async fn save(&mut self, sensor_id: &str) -> Result<(), CoreError> {
        let update = self.begin_save(sensor_id)?;
        let result = self.client.update_thresholds(&update).await;
        self.finish_save(sensor_id);

        match result {
            Ok(()) => {
                self.load().await?;
                Ok(())
            }
            Err(fabwatch_api::Error::Api { status, message }) => {
                warn!(sensor_id, status, "threshold update rejected");
                Err(CoreError::SaveRejected {
                    message,
                    status: Some(status),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Validate the draft and take the per-sensor save token.
    fn begin_save(&mut self, sensor_id: &str) -> Result<ThresholdUpdate, CoreError> {
        if self.saving.contains(sensor_id) {
            return Err(CoreError::SaveInFlight {
                sensor_id: sensor_id.to_string(),
            });
        }

        let draft = self
            .drafts
            .get(sensor_id)
            .ok_or_else(|| CoreError::SensorNotFound {
                sensor_id: sensor_id.to_string(),
            })?;

        let min_value = parse_finite(&draft.min, "minValue")?;
        let max_value = parse_finite(&draft.max, "maxValue")?;

        self.saving.insert(sensor_id.to_string());
        Ok(ThresholdUpdate {
            sensor_id: sensor_id.to_string(),
            min_value,
            max_value,
        })
    }

    /// Release the per-sensor save token.
    fn finish_save(&mut self, sensor_id: &str) {
        self.saving.remove(sensor_id);
    }

    /// `true` while a save for this sensor is outstanding.
    pub fn is_saving(&self, sensor_id: &str) -> bool {
        self.saving.contains(sensor_id)
    }

    /// `true` while any save is outstanding.
    pub fn any_saving(&self) -> bool {
        !self.saving.is_empty()
    }

    // ── Display paging ───────────────────────────────────────────────

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total_pages(&self) -> usize {
        self.sensors.len().div_ceil(self.page_size).max(1)
    }

    /// Jump to a page, clamping into the valid range.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages());
    }

    /// The sensors visible on the current page.
    pub fn page_sensors(&self) -> &[Sensor] {
        let start = (self.page - 1) * self.page_size;
        let end = (start + self.page_size).min(self.sensors.len());
        self.sensors.get(start..end).unwrap_or(&[])
    }
}

/// Parse a draft value, rejecting anything that is not a finite float.
fn parse_finite(raw: &str, field: &str) -> Result<f64, CoreError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CoreError::Validation {
            field: field.to_string(),
            reason: format!("`{raw}` is not a finite number"),
        })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn catalog_body() -> serde_json::Value {
        json!([
            { "sensorId": "drill_temp1", "name": "Drill Temperature", "unit": "°C",
              "minValue": 10.0, "maxValue": 80.0 },
            { "sensorId": "drill_pressure1", "name": "Drill Pressure", "unit": "bar",
              "minValue": 1.0, "maxValue": 6.0 }
        ])
    }

    async fn editor_against(server: &MockServer) -> ThresholdEditor {
        let client = GatewayClient::new(
            Url::parse(&server.uri()).unwrap(),
            &fabwatch_api::transport::TransportConfig::default(),
        )
        .unwrap();
        ThresholdEditor::new(Arc::new(client))
    }

    fn offline_editor() -> ThresholdEditor {
        // Points nowhere; used for tests that must not touch the network.
        let client = GatewayClient::new(
            Url::parse("http://127.0.0.1:1").unwrap(),
            &fabwatch_api::transport::TransportConfig::default(),
        )
        .unwrap();
        ThresholdEditor::new(Arc::new(client))
    }

    fn seed(editor: &mut ThresholdEditor, sensors: Vec<Sensor>) {
        editor.drafts = sensors
            .iter()
            .map(|s| (s.sensor_id.clone(), ThresholdDraft::from_sensor(s)))
            .collect();
        editor.sensors = sensors;
    }

    fn sensor(id: &str) -> Sensor {
        Sensor {
            sensor_id: id.into(),
            name: id.into(),
            unit: None,
            min_value: Some(0.0),
            max_value: Some(100.0),
        }
    }

    #[tokio::test]
    async fn load_replaces_catalog_and_rebuilds_drafts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/Sensor"))
            .respond_with(ResponseTemplate::new(200).set_body_json(catalog_body()))
            .mount(&server)
            .await;

        let mut editor = editor_against(&server).await;
        // Stale draft that must not survive the fetch.
        seed(&mut editor, vec![sensor("ghost_sensor")]);
        editor.set_draft("ghost_sensor", ThresholdField::Min, "42");

        editor.load().await.unwrap();

        assert_eq!(editor.sensors().len(), 2);
        assert!(editor.draft("ghost_sensor").is_none());
        assert_eq!(editor.draft("drill_temp1").unwrap().min, "10");
        assert_eq!(editor.draft("drill_temp1").unwrap().max, "80");
        assert!(!editor.loading());
    }

    #[tokio::test]
    async fn non_numeric_draft_never_issues_a_network_call() {
        let mut editor = offline_editor();
        seed(&mut editor, vec![sensor("drill_temp1")]);
        editor.set_draft("drill_temp1", ThresholdField::Min, "not a number");

        let err = editor.save("drill_temp1").await.unwrap_err();
        // A network attempt against 127.0.0.1:1 would surface as a
        // connection error; Validation proves save failed closed first.
        assert!(matches!(err, CoreError::Validation { .. }));
        assert!(!editor.is_saving("drill_temp1"));
    }

    #[tokio::test]
    async fn infinite_draft_value_is_rejected() {
        let mut editor = offline_editor();
        seed(&mut editor, vec![sensor("drill_temp1")]);
        editor.set_draft("drill_temp1", ThresholdField::Max, "inf");

        let err = editor.save("drill_temp1").await.unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[test]
    fn save_is_single_flight_per_sensor() {
        let mut editor = offline_editor();
        seed(&mut editor, vec![sensor("s1"), sensor("s2")]);

        let first = editor.begin_save("s1").unwrap();
        assert_eq!(first.sensor_id, "s1");
        assert!(editor.is_saving("s1"));

        // Same sensor: rejected while outstanding.
        let err = editor.begin_save("s1").unwrap_err();
        assert!(matches!(err, CoreError::SaveInFlight { .. }));

        // Different sensor: allowed.
        let second = editor.begin_save("s2").unwrap();
        assert_eq!(second.sensor_id, "s2");

        editor.finish_save("s1");
        assert!(!editor.is_saving("s1"));
        assert!(editor.any_saving());
        editor.finish_save("s2");
        assert!(!editor.any_saving());
    }

    #[tokio::test]
    async fn rejected_save_preserves_draft_and_clears_token() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/Sensor/thresholds"))
            .respond_with(ResponseTemplate::new(400).set_body_string("minValue exceeds maxValue"))
            .mount(&server)
            .await;

        let mut editor = editor_against(&server).await;
        seed(&mut editor, vec![sensor("drill_temp1")]);
        editor.set_draft("drill_temp1", ThresholdField::Min, "90");
        editor.set_draft("drill_temp1", ThresholdField::Max, "10");

        let err = editor.save("drill_temp1").await.unwrap_err();
        match err {
            CoreError::SaveRejected { message, status } => {
                assert_eq!(message, "minValue exceeds maxValue");
                assert_eq!(status, Some(400));
            }
            other => panic!("expected SaveRejected, got {other:?}"),
        }

        // Draft untouched for retry; token released.
        assert_eq!(editor.draft("drill_temp1").unwrap().min, "90");
        assert_eq!(editor.draft("drill_temp1").unwrap().max, "10");
        assert!(!editor.is_saving("drill_temp1"));
    }

    #[tokio::test]
    async fn successful_save_refetches_the_catalog() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/Sensor/thresholds"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/Sensor"))
            .respond_with(ResponseTemplate::new(200).set_body_json(catalog_body()))
            .expect(1)
            .mount(&server)
            .await;

        let mut editor = editor_against(&server).await;
        seed(&mut editor, vec![sensor("drill_temp1")]);
        editor.set_draft("drill_temp1", ThresholdField::Min, "12");
        editor.set_draft("drill_temp1", ThresholdField::Max, "78");

        editor.save("drill_temp1").await.unwrap();

        // Display reflects the authoritative (refetched) values.
        assert_eq!(editor.sensors().len(), 2);
        assert_eq!(editor.draft("drill_temp1").unwrap().min, "10");
        assert!(!editor.is_saving("drill_temp1"));
    }

    #[test]
    fn paging_clamps_into_range() {
        let mut editor = offline_editor();
        let sensors: Vec<Sensor> = (0..12).map(|i| sensor(&format!("s{i}"))).collect();
        seed(&mut editor, sensors);

        assert_eq!(editor.total_pages(), 3);

        editor.set_page(4);
        assert_eq!(editor.page(), 3);
        assert_eq!(editor.page_sensors().len(), 2);

        editor.set_page(0);
        assert_eq!(editor.page(), 1);
        assert_eq!(editor.page_sensors().len(), 5);
    }

    #[test]
    fn empty_catalog_still_reports_one_page() {
        let editor = offline_editor();
        assert_eq!(editor.total_pages(), 1);
        assert!(editor.page_sensors().is_empty());
    }
}
