// ── Alert log filter ──
//
// Holds the raw user input for the historical query. Fields stay as
// plain strings (an empty string means "unset") so the presentation can
// bind inputs directly; conversion to the wire query drops empty fields
// entirely, letting the gateway's match-all default apply.

use fabwatch_api::types::AlertQuery;

/// Current criteria for the alert log query.
///
/// `from`/`to` are opaque local-time strings passed through to the
/// gateway; no `from <= to` ordering is enforced here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertFilter {
    pub sensor_id: String,
    pub digital_module_id: String,
    pub status: String,
    pub from: String,
    pub to: String,
}

/// Partial update of filter fields; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct FilterUpdate {
    pub sensor_id: Option<String>,
    pub digital_module_id: Option<String>,
    pub status: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl AlertFilter {
    /// Apply a partial update.
    pub fn apply(&mut self, update: FilterUpdate) {
        if let Some(v) = update.sensor_id {
            self.sensor_id = v;
        }
        if let Some(v) = update.digital_module_id {
            self.digital_module_id = v;
        }
        if let Some(v) = update.status {
            self.status = v;
        }
        if let Some(v) = update.from {
            self.from = v;
        }
        if let Some(v) = update.to {
            self.to = v;
        }
    }

    /// Build the wire query, omitting every empty field.
    pub fn to_query(&self) -> AlertQuery {
        AlertQuery {
            sensor_id: non_empty(&self.sensor_id),
            digital_module_id: non_empty(&self.digital_module_id),
            status: non_empty(&self.status),
            from: non_empty(&self.from),
            to: non_empty(&self.to),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_builds_empty_query() {
        let query = AlertFilter::default().to_query();
        assert!(query.is_empty());
    }

    #[test]
    fn only_set_fields_reach_the_query() {
        let mut filter = AlertFilter::default();
        filter.apply(FilterUpdate {
            digital_module_id: Some("MILL001".into()),
            status: Some("firing".into()),
            ..FilterUpdate::default()
        });

        let query = filter.to_query();
        assert_eq!(query.digital_module_id.as_deref(), Some("MILL001"));
        assert_eq!(query.status.as_deref(), Some("firing"));
        assert!(query.sensor_id.is_none());
        assert!(query.from.is_none());
        assert!(query.to.is_none());
    }

    #[test]
    fn update_can_clear_a_field() {
        let mut filter = AlertFilter {
            status: "firing".into(),
            ..AlertFilter::default()
        };
        filter.apply(FilterUpdate {
            status: Some(String::new()),
            ..FilterUpdate::default()
        });
        assert!(filter.to_query().status.is_none());
    }

    #[test]
    fn time_bounds_pass_through_unvalidated() {
        // `from` after `to` is deliberately not rejected here.
        let filter = AlertFilter {
            from: "2026-02-11T00:00".into(),
            to: "2026-02-10T00:00".into(),
            ..AlertFilter::default()
        };
        let query = filter.to_query();
        assert_eq!(query.from.as_deref(), Some("2026-02-11T00:00"));
        assert_eq!(query.to.as_deref(), Some("2026-02-10T00:00"));
    }
}
