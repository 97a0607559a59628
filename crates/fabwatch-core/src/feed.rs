//! Live alert state aggregation.
//!
//! [`AlertFeed`] is the single state object behind the console's "what is
//! currently alerting" view. It folds the push stream, in arrival order,
//! into three things: a bounded most-recent-first history, a per-sensor
//! firing flag, and a per-module firing flag. All mutation goes through
//! [`AlertFeed::apply`] so the fold is testable in isolation from any
//! rendering concern.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::model::{AlertEvent, DigitalModule, ModuleSummary};

/// Retained history entries. Oldest entries are evicted first once the
/// bound is reached; flags are unaffected by eviction.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// State transition of the live alert view.
#[derive(Debug, Clone)]
pub enum FeedAction {
    /// A new event arrived on the push channel.
    Ingest(Arc<AlertEvent>),
    /// The user dismissed one entry from the visible history.
    Dismiss(String),
    /// The user opened the notification surface; unread resets to zero.
    Acknowledge,
}

/// Aggregated live alert state.
pub struct AlertFeed {
    history: VecDeque<Arc<AlertEvent>>,
    capacity: usize,
    sensor_flags: HashMap<String, bool>,
    module_flags: HashMap<String, bool>,
    unread: u64,
}

impl AlertFeed {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            history: VecDeque::new(),
            capacity,
            sensor_flags: HashMap::new(),
            module_flags: HashMap::new(),
            unread: 0,
        }
    }

    /// Apply one state transition.
    pub fn apply(&mut self, action: FeedAction) {
        match action {
            FeedAction::Ingest(event) => self.ingest(event),
            FeedAction::Dismiss(alert_id) => self.dismiss(&alert_id),
            FeedAction::Acknowledge => self.unread = 0,
        }
    }

    /// Fold one event into the state.
    ///
    /// The flags update only when the event carries a sensor id, a module
    /// id, and a status -- last event wins per key. An event missing any
    /// of those still lands in the history.
    fn ingest(&mut self, event: Arc<AlertEvent>) {
        if let (Some(sensor_id), Some(module_id), Some(status)) = (
            event.sensor_id.as_ref(),
            event.digital_module_id.as_ref(),
            event.status,
        ) {
            let firing = status.is_firing();
            self.sensor_flags.insert(sensor_id.clone(), firing);
            self.module_flags.insert(module_id.clone(), firing);
        }

        self.history.push_front(event);
        while self.history.len() > self.capacity {
            self.history.pop_back();
        }

        self.unread = self.unread.saturating_add(1);
    }

    /// Remove one entry from the visible history.
    ///
    /// Flags are driven only by the ingestion stream, never by display
    /// edits: dismissing a toast must not mask a still-firing condition
    /// highlighted on a module card.
    fn dismiss(&mut self, alert_id: &str) {
        self.history.retain(|event| event.alert_id != alert_id);
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// Retained events, most recent first.
    pub fn history(&self) -> impl Iterator<Item = &Arc<AlertEvent>> {
        self.history.iter()
    }

    /// Owned snapshot of the history, most recent first.
    pub fn history_snapshot(&self) -> Vec<Arc<AlertEvent>> {
        self.history.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// `true` iff the most recently ingested event for this sensor was
    /// firing.
    pub fn sensor_firing(&self, sensor_id: &str) -> bool {
        self.sensor_flags.get(sensor_id).copied().unwrap_or(false)
    }

    /// `true` iff the most recently ingested event for this module was
    /// firing.
    pub fn module_firing(&self, module_id: &str) -> bool {
        self.module_flags.get(module_id).copied().unwrap_or(false)
    }

    /// Sensors currently flagged as firing.
    pub fn firing_sensors(&self) -> Vec<&str> {
        let mut firing: Vec<&str> = self
            .sensor_flags
            .iter()
            .filter(|&(_, &f)| f)
            .map(|(id, _)| id.as_str())
            .collect();
        firing.sort_unstable();
        firing
    }

    /// Events ingested since the last acknowledgment.
    pub fn unread(&self) -> u64 {
        self.unread
    }

    /// Dashboard cards for the live modules, with the derived alert flag.
    pub fn module_summaries(&self) -> Vec<ModuleSummary> {
        DigitalModule::dashboard()
            .map(|module| ModuleSummary {
                module,
                description: module.description(),
                sensor_count: module.sensor_count(),
                has_active_alert: self.module_firing(&module.to_string()),
            })
            .collect()
    }
}

impl Default for AlertFeed {
    fn default() -> Self {
        Self::new()
    }
}
