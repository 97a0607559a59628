// ── Console lifecycle ──
//
// Owns the connection to the plant gateway: the REST client, the push
// alert channel, and the live alert state. The pump task folds every
// received event into the AlertFeed and runs the notification
// dispatcher, strictly in arrival order.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex as AsyncMutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use fabwatch_api::transport::TransportConfig;
use fabwatch_api::{AlertChannel, AlertMessage, ChannelState, GatewayClient, ReconnectPolicy};
use url::Url;

use crate::error::CoreError;
use crate::feed::{AlertFeed, DEFAULT_HISTORY_CAPACITY, FeedAction};
use crate::log_query::{AlertLog, DEFAULT_LOG_PAGE_SIZE};
use crate::model::{AlertEvent, ModuleSummary};
use crate::notify::{Dispatcher, FocusProbe, SystemNotifier, Toast};
use crate::thresholds::{DEFAULT_SENSOR_PAGE_SIZE, ThresholdEditor};

// ── ConsoleConfig ────────────────────────────────────────────────────

/// Configuration for a [`Console`].
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Gateway REST root, e.g. `http://gateway:5167`.
    pub gateway_url: Url,
    /// Push hub endpoint, derived from the gateway URL by default.
    pub hub_url: Url,
    pub transport: TransportConfig,
    pub reconnect: ReconnectPolicy,
    pub history_capacity: usize,
    pub sensor_page_size: usize,
    pub log_page_size: usize,
    /// Suppress system-level notifications while the surface has focus.
    pub suppress_when_focused: bool,
}

impl ConsoleConfig {
    /// Build a config with defaults, deriving the hub URL from the
    /// gateway root (`/alertHub`, `ws`/`wss` matching the REST scheme).
    pub fn new(gateway_url: Url) -> Result<Self, CoreError> {
        let hub_url = derive_hub_url(&gateway_url)?;
        Ok(Self {
            gateway_url,
            hub_url,
            transport: TransportConfig::default(),
            reconnect: ReconnectPolicy::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            sensor_page_size: DEFAULT_SENSOR_PAGE_SIZE,
            log_page_size: DEFAULT_LOG_PAGE_SIZE,
            suppress_when_focused: true,
        })
    }
}

fn derive_hub_url(gateway: &Url) -> Result<Url, CoreError> {
    let mut hub = gateway.join("/alertHub").map_err(|e| CoreError::Config {
        message: format!("cannot derive hub URL: {e}"),
    })?;
    let scheme = if gateway.scheme() == "https" { "wss" } else { "ws" };
    hub.set_scheme(scheme).map_err(|()| CoreError::Config {
        message: format!("cannot derive hub URL scheme from `{}`", gateway.scheme()),
    })?;
    Ok(hub)
}

// ── Console ──────────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc`. [`connect`](Self::connect) starts the
/// push channel and its pump task; the threshold editor and alert log
/// are independent pull-based components created from
/// [`threshold_editor`](Self::threshold_editor) and
/// [`alert_log`](Self::alert_log).
#[derive(Clone)]
pub struct Console {
    inner: Arc<ConsoleInner>,
}

struct ConsoleInner {
    config: ConsoleConfig,
    client: Arc<GatewayClient>,
    feed: std::sync::Mutex<AlertFeed>,
    dispatcher: std::sync::Mutex<Dispatcher>,
    revision: watch::Sender<u64>,
    conn_state: watch::Sender<ChannelState>,
    cancel: CancellationToken,
    started: AtomicBool,
    tasks: AsyncMutex<Vec<JoinHandle<()>>>,
}

impl Console {
    /// Create a console with the default notification probes (focused
    /// surface, no system notification capability).
    pub fn new(config: ConsoleConfig) -> Result<Self, CoreError> {
        let dispatcher =
            Dispatcher::headless().with_focus_suppression(config.suppress_when_focused);
        Self::with_dispatcher(config, dispatcher)
    }

    /// Create a console with presentation-supplied focus and system
    /// notification boundaries.
    pub fn with_probes(
        config: ConsoleConfig,
        focus: Box<dyn FocusProbe>,
        system: Box<dyn SystemNotifier>,
    ) -> Result<Self, CoreError> {
        let dispatcher =
            Dispatcher::new(focus, system).with_focus_suppression(config.suppress_when_focused);
        Self::with_dispatcher(config, dispatcher)
    }

    fn with_dispatcher(config: ConsoleConfig, dispatcher: Dispatcher) -> Result<Self, CoreError> {
        let client = Arc::new(GatewayClient::new(
            config.gateway_url.clone(),
            &config.transport,
        )?);
        let (revision, _) = watch::channel(0);
        let (conn_state, _) = watch::channel(ChannelState::Disconnected);

        Ok(Self {
            inner: Arc::new(ConsoleInner {
                feed: std::sync::Mutex::new(AlertFeed::with_capacity(config.history_capacity)),
                dispatcher: std::sync::Mutex::new(dispatcher),
                config,
                client,
                revision,
                conn_state,
                cancel: CancellationToken::new(),
                started: AtomicBool::new(false),
                tasks: AsyncMutex::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.inner.config
    }

    /// The shared REST client.
    pub fn client(&self) -> Arc<GatewayClient> {
        Arc::clone(&self.inner.client)
    }

    // ── Connection lifecycle ─────────────────────────────────────────

    /// Start the push channel and the event pump.
    ///
    /// Returns immediately; connection progress is observable through
    /// [`connection_state`](Self::connection_state). Calling this more
    /// than once is a no-op.
    pub async fn connect(&self) {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            debug!("console already connected");
            return;
        }

        let channel = AlertChannel::connect(
            self.inner.config.hub_url.clone(),
            self.inner.config.reconnect.clone(),
            self.inner.cancel.clone(),
        );

        let mut tasks = self.inner.tasks.lock().await;
        tasks.push(tokio::spawn(relay_state(
            Arc::clone(&self.inner),
            channel.state(),
        )));
        tasks.push(tokio::spawn(pump_events(
            Arc::clone(&self.inner),
            channel.subscribe(),
        )));
    }

    /// Tear down the channel, cancelling any pending reconnect, and wait
    /// for the background tasks. No further events are delivered.
    pub async fn disconnect(&self) {
        self.inner.cancel.cancel();

        let mut tasks = self.inner.tasks.lock().await;
        for handle in tasks.drain(..) {
            let _ = handle.await;
        }

        let _ = self.inner.conn_state.send(ChannelState::Disconnected);
        debug!("console disconnected");
    }

    // ── State observation ────────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ChannelState> {
        self.inner.conn_state.subscribe()
    }

    pub fn current_connection_state(&self) -> ChannelState {
        *self.inner.conn_state.borrow()
    }

    /// Subscribe to feed revisions; the value bumps after every folded
    /// event, so consumers re-read snapshots only when something changed.
    pub fn feed_revision(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    // ── Live alert state (delegates to AlertFeed) ────────────────────

    pub fn history_snapshot(&self) -> Vec<Arc<AlertEvent>> {
        self.inner.feed().history_snapshot()
    }

    pub fn sensor_firing(&self, sensor_id: &str) -> bool {
        self.inner.feed().sensor_firing(sensor_id)
    }

    pub fn module_firing(&self, module_id: &str) -> bool {
        self.inner.feed().module_firing(module_id)
    }

    pub fn module_summaries(&self) -> Vec<ModuleSummary> {
        self.inner.feed().module_summaries()
    }

    pub fn unread(&self) -> u64 {
        self.inner.feed().unread()
    }

    /// Reset the unread counter (the user opened the notifications).
    pub fn acknowledge(&self) {
        self.inner.feed().apply(FeedAction::Acknowledge);
        self.inner.revision.send_modify(|r| *r += 1);
    }

    /// Remove one entry from the visible history. Firing flags are
    /// unaffected.
    pub fn dismiss(&self, alert_id: &str) {
        self.inner
            .feed()
            .apply(FeedAction::Dismiss(alert_id.to_string()));
        self.inner.revision.send_modify(|r| *r += 1);
    }

    /// Drain queued in-app toasts, oldest first.
    pub fn drain_toasts(&self) -> Vec<Toast> {
        self.inner.dispatcher().drain_toasts()
    }

    // ── Component factories ──────────────────────────────────────────

    /// A threshold editor sharing this console's REST client.
    pub fn threshold_editor(&self) -> ThresholdEditor {
        ThresholdEditor::with_page_size(self.client(), self.inner.config.sensor_page_size)
    }

    /// An alert log query sharing this console's REST client.
    pub fn alert_log(&self) -> AlertLog {
        AlertLog::with_page_size(self.client(), self.inner.config.log_page_size)
    }
}

impl ConsoleInner {
    fn feed(&self) -> std::sync::MutexGuard<'_, AlertFeed> {
        self.feed.lock().expect("alert feed lock poisoned")
    }

    fn dispatcher(&self) -> std::sync::MutexGuard<'_, Dispatcher> {
        self.dispatcher.lock().expect("dispatcher lock poisoned")
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Forward channel state transitions into the console's own watch
/// channel, settling on Disconnected when the loop ends.
async fn relay_state(inner: Arc<ConsoleInner>, mut state_rx: watch::Receiver<ChannelState>) {
    loop {
        let current = *state_rx.borrow_and_update();
        let _ = inner.conn_state.send(current);

        tokio::select! {
            biased;
            _ = inner.cancel.cancelled() => break,
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    let _ = inner.conn_state.send(ChannelState::Disconnected);
}

/// Fold received events into the feed, strictly in arrival order.
async fn pump_events(
    inner: Arc<ConsoleInner>,
    mut rx: broadcast::Receiver<Arc<AlertMessage>>,
) {
    loop {
        tokio::select! {
            biased;
            _ = inner.cancel.cancelled() => break,
            received = rx.recv() => match received {
                Ok(message) => apply_message(&inner, &message),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "alert pump lagged behind the channel");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}

/// Ingest one wire message: fold into the feed, dispatch notifications,
/// bump the revision.
fn apply_message(inner: &ConsoleInner, message: &AlertMessage) {
    let event = Arc::new(AlertEvent::from(message));

    inner.feed().apply(FeedAction::Ingest(Arc::clone(&event)));
    inner.dispatcher().dispatch(&event);
    inner.revision.send_modify(|r| *r += 1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ToastKind;

    fn console() -> Console {
        let config = ConsoleConfig::new(Url::parse("http://gateway:5167").unwrap()).unwrap();
        Console::new(config).unwrap()
    }

    #[test]
    fn hub_url_derives_from_gateway_scheme() {
        let config = ConsoleConfig::new(Url::parse("http://gateway:5167").unwrap()).unwrap();
        assert_eq!(config.hub_url.as_str(), "ws://gateway:5167/alertHub");

        let secure = ConsoleConfig::new(Url::parse("https://gateway").unwrap()).unwrap();
        assert_eq!(secure.hub_url.as_str(), "wss://gateway/alertHub");
    }

    #[test]
    fn config_defaults_match_documented_bounds() {
        let config = ConsoleConfig::new(Url::parse("http://gateway:5167").unwrap()).unwrap();
        assert_eq!(config.history_capacity, DEFAULT_HISTORY_CAPACITY);
        assert_eq!(config.sensor_page_size, 5);
        assert_eq!(config.log_page_size, 10);
        assert!(config.suppress_when_focused);
        assert_eq!(config.reconnect.delay.as_secs(), 5);
    }

    fn message(alert_id: &str, status: &str) -> AlertMessage {
        serde_json::from_value(serde_json::json!({
            "alertId": alert_id,
            "sensorId": "drill_temp1",
            "digitalModuleId": "DRILL001",
            "status": status,
            "alertType": "Threshold"
        }))
        .unwrap()
    }

    #[test]
    fn applied_message_updates_feed_toasts_and_revision() {
        let console = console();
        let mut revision = console.feed_revision();

        apply_message(&console.inner, &message("a-1", "firing"));

        assert!(console.sensor_firing("drill_temp1"));
        assert!(console.module_firing("DRILL001"));
        assert_eq!(console.unread(), 1);
        assert_eq!(console.history_snapshot().len(), 1);
        assert_eq!(*revision.borrow_and_update(), 1);

        let toasts = console.drain_toasts();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, ToastKind::Warning);
        assert_eq!(toasts[0].alert_id, "a-1");
    }

    #[test]
    fn firing_then_resolved_clears_flags_keeps_history() {
        let console = console();

        apply_message(&console.inner, &message("a-1", "firing"));
        apply_message(&console.inner, &message("a-2", "resolved"));

        assert!(!console.sensor_firing("drill_temp1"));
        assert!(!console.module_firing("DRILL001"));

        let history = console.history_snapshot();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].alert_id, "a-2");
    }

    #[test]
    fn dismiss_and_acknowledge_pass_through() {
        let console = console();
        apply_message(&console.inner, &message("a-1", "firing"));

        console.dismiss("a-1");
        assert!(console.history_snapshot().is_empty());
        assert!(console.sensor_firing("drill_temp1"), "flags survive dismissal");

        console.acknowledge();
        assert_eq!(console.unread(), 0);
    }

    #[test]
    fn module_summaries_expose_derived_alert_state() {
        let console = console();
        apply_message(&console.inner, &message("a-1", "firing"));

        let summaries = console.module_summaries();
        let drill = summaries
            .iter()
            .find(|s| s.module.to_string() == "DRILL001")
            .unwrap();
        assert!(drill.has_active_alert);
    }
}
