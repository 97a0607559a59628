//! Push alert channel with auto-reconnect.
//!
//! Connects to the gateway's alert hub over WebSocket and streams parsed
//! alert events through a [`tokio::sync::broadcast`] channel. Connection
//! state is observable through a [`tokio::sync::watch`] channel, and a
//! dropped connection is retried on a fixed delay, forever -- for a live
//! alert feed, eventual reconnection beats backoff discipline.
//!
//! # Example
//!
//! ```rust,ignore
//! use fabwatch_api::channel::{AlertChannel, ReconnectPolicy};
//! use tokio_util::sync::CancellationToken;
//! use url::Url;
//!
//! let cancel = CancellationToken::new();
//! let hub_url = Url::parse("ws://gateway:5167/alertHub")?;
//!
//! let channel = AlertChannel::connect(hub_url, ReconnectPolicy::default(), cancel.clone());
//! let mut rx = channel.subscribe();
//!
//! while let Ok(message) = rx.recv().await {
//!     println!("{}: {:?}", message.alert_id, message.status);
//! }
//!
//! channel.shutdown();
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;

// ── Broadcast channel capacity ───────────────────────────────────────

const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Hub invocation name carrying alert payloads. Other targets are ignored.
const ALERT_TARGET: &str = "ReceiveAlert";

// ── AlertMessage ─────────────────────────────────────────────────────

/// A parsed alert event from the push stream.
///
/// Every field except `alert_id` is optional: payload shape varies by
/// alert source, and a missing field must never drop the event. Uses
/// `#[serde(flatten)]` to capture anything beyond the core set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertMessage {
    /// Stable identity of the alert occurrence.
    pub alert_id: String,

    /// Sensor the alert fired on, if the source reports one.
    #[serde(default)]
    pub sensor_id: Option<String>,

    /// Digital module the sensor belongs to.
    #[serde(default)]
    pub digital_module_id: Option<String>,

    /// Raw status label: `"firing"`, `"resolved"`, or anything else.
    #[serde(default)]
    pub status: Option<String>,

    /// Alert classification, e.g. `"Threshold"`.
    #[serde(default, alias = "type")]
    pub alert_type: Option<String>,

    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,

    /// Local-time timestamp string from the gateway.
    #[serde(default)]
    pub started_at: Option<String>,

    /// All remaining fields the gateway sends.
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

// ── ChannelState ─────────────────────────────────────────────────────

/// Observable connection state of the push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Disconnected,
    Connecting,
    Connected,
}

// ── ReconnectPolicy ──────────────────────────────────────────────────

/// Reconnection policy: one pending attempt at a time, after a fixed
/// delay, retrying indefinitely. There is deliberately no backoff growth
/// and no retry cap.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Delay between a drop and the next connection attempt. Default: 5s.
    pub delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(5),
        }
    }
}

// ── AlertChannel ─────────────────────────────────────────────────────

/// Handle to a running push alert stream.
///
/// Drop all receivers and call [`shutdown`](Self::shutdown) to tear down
/// the background task; shutdown also cancels a pending reconnect sleep,
/// so no further attempts or events occur afterwards.
pub struct AlertChannel {
    event_rx: broadcast::Receiver<Arc<AlertMessage>>,
    state_rx: watch::Receiver<ChannelState>,
    cancel: CancellationToken,
}

impl AlertChannel {
    /// Spawn the connection loop against the given hub URL.
    ///
    /// Returns immediately; the first connection attempt happens in the
    /// background. Connect failures are logged and retried, never
    /// surfaced to the caller.
    pub fn connect(hub_url: Url, policy: ReconnectPolicy, cancel: CancellationToken) -> Self {
        let (event_tx, event_rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (state_tx, state_rx) = watch::channel(ChannelState::Disconnected);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            channel_loop(hub_url, event_tx, state_tx, policy, task_cancel).await;
        });

        Self {
            event_rx,
            state_rx,
            cancel,
        }
    }

    /// Get a new broadcast receiver for the alert stream.
    ///
    /// Multiple consumers can subscribe concurrently; events are
    /// delivered in arrival order. A consumer that falls behind receives
    /// [`broadcast::error::RecvError::Lagged`].
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<AlertMessage>> {
        self.event_rx.resubscribe()
    }

    /// Observe connection state transitions.
    pub fn state(&self) -> watch::Receiver<ChannelState> {
        self.state_rx.clone()
    }

    /// Current connection state.
    pub fn current_state(&self) -> ChannelState {
        *self.state_rx.borrow()
    }

    /// Signal the background task to shut down, cancelling any pending
    /// reconnect sleep.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

// ── Background connection loop ───────────────────────────────────────

/// Main loop: connect → read → on drop, publish Disconnected, sleep the
/// fixed delay, reconnect. Exactly one reconnect is pending at any time.
async fn channel_loop(
    hub_url: Url,
    event_tx: broadcast::Sender<Arc<AlertMessage>>,
    state_tx: watch::Sender<ChannelState>,
    policy: ReconnectPolicy,
    cancel: CancellationToken,
) {
    loop {
        let _ = state_tx.send(ChannelState::Connecting);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = connect_and_read(&hub_url, &event_tx, &state_tx, &cancel) => {
                match result {
                    Ok(()) => tracing::info!("alert channel closed, reconnecting"),
                    Err(e) => tracing::warn!(error = %e, "alert channel error"),
                }

                let _ = state_tx.send(ChannelState::Disconnected);

                tracing::info!(
                    delay_ms = policy.delay.as_millis() as u64,
                    "waiting before reconnect"
                );

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(policy.delay) => {}
                }
            }
        }
    }

    let _ = state_tx.send(ChannelState::Disconnected);
    tracing::debug!("alert channel loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Establish one WebSocket connection, publish `Connected` once the
/// handshake succeeds, and read frames until the connection drops.
async fn connect_and_read(
    url: &Url,
    event_tx: &broadcast::Sender<Arc<AlertMessage>>,
    state_tx: &watch::Sender<ChannelState>,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    tracing::info!(url = %url, "connecting to alert hub");

    let (ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .map_err(|e| Error::Channel(e.to_string()))?;

    tracing::info!("alert hub connected");
    let _ = state_tx.send(ChannelState::Connected);

    let (_write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(()),
            frame = read.next() => {
                match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        parse_and_broadcast(&text, event_tx);
                    }
                    Some(Ok(tungstenite::Message::Ping(_))) => {
                        // tungstenite handles pong replies automatically
                        tracing::trace!("alert hub ping");
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        if let Some(ref cf) = frame {
                            tracing::info!(
                                code = %cf.code,
                                reason = %cf.reason,
                                "alert hub close frame received"
                            );
                        } else {
                            tracing::info!("alert hub close frame received (no payload)");
                        }
                        return Ok(());
                    }
                    Some(Err(e)) => {
                        return Err(Error::Channel(e.to_string()));
                    }
                    None => {
                        // Stream ended without a close frame
                        tracing::info!("alert hub stream ended");
                        return Ok(());
                    }
                    _ => {
                        // Binary, Pong, Frame -- ignore
                    }
                }
            }
        }
    }
}

// ── Message parsing ──────────────────────────────────────────────────

/// Invocation envelope the hub sends over the WebSocket.
///
/// All messages have the shape `{ "target": "...", "arguments": [...] }`.
#[derive(Debug, Deserialize)]
struct HubInvocation {
    target: String,
    #[serde(default)]
    arguments: Vec<serde_json::Value>,
}

/// Parse a WebSocket text frame and broadcast any alert payloads inside.
///
/// Invocations with a target other than [`ALERT_TARGET`] are skipped;
/// malformed envelopes are logged and dropped. Payloads that fail typed
/// deserialization are reconstructed from raw JSON so a missing optional
/// field never loses an event.
fn parse_and_broadcast(text: &str, event_tx: &broadcast::Sender<Arc<AlertMessage>>) {
    let invocation: HubInvocation = match serde_json::from_str(text) {
        Ok(inv) => inv,
        Err(e) => {
            tracing::debug!(error = %e, "failed to parse hub invocation");
            return;
        }
    };

    if invocation.target != ALERT_TARGET {
        tracing::trace!(target = %invocation.target, "ignoring non-alert invocation");
        return;
    }

    for argument in invocation.arguments {
        let message = match serde_json::from_value::<AlertMessage>(argument.clone()) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    "could not deserialize alert payload, constructing from raw data"
                );
                message_from_raw(&argument)
            }
        };

        // Ignore send errors -- just means no active subscribers right now
        let _ = event_tx.send(Arc::new(message));
    }
}

/// Build an [`AlertMessage`] from raw JSON when typed deserialization
/// fails. Every field that cannot be read fails closed to `None`.
fn message_from_raw(data: &serde_json::Value) -> AlertMessage {
    AlertMessage {
        alert_id: data["alertId"]
            .as_str()
            .or_else(|| data["id"].as_str())
            .unwrap_or("unknown")
            .to_string(),
        sensor_id: data["sensorId"].as_str().map(String::from),
        digital_module_id: data["digitalModuleId"].as_str().map(String::from),
        status: data["status"].as_str().map(String::from),
        alert_type: data["alertType"]
            .as_str()
            .or_else(|| data["type"].as_str())
            .map(String::from),
        description: data["description"].as_str().map(String::from),
        started_at: data["startedAt"].as_str().map(String::from),
        extra: data.clone(),
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_reconnect_policy_is_five_seconds() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay, Duration::from_secs(5));
    }

    #[test]
    fn deserialize_alert_message() {
        let json = r#"{
            "alertId": "a-42",
            "sensorId": "drill_temp1",
            "digitalModuleId": "DRILL001",
            "status": "firing",
            "alertType": "Threshold",
            "description": "Temperature above max",
            "startedAt": "2026-02-10 12:00:00",
            "value": 91.5
        }"#;

        let message: AlertMessage = serde_json::from_str(json).unwrap();
        assert_eq!(message.alert_id, "a-42");
        assert_eq!(message.sensor_id.as_deref(), Some("drill_temp1"));
        assert_eq!(message.digital_module_id.as_deref(), Some("DRILL001"));
        assert_eq!(message.status.as_deref(), Some("firing"));
        // Extra fields should be captured in `extra`
        assert_eq!(message.extra["value"], 91.5);
    }

    #[test]
    fn deserialize_alert_message_type_alias() {
        let json = r#"{ "alertId": "a-1", "type": "Threshold" }"#;
        let message: AlertMessage = serde_json::from_str(json).unwrap();
        assert_eq!(message.alert_type.as_deref(), Some("Threshold"));
    }

    #[test]
    fn parse_and_broadcast_alert_invocation() {
        let (tx, mut rx) = broadcast::channel(16);

        let raw = serde_json::json!({
            "target": "ReceiveAlert",
            "arguments": [{
                "alertId": "a-7",
                "sensorId": "mill_vibration1",
                "digitalModuleId": "MILL001",
                "status": "resolved"
            }]
        });

        parse_and_broadcast(&raw.to_string(), &tx);

        let message = rx.try_recv().unwrap();
        assert_eq!(message.alert_id, "a-7");
        assert_eq!(message.status.as_deref(), Some("resolved"));
    }

    #[test]
    fn parse_and_broadcast_ignores_other_targets() {
        let (tx, mut rx) = broadcast::channel::<Arc<AlertMessage>>(16);

        let raw = serde_json::json!({
            "target": "Heartbeat",
            "arguments": [{ "alertId": "a-9" }]
        });

        parse_and_broadcast(&raw.to_string(), &tx);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn parse_and_broadcast_falls_back_on_missing_alert_id() {
        let (tx, mut rx) = broadcast::channel(16);

        // No alertId -- typed deserialization fails, raw fallback applies
        let raw = serde_json::json!({
            "target": "ReceiveAlert",
            "arguments": [{
                "sensorId": "fts_speed1",
                "status": "firing"
            }]
        });

        parse_and_broadcast(&raw.to_string(), &tx);

        let message = rx.try_recv().unwrap();
        assert_eq!(message.alert_id, "unknown");
        assert_eq!(message.sensor_id.as_deref(), Some("fts_speed1"));
        assert_eq!(message.status.as_deref(), Some("firing"));
    }

    #[test]
    fn parse_and_broadcast_malformed_json() {
        let (tx, mut rx) = broadcast::channel::<Arc<AlertMessage>>(16);

        parse_and_broadcast("not json at all", &tx);

        // Should not panic, should just log and skip
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn failed_connect_schedules_exactly_one_reconnect_cycle() {
        // Nothing listens on this port, so every attempt is refused
        // immediately and the loop parks in its fixed-delay sleep.
        // Observing Disconnected twice proves a second attempt was
        // scheduled after the delay.
        let cancel = CancellationToken::new();
        let channel = AlertChannel::connect(
            Url::parse("ws://127.0.0.1:1/alertHub").unwrap(),
            ReconnectPolicy {
                delay: Duration::from_millis(50),
            },
            cancel.clone(),
        );

        let mut state = channel.state();
        let mut disconnects = 0;
        let observed = tokio::time::timeout(Duration::from_secs(5), async {
            while disconnects < 2 {
                state.changed().await.unwrap();
                if *state.borrow_and_update() == ChannelState::Disconnected {
                    disconnects += 1;
                }
            }
        })
        .await;

        assert!(
            observed.is_ok(),
            "expected two failed connection cycles within the timeout"
        );
        channel.shutdown();
    }

    #[tokio::test]
    async fn shutdown_cancels_pending_reconnect() {
        // Nothing is listening on this port; the loop will fail to connect
        // and park in its fixed-delay sleep. Shutdown must end the task.
        let cancel = CancellationToken::new();
        let channel = AlertChannel::connect(
            Url::parse("ws://127.0.0.1:1/alertHub").unwrap(),
            ReconnectPolicy {
                delay: Duration::from_secs(600),
            },
            cancel.clone(),
        );

        let mut state = channel.state();
        // Wait until the loop has started cycling (Connecting, or already
        // back to Disconnected after the instant refusal).
        state.changed().await.unwrap();

        channel.shutdown();
        assert!(cancel.is_cancelled());

        // The loop publishes Disconnected on its way out.
        tokio::time::timeout(Duration::from_secs(1), async {
            while *state.borrow_and_update() != ChannelState::Disconnected {
                state.changed().await.unwrap();
            }
        })
        .await
        .expect("channel should settle to Disconnected after shutdown");
    }
}
