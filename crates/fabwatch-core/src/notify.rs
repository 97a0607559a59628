//! Notification dispatch.
//!
//! Every alert event produces exactly one in-app toast; a system-level
//! notification additionally goes out when the host surface lacks focus
//! and the user already granted permission. Both are keyed/tagged by
//! `alert_id` so repeat deliveries of the same event coalesce instead of
//! stacking.
//!
//! Focus and the notification capability are read through the
//! [`FocusProbe`] and [`SystemNotifier`] boundary traits. Permission is
//! never requested from here -- `request_permission` exists for an
//! explicit user action at the presentation boundary.

use std::collections::VecDeque;

use crate::model::{AlertEvent, AlertStatus};

// ── Notification payloads ────────────────────────────────────────────

/// Styling of an in-app toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    /// Alert started firing.
    Warning,
    /// Alert resolved.
    Success,
    /// Status unspecified or unrecognized.
    Info,
}

/// In-app toast, keyed by `alert_id` for lookup at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub alert_id: String,
    pub kind: ToastKind,
    pub title: String,
    pub body: String,
}

/// System-level notification. `tag` carries the alert id so the OS
/// coalesces duplicate deliveries of the same event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemNote {
    pub tag: String,
    pub title: String,
    pub body: String,
}

/// What one event dispatches: the unconditional toast and, when focus
/// and permission allow, a system note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPlan {
    pub toast: Toast,
    pub system: Option<SystemNote>,
}

// ── Boundary traits ──────────────────────────────────────────────────

/// Reports whether the host surface currently has input focus.
pub trait FocusProbe: Send + Sync {
    fn has_focus(&self) -> bool;
}

/// System notification capability.
///
/// A missing capability or denied permission silently disables the
/// system-level path; the toast path never depends on it.
pub trait SystemNotifier: Send + Sync {
    /// Whether the user previously granted notification permission.
    fn permission_granted(&self) -> bool;

    /// Ask the user for permission. Only ever called from an explicit
    /// user action, never by the dispatcher.
    fn request_permission(&self);

    /// Deliver a note to the system notification surface.
    fn deliver(&self, note: &SystemNote);
}

/// Default probe: the surface counts as focused, so only toasts go out.
pub struct AlwaysFocused;

impl FocusProbe for AlwaysFocused {
    fn has_focus(&self) -> bool {
        true
    }
}

/// Default notifier: no capability, nothing is delivered.
pub struct NoSystemNotifier;

impl SystemNotifier for NoSystemNotifier {
    fn permission_granted(&self) -> bool {
        false
    }

    fn request_permission(&self) {}

    fn deliver(&self, _note: &SystemNote) {}
}

// ── Planning ─────────────────────────────────────────────────────────

/// Decide what one event dispatches, given the current focus and
/// permission state. Pure -- all policy lives here.
pub fn plan(
    event: &AlertEvent,
    focused: bool,
    permission_granted: bool,
    suppress_when_focused: bool,
) -> NotificationPlan {
    let sensor = event.sensor_id.as_deref().unwrap_or("Unknown Sensor");
    let kind_of = event.alert_type.as_deref().unwrap_or("Threshold");

    let (kind, title, note_title) = match event.status {
        Some(AlertStatus::Firing) => (
            ToastKind::Warning,
            "Alert Triggered!".to_string(),
            format!("Alert: {sensor}"),
        ),
        Some(AlertStatus::Resolved) => (
            ToastKind::Success,
            "Alert Resolved!".to_string(),
            format!("Resolved: {sensor}"),
        ),
        Some(AlertStatus::Unknown) | None => (
            ToastKind::Info,
            "Alert Update".to_string(),
            format!("Alert update: {sensor}"),
        ),
    };

    let toast = Toast {
        alert_id: event.alert_id.clone(),
        kind,
        title,
        body: format!("{sensor} — {kind_of}"),
    };

    let wants_system = permission_granted && (!focused || !suppress_when_focused);
    let system = wants_system.then(|| SystemNote {
        tag: event.alert_id.clone(),
        title: note_title,
        body: kind_of.to_string(),
    });

    NotificationPlan { toast, system }
}

// ── Dispatcher ───────────────────────────────────────────────────────

/// Stateful dispatcher: queues toasts for the presentation surface and
/// pushes system notes through the capability boundary.
pub struct Dispatcher {
    focus: Box<dyn FocusProbe>,
    system: Box<dyn SystemNotifier>,
    suppress_when_focused: bool,
    toasts: VecDeque<Toast>,
}

impl Dispatcher {
    pub fn new(focus: Box<dyn FocusProbe>, system: Box<dyn SystemNotifier>) -> Self {
        Self {
            focus,
            system,
            suppress_when_focused: true,
            toasts: VecDeque::new(),
        }
    }

    /// Dispatcher with the default probes: focused surface, no system
    /// notification capability.
    pub fn headless() -> Self {
        Self::new(Box::new(AlwaysFocused), Box::new(NoSystemNotifier))
    }

    /// Disable focus suppression: system notes go out even while the
    /// surface is focused (still gated on permission).
    pub fn with_focus_suppression(mut self, suppress: bool) -> Self {
        self.suppress_when_focused = suppress;
        self
    }

    /// Produce at most one user-visible notification per event: the
    /// toast is enqueued unconditionally, the system note is delivered
    /// only when focus and permission allow.
    pub fn dispatch(&mut self, event: &AlertEvent) {
        let plan = plan(
            event,
            self.focus.has_focus(),
            self.system.permission_granted(),
            self.suppress_when_focused,
        );

        if let Some(ref note) = plan.system {
            self.system.deliver(note);
        }
        self.toasts.push_back(plan.toast);
    }

    /// Drain queued toasts, oldest first.
    pub fn drain_toasts(&mut self) -> Vec<Toast> {
        self.toasts.drain(..).collect()
    }

    /// Number of queued toasts.
    pub fn pending(&self) -> usize {
        self.toasts.len()
    }
}
