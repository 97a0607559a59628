// fabwatch-core: Alert state synchronization layer between fabwatch-api
// and consumers (CLI/presentation).

pub mod console;
pub mod convert;
pub mod error;
pub mod feed;
pub mod log_query;
pub mod model;
pub mod notify;
pub mod thresholds;

// ── Primary re-exports ──────────────────────────────────────────────
pub use console::{Console, ConsoleConfig};
pub use error::CoreError;
pub use feed::{AlertFeed, DEFAULT_HISTORY_CAPACITY, FeedAction};
pub use log_query::{AlertLog, DEFAULT_LOG_PAGE_SIZE};
pub use notify::{
    Dispatcher, FocusProbe, NotificationPlan, SystemNote, SystemNotifier, Toast, ToastKind,
};
pub use thresholds::{DEFAULT_SENSOR_PAGE_SIZE, ThresholdEditor, ThresholdField};

// The connection state of the push channel is part of the public
// surface consumers render.
pub use fabwatch_api::ChannelState;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AlertEvent, AlertFilter, AlertRecord, AlertStatus, DigitalModule, FilterUpdate, ModuleSummary,
    Sensor, ThresholdDraft, format_timestamp,
};
