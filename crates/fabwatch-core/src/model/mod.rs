// ── Domain model ──

mod alert;
mod filter;
mod module;
mod sensor;

pub use alert::{AlertEvent, AlertRecord, AlertStatus, format_timestamp};
pub use filter::{AlertFilter, FilterUpdate};
pub use module::{DigitalModule, ModuleSummary};
pub use sensor::{Sensor, ThresholdDraft};
