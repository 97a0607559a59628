// fabwatch-api: Async client for the plant gateway (REST snapshot + push alert channel)

pub mod channel;
pub mod error;
pub mod rest;
pub mod transport;
pub mod types;

pub use channel::{AlertChannel, AlertMessage, ChannelState, ReconnectPolicy};
pub use error::Error;
pub use rest::GatewayClient;
