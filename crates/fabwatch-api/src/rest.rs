// Gateway REST HTTP client
//
// Wraps `reqwest::Client` with gateway-specific URL construction and
// response handling. The three endpoints this console needs -- sensor
// catalog, threshold persistence, filtered alert store -- are inherent
// methods; transport mechanics stay in this module.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::{AlertQuery, AlertRecord, SensorRecord, ThresholdUpdate};

/// HTTP client for the plant gateway's REST surface.
///
/// Non-success responses are surfaced as [`Error::Api`] carrying the
/// error body text, so callers can show the gateway's own message.
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GatewayClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the gateway root (e.g. `http://gateway:5167`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The gateway base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build a full URL for a gateway API path: `{base}/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Url {
        let base = self.base_url.as_str().trim_end_matches('/');
        let full = format!("{base}/api/{path}");
        Url::parse(&full).expect("invalid gateway API URL")
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Fetch the full sensor catalog.
    pub async fn list_sensors(&self) -> Result<Vec<SensorRecord>, Error> {
        let url = self.api_url("Sensor");
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        parse_body(resp).await
    }

    /// Persist new thresholds for a single sensor.
    ///
    /// The gateway returns an empty success body; on rejection the error
    /// body text is propagated verbatim.
    pub async fn update_thresholds(&self, update: &ThresholdUpdate) -> Result<(), Error> {
        let url = self.api_url("Sensor/thresholds");
        debug!(sensor_id = %update.sensor_id, "PUT {}", url);

        let resp = self
            .http
            .put(url)
            .json(update)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let message = resp
            .text()
            .await
            .unwrap_or_else(|_| format!("HTTP {status}"));
        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Fetch historical alerts matching the query.
    ///
    /// Unset criteria are omitted from the query string entirely so the
    /// gateway's match-all default applies.
    pub async fn filter_alerts(&self, query: &AlertQuery) -> Result<Vec<AlertRecord>, Error> {
        let url = self.api_url("Alert/filter");
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(Error::Transport)?;
        parse_body(resp).await
    }
}

/// Check the response status and deserialize the JSON body, keeping the
/// raw body text around for diagnostics when parsing fails.
async fn parse_body<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await.map_err(Error::Transport)?;

    if !status.is_success() {
        return Err(Error::Api {
            status: status.as_u16(),
            message: body,
        });
    }

    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body,
    })
}
