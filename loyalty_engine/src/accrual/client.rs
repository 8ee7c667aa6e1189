use std::time::Duration;

use log::*;
use loyalty_common::{helpers::parse_seconds, Points};
use reqwest::{
    header::{HeaderMap, RETRY_AFTER},
    Client,
    StatusCode,
};
use serde::Deserialize;

use super::{AccrualGateway, GatewayError, Verdict};
use crate::db_types::{OrderNumber, OrderStatusType};

#[derive(Debug, Clone)]
pub struct AccrualConfig {
    /// Scheme, host and port of the accrual authority, e.g. `http://127.0.0.1:8081`.
    pub base_url: String,
    /// Upper bound on a single request, including reading the body.
    pub timeout: Duration,
    /// Back-off used when a 429 response has no usable `Retry-After` header.
    pub default_retry_after: Duration,
}

impl Default for AccrualConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8081".into(),
            timeout: Duration::from_secs(10),
            default_retry_after: Duration::from_secs(60),
        }
    }
}

/// The body of a `200 OK` response from `GET /api/orders/{number}`.
#[derive(Debug, Clone, Deserialize)]
struct AccrualResponse {
    order: String,
    status: String,
    #[serde(default)]
    accrual: Option<Points>,
}

#[derive(Debug, Clone)]
pub struct AccrualClient {
    config: AccrualConfig,
    client: Client,
}

impl AccrualClient {
    pub fn new(config: AccrualConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &AccrualConfig {
        &self.config
    }

    pub fn url(&self, order_number: &OrderNumber) -> String {
        format!("{}/api/orders/{}", self.config.base_url.trim_end_matches('/'), order_number.as_str())
    }

    fn retry_after(&self, headers: &HeaderMap) -> Duration {
        let value = headers.get(RETRY_AFTER).and_then(|v| v.to_str().ok());
        parse_retry_after(value).unwrap_or_else(|| {
            debug!("🧮️ No usable Retry-After header ({value:?}). Backing off for the default period");
            self.config.default_retry_after
        })
    }
}

impl AccrualGateway for AccrualClient {
    async fn fetch_verdict(&self, order_number: &OrderNumber) -> Result<Verdict, GatewayError> {
        let url = self.url(order_number);
        trace!("🧮️ Requesting verdict for order {order_number} from {url}");
        let response = self.client.get(&url).send().await.map_err(|e| transport_error(order_number, &e))?;
        let status = response.status();
        match status {
            StatusCode::OK => {
                let body = response.bytes().await.map_err(|e| transport_error(order_number, &e))?;
                let verdict = decode_verdict(order_number, &body)?;
                trace!("🧮️ Order {order_number}: {verdict:?}");
                Ok(verdict)
            },
            StatusCode::ACCEPTED | StatusCode::NO_CONTENT => {
                trace!("🧮️ Order {order_number} is not known to the accrual authority yet ({status})");
                Err(GatewayError::NotReady)
            },
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = self.retry_after(response.headers());
                warn!("🧮️ The accrual authority is rate limiting us. Backing off for {}s", retry_after.as_secs());
                Err(GatewayError::RateLimited { retry_after })
            },
            _ => {
                let message = response.text().await.unwrap_or_default();
                Err(GatewayError::Transient(format!("Unexpected response {status} for order {order_number}. {message}")))
            },
        }
    }
}

fn transport_error(order_number: &OrderNumber, e: &reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Transient(format!("Request for order {order_number} timed out"))
    } else {
        GatewayError::Transient(format!("Request for order {order_number} failed. {e}"))
    }
}

/// Decodes a `200 OK` body. Anything that does not parse, including a non-numeric accrual, is a transient failure
/// rather than a zero award.
fn decode_verdict(order_number: &OrderNumber, body: &[u8]) -> Result<Verdict, GatewayError> {
    let response: AccrualResponse = serde_json::from_slice(body)
        .map_err(|e| GatewayError::Transient(format!("Malformed verdict for order {order_number}. {e}")))?;
    if response.order != order_number.as_str() {
        return Err(GatewayError::Transient(format!(
            "Asked about order {order_number} but the verdict is for order #{}",
            response.order
        )));
    }
    let status = OrderStatusType::decode(&response.status);
    Ok(Verdict::new(status, response.accrual))
}

/// Parses the delay-seconds form of a `Retry-After` header. The HTTP-date form is not supported.
pub fn parse_retry_after(value: Option<&str>) -> Option<Duration> {
    value.and_then(|v| parse_seconds(v, true))
}
