//! World Bank indicators API integration.
//!
//! Responses are a two-element JSON array `[metadata, rows]`. A rejected
//! country/indicator pair still answers with HTTP 200 but a one-element array
//! carrying an error envelope instead, so status alone is not enough.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::{RawPoint, SeriesIdentity};
use crate::error::AppError;

/// Provider key signalling an unknown country or indicator.
const INVALID_VALUE_KEY: &str = "Invalid value";

/// Source of raw paged observations.
///
/// The pipeline only needs these two calls, so tests can substitute a fake
/// without standing up an HTTP server.
pub trait SeriesSource {
    /// Single connectivity check for `identity`.
    fn probe(&self, identity: &SeriesIdentity) -> Result<(), AppError>;

    /// All rows across all pages, in request order.
    fn fetch_all(&self, identity: &SeriesIdentity) -> Result<Vec<RawPoint>, AppError>;
}

pub struct WorldBankClient {
    client: Client,
    base_url: String,
}

impl WorldBankClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn series_url(&self, identity: &SeriesIdentity) -> String {
        format!(
            "{}/country/{}/indicator/{}",
            self.base_url,
            identity.country_code(),
            identity.indicator_code()
        )
    }

    fn get_page(&self, identity: &SeriesIdentity, page: u32) -> Result<reqwest::blocking::Response, AppError> {
        let url = self.series_url(identity);
        debug!(%url, page, "requesting page");
        let page = page.to_string();
        self.client
            .get(&url)
            .query(&[("format", "json"), ("page", page.as_str())])
            .send()
            .map_err(|e| AppError::unreachable(format!("Request to {url} failed: {e}")))
    }

    fn get_page_body(&self, identity: &SeriesIdentity, page: u32) -> Result<Value, AppError> {
        let resp = self.get_page(identity, page)?;
        if !resp.status().is_success() {
            return Err(AppError::unreachable(format!(
                "World Bank request for {identity} page {page} failed with status {}.",
                resp.status()
            )));
        }
        resp.json::<Value>()
            .map_err(|e| AppError::fetch(format!("Failed to parse World Bank response for {identity}: {e}")))
    }
}

impl SeriesSource for WorldBankClient {
    fn probe(&self, identity: &SeriesIdentity) -> Result<(), AppError> {
        let resp = self.get_page(identity, 1)?;
        if !resp.status().is_success() {
            warn!(%identity, status = %resp.status(), "probe failed");
            return Err(AppError::unreachable(format!(
                "World Bank endpoint for {identity} answered with status {}.",
                resp.status()
            )));
        }

        // Anything that is not the error envelope counts as reachable, including
        // bodies we cannot parse; the fetch stage reports those precisely.
        let body: Option<Value> = resp.json().ok();
        if let Some(reason) = body.as_ref().and_then(invalid_value_message) {
            warn!(%identity, %reason, "provider rejected identity");
            return Err(AppError::unreachable(format!(
                "World Bank rejected {identity}: {reason}"
            )));
        }

        info!(%identity, "probe ok");
        Ok(())
    }

    fn fetch_all(&self, identity: &SeriesIdentity) -> Result<Vec<RawPoint>, AppError> {
        let first = self.get_page_body(identity, 1)?;
        let pages = parse_page_count(&first)?;
        info!(%identity, pages, "fetching pages");

        let mut rows = Vec::new();
        for page in 1..=pages {
            // Page 1 is requested again so every page goes through the same path.
            let body = self.get_page_body(identity, page)?;
            let page_rows = parse_rows(&body)?;
            debug!(page, rows = page_rows.len(), "page received");
            rows.extend(page_rows);
        }

        info!(%identity, rows = rows.len(), "fetch complete");
        Ok(rows)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    key: Option<String>,
    value: Option<String>,
}

/// Return the provider's message when the body is the "Invalid value" envelope.
fn invalid_value_message(body: &Value) -> Option<String> {
    let message = body.get(0)?.get("message")?;
    let messages: Vec<ErrorMessage> = serde_json::from_value(message.clone()).ok()?;
    let first = messages.into_iter().next()?;
    if first.key.as_deref() == Some(INVALID_VALUE_KEY) {
        Some(first.value.unwrap_or_else(|| INVALID_VALUE_KEY.to_string()))
    } else {
        None
    }
}

/// Read `pages` from the metadata object (the provider sends it as a number or numeric string).
pub(crate) fn parse_page_count(body: &Value) -> Result<u32, AppError> {
    let meta = body
        .as_array()
        .and_then(|arr| arr.first())
        .ok_or_else(|| AppError::fetch("World Bank response is not a [metadata, rows] array."))?;

    let pages = meta
        .get("pages")
        .ok_or_else(|| AppError::fetch("World Bank metadata is missing 'pages'."))?;

    let parsed = match pages {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    parsed
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| AppError::fetch(format!("Invalid 'pages' value in World Bank metadata: {pages}")))
}

/// Rows of one page. A null/missing rows element means the page is empty.
pub(crate) fn parse_rows(body: &Value) -> Result<Vec<RawPoint>, AppError> {
    let arr = body
        .as_array()
        .ok_or_else(|| AppError::fetch("World Bank response is not a [metadata, rows] array."))?;

    match arr.get(1) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(rows) => serde_json::from_value(rows.clone())
            .map_err(|e| AppError::fetch(format!("Invalid World Bank rows: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn page_count_accepts_number_or_string() {
        assert_eq!(parse_page_count(&json!([{"pages": 2}, []])).unwrap(), 2);
        assert_eq!(parse_page_count(&json!([{"pages": "3"}, []])).unwrap(), 3);
        assert!(parse_page_count(&json!([{"page": 1}, []])).is_err());
        assert!(parse_page_count(&json!({"pages": 1})).is_err());
        assert!(parse_page_count(&json!([{"pages": -1}])).is_err());
    }

    #[test]
    fn rows_ignore_extra_fields_and_allow_null_values() {
        let body = json!([
            {"page": 1, "pages": 1},
            [
                {"indicator": {"id": "X"}, "date": "2020", "value": 1.5, "decimal": 0},
                {"indicator": {"id": "X"}, "date": "2019", "value": null, "decimal": 0}
            ]
        ]);
        let rows = parse_rows(&body).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].value, Some(1.5));
        assert_eq!(rows[1].value, None);
    }

    #[test]
    fn null_rows_element_is_an_empty_page() {
        let rows = parse_rows(&json!([{"pages": 0}, null])).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn invalid_value_envelope_is_detected() {
        let body = json!([{"message": [{"id": "120", "key": "Invalid value", "value": "The provided parameter value is not valid"}]}]);
        assert_eq!(
            invalid_value_message(&body).as_deref(),
            Some("The provided parameter value is not valid")
        );

        let other = json!([{"message": [{"id": "175", "key": "Invalid format"}]}]);
        assert!(invalid_value_message(&other).is_none());
        assert!(invalid_value_message(&json!([{"pages": 1}, []])).is_none());
    }
}
