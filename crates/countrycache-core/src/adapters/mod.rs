//! HTTP adapters for the two upstream sources.

mod open_er_api;
mod rest_countries;

pub use open_er_api::OpenErApiAdapter;
pub use rest_countries::RestCountriesAdapter;

use std::time::Instant;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::http_client::{HttpClient, HttpRequest};
use crate::{SourceError, SourceId};

/// Issue one GET against `url` and decode the JSON body.
///
/// Transport errors, timeouts, non-2xx statuses and undecodable bodies are
/// all reported as a [`SourceError`] tagged with `source`.
async fn fetch_json<T: DeserializeOwned>(
    http_client: &dyn HttpClient,
    source: SourceId,
    url: &str,
    timeout_ms: u64,
) -> Result<T, SourceError> {
    let started = Instant::now();
    let request = HttpRequest::get(url)
        .with_header("accept", "application/json")
        .with_timeout_ms(timeout_ms);

    let response = http_client.execute(request).await.map_err(|e| {
        if e.timed_out() {
            SourceError::timed_out(source, format!("timed out after {timeout_ms}ms: {}", e.message()))
        } else {
            SourceError::unavailable(source, format!("transport error: {}", e.message()))
        }
    })?;

    debug!(
        source = source.as_str(),
        url,
        status = response.status,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "upstream response"
    );

    if !response.is_success() {
        return Err(SourceError::unavailable(
            source,
            format!("returned status {}", response.status),
        ));
    }

    serde_json::from_str(&response.body)
        .map_err(|e| SourceError::malformed(source, format!("failed to parse response: {e}")))
}
