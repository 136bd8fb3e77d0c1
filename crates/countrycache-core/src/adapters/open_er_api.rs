use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::data_source::{ExchangeRateSource, SourceError};
use crate::http_client::HttpClient;
use crate::{ExchangeRateTable, SourceId};

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    #[serde(default)]
    rates: BTreeMap<String, Value>,
}

/// Client for the open.er-api.com `latest` endpoint.
#[derive(Clone)]
pub struct OpenErApiAdapter {
    http_client: Arc<dyn HttpClient>,
    url: String,
    timeout_ms: u64,
}

impl OpenErApiAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, url: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            http_client,
            url: url.into(),
            timeout_ms,
        }
    }
}

impl ExchangeRateSource for OpenErApiAdapter {
    fn fetch_exchange_rates<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<ExchangeRateTable, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let response: LatestRatesResponse = super::fetch_json(
                self.http_client.as_ref(),
                SourceId::Exchange,
                &self.url,
                self.timeout_ms,
            )
            .await?;

            // Non-numeric values become NaN so they are rejected with the rest.
            let rates = response
                .rates
                .into_iter()
                .map(|(code, value)| (code, value.as_f64().unwrap_or(f64::NAN)));
            let (table, rejected) = ExchangeRateTable::from_rates(rates);
            if !rejected.is_empty() {
                warn!(codes = ?rejected, "dropped unusable exchange rates");
            }
            Ok(table)
        })
    }
}
