use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::data_source::{CountrySource, RawCountry, SourceError};
use crate::http_client::HttpClient;
use crate::SourceId;

/// Client for the REST Countries v2 `all` endpoint.
#[derive(Clone)]
pub struct RestCountriesAdapter {
    http_client: Arc<dyn HttpClient>,
    url: String,
    timeout_ms: u64,
}

impl RestCountriesAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, url: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            http_client,
            url: url.into(),
            timeout_ms,
        }
    }
}

impl CountrySource for RestCountriesAdapter {
    fn fetch_countries<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RawCountry>, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            super::fetch_json(
                self.http_client.as_ref(),
                SourceId::Countries,
                &self.url,
                self.timeout_ms,
            )
            .await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::{HttpResponse, StaticHttpClient};

    const URL: &str = "https://countries.test/all";

    fn adapter(client: StaticHttpClient) -> RestCountriesAdapter {
        RestCountriesAdapter::new(Arc::new(client), URL, 1_000)
    }

    #[tokio::test]
    async fn decodes_country_entries() {
        let body = r#"[
            {"name":"Nigeria","capital":"Abuja","region":"Africa","population":206139589,
             "flag":"https://flagcdn.com/ng.svg","currencies":[{"code":"NGN","name":"Naira","symbol":"₦"}],
             "independent":false}
        ]"#;
        let client = StaticHttpClient::new().route(URL, Ok(HttpResponse::ok_json(body)));

        let countries = adapter(client).fetch_countries().await.expect("countries");
        assert_eq!(countries.len(), 1);
        assert_eq!(countries[0].name.as_deref(), Some("Nigeria"));
        assert_eq!(countries[0].population(), 206_139_589);
        assert_eq!(countries[0].first_currency_code(), Some("NGN"));
    }

    #[tokio::test]
    async fn non_success_status_is_reported_as_countries_unavailable() {
        let client = StaticHttpClient::new().route(URL, Ok(HttpResponse::with_status(502, "")));

        let error = adapter(client).fetch_countries().await.expect_err("502");
        assert_eq!(error.source_id(), SourceId::Countries);
        assert_eq!(error.kind(), SourceErrorKind::Unavailable);
    }

    #[tokio::test]
    async fn undecodable_body_is_reported_as_malformed() {
        let client = StaticHttpClient::new().route(URL, Ok(HttpResponse::ok_json("{\"oops\":1}")));

        let error = adapter(client).fetch_countries().await.expect_err("not an array");
        assert_eq!(error.kind(), SourceErrorKind::Malformed);
        assert_eq!(error.source_id(), SourceId::Countries);
    }
}
