//! Behavior-driven tests for the upstream source clients
//!
//! These tests verify how the countries and exchange-rate clients turn
//! upstream responses and transport failures into data or tagged errors.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use countrycache_core::{
    CountrySource, ExchangeRateSource, HttpClient, HttpError, HttpRequest, HttpResponse,
    OpenErApiAdapter, RestCountriesAdapter, SourceErrorKind, SourceId, StaticHttpClient,
};

const COUNTRIES_URL: &str = "https://countries.test/v2/all";
const RATES_URL: &str = "https://rates.test/v6/latest/USD";

/// Transport that records every request it receives.
#[derive(Default)]
struct RecordingHttpClient {
    requests: Mutex<Vec<HttpRequest>>,
}

impl HttpClient for RecordingHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests.lock().expect("lock").push(request);
        Box::pin(async { Ok(HttpResponse::ok_json(r#"{"rates":{}}"#)) })
    }
}

// =============================================================================
// Sources: Requests
// =============================================================================

#[tokio::test]
async fn each_fetch_is_a_single_bounded_json_request() {
    // Given: A client with a 750ms timeout
    let http = Arc::new(RecordingHttpClient::default());
    let adapter = OpenErApiAdapter::new(http.clone(), RATES_URL, 750);

    // When: Rates are fetched
    adapter.fetch_exchange_rates().await.expect("rates");

    // Then: Exactly one request was made with the timeout and accept header
    let requests = http.requests.lock().expect("lock");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, RATES_URL);
    assert_eq!(requests[0].timeout_ms, 750);
    assert_eq!(
        requests[0].headers.get("accept").map(String::as_str),
        Some("application/json")
    );
}

// =============================================================================
// Sources: Failures are tagged with the failing source
// =============================================================================

#[tokio::test]
async fn countries_failures_are_tagged_as_countries_api() {
    // Given: A countries endpoint answering 500
    let http = StaticHttpClient::new().route(
        COUNTRIES_URL,
        Ok(HttpResponse::with_status(500, "upstream down")),
    );
    let adapter = RestCountriesAdapter::new(Arc::new(http), COUNTRIES_URL, 1_000);

    // When: Countries are fetched
    let error = adapter.fetch_countries().await.expect_err("must fail");

    // Then: The error names the countries source
    assert_eq!(error.source_id(), SourceId::Countries);
    assert_eq!(error.kind(), SourceErrorKind::Unavailable);
    assert_eq!(error.details(), "Could not fetch data from Countries API");
}

#[tokio::test]
async fn exchange_transport_errors_are_tagged_as_exchange_api() {
    // Given: A connection failure on the exchange endpoint
    let http = StaticHttpClient::new().route(
        RATES_URL,
        Err(HttpError::new("connection refused")),
    );
    let adapter = OpenErApiAdapter::new(Arc::new(http), RATES_URL, 1_000);

    // When: Rates are fetched
    let error = adapter.fetch_exchange_rates().await.expect_err("must fail");

    // Then: The error names the exchange source
    assert_eq!(error.source_id(), SourceId::Exchange);
    assert_eq!(error.kind(), SourceErrorKind::Unavailable);
    assert!(error.message().contains("connection refused"));
}

#[tokio::test]
async fn exchange_bodies_that_are_not_json_are_malformed() {
    // Given: An HTML error page with a 200 status
    let http = StaticHttpClient::new().route(
        RATES_URL,
        Ok(HttpResponse::ok_json("<html>maintenance</html>")),
    );
    let adapter = OpenErApiAdapter::new(Arc::new(http), RATES_URL, 1_000);

    // When: Rates are fetched
    let error = adapter.fetch_exchange_rates().await.expect_err("must fail");

    // Then: It is a malformed response from the exchange source
    assert_eq!(error.kind(), SourceErrorKind::Malformed);
    assert_eq!(error.source_id(), SourceId::Exchange);
}

// =============================================================================
// Sources: Payload handling
// =============================================================================

#[tokio::test]
async fn unusable_rates_are_dropped_from_the_table() {
    // Given: A rate table with zero, negative, null and non-numeric rates
    let http = StaticHttpClient::new().route(
        RATES_URL,
        Ok(HttpResponse::ok_json(
            r#"{"rates":{"USD":1,"EUR":0.92,"ZER":0,"NEG":-4,"NUL":null,"TXT":"1.5"}}"#,
        )),
    );
    let adapter = OpenErApiAdapter::new(Arc::new(http), RATES_URL, 1_000);

    // When: Rates are fetched
    let table = adapter.fetch_exchange_rates().await.expect("rates");

    // Then: Only positive rates remain
    assert_eq!(table.len(), 2);
    assert_eq!(table.rate("EUR"), Some(0.92));
    assert_eq!(table.rate("ZER"), None);
    assert_eq!(table.rate("NEG"), None);
    assert_eq!(table.rate("NUL"), None);
    assert_eq!(table.rate("TXT"), None);
}

#[tokio::test]
async fn country_entries_tolerate_missing_and_null_fields() {
    // Given: Sparse country entries
    let http = StaticHttpClient::new().route(
        COUNTRIES_URL,
        Ok(HttpResponse::ok_json(
            r#"[
                {"name":"Antarctica","region":"Polar","population":1000},
                {"name":"Nowhere","capital":null,"population":null,"currencies":null},
                {"name":"Multi","currencies":[{"code":"CHF"},{"code":"EUR"}],"population":5}
            ]"#,
        )),
    );
    let adapter = RestCountriesAdapter::new(Arc::new(http), COUNTRIES_URL, 1_000);

    // When: Countries are fetched
    let countries = adapter.fetch_countries().await.expect("countries");

    // Then: Missing values default and only the first currency counts
    assert_eq!(countries.len(), 3);
    assert_eq!(countries[0].first_currency_code(), None);
    assert_eq!(countries[1].population(), 0);
    assert_eq!(countries[1].capital, None);
    assert_eq!(countries[2].first_currency_code(), Some("CHF"));
}
