//! Behavior-driven tests for the refresh cycle
//!
//! These tests drive a full refresh (fetch, derive, upsert, report) against
//! canned upstream responses and a real warehouse, and check what a caller
//! can observe afterwards.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use countrycache_core::{
    CountryQuery, CountryStore, GdpMultiplier, HttpError, HttpResponse, OpenErApiAdapter,
    RefreshError, RefreshSummary, Refresher, ReportError, RestCountriesAdapter, SourceId,
    StaticHttpClient, SummaryArtifact, SummaryReporter, SvgSummaryReporter, Warehouse,
    WarehouseConfig,
};
use tempfile::{tempdir, TempDir};

const COUNTRIES_URL: &str = "https://countries.test/v2/all";
const RATES_URL: &str = "https://rates.test/v6/latest/USD";
const MULTIPLIER: f64 = 1500.0;

struct Harness {
    _temp: TempDir,
    http: StaticHttpClient,
    warehouse: Arc<Warehouse>,
    reporter: Arc<RecordingReporter>,
    refresher: Refresher,
}

impl Harness {
    fn new() -> Self {
        Self::with_reporter(RecordingReporter::default())
    }

    fn with_reporter(reporter: RecordingReporter) -> Self {
        let temp = tempdir().expect("tempdir");
        let http = StaticHttpClient::new();
        let warehouse = Arc::new(
            Warehouse::open(WarehouseConfig {
                db_path: temp.path().join("countries.duckdb"),
                max_pool_size: 2,
            })
            .expect("warehouse open"),
        );
        let reporter = Arc::new(reporter);
        let refresher = Refresher::new(
            Arc::new(RestCountriesAdapter::new(
                Arc::new(http.clone()),
                COUNTRIES_URL,
                1_000,
            )),
            Arc::new(OpenErApiAdapter::new(Arc::new(http.clone()), RATES_URL, 1_000)),
            warehouse.clone(),
            reporter.clone(),
            GdpMultiplier::Fixed(MULTIPLIER),
        );

        Self {
            _temp: temp,
            http,
            warehouse,
            reporter,
            refresher,
        }
    }

    fn serve(&self, countries: &str, rates: &str) {
        self.http
            .set_route(COUNTRIES_URL, Ok(HttpResponse::ok_json(countries)));
        self.http.set_route(RATES_URL, Ok(HttpResponse::ok_json(rates)));
    }

    fn store(&self) -> &dyn CountryStore {
        self.warehouse.as_ref()
    }
}

/// Reporter that keeps every summary it is handed, optionally failing.
#[derive(Default)]
struct RecordingReporter {
    fail: bool,
    summaries: Mutex<Vec<RefreshSummary>>,
}

impl RecordingReporter {
    fn failing() -> Self {
        Self {
            fail: true,
            summaries: Mutex::new(Vec::new()),
        }
    }

    fn last(&self) -> Option<RefreshSummary> {
        self.summaries.lock().expect("lock").last().cloned()
    }
}

impl SummaryReporter for RecordingReporter {
    fn render(&self, summary: &RefreshSummary) -> Result<(), ReportError> {
        self.summaries.lock().expect("lock").push(summary.clone());
        if self.fail {
            return Err(ReportError("disk full".to_string()));
        }
        Ok(())
    }

    fn artifact(&self) -> Result<Option<SummaryArtifact>, ReportError> {
        Ok(None)
    }
}

const MIXED_COUNTRIES: &str = r#"[
    {"name":"Nigeria","capital":"Abuja","region":"Africa","population":206139589,
     "flag":"https://flagcdn.com/ng.svg","currencies":[{"code":"NGN"}]},
    {"name":"Foo","population":1000,"currencies":[]},
    {"name":"Bar","population":500,"currencies":[{"code":"XYZ"}]}
]"#;
const MIXED_RATES: &str = r#"{"result":"success","rates":{"USD":1,"NGN":1600}}"#;

// =============================================================================
// Refresh: GDP derivation
// =============================================================================

#[tokio::test]
async fn when_a_country_has_no_currency_its_gdp_is_zero_not_null() {
    // Given: A country with an empty currency list and an empty rate table
    let harness = Harness::new();
    harness.serve(
        r#"[{"name":"Foo","population":1000,"currencies":[]}]"#,
        r#"{"rates":{}}"#,
    );

    // When: A refresh runs
    harness.refresher.refresh().await.expect("refresh");

    // Then: The stored record has no currency, no rate, and GDP 0
    let foo = harness.store().get("Foo").expect("stored");
    assert_eq!(foo.currency_code, None);
    assert_eq!(foo.exchange_rate, None);
    assert_eq!(foo.estimated_gdp, Some(0.0));
}

#[tokio::test]
async fn when_a_currency_has_no_rate_its_gdp_is_null_not_zero() {
    // Given: A currency code missing from the rate table
    let harness = Harness::new();
    harness.serve(MIXED_COUNTRIES, MIXED_RATES);

    // When: A refresh runs
    harness.refresher.refresh().await.expect("refresh");

    // Then: The code is kept but rate and GDP are unknown
    let bar = harness.store().get("Bar").expect("stored");
    assert_eq!(bar.currency_code.as_deref(), Some("XYZ"));
    assert_eq!(bar.exchange_rate, None);
    assert_eq!(bar.estimated_gdp, None);
}

#[tokio::test]
async fn when_a_rate_is_known_gdp_is_exactly_population_times_multiplier_over_rate() {
    // Given: A fixed multiplier and a known rate
    let harness = Harness::new();
    harness.serve(MIXED_COUNTRIES, MIXED_RATES);

    // When: A refresh runs
    harness.refresher.refresh().await.expect("refresh");

    // Then: The estimate is exactly reproducible
    let nigeria = harness.store().get("nigeria").expect("stored");
    assert_eq!(nigeria.exchange_rate, Some(1600.0));
    assert_eq!(
        nigeria.estimated_gdp,
        Some(206_139_589.0 * MULTIPLIER / 1600.0)
    );
    assert_eq!(nigeria.capital.as_deref(), Some("Abuja"));
    assert_eq!(nigeria.flag_url.as_deref(), Some("https://flagcdn.com/ng.svg"));
}

// =============================================================================
// Refresh: Upsert semantics
// =============================================================================

#[tokio::test]
async fn when_refreshed_twice_with_same_data_only_the_timestamp_advances() {
    // Given: One completed refresh
    let harness = Harness::new();
    harness.serve(MIXED_COUNTRIES, MIXED_RATES);
    let first = harness.refresher.refresh().await.expect("first refresh");
    let before = harness.store().list(&CountryQuery::default()).expect("list");

    // When: The same data is refreshed again
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = harness.refresher.refresh().await.expect("second refresh");
    let after = harness.store().list(&CountryQuery::default()).expect("list");

    // Then: Record count and fields are unchanged, timestamps moved forward
    assert_eq!(first.total_countries, 3);
    assert_eq!(second.total_countries, 3);
    assert_eq!((second.inserted, second.updated), (0, 3));
    assert!(second.last_refreshed_at > first.last_refreshed_at);

    assert_eq!(before.len(), after.len());
    for (old, new) in before.iter().zip(after.iter()) {
        assert_eq!(old.id, new.id);
        assert_eq!(old.name, new.name);
        assert_eq!(old.population, new.population);
        assert_eq!(old.currency_code, new.currency_code);
        assert_eq!(old.exchange_rate, new.exchange_rate);
        assert_eq!(old.estimated_gdp, new.estimated_gdp);
        assert!(new.last_refreshed_at > old.last_refreshed_at);
    }
}

#[tokio::test]
async fn when_a_name_reappears_with_different_casing_the_record_is_updated_in_place() {
    // Given: "India" stored by an earlier refresh
    let harness = Harness::new();
    harness.serve(
        r#"[{"name":"India","population":100,"currencies":[{"code":"INR"}]}]"#,
        r#"{"rates":{"INR":80}}"#,
    );
    harness.refresher.refresh().await.expect("first refresh");
    let original = harness.store().get("India").expect("stored");

    // When: The source now spells it "INDIA" with a new population
    harness.serve(
        r#"[{"name":"INDIA","population":200,"currencies":[{"code":"INR"}]}]"#,
        r#"{"rates":{"INR":80}}"#,
    );
    let report = harness.refresher.refresh().await.expect("second refresh");

    // Then: There is still one record, with the same id and the new casing
    assert_eq!(report.total_countries, 1);
    let updated = harness.store().get("india").expect("stored");
    assert_eq!(updated.id, original.id);
    assert_eq!(updated.name.as_str(), "INDIA");
    assert_eq!(updated.population, 200);
}

#[tokio::test]
async fn every_record_of_a_cycle_shares_the_cycle_timestamp() {
    // Given: Several countries
    let harness = Harness::new();
    harness.serve(MIXED_COUNTRIES, MIXED_RATES);

    // When: A refresh runs
    let report = harness.refresher.refresh().await.expect("refresh");

    // Then: Every record carries exactly the reported timestamp
    let records = harness.store().list(&CountryQuery::default()).expect("list");
    assert!(records
        .iter()
        .all(|record| record.last_refreshed_at == report.last_refreshed_at));
    let status = harness.store().status().expect("status");
    assert_eq!(status.last_refreshed_at, Some(report.last_refreshed_at));
}

#[tokio::test]
async fn when_a_country_disappears_from_the_source_it_is_kept() {
    // Given: Three stored countries
    let harness = Harness::new();
    harness.serve(MIXED_COUNTRIES, MIXED_RATES);
    harness.refresher.refresh().await.expect("first refresh");

    // When: The next fetch only returns one of them
    harness.serve(r#"[{"name":"Foo","population":1000}]"#, MIXED_RATES);
    let report = harness.refresher.refresh().await.expect("second refresh");

    // Then: Nothing was deleted
    assert_eq!(report.total_countries, 3);
    assert!(harness.store().get("Nigeria").is_ok());
}

#[tokio::test]
async fn entries_without_a_name_are_skipped_and_counted() {
    // Given: A payload with a nameless and a blank-named entry
    let harness = Harness::new();
    harness.serve(
        r#"[{"population":1},{"name":"   ","population":2},{"name":"Foo","population":3}]"#,
        r#"{"rates":{}}"#,
    );

    // When: A refresh runs
    let report = harness.refresher.refresh().await.expect("refresh");

    // Then: Only the named entry is stored
    assert_eq!(report.skipped_entries, 2);
    assert_eq!(report.total_countries, 1);
}

// =============================================================================
// Refresh: Failure handling
// =============================================================================

#[tokio::test]
async fn when_exchange_rates_time_out_nothing_is_written() {
    // Given: A stored country and an exchange source that times out
    let harness = Harness::new();
    harness.serve(MIXED_COUNTRIES, MIXED_RATES);
    harness.refresher.refresh().await.expect("seed refresh");
    let before = harness.store().get("Foo").expect("stored");

    harness.serve(
        r#"[{"name":"Foo","population":9999},{"name":"Newland","population":1}]"#,
        MIXED_RATES,
    );
    harness
        .http
        .set_route(RATES_URL, Err(HttpError::timeout("deadline elapsed")));

    // When: A refresh runs
    let error = harness.refresher.refresh().await.expect_err("must fail");

    // Then: The failure names the exchange source and the store is untouched
    match error {
        RefreshError::SourceUnavailable(source) => {
            assert_eq!(source.source_id(), SourceId::Exchange);
            assert_eq!(source.details(), "Could not fetch data from Exchange API");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(harness.store().get("Foo").expect("stored"), before);
    assert!(harness.store().get("Newland").is_err());
    assert_eq!(harness.store().count().expect("count"), 3);
}

#[tokio::test]
async fn when_both_sources_fail_the_countries_source_is_reported() {
    // Given: Neither source has a route (both answer 404)
    let harness = Harness::new();

    // When: A refresh runs
    let error = harness.refresher.refresh().await.expect_err("must fail");

    // Then: The countries source is named
    assert!(matches!(
        error,
        RefreshError::SourceUnavailable(ref source) if source.source_id() == SourceId::Countries
    ));
}

#[tokio::test]
async fn when_storage_fails_mid_batch_no_record_of_the_cycle_is_visible() {
    // Given: A batch whose last entry cannot be stored
    let harness = Harness::new();
    harness.serve(
        r#"[
            {"name":"Alpha","population":10},
            {"name":"Beta","population":20},
            {"name":"Gamma","population":18446744073709551615}
        ]"#,
        r#"{"rates":{}}"#,
    );

    // When: A refresh runs
    let error = harness.refresher.refresh().await.expect_err("must fail");

    // Then: It is a storage failure and the earlier rows were rolled back
    assert!(matches!(error, RefreshError::Storage(_)));
    assert_eq!(harness.store().count().expect("count"), 0);
    assert!(harness.store().get("Alpha").is_err());
    assert!(harness.reporter.last().is_none());
}

#[tokio::test]
async fn when_the_summary_fails_the_data_still_commits() {
    // Given: A reporter that always fails
    let harness = Harness::with_reporter(RecordingReporter::failing());
    harness.serve(MIXED_COUNTRIES, MIXED_RATES);

    // When: A refresh runs
    let report = harness.refresher.refresh().await.expect("degraded success");

    // Then: The outcome is degraded but every record is stored
    assert!(report.is_degraded());
    assert_eq!(report.total_countries, 3);
    assert_eq!(harness.store().count().expect("count"), 3);
}

// =============================================================================
// Refresh: Summary
// =============================================================================

#[tokio::test]
async fn top_five_summary_excludes_countries_without_an_estimate() {
    // Given: Three countries with unknown rates and two with known rates
    let harness = Harness::new();
    harness.serve(
        r#"[
            {"name":"N1","population":10,"currencies":[{"code":"AAA"}]},
            {"name":"N2","population":10,"currencies":[{"code":"BBB"}]},
            {"name":"N3","population":10,"currencies":[{"code":"CCC"}]},
            {"name":"Small","population":10,"currencies":[{"code":"EUR"}]},
            {"name":"Large","population":1000,"currencies":[{"code":"EUR"}]}
        ]"#,
        r#"{"rates":{"EUR":2}}"#,
    );

    // When: A refresh runs
    harness.refresher.refresh().await.expect("refresh");

    // Then: The summary ranks exactly the two estimated countries
    let summary = harness.reporter.last().expect("summary rendered");
    assert_eq!(summary.total_countries, 5);
    let names: Vec<&str> = summary
        .top_countries
        .iter()
        .map(|country| country.name.as_str())
        .collect();
    assert_eq!(names, ["Large", "Small"]);
    assert!(summary
        .top_countries
        .iter()
        .all(|country| country.estimated_gdp.is_some()));
}

#[tokio::test]
async fn svg_summary_is_available_after_a_refresh() {
    // Given: A refresher wired to the SVG reporter
    let temp = tempdir().expect("tempdir");
    let http = StaticHttpClient::new()
        .route(COUNTRIES_URL, Ok(HttpResponse::ok_json(MIXED_COUNTRIES)))
        .route(RATES_URL, Ok(HttpResponse::ok_json(MIXED_RATES)));
    let reporter = Arc::new(SvgSummaryReporter::new(temp.path().join("summary.svg")));
    let refresher = Refresher::new(
        Arc::new(RestCountriesAdapter::new(Arc::new(http.clone()), COUNTRIES_URL, 1_000)),
        Arc::new(OpenErApiAdapter::new(Arc::new(http), RATES_URL, 1_000)),
        Arc::new(Warehouse::open_in_memory().expect("warehouse")),
        reporter.clone(),
        GdpMultiplier::Fixed(MULTIPLIER),
    );

    // When: A refresh runs
    refresher.refresh().await.expect("refresh");

    // Then: The artifact lists the total and the ranked country
    let artifact = reporter.artifact().expect("read").expect("artifact");
    let svg = String::from_utf8(artifact.bytes).expect("utf8");
    assert!(svg.contains("Total countries: 3"));
    assert!(svg.contains("1. Nigeria"));
    assert!(!svg.contains("Bar ("));
}
