//! Refresh Orchestrator.
//!
//! One call to [`Refresher::refresh`] is one refresh cycle:
//!
//! 1. capture the cycle timestamp
//! 2. fetch countries and exchange rates concurrently
//! 3. derive every record ([`crate::merge`])
//! 4. upsert all records in one transaction
//! 5. hand post-commit statistics to the summary reporter
//!
//! A source failure ends the cycle before step 4 starts. A reporter failure
//! happens after commit and only downgrades the outcome to a warning.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::data_source::{CountrySource, ExchangeRateSource, RawCountry, SourceError};
use crate::estimator::GdpMultiplier;
use crate::merge::plan_refresh;
use crate::store::{CountryStore, StoreError};
use crate::summary::{RefreshSummary, ReportError, SummaryReporter, TOP_COUNTRIES};
use crate::{ExchangeRateTable, UtcDateTime};

/// Fatal outcomes of a refresh cycle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RefreshError {
    #[error("source unavailable: {0}")]
    SourceUnavailable(SourceError),

    #[error(transparent)]
    Storage(StoreError),
}

/// Result of a committed refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshReport {
    pub total_countries: u64,
    /// Timestamp stamped on every record of this cycle.
    pub last_refreshed_at: UtcDateTime,
    pub inserted: usize,
    pub updated: usize,
    pub skipped_entries: usize,
    /// Set when the data committed but the summary could not be rendered.
    #[serde(skip)]
    pub report_warning: Option<ReportError>,
}

impl RefreshReport {
    pub fn is_degraded(&self) -> bool {
        self.report_warning.is_some()
    }
}

pub struct Refresher {
    countries: Arc<dyn CountrySource>,
    rates: Arc<dyn ExchangeRateSource>,
    store: Arc<dyn CountryStore>,
    reporter: Arc<dyn SummaryReporter>,
    multiplier: GdpMultiplier,
}

impl Refresher {
    pub fn new(
        countries: Arc<dyn CountrySource>,
        rates: Arc<dyn ExchangeRateSource>,
        store: Arc<dyn CountryStore>,
        reporter: Arc<dyn SummaryReporter>,
        multiplier: GdpMultiplier,
    ) -> Self {
        Self {
            countries,
            rates,
            store,
            reporter,
            multiplier,
        }
    }

    pub fn store(&self) -> &Arc<dyn CountryStore> {
        &self.store
    }

    pub fn reporter(&self) -> &Arc<dyn SummaryReporter> {
        &self.reporter
    }

    pub async fn refresh(&self) -> Result<RefreshReport, RefreshError> {
        let started = Instant::now();
        let now = UtcDateTime::now_millis();
        info!(cycle = %now, "refresh started");

        let (countries, rates) = tokio::join!(
            self.countries.fetch_countries(),
            self.rates.fetch_exchange_rates()
        );
        let entries = countries.map_err(source_failure)?;
        let rates = rates.map_err(source_failure)?;

        let store = Arc::clone(&self.store);
        let reporter = Arc::clone(&self.reporter);
        let multiplier = self.multiplier;
        let report = tokio::task::spawn_blocking(move || {
            commit_cycle(
                store.as_ref(),
                reporter.as_ref(),
                multiplier,
                &entries,
                &rates,
                now,
            )
        })
        .await
        .map_err(|e| storage_failure(StoreError::Storage(format!("refresh task failed: {e}"))))??;

        info!(
            cycle = %now,
            total_countries = report.total_countries,
            inserted = report.inserted,
            updated = report.updated,
            skipped = report.skipped_entries,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "refresh committed"
        );
        Ok(report)
    }
}

/// Plan, upsert, read statistics and render. Runs on the blocking pool since
/// the store and the reporter both do synchronous I/O.
fn commit_cycle(
    store: &dyn CountryStore,
    reporter: &dyn SummaryReporter,
    multiplier: GdpMultiplier,
    entries: &[RawCountry],
    rates: &ExchangeRateTable,
    now: UtcDateTime,
) -> Result<RefreshReport, RefreshError> {
    let mut draw = multiplier.draw_for_cycle(now.unix_millis() as u64);
    let plan = plan_refresh(entries, rates, &mut draw, now);

    let counts = store.upsert_all(&plan.records).map_err(storage_failure)?;

    let status = store.status().map_err(storage_failure)?;
    let top_countries = store.top_by_gdp(TOP_COUNTRIES).map_err(storage_failure)?;

    let summary = RefreshSummary {
        total_countries: status.total_countries,
        top_countries,
        refreshed_at: now,
    };
    let report_warning = match reporter.render(&summary) {
        Ok(()) => None,
        Err(report_error) => {
            warn!(error = %report_error, "summary render failed after commit");
            Some(report_error)
        }
    };

    Ok(RefreshReport {
        total_countries: status.total_countries,
        last_refreshed_at: now,
        inserted: counts.inserted,
        updated: counts.updated,
        skipped_entries: plan.skipped_entries,
        report_warning,
    })
}

fn source_failure(source_error: SourceError) -> RefreshError {
    warn!(
        source = source_error.source_id().as_str(),
        code = source_error.code(),
        message = source_error.message(),
        "refresh aborted before any write"
    );
    RefreshError::SourceUnavailable(source_error)
}

fn storage_failure(store_error: StoreError) -> RefreshError {
    error!(error = %store_error, "refresh storage failure");
    RefreshError::Storage(store_error)
}
