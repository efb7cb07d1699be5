//! Provides the `EnvelopeClient` for building historical-envelope reports.
//!
//! This client acts as an intermediate builder, obtained via
//! [`MeteoClim::envelope()`]. It fans out one archive fetch per historical
//! year, folds every year onto the shared day-of-year axis, and returns the
//! percentile envelope together with the overlay, averaging buckets, and the
//! recent/forecast data the rolling window splices from.

use crate::aggregate::envelope::{build_statistics, fold_series, overlay_by_year};
use crate::openmeteo::api::DailySeries;
use crate::types::calendar::MonthDay;
use crate::types::metric::Metric;
use crate::types::reports::{AveragesReport, EnvelopeReport};
use crate::types::samples::SampleGroup;
use crate::{LatLon, MeteoClim, MeteoClimError};
use bon::bon;
use chrono::{Months, NaiveDate, Utc};
use futures_util::stream::{self, StreamExt};
use log::warn;
use std::collections::BTreeMap;

/// A client builder for the historical-envelope aggregation.
///
/// Instances are created by calling [`MeteoClim::envelope()`]. The metric is
/// required; location, year list, and reference date fall back to the
/// client's configuration.
///
/// Per-year fetch failures are never fatal: a year that cannot be fetched is
/// logged and skipped, and the report is built from the years that did
/// arrive. Recent-observation and forecast fetches degrade the same way, to
/// empty maps.
pub struct EnvelopeClient<'a> {
    client: &'a MeteoClim,
}

#[bon]
impl<'a> EnvelopeClient<'a> {
    pub(crate) fn new(client: &'a MeteoClim) -> Self {
        Self { client }
    }

    /// Builds the envelope report for one metric.
    ///
    /// Optional builder methods:
    /// *   `.location(LatLon)`: Site to aggregate; defaults to the configured one.
    /// *   `.years(Vec<i32>)`: Historical years; defaults to the configured span.
    /// *   `.today(NaiveDate)`: Reference date for the recent/forecast splice;
    ///     defaults to the current date.
    ///
    /// # Errors
    ///
    /// Returns [`MeteoClimError::MissingParameter`] when an explicit empty
    /// year list is supplied; this is checked before any fetch is issued.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use meteoclim::{MeteoClim, MeteoClimError, Metric};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), MeteoClimError> {
    /// let client = MeteoClim::new()?;
    /// let report = client
    ///     .envelope()
    ///     .fetch(Metric::GrowthPotential)
    ///     .years((2000..=2024).collect())
    ///     .call()
    ///     .await?;
    /// let window = report.window();
    /// println!("window starts in month {}", window.start_month);
    /// # Ok(())
    /// # }
    /// ```
    #[builder(start_fn = fetch)]
    #[doc(hidden)]
    pub async fn build_fetch(
        &self,
        #[builder(start_fn)] metric: Metric,
        location: Option<LatLon>,
        years: Option<Vec<i32>>,
        today: Option<NaiveDate>,
    ) -> Result<EnvelopeReport, MeteoClimError> {
        let config = &self.client.config;
        let location = location.unwrap_or(config.location);
        let years = years.unwrap_or_else(|| config.historical_years());
        let today = today.unwrap_or_else(|| Utc::now().date_naive());
        if years.is_empty() {
            return Err(MeteoClimError::MissingParameter("years"));
        }

        let fetcher = &self.client.fetcher;
        let fetch_set = [metric.archive_metric()];
        let mut fetched: Vec<(i32, DailySeries)> = stream::iter(years.iter().copied())
            .map(|year| {
                let fetch_set = fetch_set;
                async move {
                    let start = NaiveDate::from_ymd_opt(year, 1, 1).expect("valid date");
                    let end = NaiveDate::from_ymd_opt(year, 12, 31).expect("valid date");
                    let result = fetcher.archive_daily(location, start, end, &fetch_set).await;
                    (year, result)
                }
            })
            .buffer_unordered(config.fetch_concurrency)
            .filter_map(|(year, result)| async move {
                match result {
                    Ok(series) => Some((year, series)),
                    Err(e) => {
                        warn!("Skipping year {year}: {e}");
                        None
                    }
                }
            })
            .collect()
            .await;
        // Completion order is nondeterministic under concurrency; fold in
        // year order so equal inputs always group identically.
        fetched.sort_by_key(|(year, _)| *year);

        let mut group = SampleGroup::new();
        for (year, series) in &fetched {
            fold_series(&mut group, *year, series, metric);
        }
        let statistics = build_statistics(&group);
        let (overlay, overlay_years) = overlay_by_year(&group);
        let averages = AveragesReport::from_group(&group);

        let recent_start = today
            .checked_sub_months(Months::new(6))
            .unwrap_or(today);
        let recent = match fetcher
            .archive_daily(location, recent_start, today, &fetch_set)
            .await
        {
            Ok(series) => day_value_map(&series, metric),
            Err(e) => {
                warn!("Recent observations unavailable: {e}");
                BTreeMap::new()
            }
        };
        let forecast = match fetcher
            .forecast_daily(location, metric, config.forecast_days)
            .await
        {
            Ok(series) => day_value_map(&series, metric),
            Err(e) => {
                warn!("Forecast unavailable: {e}");
                BTreeMap::new()
            }
        };

        Ok(EnvelopeReport {
            metric,
            statistics,
            overlay,
            overlay_years,
            historical_years: years,
            averages,
            recent,
            forecast,
            today,
        })
    }
}

/// Keys a short daily series by day-of-year, resolving derived metrics and
/// dropping nulls. Callers only pass spans well under a year, so keys cannot
/// collide.
fn day_value_map(series: &DailySeries, metric: Metric) -> BTreeMap<MonthDay, f64> {
    series
        .dates()
        .iter()
        .enumerate()
        .filter_map(|(index, date)| {
            series
                .resolve(metric, index)
                .map(|value| (MonthDay::from_date(*date), value))
        })
        .collect()
}
