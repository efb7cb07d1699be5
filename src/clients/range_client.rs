//! Provides the `RangeClient` for stitched per-year date-range tables.
//!
//! This client acts as an intermediate builder, obtained via
//! [`MeteoClim::range()`]. It resolves a day-of-year range against each
//! requested year (splitting at the calendar boundary when the range wraps),
//! fetches the requested metrics, and emits one value table per year, with
//! optional accumulation series and per-day averages.

use crate::aggregate::accumulation::{start_index_for, AccumulationSeries};
use crate::aggregate::averages::year_set_means;
use crate::aggregate::envelope::fold_series;
use crate::openmeteo::api::DailySeries;
use crate::types::calendar::{DayOfYearRange, MonthDay};
use crate::types::metric::{archive_fetch_set, Metric};
use crate::types::reports::{AccumulationReport, RangeReport, YearTable};
use crate::types::samples::SampleGroup;
use crate::{LatLon, MeteoClim, MeteoClimError};
use bon::bon;
use chrono::NaiveDate;
use futures_util::stream::{self, StreamExt};
use log::warn;
use std::collections::BTreeMap;

/// A client builder for date-range aggregation across years.
///
/// Instances are created by calling [`MeteoClim::range()`]. A year whose
/// fetch fails in any sub-window is logged and skipped whole; partial tables
/// are never emitted.
pub struct RangeClient<'a> {
    client: &'a MeteoClim,
}

#[bon]
impl<'a> RangeClient<'a> {
    pub(crate) fn new(client: &'a MeteoClim) -> Self {
        Self { client }
    }

    /// Builds the range report.
    ///
    /// Required builder methods:
    /// *   `.metrics(Vec<Metric>)`: Metrics to tabulate, derived ones included.
    /// *   `.years(Vec<i32>)`: Years to fetch; for a wrapping range each year
    ///     denotes the start year of its span.
    ///
    /// Optional builder methods:
    /// *   `.location(LatLon)`: Site; defaults to the configured one.
    /// *   `.accumulate_from(MonthDay)`: Day the running totals start on.
    /// *   `.threshold(f64)`: Emits a crossing event at each multiple of this
    ///     cumulative amount.
    /// *   `.include_averages(bool)`: Adds per-day means over the requested
    ///     years; defaults to `false`.
    ///
    /// # Errors
    ///
    /// Returns [`MeteoClimError::MissingParameter`] for an empty metric or
    /// year list, before any fetch is issued.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use meteoclim::{DayOfYearRange, MeteoClim, MeteoClimError, Metric, MonthDay};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), MeteoClimError> {
    /// let client = MeteoClim::new()?;
    /// let autumn_to_winter = DayOfYearRange::new(
    ///     MonthDay::new(10, 1).unwrap(),
    ///     MonthDay::new(1, 31).unwrap(),
    /// );
    /// let report = client
    ///     .range()
    ///     .fetch(autumn_to_winter)
    ///     .metrics(vec![Metric::PrecipitationSum])
    ///     .years(vec![2022, 2023])
    ///     .accumulate_from(MonthDay::new(10, 1).unwrap())
    ///     .threshold(100.0)
    ///     .call()
    ///     .await?;
    /// for table in &report.tables {
    ///     println!("{}: {} days", table.label, table.dates.len());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    #[builder(start_fn = fetch)]
    #[doc(hidden)]
    pub async fn build_fetch(
        &self,
        #[builder(start_fn)] range: DayOfYearRange,
        metrics: Vec<Metric>,
        years: Vec<i32>,
        location: Option<LatLon>,
        accumulate_from: Option<MonthDay>,
        threshold: Option<f64>,
        include_averages: Option<bool>,
    ) -> Result<RangeReport, MeteoClimError> {
        if metrics.is_empty() {
            return Err(MeteoClimError::MissingParameter("metrics"));
        }
        if years.is_empty() {
            return Err(MeteoClimError::MissingParameter("years"));
        }

        let config = &self.client.config;
        let location = location.unwrap_or(config.location);
        let fetcher = &self.client.fetcher;
        let fetch_set = archive_fetch_set(&metrics);

        let mut fetched: Vec<(i32, DailySeries)> = stream::iter(years.iter().copied())
            .map(|year| {
                let fetch_set = &fetch_set;
                async move {
                    let mut stitched: Option<DailySeries> = None;
                    for (start, end) in range.fetch_windows(year) {
                        match fetcher.archive_daily(location, start, end, fetch_set).await {
                            Ok(series) => match stitched.as_mut() {
                                Some(combined) => combined.extend(series),
                                None => stitched = Some(series),
                            },
                            Err(e) => {
                                warn!("Skipping {}: {e}", range.year_label(year));
                                return (year, None);
                            }
                        }
                    }
                    (year, stitched)
                }
            })
            .buffer_unordered(config.fetch_concurrency)
            .filter_map(|(year, series)| async move { series.map(|series| (year, series)) })
            .collect()
            .await;
        fetched.sort_by_key(|(year, _)| *year);

        let wants_accumulation = accumulate_from.is_some() || threshold.is_some();
        let tables = fetched
            .iter()
            .map(|(year, series)| {
                build_table(
                    range,
                    *year,
                    series,
                    &metrics,
                    accumulate_from,
                    threshold,
                    wants_accumulation,
                )
            })
            .collect();

        let averages = if include_averages.unwrap_or(false) {
            let mut per_metric = BTreeMap::new();
            for &metric in &metrics {
                let mut group = SampleGroup::new();
                for (year, series) in &fetched {
                    fold_series(&mut group, *year, series, metric);
                }
                per_metric.insert(metric.id().to_string(), year_set_means(&group, &years));
            }
            Some(per_metric)
        } else {
            None
        };

        Ok(RangeReport { tables, averages })
    }
}

fn build_table(
    range: DayOfYearRange,
    year: i32,
    series: &DailySeries,
    metrics: &[Metric],
    accumulate_from: Option<MonthDay>,
    threshold: Option<f64>,
    wants_accumulation: bool,
) -> YearTable {
    let dates: Vec<String> = series
        .dates()
        .iter()
        .map(|date| date.format("%b %-d").to_string())
        .collect();

    let mut columns = BTreeMap::new();
    let mut accumulation = if wants_accumulation {
        Some(BTreeMap::new())
    } else {
        None
    };
    for &metric in metrics {
        let column: Vec<Option<f64>> = (0..series.len())
            .map(|index| series.resolve(metric, index))
            .collect();
        if let Some(reports) = accumulation.as_mut() {
            let start_index = accumulate_from
                .and_then(|day| resolve_start_index(series.dates(), day, year))
                .unwrap_or(0);
            let cumulative = AccumulationSeries::new(&column, start_index);
            let crossings = cumulative.crossings(threshold.unwrap_or(0.0), true);
            reports.insert(
                metric.id().to_string(),
                AccumulationReport {
                    series: cumulative,
                    crossings,
                },
            );
        }
        columns.insert(metric.id().to_string(), column);
    }

    YearTable {
        year,
        label: range.year_label(year),
        dates,
        series: columns,
        accumulation,
    }
}

/// Finds the accumulation start day inside a stitched range. For a wrapping
/// range the day may sit in either calendar year, so both are tried; the
/// range start (index 0) is the fallback when the day is outside the range.
fn resolve_start_index(dates: &[NaiveDate], day: MonthDay, year: i32) -> Option<usize> {
    start_index_for(dates, day.in_year(year))
        .or_else(|| start_index_for(dates, day.in_year(year + 1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn stitched_series(start: NaiveDate, precipitation: Vec<Option<f64>>) -> DailySeries {
        let dates: Vec<NaiveDate> = (0..precipitation.len())
            .map(|offset| start + chrono::Days::new(offset as u64))
            .collect();
        let mut fields = HashMap::new();
        fields.insert(Metric::PrecipitationSum.id().to_string(), precipitation);
        DailySeries::new(dates, fields)
    }

    #[test]
    fn tables_label_dates_for_display() {
        let series = stitched_series(
            NaiveDate::from_ymd_opt(2023, 10, 1).unwrap(),
            vec![Some(1.0), Some(2.0), Some(3.0)],
        );
        let range = DayOfYearRange::new(
            MonthDay::new(10, 1).unwrap(),
            MonthDay::new(10, 3).unwrap(),
        );
        let table = build_table(
            range,
            2023,
            &series,
            &[Metric::PrecipitationSum],
            None,
            None,
            false,
        );
        assert_eq!(table.dates, vec!["Oct 1", "Oct 2", "Oct 3"]);
        assert_eq!(table.label, "2023");
        assert_eq!(
            table.series[Metric::PrecipitationSum.id()],
            vec![Some(1.0), Some(2.0), Some(3.0)]
        );
        assert!(table.accumulation.is_none());
    }

    #[test]
    fn accumulation_starts_at_the_requested_day() {
        let series = stitched_series(
            NaiveDate::from_ymd_opt(2023, 10, 1).unwrap(),
            vec![Some(5.0), Some(5.0), Some(5.0), Some(5.0)],
        );
        let range = DayOfYearRange::new(
            MonthDay::new(10, 1).unwrap(),
            MonthDay::new(10, 4).unwrap(),
        );
        let table = build_table(
            range,
            2023,
            &series,
            &[Metric::PrecipitationSum],
            MonthDay::new(10, 3),
            Some(10.0),
            true,
        );
        let report = &table.accumulation.unwrap()[Metric::PrecipitationSum.id()];
        assert_eq!(report.series.totals, vec![0.0, 0.0, 5.0, 10.0]);
        // Start marker plus the single threshold crossing.
        assert_eq!(report.crossings.len(), 2);
        assert_eq!(report.crossings[0].day_index, 2);
        assert_eq!(report.crossings[1].day_index, 3);
    }

    #[test]
    fn wrapping_start_day_resolves_into_the_second_year() {
        let dates: Vec<NaiveDate> = (0..4)
            .map(|offset| {
                NaiveDate::from_ymd_opt(2023, 12, 30).unwrap() + chrono::Days::new(offset)
            })
            .collect();
        assert_eq!(
            resolve_start_index(&dates, MonthDay::new(1, 2).unwrap(), 2023),
            Some(3)
        );
        assert_eq!(
            resolve_start_index(&dates, MonthDay::new(12, 31).unwrap(), 2023),
            Some(1)
        );
        assert_eq!(
            resolve_start_index(&dates, MonthDay::new(6, 1).unwrap(), 2023),
            None
        );
    }

    #[tokio::test]
    async fn empty_metric_list_is_rejected_before_fetching() {
        let client = MeteoClim::new().unwrap();
        let range = DayOfYearRange::new(
            MonthDay::new(3, 1).unwrap(),
            MonthDay::new(5, 31).unwrap(),
        );
        let result = client
            .range()
            .fetch(range)
            .metrics(Vec::new())
            .years(vec![2023])
            .call()
            .await;
        assert!(matches!(
            result,
            Err(MeteoClimError::MissingParameter("metrics"))
        ));
    }

    // Hits the live Open-Meteo API.
    #[tokio::test]
    #[ignore]
    async fn wrapping_range_stitches_two_calendar_years() -> Result<(), MeteoClimError> {
        let client = MeteoClim::new()?;
        let range = DayOfYearRange::new(
            MonthDay::new(12, 30).unwrap(),
            MonthDay::new(1, 2).unwrap(),
        );
        let report = client
            .range()
            .fetch(range)
            .metrics(vec![Metric::TemperatureMean])
            .years(vec![2022])
            .call()
            .await?;
        assert_eq!(report.tables.len(), 1);
        assert_eq!(report.tables[0].label, "22/23");
        assert_eq!(report.tables[0].dates.len(), 4);
        Ok(())
    }
}
