//! Aggregation responses handed to the presentation layer. Shapes are stable:
//! charting code indexes them by metric id and year only.

use crate::aggregate::accumulation::{AccumulationSeries, ThresholdCrossing};
use crate::aggregate::averages::{bucket_means, AveragingBucket};
use crate::aggregate::window::{assemble, ClimateWindow, WindowInputs};
use crate::types::calendar::MonthDay;
use crate::types::metric::Metric;
use crate::types::samples::{DayStats, SampleGroup};
use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-day means for every averaging bucket, each computed independently from
/// the same grouped samples.
#[derive(Debug, Clone)]
pub struct AveragesReport {
    buckets: Vec<(AveragingBucket, BTreeMap<MonthDay, f64>)>,
}

impl AveragesReport {
    /// Computes every bucket's means from an already-built sample group.
    pub fn from_group(group: &SampleGroup) -> Self {
        Self {
            buckets: AveragingBucket::ALL
                .iter()
                .map(|&bucket| (bucket, bucket_means(group, bucket)))
                .collect(),
        }
    }

    pub fn buckets(&self) -> &[(AveragingBucket, BTreeMap<MonthDay, f64>)] {
        &self.buckets
    }

    pub fn means(&self, bucket: AveragingBucket) -> Option<&BTreeMap<MonthDay, f64>> {
        self.buckets
            .iter()
            .find(|(candidate, _)| *candidate == bucket)
            .map(|(_, means)| means)
    }
}

impl Serialize for AveragesReport {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for (bucket, means) in &self.buckets {
            map.serialize_entry(bucket.label(), means)?;
        }
        map.end()
    }
}

/// The climate-envelope response: per-day statistics, the per-year overlay of
/// the same samples, averaging buckets, and the recent/forecast splice data
/// the rolling window is assembled from.
///
/// A degraded result (some historical years unavailable) keeps this exact
/// shape; only `overlay_years` and the populated maps reveal how many years
/// contributed.
#[derive(Debug, Clone, Serialize)]
pub struct EnvelopeReport {
    pub metric: Metric,
    pub statistics: BTreeMap<MonthDay, DayStats>,
    pub overlay: BTreeMap<i32, BTreeMap<MonthDay, f64>>,
    /// Years that contributed at least one sample, ascending.
    pub overlay_years: Vec<i32>,
    /// Years that were requested, whether or not their fetch succeeded.
    pub historical_years: Vec<i32>,
    pub averages: AveragesReport,
    /// Recent observations keyed by day-of-year, at most six months back.
    pub recent: BTreeMap<MonthDay, f64>,
    /// Forecast values keyed by day-of-year, at most 16 days ahead.
    pub forecast: BTreeMap<MonthDay, f64>,
    /// The reference "today" the report was built for.
    pub today: NaiveDate,
}

impl EnvelopeReport {
    /// Assembles the rolling 12-month window from this report. Pure; no
    /// further fetches.
    pub fn window(&self) -> ClimateWindow {
        assemble(
            &WindowInputs {
                statistics: &self.statistics,
                overlay: &self.overlay,
                overlay_years: &self.overlay_years,
                averages: self.averages.buckets(),
                recent: &self.recent,
                forecast: &self.forecast,
            },
            self.today,
        )
    }
}

/// A cumulative series with its threshold crossings, for one metric of one
/// year table.
#[derive(Debug, Clone, Serialize)]
pub struct AccumulationReport {
    pub series: AccumulationSeries,
    pub crossings: Vec<ThresholdCrossing>,
}

/// One year's stitched date-range data: display date labels and one value
/// column per requested metric, keyed by metric id.
#[derive(Debug, Clone, Serialize)]
pub struct YearTable {
    /// Start year of the range (also of the wrap, for a wrapping range).
    pub year: i32,
    /// `"2023"`, or `"23/24"` for a wrapping range.
    pub label: String,
    pub dates: Vec<String>,
    pub series: BTreeMap<String, Vec<Option<f64>>>,
    /// Present when the caller asked for accumulation; keyed by metric id.
    pub accumulation: Option<BTreeMap<String, AccumulationReport>>,
}

/// The range/chart-mode response: one table per year that fetched
/// completely, plus an optional averages block over the requested years.
#[derive(Debug, Clone, Serialize)]
pub struct RangeReport {
    pub tables: Vec<YearTable>,
    /// Per-metric per-day means over exactly the requested years.
    pub averages: Option<BTreeMap<String, BTreeMap<MonthDay, f64>>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::samples::YearValue;

    #[test]
    fn averages_report_serializes_as_a_label_keyed_map() {
        let key = MonthDay::new(4, 1).unwrap();
        let mut group = SampleGroup::new();
        group.insert(
            key,
            vec![
                YearValue { year: 1985, value: 4.0 },
                YearValue { year: 2015, value: 8.0 },
            ],
        );
        let report = AveragesReport::from_group(&group);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["allTime"]["04-01"], 6.0);
        assert_eq!(json["1980s"]["04-01"], 4.0);
        assert_eq!(json["2010s"]["04-01"], 8.0);
        assert!(json["1990s"].as_object().unwrap().is_empty());
    }

    #[test]
    fn averages_report_exposes_bucket_lookup() {
        let group = SampleGroup::new();
        let report = AveragesReport::from_group(&group);
        assert_eq!(report.buckets().len(), AveragingBucket::ALL.len());
        assert!(report.means(AveragingBucket::AllTime).unwrap().is_empty());
    }
}
