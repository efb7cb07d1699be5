//! Groups per-year daily series onto the shared day-of-year axis and computes
//! the historical envelope: per-day order statistics plus a per-year overlay
//! projection of the same samples.

use crate::openmeteo::api::DailySeries;
use crate::types::calendar::MonthDay;
use crate::types::metric::Metric;
use crate::types::samples::{DayStats, SampleGroup, YearValue};
use std::collections::BTreeMap;

/// Folds one year's daily series into the group, resolving derived metrics
/// and skipping null samples. Folding is commutative over samples, so the
/// grouped result does not depend on the order years complete in.
pub fn fold_series(group: &mut SampleGroup, year: i32, series: &DailySeries, metric: Metric) {
    for (index, date) in series.dates().iter().enumerate() {
        if let Some(value) = series.resolve(metric, index) {
            group
                .entry(MonthDay::from_date(*date))
                .or_default()
                .push(YearValue { year, value });
        }
    }
}

/// Computes `DayStats` for every key with enough samples. Days with fewer
/// than [`DayStats::MIN_SAMPLES`] contributing years are left out of the map
/// entirely; absence is the signal for "no statistic".
pub fn build_statistics(group: &SampleGroup) -> BTreeMap<MonthDay, DayStats> {
    group
        .iter()
        .filter_map(|(key, samples)| {
            DayStats::from_samples(samples.clone()).map(|stats| (*key, stats))
        })
        .collect()
}

/// Re-indexes the grouped samples by year, so one specific year's trace can
/// be plotted against the envelope without a second fetch. Also returns the
/// sorted list of years that contributed at least one sample.
pub fn overlay_by_year(
    group: &SampleGroup,
) -> (BTreeMap<i32, BTreeMap<MonthDay, f64>>, Vec<i32>) {
    let mut overlay: BTreeMap<i32, BTreeMap<MonthDay, f64>> = BTreeMap::new();
    for (key, samples) in group {
        for sample in samples {
            overlay
                .entry(sample.year)
                .or_default()
                .insert(*key, sample.value);
        }
    }
    let years = overlay.keys().copied().collect();
    (overlay, years)
}
