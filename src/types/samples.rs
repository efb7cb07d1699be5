//! Grouped daily samples and the per-day order statistics computed from them.

use crate::aggregate::percentile::{percentile, sort_values};
use crate::types::calendar::MonthDay;
use serde::Serialize;
use std::collections::BTreeMap;

/// One non-null daily observation attributed to its source year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

/// All requested years' samples grouped by day-of-year key. Insertion order
/// across years is irrelevant; values are sorted when statistics are taken.
pub type SampleGroup = BTreeMap<MonthDay, Vec<YearValue>>;

/// Historical spread of a metric for one day-of-year: extremes, quartiles and
/// the raw backing samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayStats {
    pub min: f64,
    pub p25: f64,
    pub p75: f64,
    pub max: f64,
    pub samples: Vec<YearValue>,
}

impl DayStats {
    /// Fewest contributing years a day needs before statistics are computed.
    pub const MIN_SAMPLES: usize = 3;

    /// Computes statistics over a day's samples, or `None` when fewer than
    /// [`DayStats::MIN_SAMPLES`] contribute. Absence, not a sentinel, is how
    /// insufficient data is signalled; callers omit the key entirely.
    pub fn from_samples(samples: Vec<YearValue>) -> Option<Self> {
        if samples.len() < Self::MIN_SAMPLES {
            return None;
        }
        let sorted = sort_values(samples.iter().map(|sample| sample.value));
        Some(Self {
            min: sorted[0],
            p25: percentile(&sorted, 25.0),
            p75: percentile(&sorted, 75.0),
            max: sorted[sorted.len() - 1],
            samples,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(values: &[f64]) -> Vec<YearValue> {
        values
            .iter()
            .enumerate()
            .map(|(offset, &value)| YearValue {
                year: 1980 + offset as i32,
                value,
            })
            .collect()
    }

    #[test]
    fn two_samples_produce_no_statistics() {
        assert!(DayStats::from_samples(samples(&[1.0, 2.0])).is_none());
    }

    #[test]
    fn three_samples_are_enough() {
        let stats = DayStats::from_samples(samples(&[3.0, 1.0, 2.0])).unwrap();
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 3.0);
        assert_eq!(stats.samples.len(), 3);
    }

    #[test]
    fn quartiles_interpolate_linearly() {
        let stats = DayStats::from_samples(samples(&[4.0, 2.0, 1.0, 3.0])).unwrap();
        assert_eq!(stats.p25, 1.75);
        assert_eq!(stats.p75, 3.25);
    }

    #[test]
    fn extremes_match_the_raw_input() {
        let raw = [7.25, -2.5, 0.0, 14.0, 3.5];
        let stats = DayStats::from_samples(samples(&raw)).unwrap();
        let raw_min = raw.iter().cloned().fold(f64::INFINITY, f64::min);
        let raw_max = raw.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(stats.min, raw_min);
        assert_eq!(stats.max, raw_max);
    }
}
