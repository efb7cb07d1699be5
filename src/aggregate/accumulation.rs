//! Running totals over an ordered day sequence, and the threshold-crossing
//! events they generate.

use chrono::NaiveDate;
use serde::Serialize;

/// A cumulative series aligned 1:1 with an ordered day sequence.
///
/// Totals before `start_index` are pinned at zero: values there are not
/// accumulated at all. From `start_index` on, each non-null value adds to the
/// running sum; nulls contribute nothing without resetting it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccumulationSeries {
    pub totals: Vec<f64>,
    pub start_index: usize,
}

impl AccumulationSeries {
    pub fn new(values: &[Option<f64>], start_index: usize) -> Self {
        let mut running = 0.0;
        let totals = values
            .iter()
            .enumerate()
            .map(|(index, value)| {
                if index >= start_index {
                    running += value.unwrap_or(0.0);
                    running
                } else {
                    0.0
                }
            })
            .collect();
        Self {
            totals,
            start_index,
        }
    }

    /// Threshold crossings of this series; see [`detect_crossings`].
    pub fn crossings(&self, threshold: f64, pin_start: bool) -> Vec<ThresholdCrossing> {
        detect_crossings(&self.totals, self.start_index, threshold, pin_start)
    }
}

/// A point where the running total first reaches a multiple of the configured
/// threshold, or the pinned start itself for the ordinal-1 start marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdCrossing {
    /// Position in the day sequence.
    pub day_index: usize,
    /// Running total at the crossing.
    pub cumulative: f64,
    /// 1-based count of crossings so far, the start marker included.
    pub ordinal: u32,
    /// Days since the previous crossing, or since the start index for the
    /// first threshold crossing.
    pub days_since_previous: usize,
}

/// Scans a cumulative series for the ordered crossing events at fixed
/// increments of `threshold`.
///
/// Each multiple of the threshold is claimed exactly once, at the first index
/// whose total reaches or passes it; a single jump across several multiples
/// claims each of them at that index. With `pin_start`, an ordinal-1 marker
/// with value 0 is emitted at the start index before any threshold crossing;
/// it does not contribute to the total. A non-positive threshold yields only
/// the start marker.
pub fn detect_crossings(
    totals: &[f64],
    start_index: usize,
    threshold: f64,
    pin_start: bool,
) -> Vec<ThresholdCrossing> {
    let mut crossings = Vec::new();
    let mut ordinal = 1;
    let mut previous_index = start_index;

    if pin_start && start_index < totals.len() {
        crossings.push(ThresholdCrossing {
            day_index: start_index,
            cumulative: 0.0,
            ordinal,
            days_since_previous: 0,
        });
        ordinal += 1;
    }

    if threshold <= 0.0 {
        return crossings;
    }

    let mut next_mark = threshold;
    for (index, &total) in totals.iter().enumerate().skip(start_index) {
        while total >= next_mark {
            crossings.push(ThresholdCrossing {
                day_index: index,
                cumulative: total,
                ordinal,
                days_since_previous: index - previous_index,
            });
            previous_index = index;
            ordinal += 1;
            next_mark += threshold;
        }
    }
    crossings
}

/// Resolves a calendar date to its index in an ordered date sequence by
/// linear scan; `None` if the date is not present.
pub fn start_index_for(dates: &[NaiveDate], start: NaiveDate) -> Option<usize> {
    dates.iter().position(|&date| date == start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_are_pinned_before_the_start_index() {
        let values = vec![Some(5.0); 5];
        let series = AccumulationSeries::new(&values, 2);
        assert_eq!(series.totals, vec![0.0, 0.0, 5.0, 10.0, 15.0]);
    }

    #[test]
    fn nulls_contribute_zero_without_resetting() {
        let values = vec![Some(2.0), None, Some(3.0)];
        let series = AccumulationSeries::new(&values, 0);
        assert_eq!(series.totals, vec![2.0, 2.0, 5.0]);
    }

    #[test]
    fn start_index_past_the_end_pins_everything() {
        let series = AccumulationSeries::new(&[Some(1.0), Some(2.0)], 5);
        assert_eq!(series.totals, vec![0.0, 0.0]);
        assert!(series.crossings(1.0, true).is_empty());
    }

    #[test]
    fn crossing_ordinals_follow_the_start_marker() {
        let totals = [0.0, 0.0, 5.0, 10.0, 15.0, 25.0, 30.0];
        let crossings = detect_crossings(&totals, 2, 10.0, true);

        let summary: Vec<(u32, usize, f64)> = crossings
            .iter()
            .map(|crossing| (crossing.ordinal, crossing.day_index, crossing.cumulative))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, 2, 0.0),   // start marker
                (2, 3, 10.0),  // reaches 10
                (3, 5, 25.0),  // 25 claims the 20 mark once (25 < 30)
                (4, 6, 30.0),  // reaches 30
            ]
        );
        assert_eq!(crossings[1].days_since_previous, 1);
        assert_eq!(crossings[2].days_since_previous, 2);
        assert_eq!(crossings[3].days_since_previous, 1);
    }

    #[test]
    fn a_jump_across_two_multiples_claims_both_at_one_index() {
        let totals = [0.0, 35.0];
        let crossings = detect_crossings(&totals, 0, 10.0, false);
        let ordinals: Vec<(u32, usize)> = crossings
            .iter()
            .map(|crossing| (crossing.ordinal, crossing.day_index))
            .collect();
        assert_eq!(ordinals, vec![(1, 1), (2, 1), (3, 1)]);
        assert_eq!(crossings[1].days_since_previous, 0);
    }

    #[test]
    fn no_threshold_yields_only_the_start_marker() {
        let crossings = detect_crossings(&[0.0, 5.0, 9.0], 0, 0.0, true);
        assert_eq!(crossings.len(), 1);
        assert_eq!(crossings[0].ordinal, 1);
        assert_eq!(crossings[0].cumulative, 0.0);
    }

    #[test]
    fn dates_resolve_to_indices_by_linear_scan() {
        let first = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let dates: Vec<NaiveDate> = (0..10).map(|d| first + chrono::Days::new(d)).collect();
        assert_eq!(
            start_index_for(&dates, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()),
            Some(3)
        );
        assert_eq!(
            start_index_for(&dates, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()),
            None
        );
    }
}
