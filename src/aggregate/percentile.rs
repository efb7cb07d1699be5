//! Linear-interpolated percentiles over a numeric sample set.

use ordered_float::OrderedFloat;

/// Sorts values ascending with a total order over floats.
pub fn sort_values(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.into_iter().collect();
    sorted.sort_by_key(|&value| OrderedFloat(value));
    sorted
}

/// Percentile `p` (0–100) of an ascending-sorted, non-empty slice, using
/// linear interpolation between closest ranks: the fractional rank is
/// `(p / 100) * (n - 1)`; an integral rank returns that element, otherwise
/// the two neighbouring elements are interpolated.
///
/// Callers guarantee a non-empty slice; the envelope builder only computes
/// statistics over days with at least three samples.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty(), "percentile of an empty sample set");
    let rank = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] + (rank - lower as f64) * (sorted[upper] - sorted[lower])
    }
}
