//! Per-day-of-year arithmetic means over a selectable year-set: all years,
//! or one of the fixed decade buckets.

use crate::types::calendar::MonthDay;
use crate::types::samples::SampleGroup;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::{Display, Formatter};

/// A named year-set to average over. Decade buckets are fixed; the 2020s are
/// truncated naturally by whichever years have samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AveragingBucket {
    AllTime,
    Decade1980s,
    Decade1990s,
    Decade2000s,
    Decade2010s,
    Decade2020s,
}

impl AveragingBucket {
    /// Every bucket, all-time first, then decades oldest to newest.
    pub const ALL: [AveragingBucket; 6] = [
        AveragingBucket::AllTime,
        AveragingBucket::Decade1980s,
        AveragingBucket::Decade1990s,
        AveragingBucket::Decade2000s,
        AveragingBucket::Decade2010s,
        AveragingBucket::Decade2020s,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AveragingBucket::AllTime => "allTime",
            AveragingBucket::Decade1980s => "1980s",
            AveragingBucket::Decade1990s => "1990s",
            AveragingBucket::Decade2000s => "2000s",
            AveragingBucket::Decade2010s => "2010s",
            AveragingBucket::Decade2020s => "2020s",
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        match self {
            AveragingBucket::AllTime => true,
            AveragingBucket::Decade1980s => (1980..=1989).contains(&year),
            AveragingBucket::Decade1990s => (1990..=1999).contains(&year),
            AveragingBucket::Decade2000s => (2000..=2009).contains(&year),
            AveragingBucket::Decade2010s => (2010..=2019).contains(&year),
            AveragingBucket::Decade2020s => (2020..=2029).contains(&year),
        }
    }
}

impl Display for AveragingBucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for AveragingBucket {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

/// Arithmetic mean per day over the bucket's year-set, computed from the
/// already-grouped samples with no re-fetch. Days with no matching sample are
/// omitted. Each bucket is independent of every other.
pub fn bucket_means(group: &SampleGroup, bucket: AveragingBucket) -> BTreeMap<MonthDay, f64> {
    group
        .iter()
        .filter_map(|(key, samples)| {
            let matching: Vec<f64> = samples
                .iter()
                .filter(|sample| bucket.contains(sample.year))
                .map(|sample| sample.value)
                .collect();
            if matching.is_empty() {
                None
            } else {
                Some((*key, matching.iter().sum::<f64>() / matching.len() as f64))
            }
        })
        .collect()
}

/// Means over an explicit year list, for caller-selected year-sets that are
/// not one of the named buckets.
pub fn year_set_means(group: &SampleGroup, years: &[i32]) -> BTreeMap<MonthDay, f64> {
    group
        .iter()
        .filter_map(|(key, samples)| {
            let matching: Vec<f64> = samples
                .iter()
                .filter(|sample| years.contains(&sample.year))
                .map(|sample| sample.value)
                .collect();
            if matching.is_empty() {
                None
            } else {
                Some((*key, matching.iter().sum::<f64>() / matching.len() as f64))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::samples::YearValue;

    fn group_with(day_samples: &[(i32, f64)]) -> (SampleGroup, MonthDay) {
        let key = MonthDay::new(6, 15).unwrap();
        let mut group = SampleGroup::new();
        group.insert(
            key,
            day_samples
                .iter()
                .map(|&(year, value)| YearValue { year, value })
                .collect(),
        );
        (group, key)
    }

    #[test]
    fn decade_buckets_filter_years() {
        let (group, key) = group_with(&[(1985, 10.0), (1995, 20.0), (2015, 30.0)]);
        assert_eq!(bucket_means(&group, AveragingBucket::Decade1980s)[&key], 10.0);
        assert_eq!(bucket_means(&group, AveragingBucket::Decade2010s)[&key], 30.0);
        assert!(bucket_means(&group, AveragingBucket::Decade2000s).is_empty());
    }

    #[test]
    fn all_time_averages_every_sample() {
        let (group, key) = group_with(&[(1985, 10.0), (1995, 20.0), (2015, 30.0)]);
        assert_eq!(bucket_means(&group, AveragingBucket::AllTime)[&key], 20.0);
    }

    #[test]
    fn buckets_are_independent() {
        let (group, key) = group_with(&[(1985, 10.0), (1986, 14.0), (2021, 40.0)]);
        let all_time = bucket_means(&group, AveragingBucket::AllTime);
        let eighties = bucket_means(&group, AveragingBucket::Decade1980s);
        let twenties = bucket_means(&group, AveragingBucket::Decade2020s);
        // Requesting one bucket never alters another; each filters its own
        // subset of the same underlying samples.
        assert_eq!(all_time[&key], 64.0 / 3.0);
        assert_eq!(eighties[&key], 12.0);
        assert_eq!(twenties[&key], 40.0);
    }

    #[test]
    fn explicit_year_sets_average_only_those_years() {
        let (group, key) = group_with(&[(2001, 1.0), (2002, 2.0), (2003, 9.0)]);
        let means = year_set_means(&group, &[2001, 2002]);
        assert_eq!(means[&key], 1.5);
        assert!(year_set_means(&group, &[1990]).is_empty());
    }
}
