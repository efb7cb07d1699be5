//! Typed views over the Open-Meteo daily payloads.
//!
//! Both the archive and the forecast endpoint answer with the same shape:
//! a `daily` block holding an ISO date array and one parallel value array per
//! requested field, with `null` where the source has no observation.

use crate::openmeteo::error::FetchError;
use crate::types::metric::Metric;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub(crate) struct DailyResponse {
    pub(crate) daily: DailyBlock,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DailyBlock {
    pub(crate) time: Vec<String>,
    #[serde(flatten)]
    pub(crate) fields: HashMap<String, Vec<Option<f64>>>,
}

/// A validated daily series: parsed dates plus one value column per field,
/// all the same length. Nulls stay `None`; they are excluded from every
/// aggregation downstream, never treated as zero.
#[derive(Debug, Clone)]
pub struct DailySeries {
    dates: Vec<NaiveDate>,
    fields: HashMap<String, Vec<Option<f64>>>,
}

impl DailySeries {
    /// Builds a series from already-parsed parts.
    ///
    /// # Panics
    ///
    /// Panics if a field column's length differs from the date column's.
    pub fn new(dates: Vec<NaiveDate>, fields: HashMap<String, Vec<Option<f64>>>) -> Self {
        for (field, values) in &fields {
            assert_eq!(
                values.len(),
                dates.len(),
                "field '{field}' length does not match date column"
            );
        }
        Self { dates, fields }
    }

    pub(crate) fn from_response(response: DailyResponse, url: &str) -> Result<Self, FetchError> {
        let DailyBlock { time, fields } = response.daily;
        let mut dates = Vec::with_capacity(time.len());
        for value in time {
            let date = value
                .parse::<NaiveDate>()
                .map_err(|source| FetchError::DateParse { value, source })?;
            dates.push(date);
        }
        for (field, values) in &fields {
            if values.len() != dates.len() {
                return Err(FetchError::MalformedPayload {
                    url: url.to_string(),
                    reason: format!(
                        "field '{}' has {} values for {} dates",
                        field,
                        values.len(),
                        dates.len()
                    ),
                });
            }
        }
        Ok(Self { dates, fields })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Raw value of a primary field at an index; `None` for nulls, missing
    /// fields, or out-of-range indices.
    pub fn value(&self, metric: Metric, index: usize) -> Option<f64> {
        self.fields.get(metric.id())?.get(index).copied().flatten()
    }

    /// The value of a requested metric at an index, applying the derived
    /// formula to the same-day dependency value where needed. A null
    /// dependency propagates to a null derived value.
    pub fn resolve(&self, metric: Metric, index: usize) -> Option<f64> {
        let raw = self.value(metric.archive_metric(), index)?;
        Some(metric.apply(raw))
    }

    /// Synthesizes a mean-temperature column from the forecast max/min pair,
    /// null whenever either side is null. The forecast endpoint has no mean
    /// temperature field of its own.
    pub(crate) fn synthesize_mean_temperature(&mut self) {
        let max = self.fields.get(Metric::TemperatureMax.id());
        let min = self.fields.get(Metric::TemperatureMin.id());
        let (Some(max), Some(min)) = (max, min) else {
            return;
        };
        let mean: Vec<Option<f64>> = max
            .iter()
            .copied()
            .zip(min.iter().copied())
            .map(|(high, low)| Some((high? + low?) / 2.0))
            .collect();
        self.fields.insert(Metric::TemperatureMean.id().to_string(), mean);
    }

    /// Appends another series, keeping chronological order of parts. Used to
    /// stitch the two halves of a year-boundary-crossing range; fields absent
    /// from either part are dropped rather than padded.
    pub(crate) fn extend(&mut self, other: DailySeries) {
        let extended_len = self.dates.len() + other.dates.len();
        self.dates.extend(other.dates);
        self.fields.retain(|field, values| {
            if let Some(tail) = other.fields.get(field) {
                values.extend(tail.iter().copied());
                values.len() == extended_len
            } else {
                false
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_from_json(json: &str) -> DailyResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_an_archive_payload() {
        let response = response_from_json(
            r#"{
                "latitude": 53.85,
                "longitude": -1.83,
                "daily_units": { "time": "iso8601", "temperature_2m_mean": "°C" },
                "daily": {
                    "time": ["2023-10-01", "2023-10-02", "2023-10-03"],
                    "temperature_2m_mean": [14.2, null, 11.0]
                }
            }"#,
        );
        let series = DailySeries::from_response(response, "http://test").unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.value(Metric::TemperatureMean, 0), Some(14.2));
        assert_eq!(series.value(Metric::TemperatureMean, 1), None);
        assert_eq!(series.value(Metric::TemperatureMean, 2), Some(11.0));
    }

    #[test]
    fn ragged_columns_are_rejected() {
        let response = response_from_json(
            r#"{
                "daily": {
                    "time": ["2023-10-01", "2023-10-02"],
                    "precipitation_sum": [1.0]
                }
            }"#,
        );
        let error = DailySeries::from_response(response, "http://test").unwrap_err();
        assert!(matches!(error, FetchError::MalformedPayload { .. }));
    }

    #[test]
    fn unparseable_dates_are_rejected() {
        let response = response_from_json(
            r#"{ "daily": { "time": ["not-a-date"], "precipitation_sum": [1.0] } }"#,
        );
        let error = DailySeries::from_response(response, "http://test").unwrap_err();
        assert!(matches!(error, FetchError::DateParse { .. }));
    }

    #[test]
    fn derived_values_resolve_from_the_dependency_column() {
        let response = response_from_json(
            r#"{
                "daily": {
                    "time": ["2023-06-01", "2023-06-02", "2023-06-03"],
                    "temperature_2m_mean": [20.0, null, -4.0]
                }
            }"#,
        );
        let series = DailySeries::from_response(response, "http://test").unwrap();
        assert_eq!(series.resolve(Metric::GrowthPotential, 0), Some(1.0));
        assert_eq!(series.resolve(Metric::GrowingDegreeDaysBase0, 2), Some(0.0));
        // A null dependency is a null derived value, never zero.
        assert_eq!(series.resolve(Metric::GrowthPotential, 1), None);
        assert_eq!(series.resolve(Metric::GrowingDegreeDaysBase6, 1), None);
    }

    #[test]
    fn forecast_mean_temperature_is_synthesized() {
        let response = response_from_json(
            r#"{
                "daily": {
                    "time": ["2025-08-29", "2025-08-30"],
                    "temperature_2m_max": [24.0, null],
                    "temperature_2m_min": [12.0, 10.0]
                }
            }"#,
        );
        let mut series = DailySeries::from_response(response, "http://test").unwrap();
        series.synthesize_mean_temperature();
        assert_eq!(series.value(Metric::TemperatureMean, 0), Some(18.0));
        assert_eq!(series.value(Metric::TemperatureMean, 1), None);
    }

    #[test]
    fn extending_concatenates_chronological_parts() {
        let first = response_from_json(
            r#"{ "daily": { "time": ["2023-12-30", "2023-12-31"], "precipitation_sum": [1.0, 2.0] } }"#,
        );
        let second = response_from_json(
            r#"{ "daily": { "time": ["2024-01-01"], "precipitation_sum": [3.0] } }"#,
        );
        let mut series = DailySeries::from_response(first, "http://test").unwrap();
        series.extend(DailySeries::from_response(second, "http://test").unwrap());
        assert_eq!(series.len(), 3);
        assert_eq!(series.value(Metric::PrecipitationSum, 2), Some(3.0));
        assert_eq!(
            series.dates()[2],
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }
}
