//! HTTP access to the Open-Meteo historical archive and forecast endpoints.

use crate::meteoclim::LatLon;
use crate::openmeteo::api::{DailyResponse, DailySeries};
use crate::openmeteo::error::FetchError;
use crate::types::metric::Metric;
use chrono::NaiveDate;
use log::{info, warn};
use reqwest::Client;

const ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Most days ahead the forecast endpoint will answer for.
pub const MAX_FORECAST_DAYS: u8 = 16;

/// Fetches daily series from Open-Meteo. One shared HTTP client; no state
/// crosses requests, so a single fetcher serves concurrent per-year fetches.
pub struct OpenMeteoFetcher {
    client: Client,
    archive_url: String,
    forecast_url: String,
    timezone: String,
}

impl OpenMeteoFetcher {
    pub fn new(timezone: impl Into<String>) -> Self {
        Self::with_endpoints(ARCHIVE_URL, FORECAST_URL, timezone)
    }

    /// Overrides the endpoint base URLs; used to point at a local stand-in.
    pub fn with_endpoints(
        archive_url: impl Into<String>,
        forecast_url: impl Into<String>,
        timezone: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            archive_url: archive_url.into(),
            forecast_url: forecast_url.into(),
            timezone: timezone.into(),
        }
    }

    /// Fetches the daily archive series for a date range and set of primary
    /// metrics. Nulls in the payload are preserved as `None`.
    pub async fn archive_daily(
        &self,
        location: LatLon,
        start: NaiveDate,
        end: NaiveDate,
        metrics: &[Metric],
    ) -> Result<DailySeries, FetchError> {
        let url = archive_request_url(&self.archive_url, location, start, end, metrics, &self.timezone);
        self.fetch_daily(&url).await
    }

    /// Fetches the daily forecast series covering the metric's dependency
    /// field, with mean temperature synthesized from the max/min pair when
    /// needed. `days` is clamped to [`MAX_FORECAST_DAYS`].
    pub async fn forecast_daily(
        &self,
        location: LatLon,
        metric: Metric,
        days: u8,
    ) -> Result<DailySeries, FetchError> {
        let url = forecast_request_url(
            &self.forecast_url,
            location,
            metric,
            days.min(MAX_FORECAST_DAYS),
            &self.timezone,
        );
        let mut series = self.fetch_daily(&url).await?;
        if metric.archive_metric() == Metric::TemperatureMean {
            series.synthesize_mean_temperature();
        }
        Ok(series)
    }

    async fn fetch_daily(&self, url: &str) -> Result<DailySeries, FetchError> {
        info!("Fetching daily data from {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::NetworkRequest(url.to_string(), e))?;

        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(e) => {
                warn!("HTTP error for {url}: {e:?}");
                return Err(if let Some(status) = e.status() {
                    FetchError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    }
                } else {
                    FetchError::NetworkRequest(url.to_string(), e)
                });
            }
        };

        let payload: DailyResponse = response
            .json()
            .await
            .map_err(|e| FetchError::PayloadDecode(url.to_string(), e))?;
        let series = DailySeries::from_response(payload, url)?;
        info!("Fetched {} daily rows from {url}", series.len());
        Ok(series)
    }
}

fn archive_request_url(
    base: &str,
    location: LatLon,
    start: NaiveDate,
    end: NaiveDate,
    metrics: &[Metric],
    timezone: &str,
) -> String {
    let daily = metrics
        .iter()
        .map(Metric::id)
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "{base}?latitude={lat}&longitude={lon}&start_date={start}&end_date={end}&daily={daily}&timezone={timezone}",
        lat = location.0,
        lon = location.1,
    )
}

fn forecast_request_url(
    base: &str,
    location: LatLon,
    metric: Metric,
    days: u8,
    timezone: &str,
) -> String {
    format!(
        "{base}?latitude={lat}&longitude={lon}&daily={daily}&timezone={timezone}&forecast_days={days}",
        lat = location.0,
        lon = location.1,
        daily = metric.forecast_fields(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const BINGLEY: LatLon = LatLon(53.8475, -1.8397);

    #[test]
    fn archive_url_carries_range_and_metric_list() {
        let url = archive_request_url(
            ARCHIVE_URL,
            BINGLEY,
            NaiveDate::from_ymd_opt(2023, 10, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
            &[Metric::TemperatureMean, Metric::PrecipitationSum],
            "Europe/London",
        );
        assert_eq!(
            url,
            "https://archive-api.open-meteo.com/v1/archive?latitude=53.8475&longitude=-1.8397\
             &start_date=2023-10-01&end_date=2023-12-31\
             &daily=temperature_2m_mean,precipitation_sum&timezone=Europe/London"
        );
    }

    #[test]
    fn forecast_url_expands_mean_temperature_fields() {
        let url = forecast_request_url(FORECAST_URL, BINGLEY, Metric::TemperatureMean, 16, "Europe/London");
        assert!(url.contains("daily=temperature_2m_max,temperature_2m_min"));
        assert!(url.contains("forecast_days=16"));
    }

    #[test]
    fn forecast_url_passes_plain_fields_through() {
        let url = forecast_request_url(FORECAST_URL, BINGLEY, Metric::WindSpeedMax, 7, "Europe/London");
        assert!(url.contains("daily=wind_speed_10m_max"));
        assert!(url.contains("forecast_days=7"));
    }
}
