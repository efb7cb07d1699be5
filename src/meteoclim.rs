//! The main entry point for building day-of-year climate aggregations from
//! the Open-Meteo historical archive and forecast services.

use crate::clients::envelope_client::EnvelopeClient;
use crate::clients::range_client::RangeClient;
use crate::error::MeteoClimError;
use crate::openmeteo::fetcher::{OpenMeteoFetcher, MAX_FORECAST_DAYS};
use chrono::{Datelike, Utc};

/// A geographical coordinate: latitude first, longitude second.
///
/// # Examples
///
/// ```
/// use meteoclim::LatLon;
///
/// let bingley = LatLon(53.8475, -1.8397);
/// assert_eq!(bingley.0, 53.8475); // Latitude
/// assert_eq!(bingley.1, -1.8397); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);

/// Settings shared by every request a [`MeteoClim`] client makes.
///
/// The defaults describe the reference site the engine was built around:
/// Bingley, West Yorkshire, with historical coverage from 1980 through the
/// current year.
#[derive(Debug, Clone)]
pub struct ClimateConfig {
    /// Coordinate used when a request does not supply its own.
    pub location: LatLon,
    /// First year of the historical span, inclusive.
    pub first_year: i32,
    /// Last year of the historical span, inclusive.
    pub last_year: i32,
    /// IANA timezone the daily series are aligned to.
    pub timezone: String,
    /// Days of forecast to splice onto recent observations.
    pub forecast_days: u8,
    /// Maximum number of per-year fetches in flight at once.
    pub fetch_concurrency: usize,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            location: LatLon(53.8475, -1.8397),
            first_year: 1980,
            last_year: Utc::now().date_naive().year(),
            timezone: "Europe/London".to_string(),
            forecast_days: MAX_FORECAST_DAYS,
            fetch_concurrency: 8,
        }
    }
}

impl ClimateConfig {
    /// The full historical span as an ascending year list.
    pub fn historical_years(&self) -> Vec<i32> {
        (self.first_year..=self.last_year).collect()
    }
}

/// The main client for day-of-year climate aggregation.
///
/// Create one with [`MeteoClim::new()`] for the defaults, or
/// [`MeteoClim::with_config()`] to aggregate a different site or span. The
/// client itself holds no state beyond its configuration and HTTP connection
/// pool; every request is built through [`MeteoClim::envelope()`] or
/// [`MeteoClim::range()`].
///
/// # Examples
///
/// ```no_run
/// # use meteoclim::{MeteoClim, MeteoClimError, Metric};
/// # #[tokio::main]
/// # async fn main() -> Result<(), MeteoClimError> {
/// let client = MeteoClim::new()?;
/// let report = client
///     .envelope()
///     .fetch(Metric::TemperatureMean)
///     .call()
///     .await?;
/// println!("{} days with statistics", report.statistics.len());
/// # Ok(())
/// # }
/// ```
pub struct MeteoClim {
    pub(crate) fetcher: OpenMeteoFetcher,
    pub(crate) config: ClimateConfig,
}

impl MeteoClim {
    /// Creates a client with the default configuration.
    pub fn new() -> Result<Self, MeteoClimError> {
        Self::with_config(ClimateConfig::default())
    }

    /// Creates a client with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MeteoClimError::InvalidYearSpan`] when `first_year` is after
    /// `last_year`.
    pub fn with_config(config: ClimateConfig) -> Result<Self, MeteoClimError> {
        if config.first_year > config.last_year {
            return Err(MeteoClimError::InvalidYearSpan {
                first: config.first_year,
                last: config.last_year,
            });
        }
        Ok(Self {
            fetcher: OpenMeteoFetcher::new(&config.timezone),
            config,
        })
    }

    pub fn config(&self) -> &ClimateConfig {
        &self.config
    }

    /// Starts a historical-envelope request: per-day percentile statistics,
    /// decade averages, and the recent/forecast splice for one metric.
    pub fn envelope(&self) -> EnvelopeClient<'_> {
        EnvelopeClient::new(self)
    }

    /// Starts a date-range request: stitched per-year value tables for a
    /// day-of-year range, with optional accumulation and averages.
    pub fn range(&self) -> RangeClient<'_> {
        RangeClient::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_spans_1980_to_the_current_year() {
        let config = ClimateConfig::default();
        assert_eq!(config.first_year, 1980);
        assert!(config.last_year >= 2025);
        let years = config.historical_years();
        assert_eq!(years.first(), Some(&1980));
        assert_eq!(years.last(), Some(&config.last_year));
    }

    #[test]
    fn reversed_year_span_is_rejected() {
        let config = ClimateConfig {
            first_year: 2030,
            last_year: 2020,
            ..ClimateConfig::default()
        };
        assert!(matches!(
            MeteoClim::with_config(config),
            Err(MeteoClimError::InvalidYearSpan { first: 2030, last: 2020 })
        ));
    }
}
