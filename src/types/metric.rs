//! Defines the daily weather metrics the engine can aggregate: the primary
//! variables fetched from the Open-Meteo archive, and the derived metrics
//! computed from a primary dependency on the same day.

use serde::Serialize;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Optimal temperature (°C) of the growth-suitability Gaussian.
const GROWTH_OPTIMUM: f64 = 20.0;
/// Spread (°C) of the growth-suitability Gaussian.
const GROWTH_SPREAD: f64 = 5.5;
/// Shortwave radiation sum (MJ/m²) to daily light integral (mol/m²/day):
/// ~45% photosynthetically active fraction × 4.57 mol/MJ.
const DLI_FACTOR: f64 = 2.04;

/// A daily weather metric.
///
/// Primary metrics map one-to-one onto Open-Meteo archive fields. Derived
/// metrics never have an upstream series of their own; each is a pure
/// function of exactly one primary metric's value on the same day, and is
/// absent whenever the dependency value is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Daily mean 2 m air temperature (°C).
    TemperatureMean,
    /// Daily maximum 2 m air temperature (°C).
    TemperatureMax,
    /// Daily minimum 2 m air temperature (°C).
    TemperatureMin,
    /// Daily precipitation sum (mm).
    PrecipitationSum,
    /// Daily sunshine duration (seconds).
    SunshineDuration,
    /// Daily maximum 10 m wind speed (km/h).
    WindSpeedMax,
    /// FAO reference evapotranspiration (mm).
    Evapotranspiration,
    /// Daily shortwave radiation sum (MJ/m²).
    ShortwaveRadiation,
    /// Growing degree days, base 0 °C: `max(0, tmean)`.
    GrowingDegreeDaysBase0,
    /// Growing degree days, base 6 °C: `max(0, tmean - 6)`.
    GrowingDegreeDaysBase6,
    /// Growth suitability in (0, 1], a Gaussian peaking at 20 °C.
    GrowthPotential,
    /// Daily light integral (mol/m²/day), from shortwave radiation.
    DailyLightIntegral,
}

impl Metric {
    /// The wire/display identifier. Primary ids are the Open-Meteo daily
    /// field names; derived ids are the engine's own.
    pub fn id(&self) -> &'static str {
        match self {
            Metric::TemperatureMean => "temperature_2m_mean",
            Metric::TemperatureMax => "temperature_2m_max",
            Metric::TemperatureMin => "temperature_2m_min",
            Metric::PrecipitationSum => "precipitation_sum",
            Metric::SunshineDuration => "sunshine_duration",
            Metric::WindSpeedMax => "wind_speed_10m_max",
            Metric::Evapotranspiration => "et0_fao_evapotranspiration",
            Metric::ShortwaveRadiation => "shortwave_radiation_sum",
            Metric::GrowingDegreeDaysBase0 => "gdd0",
            Metric::GrowingDegreeDaysBase6 => "gdd6",
            Metric::GrowthPotential => "growth_potential",
            Metric::DailyLightIntegral => "dli",
        }
    }

    /// Resolves an identifier back to a metric.
    pub fn from_id(id: &str) -> Option<Metric> {
        [
            Metric::TemperatureMean,
            Metric::TemperatureMax,
            Metric::TemperatureMin,
            Metric::PrecipitationSum,
            Metric::SunshineDuration,
            Metric::WindSpeedMax,
            Metric::Evapotranspiration,
            Metric::ShortwaveRadiation,
            Metric::GrowingDegreeDaysBase0,
            Metric::GrowingDegreeDaysBase6,
            Metric::GrowthPotential,
            Metric::DailyLightIntegral,
        ]
        .into_iter()
        .find(|metric| metric.id() == id)
    }

    /// The primary metric a derived metric is computed from; `None` for
    /// primary metrics.
    pub fn dependency(&self) -> Option<Metric> {
        match self {
            Metric::GrowingDegreeDaysBase0
            | Metric::GrowingDegreeDaysBase6
            | Metric::GrowthPotential => Some(Metric::TemperatureMean),
            Metric::DailyLightIntegral => Some(Metric::ShortwaveRadiation),
            _ => None,
        }
    }

    pub fn is_derived(&self) -> bool {
        self.dependency().is_some()
    }

    /// The metric actually requested from the archive: the dependency for a
    /// derived metric, the metric itself otherwise.
    pub fn archive_metric(&self) -> Metric {
        self.dependency().unwrap_or(*self)
    }

    /// Applies the derived-metric formula to a same-day dependency value.
    /// For a primary metric this is the identity.
    pub fn apply(&self, dependency_value: f64) -> f64 {
        match self {
            Metric::GrowingDegreeDaysBase0 => dependency_value.max(0.0),
            Metric::GrowingDegreeDaysBase6 => (dependency_value - 6.0).max(0.0),
            Metric::GrowthPotential => {
                let deviation = (dependency_value - GROWTH_OPTIMUM) / GROWTH_SPREAD;
                (-0.5 * deviation * deviation).exp()
            }
            Metric::DailyLightIntegral => dependency_value * DLI_FACTOR,
            _ => dependency_value,
        }
    }

    /// The `daily=` parameter for the forecast endpoint. Mean temperature is
    /// not a forecast field; it is synthesized from the max/min pair.
    pub(crate) fn forecast_fields(&self) -> &'static str {
        match self.archive_metric() {
            Metric::TemperatureMean => "temperature_2m_max,temperature_2m_min",
            metric => metric.id(),
        }
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl Serialize for Metric {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.id())
    }
}

/// Partitions a requested metric list into the deduplicated set of primary
/// metrics to fetch from the archive. Every derived metric's dependency is
/// included even when the caller did not request it directly.
pub fn archive_fetch_set(metrics: &[Metric]) -> Vec<Metric> {
    let mut fetch_set = Vec::new();
    for metric in metrics {
        let primary = metric.archive_metric();
        if !fetch_set.contains(&primary) {
            fetch_set.push(primary);
        }
    }
    fetch_set
}
