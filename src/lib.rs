mod aggregate;
mod clients;
mod error;
mod meteoclim;
mod openmeteo;
mod types;

pub use error::MeteoClimError;
pub use meteoclim::*;

pub use clients::envelope_client::*;
pub use clients::range_client::*;

pub use types::calendar::*;
pub use types::metric::*;
pub use types::reports::*;
pub use types::samples::*;

pub use aggregate::accumulation::*;
pub use aggregate::averages::*;
pub use aggregate::envelope::*;
pub use aggregate::percentile::*;
pub use aggregate::window::*;

pub use openmeteo::api::DailySeries;
pub use openmeteo::error::FetchError;
pub use openmeteo::fetcher::{OpenMeteoFetcher, MAX_FORECAST_DAYS};
