use crate::openmeteo::error::FetchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeteoClimError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid year span: first year {first} is after last year {last}")]
    InvalidYearSpan { first: i32, last: i32 },
}
