use thiserror::Error;

/// Failures talking to or decoding the Open-Meteo archive/forecast endpoints.
///
/// A non-success HTTP status surfaces as [`FetchError::HttpStatus`]; callers
/// aggregating many years treat any variant as "no data for this request"
/// and continue with the years that succeeded.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode daily payload from {0}")]
    PayloadDecode(String, #[source] reqwest::Error),

    #[error("Malformed daily payload from {url}: {reason}")]
    MalformedPayload { url: String, reason: String },

    #[error("Failed to parse date '{value}' in daily payload")]
    DateParse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}
