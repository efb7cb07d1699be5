pub mod envelope_client;
pub mod range_client;
