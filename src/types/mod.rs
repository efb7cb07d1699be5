pub mod calendar;
pub mod metric;
pub mod reports;
pub mod samples;
