pub mod accumulation;
pub mod averages;
pub mod envelope;
pub mod percentile;
pub mod window;
