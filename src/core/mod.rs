pub mod config;
pub mod distance_metric;
pub mod naive;
pub mod progress;
pub mod rolling;
