pub mod audit;
pub mod config;
pub mod error;
pub mod store;
pub mod telemetry;
pub mod workflows;
