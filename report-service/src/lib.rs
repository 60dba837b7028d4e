pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

/// Name reported by `/health` and used for telemetry.
pub const SERVICE_NAME: &str = "report-service";
