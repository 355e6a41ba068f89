pub mod auth;
pub mod billing;
pub mod config;
pub mod domain;
pub mod error;
pub mod report;
pub mod scheduling;
pub mod store;
pub mod students;
pub mod telemetry;
pub mod validation;
