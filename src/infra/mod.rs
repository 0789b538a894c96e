//! Infrastructure adapters and runtime bootstrap.

pub mod error;
pub mod manager;
pub mod mirror;
pub mod telemetry;
