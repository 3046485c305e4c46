pub mod config;
pub mod docker;
pub mod naming;
pub mod telemetry;
pub mod workflow;
