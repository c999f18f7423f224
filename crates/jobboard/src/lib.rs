pub mod board;
pub mod config;
pub mod error;
pub mod screening;
pub mod telemetry;
