//! Process wiring for the vital-signs monitor: configuration, file
//! ingestion and the periodic evaluation loop.

pub mod config;
pub mod reader;
pub mod scheduler;
