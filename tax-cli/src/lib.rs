pub mod app;
pub mod config;
pub mod handoff;
pub mod logging;
pub mod report;
