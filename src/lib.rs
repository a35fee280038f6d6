pub mod backlog;
pub mod config;
pub mod errors;
pub mod logging;
pub mod orchestrator;
pub mod prompt;
pub mod report;
pub mod signals;
pub mod tracker;
pub mod ui;
