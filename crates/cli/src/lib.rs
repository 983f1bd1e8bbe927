//! Command-line front end for the karai coordinator.
//!
//! Provides:
//! - Flag parsing into the coordinator configuration
//! - Tracing setup
//! - Node startup and shutdown

pub mod config;
pub mod node;

pub use config::CliConfig;
