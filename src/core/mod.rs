// src/core/mod.rs
//! Configuration and outbound HTTP plumbing shared by the server and the CLI

pub mod config_manager;
pub mod service_client;

pub use config_manager::ConfigManager;
pub use service_client::AnalysisServiceClient;
