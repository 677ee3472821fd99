// src/lib.rs
//! MuseCareer: CV career analysis API and the page workflow that drives it.

pub mod logging;

pub mod cli;
pub mod core;
pub mod cv_analysis;
pub mod environment;
pub mod error;
pub mod utils;
pub mod web;
pub mod workflow;

pub use cv_analysis::{AnalysisReport, CareerAnalyzer};
pub use web::start_web_server;
