// src/web/handlers/system_handlers.rs
use crate::cv_analysis::CareerAnalyzer;
use crate::web::types::*;

use chrono::{SecondsFormat, Utc};
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

pub const SERVICE_NAME: &str = "MuseCareer API";

pub async fn root_handler() -> Json<RootInfo> {
    Json(RootInfo {
        message: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: EndpointList {
            health: "/health".to_string(),
            analyze_cv_file: "/analyze-cv (POST)".to_string(),
            analyze_cv_text: "/analyze-cv-text (POST)".to_string(),
            analyze_cv_base64: "/analyze-cv-base64 (POST)".to_string(),
        },
    })
}

pub async fn health_handler(
    config: &State<ServerConfig>,
    analyzer: &State<CareerAnalyzer>,
) -> Json<HealthResponse> {
    info!("Health check");

    Json(HealthResponse {
        status: "healthy".to_string(),
        model: analyzer.model_name().to_string(),
        api_key_configured: config.api_key_configured,
        time: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
    })
}
