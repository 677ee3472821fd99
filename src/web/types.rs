// src/web/types.rs
use rocket::form::FromForm;
use rocket::fs::TempFile;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};

pub const DEFAULT_TEXT_FILENAME: &str = "manual_input.txt";

/// Error half of every analysis route.
pub type ApiError = (Status, Json<StandardErrorResponse>);

/// Managed state shared by the system routes.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub api_key_configured: bool,
    pub max_upload_bytes: u64,
}

#[derive(FromForm)]
pub struct CvUploadForm<'f> {
    pub file: TempFile<'f>,
    pub interests: Option<String>,
}

#[derive(FromForm)]
pub struct Base64UploadForm {
    pub file_data: String,
    pub filename: String,
    pub interests: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct TextAnalysisRequest {
    pub cv_text: String,
    #[serde(default = "default_text_filename")]
    pub filename: String,
    #[serde(default)]
    pub interests: Option<String>,
}

fn default_text_filename() -> String {
    DEFAULT_TEXT_FILENAME.to_string()
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct RootInfo {
    pub message: String,
    pub version: String,
    pub endpoints: EndpointList,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct EndpointList {
    pub health: String,
    pub analyze_cv_file: String,
    pub analyze_cv_text: String,
    pub analyze_cv_base64: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub api_key_configured: bool,
    pub time: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Error,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
}

impl StandardErrorResponse {
    pub fn new(error: String, error_code: String, suggestions: Vec<String>) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
        }
    }

    pub fn with_status(self, status: Status) -> ApiError {
        (status, Json(self))
    }
}
