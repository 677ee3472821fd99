// src/web/mod.rs
pub mod handlers;
pub mod types;

pub use handlers::*;
pub use types::*;

use crate::app_log;
use crate::core::config_manager::{ConfigManager, ServerSettings};
use crate::cv_analysis::{AnalysisReport, CareerAnalyzer, GeminiClient};
use anyhow::Result;
use rocket::data::{Limits, ToByteUnit};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::figment::Figment;
use rocket::form::Form;
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, routes, Build, Request, Response, Rocket, State};
use std::sync::Arc;

/// Echoes the request origin back when it is on the allow list.
pub struct Cors {
    allowed_origins: Vec<String>,
}

impl Cors {
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins }
    }

    fn allows(&self, origin: &str) -> bool {
        self.allowed_origins
            .iter()
            .any(|allowed| allowed == "*" || allowed == origin)
    }
}

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let Some(origin) = request.headers().get_one("Origin") else {
            return;
        };
        if !self.allows(origin) {
            return;
        }

        let allow_headers = request
            .headers()
            .get_one("Access-Control-Request-Headers")
            .unwrap_or("*")
            .to_string();

        response.set_header(Header::new("Access-Control-Allow-Origin", origin.to_string()));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, PATCH, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", allow_headers));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
        response.set_header(Header::new("Vary", "Origin"));
    }
}

#[get("/")]
pub async fn root() -> Json<RootInfo> {
    handlers::root_handler().await
}

#[get("/health")]
pub async fn health(
    config: &State<ServerConfig>,
    analyzer: &State<CareerAnalyzer>,
) -> Json<HealthResponse> {
    handlers::health_handler(config, analyzer).await
}

#[post("/analyze-cv", data = "<upload>")]
pub async fn analyze_cv(
    upload: Form<CvUploadForm<'_>>,
    analyzer: &State<CareerAnalyzer>,
) -> Result<Json<AnalysisReport>, ApiError> {
    handlers::analyze_cv_file_handler(upload, analyzer).await
}

#[post("/analyze-cv-base64", data = "<upload>")]
pub async fn analyze_cv_base64(
    upload: Form<Base64UploadForm>,
    analyzer: &State<CareerAnalyzer>,
) -> Result<Json<AnalysisReport>, ApiError> {
    handlers::analyze_cv_base64_handler(upload, analyzer).await
}

#[post("/analyze-cv-text", data = "<request>")]
pub async fn analyze_cv_text(
    request: Json<TextAnalysisRequest>,
    analyzer: &State<CareerAnalyzer>,
) -> Result<Json<AnalysisReport>, ApiError> {
    handlers::analyze_cv_text_handler(request, analyzer).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
    ))
}

#[rocket::catch(404)]
pub fn not_found(request: &Request<'_>) -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        format!("No route for {} {}", request.method(), request.uri()),
        "NOT_FOUND".to_string(),
        vec!["GET / lists the available endpoints".to_string()],
    ))
}

#[rocket::catch(413)]
pub fn payload_too_large(request: &Request<'_>) -> Json<StandardErrorResponse> {
    let limit_mb = request
        .rocket()
        .state::<ServerConfig>()
        .map(|config| crate::utils::megabytes(config.max_upload_bytes))
        .unwrap_or_default();

    Json(StandardErrorResponse::new(
        format!("File too large (> {:.0} MB)", limit_mb),
        "FILE_TOO_LARGE".to_string(),
        vec![
            "Compress your CV file".to_string(),
            "Paste the CV text into /analyze-cv-text instead".to_string(),
        ],
    ))
}

#[rocket::catch(422)]
pub fn unprocessable_entity() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body is missing fields or has the wrong types".to_string(),
        "UNPROCESSABLE_ENTITY".to_string(),
        vec![
            "/analyze-cv expects multipart fields 'file' and optional 'interests'".to_string(),
            "/analyze-cv-base64 expects 'file_data' and 'filename'".to_string(),
            "/analyze-cv-text expects JSON with 'cv_text'".to_string(),
        ],
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
    ))
}

/// Rocket limits sized for CV uploads. Base64 bodies grow by a third, so
/// form limits get twice the file limit.
pub fn upload_limits(max_upload_bytes: u64) -> Limits {
    let form_bytes = max_upload_bytes.saturating_mul(2);
    Limits::default()
        .limit("file", max_upload_bytes.bytes())
        .limit("data-form", form_bytes.bytes())
        .limit("form", form_bytes.bytes())
        .limit("string", form_bytes.bytes())
        .limit("json", max_upload_bytes.bytes())
}

/// Assemble the API without launching it.
pub fn build_rocket(
    figment: Figment,
    settings: &ServerSettings,
    analyzer: CareerAnalyzer,
    api_key_configured: bool,
) -> Rocket<Build> {
    let server_config = ServerConfig {
        api_key_configured,
        max_upload_bytes: settings.max_upload_bytes(),
    };

    let figment = figment.merge(("limits", upload_limits(server_config.max_upload_bytes)));

    rocket::custom(figment)
        .attach(Cors::new(settings.allowed_origins.clone()))
        .manage(server_config)
        .manage(analyzer)
        .register(
            "/",
            catchers![
                bad_request,
                not_found,
                payload_too_large,
                unprocessable_entity,
                internal_error
            ],
        )
        .mount(
            "/",
            routes![
                root,
                health,
                analyze_cv,
                analyze_cv_base64,
                analyze_cv_text,
                options,
            ],
        )
}

pub async fn start_web_server(config: ConfigManager) -> Result<()> {
    let api_key = config.gemini.require_api_key()?.to_string();
    let client = GeminiClient::new(config.gemini.api_url.clone(), api_key, config.gemini.model.clone())?;
    let analyzer = CareerAnalyzer::new(Arc::new(client), config.server.max_cv_chars);

    app_log!(info, "Starting MuseCareer API server");
    app_log!(info, "Environment: {}", config.environment);
    app_log!(info, "Model: {}", config.gemini.model);
    app_log!(info, "Allowed origins: {}", config.server.allowed_origins.join(", "));
    app_log!(info, "Server: http://0.0.0.0:{}", config.server.port);

    let figment = rocket::Config::figment()
        .merge(("port", config.server.port))
        .merge(("address", "0.0.0.0"));

    build_rocket(figment, &config.server, analyzer, true)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Rocket server failed: {}", e))?;

    Ok(())
}
