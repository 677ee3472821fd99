use base64::Engine;
use muse_career::core::config_manager::ServerSettings;
use muse_career::cv_analysis::{AnalysisReport, CareerAnalyzer, ModelBackend};
use muse_career::error::ModelError;
use muse_career::web::{build_rocket, HealthResponse, RootInfo, StandardErrorResponse};
use rocket::http::{ContentType, Header, Status};
use rocket::local::asynchronous::Client;
use std::sync::Arc;

const CV_TEXT: &str = "Jane Doe\nSoftware engineer with six years of Rust, Go and PostgreSQL experience.";
const BOUNDARY: &str = "X-MUSECAREER-BOUNDARY";

struct FakeModel {
    reply: Option<&'static str>,
}

#[rocket::async_trait]
impl ModelBackend for FakeModel {
    fn model_name(&self) -> &str {
        "fake-model"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, ModelError> {
        self.reply.map(str::to_string).ok_or(ModelError::Status {
            status: 429,
            body: "quota exceeded".to_string(),
        })
    }
}

async fn client_with(reply: Option<&'static str>) -> Client {
    let analyzer = CareerAnalyzer::new(Arc::new(FakeModel { reply }), 40_000);
    let rocket = build_rocket(
        rocket::Config::figment(),
        &ServerSettings::default(),
        analyzer,
        true,
    );
    Client::tracked(rocket).await.expect("valid rocket instance")
}

async fn client() -> Client {
    client_with(Some(r#"{ "skills_summary": ["Rust", "Go"] }"#)).await
}

fn multipart(filename: &str, content: &[u8], interests: &str) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            b = BOUNDARY,
            f = filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(
        format!(
            "\r\n--{b}\r\nContent-Disposition: form-data; name=\"interests\"\r\n\r\n{i}\r\n--{b}--\r\n",
            b = BOUNDARY,
            i = interests
        )
        .as_bytes(),
    );
    body
}

fn multipart_type() -> ContentType {
    ContentType::new("multipart", "form-data").with_params(("boundary", BOUNDARY))
}

fn form_encode(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('+', "%2B")
        .replace('/', "%2F")
        .replace('=', "%3D")
        .replace('&', "%26")
        .replace(' ', "%20")
}

#[rocket::async_test]
async fn test_root_lists_endpoints() {
    let client = client().await;
    let response = client.get("/").dispatch().await;

    assert_eq!(response.status(), Status::Ok);
    let info: RootInfo = response.into_json().await.unwrap();
    assert_eq!(info.message, "MuseCareer API");
    assert_eq!(info.endpoints.analyze_cv_file, "/analyze-cv (POST)");
}

#[rocket::async_test]
async fn test_health_reports_model() {
    let client = client().await;
    let response = client.get("/health").dispatch().await;

    assert_eq!(response.status(), Status::Ok);
    let health: HealthResponse = response.into_json().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.model, "fake-model");
    assert!(health.api_key_configured);
    assert!(health.time.ends_with('Z'));
}

#[rocket::async_test]
async fn test_text_analysis() {
    let client = client().await;
    let response = client
        .post("/analyze-cv-text")
        .header(ContentType::JSON)
        .body(format!(r#"{{"cv_text": {:?}, "interests": "backend"}}"#, CV_TEXT))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    let report: AnalysisReport = response.into_json().await.unwrap();
    assert!(report.success);
    assert_eq!(report.filename, "manual_input.txt");
    assert_eq!(report.analysis, r#"{"skills_summary":["Rust","Go"]}"#);
    assert_eq!(report.model, "fake-model");
    assert_eq!(report.extracted_text_length, CV_TEXT.chars().count());
}

#[rocket::async_test]
async fn test_short_text_is_rejected() {
    let client = client().await;
    let response = client
        .post("/analyze-cv-text")
        .header(ContentType::JSON)
        .body(r#"{"cv_text": "   too short   "}"#)
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::BadRequest);
    let error: StandardErrorResponse = response.into_json().await.unwrap();
    assert!(!error.success);
    assert_eq!(error.error, "Please provide at least 50 characters of CV text");
    assert_eq!(error.error_code, "TEXT_TOO_SHORT");
}

#[rocket::async_test]
async fn test_missing_json_field_uses_catcher() {
    let client = client().await;
    let response = client
        .post("/analyze-cv-text")
        .header(ContentType::JSON)
        .body(r#"{"filename": "cv.txt"}"#)
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::UnprocessableEntity);
    let error: StandardErrorResponse = response.into_json().await.unwrap();
    assert_eq!(error.error_code, "UNPROCESSABLE_ENTITY");
}

#[rocket::async_test]
async fn test_file_upload() {
    let client = client().await;
    let response = client
        .post("/analyze-cv")
        .header(multipart_type())
        .body(multipart("cv.txt", CV_TEXT.as_bytes(), "platform engineering"))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    let report: AnalysisReport = response.into_json().await.unwrap();
    assert_eq!(report.filename, "cv.txt");
    assert_eq!(report.extracted_text_length, CV_TEXT.chars().count());
}

#[rocket::async_test]
async fn test_unsupported_upload_format() {
    let client = client().await;
    let response = client
        .post("/analyze-cv")
        .header(multipart_type())
        .body(multipart("photo.png", b"\x89PNG not a cv", ""))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::BadRequest);
    let error: StandardErrorResponse = response.into_json().await.unwrap();
    assert_eq!(error.error_code, "INVALID_FORMAT");
    assert_eq!(
        error.error,
        "Unsupported file format. Please upload PDF, DOCX, or TXT"
    );
}

#[rocket::async_test]
async fn test_upload_without_enough_text() {
    let client = client().await;
    let response = client
        .post("/analyze-cv")
        .header(multipart_type())
        .body(multipart("cv.txt", b"Jane Doe", ""))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::BadRequest);
    let error: StandardErrorResponse = response.into_json().await.unwrap();
    assert_eq!(error.error_code, "INSUFFICIENT_TEXT");
}

#[rocket::async_test]
async fn test_base64_upload() {
    let client = client().await;
    let encoded = base64::engine::general_purpose::STANDARD.encode(CV_TEXT);
    let response = client
        .post("/analyze-cv-base64")
        .header(ContentType::Form)
        .body(format!(
            "file_data={}&filename=cv.txt&interests=data",
            form_encode(&encoded)
        ))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    let report: AnalysisReport = response.into_json().await.unwrap();
    assert_eq!(report.filename, "cv.txt");
}

#[rocket::async_test]
async fn test_invalid_base64() {
    let client = client().await;
    let response = client
        .post("/analyze-cv-base64")
        .header(ContentType::Form)
        .body("file_data=%25%25%25not%20base64&filename=cv.pdf")
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::BadRequest);
    let error: StandardErrorResponse = response.into_json().await.unwrap();
    assert!(error.error.starts_with("Invalid base64 data"));
    assert_eq!(error.error_code, "INVALID_BASE64");
}

#[rocket::async_test]
async fn test_model_failure_is_bad_gateway() {
    let client = client_with(None).await;
    let response = client
        .post("/analyze-cv-text")
        .header(ContentType::JSON)
        .body(format!(r#"{{"cv_text": {:?}}}"#, CV_TEXT))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::BadGateway);
    let error: StandardErrorResponse = response.into_json().await.unwrap();
    assert!(error.error.starts_with("Upstream AI error:"));
    assert_eq!(error.error_code, "UPSTREAM_AI_ERROR");
}

#[rocket::async_test]
async fn test_unknown_route_uses_catcher() {
    let client = client().await;
    let response = client.get("/nope").dispatch().await;

    assert_eq!(response.status(), Status::NotFound);
    let error: StandardErrorResponse = response.into_json().await.unwrap();
    assert_eq!(error.error_code, "NOT_FOUND");
}

#[rocket::async_test]
async fn test_cors_echoes_allowed_origin_only() {
    let client = client().await;

    let allowed = client
        .options("/analyze-cv")
        .header(Header::new("Origin", "http://localhost:3000"))
        .dispatch()
        .await;
    assert_eq!(allowed.status(), Status::Ok);
    assert_eq!(
        allowed.headers().get_one("Access-Control-Allow-Origin"),
        Some("http://localhost:3000")
    );
    assert_eq!(
        allowed.headers().get_one("Access-Control-Allow-Credentials"),
        Some("true")
    );

    let denied = client
        .get("/health")
        .header(Header::new("Origin", "https://elsewhere.test"))
        .dispatch()
        .await;
    assert_eq!(denied.headers().get_one("Access-Control-Allow-Origin"), None);
}
