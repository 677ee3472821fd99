// src/web/handlers/analysis_handlers.rs
use crate::cv_analysis::{AnalysisReport, CareerAnalyzer};
use crate::error::AnalysisError;
use crate::utils::{base_file_name, megabytes};
use crate::web::types::{
    ApiError, Base64UploadForm, CvUploadForm, StandardErrorResponse, TextAnalysisRequest,
};
use crate::app_log;
use rocket::form::Form;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;

pub async fn analyze_cv_file_handler(
    mut upload: Form<CvUploadForm<'_>>,
    analyzer: &State<CareerAnalyzer>,
) -> Result<Json<AnalysisReport>, ApiError> {
    let filename = upload
        .file
        .raw_name()
        .map(|name| name.dangerous_unsafe_unsanitized_raw().as_str())
        .map(base_file_name)
        .filter(|name| !name.trim().is_empty())
        .map(str::to_string);

    let Some(filename) = filename else {
        return Err(StandardErrorResponse::new(
            "No file provided".to_string(),
            "NO_FILE".to_string(),
            vec!["Attach the CV in the 'file' form field".to_string()],
        )
        .with_status(Status::BadRequest));
    };

    app_log!(
        info,
        "Received CV upload {} ({:.2} MB)",
        filename,
        megabytes(upload.file.len())
    );

    let bytes = read_upload(&mut upload).await?;
    let interests = upload.interests.clone().unwrap_or_default();

    analyzer
        .analyze_document(&filename, bytes, &interests)
        .await
        .map(Json)
        .map_err(analysis_error_response)
}

/// Move the upload to a scratch file and read it back; small uploads are
/// buffered in memory by Rocket and have no path of their own.
async fn read_upload(upload: &mut Form<CvUploadForm<'_>>) -> Result<Vec<u8>, ApiError> {
    let temp_path = std::env::temp_dir().join(format!("cv_upload_{}", uuid::Uuid::new_v4()));

    if let Err(e) = upload.file.persist_to(&temp_path).await {
        app_log!(error, "Failed to save uploaded file: {}", e);
        return Err(StandardErrorResponse::new(
            format!("An error occurred: {}", e),
            "FILE_SAVE_ERROR".to_string(),
            vec!["Try uploading the file again".to_string()],
        )
        .with_status(Status::InternalServerError));
    }

    let read = tokio::fs::read(&temp_path).await;
    if let Err(e) = tokio::fs::remove_file(&temp_path).await {
        app_log!(warn, "Failed to remove temp file {}: {}", temp_path.display(), e);
    }

    read.map_err(|e| {
        app_log!(error, "Failed to read uploaded file: {}", e);
        StandardErrorResponse::new(
            format!("An error occurred: {}", e),
            "FILE_READ_ERROR".to_string(),
            vec!["Try uploading the file again".to_string()],
        )
        .with_status(Status::InternalServerError)
    })
}

pub async fn analyze_cv_base64_handler(
    upload: Form<Base64UploadForm>,
    analyzer: &State<CareerAnalyzer>,
) -> Result<Json<AnalysisReport>, ApiError> {
    let upload = upload.into_inner();
    let filename = base_file_name(&upload.filename).to_string();

    app_log!(
        info,
        "Received base64 CV {} ({} encoded chars)",
        filename,
        upload.file_data.len()
    );

    analyzer
        .analyze_base64(
            &filename,
            &upload.file_data,
            upload.interests.as_deref().unwrap_or_default(),
        )
        .await
        .map(Json)
        .map_err(analysis_error_response)
}

pub async fn analyze_cv_text_handler(
    request: Json<TextAnalysisRequest>,
    analyzer: &State<CareerAnalyzer>,
) -> Result<Json<AnalysisReport>, ApiError> {
    let request = request.into_inner();

    app_log!(
        info,
        "Received pasted CV text ({} chars)",
        request.cv_text.chars().count()
    );

    analyzer
        .analyze_text(
            &request.filename,
            &request.cv_text,
            request.interests.as_deref().unwrap_or_default(),
        )
        .await
        .map(Json)
        .map_err(analysis_error_response)
}

/// Caller mistakes become 400, model failures 502.
pub fn analysis_error_response(error: AnalysisError) -> ApiError {
    let status = if error.is_client_error() {
        app_log!(warn, "Rejected analysis request: {}", error);
        Status::BadRequest
    } else {
        app_log!(error, "Model error: {}", error);
        Status::BadGateway
    };

    StandardErrorResponse::new(
        error.to_string(),
        error.code().to_string(),
        suggestions_for(&error),
    )
    .with_status(status)
}

fn suggestions_for(error: &AnalysisError) -> Vec<String> {
    let suggestions: &[&str] = match error.code() {
        "INVALID_FORMAT" => &["Upload a PDF (.pdf)", "Upload a Word document (.docx)", "Upload a text file (.txt)"],
        "UNREADABLE_FILE" => &["Check that the file opens locally", "Export the CV again and retry"],
        "INSUFFICIENT_TEXT" => &[
            "Scanned PDFs contain no text; export a text-based PDF",
            "Paste the CV text into /analyze-cv-text instead",
        ],
        "TEXT_TOO_SHORT" => &["Paste the full CV text"],
        "INVALID_BASE64" => &["Send the file content encoded with standard base64"],
        _ => &["Try again in a few moments", "Contact support if the problem persists"],
    };
    suggestions.iter().map(|s| s.to_string()).collect()
}
