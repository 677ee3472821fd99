// src/cv_analysis/mod.rs
use crate::error::AnalysisError;
use crate::{app_log, app_span};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::Instrument;

pub mod extractor;
pub mod gemini;
pub mod prompt;

pub use extractor::{DocumentKind, MIN_CV_TEXT_CHARS};
pub use gemini::{GeminiClient, ModelBackend};

/// Result of analyzing one CV, as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub success: bool,
    pub filename: String,
    /// Compact JSON when the model produced JSON, its raw text otherwise.
    pub analysis: String,
    pub model: String,
    pub extracted_text_length: usize,
}

#[derive(Clone)]
pub struct CareerAnalyzer {
    backend: Arc<dyn ModelBackend>,
    max_cv_chars: usize,
}

impl CareerAnalyzer {
    pub fn new(backend: Arc<dyn ModelBackend>, max_cv_chars: usize) -> Self {
        Self {
            backend,
            max_cv_chars,
        }
    }

    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    /// Run the model over CV text. JSON output is re-serialized compactly;
    /// anything else is passed through so the client can still show it.
    pub async fn analyze(&self, cv_text: &str, interests: &str) -> Result<String, AnalysisError> {
        let cv_text = prompt::prepare_cv_text(cv_text, self.max_cv_chars);
        let prompt = prompt::build_prompt(&cv_text, interests);

        let output = self.backend.generate(&prompt).await?;

        match serde_json::from_str::<serde_json::Value>(&output) {
            Ok(parsed) => Ok(parsed.to_string()),
            Err(_) => {
                app_log!(
                    warn,
                    "Model returned non-JSON output; passing raw text through: {}",
                    crate::utils::truncate_chars(&output, 500)
                );
                Ok(output)
            }
        }
    }

    /// Analyze an uploaded document (PDF, DOCX or TXT).
    pub async fn analyze_document(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        interests: &str,
    ) -> Result<AnalysisReport, AnalysisError> {
        let span = app_span!("cv_document_analysis", filename = %filename, size = bytes.len());
        self.extract_and_report(filename, bytes, interests)
            .instrument(span)
            .await
    }

    async fn extract_and_report(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        interests: &str,
    ) -> Result<AnalysisReport, AnalysisError> {
        let kind = DocumentKind::from_filename(filename)?;
        let cv_text = extractor::extract_text_blocking(bytes, kind).await?;
        extractor::ensure_enough_text(&cv_text)?;

        app_log!(info, "Extracted {} chars from {}", cv_text.chars().count(), filename);
        self.report(filename, &cv_text, interests).await
    }

    /// Analyze a document sent as base64 text.
    pub async fn analyze_base64(
        &self,
        filename: &str,
        file_data: &str,
        interests: &str,
    ) -> Result<AnalysisReport, AnalysisError> {
        let bytes = base64::engine::general_purpose::STANDARD.decode(file_data.trim())?;
        self.analyze_document(filename, bytes, interests).await
    }

    /// Analyze CV text pasted by the user.
    pub async fn analyze_text(
        &self,
        filename: &str,
        cv_text: &str,
        interests: &str,
    ) -> Result<AnalysisReport, AnalysisError> {
        let cv_text = cv_text.trim();
        if cv_text.chars().count() < MIN_CV_TEXT_CHARS {
            return Err(AnalysisError::TextTooShort(MIN_CV_TEXT_CHARS));
        }
        self.report(filename, cv_text, interests).await
    }

    async fn report(
        &self,
        filename: &str,
        cv_text: &str,
        interests: &str,
    ) -> Result<AnalysisReport, AnalysisError> {
        let analysis = self.analyze(cv_text, interests).await?;
        Ok(AnalysisReport {
            success: true,
            filename: filename.to_string(),
            analysis,
            model: self.model_name().to_string(),
            extracted_text_length: cv_text.chars().count(),
        })
    }
}
