// src/core/service_client.rs
//! HTTP client for the analysis API, used as the page's remote analysis call

use crate::app_log;
use crate::error::TransportError;
use crate::utils::cv_content_type;
use crate::workflow::{AnalysisInvoker, InvokerResponse, SubmissionInput};
use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};

pub const ANALYZE_CV_ENDPOINT: &str = "/analyze-cv";
const HEALTH_ENDPOINT: &str = "/health";

pub struct AnalysisServiceClient {
    client: reqwest::Client,
    base_url: String,
}

impl AnalysisServiceClient {
    /// No request timeout is set: the analysis call waits as long as the
    /// service takes.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// GET /health, returning the JSON body
    pub async fn health(&self) -> Result<serde_json::Value> {
        let url = self.url(HEALTH_ENDPOINT);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to GET from {}", url))?;

        let status = response.status();
        if status.is_success() {
            response
                .json()
                .await
                .context("Failed to parse health response")
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            anyhow::bail!("HTTP {} error: {}", status, error_text)
        }
    }

    fn analysis_form(input: &SubmissionInput) -> Result<Form, TransportError> {
        let mut form = Form::new().text("interests", input.free_text.clone());

        if let Some(file) = &input.file {
            let mime = if file.mime_type.is_empty() {
                cv_content_type(&file.name)
            } else {
                file.mime_type.as_str()
            };
            let part = Part::bytes(file.data.clone())
                .file_name(file.name.clone())
                .mime_str(mime)
                .map_err(|e| TransportError::Network(format!("Invalid file type {}: {}", mime, e)))?;
            form = form.part("file", part);
        }

        Ok(form)
    }
}

#[rocket::async_trait]
impl AnalysisInvoker for AnalysisServiceClient {
    async fn run(&self, input: &SubmissionInput) -> Result<InvokerResponse, TransportError> {
        let url = self.url(ANALYZE_CV_ENDPOINT);
        let form = Self::analysis_form(input)?;

        app_log!(info, "Calling CV analysis service: {}", url);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        app_log!(trace, "Response status: {}", status);

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(format!("Failed to read response body: {}", e)))?;

        Ok(InvokerResponse {
            status: status.as_u16(),
            body,
        })
    }
}
