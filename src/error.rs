// src/error.rs
use std::fmt;
use thiserror::Error;

/// Form inputs the submission workflow requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    CvFile,
    Interests,
}

impl InputField {
    pub fn label(&self) -> &'static str {
        match self {
            Self::CvFile => "a CV file",
            Self::Interests => "your career interests",
        }
    }
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileRejection {
    #[error("No file selected")]
    NoFile,

    #[error("File too large (> {limit_mb} MB)")]
    TooLarge { size: u64, limit_mb: u64 },
}

impl FileRejection {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoFile => "NO_FILE",
            Self::TooLarge { .. } => "FILE_TOO_LARGE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please provide {}", join_fields(.0))]
    MissingFields(Vec<InputField>),

    #[error(transparent)]
    File(#[from] FileRejection),
}

fn join_fields(fields: &[InputField]) -> String {
    fields
        .iter()
        .map(InputField::label)
        .collect::<Vec<_>>()
        .join(" and ")
}

/// The remote analysis call failed before a usable body came back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("{0}")]
    Network(String),

    #[error("Server responded with status {status}: {detail}")]
    Status { status: u16, detail: String },
}

/// A host collaborator could not perform an operation in this environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("{operation} is not supported by this host")]
    Unsupported { operation: &'static str },

    #[error("{0}")]
    Failed(String),
}

/// Why a raw analysis payload could not be mapped onto the result shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedResponse {
    #[error("analysis payload is empty")]
    Empty,

    #[error("analysis payload is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("analysis payload is a JSON {0}, expected an object")]
    NotAnObject(&'static str),
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file format. Please upload PDF, DOCX, or TXT")]
    UnsupportedFormat,

    #[error("Error reading PDF: {0}")]
    Pdf(String),

    #[error("Error reading DOCX: {0}")]
    Docx(String),

    #[error("Text file is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("Could not extract enough text from the CV. Please ensure the file contains readable text.")]
    InsufficientText,

    #[error("Text extraction did not finish: {0}")]
    Interrupted(String),
}

impl ExtractionError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat => "INVALID_FORMAT",
            Self::Pdf(_) | Self::Docx(_) | Self::Encoding(_) | Self::Interrupted(_) => {
                "UNREADABLE_FILE"
            }
            Self::InsufficientText => "INSUFFICIENT_TEXT",
        }
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model call failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Model call failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("AI service returned no response text")]
    EmptyResponse,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{0}")]
    Extraction(#[from] ExtractionError),

    #[error("Please provide at least {0} characters of CV text")]
    TextTooShort(usize),

    #[error("Invalid base64 data: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Upstream AI error: {0}")]
    Model(#[from] ModelError),
}

impl AnalysisError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Extraction(e) => e.code(),
            Self::TextTooShort(_) => "TEXT_TOO_SHORT",
            Self::InvalidBase64(_) => "INVALID_BASE64",
            Self::Model(_) => "UPSTREAM_AI_ERROR",
        }
    }

    /// Whether the caller sent something unusable, as opposed to the model failing.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Model(_))
    }
}
