// src/workflow/mod.rs
//! The CV analysis page: validate the form, call the analysis service once,
//! normalize what comes back and page through the results.

pub mod controller;
pub mod host;
pub mod navigator;
pub mod state;
pub mod transformer;
pub mod validation;

pub use controller::{PageSession, SessionHandle, SubmissionController, SubmitOutcome};
pub use host::{
    AnalysisInvoker, Attachment, AttachmentSource, ConsoleNotifier, InvokerResponse,
    MemoryAttachments, MemoryStore, MemoryText, MemoryView, NoticeLevel, NoticeLog, Notifier,
    PageView, SessionStore, SubmissionInput, TextSource,
};
pub use navigator::{advance, reset, PageCursor};
pub use state::{
    AnalysisData, PageState, ResultLayout, ResultPage, WorkflowConfig, ANALYSIS_KEY,
    PROCESSING_KEY,
};
pub use transformer::{
    normalize, normalize_recommendations, Normalized, NormalizedResult, RawAnalysis,
    Recommendation,
};
pub use validation::{validate_selected_file, validate_submission, DEFAULT_MAX_FILE_BYTES};
