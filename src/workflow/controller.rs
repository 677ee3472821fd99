// src/workflow/controller.rs
use super::host::{
    AnalysisInvoker, AttachmentSource, MemoryAttachments, MemoryStore, MemoryText, MemoryView,
    NoticeLevel, Notifier, PageView, SessionStore, SubmissionInput, TextSource,
};
use super::navigator::{self, PageCursor};
use super::state::{AnalysisData, PageState, WorkflowConfig};
use super::transformer::Normalized;
use super::validation::{validate_selected_file, validate_submission};
use crate::error::{FileRejection, TransportError, ValidationError};
use crate::{app_log, app_span};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::Instrument;

pub const SUCCESS_MESSAGE: &str = "AI Analysis Complete!";
pub const RESET_MESSAGE: &str = "Form has been reset";
pub const IN_FLIGHT_MESSAGE: &str = "An analysis is already running. Please wait for it to finish.";

/// Widgets, store and state of one open page.
pub struct PageSession {
    pub attachments: Box<dyn AttachmentSource>,
    pub text: Box<dyn TextSource>,
    pub store: Box<dyn SessionStore>,
    pub view: Box<dyn PageView>,
    pub state: PageState,
}

pub type SessionHandle = Arc<Mutex<PageSession>>;

impl PageSession {
    pub fn new(
        attachments: Box<dyn AttachmentSource>,
        text: Box<dyn TextSource>,
        store: Box<dyn SessionStore>,
        view: Box<dyn PageView>,
    ) -> Self {
        Self {
            attachments,
            text,
            store,
            view,
            state: PageState::default(),
        }
    }

    pub fn in_memory(attachments: MemoryAttachments, text: MemoryText) -> Self {
        Self::new(
            Box::new(attachments),
            Box::new(text),
            Box::<MemoryStore>::default(),
            Box::<MemoryView>::default(),
        )
    }

    pub fn into_handle(self) -> SessionHandle {
        Arc::new(Mutex::new(self))
    }

    /// Snapshot of what the form currently holds.
    pub fn current_input(&self) -> SubmissionInput {
        SubmissionInput {
            file: self.attachments.selected().into_iter().next(),
            free_text: self.text.value(),
        }
    }

    pub fn stored(&self, key: &str) -> Option<Value> {
        self.store.get(key)
    }

    fn show_page(&mut self, cursor: PageCursor) {
        self.state.page = cursor;
        self.view.set_page(cursor.get());
    }

    fn store_analysis(&mut self, analysis: Option<AnalysisData>) {
        self.state.analysis = analysis;
        self.state.publish_analysis(self.store.as_mut());
    }

    fn set_processing(&mut self, processing: bool) {
        self.state.processing = processing;
        self.state.publish_processing(self.store.as_mut());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Input failed validation; nothing was sent.
    Rejected(ValidationError),
    /// Another submission on this page has not finished yet.
    InFlight,
    /// The call succeeded and its normalized result was stored.
    Stored(Normalized<AnalysisData>),
    /// The call failed; previously stored results were kept.
    Failed(TransportError),
}

/// Clears the processing flag if a submission is dropped mid-call.
struct ProcessingGuard {
    session: SessionHandle,
    armed: bool,
}

impl ProcessingGuard {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Ok(mut page) = self.session.try_lock() {
            page.set_processing(false);
            return;
        }
        // Another handler holds the page; clear the flag once it lets go.
        let session = Arc::clone(&self.session);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    session.lock().await.set_processing(false);
                });
            }
            Err(_) => app_log!(
                warn,
                "Submission dropped outside a runtime while the page was locked; processing flag left set"
            ),
        }
    }
}

/// Event handlers of the analysis page.
#[derive(Clone)]
pub struct SubmissionController {
    invoker: Arc<dyn AnalysisInvoker>,
    notifier: Arc<dyn Notifier>,
    config: WorkflowConfig,
}

impl SubmissionController {
    pub fn new(
        invoker: Arc<dyn AnalysisInvoker>,
        notifier: Arc<dyn Notifier>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            invoker,
            notifier,
            config,
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// File-picker change: give early feedback on the picked file.
    pub async fn on_file_selected(&self, session: &SessionHandle) -> Result<(), FileRejection> {
        let page = session.lock().await;
        let selected = page.attachments.selected();
        let result = validate_selected_file(selected.first(), self.config.max_file_bytes);
        if let Err(rejection) = &result {
            app_log!(info, "Selected file rejected: {}", rejection);
            self.notifier.notify(&rejection.to_string(), NoticeLevel::Error);
        }
        result
    }

    /// Submit whatever the form currently holds.
    pub async fn submit_form(&self, session: &SessionHandle) -> SubmitOutcome {
        let input = session.lock().await.current_input();
        self.submit(session, input).await
    }

    pub async fn submit(&self, session: &SessionHandle, input: SubmissionInput) -> SubmitOutcome {
        let span = app_span!(
            "cv_submission",
            filename = %input.file.as_ref().map(|f| f.name.as_str()).unwrap_or("-")
        );
        self.run_submission(session, input).instrument(span).await
    }

    async fn run_submission(&self, session: &SessionHandle, input: SubmissionInput) -> SubmitOutcome {
        {
            let mut page = session.lock().await;

            if let Err(e) = validate_submission(&input, self.config.max_file_bytes) {
                app_log!(info, "Submission rejected: {}", e);
                self.notifier.notify(&e.to_string(), NoticeLevel::Error);
                return SubmitOutcome::Rejected(e);
            }

            if page.state.processing {
                app_log!(warn, "Submission ignored: another analysis is in flight");
                self.notifier.notify(IN_FLIGHT_MESSAGE, NoticeLevel::Error);
                return SubmitOutcome::InFlight;
            }

            page.set_processing(true);
            page.show_page(navigator::reset());
        }

        let guard = ProcessingGuard {
            session: Arc::clone(session),
            armed: true,
        };

        app_log!(info, "Calling analysis service");
        let result = self.invoker.run(&input).await.and_then(|response| {
            if response.is_success() {
                Ok(response.body)
            } else {
                Err(TransportError::Status {
                    status: response.status,
                    detail: error_detail(&response.body),
                })
            }
        });

        let mut page = session.lock().await;
        let outcome = match result {
            Ok(body) => {
                let normalized = self.config.normalize(body);
                if let Some(reason) = normalized.reason() {
                    app_log!(warn, "Stored an empty analysis: {}", reason);
                }
                page.store_analysis(Some(normalized.value().clone()));
                self.notifier.notify(SUCCESS_MESSAGE, NoticeLevel::Success);
                SubmitOutcome::Stored(normalized)
            }
            Err(e) => {
                app_log!(error, "Analysis call failed: {}", e);
                self.notifier
                    .notify(&format!("AI Analysis Failed: {}", e), NoticeLevel::Error);
                SubmitOutcome::Failed(e)
            }
        };

        page.set_processing(false);
        guard.disarm();
        outcome
    }

    /// Move the results view one page forward, wrapping at the end.
    pub async fn next_page(&self, session: &SessionHandle) -> PageCursor {
        let mut page = session.lock().await;
        let next = navigator::advance(page.state.page, self.config.total_pages);
        page.show_page(next);
        next
    }

    /// Put the form and the results back to their initial state.
    pub async fn reset_all(&self, session: &SessionHandle) {
        let mut page = session.lock().await;

        if let Err(e) = page.attachments.clear() {
            app_log!(warn, "Could not clear file selection: {}", e);
        }
        page.text.clear();
        page.store_analysis(None);
        page.show_page(navigator::reset());

        self.notifier.notify(RESET_MESSAGE, NoticeLevel::Success);
    }
}

/// Pull a readable reason out of an error body from the analysis API.
fn error_detail(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|value| {
            ["detail", "error", "message"]
                .iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str))
        })
        .map(str::to_string)
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "no response body".to_string()
            } else {
                crate::utils::truncate_chars(trimmed, 200).to_string()
            }
        })
}
