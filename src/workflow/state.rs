// src/workflow/state.rs
use super::host::SessionStore;
use super::navigator::PageCursor;
use super::transformer::{
    normalize, normalize_recommendations, Normalized, NormalizedResult, RawAnalysis,
    Recommendation,
};
use super::validation::DEFAULT_MAX_FILE_BYTES;
use serde::Serialize;
use serde_json::Value;
use std::num::NonZeroU8;

pub const PROCESSING_KEY: &str = "is_processing";
pub const ANALYSIS_KEY: &str = "analysis_data";

pub const DEFAULT_TOTAL_PAGES: NonZeroU8 = match NonZeroU8::new(4) {
    Some(pages) => pages,
    None => unreachable!(),
};

/// How the results view lays out an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ResultLayout {
    /// Summary, skills gap, course match and domain fit.
    #[default]
    Profile,
    /// One career recommendation per page.
    Recommendations,
}

#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub max_file_bytes: u64,
    pub total_pages: NonZeroU8,
    pub layout: ResultLayout,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            total_pages: DEFAULT_TOTAL_PAGES,
            layout: ResultLayout::Profile,
        }
    }
}

impl WorkflowConfig {
    pub fn normalize(&self, raw: impl Into<RawAnalysis>) -> Normalized<AnalysisData> {
        match self.layout {
            ResultLayout::Profile => normalize(raw).map(AnalysisData::Profile),
            ResultLayout::Recommendations => {
                normalize_recommendations(raw, usize::from(self.total_pages.get()))
                    .map(AnalysisData::Recommendations)
            }
        }
    }
}

/// What gets stored under [`ANALYSIS_KEY`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AnalysisData {
    Profile(NormalizedResult),
    Recommendations(Vec<Recommendation>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPage {
    pub title: String,
    pub lines: Vec<String>,
}

impl ResultPage {
    fn new(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            lines,
        }
    }
}

impl AnalysisData {
    /// Content of the results page under `cursor`. Pages past the available
    /// content come back empty.
    pub fn page(&self, cursor: PageCursor) -> ResultPage {
        match self {
            Self::Profile(result) => match cursor.index() {
                0 => ResultPage::new("Summary", result.summary.iter().cloned().collect()),
                1 => ResultPage::new("Skills Gap", result.skills_gap.clone()),
                2 => ResultPage::new("Course Match", result.course_match.clone()),
                3 => ResultPage::new("Domain Fit", result.domain_fit.iter().cloned().collect()),
                _ => ResultPage::new(format!("Page {}", cursor), Vec::new()),
            },
            Self::Recommendations(recommendations) => {
                let title = format!("Recommendation {}", cursor);
                let Some(rec) = recommendations.get(cursor.index()) else {
                    return ResultPage::new(title, Vec::new());
                };
                let lines = [
                    rec.title.as_ref(),
                    rec.rationale.as_ref(),
                    rec.salary_range.as_ref(),
                    rec.growth_potential.as_ref(),
                ]
                .into_iter()
                .zip(["Role", "Why", "Salary", "Growth"])
                .filter_map(|(value, label)| value.map(|v| format!("{}: {}", label, v)))
                .collect();
                ResultPage::new(title, lines)
            }
        }
    }
}

/// Page-session state the handlers read and change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageState {
    pub processing: bool,
    pub page: PageCursor,
    pub analysis: Option<AnalysisData>,
}

impl PageState {
    pub fn publish_processing(&self, store: &mut dyn SessionStore) {
        store.set(PROCESSING_KEY, Value::Bool(self.processing));
    }

    pub fn publish_analysis(&self, store: &mut dyn SessionStore) {
        match self.analysis.as_ref().map(serde_json::to_value) {
            Some(Ok(value)) => store.set(ANALYSIS_KEY, value),
            Some(Err(e)) => {
                crate::app_log!(error, "Failed to serialize analysis for the session store: {}", e);
                store.clear(ANALYSIS_KEY);
            }
            None => store.clear(ANALYSIS_KEY),
        }
    }
}
