// src/cv_analysis/prompt.rs
use crate::utils::truncate_chars;

pub const DEFAULT_MAX_CV_CHARS: usize = 40_000;
pub const TRUNCATION_MARKER: &str = "\n\n[TRUNCATED]";

/// Top-level keys the model is asked to return.
pub const ANALYSIS_KEYS: &[&str] = &[
    "skills_summary",
    "experience_level",
    "career_recommendations",
    "cv_improvement_feedback",
    "skills_gap_analysis",
    "action_plan",
];

const COUNSELOR_INSTRUCTIONS: &str = r#"You are a career counselor reviewing a CV. Read it carefully and give a complete, practical assessment.

CV:
{cv_text}

Career interests stated by the candidate: {interests}

Cover the following:

SKILLS SUMMARY: group the skills you find (technical, soft skills, tools, languages).

EXPERIENCE LEVEL: place the candidate as Junior (0-2 years), Mid-level (3-5 years), Senior (6-10 years) or Executive (10+ years) and explain the placement.

CAREER RECOMMENDATIONS: three concrete roles that suit this profile. For each give the job title, why it fits, a typical salary range where one applies, and the growth potential.

CV IMPROVEMENT FEEDBACK: what works, what is missing or unclear, layout advice, content advice, and keywords that help with applicant tracking systems.

SKILLS GAP ANALYSIS: three to five skills to build for the target roles, each with why it matters and how to acquire it (courses, certifications, practice).

ACTION PLAN: a three-month plan of steps the candidate can start on right away.

Be specific, encouraging and constructive."#;

/// Keep at most `max_chars` characters of CV text, marking the cut.
pub fn prepare_cv_text(cv_text: &str, max_chars: usize) -> String {
    let kept = truncate_chars(cv_text, max_chars);
    if kept.len() == cv_text.len() {
        cv_text.to_string()
    } else {
        format!("{}{}", kept, TRUNCATION_MARKER)
    }
}

pub fn build_prompt(cv_text: &str, interests: &str) -> String {
    let body = fill_placeholders(
        COUNSELOR_INSTRUCTIONS,
        &[("{cv_text}", cv_text), ("{interests}", interests)],
    );
    format!("{}\n\n{}", body, json_instructions())
}

/// Substitute placeholders in one pass over the template, so inserted
/// values are never scanned again.
fn fill_placeholders(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match values.iter().find(|(name, _)| tail.starts_with(name)) {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn json_instructions() -> String {
    let keys = ANALYSIS_KEYS
        .iter()
        .map(|key| format!("- {}", key))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "IMPORTANT: reply with one valid JSON object and nothing else (no commentary, no code fences).\n\
         The object must have exactly these top-level keys:\n{}\n\
         Use lists and nested objects inside each key so the result can be parsed programmatically.",
        keys
    )
}
