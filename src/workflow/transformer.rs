// src/workflow/transformer.rs
//! Turns whatever the analysis service sent back into the fixed record the
//! results view renders. Never fails: unusable payloads come back as an empty
//! record paired with the reason.

use crate::app_log;
use crate::error::MalformedResponse;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const SUMMARY_KEYS: &[&str] = &["summary", "key_summary", "skills_summary", "profile_summary"];
const SKILLS_GAP_KEYS: &[&str] = &[
    "skills_gap",
    "gaps_identified",
    "skills_gap_analysis",
    "skill_gaps",
];
const COURSE_MATCH_KEYS: &[&str] = &[
    "course_match",
    "course_matches",
    "recommended_courses",
    "courses",
];
const DOMAIN_FIT_KEYS: &[&str] = &["domain_fit", "career_fit", "experience_level"];
const RECOMMENDATION_KEYS: &[&str] = &["career_recommendations", "recommendations"];

// List items that are objects are shown by their first name-like field.
const LABEL_KEYS: &[&str] = &["skill", "skill_name", "name", "title", "course", "course_name"];

const TITLE_KEYS: &[&str] = &["job_title", "title", "role", "name"];
const RATIONALE_KEYS: &[&str] = &["why_good_fit", "why_its_a_good_fit", "why", "reason", "rationale"];
const SALARY_KEYS: &[&str] = &["typical_salary_range", "salary_range", "salary"];
const GROWTH_KEYS: &[&str] = &["growth_potential", "growth"];

/// Analysis payload as received: a response body, or JSON the host already parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum RawAnalysis {
    Text(String),
    Json(Value),
}

impl From<&str> for RawAnalysis {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for RawAnalysis {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Value> for RawAnalysis {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedResult {
    pub summary: Option<String>,
    pub skills_gap: Vec<String>,
    pub course_match: Vec<String>,
    pub domain_fit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: Option<String>,
    pub rationale: Option<String>,
    pub salary_range: Option<String>,
    pub growth_potential: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Normalized<T> {
    Parsed(T),
    Fallback { value: T, reason: MalformedResponse },
}

impl<T> Normalized<T> {
    pub fn value(&self) -> &T {
        match self {
            Self::Parsed(value) | Self::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Parsed(value) | Self::Fallback { value, .. } => value,
        }
    }

    pub fn reason(&self) -> Option<&MalformedResponse> {
        match self {
            Self::Parsed(_) => None,
            Self::Fallback { reason, .. } => Some(reason),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Normalized<U> {
        match self {
            Self::Parsed(value) => Normalized::Parsed(f(value)),
            Self::Fallback { value, reason } => Normalized::Fallback {
                value: f(value),
                reason,
            },
        }
    }
}

pub fn normalize(raw: impl Into<RawAnalysis>) -> Normalized<NormalizedResult> {
    let object = parse_payload(raw.into()).and_then(|value| match value {
        Value::Object(map) => Ok(map),
        other => Err(MalformedResponse::NotAnObject(json_kind(&other))),
    });

    match object {
        Ok(map) => Normalized::Parsed(NormalizedResult {
            summary: first_present(&map, SUMMARY_KEYS).and_then(text_of),
            skills_gap: first_present(&map, SKILLS_GAP_KEYS)
                .map(list_of)
                .unwrap_or_default(),
            course_match: first_present(&map, COURSE_MATCH_KEYS)
                .map(list_of)
                .unwrap_or_default(),
            domain_fit: first_present(&map, DOMAIN_FIT_KEYS).and_then(text_of),
        }),
        Err(reason) => fallback(NormalizedResult::default(), reason),
    }
}

/// Read career recommendations, always returning exactly `count` entries.
pub fn normalize_recommendations(
    raw: impl Into<RawAnalysis>,
    count: usize,
) -> Normalized<Vec<Recommendation>> {
    let entries = parse_payload(raw.into()).and_then(|value| match value {
        Value::Array(items) => Ok(items),
        Value::Object(map) => Ok(match first_present(&map, RECOMMENDATION_KEYS) {
            Some(Value::Array(items)) => items.clone(),
            Some(single) => vec![single.clone()],
            None => Vec::new(),
        }),
        other => Err(MalformedResponse::NotAnObject(json_kind(&other))),
    });

    match entries {
        Ok(items) => {
            let mut recommendations: Vec<Recommendation> =
                items.iter().filter_map(recommendation_of).collect();
            recommendations.resize(count, Recommendation::default());
            Normalized::Parsed(recommendations)
        }
        Err(reason) => fallback(vec![Recommendation::default(); count], reason),
    }
}

fn fallback<T>(value: T, reason: MalformedResponse) -> Normalized<T> {
    app_log!(warn, "Analysis payload degraded to an empty result: {}", reason);
    Normalized::Fallback { value, reason }
}

fn parse_payload(raw: RawAnalysis) -> Result<Value, MalformedResponse> {
    let value = match raw {
        RawAnalysis::Text(text) => parse_text(&text)?,
        RawAnalysis::Json(value) => value,
    };
    unwrap_envelope(value)
}

fn parse_text(text: &str) -> Result<Value, MalformedResponse> {
    let body = strip_code_fence(text.trim());
    if body.is_empty() {
        return Err(MalformedResponse::Empty);
    }
    serde_json::from_str(body).map_err(|e| MalformedResponse::InvalidJson(e.to_string()))
}

/// The analysis API wraps the model output in `{"analysis": ...}`, usually as
/// a JSON string.
fn unwrap_envelope(value: Value) -> Result<Value, MalformedResponse> {
    match value {
        Value::Object(mut map) => match map.remove("analysis") {
            Some(Value::String(inner)) => parse_text(&inner),
            Some(inner) => Ok(inner),
            None => Ok(Value::Object(map)),
        },
        Value::String(inner) => parse_text(&inner),
        other => Ok(other),
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn first_present<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| map.get(*key).filter(|value| !value.is_null()))
}

fn humanize(key: &str) -> String {
    key.replace('_', " ")
}

fn text_of(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(text_of)
            .collect::<Vec<_>>()
            .join("; "),
        Value::Object(map) => map
            .iter()
            .filter_map(|(key, v)| text_of(v).map(|t| format!("{}: {}", humanize(key), t)))
            .collect::<Vec<_>>()
            .join("\n"),
    };
    (!text.is_empty()).then_some(text)
}

fn list_of(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(item_label).collect(),
        Value::Object(map) => map
            .iter()
            .filter_map(|(key, v)| text_of(v).map(|t| format!("{}: {}", humanize(key), t)))
            .collect(),
        other => text_of(other).into_iter().collect(),
    }
}

fn item_label(item: &Value) -> Option<String> {
    if let Value::Object(map) = item {
        if let Some(label) = first_present(map, LABEL_KEYS).and_then(text_of) {
            return Some(label);
        }
    }
    text_of(item)
}

fn recommendation_of(item: &Value) -> Option<Recommendation> {
    match item {
        Value::Object(map) => Some(Recommendation {
            title: first_present(map, TITLE_KEYS).and_then(text_of),
            rationale: first_present(map, RATIONALE_KEYS).and_then(text_of),
            salary_range: first_present(map, SALARY_KEYS).and_then(text_of),
            growth_potential: first_present(map, GROWTH_KEYS).and_then(text_of),
        }),
        other => text_of(other).map(|title| Recommendation {
            title: Some(title),
            ..Recommendation::default()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_maps_known_fields_and_leaves_absent_ones_empty() {
        let body = r#"{"key_summary": "Solid Python backend", "gaps_identified": ["Kubernetes", "System design"]}"#;
        let result = normalize(body);
        assert!(!result.is_fallback());
        let record = result.into_value();
        assert_eq!(record.summary.as_deref(), Some("Solid Python backend"));
        assert_eq!(record.skills_gap, vec!["Kubernetes", "System design"]);
        assert!(record.course_match.is_empty());
        assert_eq!(record.domain_fit, None);
    }

    #[test]
    fn test_unwraps_service_envelope() {
        let analysis = json!({
            "skills_summary": {"technical": ["Rust", "SQL"], "soft": ["Mentoring"]},
            "experience_level": "Mid-level",
            "skills_gap_analysis": [
                {"skill_name": "Cloud architecture", "why_important": "Scaling"},
                {"skill_name": "Terraform"}
            ]
        });
        let envelope = json!({
            "success": true,
            "filename": "cv.pdf",
            "analysis": analysis.to_string(),
            "model": "gemini-1.5-pro",
            "extracted_text_length": 1200
        });

        let record = normalize(envelope.to_string()).into_value();
        assert_eq!(
            record.summary.as_deref(),
            Some("soft: Mentoring\ntechnical: Rust; SQL")
        );
        assert_eq!(record.skills_gap, vec!["Cloud architecture", "Terraform"]);
        assert_eq!(record.domain_fit.as_deref(), Some("Mid-level"));
    }

    #[test]
    fn test_accepts_parsed_json_and_code_fences() {
        let parsed = normalize(json!({"summary": "ok", "courses": "Intro to Go"}));
        assert_eq!(parsed.value().course_match, vec!["Intro to Go"]);

        let fenced = normalize("```json\n{\"domain_fit\": \"Fintech\"}\n```");
        assert_eq!(fenced.value().domain_fit.as_deref(), Some("Fintech"));
    }

    #[test]
    fn test_invalid_input_degrades_with_reason() {
        for raw in ["", "   ", "not json at all", "{\"summary\": "] {
            let result = normalize(raw);
            assert!(result.is_fallback(), "expected fallback for {:?}", raw);
            assert_eq!(result.value(), &NormalizedResult::default());
        }
        assert_eq!(normalize("").reason(), Some(&MalformedResponse::Empty));
        assert!(matches!(
            normalize("nope").reason(),
            Some(MalformedResponse::InvalidJson(_))
        ));
    }

    #[test]
    fn test_non_object_payloads_degrade() {
        assert_eq!(
            normalize("[1, 2]").reason(),
            Some(&MalformedResponse::NotAnObject("array"))
        );
        assert_eq!(
            normalize(json!({"analysis": null})).reason(),
            Some(&MalformedResponse::NotAnObject("null"))
        );
        assert!(matches!(
            normalize(json!({"analysis": "Here is your analysis in prose."})).reason(),
            Some(MalformedResponse::InvalidJson(_))
        ));
    }

    #[test]
    fn test_recommendations_are_padded_to_count() {
        let body = json!({
            "career_recommendations": [
                {"job_title": "Backend Engineer", "why": "Strong APIs", "growth_potential": "High"},
                "Platform Engineer"
            ]
        });
        let recs = normalize_recommendations(body, 4).into_value();
        assert_eq!(recs.len(), 4);
        assert_eq!(recs[0].title.as_deref(), Some("Backend Engineer"));
        assert_eq!(recs[0].rationale.as_deref(), Some("Strong APIs"));
        assert_eq!(recs[1].title.as_deref(), Some("Platform Engineer"));
        assert_eq!(recs[3], Recommendation::default());
    }

    #[test]
    fn test_recommendations_are_truncated_to_count() {
        let body = json!(["a", "b", "c", "d", "e"]);
        let recs = normalize_recommendations(body, 4);
        assert!(!recs.is_fallback());
        assert_eq!(recs.value().len(), 4);
        assert_eq!(recs.value()[3].title.as_deref(), Some("d"));
    }

    #[test]
    fn test_recommendations_fallback_keeps_shape() {
        let recs = normalize_recommendations("<html>502</html>", 4);
        assert!(recs.is_fallback());
        assert_eq!(recs.value().len(), 4);
    }
}
