//! Judge evaluation records
//!
//! The judge replies with free text that should be a JSON object. Recovery is
//! two separate stages: decode the whole reply, then fall back to the span
//! between the first `{` and the last `}`. Scores are read leniently and never
//! checked against the rubric; only `overall_score` gates acceptance.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::BedtimeError;

/// Known keys of the evaluation record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreField {
    AgeAppropriateness,
    ClarityAndCoherence,
    EmotionalTone,
    Creativity,
    LanguageSimplicity,
    OverallScore,
}

impl ScoreField {
    /// The five rubric dimensions, in display order
    pub const DIMENSIONS: [ScoreField; 5] = [
        ScoreField::AgeAppropriateness,
        ScoreField::ClarityAndCoherence,
        ScoreField::EmotionalTone,
        ScoreField::Creativity,
        ScoreField::LanguageSimplicity,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ScoreField::AgeAppropriateness => "age_appropriateness",
            ScoreField::ClarityAndCoherence => "clarity_and_coherence",
            ScoreField::EmotionalTone => "emotional_tone",
            ScoreField::Creativity => "creativity",
            ScoreField::LanguageSimplicity => "language_simplicity",
            ScoreField::OverallScore => "overall_score",
        }
    }
}

/// Key holding the list of suggested improvements
pub const IMPROVEMENTS_KEY: &str = "improvements";

/// Default minimum overall score for acceptance
pub const DEFAULT_THRESHOLD: i64 = 8;

/// Everything the judge returned, keyed as it returned it
///
/// Unknown keys are kept so the reviser sees the full record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Evaluation {
    fields: Map<String, Value>,
}

impl Evaluation {
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Raw value of a key, if the judge sent it
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Integer-coerced score for a known field
    pub fn score(&self, field: ScoreField) -> Option<i64> {
        self.get(field.key()).and_then(coerce_score)
    }

    pub fn overall_score(&self) -> Option<i64> {
        self.score(ScoreField::OverallScore)
    }

    /// Improvement suggestions in the judge's order
    ///
    /// Non-string entries are rendered as compact JSON; a missing or
    /// non-array value yields an empty list.
    pub fn improvements(&self) -> Vec<String> {
        match self.get(IMPROVEMENTS_KEY) {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
            Some(Value::String(s)) => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    /// Every scored field except the improvements list
    ///
    /// Rubric dimensions come first, in rubric order, then `overall_score`,
    /// then any extra keys the judge added.
    pub fn detailed_scores(&self) -> Vec<(&str, &Value)> {
        let mut out: Vec<(&str, &Value)> = Vec::new();
        for field in ScoreField::DIMENSIONS.iter().chain([ScoreField::OverallScore].iter()) {
            if let Some((key, value)) = self.fields.get_key_value(field.key()) {
                out.push((key.as_str(), value));
            }
        }
        for (key, value) in &self.fields {
            let known = key == IMPROVEMENTS_KEY || out.iter().any(|(k, _)| *k == key.as_str());
            if !known {
                out.push((key.as_str(), value));
            }
        }
        out
    }

    /// Pretty-printed JSON of the full record, as handed to the reviser
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.fields).unwrap_or_else(|_| Value::Object(self.fields.clone()).to_string())
    }
}

/// Read a score as an integer
///
/// Integers pass through, floats truncate toward zero and strings holding an
/// integer (surrounding whitespace allowed) are parsed. Anything else is `None`.
pub fn coerce_score(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Whether the overall score reaches `threshold`
///
/// A missing or non-coercible score is never acceptable.
pub fn is_acceptable(evaluation: &Evaluation, threshold: i64) -> bool {
    let overall = evaluation.overall_score();
    let acceptable = overall.is_some_and(|score| score >= threshold);
    debug!(?overall, %threshold, %acceptable, "is_acceptable: called");
    acceptable
}

fn malformed(reason: impl Into<String>, raw: &str) -> BedtimeError {
    BedtimeError::MalformedJudgeOutput {
        reason: reason.into(),
        raw: raw.to_string(),
    }
}

fn into_object(value: Value, raw: &str) -> Result<Map<String, Value>, BedtimeError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(malformed(
            format!("decoded JSON is {} rather than an object", json_kind(&other)),
            raw,
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Stage 1: decode the entire reply as a JSON object
pub fn parse_strict(raw: &str) -> Result<Map<String, Value>, BedtimeError> {
    debug!(len = raw.len(), "parse_strict: called");
    let value: Value =
        serde_json::from_str(raw).map_err(|e| malformed(format!("reply is not valid JSON: {}", e), raw))?;
    into_object(value, raw)
}

/// Stage 2: decode the span from the first `{` to the last `}` inclusive
pub fn extract_braced(raw: &str) -> Result<Map<String, Value>, BedtimeError> {
    debug!(len = raw.len(), "extract_braced: called");
    let start = raw.find('{').ok_or_else(|| malformed("no opening brace in reply", raw))?;
    let end = raw
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| malformed("no closing brace after the opening brace", raw))?;

    let span = &raw[start..=end];
    let value: Value = serde_json::from_str(span)
        .map_err(|e| malformed(format!("braced span is not valid JSON: {}", e), raw))?;
    into_object(value, raw)
}

/// Recover an evaluation from a judge reply using both stages
pub fn parse_evaluation(raw: &str) -> Result<Evaluation, BedtimeError> {
    match parse_strict(raw) {
        Ok(fields) => Ok(Evaluation::from_map(fields)),
        Err(strict_err) => {
            warn!(error = %strict_err, "parse_evaluation: strict parse failed, trying braced span");
            extract_braced(raw).map(Evaluation::from_map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eval(value: Value) -> Evaluation {
        match value {
            Value::Object(map) => Evaluation::from_map(map),
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_parse_strict_object() {
        let map = parse_strict(r#"{"overall_score": 9, "improvements": []}"#).unwrap();
        assert_eq!(map["overall_score"], json!(9));
    }

    #[test]
    fn test_parse_strict_rejects_prose() {
        let err = parse_strict("Here you go: {\"overall_score\": 9}").unwrap_err();
        assert!(matches!(err, BedtimeError::MalformedJudgeOutput { .. }));
    }

    #[test]
    fn test_parse_strict_rejects_non_object() {
        let err = parse_strict("[1, 2, 3]").unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_extract_braced_from_surrounding_text() {
        let raw = "Sure! Here is my evaluation:\n```json\n{\"overall_score\": 7, \"creativity\": 8}\n```\nHope it helps.";
        let map = extract_braced(raw).unwrap();
        assert_eq!(map["overall_score"], json!(7));
        assert_eq!(map["creativity"], json!(8));
    }

    #[test]
    fn test_extract_braced_without_opening_brace() {
        match extract_braced("The story scores 9 out of 10").unwrap_err() {
            BedtimeError::MalformedJudgeOutput { reason, raw } => {
                assert!(reason.contains("no opening brace"));
                assert_eq!(raw, "The story scores 9 out of 10");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_extract_braced_closing_before_opening() {
        let err = extract_braced("} oops {").unwrap_err();
        assert!(err.to_string().contains("no closing brace"));
    }

    #[test]
    fn test_extract_braced_invalid_span() {
        let err = extract_braced("{ overall_score: nine }").unwrap_err();
        assert!(err.to_string().contains("braced span"));
    }

    #[test]
    fn test_parse_evaluation_uses_fallback() {
        let evaluation = parse_evaluation("Result: {\"overall_score\": \"8\"} end").unwrap();
        assert_eq!(evaluation.overall_score(), Some(8));
    }

    #[test]
    fn test_parse_evaluation_non_object_without_braces() {
        assert!(parse_evaluation("42").is_err());
    }

    #[test]
    fn test_coerce_score() {
        assert_eq!(coerce_score(&json!(8)), Some(8));
        assert_eq!(coerce_score(&json!(-2)), Some(-2));
        assert_eq!(coerce_score(&json!(7.9)), Some(7));
        assert_eq!(coerce_score(&json!("9")), Some(9));
        assert_eq!(coerce_score(&json!(" 10 \n")), Some(10));
        assert_eq!(coerce_score(&json!("8.5")), None);
        assert_eq!(coerce_score(&json!("eight")), None);
        assert_eq!(coerce_score(&json!(true)), None);
        assert_eq!(coerce_score(&json!(null)), None);
        assert_eq!(coerce_score(&json!([8])), None);
        assert_eq!(coerce_score(&json!({"score": 8})), None);
    }

    #[test]
    fn test_is_acceptable() {
        assert!(is_acceptable(&eval(json!({"overall_score": 8})), DEFAULT_THRESHOLD));
        assert!(is_acceptable(&eval(json!({"overall_score": "9"})), DEFAULT_THRESHOLD));
        assert!(!is_acceptable(&eval(json!({"overall_score": 7})), DEFAULT_THRESHOLD));
        assert!(!is_acceptable(&eval(json!({"overall_score": "high"})), DEFAULT_THRESHOLD));
        assert!(!is_acceptable(&eval(json!({"creativity": 10})), DEFAULT_THRESHOLD));
        assert!(is_acceptable(&eval(json!({"overall_score": 5})), 5));
    }

    #[test]
    fn test_rubric_is_not_revalidated() {
        // Fearful content should cap overall at 5, but the code trusts the judge
        let evaluation = eval(json!({
            "age_appropriateness": 3,
            "emotional_tone": 4,
            "overall_score": 9,
            "improvements": []
        }));
        assert!(is_acceptable(&evaluation, DEFAULT_THRESHOLD));
    }

    #[test]
    fn test_improvements() {
        let evaluation = eval(json!({"improvements": ["Shorter sentences", 3, "Softer ending"]}));
        assert_eq!(evaluation.improvements(), vec!["Shorter sentences", "3", "Softer ending"]);

        assert!(eval(json!({})).improvements().is_empty());
        assert_eq!(eval(json!({"improvements": "Be gentler"})).improvements(), vec!["Be gentler"]);
    }

    #[test]
    fn test_detailed_scores_order() {
        let evaluation = eval(json!({
            "overall_score": 6,
            "creativity": 7,
            "age_appropriateness": 9,
            "pacing": 5,
            "improvements": ["x"]
        }));
        let keys: Vec<&str> = evaluation.detailed_scores().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["age_appropriateness", "creativity", "overall_score", "pacing"]);
    }

    #[test]
    fn test_pretty_json_keeps_every_field() {
        let evaluation = eval(json!({"overall_score": 6, "notes": "too long", "improvements": ["trim"]}));
        let rendered = evaluation.to_pretty_json();
        assert!(rendered.contains("\"notes\": \"too long\""));
        assert!(rendered.contains("\"improvements\""));
        assert!(rendered.contains('\n'));
    }
}
