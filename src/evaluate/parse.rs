//! Response validator: model output is prose with (hopefully) one JSON
//! object somewhere inside it. We locate the first balanced `{...}` span,
//! parse it against a typed wire shape, and clamp scores into range.
//!
//! Out-of-range scores are a silent correction, never a rejection; a missing
//! or mistyped required field is a `ParseError`, which the evaluator absorbs
//! into the heuristic fallback.

use serde::Deserialize;

use crate::types::{clamp_score, ContentType, EvalSource, EvaluationResult};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("no JSON object in model output")]
    NoJsonObject,
    #[error("unbalanced JSON object in model output")]
    UnbalancedJson,
    #[error("evaluation schema violation: {0}")]
    Schema(String),
}

/// Wire shape of a model evaluation. Unknown fields are ignored so prompt
/// drift does not break parsing; the three required fields are strict.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEvaluation {
    like_score: f64,
    comment_score: f64,
    is_job_post: bool,
    #[serde(default)]
    post_type: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
}

/// Parse a free-form model reply into a typed evaluation.
pub fn parse_evaluation(raw: &str) -> Result<EvaluationResult, ParseError> {
    let span = extract_json_object(raw)?;
    let wire: WireEvaluation =
        serde_json::from_str(span).map_err(|e| ParseError::Schema(e.to_string()))?;

    let content_type = wire
        .post_type
        .as_deref()
        .map(ContentType::from_wire)
        .unwrap_or(ContentType::Other);
    let reasoning = wire
        .reasoning
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| "model evaluation".to_string());

    Ok(EvaluationResult {
        like_score: clamp_score(wire.like_score),
        comment_score: clamp_score(wire.comment_score),
        is_job_post: wire.is_job_post,
        content_type,
        reasoning,
        source: EvalSource::Model,
    })
}

/// Slice out the first balanced `{...}` span, respecting JSON strings and
/// escapes so braces inside `reasoning` text do not confuse the depth count.
fn extract_json_object(raw: &str) -> Result<&str, ParseError> {
    let start = raw.find('{').ok_or(ParseError::NoJsonObject)?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, ch) in raw[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&raw[start..start + i + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    Err(ParseError::UnbalancedJson)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_embedded_in_prose() {
        let raw = r#"Sure! Here is my evaluation:
        {"likeScore": 8, "commentScore": 9, "isJobPost": false, "postType": "news", "reasoning": "timely industry news"}
        Let me know if you need anything else."#;
        let eval = parse_evaluation(raw).unwrap();
        assert_eq!(eval.like_score, 8);
        assert_eq!(eval.comment_score, 9);
        assert!(!eval.is_job_post);
        assert_eq!(eval.content_type, ContentType::News);
        assert_eq!(eval.reasoning, "timely industry news");
        assert_eq!(eval.source, EvalSource::Model);
    }

    #[test]
    fn defaults_apply_for_optional_fields() {
        let eval = parse_evaluation(r#"{"likeScore": 5, "commentScore": 4, "isJobPost": false}"#)
            .unwrap();
        assert_eq!(eval.content_type, ContentType::Other);
        assert_eq!(eval.reasoning, "model evaluation");
    }

    #[test]
    fn out_of_range_scores_are_clamped_not_rejected() {
        let eval =
            parse_evaluation(r#"{"likeScore": 14, "commentScore": -2, "isJobPost": true}"#)
                .unwrap();
        assert_eq!(eval.like_score, 10);
        assert_eq!(eval.comment_score, 0);
        assert!(eval.is_job_post);
    }

    #[test]
    fn missing_required_field_is_schema_error() {
        let err = parse_evaluation(r#"{"likeScore": 5, "commentScore": 4}"#).unwrap_err();
        assert!(matches!(err, ParseError::Schema(_)));
    }

    #[test]
    fn mistyped_required_field_is_schema_error() {
        let err =
            parse_evaluation(r#"{"likeScore": "high", "commentScore": 4, "isJobPost": false}"#)
                .unwrap_err();
        assert!(matches!(err, ParseError::Schema(_)));
    }

    #[test]
    fn no_object_and_unbalanced_object_are_distinct_errors() {
        assert_eq!(parse_evaluation("no json here").unwrap_err(), ParseError::NoJsonObject);
        assert_eq!(
            parse_evaluation(r#"{"likeScore": 5"#).unwrap_err(),
            ParseError::UnbalancedJson
        );
    }

    #[test]
    fn braces_inside_strings_do_not_break_extraction() {
        let raw = r#"{"likeScore": 6, "commentScore": 5, "isJobPost": false, "reasoning": "curly {braces} and \"quotes\" inside"}"#;
        let eval = parse_evaluation(raw).unwrap();
        assert_eq!(eval.reasoning, "curly {braces} and \"quotes\" inside");
    }

    #[test]
    fn nested_objects_are_taken_whole() {
        let raw = r#"prefix {"likeScore": 7, "commentScore": 8, "isJobPost": false, "extra": {"nested": true}} suffix"#;
        let eval = parse_evaluation(raw).unwrap();
        assert_eq!(eval.like_score, 7);
    }
}
