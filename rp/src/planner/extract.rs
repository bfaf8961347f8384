//! Locate and recover the JSON object inside planner text

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::PlanError;

const FENCE: &str = "```";

/// Recovery step that produced the object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rung {
    /// The extracted text parsed as-is
    Direct,
    /// Parsed after re-slicing from the first `{` to the last `}`
    Reextracted,
    /// Parsed after closing unbalanced strings, brackets and braces
    Balanced,
}

/// A JSON object recovered from planner text
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPlan {
    pub object: Map<String, Value>,
    pub rung: Rung,
}

/// Contents of the first fenced block, without its language tag line
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find(FENCE)? + FENCE.len();
    let rest = &text[start..];
    let body = match rest.find('\n') {
        Some(nl) if !rest[..nl].contains('{') => &rest[nl + 1..],
        _ => rest,
    };
    let end = body.find(FENCE).unwrap_or(body.len());
    Some(&body[..end])
}

/// From the first `{` to the last `}`, or to the end when the text was cut off
fn brace_slice(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let rest = &text[start..];
    match rest.rfind('}') {
        Some(end) => Some(&rest[..=end]),
        None => Some(rest),
    }
}

/// Text most likely to hold the plan object
fn extract_candidate(text: &str) -> Option<&str> {
    if let Some(block) = fenced_block(text) {
        if block.contains('{') {
            return Some(block.trim());
        }
    }
    brace_slice(text)
}

fn parse_object(text: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err("top-level JSON value is not an object".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

fn strip_trailing_comma(out: &mut String) {
    let len = out.trim_end().len();
    out.truncate(len);
    if out.ends_with(',') {
        out.pop();
    }
}

/// Close whatever a truncated response left open
///
/// String literals are tracked so braces inside them are ignored. Closers
/// that match nothing are dropped, commas before a closer are removed.
pub(crate) fn balance(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut closers: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '{' => {
                closers.push('}');
                out.push(c);
            }
            '[' => {
                closers.push(']');
                out.push(c);
            }
            '}' | ']' => {
                if closers.last() == Some(&c) {
                    closers.pop();
                    strip_trailing_comma(&mut out);
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }

    if in_string {
        if escaped {
            out.pop();
        }
        out.push('"');
    }
    strip_trailing_comma(&mut out);
    if out.ends_with(':') {
        out.push_str("null");
    }
    while let Some(closer) = closers.pop() {
        strip_trailing_comma(&mut out);
        out.push(closer);
    }
    out
}

/// Find the plan object in raw planner text
///
/// Tries the extracted text directly, then a re-extraction between the
/// outermost braces, then a balance repair. The first success wins.
pub fn extract_plan_json(text: &str) -> Result<ExtractedPlan, PlanError> {
    debug!(text_len = text.len(), "extract_plan_json: called");
    let candidate = extract_candidate(text).ok_or(PlanError::EmptyOrUnparsablePlan)?;

    let direct_error = match parse_object(candidate) {
        Ok(object) => {
            debug!("extract_plan_json: parsed directly");
            return Ok(ExtractedPlan {
                object,
                rung: Rung::Direct,
            });
        }
        Err(e) => e,
    };
    debug!(error = %direct_error, "extract_plan_json: direct parse failed");

    let reextracted = brace_slice(candidate).unwrap_or(candidate);
    match parse_object(reextracted) {
        Ok(object) => {
            warn!("extract_plan_json: recovered plan by re-extracting braces");
            return Ok(ExtractedPlan {
                object,
                rung: Rung::Reextracted,
            });
        }
        Err(e) => debug!(error = %e, "extract_plan_json: re-extraction failed"),
    }

    let balanced = balance(reextracted);
    match parse_object(&balanced) {
        Ok(object) => {
            warn!("extract_plan_json: recovered plan by balancing brackets");
            Ok(ExtractedPlan {
                object,
                rung: Rung::Balanced,
            })
        }
        Err(e) => {
            warn!(error = %e, "extract_plan_json: all recovery steps failed");
            Err(PlanError::UnrecoverablePlanJson(direct_error))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_object_parses_directly() {
        let plan = extract_plan_json(r#"{"selected_places": [0, 1]}"#).unwrap();
        assert_eq!(plan.rung, Rung::Direct);
        assert_eq!(plan.object["selected_places"], serde_json::json!([0, 1]));
    }

    #[test]
    fn test_prose_around_object_is_sliced_away() {
        let text = "Here is your course:\n{\"sequence\": [2, 0]}\nEnjoy the trip!";
        let plan = extract_plan_json(text).unwrap();
        assert_eq!(plan.rung, Rung::Direct);
        assert_eq!(plan.object["sequence"], serde_json::json!([2, 0]));
    }

    #[test]
    fn test_fenced_block_with_trailing_commentary() {
        let text = "```json\n{\"selected_places\": [1]}\n```\nNote: {this is not json}";
        let plan = extract_plan_json(text).unwrap();
        assert_eq!(plan.rung, Rung::Direct);
        assert_eq!(plan.object.len(), 1);
    }

    #[test]
    fn test_bare_fence_without_language_tag() {
        let text = "```\n{\"reasoning\": \"short walk\"}\n```";
        let plan = extract_plan_json(text).unwrap();
        assert_eq!(plan.object["reasoning"], "short walk");
    }

    #[test]
    fn test_commentary_inside_fence_needs_reextraction() {
        let text = "```json\nPlan below\n{\"selected_places\": [0]}\ndone\n```";
        let plan = extract_plan_json(text).unwrap();
        assert_eq!(plan.rung, Rung::Reextracted);
    }

    #[test]
    fn test_truncated_object_is_balanced() {
        let text = r#"{"selected_places": [0, 1], "sequence": [1, 0"#;
        let plan = extract_plan_json(text).unwrap();
        assert_eq!(plan.rung, Rung::Balanced);
        assert_eq!(plan.object["sequence"], serde_json::json!([1, 0]));
    }

    #[test]
    fn test_extra_unmatched_brace_is_closed() {
        let text = r#"{"estimated_duration": {"0": 30, "selected_places": [0]}"#;
        let plan = extract_plan_json(text).unwrap();
        assert_eq!(plan.rung, Rung::Balanced);
    }

    #[test]
    fn test_no_brace_is_fatal() {
        assert_eq!(
            extract_plan_json("I cannot help with that."),
            Err(PlanError::EmptyOrUnparsablePlan)
        );
        assert_eq!(extract_plan_json(""), Err(PlanError::EmptyOrUnparsablePlan));
    }

    #[test]
    fn test_garbage_inside_braces_is_unrecoverable() {
        let err = extract_plan_json("{this is not json at all}").unwrap_err();
        assert!(matches!(err, PlanError::UnrecoverablePlanJson(_)));
    }

    #[test]
    fn test_balance_closes_strings_and_commas() {
        assert_eq!(balance(r#"{"a": "unterminated"#), r#"{"a": "unterminated"}"#);
        assert_eq!(balance(r#"{"a": [1, 2,"#), r#"{"a": [1, 2]}"#);
        assert_eq!(balance(r#"{"a": [1, 2,]}"#), r#"{"a": [1, 2]}"#);
        assert_eq!(balance(r#"{"a":"#), r#"{"a":null}"#);
    }

    #[test]
    fn test_balance_ignores_braces_in_strings() {
        assert_eq!(balance(r#"{"d": "use { and [ freely"#), r#"{"d": "use { and [ freely"}"#);
    }

    #[test]
    fn test_balance_drops_unmatched_closers() {
        assert_eq!(balance(r#"{"a": 1}]}"#), r#"{"a": 1}"#);
    }
}
