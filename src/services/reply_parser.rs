//! Best-effort recovery of structured data from free-form model replies.
//!
//! Models are asked for bare JSON but routinely wrap it in prose or code
//! fences. Nothing here fails: unusable replies map to a fallback value.
use serde::Deserialize;
use serde_json::Value;

use crate::models::{AiAnalysis, JobMatch, JobMatchReport};

pub const NO_JSON_FEEDBACK: &str = "AI response could not be parsed. Try again later.";
pub const INVALID_JSON_FEEDBACK: &str = "Could not parse AI response. Please try again later.";

/// Returns the first balanced `{...}` span of `reply`. Braces inside JSON
/// string literals do not count.
pub fn first_json_object(reply: &str) -> Option<&str> {
    reply
        .char_indices()
        .filter(|&(_, c)| c == '{')
        .find_map(|(start, _)| balanced_end(&reply[start..]).map(|len| &reply[start..start + len]))
}

// Byte length of the object starting at `s[0] == '{'`, if it closes.
fn balanced_end(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Reads a 0-100 integer score. Integral floats and numeric strings are
/// accepted, anything else is treated as absent.
fn score_from(value: Option<&Value>) -> Option<u8> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if n.fract() == 0.0 && (0.0..=100.0).contains(&n) {
        Some(n as u8)
    } else {
        None
    }
}

pub fn parse_analysis(reply: &str) -> AiAnalysis {
    let Some(span) = first_json_object(reply) else {
        return AiAnalysis::fallback(NO_JSON_FEEDBACK);
    };
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(span) else {
        return AiAnalysis::fallback(INVALID_JSON_FEEDBACK);
    };

    match map.get("feedback").and_then(Value::as_str).map(str::trim) {
        Some(feedback) if !feedback.is_empty() => AiAnalysis {
            score: score_from(map.get("score")),
            feedback: feedback.to_string(),
        },
        _ => AiAnalysis::fallback(INVALID_JSON_FEEDBACK),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LooseJobMatch {
    #[serde(default)]
    matched_skills: Vec<String>,
    #[serde(default)]
    missing_skills: Vec<String>,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    match_score: Option<Value>,
}

pub fn parse_job_match(reply: &str) -> JobMatch {
    let parsed = first_json_object(reply)
        .and_then(|span| serde_json::from_str::<LooseJobMatch>(span).ok());

    match parsed {
        Some(loose) => JobMatch::Report(JobMatchReport {
            match_score: score_from(loose.match_score.as_ref()),
            matched_skills: loose.matched_skills,
            missing_skills: loose.missing_skills,
            summary: loose.summary,
        }),
        None => JobMatch::Raw {
            raw: reply.to_string(),
        },
    }
}
