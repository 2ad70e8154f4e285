//! Structured reply parsing for council engines.
//!
//! Engines are asked for a bare JSON object but frequently wrap it in prose,
//! markdown fences or a leading reasoning trace. These functions find the
//! object and validate it strictly: anything that doesn't fit the contract is
//! an error, and the caller substitutes a fallback.
//!
//! | Function | Stage | Required keys |
//! |----------|-------|---------------|
//! | [`parse_member_judgment`] | Divergence | differentials, next_steps, confidence, red_flag |
//! | [`parse_ranking`] | Convergence | ranking (+ reasoning) |
//! | [`parse_synthesis`] | Synthesis | final_differentials, recommended_next_steps, confidence, red_flag, summary |

use super::alias::AliasLabel;
use super::judgment::MemberJudgment;
use serde_json::{Map, Value};
use thiserror::Error;

/// Reasons an engine reply could not be used
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResponseParseError {
    #[error("reply contains no JSON object")]
    NoJsonObject,

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("missing or mistyped field: {0}")]
    InvalidField(&'static str),

    #[error("confidence {0} outside [0, 1]")]
    ConfidenceOutOfRange(f64),

    #[error("ranking is not a permutation of A, B, C: {0}")]
    InvalidRanking(String),

    #[error("field is empty: {0}")]
    Empty(&'static str),
}

/// Ranking as parsed from the reviewer reply, before permutation checks
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRanking {
    pub order: Vec<AliasLabel>,
    pub rationale: String,
}

/// Synthesis fields as parsed from the chairman reply
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSynthesis {
    pub final_differentials: Vec<String>,
    pub recommended_next_steps: Vec<String>,
    pub confidence: f64,
    pub red_flag: bool,
    pub summary: String,
}

/// Locate the outermost JSON object in a free-form reply.
///
/// A reasoning trace terminated by `</think>` is skipped first, since it may
/// contain braces of its own.
pub fn extract_json_object(response: &str) -> Result<Map<String, Value>, ResponseParseError> {
    let body = match response.rfind("</think>") {
        Some(pos) => &response[pos + "</think>".len()..],
        None => response,
    };

    let start = body.find('{').ok_or(ResponseParseError::NoJsonObject)?;
    let end = body[start..]
        .rfind('}')
        .ok_or(ResponseParseError::NoJsonObject)?;
    let json_str = &body[start..start + end + 1];

    match serde_json::from_str::<Value>(json_str) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ResponseParseError::NoJsonObject),
        Err(e) => Err(ResponseParseError::InvalidJson(e.to_string())),
    }
}

fn string_list(map: &Map<String, Value>, key: &'static str) -> Result<Vec<String>, ResponseParseError> {
    let items = map
        .get(key)
        .and_then(Value::as_array)
        .ok_or(ResponseParseError::InvalidField(key))?;
    items
        .iter()
        .map(|v| {
            v.as_str()
                .map(|s| s.trim().to_string())
                .ok_or(ResponseParseError::InvalidField(key))
        })
        .filter(|s| !matches!(s, Ok(s) if s.is_empty()))
        .collect()
}

fn confidence(map: &Map<String, Value>) -> Result<f64, ResponseParseError> {
    let value = map
        .get("confidence")
        .and_then(Value::as_f64)
        .ok_or(ResponseParseError::InvalidField("confidence"))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(ResponseParseError::ConfidenceOutOfRange(value));
    }
    Ok(value)
}

fn red_flag(map: &Map<String, Value>) -> Result<bool, ResponseParseError> {
    map.get("red_flag")
        .and_then(Value::as_bool)
        .ok_or(ResponseParseError::InvalidField("red_flag"))
}

/// Parse a divergence-stage reply into a judgment.
pub fn parse_member_judgment(response: &str) -> Result<MemberJudgment, ResponseParseError> {
    let map = extract_json_object(response)?;
    Ok(MemberJudgment::new(
        string_list(&map, "differentials")?,
        string_list(&map, "next_steps")?,
        confidence(&map)?,
        red_flag(&map)?,
    ))
}

/// Parse a reviewer reply. Labels may be bare (`"A"`) or prefixed
/// (`"Response A"`); `ordered_list` and `rationale` are accepted as aliases.
pub fn parse_ranking(response: &str) -> Result<ParsedRanking, ResponseParseError> {
    let map = extract_json_object(response)?;

    let items = map
        .get("ranking")
        .or_else(|| map.get("ordered_list"))
        .and_then(Value::as_array)
        .ok_or(ResponseParseError::InvalidField("ranking"))?;

    let order = items
        .iter()
        .map(|v| {
            v.as_str()
                .ok_or_else(|| ResponseParseError::InvalidRanking(v.to_string()))
                .and_then(|s| s.parse::<AliasLabel>().map_err(ResponseParseError::InvalidRanking))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let rationale = map
        .get("reasoning")
        .or_else(|| map.get("rationale"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();

    Ok(ParsedRanking { order, rationale })
}

/// Parse a chairman reply. An empty summary counts as malformed.
pub fn parse_synthesis(response: &str) -> Result<ParsedSynthesis, ResponseParseError> {
    let map = extract_json_object(response)?;

    let summary = map
        .get("summary")
        .or_else(|| map.get("summary_text"))
        .and_then(Value::as_str)
        .ok_or(ResponseParseError::InvalidField("summary"))?
        .trim()
        .to_string();
    if summary.is_empty() {
        return Err(ResponseParseError::Empty("summary"));
    }

    Ok(ParsedSynthesis {
        final_differentials: string_list(&map, "final_differentials")?,
        recommended_next_steps: string_list(&map, "recommended_next_steps")?,
        confidence: confidence(&map)?,
        red_flag: red_flag(&map)?,
        summary,
    })
}
