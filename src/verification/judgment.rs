/*!
 * Externally supplied quality judgment.
 *
 * The assessment reply comes straight from a language model, so nothing about
 * its shape is trusted: every field is read individually from a
 * `serde_json::Value` and anything missing or malformed is simply absent.
 */

use std::collections::HashMap;
use std::str::FromStr;
use log::{debug, warn};
use serde_json::Value;

use super::models::AssignableStatus;

/// Judgment for a single line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JudgmentItem {
    /// Assigned status, if the reply carried a recognised one
    pub status: Option<AssignableStatus>,
    /// Non-empty feedback, if any
    pub feedback: Option<String>,
}

/// Judgment for a whole file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Judgment {
    /// Overall score clamped to 0-100
    pub overall_score: Option<u8>,
    /// Non-empty summary
    pub summary: Option<String>,
    /// Per-line judgments keyed by line ID
    pub items: HashMap<u32, JudgmentItem>,
}

impl Judgment {
    /// Parse a raw reply body. Never fails; unreadable input yields an empty judgment.
    pub fn parse(raw: &str) -> Self {
        match extract_json(raw) {
            Some(value) => Self::from_value(&value),
            None => {
                warn!("Assessment reply is not valid JSON, using defaults for every line");
                Self::default()
            }
        }
    }

    /// Read a judgment out of an already decoded JSON value
    pub fn from_value(value: &Value) -> Self {
        let mut judgment = Judgment {
            overall_score: value.get("overallScore").and_then(read_score),
            summary: value.get("summary").and_then(read_text),
            items: HashMap::new(),
        };

        let Some(items) = value.get("items").and_then(Value::as_array) else {
            debug!("Assessment reply has no items array");
            return judgment;
        };

        for entry in items {
            let Some(id) = entry.get("id").and_then(read_id) else {
                debug!("Skipping assessment item without a usable id: {}", entry);
                continue;
            };

            if judgment.items.contains_key(&id) {
                continue;
            }

            let status = entry
                .get("status")
                .and_then(Value::as_str)
                .and_then(|s| AssignableStatus::from_str(s).ok());

            judgment.items.insert(id, JudgmentItem {
                status,
                feedback: entry.get("feedback").and_then(read_text),
            });
        }

        judgment
    }

    pub fn item(&self, id: u32) -> Option<&JudgmentItem> {
        self.items.get(&id)
    }
}

/// Decode the reply, tolerating markdown fences or prose around the object
fn extract_json(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return value.is_object().then_some(value);
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }

    serde_json::from_str::<Value>(&trimmed[start..=end])
        .ok()
        .filter(Value::is_object)
}

fn read_score(value: &Value) -> Option<u8> {
    let score = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if !score.is_finite() {
        return None;
    }

    Some(score.round().clamp(0.0, 100.0) as u8)
}

fn read_id(value: &Value) -> Option<u32> {
    let id = match value {
        Value::Number(n) => match n.as_u64() {
            Some(id) => id,
            None => {
                let f = n.as_f64()?;
                if f.fract() != 0.0 || f < 0.0 {
                    return None;
                }
                f as u64
            }
        },
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };

    u32::try_from(id).ok()
}

fn read_text(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
