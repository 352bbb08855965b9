use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Filter;
use crate::{message_text, ChatMessage, Role};

/// Fixed text in front of the count; the removal pattern is built from it too
pub const ANNOTATION_PREFIX: &str = "[當前提示]:在上輪對話中，系統統計你的生成字數為：";

// Compile once; a bad pattern degrades to "nothing matches", never a panic.
// CJK Unified Ideographs block only.
static CJK_RE: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"[\x{4E00}-\x{9FFF}]"));

static ANNOTATION_RE: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(&format!(r"{}\d+", regex::escape(ANNOTATION_PREFIX))));

/// Filter settings exposed to the host. Empty for now.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Valves {}

/// Counts CJK ideographs in the latest assistant reply and reports the number
/// to the model through the first system message.
#[derive(Debug, Clone, Default)]
pub struct WordCountFilter {
    pub valves: Valves,
}

impl WordCountFilter {
    pub fn new(valves: Valves) -> Self {
        Self { valves }
    }
}

/// Number of code points in U+4E00..=U+9FFF, duplicates included
pub fn count_cjk_chars(text: &str) -> usize {
    match CJK_RE.as_ref() {
        Ok(re) => re.find_iter(text).count(),
        Err(_) => 0,
    }
}

pub fn annotation(count: usize) -> String {
    format!("{}{}", ANNOTATION_PREFIX, count)
}

/// Drop every earlier annotation from `content` and append a fresh one
pub fn replace_annotation(content: &str, count: usize) -> String {
    let cleaned = match ANNOTATION_RE.as_ref() {
        Ok(re) => re.replace_all(content, ""),
        Err(_) => content.into(),
    };
    format!("{}\n{}", cleaned.trim(), annotation(count))
        .trim()
        .to_string()
}

fn latest_assistant_count(messages: &[Value]) -> usize {
    messages
        .iter()
        .rev()
        .find(|m| Role::Assistant.matches(m))
        .map(|m| count_cjk_chars(message_text(m)))
        .unwrap_or(0)
}

impl Filter for WordCountFilter {
    fn inlet(&self, mut body: Value, _user: Option<&Value>) -> Value {
        let Some(messages) = body.get_mut("messages").and_then(|m| m.as_array_mut()) else {
            return body;
        };
        if messages.is_empty() {
            return body;
        }

        let count = latest_assistant_count(messages);
        tracing::debug!(count, "latest assistant reply counted");

        match messages.iter_mut().find(|m| Role::System.matches(m)) {
            Some(system) => {
                let updated = replace_annotation(message_text(system), count);
                system["content"] = Value::String(updated);
            }
            None => {
                messages.insert(0, ChatMessage::system(annotation(count)).into_value());
            }
        }

        body
    }
}
