use serde_json::Value;

/// Common types for the chat filter hooks and the script test bridge

/// Hook interface and the word-count annotator
pub mod filter;

/// Bridge for running the external shell test suite
pub mod bridge;

/// Configuration loading from env, `.env` and the JSON hooks config
pub mod config;

/// Tracing subscriber setup shared by the binaries
pub mod logging;

// Re-export commonly used types for convenience
pub use filter::{Filter, word_count::{WordCountFilter, Valves, count_cjk_chars, annotation}};
pub use bridge::{TestBridge, TestMode, TestRun, BridgeError};
pub use bridge::wsl::{WslLayer, to_bridge_path};
pub use config::BridgeConfig;

/// Chat message role as sent by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    Assistant,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::Assistant => "assistant",
            Role::User => "user",
        }
    }

    /// True if the host message `msg` carries this role
    pub fn matches(&self, msg: &Value) -> bool {
        msg.get("role").and_then(|r| r.as_str()) == Some(self.as_str())
    }
}

/// Message shape the filter inserts into the host body
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn into_value(self) -> Value {
        serde_json::json!({
            "role": self.role.as_str(),
            "content": self.content,
        })
    }
}

/// Text content of a host message, empty when missing or not a string
pub fn message_text(msg: &Value) -> &str {
    msg.get("content").and_then(|c| c.as_str()).unwrap_or("")
}
