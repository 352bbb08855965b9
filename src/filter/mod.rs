/// Chat filter hooks
///
/// The host calls `inlet` on every request body before it reaches the model
/// and `outlet` on the response body afterwards. Both hooks take the body by
/// value and hand it back; they never fail.

pub mod word_count;

use serde_json::Value;

pub trait Filter {
    /// Pre-process a request body
    fn inlet(&self, body: Value, user: Option<&Value>) -> Value;

    /// Post-process a response body
    fn outlet(&self, body: Value, _user: Option<&Value>) -> Value {
        body
    }
}
