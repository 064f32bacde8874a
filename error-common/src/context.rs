use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Error context information
///
/// Carries identifiers only. Free text such as transcripts must never be
/// placed here unredacted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorContext {
    pub request_id: Option<String>,
    pub user_id: Option<String>,
    pub trace_id: Option<String>,
    pub additional: HashMap<String, String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_id(mut self, request_id: String) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_user_id(mut self, user_id: String) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_trace_id(mut self, trace_id: String) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    pub fn add_context<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.additional.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accumulates_fields() {
        let context = ErrorContext::new()
            .with_request_id("req-1".to_string())
            .with_user_id("user-1".to_string())
            .add_context("domain", "dental")
            .add_context("domain", "medical");

        assert_eq!(context.request_id.as_deref(), Some("req-1"));
        assert_eq!(context.user_id.as_deref(), Some("user-1"));
        assert!(context.trace_id.is_none());
        // later values win
        assert_eq!(context.additional.get("domain").map(String::as_str), Some("medical"));
    }
}
