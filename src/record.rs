use crate::level::Severity;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Name of the field that may carry an error value.
pub const ERROR_KEY: &str = "error";

/// Value stored under a structured field of a [`LogRecord`].
///
/// Errors are kept as their own variant so they can be turned into text
/// before a document is serialized.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Value(serde_json::Value),
    Error(Arc<dyn Error + Send + Sync>),
}

impl FieldValue {
    pub fn error<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        FieldValue::Error(Arc::new(err))
    }

    /// Resolve into a JSON value; errors become their message.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Value(v) => v.clone(),
            FieldValue::Error(e) => serde_json::Value::String(e.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, FieldValue::Error(_))
    }
}

macro_rules! impl_from_json {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    FieldValue::Value(value.into())
                }
            }
        )*
    };
}

impl_from_json!(serde_json::Value, String, &str, bool, i32, i64, u32, u64, f64);

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Value(a), FieldValue::Value(b)) => a == b,
            (FieldValue::Error(a), FieldValue::Error(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Error captured from a `tracing` field, detached from its original type.
#[derive(Debug, Clone)]
pub struct CapturedError {
    message: String,
}

impl CapturedError {
    pub fn new(err: &(dyn Error + 'static)) -> Self {
        CapturedError { message: err.to_string() }
    }
}

impl fmt::Display for CapturedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for CapturedError {}

/// One log event handed to the hook.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: Severity,
    pub time: DateTime<Utc>,
    pub message: String,
    pub fields: BTreeMap<String, FieldValue>,
}

impl LogRecord {
    pub fn new(level: Severity, message: impl Into<String>) -> Self {
        LogRecord {
            level,
            time: Utc::now(),
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn with_error<E>(mut self, err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.fields.insert(ERROR_KEY.to_string(), FieldValue::error(err));
        self
    }

    /// Replace an error stored under [`ERROR_KEY`] with its message.
    pub fn normalize_error_field(&mut self) {
        if let Some(value) = self.fields.get_mut(ERROR_KEY) {
            let message = match value {
                FieldValue::Error(e) => e.to_string(),
                FieldValue::Value(_) => return,
            };
            *value = FieldValue::Value(serde_json::Value::String(message));
        }
    }

    /// Structured fields resolved to JSON.
    pub fn data(&self) -> BTreeMap<String, serde_json::Value> {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, thiserror::Error)]
    #[error("boom")]
    struct Boom;

    #[test]
    fn normalize_replaces_error_with_message() {
        let mut record = LogRecord::new(Severity::Error, "failed").with_error(Boom);
        assert!(record.fields[ERROR_KEY].is_error());

        record.normalize_error_field();
        assert_eq!(record.fields[ERROR_KEY], FieldValue::Value(json!("boom")));
    }

    #[test]
    fn normalize_leaves_plain_error_field_alone() {
        let mut record = LogRecord::new(Severity::Error, "failed").with_field(ERROR_KEY, "already text");
        record.normalize_error_field();
        assert_eq!(record.fields[ERROR_KEY], FieldValue::Value(json!("already text")));
    }

    #[test]
    fn normalize_only_touches_designated_field() {
        let mut record = LogRecord::new(Severity::Warn, "x").with_field("cause", FieldValue::error(Boom));
        record.normalize_error_field();
        assert!(record.fields["cause"].is_error());
        // still resolved to text when read as data
        assert_eq!(record.data()["cause"], json!("boom"));
    }

    #[test]
    fn data_copies_plain_values() {
        let record = LogRecord::new(Severity::Info, "hi")
            .with_field("user_id", 42)
            .with_field("ok", true);
        let data = record.data();
        assert_eq!(data["user_id"], json!(42));
        assert_eq!(data["ok"], json!(true));
    }

    #[test]
    fn captured_error_keeps_message() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let captured = CapturedError::new(&io);
        assert_eq!(captured.to_string(), "disk full");
    }
}
