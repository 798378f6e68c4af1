use crate::hook::ElasticHook;
use crate::level::Severity;
use crate::record::{CapturedError, FieldValue, LogRecord};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Targets whose events are never shipped: this crate's own diagnostics
/// and the HTTP stack used to write documents.
pub const DEFAULT_IGNORED_TARGETS: &[&str] = &[env!("CARGO_CRATE_NAME"), "reqwest", "hyper", "h2", "rustls"];

/// `tracing_subscriber` layer that turns events into [`LogRecord`]s and
/// hands them to an [`ElasticHook`].
///
/// Only events whose severity is in [`ElasticHook::levels`] are captured.
/// In sync mode the emitting thread waits for the write (see
/// [`ElasticHook::fire_blocking`]); in async mode it only pays for
/// enqueueing.
pub struct ElasticLayer {
    hook: Arc<ElasticHook>,
    ignored_targets: Vec<String>,
}

impl ElasticLayer {
    pub fn new(hook: Arc<ElasticHook>) -> Self {
        ElasticLayer {
            hook,
            ignored_targets: DEFAULT_IGNORED_TARGETS.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Also skip events whose target starts with `prefix`.
    pub fn ignore_target(mut self, prefix: impl Into<String>) -> Self {
        self.ignored_targets.push(prefix.into());
        self
    }

    pub fn hook(&self) -> &Arc<ElasticHook> {
        &self.hook
    }

    fn is_ignored(&self, target: &str) -> bool {
        self.ignored_targets.iter().any(|prefix| target.starts_with(prefix.as_str()))
    }

    /// Capture an event, or `None` if the hook does not handle it.
    fn capture(&self, event: &Event<'_>) -> Option<LogRecord> {
        let meta = event.metadata();
        if self.is_ignored(meta.target()) {
            return None;
        }
        let level = Severity::from_tracing(meta.level())?;
        if !self.hook.is_enabled(level) {
            return None;
        }

        let mut fields = BTreeMap::new();
        let mut message: Option<String> = None;
        let mut visitor = FieldVisitor { fields: &mut fields, message: &mut message };
        event.record(&mut visitor);

        Some(LogRecord {
            level,
            time: Utc::now(),
            message: message.unwrap_or_default(),
            fields,
        })
    }
}

impl<S> Layer<S> for ElasticLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let Some(record) = self.capture(event) else {
            return;
        };
        if let Err(err) = self.hook.fire_blocking(record) {
            tracing::warn!(error = %err, "failed to ship log event");
        }
    }
}

/// Collects event fields into [`FieldValue`]s.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut BTreeMap<String, FieldValue>,
    pub message: &'a mut Option<String>,
}

impl<'a> FieldVisitor<'a> {
    fn insert(&mut self, field: &Field, value: serde_json::Value) {
        self.fields.insert(field.name().to_string(), FieldValue::Value(value));
    }
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.insert(field, serde_json::Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, serde_json::Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, serde_json::Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, serde_json::Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.fields
            .insert(field.name().to_string(), FieldValue::error(CapturedError::new(value)));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.insert(field, serde_json::Value::String(format!("{:?}", value)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Capture {
        fields: BTreeMap<String, FieldValue>,
        message: Option<String>,
    }

    /// Records the visitor output for each event.
    struct CaptureLayer(Arc<parking_lot::Mutex<Vec<Capture>>>);

    impl<S: Subscriber> Layer<S> for CaptureLayer {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut capture = Capture::default();
            let mut visitor = FieldVisitor { fields: &mut capture.fields, message: &mut capture.message };
            event.record(&mut visitor);
            self.0.lock().push(capture);
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("connection reset")]
    struct Reset;

    #[test]
    fn visitor_splits_message_from_fields() {
        use tracing_subscriber::layer::SubscriberExt;

        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(CaptureLayer(Arc::clone(&seen)));

        tracing::subscriber::with_default(subscriber, || {
            let err = Reset;
            tracing::error!(
                user_id = 42,
                ok = false,
                ratio = 0.5,
                error = &err as &(dyn std::error::Error + 'static),
                "login failed for {}",
                "bob"
            );
        });

        let seen = seen.lock();
        let capture = &seen[0];
        assert_eq!(capture.message.as_deref(), Some("login failed for bob"));
        assert_eq!(capture.fields["user_id"], FieldValue::Value(serde_json::json!(42)));
        assert_eq!(capture.fields["ok"], FieldValue::Value(serde_json::json!(false)));
        assert_eq!(capture.fields["ratio"], FieldValue::Value(serde_json::json!(0.5)));
        assert!(capture.fields["error"].is_error());
        assert_eq!(capture.fields["error"].to_json(), serde_json::json!("connection reset"));
    }

    #[test]
    fn default_ignores_own_crate_and_http_stack() {
        assert!(DEFAULT_IGNORED_TARGETS.contains(&"tracing_elastic_hook"));
        assert!(DEFAULT_IGNORED_TARGETS.contains(&"hyper"));
    }
}
