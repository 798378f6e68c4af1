use crate::record::LogRecord;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Document written to the index for every log record.
///
/// Field names are fixed on the wire: `Host`, `@timestamp`, `Message`,
/// `Data` and `Level`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    #[serde(rename = "Host")]
    pub host: String,
    #[serde(rename = "@timestamp")]
    pub timestamp: String,
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Data")]
    pub data: BTreeMap<String, serde_json::Value>,
    #[serde(rename = "Level")]
    pub level: String,
}

impl Document {
    pub fn from_record(record: &LogRecord, host: &str) -> Self {
        Document {
            host: host.to_string(),
            timestamp: format_timestamp(&record.time),
            message: record.message.clone(),
            data: record.data(),
            level: record.level.as_str().to_uppercase(),
        }
    }
}

/// RFC 3339 in UTC with nine fractional digits, e.g.
/// `2026-10-14T08:30:00.000000001Z`.
pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Turns a [`LogRecord`] into the JSON body sent to the backend.
///
/// Install a custom implementation with
/// [`ElasticHook::set_message_creator`](crate::hook::ElasticHook::set_message_creator).
/// Closures with the same signature implement this trait.
pub trait MessageCreator: Send + Sync {
    fn create(&self, record: &LogRecord, host: &str) -> serde_json::Value;
}

impl<F> MessageCreator for F
where
    F: Fn(&LogRecord, &str) -> serde_json::Value + Send + Sync,
{
    fn create(&self, record: &LogRecord, host: &str) -> serde_json::Value {
        self(record, host)
    }
}

/// Builds a [`Document`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMessageCreator;

impl MessageCreator for DefaultMessageCreator {
    fn create(&self, record: &LogRecord, host: &str) -> serde_json::Value {
        let doc = Document::from_record(record, host);
        // A map of strings and JSON values always serializes.
        serde_json::to_value(&doc).unwrap_or_else(|_| serde_json::json!({ "Message": doc.message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Severity;
    use chrono::TimeZone;
    use serde_json::json;

    #[derive(Debug, thiserror::Error)]
    #[error("boom")]
    struct Boom;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 14, 8, 30, 0).unwrap() + chrono::Duration::nanoseconds(1)
    }

    #[test]
    fn default_document_has_wire_field_names() {
        let record = LogRecord::new(Severity::Info, "service started")
            .with_time(fixed_time())
            .with_field("port", 8080);

        let body = DefaultMessageCreator.create(&record, "api-1");
        assert_eq!(
            body,
            json!({
                "Host": "api-1",
                "@timestamp": "2026-10-14T08:30:00.000000001Z",
                "Message": "service started",
                "Data": { "port": 8080 },
                "Level": "INFO",
            })
        );
    }

    #[test]
    fn error_field_becomes_its_message() {
        let record = LogRecord::new(Severity::Error, "request failed").with_error(Boom);
        let body = DefaultMessageCreator.create(&record, "api-1");
        assert_eq!(body["Data"]["error"], json!("boom"));
        assert_eq!(body["Level"], json!("ERROR"));
    }

    #[test]
    fn timestamp_keeps_trailing_zeros() {
        let time = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_timestamp(&time), "2026-01-02T03:04:05.000000000Z");
    }

    #[test]
    fn closures_act_as_creators() {
        let creator = |record: &LogRecord, host: &str| json!({ "h": host, "m": record.message });
        let record = LogRecord::new(Severity::Warn, "low disk");
        assert_eq!(creator.create(&record, "db"), json!({ "h": "db", "m": "low disk" }));
    }
}
