use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RelayError;

/// Largest message body the queue accepts. Objects above this size are
/// rejected by the producer rather than chunked.
pub const MAX_QUEUE_MESSAGE_BYTES: u64 = 262_144;
pub const STORAGE_EVENT_SOURCE: &str = "aws:s3";
pub const SUCCESS_STATUS_CODE: u16 = 200;
pub const SUCCESS_BODY: &str = "Successfully processed SQS record(s).";
pub const OUTPUT_OBJECT_EXTENSION: &str = "txt";

/// Object-created notification delivered to the producer.
///
/// Records stay as raw JSON and only the first one is ever read, so shape
/// problems surface as validation errors from [`crate::validation`] instead
/// of deserialization failures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorageEventNotification {
    pub records: Vec<Value>,
}

impl StorageEventNotification {
    /// A missing or non-array `Records` member yields an empty notification.
    pub fn from_value(event: Value) -> Self {
        let records = match event {
            Value::Object(mut fields) => match fields.remove("Records") {
                Some(Value::Array(records)) => records,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        Self { records }
    }

    /// Storage notifications carry a single record; only the first is used.
    pub fn first_record(&self) -> Option<StorageEventRecord> {
        self.records.first().map(StorageEventRecord::from_value)
    }
}

/// The fields of one storage record the producer reads. Anything absent or
/// of the wrong type is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageEventRecord {
    /// Present-but-non-string sources read as `Some("")` so they never match.
    pub event_source: Option<String>,
    pub bucket_name: Option<String>,
    pub object_key: Option<String>,
    pub object_size: Option<u64>,
}

impl StorageEventRecord {
    pub fn from_value(record: &Value) -> Self {
        let text = |pointer: &str| {
            record
                .pointer(pointer)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        Self {
            event_source: record
                .get("eventSource")
                .map(|source| source.as_str().unwrap_or_default().to_string()),
            bucket_name: text("/s3/bucket/name"),
            object_key: text("/s3/object/key"),
            object_size: record.pointer("/s3/object/size").and_then(Value::as_u64),
        }
    }
}

/// Batch of queue messages handed to one consumer invocation.
///
/// Records stay as raw JSON so a single malformed record can be reported on
/// its own instead of failing deserialization of the whole batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QueueEvent {
    #[serde(rename = "Records", default)]
    pub records: Option<Vec<Value>>,
}

impl QueueEvent {
    pub fn from_value(event: Value) -> Result<Self, RelayError> {
        if !event.is_object() {
            return Err(RelayError::InvalidEvent(
                "queue event must be a JSON object".to_string(),
            ));
        }
        serde_json::from_value(event)
            .map_err(|error| RelayError::InvalidEvent(format!("malformed queue event: {error}")))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueueRecord {
    #[serde(rename = "messageId", default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(rename = "eventSourceARN", default, skip_serializing_if = "Option::is_none")]
    pub event_source_arn: Option<String>,
}

impl QueueRecord {
    pub fn from_value(record: &Value) -> Result<Self, RelayError> {
        if !record.is_object() {
            return Err(RelayError::MalformedRecord(
                "record must be a JSON object".to_string(),
            ));
        }
        Self::deserialize(record).map_err(|error| RelayError::MalformedRecord(error.to_string()))
    }
}

/// Best-effort message id lookup for records that failed to deserialize.
pub fn record_identifier(record: &Value) -> Option<&str> {
    record
        .get("messageId")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

/// Payload moved from storage to the queue and back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelayMessage {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl RelayMessage {
    pub fn new(text: impl Into<String>, timestamp: Option<String>) -> Self {
        Self {
            text: text.into(),
            timestamp,
        }
    }

    pub fn to_json(&self) -> Result<String, RelayError> {
        serde_json::to_string(self).map_err(|error| {
            RelayError::InvalidPayload(format!("failed to encode message: {error}"))
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchItemFailure {
    #[serde(rename = "itemIdentifier")]
    pub item_identifier: String,
}

/// Envelope returned by both functions.
///
/// `batchItemFailures` follows the queue runtime's partial batch response
/// shape and is omitted when empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
    #[serde(
        rename = "batchItemFailures",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub batch_item_failures: Vec<BatchItemFailure>,
}

impl RelayResponse {
    pub fn success() -> Self {
        Self::with_failures(Vec::new())
    }

    pub fn with_failures(batch_item_failures: Vec<BatchItemFailure>) -> Self {
        Self {
            status_code: SUCCESS_STATUS_CODE,
            body: SUCCESS_BODY.to_string(),
            batch_item_failures,
        }
    }
}

pub fn output_object_key(message_id: &str) -> String {
    format!("{message_id}.{OUTPUT_OBJECT_EXTENSION}")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn storage_notification_tolerates_missing_sections() {
        let event = StorageEventNotification::from_value(json!({"blah": "blah"}));
        assert!(event.first_record().is_none());

        let event = StorageEventNotification::from_value(json!({"Records": "nope"}));
        assert!(event.first_record().is_none());

        let event = StorageEventNotification::from_value(json!([1, 2]));
        assert!(event.first_record().is_none());

        let record = StorageEventNotification::from_value(json!({
            "Records": [{"eventSource": "aws:s3"}]
        }))
        .first_record()
        .expect("record");
        assert_eq!(record.event_source.as_deref(), Some("aws:s3"));
        assert_eq!(record.bucket_name, None);
    }

    #[test]
    fn storage_record_reads_mistyped_fields_as_absent() {
        let record = StorageEventRecord::from_value(&json!({
            "eventSource": 7,
            "s3": {"bucket": "b", "object": {"key": 1, "size": "large"}}
        }));
        assert_eq!(
            record,
            StorageEventRecord {
                event_source: Some(String::new()),
                bucket_name: None,
                object_key: None,
                object_size: None,
            }
        );
    }

    #[test]
    fn storage_notification_ignores_records_after_the_first() {
        let event = StorageEventNotification::from_value(json!({
            "Records": [
                {"s3": {"bucket": {"name": "b"}, "object": {"key": "k", "size": 3}}},
                42
            ]
        }));
        let record = event.first_record().expect("first record");
        assert_eq!(record.bucket_name.as_deref(), Some("b"));
        assert_eq!(record.object_key.as_deref(), Some("k"));
        assert_eq!(record.object_size, Some(3));
    }

    #[test]
    fn queue_record_rejects_non_string_body() {
        let error = QueueRecord::from_value(&json!({"messageId": "m1", "body": 42}))
            .expect_err("numeric body should fail");
        assert!(matches!(error, RelayError::MalformedRecord(_)));
        assert_eq!(
            record_identifier(&json!({"messageId": "m1", "body": 42})),
            Some("m1")
        );
    }

    #[test]
    fn success_response_omits_empty_failures() {
        let value = serde_json::to_value(RelayResponse::success()).expect("serialize");
        assert_eq!(
            value,
            json!({"statusCode": 200, "body": "Successfully processed SQS record(s)."})
        );

        let value = serde_json::to_value(RelayResponse::with_failures(vec![BatchItemFailure {
            item_identifier: "m2".to_string(),
        }]))
        .expect("serialize");
        assert_eq!(value["batchItemFailures"], json!([{"itemIdentifier": "m2"}]));
    }

    #[test]
    fn relay_message_omits_missing_timestamp() {
        let encoded = RelayMessage::new("hi", None).to_json().expect("encode");
        assert_eq!(encoded, r#"{"text":"hi"}"#);
    }

    #[test]
    fn output_key_uses_message_id_stem() {
        assert_eq!(output_object_key("m1"), "m1.txt");
    }
}
