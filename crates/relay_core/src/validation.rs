//! Fail-fast guards for inbound events.
//!
//! Each guard returns `Err` to stop the pipeline rather than a boolean.

use percent_encoding::percent_decode_str;
use serde_json::Value;

use crate::contract::{QueueEvent, QueueRecord, StorageEventNotification, STORAGE_EVENT_SOURCE};
use crate::error::RelayError;

pub fn verify_source(
    event: &StorageEventNotification,
    expected_bucket: &str,
) -> Result<(), RelayError> {
    let invalid = || RelayError::InvalidSource {
        expected: expected_bucket.to_string(),
    };

    let record = event.first_record().ok_or_else(invalid)?;
    if let Some(source) = record.event_source.as_deref() {
        if source != STORAGE_EVENT_SOURCE {
            return Err(invalid());
        }
    }

    match record.bucket_name.as_deref() {
        Some(bucket_name) if bucket_name == expected_bucket => Ok(()),
        _ => Err(invalid()),
    }
}

pub fn verify_size(event: &StorageEventNotification, max_bytes: u64) -> Result<(), RelayError> {
    let size = event.first_record().and_then(|record| record.object_size);

    match size {
        Some(bytes) if bytes <= max_bytes => Ok(()),
        _ => Err(RelayError::ObjectTooLarge { size, max_bytes }),
    }
}

/// Returns the first record's object key with URL encoding removed.
pub fn extract_key(event: &StorageEventNotification) -> Result<String, RelayError> {
    let raw_key = event
        .first_record()
        .and_then(|record| record.object_key)
        .ok_or(RelayError::MissingKey)?;

    let key = decode_object_key(&raw_key);
    if key.is_empty() {
        return Err(RelayError::MissingKey);
    }
    Ok(key)
}

/// Notification keys are form-encoded: `+` stands for a space.
fn decode_object_key(raw_key: &str) -> String {
    let spaced = raw_key.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

pub fn verify_batch(event: &QueueEvent) -> Result<&[Value], RelayError> {
    event.records.as_deref().ok_or_else(|| {
        RelayError::InvalidEvent("queue event must include a Records array".to_string())
    })
}

/// A queue record whose identifier and body are known to be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedRecord<'a> {
    pub message_id: &'a str,
    pub body: &'a str,
}

pub fn verify_record(record: &QueueRecord) -> Result<VerifiedRecord<'_>, RelayError> {
    let message_id = record
        .message_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| RelayError::MalformedRecord("record is missing messageId".to_string()))?;
    let body = record.body.as_deref().ok_or_else(|| {
        RelayError::MalformedRecord(format!("record '{message_id}' is missing body"))
    })?;

    Ok(VerifiedRecord { message_id, body })
}

pub fn verify_record_source(
    record: &QueueRecord,
    expected_queue_arn: &str,
) -> Result<(), RelayError> {
    match record.event_source_arn.as_deref() {
        Some(arn) if arn == expected_queue_arn => Ok(()),
        _ => Err(RelayError::InvalidSource {
            expected: expected_queue_arn.to_string(),
        }),
    }
}
