use serde_json::Value;

use crate::error::RelayError;

pub const TEXT_FIELD: &str = "text";

pub fn validate_json(text: &str) -> Result<(), RelayError> {
    serde_json::from_str::<Value>(text)
        .map(|_| ())
        .map_err(|error| RelayError::InvalidPayload(error.to_string()))
}

/// Parses `text` and returns its string `text` field.
pub fn extract_text(text: &str) -> Result<String, RelayError> {
    let document: Value =
        serde_json::from_str(text).map_err(|error| RelayError::InvalidPayload(error.to_string()))?;

    match document.get(TEXT_FIELD) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(other) => Err(RelayError::InvalidPayload(format!(
            "field '{TEXT_FIELD}' must be a string, got {other}"
        ))),
        None => Err(RelayError::MissingField(TEXT_FIELD.to_string())),
    }
}

/// Fault-injection hook: a message whose text equals the configured sentinel
/// fails on purpose so the failure path can be exercised end to end.
pub fn check_sentinel(value: &str, sentinel: &str) -> Result<(), RelayError> {
    if value == sentinel {
        return Err(RelayError::SentinelDetected);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::RelayMessage;

    #[test]
    fn validate_json_accepts_documents() {
        assert_eq!(validate_json(r#"{"a":1}"#), Ok(()));
        assert_eq!(
            validate_json(
                r#"{"text": "veni vidi vici", "timestamp": "2025-07-05T21:25:07.407022+00:00"}"#
            ),
            Ok(())
        );
    }

    #[test]
    fn validate_json_rejects_plain_text() {
        assert!(matches!(
            validate_json("not json"),
            Err(RelayError::InvalidPayload(_))
        ));
        assert!(validate_json("blah, blah, blah").is_err());
    }

    #[test]
    fn extract_text_inverts_message_encoding() {
        for text in ["hello", "veni vidi vici", "quote \" and \\ slash", "ünïcode ✓"] {
            let encoded = RelayMessage::new(text, Some("2025-01-01T00:00:00Z".to_string()))
                .to_json()
                .expect("encode");
            assert_eq!(extract_text(&encoded).expect("extract"), text);
        }
    }

    #[test]
    fn extract_text_reports_missing_field() {
        assert_eq!(
            extract_text(r#"{"nope":"x"}"#),
            Err(RelayError::MissingField("text".to_string()))
        );
        assert_eq!(
            extract_text("[1, 2, 3]"),
            Err(RelayError::MissingField("text".to_string()))
        );
    }

    #[test]
    fn extract_text_rejects_invalid_documents() {
        assert!(matches!(
            extract_text("blah"),
            Err(RelayError::InvalidPayload(_))
        ));
        assert!(matches!(
            extract_text(r#"{"text": 7}"#),
            Err(RelayError::InvalidPayload(_))
        ));
    }

    #[test]
    fn sentinel_matches_exactly() {
        assert_eq!(check_sentinel("e pluribus unum", "boom"), Ok(()));
        assert_eq!(check_sentinel("boom", "boom"), Err(RelayError::SentinelDetected));
        assert_eq!(check_sentinel("", ""), Err(RelayError::SentinelDetected));
        assert_eq!(check_sentinel("", "boom"), Ok(()));
        assert_eq!(check_sentinel("boom ", "boom"), Ok(()));
    }
}
