use thiserror::Error;

/// Coarse grouping used for log fields and for deciding how a failure is
/// reported back to the invocation runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    Validation,
    Sentinel,
    Gateway,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Validation => "validation",
            Self::Sentinel => "sentinel",
            Self::Gateway => "gateway",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("{0} must be configured")]
    MissingSetting(String),

    #[error("{name} has invalid value '{value}'")]
    InvalidSetting { name: String, value: String },

    #[error("no parameters found under path '{path}'")]
    NotFound { path: String },

    #[error("not authorized to read parameters from path '{path}'")]
    Unauthorized { path: String },

    #[error("required parameter '{0}' not found")]
    MissingRequiredParameter(String),

    #[error("invalid event: {0}")]
    InvalidEvent(String),

    #[error("invalid event source: expected '{expected}'")]
    InvalidSource { expected: String },

    #[error("object size {} exceeds the {max_bytes} byte limit", describe_size(.size))]
    ObjectTooLarge { size: Option<u64>, max_bytes: u64 },

    #[error("object key must be a non-empty string")]
    MissingKey,

    #[error("malformed queue record: {0}")]
    MalformedRecord(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("payload is missing field '{0}'")]
    MissingField(String),

    #[error("found the special error string in message text")]
    SentinelDetected,

    #[error("object '{key}' not found in bucket '{bucket}'")]
    ObjectNotFound { bucket: String, key: String },

    #[error("access denied to {resource}")]
    AccessDenied { resource: String },

    #[error("bucket '{bucket}' does not exist")]
    BucketNotFound { bucket: String },

    #[error("queue '{queue}' does not exist")]
    QueueNotFound { queue: String },

    #[error("transport failure: {0}")]
    Transport(String),
}

impl RelayError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingSetting(_)
            | Self::InvalidSetting { .. }
            | Self::NotFound { .. }
            | Self::Unauthorized { .. }
            | Self::MissingRequiredParameter(_) => ErrorCategory::Config,
            Self::InvalidEvent(_)
            | Self::InvalidSource { .. }
            | Self::ObjectTooLarge { .. }
            | Self::MissingKey
            | Self::MalformedRecord(_)
            | Self::InvalidPayload(_)
            | Self::MissingField(_) => ErrorCategory::Validation,
            Self::SentinelDetected => ErrorCategory::Sentinel,
            Self::ObjectNotFound { .. }
            | Self::AccessDenied { .. }
            | Self::BucketNotFound { .. }
            | Self::QueueNotFound { .. }
            | Self::Transport(_) => ErrorCategory::Gateway,
        }
    }
}

fn describe_size(size: &Option<u64>) -> String {
    match size {
        Some(bytes) => bytes.to_string(),
        None => "<missing>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_taxonomy() {
        assert_eq!(
            RelayError::Unauthorized {
                path: "/p".to_string()
            }
            .category(),
            ErrorCategory::Config
        );
        assert_eq!(RelayError::MissingKey.category(), ErrorCategory::Validation);
        assert_eq!(
            RelayError::SentinelDetected.category(),
            ErrorCategory::Sentinel
        );
        assert_eq!(
            RelayError::QueueNotFound {
                queue: "q".to_string()
            }
            .category(),
            ErrorCategory::Gateway
        );
    }

    #[test]
    fn object_too_large_message_reports_missing_size() {
        let error = RelayError::ObjectTooLarge {
            size: None,
            max_bytes: 262_144,
        };
        assert_eq!(
            error.to_string(),
            "object size <missing> exceeds the 262144 byte limit"
        );
    }
}
