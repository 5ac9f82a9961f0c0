//! Translation of remote service error codes into [`RelayError`] variants.
//!
//! Adapters pass the error code and rendered message reported by the SDK; this
//! module decides which failure the pipeline sees.

use crate::error::RelayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayTarget<'a> {
    Object { bucket: &'a str, key: &'a str },
    Queue { queue_url: &'a str },
    Parameter { path: &'a str },
}

const ACCESS_DENIED_CODES: &[&str] = &[
    "AccessDenied",
    "AccessDeniedException",
    "AllAccessDisabled",
    "UnauthorizedOperation",
];

const MISSING_QUEUE_CODES: &[&str] = &[
    "AWS.SimpleQueueService.NonExistentQueue",
    "QueueDoesNotExist",
    "NonExistentQueue",
];

pub fn classify_service_error(
    target: GatewayTarget<'_>,
    code: Option<&str>,
    message: &str,
) -> RelayError {
    let code = code.unwrap_or_default();
    let denied = ACCESS_DENIED_CODES.contains(&code);

    match target {
        GatewayTarget::Object { bucket, key } => match code {
            "NoSuchKey" | "NotFound" => RelayError::ObjectNotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            "NoSuchBucket" => RelayError::BucketNotFound {
                bucket: bucket.to_string(),
            },
            _ if denied => RelayError::AccessDenied {
                resource: format!("s3://{bucket}/{key}"),
            },
            _ => RelayError::Transport(format!("s3://{bucket}/{key}: {message}")),
        },
        GatewayTarget::Queue { queue_url } => {
            if MISSING_QUEUE_CODES.contains(&code) {
                RelayError::QueueNotFound {
                    queue: queue_url.to_string(),
                }
            } else if denied {
                RelayError::AccessDenied {
                    resource: queue_url.to_string(),
                }
            } else {
                RelayError::Transport(format!("{queue_url}: {message}"))
            }
        }
        GatewayTarget::Parameter { path } => match code {
            "ParameterNotFound" | "ParameterVersionNotFound" => RelayError::NotFound {
                path: path.to_string(),
            },
            _ if denied => RelayError::Unauthorized {
                path: path.to_string(),
            },
            _ => RelayError::Transport(format!("{path}: {message}")),
        },
    }
}
