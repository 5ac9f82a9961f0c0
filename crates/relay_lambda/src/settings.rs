use std::str::FromStr;

use relay_core::contract::MAX_QUEUE_MESSAGE_BYTES;
use relay_core::RelayError;

pub const PARAM_PATH_VAR: &str = "SSM_PARAM_PATH";
pub const PARAM_BUCKET_VAR: &str = "SSM_PARAM_BUCKET";
pub const PARAM_QUEUE_VAR: &str = "SSM_PARAM_QUEUE";
pub const PARAM_QUEUE_ARN_VAR: &str = "SSM_PARAM_QUEUE_ARN";
pub const MAX_OBJECT_BYTES_VAR: &str = "RELAY_MAX_OBJECT_BYTES";
pub const SENTINEL_VAR: &str = "RELAY_SENTINEL";
pub const BATCH_FAILURE_POLICY_VAR: &str = "RELAY_BATCH_FAILURE_POLICY";

pub const DEFAULT_SENTINEL: &str = "raise an exception";

/// Where bucket and queue parameters are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterSource {
    /// Every parameter under one hierarchical path.
    Path(String),
    /// Individual parameter paths for the bucket and (optionally) the queue.
    Named {
        bucket: String,
        /// Holds the queue URL the producer sends to.
        queue: Option<String>,
        /// Holds the queue ARN consumer records must originate from.
        queue_arn: Option<String>,
    },
}

/// What the consumer does when one record in a batch fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchFailurePolicy {
    /// Fail the whole invocation on the first bad record.
    #[default]
    AbortBatch,
    /// Report the record as a batch item failure and keep going.
    SkipAndReport,
}

impl BatchFailurePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AbortBatch => "abort-batch",
            Self::SkipAndReport => "skip-and-report",
        }
    }
}

impl FromStr for BatchFailurePolicy {
    type Err = RelayError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "abort-batch" => Ok(Self::AbortBatch),
            "skip-and-report" => Ok(Self::SkipAndReport),
            other => Err(RelayError::InvalidSetting {
                name: BATCH_FAILURE_POLICY_VAR.to_string(),
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySettings {
    pub parameter_source: ParameterSource,
    pub max_object_bytes: u64,
    pub sentinel: String,
    pub batch_failure_policy: BatchFailurePolicy,
}

impl RelaySettings {
    pub fn from_env() -> Result<Self, RelayError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds settings from `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RelayError> {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let parameter_source = match read(PARAM_PATH_VAR) {
            Some(path) => ParameterSource::Path(path),
            None => ParameterSource::Named {
                bucket: read(PARAM_BUCKET_VAR).ok_or_else(|| {
                    RelayError::MissingSetting(format!("{PARAM_PATH_VAR} or {PARAM_BUCKET_VAR}"))
                })?,
                queue: read(PARAM_QUEUE_VAR),
                queue_arn: read(PARAM_QUEUE_ARN_VAR),
            },
        };

        let max_object_bytes = match read(MAX_OBJECT_BYTES_VAR) {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|_| RelayError::InvalidSetting {
                    name: MAX_OBJECT_BYTES_VAR.to_string(),
                    value,
                })?,
            None => MAX_QUEUE_MESSAGE_BYTES,
        };

        let batch_failure_policy = match read(BATCH_FAILURE_POLICY_VAR) {
            Some(value) => value.parse()?,
            None => BatchFailurePolicy::default(),
        };

        Ok(Self {
            parameter_source,
            max_object_bytes,
            sentinel: read(SENTINEL_VAR).unwrap_or_else(|| DEFAULT_SENTINEL.to_string()),
            batch_failure_policy,
        })
    }
}
