//! In-memory gateways and event fixtures shared by unit and integration tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use relay_core::RelayError;
use serde_json::{json, Value};

use crate::adapters::object_store::ObjectStore;
use crate::adapters::parameter_store::{ParameterPage, ParameterStore, PARAMETER_PAGE_SIZE};
use crate::adapters::queue::{MessageAttributes, MessageQueue};

pub struct InMemoryParameterStore {
    parameters: BTreeMap<String, String>,
    page_size: usize,
    deny_reads: bool,
    page_requests: Mutex<usize>,
}

impl InMemoryParameterStore {
    pub fn new() -> Self {
        Self {
            parameters: BTreeMap::new(),
            page_size: PARAMETER_PAGE_SIZE as usize,
            deny_reads: false,
            page_requests: Mutex::new(0),
        }
    }

    pub fn with_parameter(mut self, name: &str, value: &str) -> Self {
        self.parameters.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn denying_reads(mut self) -> Self {
        self.deny_reads = true;
        self
    }

    pub fn page_requests(&self) -> usize {
        *self.page_requests.lock().expect("poisoned mutex")
    }
}

impl Default for InMemoryParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterStore for InMemoryParameterStore {
    fn get_parameter(&self, path: &str) -> Result<String, RelayError> {
        if self.deny_reads {
            return Err(RelayError::Unauthorized {
                path: path.to_string(),
            });
        }
        self.parameters
            .get(path)
            .cloned()
            .ok_or_else(|| RelayError::NotFound {
                path: path.to_string(),
            })
    }

    fn get_parameters_by_path(
        &self,
        path: &str,
        next_token: Option<&str>,
    ) -> Result<ParameterPage, RelayError> {
        if self.deny_reads {
            return Err(RelayError::Unauthorized {
                path: path.to_string(),
            });
        }
        *self.page_requests.lock().expect("poisoned mutex") += 1;

        let prefix = format!("{}/", path.trim_end_matches('/'));
        let offset = next_token
            .map(|token| token.parse::<usize>().expect("token is an offset"))
            .unwrap_or(0);
        let matching: Vec<(String, String)> = self
            .parameters
            .iter()
            .filter(|(name, _)| name.starts_with(&prefix))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        let end = (offset + self.page_size).min(matching.len());
        let next_token = (end < matching.len()).then(|| end.to_string());
        Ok(ParameterPage {
            parameters: matching[offset.min(end)..end].to_vec(),
            next_token,
        })
    }
}

/// Object store keyed by `(bucket, key)`. Writes to unknown buckets fail the
/// same way the remote service does.
pub struct InMemoryObjectStore {
    buckets: BTreeSet<String>,
    objects: Mutex<BTreeMap<(String, String), Vec<u8>>>,
    denied_buckets: BTreeSet<String>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self {
            buckets: BTreeSet::new(),
            objects: Mutex::new(BTreeMap::new()),
            denied_buckets: BTreeSet::new(),
        }
    }

    pub fn with_bucket(mut self, bucket: &str) -> Self {
        self.buckets.insert(bucket.to_string());
        self
    }

    pub fn with_object(self, bucket: &str, key: &str, body: &[u8]) -> Self {
        let store = self.with_bucket(bucket);
        store.seed_object(bucket, key, body);
        store
    }

    pub fn denying_bucket(mut self, bucket: &str) -> Self {
        self.denied_buckets.insert(bucket.to_string());
        self
    }

    pub fn seed_object(&self, bucket: &str, key: &str, body: &[u8]) {
        self.objects
            .lock()
            .expect("poisoned mutex")
            .insert((bucket.to_string(), key.to_string()), body.to_vec());
    }

    pub fn body(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .expect("poisoned mutex")
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.objects
            .lock()
            .expect("poisoned mutex")
            .keys()
            .filter(|(object_bucket, _)| object_bucket == bucket)
            .map(|(_, key)| key.clone())
            .collect()
    }

    fn check_bucket(&self, bucket: &str, key: &str) -> Result<(), RelayError> {
        if self.denied_buckets.contains(bucket) {
            return Err(RelayError::AccessDenied {
                resource: format!("s3://{bucket}/{key}"),
            });
        }
        if !self.buckets.contains(bucket) {
            return Err(RelayError::BucketNotFound {
                bucket: bucket.to_string(),
            });
        }
        Ok(())
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn read_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, RelayError> {
        self.check_bucket(bucket, key)?;
        self.body(bucket, key).ok_or_else(|| RelayError::ObjectNotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }

    fn write_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), RelayError> {
        self.check_bucket(bucket, key)?;
        self.seed_object(bucket, key, body);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub queue_url: String,
    pub body: String,
    pub attributes: MessageAttributes,
}

pub struct RecordingQueue {
    queues: BTreeSet<String>,
    sent: Mutex<Vec<SentMessage>>,
}

impl RecordingQueue {
    pub fn new() -> Self {
        Self {
            queues: BTreeSet::new(),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn with_queue(mut self, queue_url: &str) -> Self {
        self.queues.insert(queue_url.to_string());
        self
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().expect("poisoned mutex").clone()
    }

    /// Removes and returns everything sent so far, oldest first.
    pub fn drain(&self) -> Vec<SentMessage> {
        std::mem::take(&mut *self.sent.lock().expect("poisoned mutex"))
    }
}

impl Default for RecordingQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageQueue for RecordingQueue {
    fn send_message(
        &self,
        queue_url: &str,
        body: &str,
        attributes: &MessageAttributes,
    ) -> Result<(), RelayError> {
        if !self.queues.contains(queue_url) {
            return Err(RelayError::QueueNotFound {
                queue: queue_url.to_string(),
            });
        }
        self.sent.lock().expect("poisoned mutex").push(SentMessage {
            queue_url: queue_url.to_string(),
            body: body.to_string(),
            attributes: attributes.clone(),
        });
        Ok(())
    }
}

pub fn storage_event(bucket: &str, key: &str, size: u64) -> Value {
    json!({
        "Records": [{
            "eventVersion": "2.1",
            "eventSource": "aws:s3",
            "awsRegion": "us-east-2",
            "eventName": "ObjectCreated:Put",
            "s3": {
                "s3SchemaVersion": "1.0",
                "bucket": {"name": bucket},
                "object": {"key": key, "size": size}
            }
        }]
    })
}

pub fn queue_record(message_id: &str, body: &str, queue_arn: &str) -> Value {
    json!({
        "messageId": message_id,
        "body": body,
        "eventSource": "aws:sqs",
        "eventSourceARN": queue_arn,
        "awsRegion": "us-east-2"
    })
}

pub fn queue_event(records: Vec<Value>) -> Value {
    json!({ "Records": records })
}
