use relay_core::contract::{
    output_object_key, record_identifier, BatchItemFailure, QueueEvent, QueueRecord, RelayResponse,
};
use relay_core::parameters::{
    require_parameters, required_parameter, CONSUMER_REQUIRED_PARAMS, OUTPUT_BUCKET_PARAM,
    QUEUE_ARN_PARAM,
};
use relay_core::payload::{check_sentinel, extract_text, validate_json};
use relay_core::validation::{verify_batch, verify_record, verify_record_source};
use relay_core::RelayError;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::adapters::object_store::ObjectStore;
use crate::adapters::parameter_store::{resolve, resolve_prefix, ParameterStore};
use crate::settings::{BatchFailurePolicy, ParameterSource, RelaySettings};

/// Per-record steps of the consumer pipeline, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerStage {
    RecordValidated,
    PayloadParsed,
    FieldExtracted,
    SentinelChecked,
    Written,
}

impl ConsumerStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RecordValidated => "record_validated",
            Self::PayloadParsed => "payload_parsed",
            Self::FieldExtracted => "field_extracted",
            Self::SentinelChecked => "sentinel_checked",
            Self::Written => "written",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerTargets {
    pub bucket: String,
    /// When set, every record must originate from this queue.
    pub queue_arn: Option<String>,
}

pub fn resolve_consumer_targets(
    settings: &RelaySettings,
    parameters: &impl ParameterStore,
) -> Result<ConsumerTargets, RelayError> {
    match &settings.parameter_source {
        ParameterSource::Path(path) => {
            let params = resolve_prefix(parameters, path)?;
            require_parameters(&params, CONSUMER_REQUIRED_PARAMS)?;
            Ok(ConsumerTargets {
                bucket: required_parameter(&params, OUTPUT_BUCKET_PARAM)?.to_string(),
                queue_arn: params.get(QUEUE_ARN_PARAM).cloned(),
            })
        }
        ParameterSource::Named { bucket, queue_arn, .. } => Ok(ConsumerTargets {
            bucket: resolve(parameters, bucket)?,
            queue_arn: queue_arn
                .as_deref()
                .map(|path| resolve(parameters, path))
                .transpose()?,
        }),
    }
}

/// Writes the `text` of each queued message to `{messageId}.txt`.
///
/// Records are handled strictly in input order. Under
/// [`BatchFailurePolicy::AbortBatch`] the first failing record fails the
/// invocation and later records are never touched.
pub fn handle_queue_batch(
    event: Value,
    settings: &RelaySettings,
    parameters: &impl ParameterStore,
    objects: &impl ObjectStore,
) -> Result<RelayResponse, RelayError> {
    let targets = resolve_consumer_targets(settings, parameters).inspect_err(|error| {
        error!(
            stage = "start",
            parameter_source = ?settings.parameter_source,
            category = error.category().as_str(),
            error = %error,
            "failed to resolve consumer parameters"
        );
    })?;

    let batch = QueueEvent::from_value(event).inspect_err(|error| {
        error!(error = %error, "malformed queue event");
    })?;
    let records = verify_batch(&batch).inspect_err(|error| {
        error!(error = %error, "queue event has no records");
    })?;
    info!(
        records = records.len(),
        bucket = %targets.bucket,
        policy = settings.batch_failure_policy.as_str(),
        "processing queue batch"
    );

    let mut failures = Vec::new();
    for (position, record) in records.iter().enumerate() {
        match relay_record(record, settings, &targets, objects) {
            Ok(key) => {
                info!(position, key = %key, "record relayed");
            }
            Err(RecordFailure { stage, error }) => {
                let message_id = record_identifier(record);
                match (settings.batch_failure_policy, message_id) {
                    (BatchFailurePolicy::SkipAndReport, Some(message_id)) => {
                        warn!(
                            position,
                            message_id,
                            stage = stage.as_str(),
                            category = error.category().as_str(),
                            error = %error,
                            "skipping failed record"
                        );
                        failures.push(BatchItemFailure {
                            item_identifier: message_id.to_string(),
                        });
                    }
                    _ => {
                        error!(
                            position,
                            message_id = message_id.unwrap_or_default(),
                            stage = stage.as_str(),
                            unprocessed = records.len() - position - 1,
                            category = error.category().as_str(),
                            error = %error,
                            "aborting queue batch"
                        );
                        return Err(error);
                    }
                }
            }
        }
    }

    Ok(RelayResponse::with_failures(failures))
}

/// A record that stopped before completing `stage`.
#[derive(Debug)]
struct RecordFailure {
    stage: ConsumerStage,
    error: RelayError,
}

fn failed_at(stage: ConsumerStage) -> impl FnOnce(RelayError) -> RecordFailure {
    move |error| RecordFailure { stage, error }
}

fn relay_record(
    record: &Value,
    settings: &RelaySettings,
    targets: &ConsumerTargets,
    objects: &impl ObjectStore,
) -> Result<String, RecordFailure> {
    let record =
        QueueRecord::from_value(record).map_err(failed_at(ConsumerStage::RecordValidated))?;
    let verified = verify_record(&record).map_err(failed_at(ConsumerStage::RecordValidated))?;
    if let Some(queue_arn) = targets.queue_arn.as_deref() {
        verify_record_source(&record, queue_arn)
            .map_err(failed_at(ConsumerStage::RecordValidated))?;
    }
    log_stage(ConsumerStage::RecordValidated, verified.message_id);

    validate_json(verified.body).map_err(failed_at(ConsumerStage::PayloadParsed))?;
    log_stage(ConsumerStage::PayloadParsed, verified.message_id);

    let text = extract_text(verified.body).map_err(failed_at(ConsumerStage::FieldExtracted))?;
    log_stage(ConsumerStage::FieldExtracted, verified.message_id);

    check_sentinel(&text, &settings.sentinel)
        .map_err(failed_at(ConsumerStage::SentinelChecked))?;
    log_stage(ConsumerStage::SentinelChecked, verified.message_id);

    let key = output_object_key(verified.message_id);
    objects
        .write_object(&targets.bucket, &key, text.as_bytes())
        .map_err(failed_at(ConsumerStage::Written))?;
    log_stage(ConsumerStage::Written, verified.message_id);

    Ok(key)
}

fn log_stage(stage: ConsumerStage, message_id: &str) {
    info!(stage = stage.as_str(), message_id, "consumer stage complete");
}
