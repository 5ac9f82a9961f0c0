use relay_core::contract::{RelayResponse, StorageEventNotification};
use relay_core::parameters::{
    require_parameters, required_parameter, INPUT_BUCKET_PARAM, PRODUCER_REQUIRED_PARAMS,
    QUEUE_URL_PARAM,
};
use relay_core::payload::validate_json;
use relay_core::validation::{extract_key, verify_size, verify_source};
use relay_core::RelayError;
use serde_json::Value;
use tracing::{error, info};

use crate::adapters::object_store::ObjectStore;
use crate::adapters::parameter_store::{resolve, resolve_prefix, ParameterStore};
use crate::adapters::queue::{MessageAttributes, MessageQueue};
use crate::settings::{ParameterSource, RelaySettings, PARAM_QUEUE_VAR};

/// Successful transitions of the producer pipeline, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerStage {
    ParamsResolved,
    SourceValidated,
    SizeValidated,
    KeyExtracted,
    ObjectRead,
    PayloadValidated,
    Sent,
}

impl ProducerStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ParamsResolved => "params_resolved",
            Self::SourceValidated => "source_validated",
            Self::SizeValidated => "size_validated",
            Self::KeyExtracted => "key_extracted",
            Self::ObjectRead => "object_read",
            Self::PayloadValidated => "payload_validated",
            Self::Sent => "sent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerTargets {
    pub bucket: String,
    pub queue_url: String,
}

pub fn resolve_producer_targets(
    settings: &RelaySettings,
    parameters: &impl ParameterStore,
) -> Result<ProducerTargets, RelayError> {
    match &settings.parameter_source {
        ParameterSource::Path(path) => {
            let params = resolve_prefix(parameters, path)?;
            require_parameters(&params, PRODUCER_REQUIRED_PARAMS)?;
            Ok(ProducerTargets {
                bucket: required_parameter(&params, INPUT_BUCKET_PARAM)?.to_string(),
                queue_url: required_parameter(&params, QUEUE_URL_PARAM)?.to_string(),
            })
        }
        ParameterSource::Named { bucket, queue, .. } => {
            let queue = queue
                .as_deref()
                .ok_or_else(|| RelayError::MissingSetting(PARAM_QUEUE_VAR.to_string()))?;
            Ok(ProducerTargets {
                bucket: resolve(parameters, bucket)?,
                queue_url: resolve(parameters, queue)?,
            })
        }
    }
}

/// Relays the object named by one storage notification onto the queue.
///
/// Any failing step stops the pipeline; nothing is sent unless every guard
/// before it passed.
pub fn handle_storage_event(
    event: Value,
    settings: &RelaySettings,
    parameters: &impl ParameterStore,
    objects: &impl ObjectStore,
    queue: &impl MessageQueue,
) -> Result<RelayResponse, RelayError> {
    let targets = resolve_producer_targets(settings, parameters).inspect_err(|error| {
        error!(
            stage = "start",
            parameter_source = ?settings.parameter_source,
            category = error.category().as_str(),
            error = %error,
            "failed to resolve producer parameters"
        );
    })?;
    log_stage(ProducerStage::ParamsResolved);

    let notification = StorageEventNotification::from_value(event);
    verify_source(&notification, &targets.bucket).inspect_err(|error| {
        error!(
            stage = ProducerStage::SourceValidated.as_str(),
            bucket = %targets.bucket,
            records = notification.records.len(),
            error = %error,
            "event is not a notification from the expected bucket"
        );
    })?;
    log_stage(ProducerStage::SourceValidated);

    verify_size(&notification, settings.max_object_bytes).inspect_err(|error| {
        error!(
            stage = ProducerStage::SizeValidated.as_str(),
            max_bytes = settings.max_object_bytes,
            error = %error,
            "object exceeds the queue message size limit"
        );
    })?;
    log_stage(ProducerStage::SizeValidated);

    let key = extract_key(&notification).inspect_err(|error| {
        error!(
            stage = ProducerStage::KeyExtracted.as_str(),
            error = %error,
            "storage notification has no usable object key"
        );
    })?;
    log_stage(ProducerStage::KeyExtracted);

    info!(bucket = %targets.bucket, key = %key, "reading object");
    let body = objects
        .read_object(&targets.bucket, &key)
        .and_then(|bytes| {
            String::from_utf8(bytes).map_err(|error| {
                RelayError::InvalidPayload(format!("object is not valid UTF-8: {error}"))
            })
        })
        .inspect_err(|error| {
            error!(
                stage = ProducerStage::ObjectRead.as_str(),
                bucket = %targets.bucket,
                key = %key,
                category = error.category().as_str(),
                error = %error,
                "failed to read object"
            );
        })?;
    log_stage(ProducerStage::ObjectRead);

    validate_json(&body).inspect_err(|error| {
        error!(
            stage = ProducerStage::PayloadValidated.as_str(),
            bucket = %targets.bucket,
            key = %key,
            error = %error,
            "object content is not valid JSON"
        );
    })?;
    log_stage(ProducerStage::PayloadValidated);

    info!(queue_url = %targets.queue_url, key = %key, "sending message");
    queue
        .send_message(&targets.queue_url, &body, &MessageAttributes::new())
        .inspect_err(|error| {
            error!(
                stage = ProducerStage::Sent.as_str(),
                queue_url = %targets.queue_url,
                category = error.category().as_str(),
                error = %error,
                "failed to send message"
            );
        })?;
    log_stage(ProducerStage::Sent);

    info!(bucket = %targets.bucket, key = %key, "done");
    Ok(RelayResponse::success())
}

fn log_stage(stage: ProducerStage) {
    info!(stage = stage.as_str(), "producer stage complete");
}
