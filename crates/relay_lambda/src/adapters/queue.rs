use std::collections::BTreeMap;

use aws_sdk_sqs::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_sqs::types::MessageAttributeValue;
use relay_core::gateway::{classify_service_error, GatewayTarget};
use relay_core::RelayError;

use super::block_on;

/// String-typed message attributes attached to an outgoing message.
pub type MessageAttributes = BTreeMap<String, String>;

pub trait MessageQueue {
    /// Sends one message. No deduplication id is generated, so a retried
    /// invocation may enqueue the same body twice.
    fn send_message(
        &self,
        queue_url: &str,
        body: &str,
        attributes: &MessageAttributes,
    ) -> Result<(), RelayError>;
}

#[derive(Clone)]
pub struct SqsMessageQueue {
    sqs_client: aws_sdk_sqs::Client,
}

impl SqsMessageQueue {
    pub fn new(aws_config: &aws_config::SdkConfig) -> Self {
        Self {
            sqs_client: aws_sdk_sqs::Client::new(aws_config),
        }
    }
}

impl MessageQueue for SqsMessageQueue {
    fn send_message(
        &self,
        queue_url: &str,
        body: &str,
        attributes: &MessageAttributes,
    ) -> Result<(), RelayError> {
        let mut request = self
            .sqs_client
            .send_message()
            .queue_url(queue_url)
            .message_body(body);

        for (name, value) in attributes {
            let attribute = MessageAttributeValue::builder()
                .data_type("String")
                .string_value(value)
                .build()
                .map_err(|error| {
                    RelayError::Transport(format!("invalid message attribute '{name}': {error}"))
                })?;
            request = request.message_attributes(name, attribute);
        }

        block_on(async move {
            request.send().await.map(|_| ()).map_err(|error| {
                classify_service_error(
                    GatewayTarget::Queue { queue_url },
                    error.code(),
                    &DisplayErrorContext(&error).to_string(),
                )
            })
        })
    }
}
