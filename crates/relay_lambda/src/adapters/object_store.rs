use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::primitives::ByteStream;
use relay_core::gateway::{classify_service_error, GatewayTarget};
use relay_core::RelayError;

use super::block_on;

pub trait ObjectStore {
    fn read_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, RelayError>;

    /// Overwrites any existing object at `key`.
    fn write_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), RelayError>;
}

#[derive(Clone)]
pub struct S3ObjectStore {
    s3_client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(aws_config: &aws_config::SdkConfig) -> Self {
        Self {
            s3_client: aws_sdk_s3::Client::new(aws_config),
        }
    }
}

impl ObjectStore for S3ObjectStore {
    fn read_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, RelayError> {
        let client = self.s3_client.clone();

        block_on(async move {
            let output = client
                .get_object()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .map_err(|error| {
                    classify_service_error(
                        GatewayTarget::Object { bucket, key },
                        error.code(),
                        &DisplayErrorContext(&error).to_string(),
                    )
                })?;

            let data = output.body.collect().await.map_err(|error| {
                RelayError::Transport(format!(
                    "failed to read body of s3://{bucket}/{key}: {error}"
                ))
            })?;
            Ok(data.into_bytes().to_vec())
        })
    }

    fn write_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), RelayError> {
        let client = self.s3_client.clone();
        let body_bytes = body.to_vec();

        block_on(async move {
            client
                .put_object()
                .bucket(bucket)
                .key(key)
                .body(ByteStream::from(body_bytes))
                .send()
                .await
                .map(|_| ())
                .map_err(|error| {
                    classify_service_error(
                        GatewayTarget::Object { bucket, key },
                        error.code(),
                        &DisplayErrorContext(&error).to_string(),
                    )
                })
        })
    }
}
