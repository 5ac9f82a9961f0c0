use lambda_runtime::{service_fn, Error, LambdaEvent};
use relay_core::contract::RelayResponse;
use relay_lambda::adapters::object_store::S3ObjectStore;
use relay_lambda::adapters::parameter_store::SsmParameterStore;
use relay_lambda::adapters::queue::SqsMessageQueue;
use relay_lambda::handlers::producer::handle_storage_event;
use relay_lambda::settings::RelaySettings;
use relay_lambda::telemetry::init_tracing;
use serde_json::Value;

async fn handle_request(event: LambdaEvent<Value>) -> Result<RelayResponse, Error> {
    let settings = RelaySettings::from_env()?;

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let parameters = SsmParameterStore::new(&aws_config);
    let objects = S3ObjectStore::new(&aws_config);
    let queue = SqsMessageQueue::new(&aws_config);

    let response = handle_storage_event(event.payload, &settings, &parameters, &objects, &queue)?;
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();
    lambda_runtime::run(service_fn(handle_request)).await
}
