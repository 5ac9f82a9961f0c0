use relay_core::contract::RelayResponse;
use relay_core::RelayError;
use relay_lambda::handlers::consumer::handle_queue_batch;
use relay_lambda::handlers::producer::handle_storage_event;
use relay_lambda::settings::{BatchFailurePolicy, RelaySettings};
use relay_lambda::test_helpers::{
    queue_event, queue_record, storage_event, InMemoryObjectStore, InMemoryParameterStore,
    RecordingQueue,
};
use serde_json::Value;

const PARAM_PATH: &str = "/sqs-simple-example";
const QUEUE_URL: &str = "https://sqs.us-east-2.amazonaws.com/123456789012/relay-queue";
const QUEUE_ARN: &str = "arn:aws:sqs:us-east-2:123456789012:relay-queue";

fn settings(policy: &str) -> RelaySettings {
    RelaySettings::from_lookup(|name| match name {
        "SSM_PARAM_PATH" => Some(PARAM_PATH.to_string()),
        "RELAY_SENTINEL" => Some("raise an exception".to_string()),
        "RELAY_BATCH_FAILURE_POLICY" => Some(policy.to_string()),
        _ => None,
    })
    .expect("settings should load")
}

fn parameters() -> InMemoryParameterStore {
    InMemoryParameterStore::new()
        .with_parameter("/sqs-simple-example/input-bucket-name", "in")
        .with_parameter("/sqs-simple-example/queue-url", QUEUE_URL)
        .with_parameter("/sqs-simple-example/output-bucket-name", "out")
        .with_parameter("/sqs-simple-example/queue-arn", QUEUE_ARN)
}

/// Turns everything the producer sent into the batch the queue would deliver.
fn deliver(queue: &RecordingQueue) -> Value {
    let records = queue
        .drain()
        .into_iter()
        .enumerate()
        .map(|(index, message)| queue_record(&format!("msg-{index}"), &message.body, QUEUE_ARN))
        .collect();
    queue_event(records)
}

#[test]
fn object_is_relayed_from_input_bucket_to_output_bucket() {
    let settings = settings("abort-batch");
    let parameters = parameters();
    let body = r#"{"text": "veni vidi vici", "timestamp": "2025-07-05T21:25:07.407022+00:00"}"#;
    let objects = InMemoryObjectStore::new()
        .with_object("in", "veni-2025.json", body.as_bytes())
        .with_bucket("out");
    let queue = RecordingQueue::new().with_queue(QUEUE_URL);

    let produced = handle_storage_event(
        storage_event("in", "veni-2025.json", body.len() as u64),
        &settings,
        &parameters,
        &objects,
        &queue,
    )
    .expect("producer should succeed");
    assert_eq!(produced, RelayResponse::success());

    let consumed = handle_queue_batch(deliver(&queue), &settings, &parameters, &objects)
        .expect("consumer should succeed");
    assert_eq!(consumed, RelayResponse::success());

    assert_eq!(
        objects.body("out", "msg-0.txt"),
        Some(b"veni vidi vici".to_vec())
    );
}

#[test]
fn sentinel_message_fails_consumer_after_clean_produce() {
    let settings = settings("abort-batch");
    let parameters = parameters();
    let objects = InMemoryObjectStore::new()
        .with_object("in", "ok.json", br#"{"text":"fine"}"#)
        .with_object("in", "bad.json", br#"{"text":"raise an exception"}"#)
        .with_bucket("out");
    let queue = RecordingQueue::new().with_queue(QUEUE_URL);

    for key in ["bad.json", "ok.json"] {
        handle_storage_event(
            storage_event("in", key, 64),
            &settings,
            &parameters,
            &objects,
            &queue,
        )
        .expect("producer does not inspect message text");
    }

    let error = handle_queue_batch(deliver(&queue), &settings, &parameters, &objects)
        .expect_err("sentinel should fail the batch");

    assert_eq!(error, RelayError::SentinelDetected);
    assert!(objects.keys("out").is_empty());
}

#[test]
fn skip_and_report_relays_healthy_messages_around_poisoned_one() {
    let settings = settings("skip-and-report");
    assert_eq!(
        settings.batch_failure_policy,
        BatchFailurePolicy::SkipAndReport
    );
    let parameters = parameters();
    let objects = InMemoryObjectStore::new()
        .with_object("in", "bad.json", br#"{"text":"raise an exception"}"#)
        .with_object("in", "ok.json", br#"{"text":"fine"}"#)
        .with_bucket("out");
    let queue = RecordingQueue::new().with_queue(QUEUE_URL);

    for key in ["bad.json", "ok.json"] {
        handle_storage_event(
            storage_event("in", key, 64),
            &settings,
            &parameters,
            &objects,
            &queue,
        )
        .expect("producer should succeed");
    }

    let response = handle_queue_batch(deliver(&queue), &settings, &parameters, &objects)
        .expect("skip policy reports instead of failing");

    assert_eq!(response.batch_item_failures.len(), 1);
    assert_eq!(response.batch_item_failures[0].item_identifier, "msg-0");
    assert_eq!(objects.body("out", "msg-1.txt"), Some(b"fine".to_vec()));
}

#[test]
fn producer_rejects_wrong_bucket_before_touching_queue() {
    let settings = settings("abort-batch");
    let objects = InMemoryObjectStore::new().with_object("wrong-bucket", "k", br#"{"text":"x"}"#);
    let queue = RecordingQueue::new().with_queue(QUEUE_URL);

    let error = handle_storage_event(
        storage_event("wrong-bucket", "k", 12),
        &settings,
        &parameters(),
        &objects,
        &queue,
    )
    .expect_err("wrong bucket should fail");

    assert_eq!(
        error,
        RelayError::InvalidSource {
            expected: "in".to_string()
        }
    );
    assert!(queue.sent().is_empty());
}
