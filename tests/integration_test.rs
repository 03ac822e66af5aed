//! Tests against a real SQS (or LocalStack) queue.
//!
//! Set `TEST_SQS_QUEUE_URL` (a `.env` file works) and run with
//! `cargo test -- --ignored`. Set `TEST_SQS_ENDPOINT` to target LocalStack.

use sqs_loop::errors::{HandlerError, SqsLoopError};
use sqs_loop::receiver::{RunState, SharedHandler, SqsLoop};
use sqs_loop::{client, transport::Message};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, timeout};

#[derive(Clone)]
struct SharedCounter {
    bodies: Arc<Mutex<Vec<String>>>,
}

impl SharedCounter {
    fn new() -> Self {
        Self {
            bodies: Arc::new(Mutex::new(Vec::new())),
        }
    }

    async fn record(&self, body: &str) {
        self.bodies.lock().await.push(body.to_string());
    }

    async fn get_count(&self) -> usize {
        self.bodies.lock().await.len()
    }
}

async fn test_handler(message: Message, shared: SharedCounter) -> Result<(), HandlerError> {
    println!("Received message: {}", message.body());
    shared.record(message.body()).await;
    Ok(())
}

async fn sqs_client() -> aws_sdk_sqs::Client {
    match env::var("TEST_SQS_ENDPOINT") {
        Ok(endpoint) => client::create_sqs_client_with_endpoint(&endpoint).await,
        Err(_) => client::create_sqs_client_from_env().await,
    }
}

#[tokio::test]
#[ignore = "requires TEST_SQS_QUEUE_URL"]
async fn test_sqs_loop_consumes_and_shuts_down() {
    dotenvy::dotenv().ok();

    let queue_url = env::var("TEST_SQS_QUEUE_URL").expect("TEST_SQS_QUEUE_URL must be set");
    let sqs_client = sqs_client().await;

    for body in ["Test message 1", "Test message 2"] {
        sqs_client
            .send_message()
            .queue_url(&queue_url)
            .message_body(body)
            .send()
            .await
            .expect("Failed to send test message");
    }

    let shared_counter = SharedCounter::new();
    let sqs_loop = Arc::new(SqsLoop::new(
        sqs_client.clone(),
        &queue_url,
        SharedHandler::new(test_handler, shared_counter.clone()),
    ));
    let receive_task = sqs_loop.start();

    let timeout_result = timeout(Duration::from_secs(30), async {
        while shared_counter.get_count().await < 2 {
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
    })
    .await;

    // Long polling waits up to five seconds, so leave room for one more cycle.
    let deadline = Instant::now() + Duration::from_secs(15);
    sqs_loop
        .shutdown(deadline)
        .await
        .expect("SQS loop did not stop before the deadline");
    receive_task.await.unwrap().unwrap();
    assert_eq!(sqs_loop.state(), RunState::Stopped);

    let final_count = shared_counter.get_count().await;
    assert!(
        timeout_result.is_ok(),
        "Test timed out. Only processed {} messages",
        final_count
    );
    assert!(final_count >= 2, "Should have processed at least 2 messages");
}

#[tokio::test]
#[ignore = "requires TEST_SQS_QUEUE_URL"]
async fn test_failed_messages_stay_on_the_queue() {
    dotenvy::dotenv().ok();

    let queue_url = env::var("TEST_SQS_QUEUE_URL").expect("TEST_SQS_QUEUE_URL must be set");
    let sqs_client = sqs_client().await;

    sqs_client
        .send_message()
        .queue_url(&queue_url)
        .message_body("Rejected message")
        .send()
        .await
        .expect("Failed to send test message");

    let attempts = SharedCounter::new();
    let sqs_loop = Arc::new(SqsLoop::new(
        sqs_client.clone(),
        &queue_url,
        SharedHandler::new(
            |message: Message, attempts: SharedCounter| async move {
                attempts.record(message.body()).await;
                Err(HandlerError::new("rejecting every message"))
            },
            attempts.clone(),
        ),
    ));
    let receive_task = sqs_loop.start();

    let _ = timeout(Duration::from_secs(20), async {
        while attempts.get_count().await < 1 {
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
    })
    .await;

    let result = sqs_loop
        .shutdown(Instant::now() + Duration::from_secs(15))
        .await;
    assert!(!matches!(result, Err(SqsLoopError::ShutdownTimeoutError)));
    receive_task.await.unwrap().unwrap();
    assert!(attempts.get_count().await >= 1);

    let purge_result = sqs_client.purge_queue().queue_url(&queue_url).send().await;

    if let Err(e) = purge_result {
        println!("Warning: Failed to purge queue: {}", e);
    }
}
