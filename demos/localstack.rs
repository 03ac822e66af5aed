//! Consumes a LocalStack queue and logs every message body.
//!
//! ```sh
//! SQS_ENDPOINT=http://localhost:4566 \
//! SQS_QUEUE_URL=http://sqs.us-east-1.localhost.localstack.cloud:4566/000000000000/outbox \
//! cargo run --example localstack
//! ```

use std::env;
use std::sync::Arc;
use std::time::Duration;

use sqs_loop::{client, errors::HandlerError, receiver::SqsLoop, transport::Message};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let endpoint = env::var("SQS_ENDPOINT").unwrap_or_else(|_| "http://localstack:4566".to_string());
    let queue_url = env::var("SQS_QUEUE_URL").unwrap_or_else(|_| {
        "http://sqs.us-east-1.localhost.localstack.cloud:4566/000000000000/outbox".to_string()
    });

    let sqs_client = client::create_sqs_client_with_endpoint(&endpoint).await;
    let sqs_loop = Arc::new(SqsLoop::new(
        sqs_client,
        &queue_url,
        |message: Message| async move {
            tracing::info!(body = message.body(), "Received message");
            Ok::<(), HandlerError>(())
        },
    ));

    let task = sqs_loop.start();

    tokio::signal::ctrl_c().await?;

    // Limit total shutdown time to ensure nothing hangs.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(30);
    if let Err(e) = sqs_loop.shutdown(deadline).await {
        tracing::warn!(error = %e, "SQS loop did not stop in time");
        return Ok(());
    }

    task.await??;
    Ok(())
}
