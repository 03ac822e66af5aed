//! # SQS Loop
//!
//! A long-running AWS SQS consumer: poll a queue, hand each message to a
//! user-supplied handler, delete it on success.
//!
//! ## Features
//!
//! - Asynchronous long polling with tokio
//! - Messages handled strictly in the order they were received, one batch at a time
//! - Automatic message deletion on successful processing (at-least-once delivery)
//! - Failed poll cycles retried with exponential backoff and jitter, forever by default
//! - Graceful shutdown bounded by a caller-supplied deadline
//! - Pluggable [`transport::QueueTransport`], implemented for `aws_sdk_sqs::Client`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use sqs_loop::client::create_sqs_client_from_env;
//! use sqs_loop::{errors::HandlerError, receiver::SqsLoop, transport::Message};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = create_sqs_client_from_env().await;
//!     let queue_url = "https://sqs.region.amazonaws.com/account/queue-name";
//!
//!     let sqs_loop = Arc::new(SqsLoop::new(client, queue_url, |message: Message| async move {
//!         println!("Processing message: {}", message.body());
//!         Ok::<(), HandlerError>(())
//!     }));
//!     let task = sqs_loop.start();
//!
//!     tokio::signal::ctrl_c().await?;
//!     sqs_loop
//!         .shutdown(tokio::time::Instant::now() + Duration::from_secs(30))
//!         .await?;
//!     task.await??;
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod errors;
pub mod receiver;
pub mod transport;
