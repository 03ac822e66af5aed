use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::errors::SqsLoopError;
use crate::transport::QueueTransport;

mod backoff;
mod config;
mod handler;

pub use backoff::{BackoffConfig, ExponentialBackoff};
pub use config::SqsLoopConfig;
pub use handler::{MessageHandler, SharedHandler};

/// Lifecycle of an [`SqsLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running,
    ShuttingDown,
    /// Terminal. A stopped loop cannot be run again.
    Stopped,
}

/// An SQS consumer loop.
///
/// Retrieves batches of messages from a queue and calls the handler for each
/// one in order. A message is deleted as soon as its handler returns `Ok`.
/// Any failure (receive, handler or delete) fails the whole poll cycle, which
/// is then retried with exponential backoff until it succeeds or the loop is
/// shut down. Messages that were not deleted are redelivered by the queue, so
/// delivery is at-least-once.
///
/// The loop is meant to be shared through an `Arc`: one task drives
/// [`run`](Self::run) (or use [`start`](Self::start)) while another calls
/// [`shutdown`](Self::shutdown).
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use sqs_loop::{client, errors::HandlerError, receiver::SqsLoop, transport::Message};
///
/// #[tokio::main]
/// async fn main() {
///     let client = client::create_sqs_client_from_env().await;
///     let sqs_loop = Arc::new(SqsLoop::new(
///         client,
///         "https://sqs.us-east-1.amazonaws.com/000000000000/outbox",
///         |message: Message| async move {
///             println!("{}", message.body());
///             Ok::<(), HandlerError>(())
///         },
///     ));
///
///     let task = sqs_loop.start();
///     tokio::signal::ctrl_c().await.unwrap();
///
///     let deadline = tokio::time::Instant::now() + Duration::from_secs(30);
///     sqs_loop.shutdown(deadline).await.unwrap();
///     task.await.unwrap().unwrap();
/// }
/// ```
pub struct SqsLoop<T, H> {
    transport: T,
    queue_url: String,
    handler: H,
    config: SqsLoopConfig,

    // Shutdown handling
    stop: CancellationToken,
    state: watch::Sender<RunState>,
}

impl<T, H> SqsLoop<T, H>
where
    T: QueueTransport,
    H: MessageHandler,
{
    pub fn new(transport: T, queue_url: &str, handler: H) -> Self {
        Self::with_config(transport, queue_url, handler, SqsLoopConfig::default())
    }

    pub fn with_config(transport: T, queue_url: &str, handler: H, config: SqsLoopConfig) -> Self {
        let (state, _) = watch::channel(RunState::NotStarted);

        SqsLoop {
            transport,
            queue_url: queue_url.to_string(),
            handler,
            config,
            stop: CancellationToken::new(),
            state,
        }
    }

    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }

    pub fn state(&self) -> RunState {
        *self.state.borrow()
    }

    /// Spawns the loop onto its own tokio task.
    ///
    /// The loop counts as running as soon as this returns, so a
    /// [`shutdown`](Self::shutdown) issued right afterwards stops it even if
    /// the task has not been polled yet. Starting an instance twice resolves
    /// the returned handle to [`SqsLoopError::InvalidStateError`].
    pub fn start(self: &Arc<Self>) -> JoinHandle<Result<(), SqsLoopError>>
    where
        T: 'static,
        H: 'static,
    {
        if let Err(err) = self.begin() {
            return tokio::spawn(async move { Err::<(), _>(err) });
        }

        let sqs_loop = Arc::clone(self);
        tokio::spawn(async move {
            sqs_loop.run_started().await;
            Ok(())
        })
    }

    /// Polls the queue until [`shutdown`](Self::shutdown) is called.
    ///
    /// Failed poll cycles are logged and retried; they never end the loop.
    /// Returns [`SqsLoopError::InvalidStateError`] if the loop has already
    /// been started on this instance.
    pub async fn run(&self) -> Result<(), SqsLoopError> {
        self.begin()?;
        self.run_started().await;
        Ok(())
    }

    /// NotStarted -> Running, or the state that prevents it.
    fn begin(&self) -> Result<(), SqsLoopError> {
        let mut previous = RunState::NotStarted;
        let started = self.state.send_if_modified(|state| {
            previous = *state;
            if *state == RunState::NotStarted {
                *state = RunState::Running;
                true
            } else {
                false
            }
        });

        if started {
            Ok(())
        } else {
            Err(SqsLoopError::InvalidStateError(previous))
        }
    }

    async fn run_started(&self) {
        let _stopped = StoppedGuard(&self.state);
        tracing::info!(queue_url = %self.queue_url, "Starting SQS loop");

        loop {
            if self.stop.is_cancelled() {
                tracing::info!(queue_url = %self.queue_url, "SQS loop stopped");
                return;
            }

            let mut backoff = ExponentialBackoff::new(self.config.backoff.clone());
            let result = backoff::retry_notify(
                &mut backoff,
                &self.stop,
                || self.poll(),
                |err, delay| {
                    tracing::warn!(
                        queue_url = %self.queue_url,
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        "Poll cycle failed, backing off"
                    );
                },
            )
            .await;

            match result {
                Ok(()) | Err(SqsLoopError::CancelledError) => {}
                Err(err) => {
                    tracing::error!(queue_url = %self.queue_url, error = %err, "Poll cycle retries gave up");
                }
            }
        }
    }

    /// One fetch-handle-delete cycle.
    async fn poll(&self) -> Result<(), SqsLoopError> {
        tracing::debug!(queue_url = %self.queue_url, "Polling SQS queue for messages");

        let messages = self
            .transport
            .fetch(
                &self.queue_url,
                self.config.max_number_of_messages,
                self.config.wait_time_seconds,
            )
            .await?;

        if !messages.is_empty() {
            tracing::debug!(count = messages.len(), "Received messages");
        }

        for message in messages {
            let receipt_handle = message.receipt_handle.clone();

            self.handler.handle(message).await?;
            self.transport
                .delete(&self.queue_url, &receipt_handle)
                .await?;

            tracing::debug!(receipt_handle = %receipt_handle, "Deleted handled message");
        }

        Ok(())
    }

    /// Asks the loop to stop and waits until it has, or until `deadline`.
    ///
    /// The current poll cycle is allowed to finish; a pending backoff delay is
    /// cut short. On [`SqsLoopError::ShutdownTimeoutError`] the stop request
    /// stays in effect and the loop still stops on its own afterwards.
    /// Calling this before the loop was ever started is a no-op.
    pub async fn shutdown(&self, deadline: Instant) -> Result<(), SqsLoopError> {
        let mut not_started = false;
        self.state.send_if_modified(|state| match *state {
            RunState::NotStarted => {
                not_started = true;
                false
            }
            RunState::Running => {
                *state = RunState::ShuttingDown;
                true
            }
            RunState::ShuttingDown | RunState::Stopped => false,
        });
        if not_started {
            return Ok(());
        }

        tracing::info!(queue_url = %self.queue_url, "Stopping SQS loop");
        self.stop.cancel();

        let mut state = self.state.subscribe();
        match tokio::time::timeout_at(deadline, state.wait_for(|s| *s == RunState::Stopped)).await
        {
            Ok(_) => Ok(()),
            Err(_) => Err(SqsLoopError::ShutdownTimeoutError),
        }
    }
}

/// Marks the loop as stopped on every exit path out of `run`.
struct StoppedGuard<'a>(&'a watch::Sender<RunState>);

impl Drop for StoppedGuard<'_> {
    fn drop(&mut self) {
        self.0.send_replace(RunState::Stopped);
    }
}
