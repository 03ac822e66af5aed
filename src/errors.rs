use std::str::FromStr;

use thiserror::Error;

use crate::receiver::RunState;

/// Boxed error type used to carry transport and handler failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for SQS loop operations.
///
/// Fetch, handler and delete failures all mark the current poll cycle as
/// failed and are retried the same way; the variants only differ in what
/// gets logged.
#[derive(Debug, Error)]
pub enum SqsLoopError {
    /// Error that occurs during AWS SQS client initialization.
    ///
    /// This error typically happens when there are issues with AWS credentials,
    /// region configuration, or network connectivity during client setup.
    #[error("failed to initialize AWS SQS client: {0}")]
    InitializationError(String),

    /// Receiving from the queue failed or returned a malformed response.
    #[error("error polling sqs: {0}")]
    FetchError(#[source] BoxError),

    /// The message handler rejected a message.
    #[error("handler error: {0}")]
    HandlerError(#[from] HandlerError),

    /// A message was handled but could not be removed from the queue.
    #[error("error deleting message: {0}")]
    DeleteError(#[source] BoxError),

    /// The shutdown deadline elapsed before the loop stopped.
    ///
    /// The stop request has been sent; the loop still converges to
    /// [`RunState::Stopped`] once its current cycle finishes.
    #[error("deadline exceeded while waiting for the sqs loop to stop")]
    ShutdownTimeoutError,

    /// A bounded backoff gave up. Carries the error of the last attempt.
    #[error("gave up after {attempts} attempts: {source}")]
    RetriesExhaustedError {
        attempts: u32,
        #[source]
        source: Box<SqsLoopError>,
    },

    /// Retrying was interrupted by a shutdown request.
    #[error("retry cancelled by shutdown")]
    CancelledError,

    /// `run` was called on a loop that is not in [`RunState::NotStarted`].
    #[error("sqs loop cannot run from state {0:?}")]
    InvalidStateError(RunState),
}

/// Opaque error returned by message handlers.
///
/// Any handler failure aborts the rest of the batch and leaves the message on
/// the queue for redelivery.
#[derive(Debug)]
pub struct HandlerError {
    message: String,
    source: Option<BoxError>,
}

impl HandlerError {
    /// Creates a new `HandlerError` with the provided message.
    pub fn new(message: impl Into<String>) -> Self {
        HandlerError {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an arbitrary error, keeping it as the error source.
    pub fn from_error<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        HandlerError {
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for HandlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn std::error::Error + 'static))
    }
}

impl FromStr for HandlerError {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(HandlerError::new(s))
    }
}

impl From<String> for HandlerError {
    fn from(s: String) -> Self {
        HandlerError::new(s)
    }
}

impl From<&str> for HandlerError {
    fn from(s: &str) -> Self {
        HandlerError::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn handler_error_keeps_source() {
        let io = std::io::Error::other("disk full");
        let err = HandlerError::from_error(io);

        assert_eq!(err.to_string(), "disk full");
        assert!(err.source().is_some());
    }

    #[test]
    fn handler_error_from_string_has_no_source() {
        let err: HandlerError = "bad payload".into();

        assert_eq!(err.to_string(), "bad payload");
        assert!(err.source().is_none());
    }

    #[test]
    fn loop_error_wraps_handler_error() {
        let err = SqsLoopError::from(HandlerError::new("boom"));

        assert_eq!(err.to_string(), "handler error: boom");
        assert!(matches!(err, SqsLoopError::HandlerError(_)));
    }

    #[test]
    fn exhausted_error_reports_last_failure() {
        let err = SqsLoopError::RetriesExhaustedError {
            attempts: 3,
            source: Box::new(SqsLoopError::FetchError("queue unreachable".into())),
        };

        assert_eq!(
            err.to_string(),
            "gave up after 3 attempts: error polling sqs: queue unreachable"
        );
    }
}
