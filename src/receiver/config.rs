use super::backoff::BackoffConfig;

/// Configuration for the SQS loop.
///
/// # Fields
/// - `max_number_of_messages`: The maximum number of messages to receive in a single request.
/// - `wait_time_seconds`: The wait time for long polling, in seconds.
/// - `backoff`: How failed poll cycles are retried.
#[derive(Debug, Clone)]
pub struct SqsLoopConfig {
    /// The maximum number of messages to receive in a single request.
    pub max_number_of_messages: i32,

    /// The wait time for long polling, in seconds.
    pub wait_time_seconds: i32,

    /// Backoff applied between failed poll cycles.
    pub backoff: BackoffConfig,
}

impl SqsLoopConfig {
    pub fn with_max_number_of_messages(mut self, max_number_of_messages: i32) -> Self {
        self.max_number_of_messages = max_number_of_messages;
        self
    }

    pub fn with_wait_time_seconds(mut self, wait_time_seconds: i32) -> Self {
        self.wait_time_seconds = wait_time_seconds;
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }
}

impl Default for SqsLoopConfig {
    fn default() -> Self {
        SqsLoopConfig {
            max_number_of_messages: 10,
            wait_time_seconds: 5,
            backoff: BackoffConfig::default(),
        }
    }
}
