use async_trait::async_trait;

use crate::errors::SqsLoopError;

/// A message received from the queue.
///
/// The receipt handle is only valid for the receive call that produced it and
/// is what the loop uses to delete the message once it has been handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// The queue-assigned message id, if the transport reports one.
    pub message_id: Option<String>,

    /// The message payload.
    pub body: Option<String>,

    /// Deletion token for this particular delivery.
    pub receipt_handle: String,
}

impl Message {
    pub fn new(receipt_handle: impl Into<String>, body: impl Into<String>) -> Self {
        Message {
            message_id: None,
            body: Some(body.into()),
            receipt_handle: receipt_handle.into(),
        }
    }

    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    /// Returns the body, or an empty string when the message has none.
    pub fn body(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}

/// The two queue primitives the loop needs.
///
/// Neither call is retried here; a failure fails the whole poll cycle and the
/// cycle is retried instead.
#[async_trait]
pub trait QueueTransport: Send + Sync {
    /// Receives up to `max_number_of_messages`, long polling for at most
    /// `wait_time_seconds` when the queue is empty.
    async fn fetch(
        &self,
        queue_url: &str,
        max_number_of_messages: i32,
        wait_time_seconds: i32,
    ) -> Result<Vec<Message>, SqsLoopError>;

    /// Removes a single delivery from the queue.
    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> Result<(), SqsLoopError>;
}

#[async_trait]
impl QueueTransport for aws_sdk_sqs::Client {
    async fn fetch(
        &self,
        queue_url: &str,
        max_number_of_messages: i32,
        wait_time_seconds: i32,
    ) -> Result<Vec<Message>, SqsLoopError> {
        let output = self
            .receive_message()
            .queue_url(queue_url)
            .max_number_of_messages(max_number_of_messages)
            .wait_time_seconds(wait_time_seconds)
            .send()
            .await
            .map_err(|e| SqsLoopError::FetchError(Box::new(e)))?;

        output
            .messages()
            .iter()
            .map(|message| {
                let receipt_handle = message.receipt_handle().ok_or_else(|| {
                    SqsLoopError::FetchError("received a message without a receipt handle".into())
                })?;

                Ok(Message {
                    message_id: message.message_id().map(str::to_string),
                    body: message.body().map(str::to_string),
                    receipt_handle: receipt_handle.to_string(),
                })
            })
            .collect()
    }

    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> Result<(), SqsLoopError> {
        self.delete_message()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| SqsLoopError::DeleteError(Box::new(e)))?;

        Ok(())
    }
}
