use async_trait::async_trait;
use std::future::Future;

use crate::errors::HandlerError;
use crate::transport::Message;

/// Trait for processing messages received by an [`SqsLoop`](super::SqsLoop).
///
/// Returning `Ok(())` deletes the message from the queue. Returning an error
/// leaves it (and the rest of its batch) on the queue, so the same message can
/// be handled more than once; implementations must tolerate duplicates.
///
/// Any async closure `Fn(Message) -> impl Future<Output = Result<(), HandlerError>>`
/// is a handler.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: Message) -> Result<(), HandlerError>;
}

#[async_trait]
impl<F, Fut> MessageHandler for F
where
    F: Fn(Message) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn handle(&self, message: Message) -> Result<(), HandlerError> {
        (self)(message).await
    }
}

/// A handler function paired with a resource shared across invocations.
///
/// Each call receives its own clone of the shared resource, which makes it a
/// natural fit for connection pools, `Arc`s and similar cheap handles.
///
/// # Type Parameters
///
/// * `RFn` - The message handler function type
/// * `TShared` - The type of shared resources passed to the handler
pub struct SharedHandler<RFn, TShared> {
    rv_fn: RFn,
    shared_resources: TShared,
}

impl<RFn, Fut, TShared> SharedHandler<RFn, TShared>
where
    RFn: Fn(Message, TShared) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    TShared: Send + Sync + Clone + 'static,
{
    /// Creates a new handler.
    ///
    /// # Arguments
    ///
    /// * `rv_fn` - The message handler function
    /// * `shared_resources` - Resources shared between message processing calls
    pub fn new(rv_fn: RFn, shared_resources: TShared) -> Self {
        SharedHandler {
            rv_fn,
            shared_resources,
        }
    }
}

#[async_trait]
impl<RFn, Fut, TShared> MessageHandler for SharedHandler<RFn, TShared>
where
    RFn: Fn(Message, TShared) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    TShared: Send + Sync + Clone + 'static,
{
    async fn handle(&self, message: Message) -> Result<(), HandlerError> {
        (self.rv_fn)(message, self.shared_resources.clone()).await
    }
}
