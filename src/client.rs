//! Constructors for the `aws_sdk_sqs::Client` that [`SqsLoop`] polls.
//!
//! The client implements [`QueueTransport`], so any of these can be handed
//! straight to [`SqsLoop::new`].
//!
//! [`SqsLoop`]: crate::receiver::SqsLoop
//! [`SqsLoop::new`]: crate::receiver::SqsLoop::new
//! [`QueueTransport`]: crate::transport::QueueTransport

use aws_config::Region;
use aws_sdk_sqs::config::SharedCredentialsProvider;

/// Client for the regional AWS endpoint, configured by the default provider
/// chain (`AWS_REGION`, `AWS_PROFILE`, access key variables, instance roles).
///
/// ```rust,no_run
/// use sqs_loop::client::create_sqs_client_from_env;
/// use sqs_loop::{errors::HandlerError, receiver::SqsLoop, transport::Message};
///
/// #[tokio::main]
/// async fn main() {
///     let sqs_loop = SqsLoop::new(
///         create_sqs_client_from_env().await,
///         "https://sqs.eu-west-1.amazonaws.com/000000000000/outbox",
///         |_message: Message| async { Ok::<(), HandlerError>(()) },
///     );
///     sqs_loop.run().await.unwrap();
/// }
/// ```
pub async fn create_sqs_client_from_env() -> aws_sdk_sqs::Client {
    let config = aws_config::load_from_env().await;
    aws_sdk_sqs::Client::new(&config)
}

/// Client for an SQS-compatible endpoint such as LocalStack.
///
/// Region and credentials still come from the environment; LocalStack accepts
/// any credentials, so `AWS_ACCESS_KEY_ID=test` is enough. The queue URL passed
/// to the loop must be the one the endpoint reports, for example
/// `http://sqs.us-east-1.localhost.localstack.cloud:4566/000000000000/outbox`.
///
/// ```rust,no_run
/// # async fn demo() {
/// let client = sqs_loop::client::create_sqs_client_with_endpoint("http://localhost:4566").await;
/// # }
/// ```
pub async fn create_sqs_client_with_endpoint(endpoint_url: &str) -> aws_sdk_sqs::Client {
    let config = aws_config::from_env()
        .endpoint_url(endpoint_url)
        .load()
        .await;
    aws_sdk_sqs::Client::new(&config)
}

/// Client with static credentials, for processes that fetch their keys from
/// somewhere other than the environment.
///
/// No provider chain is consulted, so nothing is read from disk or the
/// instance metadata service.
pub fn create_sqs_client_with_credentials(
    access_key_id: &str,
    secret_access_key: &str,
    region: &str,
) -> aws_sdk_sqs::Client {
    let credentials = aws_sdk_sqs::config::Credentials::new(
        access_key_id,
        secret_access_key,
        None,
        None,
        "sqs-loop-static",
    );

    let config = aws_sdk_sqs::config::Builder::new()
        .behavior_version(aws_sdk_sqs::config::BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .credentials_provider(SharedCredentialsProvider::new(credentials))
        .build();

    aws_sdk_sqs::Client::from_conf(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_credentials_client_uses_given_region() {
        let client = create_sqs_client_with_credentials("AKIDEXAMPLE", "secret", "eu-west-1");

        assert_eq!(
            client.config().region().map(|region| region.as_ref()),
            Some("eu-west-1")
        );
    }
}
