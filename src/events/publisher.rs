use std::fmt;

use async_trait::async_trait;

/// Failure while handing an event to the transport.
///
/// Never returned to callers of the session actions; only logged and counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    Serialization(String),
    Publish(String),
    Timeout,
    QueueFull,
    Closed,
}

impl std::error::Error for NotifyError {}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serialization(msg) => write!(f, "Event serialization failed: {msg}"),
            Self::Publish(msg) => write!(f, "Publish failed: {msg}"),
            Self::Timeout => write!(f, "Publish timed out"),
            Self::QueueFull => write!(f, "Event queue is full"),
            Self::Closed => write!(f, "Event queue is closed"),
        }
    }
}

/// Transport for serialized events, e.g. a message broker producer.
///
/// `key` is the account id, so events of one user keep their order on
/// partitioned transports.
///
/// ```rust,ignore
/// use vira_id::events::{EventPublisher, NotifyError};
/// use async_trait::async_trait;
///
/// struct KafkaPublisher { producer: FutureProducer }
///
/// #[async_trait]
/// impl EventPublisher for KafkaPublisher {
///     async fn publish(&self, topic: &str, key: &str, payload: &[u8]) -> Result<(), NotifyError> {
///         self.producer
///             .send(FutureRecord::to(topic).key(key).payload(payload), Timeout::Never)
///             .await
///             .map(|_| ())
///             .map_err(|(e, _)| NotifyError::Publish(e.to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait EventPublisher: Send + Sync + 'static {
    async fn publish(&self, topic: &str, key: &str, payload: &[u8]) -> Result<(), NotifyError>;
}
