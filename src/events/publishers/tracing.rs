use async_trait::async_trait;

use crate::events::{EventPublisher, NotifyError};

/// Emits every event as a `tracing` event.
///
/// Requires the `tracing` feature.
pub struct TracingPublisher;

#[async_trait]
impl EventPublisher for TracingPublisher {
    async fn publish(&self, topic: &str, key: &str, payload: &[u8]) -> Result<(), NotifyError> {
        tracing::info!(
            target: "vira_id::events",
            topic,
            key,
            payload = %String::from_utf8_lossy(payload),
            "auth event"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tracing_publisher() {
        assert!(TracingPublisher.publish("t", "k", b"{}").await.is_ok());
    }
}
