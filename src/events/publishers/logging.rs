use async_trait::async_trait;

use crate::events::{EventPublisher, NotifyError};

/// Writes every event to the `log` facade instead of a broker.
pub struct LoggingPublisher {
    level: log::Level,
}

impl LoggingPublisher {
    /// Logs at INFO.
    pub fn new() -> Self {
        Self {
            level: log::Level::Info,
        }
    }

    pub fn with_level(level: log::Level) -> Self {
        Self { level }
    }
}

impl Default for LoggingPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for LoggingPublisher {
    async fn publish(&self, topic: &str, key: &str, payload: &[u8]) -> Result<(), NotifyError> {
        let body = std::str::from_utf8(payload)
            .map_err(|e| NotifyError::Serialization(e.to_string()))?;

        log::log!(
            target: "vira_id::events",
            self.level,
            "topic={topic} key={key} payload={body}"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(LoggingPublisher::default().level, log::Level::Info);
        assert_eq!(
            LoggingPublisher::with_level(log::Level::Debug).level,
            log::Level::Debug
        );
    }

    #[tokio::test]
    async fn test_publish() {
        let publisher = LoggingPublisher::new();
        assert!(publisher.publish("t", "k", br#"{"a":1}"#).await.is_ok());
        assert!(matches!(
            publisher.publish("t", "k", &[0xff, 0xfe]).await,
            Err(NotifyError::Serialization(_))
        ));
    }
}
