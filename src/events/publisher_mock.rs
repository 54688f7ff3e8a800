#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{EventPayload, EventPublisher, NotifyError};

#[derive(Debug, Clone)]
pub struct PublishedEvent {
    pub topic: String,
    pub key: String,
    pub payload: Vec<u8>,
}

impl PublishedEvent {
    pub fn decode(&self) -> EventPayload {
        serde_json::from_slice(&self.payload).unwrap()
    }
}

/// Records everything published. Can be told to fail or stall.
#[derive(Clone, Default)]
pub struct MockEventPublisher {
    pub published: Arc<Mutex<Vec<PublishedEvent>>>,
    fail: bool,
    delay: Option<Duration>,
}

impl MockEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every publish returns `NotifyError::Publish`.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Sleeps before recording each event.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<PublishedEvent> {
        self.published.lock().unwrap().clone()
    }

    pub fn event_types(&self) -> Vec<String> {
        self.events().iter().map(|e| e.decode().event_type).collect()
    }
}

#[async_trait]
impl EventPublisher for MockEventPublisher {
    async fn publish(&self, topic: &str, key: &str, payload: &[u8]) -> Result<(), NotifyError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail {
            return Err(NotifyError::Publish("broker unavailable".to_owned()));
        }

        self.published.lock().unwrap().push(PublishedEvent {
            topic: topic.to_owned(),
            key: key.to_owned(),
            payload: payload.to_vec(),
        });
        Ok(())
    }
}
