//! Bounded worker pool delivering events off the request path.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;

use super::{AuthEvent, EventPublisher, InMemoryMetrics, MetricsRecorder, NotifyError};
use crate::config::NotifierConfig;

/// Handle used by the actions to submit events.
///
/// Cheap to clone. [`notify`](Self::notify) never blocks and never fails: when
/// the queue is full or the pool has shut down the event is dropped, logged
/// and counted.
#[derive(Clone)]
pub struct EventNotifier {
    sender: Option<mpsc::Sender<AuthEvent>>,
    metrics: Arc<dyn MetricsRecorder>,
}

/// Owns the worker tasks started by [`EventNotifier::start`].
///
/// Dropping it without calling [`shutdown`](Self::shutdown) also stops the
/// workers once the queue is drained, but nothing waits for them.
pub struct NotifierWorkers {
    stop: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

struct Delivery<P> {
    publisher: P,
    metrics: Arc<dyn MetricsRecorder>,
    topic: String,
    source: String,
    timeout: Duration,
}

impl EventNotifier {
    /// Spawns `config.workers` tasks (at least one) reading a queue of
    /// `config.queue_capacity` events.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start<P: EventPublisher>(
        publisher: P,
        metrics: Arc<dyn MetricsRecorder>,
        config: NotifierConfig,
    ) -> (Self, NotifierWorkers) {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let (stop, stopped) = watch::channel(false);

        let receiver = Arc::new(Mutex::new(receiver));
        let delivery = Arc::new(Delivery {
            publisher,
            metrics: Arc::clone(&metrics),
            topic: config.topic,
            source: config.source,
            timeout: config.publish_timeout,
        });

        let handles = (0..config.workers.max(1))
            .map(|id| {
                tokio::spawn(run_worker(
                    id,
                    Arc::clone(&receiver),
                    stopped.clone(),
                    Arc::clone(&delivery),
                ))
            })
            .collect();

        log::info!(
            target: "vira_id",
            "msg=\"event notifier started\" workers={} capacity={}",
            config.workers.max(1),
            config.queue_capacity.max(1)
        );

        (
            Self {
                sender: Some(sender),
                metrics,
            },
            NotifierWorkers { stop, handles },
        )
    }

    /// A notifier that discards everything. For callers that do not publish
    /// events.
    pub fn noop() -> Self {
        Self {
            sender: None,
            metrics: Arc::new(InMemoryMetrics::new()),
        }
    }

    pub fn notify(&self, event: AuthEvent) {
        let Some(sender) = &self.sender else {
            return;
        };

        let name = event.name();
        let reason = match sender.try_send(event) {
            Ok(()) => return,
            Err(mpsc::error::TrySendError::Full(_)) => NotifyError::QueueFull,
            Err(mpsc::error::TrySendError::Closed(_)) => NotifyError::Closed,
        };

        self.metrics.event_dropped(name);
        log::warn!(
            target: "vira_id",
            "msg=\"event dropped\" event={name} reason=\"{reason}\""
        );
    }
}

impl NotifierWorkers {
    /// Stops accepting events, lets the workers drain what is already queued
    /// and waits for them to exit.
    pub async fn shutdown(self) {
        self.stop.send_replace(true);

        for handle in self.handles {
            if let Err(e) = handle.await {
                log::error!(
                    target: "vira_id",
                    "msg=\"event worker panicked\" error=\"{e}\""
                );
            }
        }

        log::info!(target: "vira_id", "msg=\"event notifier stopped\"");
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

async fn run_worker<P: EventPublisher>(
    id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<AuthEvent>>>,
    mut stopped: watch::Receiver<bool>,
    delivery: Arc<Delivery<P>>,
) {
    let mut closing = false;

    loop {
        let next = {
            let mut rx = receiver.lock().await;
            if closing || *stopped.borrow() {
                // remaining events are still handed out until the queue is empty
                rx.close();
                closing = true;
            }

            tokio::select! {
                biased;
                event = rx.recv() => event,
                _ = stopped.changed(), if !closing => {
                    closing = true;
                    continue;
                }
            }
        };

        let Some(event) = next else {
            break;
        };

        delivery.deliver(event).await;
    }

    log::debug!(target: "vira_id", "msg=\"event worker exited\" worker={id}");
}

impl<P: EventPublisher> Delivery<P> {
    async fn deliver(&self, event: AuthEvent) {
        let name = event.name();

        match self.send(&event).await {
            Ok(()) => {
                self.metrics.event_published(name);
                log::debug!(
                    target: "vira_id",
                    "msg=\"event published\" event={name} user_id={}",
                    event.user_id()
                );
            }
            Err(e) => {
                self.metrics.event_failed(name);
                log::warn!(
                    target: "vira_id",
                    "msg=\"event publish failed\" event={name} user_id={} error=\"{e}\"",
                    event.user_id()
                );
            }
        }
    }

    async fn send(&self, event: &AuthEvent) -> Result<(), NotifyError> {
        let payload = serde_json::to_vec(&event.payload(&self.source))
            .map_err(|e| NotifyError::Serialization(e.to_string()))?;
        let key = event.user_id().to_string();

        tokio::time::timeout(
            self.timeout,
            self.publisher.publish(&self.topic, &key, &payload),
        )
        .await
        .map_err(|_| NotifyError::Timeout)?
    }
}
