//! Fire-and-forget lifecycle events.
//!
//! Actions hand an [`AuthEvent`] to an [`EventNotifier`]; a fixed pool of
//! worker tasks serializes it to JSON and passes it to an
//! [`EventPublisher`], each attempt bounded by a timeout. Delivery outcomes
//! go to an injected [`MetricsRecorder`]. Nothing here can fail a login.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vira_id::config::NotifierConfig;
//! use vira_id::events::{EventNotifier, LoggingPublisher, MetricsFacade};
//!
//! let (notifier, workers) = EventNotifier::start(
//!     LoggingPublisher::new(),
//!     Arc::new(MetricsFacade),
//!     NotifierConfig::default(),
//! );
//!
//! // hand `notifier` to the SessionManager, then on exit:
//! workers.shutdown().await;
//! ```

mod event;
mod metrics;
mod notifier;
mod publisher;
#[cfg(any(test, feature = "mocks"))]
mod publisher_mock;

pub mod publishers;

pub use event::{AuthEvent, EventMetadata, EventPayload};
pub use metrics::{InMemoryMetrics, MetricsFacade, MetricsRecorder};
pub use notifier::{EventNotifier, NotifierWorkers};
pub use publisher::{EventPublisher, NotifyError};
pub use publishers::LoggingPublisher;
#[cfg(feature = "tracing")]
pub use publishers::TracingPublisher;

#[cfg(any(test, feature = "mocks"))]
pub use publisher_mock::{MockEventPublisher, PublishedEvent};
