//! Built-in event publishers.

mod logging;
#[cfg(feature = "tracing")]
mod tracing;

pub use logging::LoggingPublisher;
#[cfg(feature = "tracing")]
pub use self::tracing::TracingPublisher;
