use crate::record::LogEvent;
use async_trait::async_trait;
use std::error::Error;

/// Destination of the events produced by [`crate::logger::FluentLogger::write`].
///
/// `emit` is called synchronously on the logging thread, once per written
/// chain. What happens afterwards (level routing, formatting, transport)
/// is up to the implementation; failures stay inside the sink.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: LogEvent);
}

/// Asynchronous backend for [`LogEvent`]s.
///
/// Implementations are responsible for transporting events to a concrete
/// store. They are driven by [`crate::forward::ForwardingSink`] from a
/// background task and never awaited on the application thread.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Send a single log event to the underlying backend.
    ///
    /// **Parameters**
    /// - `event`: fully-populated [`LogEvent`] produced by a fluent chain.
    ///
    /// **Returns**
    /// - `Ok(())` if the event was accepted by the backend.
    /// - `Err(..)` if the backend failed. The forwarder reports the error
    ///   and moves on to the next event.
    async fn send(&self, event: &LogEvent) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Flush any buffered events, if the backend implements buffering.
    ///
    /// Default implementation is a no-op.
    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
