use crate::record::LogEvent;
use crate::sink::{EventSink, LogSink};
use async_trait::async_trait;
use std::error::Error;
use std::sync::{Mutex, PoisonError};

/// A sink that simply drops all events.
///
/// Useful for measuring the overhead of building events without any
/// output, and for code paths that must log but have nowhere to log to.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _event: LogEvent) {}
}

#[async_trait]
impl LogSink for NoopSink {
    async fn send(&self, _event: &LogEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}

/// A sink that keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<LogEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the events emitted so far.
    pub fn events(&self) -> Vec<LogEvent> {
        self.lock().clone()
    }

    /// Remove and return the events emitted so far.
    pub fn take(&self) -> Vec<LogEvent> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave the Vec half-written.
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: LogEvent) {
        self.lock().push(event);
    }
}

#[async_trait]
impl LogSink for MemorySink {
    async fn send(&self, event: &LogEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.lock().push(event.clone());
        Ok(())
    }
}
