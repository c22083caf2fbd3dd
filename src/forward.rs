use crate::record::LogEvent;
use crate::sink::{EventSink, LogSink};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

/// [`EventSink`] that hands events to an asynchronous [`LogSink`] through
/// a bounded channel and a background task.
///
/// `emit` never blocks: when the channel is full the event is dropped and
/// counted. Events are sent one at a time; a failed send is reported and
/// not retried.
pub struct ForwardingSink {
    sender: mpsc::Sender<LogEvent>,
    /// Total events offered to the sink.
    pub total_events: Arc<AtomicU64>,
    /// Successfully enqueued into channel.
    pub enqueued_events: Arc<AtomicU64>,
    /// Dropped because the channel was full or closed.
    pub dropped_events: Arc<AtomicU64>,
    /// Rejected by the backend.
    pub failed_events: Arc<AtomicU64>,
}

impl ForwardingSink {
    /// Minimum channel capacity.
    pub const MIN_BUFFER: usize = 16;

    /// Create the sink and spawn the task that drains it into `sink`.
    ///
    /// Must be called from within a Tokio runtime. The task ends, after
    /// flushing the backend, once the returned sink is dropped.
    pub fn new(sink: Arc<dyn LogSink>, buffer: usize) -> (Self, JoinHandle<()>) {
        let buffer = buffer.max(Self::MIN_BUFFER);
        let (tx, mut rx) = mpsc::channel::<LogEvent>(buffer);

        let total_events = Arc::new(AtomicU64::new(0));
        let enqueued_events = Arc::new(AtomicU64::new(0));
        let dropped_events = Arc::new(AtomicU64::new(0));
        let failed_events = Arc::new(AtomicU64::new(0));

        let failed_events_bg = Arc::clone(&failed_events);

        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let Err(e) = sink.send(&event).await {
                    failed_events_bg.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(error = %e, "log sink rejected event");
                }
            }

            if let Err(e) = sink.flush().await {
                tracing::warn!(error = %e, "log sink flush failed");
            }
        });

        (
            Self {
                sender: tx,
                total_events,
                enqueued_events,
                dropped_events,
                failed_events,
            },
            handle,
        )
    }
}

impl EventSink for ForwardingSink {
    fn emit(&self, event: LogEvent) {
        self.total_events.fetch_add(1, Ordering::Relaxed);
        match self.sender.try_send(event) {
            Ok(()) => {
                self.enqueued_events.fetch_add(1, Ordering::Relaxed);
            }
            Err(TrySendError::Full(_)) => {
                self.dropped_events.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("log channel full, dropping log event");
            }
            Err(TrySendError::Closed(_)) => {
                self.dropped_events.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("log channel closed, dropping log event");
            }
        }
    }
}
