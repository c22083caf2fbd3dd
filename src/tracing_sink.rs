use crate::record::LogEvent;
use crate::sink::EventSink;
use tracing::Level;

/// Target of the `tracing` events produced by [`TracingSink`].
pub const TRACING_TARGET: &str = "fluent_log_sink";

/// [`EventSink`] that re-emits every [`LogEvent`] as a `tracing` event,
/// leaving filtering and output to the installed subscriber.
///
/// The level comes from [`crate::severity::Severity::to_level`]; the
/// severity name is kept in the `severity` field so `FATAL` stays
/// distinguishable from `ERROR`. Properties are attached as one JSON
/// object in the `properties` field. An error's source chain goes into
/// `exception.sources`, joined with `": "`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        TracingSink
    }
}

macro_rules! emit_at {
    ($level:expr, $event:expr, $properties:expr, $sources:expr) => {
        tracing::event!(
            target: TRACING_TARGET,
            $level,
            severity = $event.level.as_str(),
            logger = $event.logger_name.as_str(),
            identity = $event.identity.as_deref(),
            domain = $event.domain.as_str(),
            caller.type_name = $event.location.type_name.as_str(),
            caller.method = $event.location.method_name.as_str(),
            caller.file = $event.location.file.as_str(),
            caller.line = $event.location.line,
            exception = $event.exception.as_ref().map(|e| e.message.as_str()),
            exception.sources = $sources,
            properties = $properties.as_str(),
            "{}",
            $event.message
        )
    };
}

impl EventSink for TracingSink {
    fn emit(&self, event: LogEvent) {
        let properties =
            serde_json::to_string(&event.properties).unwrap_or_else(|_| "{}".to_string());
        let sources = event
            .exception
            .as_ref()
            .filter(|e| !e.sources.is_empty())
            .map(|e| e.sources.join(": "));
        let sources = sources.as_deref();

        let level = event.severity.to_level();
        if level == Level::ERROR {
            emit_at!(Level::ERROR, event, properties, sources);
        } else if level == Level::WARN {
            emit_at!(Level::WARN, event, properties, sources);
        } else if level == Level::INFO {
            emit_at!(Level::INFO, event, properties, sources);
        } else if level == Level::DEBUG {
            emit_at!(Level::DEBUG, event, properties, sources);
        } else {
            emit_at!(Level::TRACE, event, properties, sources);
        }
    }
}
