use crate::properties::Properties;
use crate::severity::Severity;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::error::Error;

/// A single structured log event, built once per fluent chain and handed
/// to an [`crate::sink::EventSink`].
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    /// Backend level name, e.g. `"FATAL"`.
    pub level: String,
    pub severity: Severity,
    pub message: String,
    pub location: CallerLocation,
    pub logger_name: String,
    pub identity: Option<String>,
    pub user_name: Option<String>,
    /// Name of the process that produced the event.
    pub domain: String,
    pub exception: Option<ExceptionInfo>,
    pub properties: Properties,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallerLocation {
    pub type_name: String,
    pub method_name: String,
    pub file: String,
    pub line: u32,
}

/// Text captured from an error passed to the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExceptionInfo {
    pub message: String,
    /// Messages of the `source()` chain, outermost first.
    pub sources: Vec<String>,
}

impl ExceptionInfo {
    pub fn from_error(error: &(dyn Error + 'static)) -> Self {
        let mut sources = Vec::new();
        let mut next = error.source();
        while let Some(source) = next {
            sources.push(source.to_string());
            next = source.source();
        }
        Self {
            message: error.to_string(),
            sources,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(thiserror::Error, Debug)]
    #[error("query failed")]
    struct QueryError(#[source] std::io::Error);

    #[test]
    fn exception_info_walks_source_chain() {
        let err = QueryError(std::io::Error::new(std::io::ErrorKind::Other, "connection reset"));
        let info = ExceptionInfo::from_error(&err);
        assert_eq!(info.message, "query failed");
        assert_eq!(info.sources, vec!["connection reset".to_string()]);
    }
}
