//! Fluent logging facade.
//!
//! ```rust
//! use std::sync::Arc;
//! use fluent_log_sink::logger::Logger;
//! use fluent_log_sink::memory_sink::MemorySink;
//!
//! let sink = Arc::new(MemorySink::new());
//! let logger = Logger::new("checkout", sink.clone());
//!
//! logger
//!     .message("payment declined")
//!     .warn()
//!     .data("order-id", "A-1001")
//!     .data("attempt", 3)
//!     .tag(["payments"])
//!     .write()?;
//!
//! let event = &sink.events()[0];
//! assert_eq!(event.level, "WARN");
//! assert_eq!(event.properties.get_str("attempt+Int32"), Some("3"));
//! # Ok::<(), fluent_log_sink::logger::WriteError>(())
//! ```

use crate::builder::{BuildError, CallSite, Caller, EventBuilder};
use crate::context::{
    extract_request, extract_response, extract_shared_response, Ambient, HttpRequest, HttpResponse,
};
use crate::properties::{DataValue, Properties};
use crate::record::ExceptionInfo;
use crate::severity::Severity;
use crate::sink::EventSink;
use serde::Serialize;
use std::error::Error;
use std::fmt::Display;
use std::sync::Arc;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum WriteError {
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Named entry point for fluent log chains.
///
/// Cheap to clone; clones share the sink.
#[derive(Clone)]
pub struct Logger {
    name: String,
    sink: Arc<dyn EventSink>,
    builder: EventBuilder,
}

impl Logger {
    pub fn new(name: impl Into<String>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            name: name.into(),
            sink,
            builder: EventBuilder::new(),
        }
    }

    /// Logger named after `T`'s type path.
    pub fn for_type<T: ?Sized>(sink: Arc<dyn EventSink>) -> Self {
        Self::new(std::any::type_name::<T>(), sink)
    }

    /// Replace the event builder, e.g. to pin the domain name.
    pub fn with_builder(mut self, builder: EventBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bind request-scoped context used as a fallback by the chains started
    /// from the returned logger.
    pub fn with_ambient<'a>(&'a self, ambient: Ambient<'a>) -> ScopedLogger<'a> {
        ScopedLogger {
            logger: self,
            ambient,
        }
    }

    /// Start an empty chain; a message or error must be added before `write`.
    #[track_caller]
    pub fn log(&self) -> FluentLogger<'_> {
        self.with_ambient(Ambient::new()).log()
    }

    #[track_caller]
    pub fn message(&self, message: impl Into<String>) -> FluentLogger<'_> {
        self.with_ambient(Ambient::new()).message(message)
    }

    /// Start a chain for `error` at [`Severity::Error`].
    #[track_caller]
    pub fn exception(&self, error: &(dyn Error + 'static)) -> FluentLogger<'_> {
        self.with_ambient(Ambient::new()).exception(error)
    }
}

/// A [`Logger`] bound to ambient request context.
#[derive(Clone, Copy)]
pub struct ScopedLogger<'a> {
    logger: &'a Logger,
    ambient: Ambient<'a>,
}

impl<'a> ScopedLogger<'a> {
    #[track_caller]
    pub fn log(self) -> FluentLogger<'a> {
        FluentLogger {
            logger: self.logger,
            ambient: self.ambient,
            caller: Caller::here(),
            severity: Severity::Info,
            message: None,
            exception: None,
            properties: Properties::new(),
            request_seen: false,
            response_seen: false,
        }
    }

    #[track_caller]
    pub fn message(self, message: impl Into<String>) -> FluentLogger<'a> {
        self.log().message(message)
    }

    #[track_caller]
    pub fn exception(self, error: &(dyn Error + 'static)) -> FluentLogger<'a> {
        self.log().exception(error).error()
    }
}

/// A single log event under construction.
///
/// Every method consumes and returns the chain; [`FluentLogger::write`]
/// consumes it for good, so a chain can be written at most once.
#[must_use = "a log chain does nothing until `write` is called"]
pub struct FluentLogger<'a> {
    logger: &'a Logger,
    ambient: Ambient<'a>,
    caller: Caller,
    severity: Severity,
    message: Option<String>,
    exception: Option<ExceptionInfo>,
    properties: Properties,
    request_seen: bool,
    response_seen: bool,
}

impl<'a> FluentLogger<'a> {
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach an error. Its message is used when no message is set.
    pub fn exception(mut self, error: &(dyn Error + 'static)) -> Self {
        self.exception = Some(ExceptionInfo::from_error(error));
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn fatal(self) -> Self {
        self.severity(Severity::Fatal)
    }

    pub fn error(self) -> Self {
        self.severity(Severity::Error)
    }

    pub fn warn(self) -> Self {
        self.severity(Severity::Warn)
    }

    pub fn info(self) -> Self {
        self.severity(Severity::Info)
    }

    pub fn debug(self) -> Self {
        self.severity(Severity::Debug)
    }

    /// Add a property. Numbers are stored under `key+Int32`, `key+Int64`
    /// and so on, see [`DataValue`].
    pub fn data<V: DataValue>(mut self, key: &str, value: V) -> Self {
        self.properties.set_data(key, value);
        self
    }

    /// Serialize `value` as JSON into `key`.
    pub fn json<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
        self.properties.set_json(key, value);
        self
    }

    pub fn tag<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.properties.add_tags(tags);
        self
    }

    /// Record the statement and parameters of a failed query.
    pub fn sql<I, K, V>(mut self, sql: &str, parameters: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Display,
    {
        self.properties.set_sql(sql, parameters);
        self
    }

    /// Record `Url` and `RequestMethod` from `request`.
    ///
    /// With `None` the ambient request, if any, is used at write time,
    /// exactly as if this method had not been called.
    pub fn request(mut self, request: Option<&dyn HttpRequest>) -> Self {
        if let Some(request) = request {
            extract_request(request, &mut self.properties);
            self.request_seen = true;
        }
        self
    }

    /// Record `StatusCode`, `ResponseHeaders` and `ResponseBody`. The body
    /// stream is left at the position it had.
    ///
    /// `None` falls back to the ambient response the same way
    /// [`FluentLogger::request`] does.
    pub fn response(mut self, response: Option<&mut dyn HttpResponse>) -> Self {
        if let Some(response) = response {
            extract_response(response, &mut self.properties);
            self.response_seen = true;
        }
        self
    }

    /// Override the captured source position.
    pub fn at(mut self, caller: Caller) -> Self {
        self.caller = caller;
        self
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Build the event and hand it to the logger's sink.
    pub fn write(self) -> Result<(), WriteError> {
        let FluentLogger {
            logger,
            ambient,
            caller,
            severity,
            message,
            exception,
            mut properties,
            request_seen,
            response_seen,
        } = self;

        if !request_seen {
            if let Some(request) = ambient.request {
                extract_request(request, &mut properties);
            }
        }
        if !response_seen {
            if let Some(response) = ambient.response {
                extract_shared_response(response, &mut properties);
            }
        }

        let site = CallSite {
            caller,
            logger_name: &logger.name,
            identity: ambient.identity,
        };
        let event = logger.builder.build(
            &site,
            severity,
            message.as_deref(),
            exception.as_ref(),
            properties,
        )?;

        logger.sink.emit(event);
        Ok(())
    }
}
