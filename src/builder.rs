use crate::properties::Properties;
use crate::record::{CallerLocation, ExceptionInfo, LogEvent};
use crate::severity::Severity;
use chrono::Utc;

/// Method name recorded when the caller did not supply one.
pub const UNKNOWN_METHOD: &str = "?";

/// Source position of a logging call.
///
/// [`Caller::here`] only knows the file and line; the [`caller!`] macro
/// also fills in the module path and enclosing function.
///
/// [`caller!`]: crate::caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub file: &'static str,
    pub line: u32,
    pub module_path: Option<&'static str>,
    pub function: Option<&'static str>,
}

impl Caller {
    #[track_caller]
    pub fn here() -> Self {
        let location = std::panic::Location::caller();
        Self {
            file: location.file(),
            line: location.line(),
            module_path: None,
            function: None,
        }
    }
}

/// Capture a [`Caller`](crate::builder::Caller) with module path and
/// enclosing function name.
///
/// Inside closures and `async` blocks the name is that of the nearest
/// named function around them.
#[macro_export]
macro_rules! caller {
    () => {{
        fn __here() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let path = __type_name_of(__here);
        let path = path.strip_suffix("::__here").unwrap_or(path);
        $crate::builder::Caller {
            file: ::std::file!(),
            line: ::std::line!(),
            module_path: ::std::option::Option::Some(::std::module_path!()),
            function: path.rsplit("::").find(|segment| *segment != "{{closure}}"),
        }
    }};
}

/// Who is logging: the source position, the logger and the principal.
#[derive(Debug, Clone, Copy)]
pub struct CallSite<'a> {
    pub caller: Caller,
    pub logger_name: &'a str,
    pub identity: Option<&'a str>,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum BuildError {
    #[error("log event has neither a message nor an error to take one from")]
    MissingMessage,
}

/// Turns the data collected by a fluent chain into a [`LogEvent`].
///
/// Building never emits anything; the logger hands the result to its sink.
#[derive(Debug, Clone)]
pub struct EventBuilder {
    domain: String,
}

impl EventBuilder {
    /// Builder whose domain is the current process name, see
    /// [`crate::env::process_name`].
    pub fn new() -> Self {
        Self::with_domain(crate::env::process_name())
    }

    pub fn with_domain(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Build an event.
    ///
    /// **Returns**
    /// - `Err(BuildError::MissingMessage)` when `message` is `None` and
    ///   there is no error to fall back to.
    pub fn build(
        &self,
        site: &CallSite<'_>,
        severity: Severity,
        message: Option<&str>,
        exception: Option<&ExceptionInfo>,
        properties: Properties,
    ) -> Result<LogEvent, BuildError> {
        let message = message
            .or_else(|| exception.map(|e| e.message.as_str()))
            .ok_or(BuildError::MissingMessage)?;

        let caller = &site.caller;
        let location = CallerLocation {
            type_name: caller.module_path.unwrap_or(site.logger_name).to_string(),
            method_name: caller.function.unwrap_or(UNKNOWN_METHOD).to_string(),
            file: caller.file.to_string(),
            line: caller.line,
        };
        let identity = site.identity.map(str::to_string);

        Ok(LogEvent {
            timestamp: Utc::now(),
            level: severity.level_name().to_string(),
            severity,
            message: message.to_string(),
            location,
            logger_name: site.logger_name.to_string(),
            user_name: identity.clone(),
            identity,
            domain: self.domain.clone(),
            exception: exception.cloned(),
            properties,
        })
    }
}

impl Default for EventBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(caller: Caller) -> CallSite<'static> {
        CallSite {
            caller,
            logger_name: "billing::Invoices",
            identity: Some("alice"),
        }
    }

    #[test]
    fn message_takes_precedence_over_error() {
        let builder = EventBuilder::with_domain("billing-api");
        let error = ExceptionInfo {
            message: "timeout".to_string(),
            sources: Vec::new(),
        };
        let event = builder
            .build(
                &site(Caller::here()),
                Severity::Error,
                Some("charge failed"),
                Some(&error),
                Properties::new(),
            )
            .unwrap();
        assert_eq!(event.message, "charge failed");
        assert_eq!(event.exception, Some(error));
        assert_eq!(event.level, "ERROR");
        assert_eq!(event.domain, "billing-api");
        assert_eq!(event.identity.as_deref(), Some("alice"));
        assert_eq!(event.user_name.as_deref(), Some("alice"));
    }

    #[test]
    fn falls_back_to_error_message() {
        let builder = EventBuilder::with_domain("svc");
        let error = ExceptionInfo {
            message: "disk full".to_string(),
            sources: Vec::new(),
        };
        let event = builder
            .build(&site(Caller::here()), Severity::Fatal, None, Some(&error), Properties::new())
            .unwrap();
        assert_eq!(event.message, "disk full");
        assert_eq!(event.level, "FATAL");
    }

    #[test]
    fn missing_message_and_error_fails() {
        let builder = EventBuilder::with_domain("svc");
        let result = builder.build(&site(Caller::here()), Severity::Info, None, None, Properties::new());
        assert_eq!(result.unwrap_err(), BuildError::MissingMessage);
    }

    #[test]
    fn empty_message_is_kept() {
        let builder = EventBuilder::with_domain("svc");
        let event = builder
            .build(&site(Caller::here()), Severity::Info, Some(""), None, Properties::new())
            .unwrap();
        assert_eq!(event.message, "");
    }

    #[test]
    fn plain_caller_uses_logger_name_and_unknown_method() {
        let builder = EventBuilder::with_domain("svc");
        let caller = Caller::here();
        let event = builder
            .build(&site(caller), Severity::Info, Some("hi"), None, Properties::new())
            .unwrap();
        assert_eq!(event.location.type_name, "billing::Invoices");
        assert_eq!(event.location.method_name, UNKNOWN_METHOD);
        assert_eq!(event.location.file, file!());
        assert_eq!(event.location.line, caller.line);
    }

    #[test]
    fn caller_macro_names_enclosing_function() {
        let caller = crate::caller!();
        assert_eq!(caller.module_path, Some(module_path!()));
        assert_eq!(caller.function, Some("caller_macro_names_enclosing_function"));
        assert_eq!(caller.file, file!());
    }

    async fn handle_order() -> Caller {
        crate::caller!()
    }

    #[tokio::test]
    async fn caller_macro_names_async_fn() {
        let caller = handle_order().await;
        assert_eq!(caller.function, Some("handle_order"));
        assert_eq!(caller.module_path, Some(module_path!()));
    }

    #[test]
    fn caller_macro_skips_closures() {
        let capture = || crate::caller!();
        assert_eq!(capture().function, Some("caller_macro_skips_closures"));
    }

    #[test]
    fn missing_identity_stays_empty() {
        let builder = EventBuilder::with_domain("svc");
        let site = CallSite {
            caller: Caller::here(),
            logger_name: "svc",
            identity: None,
        };
        let event = builder
            .build(&site, Severity::Debug, Some("hi"), None, Properties::new())
            .unwrap();
        assert!(event.identity.is_none());
        assert!(event.user_name.is_none());
    }
}
