pub mod severity;
pub mod properties;
pub mod record;
pub mod context;
pub mod builder;
pub mod logger;

pub mod sink;
pub mod tracing_sink;
pub mod memory_sink;
pub mod forward;

pub mod init;
pub mod env;

pub use logger::{FluentLogger, Logger, ScopedLogger, WriteError};
pub use severity::Severity;

pub use rust_decimal::Decimal;
