use std::io::Cursor;
use std::sync::Arc;

use fluent_log_sink::context::Ambient;
use fluent_log_sink::init::{init_tracing_with_config, LoggingConfig};
use fluent_log_sink::tracing_sink::TracingSink;
use fluent_log_sink::Logger;

/// Logs a failed request the way a handler would: the request comes from
/// the surrounding scope, the response is passed explicitly.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing_with_config(&LoggingConfig {
        json: true,
        ..LoggingConfig::default()
    })?;

    let logger = Logger::new("inventory", Arc::new(TracingSink::new()));

    let request = http::Request::builder()
        .method("PUT")
        .uri("/items/9")
        .header("Host", "inventory.local")
        .body(())?;
    let mut response = http::Response::builder()
        .status(409)
        .header("Content-Type", "application/json")
        .body(Cursor::new(br#"{"error":"version conflict"}"#.to_vec()))?;

    let scoped = logger.with_ambient(Ambient::new().with_request(&request).with_identity("svc-sync"));

    scoped
        .message("update rejected")
        .warn()
        .response(Some(&mut response))
        .data("item_version", 7i64)
        .write()?;

    Ok(())
}
