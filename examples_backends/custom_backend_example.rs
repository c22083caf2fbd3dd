use std::sync::Arc;

use async_trait::async_trait;
use fluent_log_sink::{
    forward::ForwardingSink,
    record::LogEvent,
    sink::LogSink,
    Logger,
};

/// Example of integrating a completely custom backend by implementing
/// the `LogSink` trait directly. Imagine this talks to some
/// proprietary DB for which this crate does not provide a built-in
/// sink.
struct MyCustomDbSink;

#[async_trait]
impl LogSink for MyCustomDbSink {
    async fn send(&self, event: &LogEvent) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // Here you would call your own client library for the target DB.
        // For the sake of example we just print the event as JSON.
        println!("[my-custom-db] {}", serde_json::to_string(event)?);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (sink, handle) = ForwardingSink::new(Arc::new(MyCustomDbSink), 1024);
    let logger = Logger::new("custom-backend", Arc::new(sink));

    logger.message("custom backend example started").write()?;
    logger
        .message("simulated error sent via custom backend")
        .error()
        .data("db", "my-custom-db")
        .write()?;

    // Dropping the last logger closes the channel; the task drains it and exits.
    drop(logger);
    handle.await?;
    Ok(())
}
