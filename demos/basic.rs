use std::sync::Arc;

use fluent_log_sink::init::init_tracing;
use fluent_log_sink::tracing_sink::TracingSink;
use fluent_log_sink::Logger;

#[derive(thiserror::Error, Debug)]
#[error("card declined by issuer")]
struct DeclinedError;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    let logger = Logger::new("checkout", Arc::new(TracingSink::new()));

    logger.message("starting service").write()?;

    logger
        .exception(&DeclinedError)
        .data("order_id", 123)
        .data("retryable", false)
        .tag(["payments", "checkout"])
        .write()?;

    logger
        .message("slow query")
        .warn()
        .sql(
            "SELECT * FROM orders WHERE customer_id = @customer",
            [("@customer", 42)],
        )
        .write()?;

    Ok(())
}
