use std::sync::Arc;
use std::time::Instant;

use fluent_log_sink::context::{RequestContext, ResponseContext};
use fluent_log_sink::memory_sink::NoopSink;
use fluent_log_sink::Logger;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logger = Logger::new("load", Arc::new(NoopSink));
    let request = RequestContext::new("http://127.0.0.1:8080/orders", "POST");

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        let mut response = ResponseContext::new(500)
            .with_header("Content-Type", "text/plain")
            .with_body("internal error");
        logger
            .message("default load test error")
            .error()
            .data("iteration", i)
            .request(Some(&request))
            .response(Some(&mut response))
            .write()?;
    }

    let elapsed = start.elapsed();
    println!("default config: built {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    Ok(())
}
