//! Process-scoped client installed once at startup.
//!
//! Run with: VALKEY_ACCESS_KEY=... cargo run --example global

use valkey_http::{global, Result};

async fn record_visit(page: &str) -> Result<i64> {
    let count = global::raw_command("incr", [format!("visits:{}", page)]).await?;
    Ok(count.as_i64().unwrap_or_default())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    global::init_from_env()?;

    for _ in 0..3 {
        println!("home visits: {}", record_visit("home").await?);
    }
    global::delete("visits:home").await?;

    global::teardown();
    Ok(())
}
