//! Queue several commands and replay them in one go.
//!
//! Run with: VALKEY_ACCESS_KEY=... cargo run --example pipeline

use tracing_subscriber::EnvFilter;
use valkey_http::{Client, Config, Result};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = Client::new(Config::from_env()?)?;

    let mut pipe = client.pipeline();
    pipe.set("user:1:name", "Alice", None)
        .set("user:1:age", "30", None)
        .set("user:1:city", "New York", Some(600))
        .get("user:1:name")
        .raw_command("incrby", [serde_json::json!("user:1:age"), serde_json::json!(1)])
        .ttl("user:1:city");
    println!("Queued {} commands", pipe.len());

    let results = pipe.execute().await?;
    for (i, result) in results.iter().enumerate() {
        match result {
            Ok(value) => println!("#{}: {}", i, value),
            Err(err) => println!("#{}: {} ({})", i, err, err.kind()),
        }
    }

    // Cleanup
    pipe.delete("user:1:name")
        .delete("user:1:age")
        .delete("user:1:city");
    let deleted = pipe.execute().await?.into_iter().filter(|r| r.is_ok()).count();
    println!("Deleted {} keys", deleted);

    Ok(())
}
