//! Basic key operations against the hosted service.
//!
//! Run with: VALKEY_ACCESS_KEY=... cargo run --example basic

use tracing_subscriber::EnvFilter;
use valkey_http::{Client, Config, Result};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = Client::new(Config::from_env()?)?;
    println!("Using {}", client.config().base_url());

    client.set("user:1:name", "Alice", None).await?;
    client.set("session:abc", "active", Some(3600)).await?;

    if let Some(name) = client.get("user:1:name").await? {
        println!("Name: {}", name);
    }
    println!("session:abc exists: {}", client.exists("session:abc").await?);
    println!("session:abc ttl: {}s", client.ttl("session:abc").await?);

    client.expire("user:1:name", 60).await?;
    println!("user:1:name ttl: {}s", client.ttl("user:1:name").await?);

    let views = client.raw_command("incr", ["page:views"]).await?;
    println!("Page views: {}", views);

    // Cleanup
    for key in ["user:1:name", "session:abc", "page:views"] {
        let deleted = client.delete(key).await?;
        println!("Deleted {}: {}", key, deleted);
    }

    client.close();
    Ok(())
}
