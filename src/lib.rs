//! # valkey-http
//!
//! Async client for hosted Valkey/Redis-compatible stores that expose an
//! HTTP API. Each operation is one authenticated request; a client-side
//! [`Pipeline`] replays queued commands in order.
//!
//! ## Features
//!
//! - `rustls-tls` (default) - HTTPS through rustls
//! - `native-tls` - HTTPS through the platform TLS library
//!
//! ## Example
//!
//! ```no_run
//! use valkey_http::{Client, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new(Config::from_env()?)?;
//!     client.set("key", "value", None).await?;
//!     let ttl = client.ttl("key").await?;
//!     println!("ttl: {}", ttl);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub(crate) mod core;
pub(crate) mod proto;

pub mod global;

pub use crate::core::command::Cmd;
pub use crate::core::config::{
    Config, ConfigBuilder, ConfigSnapshot, DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES,
    DEFAULT_POOL_SIZE, DEFAULT_RETRY_DELAY, DEFAULT_TIMEOUT, ENV_ACCESS_KEY, ENV_BASE_URL,
    ENV_MAX_RETRIES, ENV_POOL_SIZE, ENV_RETRY_DELAY, ENV_TIMEOUT,
};
pub use crate::core::pipeline::Pipeline;
pub use crate::core::{Client, Error, ErrorKind, Result};

pub use serde_json::Value;
