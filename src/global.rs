//! Process-scoped client handle.
//!
//! An explicit alternative to threading a [`Client`] through every call
//! site. [`init`] installs a client, [`teardown`] closes and removes it, and
//! the free functions delegate to whatever client is installed. Using any of
//! them before `init` fails with [`Error::NotInitialized`].
//!
//! ```no_run
//! use valkey_http::{global, Config};
//!
//! # async fn demo() -> valkey_http::Result<()> {
//! global::init(Config::new("my-access-key")?)?;
//! global::set("greeting", "hello", None).await?;
//! let value = global::get("greeting").await?;
//! global::teardown();
//! # Ok(())
//! # }
//! ```

use std::sync::RwLock;

use serde_json::Value;
use tracing::debug;

use crate::{Client, Config, Error, Result};

static CLIENT: RwLock<Option<Client>> = RwLock::new(None);

/// Installs a client built from `config`, replacing (and closing) any
/// previously installed one.
pub fn init(config: Config) -> Result<()> {
    let client = Client::new(config)?;
    let previous = {
        let mut slot = CLIENT.write().unwrap_or_else(|e| e.into_inner());
        slot.replace(client)
    };
    if let Some(previous) = previous {
        previous.close();
    }
    debug!("global client installed");
    Ok(())
}

/// Installs a client built from [`Config::from_env`].
pub fn init_from_env() -> Result<()> {
    init(Config::from_env()?)
}

/// Closes and removes the installed client. Does nothing if none is
/// installed.
pub fn teardown() {
    let previous = CLIENT.write().unwrap_or_else(|e| e.into_inner()).take();
    if let Some(client) = previous {
        client.close();
        debug!("global client removed");
    }
}

/// Returns `true` if a client is installed.
pub fn is_initialized() -> bool {
    CLIENT
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .is_some()
}

/// Returns a handle to the installed client.
///
/// # Errors
///
/// Returns [`Error::NotInitialized`] if [`init`] has not been called, or
/// [`teardown`] has been called since.
pub fn client() -> Result<Client> {
    CLIENT
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
        .ok_or(Error::NotInitialized)
}

/// See [`Client::set`].
pub async fn set(key: &str, value: &str, expiration: Option<u64>) -> Result<bool> {
    client()?.set(key, value, expiration).await
}

/// See [`Client::get`].
pub async fn get(key: &str) -> Result<Option<String>> {
    client()?.get(key).await
}

/// See [`Client::delete`].
pub async fn delete(key: &str) -> Result<bool> {
    client()?.delete(key).await
}

/// See [`Client::exists`].
pub async fn exists(key: &str) -> Result<bool> {
    client()?.exists(key).await
}

/// See [`Client::expire`].
pub async fn expire(key: &str, seconds: u64) -> Result<bool> {
    client()?.expire(key, seconds).await
}

/// See [`Client::ttl`].
pub async fn ttl(key: &str) -> Result<i64> {
    client()?.ttl(key).await
}

/// See [`Client::raw_command`].
pub async fn raw_command<I>(name: &str, args: I) -> Result<Value>
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    client()?.raw_command(name, args).await
}
