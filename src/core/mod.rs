//! # Core
//!
//! The HTTP client, its configuration, command values and the client-side
//! pipeline.
//!
//! ## Modules
//!
//! - [`config`] - Connection parameters and their builder
//! - [`command`] - Command values for the exec endpoint
//! - [`pipeline`] - Sequential client-side batching

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::proto::error::{map_status, map_transport, TransportFault};
use crate::proto::wire::{
    DeletedReply, ExecReply, ExecRequest, ExistsReply, ExpireRequest, GetReply, SetRequest,
    SuccessReply, TtlReply,
};

pub use crate::proto::error::{Error, ErrorKind, Result};

/// Command construction helpers.
pub mod command;
/// Client configuration.
pub mod config;
/// Client-side pipelining.
pub mod pipeline;

use command::Cmd;
use config::Config;
use pipeline::Pipeline;

/// Async client for the Valkey HTTP API.
///
/// Every operation issues exactly one authenticated HTTP request. The
/// client holds no state besides its configuration and the pooled
/// transport, so clones are cheap and may be used from many tasks at once.
///
/// # Example
///
/// ```no_run
/// use valkey_http::{Client, Config};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = Client::new(Config::new("my-access-key")?)?;
///     client.set("greeting", "hello", Some(60)).await?;
///     let value = client.get("greeting").await?;
///     assert_eq!(value.as_deref(), Some("hello"));
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    config: Config,
    base_url: Url,
    http: reqwest::Client,
    closed: AtomicBool,
}

impl Client {
    /// Creates a client bound to `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a configured header is not a valid HTTP
    /// header or the transport cannot be initialized.
    pub fn new(config: Config) -> Result<Self> {
        let base_url = Url::parse(config.base_url())
            .map_err(|e| Error::config(format!("invalid base URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::config("invalid base URL"));
        }

        let mut headers = HeaderMap::new();
        for (name, value) in config.headers() {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| Error::config(format!("invalid header name {:?}", name)))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| Error::config(format!("invalid value for header {:?}", name)))?;
            headers.insert(header_name, header_value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .pool_max_idle_per_host(config.pool_size())
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP transport: {}", e)))?;

        debug!(
            base_url = %base_url,
            timeout_ms = config.timeout().as_millis() as u64,
            pool_size = config.pool_size(),
            "client created"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                base_url,
                http,
                closed: AtomicBool::new(false),
            }),
        })
    }

    /// Creates a client from [`Config::from_env`].
    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env()?)
    }

    /// Returns the configuration this client was built with.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Sets the string value of a key, optionally expiring after
    /// `expiration` seconds.
    ///
    /// # Returns
    ///
    /// The `success` flag reported by the service.
    pub async fn set(&self, key: &str, value: &str, expiration: Option<u64>) -> Result<bool> {
        let body = SetRequest {
            key,
            value,
            ex: expiration,
        };
        let reply: SuccessReply = self.post_json(&["set"], &body).await?;
        Ok(reply.success)
    }

    /// Gets the value of a key.
    ///
    /// Keys with no path form (`""`, `"."`, `".."`) are read through the
    /// exec endpoint instead; the same holds for `delete`, `exists` and `ttl`.
    ///
    /// # Returns
    ///
    /// `Some(value)` if the key exists, or `None` if it does not.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        if !has_path_form(key) {
            return exec_string(self.query(&command::get(key)).await?);
        }
        let reply: GetReply = self.call(Method::GET, &["get", key], None::<&()>).await?;
        Ok(reply.value)
    }

    /// Removes a key.
    ///
    /// # Returns
    ///
    /// The `deleted` flag reported by the service.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        if !has_path_form(key) {
            return exec_flag(self.query(&command::del(key)).await?);
        }
        let reply: DeletedReply = self.call(Method::DELETE, &["del", key], None::<&()>).await?;
        Ok(reply.deleted)
    }

    /// Checks whether a key exists.
    pub async fn exists(&self, key: &str) -> Result<bool> {
        if !has_path_form(key) {
            return exec_flag(self.query(&command::exists(key)).await?);
        }
        let reply: ExistsReply = self.call(Method::GET, &["exists", key], None::<&()>).await?;
        Ok(reply.exists)
    }

    /// Sets a timeout of `seconds` on a key.
    ///
    /// # Returns
    ///
    /// The `success` flag reported by the service.
    pub async fn expire(&self, key: &str, seconds: u64) -> Result<bool> {
        let body = ExpireRequest { key, seconds };
        let reply: SuccessReply = self.post_json(&["expire"], &body).await?;
        Ok(reply.success)
    }

    /// Returns the remaining time to live of a key, in seconds.
    ///
    /// Negative sentinels for missing or persistent keys are returned as
    /// the service reports them.
    pub async fn ttl(&self, key: &str) -> Result<i64> {
        if !has_path_form(key) {
            return exec_int(self.query(&command::ttl(key)).await?);
        }
        let reply: TtlReply = self.call(Method::GET, &["ttl", key], None::<&()>).await?;
        Ok(reply.ttl)
    }

    /// Forwards an arbitrary store command to the exec endpoint.
    ///
    /// The command name is sent upper-cased. The `result` field of the
    /// response is returned verbatim.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn demo(client: valkey_http::Client) -> valkey_http::Result<()> {
    /// let fields = client.raw_command("hmget", ["user:1", "name", "email"]).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn raw_command<I>(&self, name: &str, args: I) -> Result<Value>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.query(&Cmd::new(name).args_from(args)).await
    }

    /// Sends a prepared [`Cmd`] to the exec endpoint.
    pub async fn query(&self, cmd: &Cmd) -> Result<Value> {
        let body = ExecRequest {
            command: cmd.name(),
            args: cmd.args(),
        };
        let reply: ExecReply = self.post_json(&["exec"], &body).await?;
        Ok(reply.result)
    }

    /// Returns a new, empty [`Pipeline`] bound to this client.
    pub fn pipeline(&self) -> Pipeline<'_> {
        Pipeline::new(self)
    }

    /// Marks the client closed.
    ///
    /// Idempotent. Clones share the flag; once closed, every operation fails
    /// with [`Error::Connection`].
    pub fn close(&self) {
        if !self.inner.closed.swap(true, Ordering::AcqRel) {
            debug!("client closed");
        }
    }

    /// Returns `true` once [`Client::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::Connection {
                message: "client is closed".to_string(),
            });
        }
        Ok(())
    }

    /// Builds `<base>/valkey/<segments...>`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::config("invalid base URL"))?
            .pop_if_empty()
            .push("valkey")
            .extend(segments);
        Ok(url)
    }

    async fn post_json<T, B>(&self, segments: &[&str], body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        self.call(Method::POST, segments, Some(body)).await
    }

    #[instrument(skip_all, level = "debug", fields(method = %method, endpoint = segments[0]))]
    async fn call<T, B>(&self, method: Method, segments: &[&str], body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        self.ensure_open()?;
        let url = self.endpoint(segments)?;

        let mut request = self
            .inner
            .http
            .request(method, url)
            .bearer_auth(self.inner.config.access_key());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| self.transport_error(&e))?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| self.transport_error(&e))?;

        if status.as_u16() >= 400 {
            let err = map_status(status.as_u16(), status.canonical_reason(), &bytes);
            debug!(status = status.as_u16(), error = %err, "request rejected");
            return Err(err);
        }

        serde_json::from_slice(&bytes).map_err(|e| Error::protocol(e.to_string()))
    }

    fn transport_error(&self, err: &reqwest::Error) -> Error {
        let err = map_transport(TransportFault::classify(err), self.inner.config.timeout());
        debug!(error = %err, "request failed");
        err
    }
}

/// URL parsing collapses `.` and `..` segments (even percent-encoded), and
/// an empty segment names no key.
fn has_path_form(key: &str) -> bool {
    !matches!(key, "" | "." | "..")
}

fn exec_string(result: Value) -> Result<Option<String>> {
    match result {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        other => Err(Error::protocol(format!("expected string or null, got {}", other))),
    }
}

fn exec_flag(result: Value) -> Result<bool> {
    match result {
        Value::Bool(b) => Ok(b),
        Value::Number(ref n) if n.as_i64().is_some() => Ok(n.as_i64() > Some(0)),
        other => Err(Error::protocol(format!("expected integer or boolean, got {}", other))),
    }
}

fn exec_int(result: Value) -> Result<i64> {
    result
        .as_i64()
        .ok_or_else(|| Error::protocol(format!("expected integer, got {}", result)))
}
