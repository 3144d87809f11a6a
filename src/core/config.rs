use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::{Error, Result};

/// Service URL used when neither the builder nor the environment names one.
pub const DEFAULT_BASE_URL: &str = "https://api.valkey.cloud";
/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default retry budget (reserved, see [`Config::max_retries`]).
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default delay between retries (reserved, see [`Config::retry_delay`]).
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);
/// Default number of idle pooled connections kept per host.
pub const DEFAULT_POOL_SIZE: usize = 10;

/// Environment variable holding the access key.
pub const ENV_ACCESS_KEY: &str = "VALKEY_ACCESS_KEY";
/// Environment variable holding the base URL.
pub const ENV_BASE_URL: &str = "VALKEY_BASE_URL";
/// Environment variable holding the timeout, in seconds.
pub const ENV_TIMEOUT: &str = "VALKEY_TIMEOUT";
/// Environment variable holding the retry budget.
pub const ENV_MAX_RETRIES: &str = "VALKEY_MAX_RETRIES";
/// Environment variable holding the retry delay, in seconds.
pub const ENV_RETRY_DELAY: &str = "VALKEY_RETRY_DELAY";
/// Environment variable holding the connection pool size.
pub const ENV_POOL_SIZE: &str = "VALKEY_POOL_SIZE";

fn default_user_agent() -> String {
    format!("valkey-http-rust/{}", env!("CARGO_PKG_VERSION"))
}

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Connection parameters for a [`Client`](crate::Client).
///
/// Immutable once built. Use [`Config::builder`] to override defaults or
/// [`Config::from_env`] to read everything from the environment.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use valkey_http::Config;
///
/// let config = Config::builder()
///     .access_key("secret")
///     .base_url("https://kv.example.com")
///     .timeout(Duration::from_secs(5))
///     .build_with(|_| None)
///     .unwrap();
/// assert_eq!(config.timeout(), Duration::from_secs(5));
/// ```
#[derive(Clone)]
pub struct Config {
    access_key: String,
    base_url: String,
    timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
    pool_size: usize,
    user_agent: String,
    headers: BTreeMap<String, String>,
}

impl Config {
    /// Creates a configuration from an access key, resolving every other
    /// field from the environment or the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `access_key` is empty.
    pub fn new(access_key: impl Into<String>) -> Result<Self> {
        ConfigBuilder::new().access_key(access_key).build()
    }

    /// Returns a new [`ConfigBuilder`].
    #[inline]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Builds a configuration purely from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if [`ENV_ACCESS_KEY`] is unset or empty, or
    /// if any other variable holds an unparsable value.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(process_env)
    }

    /// Like [`Config::from_env`], reading variables through `env`.
    pub fn from_env_with<F>(env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = ConfigBuilder::new();
        if let Some(key) = env(ENV_ACCESS_KEY) {
            builder = builder.access_key(key);
        }
        builder.build_with(env)
    }

    /// Returns the bearer credential.
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Returns the service base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the configured retry budget.
    ///
    /// Stored and exported only. No request is retried.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns the configured delay between retries.
    ///
    /// Stored and exported only. No request is retried.
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Returns the maximum number of idle pooled connections per host.
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Returns the User-Agent string.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Returns the default headers sent with every request.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Returns a plain copy of every field.
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            access_key: self.access_key.clone(),
            base_url: self.base_url.clone(),
            timeout_seconds: self.timeout.as_secs_f64(),
            max_retries: self.max_retries,
            retry_delay_seconds: self.retry_delay.as_secs_f64(),
            pool_size: self.pool_size,
            user_agent: self.user_agent.clone(),
            headers: self.headers.clone(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("access_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .field("pool_size", &self.pool_size)
            .field("user_agent", &self.user_agent)
            .field("headers", &self.headers)
            .finish()
    }
}

/// Exported copy of a [`Config`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigSnapshot {
    /// Bearer credential.
    pub access_key: String,
    /// Service base URL.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_seconds: f64,
    /// Retry budget.
    pub max_retries: u32,
    /// Delay between retries in seconds.
    pub retry_delay_seconds: f64,
    /// Idle pooled connections per host.
    pub pool_size: usize,
    /// User-Agent string.
    pub user_agent: String,
    /// Default headers.
    pub headers: BTreeMap<String, String>,
}

/// Builder for [`Config`].
///
/// Fields left unset are resolved at build time: environment variable
/// first, then the hard-coded default.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    access_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    max_retries: Option<u32>,
    retry_delay: Option<Duration>,
    pool_size: Option<usize>,
    user_agent: Option<String>,
    headers: Vec<(String, String)>,
}

impl ConfigBuilder {
    /// Creates a new [`ConfigBuilder`] instance.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the access key sent as a bearer token.
    #[inline]
    pub fn access_key(mut self, key: impl Into<String>) -> Self {
        self.access_key = Some(key.into());
        self
    }

    /// Sets the service base URL (`http://` or `https://`).
    #[inline]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the per-request timeout.
    #[inline]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the retry budget.
    #[inline]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Sets the delay between retries.
    #[inline]
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    /// Sets the maximum number of idle pooled connections per host.
    #[inline]
    pub fn pool_size(mut self, size: usize) -> Self {
        self.pool_size = Some(size);
        self
    }

    /// Sets the User-Agent string.
    #[inline]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Adds a default header, replacing any earlier header of the same
    /// name (case-insensitive), including the built-in ones.
    #[inline]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Builds the [`Config`], resolving unset fields from the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the access key is missing or empty, the
    /// base URL is not an `http(s)` URL, or an environment variable holds an
    /// unparsable value.
    pub fn build(self) -> Result<Config> {
        self.build_with(process_env)
    }

    /// Builds the [`Config`], resolving unset fields through `env`.
    pub fn build_with<F>(self, env: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_key = match self.access_key {
            Some(key) if !key.trim().is_empty() => key,
            _ => return Err(Error::config("access key is required")),
        };

        let lookup = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        let base_url = match self.base_url {
            Some(url) => url,
            None => lookup(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        };
        validate_base_url(&base_url)?;

        let timeout = resolve(self.timeout, ENV_TIMEOUT, &lookup, parse_seconds)?
            .unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(Error::config("timeout must be greater than zero"));
        }
        let max_retries = resolve(self.max_retries, ENV_MAX_RETRIES, &lookup, parse_int)?
            .unwrap_or(DEFAULT_MAX_RETRIES);
        let retry_delay = resolve(self.retry_delay, ENV_RETRY_DELAY, &lookup, parse_seconds)?
            .unwrap_or(DEFAULT_RETRY_DELAY);
        let pool_size = resolve(self.pool_size, ENV_POOL_SIZE, &lookup, parse_int)?
            .unwrap_or(DEFAULT_POOL_SIZE);

        let user_agent = self.user_agent.unwrap_or_else(default_user_agent);

        let mut headers = BTreeMap::new();
        headers.insert("User-Agent".to_string(), user_agent.clone());
        headers.insert("Accept".to_string(), "application/json".to_string());
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        for (name, value) in self.headers {
            headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
            headers.insert(name, value);
        }
        let user_agent = headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("user-agent"))
            .map_or(user_agent, |(_, value)| value.clone());

        Ok(Config {
            access_key,
            base_url,
            timeout,
            max_retries,
            retry_delay,
            pool_size,
            user_agent,
            headers,
        })
    }
}

/// Explicit value, else the parsed environment variable, else `None`.
fn resolve<T, L>(
    explicit: Option<T>,
    var: &str,
    lookup: &L,
    parse: fn(&str, &str) -> Result<T>,
) -> Result<Option<T>>
where
    L: Fn(&str) -> Option<String>,
{
    match explicit {
        Some(value) => Ok(Some(value)),
        None => lookup(var).map(|raw| parse(var, raw.trim())).transpose(),
    }
}

fn parse_seconds(var: &str, raw: &str) -> Result<Duration> {
    raw.parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| {
            Error::config(format!(
                "{} must be a non-negative number of seconds, got {:?}",
                var, raw
            ))
        })
}

fn parse_int<T: std::str::FromStr>(var: &str, raw: &str) -> Result<T> {
    raw.parse::<T>().map_err(|_| {
        Error::config(format!(
            "{} must be a non-negative integer, got {:?}",
            var, raw
        ))
    })
}

fn validate_base_url(raw: &str) -> Result<()> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| Error::config(format!("invalid base URL {:?}: {}", raw, e)))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(Error::config("invalid scheme, expected http:// or https://"));
    }
    if parsed.cannot_be_a_base() {
        return Err(Error::config(format!("invalid base URL {:?}", raw)));
    }
    Ok(())
}
