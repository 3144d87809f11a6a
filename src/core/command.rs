use serde_json::Value;

/// A store command queued for the `/valkey/exec` endpoint.
///
/// The name is canonicalized to upper case on construction; arguments keep
/// their order and JSON type.
///
/// # Example
///
/// ```
/// use valkey_http::Cmd;
///
/// let cmd = Cmd::new("hset").arg("user:1").arg("visits").arg(3);
/// assert_eq!(cmd.name(), "HSET");
/// assert_eq!(cmd.args().len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Cmd {
    name: String,
    args: Vec<Value>,
}

impl Cmd {
    /// Creates a new command with the given name.
    ///
    /// # Arguments
    ///
    /// * `name` - The command name in any case (e.g., "get", "HMGET")
    #[inline]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: name.as_ref().to_uppercase(),
            args: Vec::new(),
        }
    }

    /// Appends an argument to the command.
    #[inline]
    pub fn arg<T: Into<Value>>(mut self, arg: T) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends every argument yielded by `args`.
    #[inline]
    pub fn args_from<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Returns the upper-cased command name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the arguments in submission order.
    #[inline]
    pub fn args(&self) -> &[Value] {
        &self.args
    }
}

/// Creates a SET command, with `EX seconds` when an expiry is given.
#[inline]
pub fn set(key: &str, value: &str, expiration: Option<u64>) -> Cmd {
    let cmd = Cmd::new("SET").arg(key).arg(value);
    match expiration {
        Some(seconds) => cmd.arg("EX").arg(seconds),
        None => cmd,
    }
}

/// Creates a GET command.
#[inline]
pub fn get(key: &str) -> Cmd {
    Cmd::new("GET").arg(key)
}

/// Creates a DEL command.
#[inline]
pub fn del(key: &str) -> Cmd {
    Cmd::new("DEL").arg(key)
}

/// Creates an EXISTS command.
#[inline]
pub fn exists(key: &str) -> Cmd {
    Cmd::new("EXISTS").arg(key)
}

/// Creates an EXPIRE command.
#[inline]
pub fn expire(key: &str, seconds: u64) -> Cmd {
    Cmd::new("EXPIRE").arg(key).arg(seconds)
}

/// Creates a TTL command.
#[inline]
pub fn ttl(key: &str) -> Cmd {
    Cmd::new("TTL").arg(key)
}
