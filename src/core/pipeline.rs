use serde_json::Value;
use tracing::debug;

use super::command::{self, Cmd};
use super::{Client, Result};

/// Client-side queue of commands replayed in order against a [`Client`].
///
/// Not a server-side transaction: each queued command is sent as its own
/// exec request when [`Pipeline::execute`] runs, and one failing command
/// does not stop the rest. A pipeline is reusable; it is empty again after
/// every `execute`.
///
/// # Example
///
/// ```no_run
/// # async fn demo(client: valkey_http::Client) -> valkey_http::Result<()> {
/// let mut pipe = client.pipeline();
/// pipe.set("a", "1", None).set("b", "2", Some(60)).get("a");
/// let results = pipe.execute().await?;
/// assert_eq!(results.len(), 3);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Pipeline<'a> {
    client: &'a Client,
    commands: Vec<Cmd>,
}

impl<'a> Pipeline<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            client,
            commands: Vec::new(),
        }
    }

    /// Queues `SET key value [EX expiration]`.
    pub fn set(&mut self, key: &str, value: &str, expiration: Option<u64>) -> &mut Self {
        self.push(command::set(key, value, expiration))
    }

    /// Queues `GET key`.
    pub fn get(&mut self, key: &str) -> &mut Self {
        self.push(command::get(key))
    }

    /// Queues `DEL key`.
    pub fn delete(&mut self, key: &str) -> &mut Self {
        self.push(command::del(key))
    }

    /// Queues `EXISTS key`.
    pub fn exists(&mut self, key: &str) -> &mut Self {
        self.push(command::exists(key))
    }

    /// Queues `EXPIRE key seconds`.
    pub fn expire(&mut self, key: &str, seconds: u64) -> &mut Self {
        self.push(command::expire(key, seconds))
    }

    /// Queues `TTL key`.
    pub fn ttl(&mut self, key: &str) -> &mut Self {
        self.push(command::ttl(key))
    }

    /// Queues an arbitrary command; the name is upper-cased.
    pub fn raw_command<I>(&mut self, name: &str, args: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.push(Cmd::new(name).args_from(args))
    }

    /// Queues a prepared [`Cmd`].
    pub fn push(&mut self, cmd: Cmd) -> &mut Self {
        self.commands.push(cmd);
        self
    }

    /// Discards every queued command without sending it.
    pub fn clear(&mut self) -> &mut Self {
        self.commands.clear();
        self
    }

    /// Returns the number of queued commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Returns the queued commands in submission order.
    pub fn commands(&self) -> &[Cmd] {
        &self.commands
    }

    /// Sends every queued command, one after another, in submission order.
    ///
    /// The queue is emptied before the first request goes out, whatever the
    /// outcome. An empty queue returns immediately without touching the
    /// network.
    ///
    /// # Returns
    ///
    /// One entry per queued command, in the same order: the command's
    /// `result` value, or the error that command produced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`](crate::Error::Connection) without
    /// sending anything if the client has been closed.
    pub async fn execute(&mut self) -> Result<Vec<Result<Value>>> {
        if self.commands.is_empty() {
            return Ok(Vec::new());
        }

        let commands = std::mem::take(&mut self.commands);
        self.client.ensure_open()?;

        debug!(commands = commands.len(), "executing pipeline");
        let mut results = Vec::with_capacity(commands.len());
        for cmd in &commands {
            let result = self.client.query(cmd).await;
            if let Err(ref err) = result {
                debug!(command = cmd.name(), error = %err, "pipelined command failed");
            }
            results.push(result);
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigBuilder;
    use serde_json::json;

    fn client() -> Client {
        let config = ConfigBuilder::new()
            .access_key("k")
            .base_url("http://127.0.0.1:9")
            .build_with(|_| None)
            .unwrap();
        Client::new(config).unwrap()
    }

    #[test]
    fn test_mutators_chain_and_preserve_order() {
        let client = client();
        let mut pipe = client.pipeline();
        pipe.set("a", "1", None)
            .get("a")
            .delete("a")
            .exists("a")
            .expire("a", 10)
            .ttl("a")
            .raw_command("hmget", ["h", "f"]);

        let names: Vec<&str> = pipe.commands().iter().map(Cmd::name).collect();
        assert_eq!(names, ["SET", "GET", "DEL", "EXISTS", "EXPIRE", "TTL", "HMGET"]);
        assert_eq!(pipe.len(), 7);
        assert_eq!(pipe.commands()[6].args(), &[json!("h"), json!("f")]);
    }

    #[test]
    fn test_clear() {
        let client = client();
        let mut pipe = client.pipeline();
        pipe.get("a").get("b");
        assert_eq!(pipe.clear().len(), 0);
        assert!(pipe.is_empty());
    }

    #[tokio::test]
    async fn test_execute_empty_returns_immediately() {
        let client = client();
        client.close();
        let mut pipe = client.pipeline();
        // closed client would fail any request, so this proves no network use
        let results = pipe.execute().await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_execute_on_closed_client_clears_queue() {
        let client = client();
        let mut pipe = client.pipeline();
        pipe.set("a", "1", None).get("a");
        client.close();

        let err = pipe.execute().await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Connection);
        assert_eq!(pipe.len(), 0);
    }
}
