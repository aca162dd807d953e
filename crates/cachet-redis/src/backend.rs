use std::collections::HashSet;

use async_trait::async_trait;
use cachet_core::{Backend, CachetError, Command, Reply, Result};
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tokio::sync::RwLock;

use crate::config::{redacted, RedisBackendConfig};

/// Redis-backed implementation of the [`Backend`](cachet_core::Backend) trait.
///
/// Holds one [`MultiplexedConnection`]; Redis pipelines concurrent commands
/// over it, so no client-side pool or lock is needed per command.
pub struct RedisBackend {
    connection: RwLock<Option<MultiplexedConnection>>,
    config: RedisBackendConfig,
}

impl std::fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBackend")
            .field("url", &redacted(&self.config.url))
            .field("scan_count", &self.config.scan_count)
            .field("del_chunk", &self.config.del_chunk)
            .finish()
    }
}

impl RedisBackend {
    /// Open a client for `config.url` and establish the connection.
    ///
    /// # Errors
    ///
    /// Returns [`CachetError::Config`] if the URL is invalid and
    /// [`CachetError::Connection`] if the server cannot be reached.
    pub async fn connect(config: RedisBackendConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| CachetError::Config(format!("invalid Redis URL: {e}")))?;
        Self::with_client(client, config).await
    }

    /// Connect to `url` with default tuning.
    pub async fn from_url(url: &str) -> Result<Self> {
        Self::connect(RedisBackendConfig::with_url(url)).await
    }

    /// Establish the connection through an existing client.
    pub async fn with_client(client: redis::Client, config: RedisBackendConfig) -> Result<Self> {
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CachetError::Connection(format!("failed to connect to Redis: {e}")))?;
        tracing::info!(url = %redacted(&config.url), "connected to Redis");
        Ok(Self {
            connection: RwLock::new(Some(connection)),
            config,
        })
    }

    pub fn config(&self) -> &RedisBackendConfig {
        &self.config
    }

    async fn get_connection(&self) -> Result<MultiplexedConnection> {
        self.connection
            .read()
            .await
            .clone()
            .ok_or_else(|| CachetError::Connection("Redis connection closed".to_string()))
    }

    async fn get(&self, con: &mut MultiplexedConnection, key: &str) -> Result<Reply> {
        let raw: Option<String> = con
            .get(key)
            .await
            .map_err(|e| command_error("GET", e))?;
        Ok(raw.map_or(Reply::Nil, Reply::Bulk))
    }

    async fn set(
        &self,
        con: &mut MultiplexedConnection,
        key: &str,
        value: &str,
        ttl: Option<u64>,
    ) -> Result<Reply> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(secs) = ttl {
            cmd.arg("EX").arg(secs);
        }
        let _: () = cmd
            .query_async(con)
            .await
            .map_err(|e| command_error("SET", e))?;
        Ok(Reply::Ok)
    }

    async fn del(&self, con: &mut MultiplexedConnection, keys: &[String]) -> Result<Reply> {
        let mut removed = 0i64;
        for chunk in keys.chunks(self.config.del_chunk.max(1)) {
            let n: i64 = con
                .del(chunk)
                .await
                .map_err(|e| command_error("DEL", e))?;
            removed += n;
        }
        Ok(Reply::Integer(removed))
    }

    async fn expire(
        &self,
        con: &mut MultiplexedConnection,
        key: &str,
        seconds: u64,
    ) -> Result<Reply> {
        let seconds = i64::try_from(seconds)
            .map_err(|_| CachetError::Backend(format!("expire time out of range: {seconds}")))?;
        let applied: i64 = con
            .expire(key, seconds)
            .await
            .map_err(|e| command_error("EXPIRE", e))?;
        Ok(Reply::Integer(applied))
    }

    async fn ttl(&self, con: &mut MultiplexedConnection, key: &str) -> Result<Reply> {
        let secs: i64 = con.ttl(key).await.map_err(|e| command_error("TTL", e))?;
        Ok(Reply::Integer(secs))
    }
}

/// Classify a Redis error: transport failures are connection errors, anything
/// the server answered with is a backend error.
fn command_error(op: &str, e: redis::RedisError) -> CachetError {
    if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout() {
        CachetError::Connection(format!("Redis {op} error: {e}"))
    } else {
        CachetError::Backend(format!("Redis {op} error: {e}"))
    }
}

#[async_trait]
impl Backend for RedisBackend {
    async fn command(&self, cmd: Command) -> Result<Reply> {
        let mut con = self.get_connection().await?;
        match cmd {
            Command::Get { key } => self.get(&mut con, &key).await,
            Command::Set { key, value, ttl } => self.set(&mut con, &key, &value, ttl).await,
            Command::Del { keys } => self.del(&mut con, &keys).await,
            Command::Expire { key, seconds } => self.expire(&mut con, &key, seconds).await,
            Command::Ttl { key } => self.ttl(&mut con, &key).await,
        }
    }

    async fn scan(&self, pattern: &str) -> Result<Vec<String>> {
        let mut con = self.get_connection().await?;

        // SCAN may return a key more than once across iterations.
        let mut seen: HashSet<String> = HashSet::new();
        let mut keys: Vec<String> = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next_cursor, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(self.config.scan_count)
                .query_async(&mut con)
                .await
                .map_err(|e| command_error("SCAN", e))?;

            for k in batch {
                if seen.insert(k.clone()) {
                    keys.push(k);
                }
            }
            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        Ok(keys)
    }

    async fn close(&self) -> Result<()> {
        if self.connection.write().await.take().is_some() {
            tracing::info!(url = %redacted(&self.config.url), "closed Redis connection");
        }
        Ok(())
    }
}
