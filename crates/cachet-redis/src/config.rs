use cachet_core::{CachetError, Result};
use serde::Deserialize;

/// Configuration for [`RedisBackend`](crate::RedisBackend).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RedisBackendConfig {
    /// Connection URL. Defaults to `"redis://127.0.0.1:6379/"`.
    pub url: String,
    /// `COUNT` hint passed to each `SCAN` call. Defaults to `100`.
    pub scan_count: usize,
    /// Maximum number of keys per `DEL` issued by a bulk delete. Defaults to `500`.
    pub del_chunk: usize,
}

impl Default for RedisBackendConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379/".to_string(),
            scan_count: 100,
            del_chunk: 500,
        }
    }
}

impl RedisBackendConfig {
    /// Config with default tuning pointed at `url`.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Build from the process environment.
    ///
    /// `REDIS_URL` wins when set. Otherwise the URL is assembled from
    /// `REDIS_HOST` (default `127.0.0.1`), `REDIS_PORT` (default `6379`) and
    /// `REDIS_DB` (default `0`).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("REDIS_URL").filter(|u| !u.is_empty()) {
            return Ok(Self::with_url(url));
        }

        let host = lookup("REDIS_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port: u16 = parse_var(&lookup, "REDIS_PORT", 6379)?;
        let db: u32 = parse_var(&lookup, "REDIS_DB", 0)?;
        Ok(Self::with_url(format!("redis://{host}:{port}/{db}")))
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| CachetError::Config(format!("invalid {name} '{raw}': {e}"))),
        None => Ok(default),
    }
}

/// `url` with any password replaced, for logging.
pub(crate) fn redacted(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
