use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheBackend {
    Memory,
    Moka,
}

impl CacheBackend {
    pub fn as_str(&self) -> &str {
        match self {
            CacheBackend::Memory => "memory",
            CacheBackend::Moka => "moka",
        }
    }
}

impl FromStr for CacheBackend {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(CacheBackend::Memory),
            "moka" => Ok(CacheBackend::Moka),
            other => Err(crate::Error::Config(format!("unknown cache backend '{other}'"))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub token_path: PathBuf,
    pub cache_backend: CacheBackend,
    pub cache_ttl: Duration,
    pub cache_max_entries: Option<u64>,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub credentials: Option<Credentials>,
}

impl Config {
    const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
    const DEFAULT_CACHE_TTL_SECS: u64 = 300;
    const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("LOCALMART_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| {
                info!(
                    "LOCALMART_API_URL not set, using default: {}",
                    Self::DEFAULT_API_BASE_URL
                );
                Self::DEFAULT_API_BASE_URL.to_string()
            });

        let token_path = lookup("LOCALMART_TOKEN_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_token_path(&lookup));

        let cache_backend = match lookup("LOCALMART_CACHE_BACKEND") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!("{e}, falling back to in-memory cache");
                CacheBackend::Memory
            }),
            None => CacheBackend::Memory,
        };

        let credentials = match (lookup("LOCALMART_USERNAME"), lookup("LOCALMART_PASSWORD")) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            (Some(_), None) => {
                warn!("LOCALMART_USERNAME set without LOCALMART_PASSWORD, ignoring credentials");
                None
            }
            _ => None,
        };

        Self {
            api_base_url,
            token_path,
            cache_backend,
            cache_ttl: Duration::from_secs(parse_or(
                &lookup,
                "LOCALMART_CACHE_TTL_SECS",
                Self::DEFAULT_CACHE_TTL_SECS,
            )),
            cache_max_entries: lookup("LOCALMART_CACHE_MAX_ENTRIES").and_then(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .map_err(|e| warn!("Invalid LOCALMART_CACHE_MAX_ENTRIES value: {e}"))
                    .ok()
            }),
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "LOCALMART_REQUEST_TIMEOUT_SECS",
                Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
            poll_interval: Duration::from_secs(parse_or(
                &lookup,
                "LOCALMART_POLL_INTERVAL_SECS",
                Self::DEFAULT_POLL_INTERVAL_SECS,
            )),
            credentials,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value '{raw}': {e}, using default: {default}");
            default
        }),
        None => default,
    }
}

fn default_token_path<F>(lookup: &F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    let home_dir = lookup("HOME")
        .or_else(|| lookup("USERPROFILE"))
        .unwrap_or_else(|| ".".to_string());

    PathBuf::from(home_dir).join(".localmart").join("session.json")
}
