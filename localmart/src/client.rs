use crate::error::RequestError;
use crate::session::{FileTokenStore, SessionEvent, TokenStore};
use crate::transport::{HttpRequest, Method, ReqwestTransport, RequestBody, Transport};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::config::{CacheBackend, Config};
use std::sync::Arc;
use std::time::Duration;
use storage_engine::{MemoryCache, MokaCache, ResponseCache};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Per-call cache options for GET requests
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestConfig {
    /// Consult and fill the response cache
    pub cache: bool,
    /// `None` uses the cache's default TTL
    pub cache_expiry: Option<Duration>,
    /// `None` keys the entry by the request path
    pub cache_key: Option<String>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            cache: true,
            cache_expiry: None,
            cache_key: None,
        }
    }
}

impl RequestConfig {
    pub fn no_cache() -> Self {
        Self {
            cache: false,
            ..Self::default()
        }
    }

    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.cache_expiry = Some(expiry);
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }
}

/// The only way application code talks to the REST API.
///
/// Attaches the bearer token, turns every failure into a [`RequestError`], serves
/// GETs from the response cache and purges it after successful writes. Clones
/// share the cache, token store, and session event channel.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Arc<str>,
    transport: Arc<dyn Transport>,
    cache: Arc<dyn ResponseCache<Value>>,
    tokens: Arc<dyn TokenStore>,
    session_events: broadcast::Sender<SessionEvent>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        cache: Arc<dyn ResponseCache<Value>>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        let base_url: String = base_url.into();
        let (session_events, _) = broadcast::channel(16);

        Self {
            base_url: base_url.trim_end_matches('/').into(),
            transport,
            cache,
            tokens,
            session_events,
        }
    }

    /// Wire up the reqwest transport, the configured cache backend, and the
    /// file-backed token store
    pub fn from_config(config: &Config) -> Result<Self, RequestError> {
        let transport = ReqwestTransport::new(config.request_timeout)?;

        let cache: Arc<dyn ResponseCache<Value>> = match config.cache_backend {
            CacheBackend::Memory => Arc::new(MemoryCache::<Value>::with_default_ttl(config.cache_ttl)),
            CacheBackend::Moka => Arc::new(MokaCache::<Value>::new(
                "responses".to_string(),
                config.cache_max_entries,
                Some(config.cache_ttl),
            )),
        };

        tracing::info!(
            "API client for {} using {} cache (ttl {:?})",
            config.api_base_url,
            config.cache_backend.as_str(),
            config.cache_ttl
        );

        Ok(Self::new(
            config.api_base_url.clone(),
            Arc::new(transport),
            cache,
            Arc::new(FileTokenStore::new(&config.token_path)),
        ))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> &Arc<dyn ResponseCache<Value>> {
        &self.cache
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub fn subscribe_session(&self) -> broadcast::Receiver<SessionEvent> {
        self.session_events.subscribe()
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, RequestError> {
        self.get_with(path, RequestConfig::default()).await
    }

    pub async fn get_with<T: DeserializeOwned>(
        &self,
        path: &str,
        config: RequestConfig,
    ) -> Result<T, RequestError> {
        let key = config.cache_key.as_deref().unwrap_or(path);

        if config.cache {
            if let Some(cached) = self.cache.get(key) {
                debug!("Cache hit for '{}'", key);
                return T::deserialize(&cached).map_err(RequestError::decode);
            }
            debug!("Cache miss for '{}'", key);
        }

        let payload = self.execute(Method::Get, path, RequestBody::Empty).await?;
        let value = T::deserialize(&payload).map_err(RequestError::decode)?;

        if config.cache {
            self.cache.set(key, payload, config.cache_expiry);
        }

        Ok(value)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, RequestError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.mutate(Method::Post, path, json_body(body)?).await
    }

    /// POST `application/x-www-form-urlencoded` fields
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: &[(&str, &str)],
    ) -> Result<T, RequestError> {
        let fields = fields
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        self.mutate(Method::Post, path, RequestBody::Form(fields))
            .await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, RequestError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.mutate(Method::Put, path, json_body(body)?).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, RequestError> {
        self.mutate(Method::Delete, path, RequestBody::Empty).await
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        match self.session_events.send(event) {
            Ok(subscriber_count) => {
                debug!("Broadcasted session event to {} subscriber(s)", subscriber_count)
            }
            Err(broadcast::error::SendError(event)) => {
                debug!("No subscribers for session event {:?}", event)
            }
        }
    }

    async fn mutate<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> Result<T, RequestError> {
        let payload = self.execute(method, path, body).await?;
        T::deserialize(&payload).map_err(RequestError::decode)
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> Result<Value, RequestError> {
        let mut request = HttpRequest::new(method, self.url_for(path))
            .header("Accept", "application/json")
            .body(body);

        if let Some(token) = self.tokens.token() {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        debug!("{} {}", method, path);

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("{} {} failed: {}", method, path, e);
                return Err(e.into());
            }
        };

        if !response.is_success() {
            let error = RequestError::from_response(&response);
            warn!(
                "{} {} returned {}: {}",
                method, path, response.status, error.message
            );
            if error.is_unauthorized() {
                self.expire_session(path);
            }
            return Err(error);
        }

        if method.is_mutating() {
            // the write went through; anything cached under this path is stale now
            self.cache.clear_by_prefix(path);
        }

        parse_payload(&response.body)
    }

    fn expire_session(&self, path: &str) {
        if let Err(e) = self.tokens.clear() {
            warn!("Failed to clear session token after 401: {}", e);
        }
        self.emit(SessionEvent::Expired {
            path: path.to_string(),
        });
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("cache", &self.cache)
            .finish()
    }
}

fn json_body<B: Serialize + ?Sized>(body: &B) -> Result<RequestBody, RequestError> {
    serde_json::to_value(body)
        .map(RequestBody::Json)
        .map_err(|e| RequestError::setup(e.to_string()))
}

/// An empty 2xx body (e.g. 204) reads as JSON `null`
fn parse_payload(body: &[u8]) -> Result<Value, RequestError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(RequestError::decode)
}
