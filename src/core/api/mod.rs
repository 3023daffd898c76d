//! Backend API client.
//!
//! Authenticated GET/POST against a single JSON backend. GET responses are
//! cached per path and revalidated with `If-None-Match`; a 304 answer is
//! served from the cache without further network calls.
//!
//! There is no retry and no request deduplication: two concurrent GETs to
//! the same uncached path both hit the network and the last write wins.

mod cache;
mod transport;

pub use cache::{CacheEntry, CacheStore, LocalStorageStore, ResponseCache};
#[cfg(test)]
pub use cache::MemoryStore;
pub use transport::{FetchTransport, HttpRequest, HttpResponse, Method, Transport};

use leptos::logging;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::config;
use crate::core::error::{ApiError, CacheError, HttpError};

/// Client used by the site: browser fetch plus `localStorage` cache.
pub type SiteApi = ApiClient<FetchTransport, LocalStorageStore>;

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// Parse an environment tag. Anything other than `production` is development.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }
}

/// Client configuration, resolved once at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiClientOptions {
    pub env: Environment,
    pub base_url: String,
    pub api_key: String,
    pub api_username: String,
    pub api_signature: String,
}

impl ApiClientOptions {
    /// Options from the compile-time configuration in [`config`].
    pub fn from_config() -> Self {
        Self {
            env: Environment::from_tag(config::APP_ENV),
            base_url: config::API_BASE_URL.to_string(),
            api_key: config::API_KEY.to_string(),
            api_username: config::API_USERNAME.to_string(),
            api_signature: config::API_SIGNATURE.to_string(),
        }
    }
}

/// HTTP client with an ETag-validated GET cache.
pub struct ApiClient<T, S> {
    options: ApiClientOptions,
    transport: T,
    cache: ResponseCache<S>,
}

impl<T: Transport, S: CacheStore> ApiClient<T, S> {
    pub fn new(options: ApiClientOptions, transport: T, store: S) -> Self {
        Self {
            options,
            transport,
            cache: ResponseCache::new(store),
        }
    }

    pub fn is_dev(&self) -> bool {
        self.options.env == Environment::Development
    }

    pub fn is_prod(&self) -> bool {
        self.options.env == Environment::Production
    }

    pub fn options(&self) -> &ApiClientOptions {
        &self.options
    }

    pub fn cache(&self) -> &ResponseCache<S> {
        &self.cache
    }

    /// GET `path`, revalidating any cached copy.
    ///
    /// A 304 returns the cached data unchanged. A 304 for a path that was
    /// never cached fails with [`CacheError::MissingEntry`].
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        let cached = self.cached_entry(path);

        let mut headers = self.headers();
        if let Some(etag) = cached.as_ref().and_then(|entry| entry.etag.clone()) {
            headers.push(("If-None-Match", etag));
        }

        let request = HttpRequest {
            method: Method::Get,
            url: self.url(path),
            headers,
            body: None,
        };
        let response = self.send(request).await?;

        if response.is_not_modified() {
            let entry = cached.ok_or_else(|| CacheError::MissingEntry(path.to_string()))?;
            return decode(entry.data);
        }

        if !response.is_success() {
            return Err(HttpError::from_text(response.status, &response.body).into());
        }

        let entry = CacheEntry {
            etag: response.etag,
            data: parse_body(&response.body)?,
        };

        // Caching is best-effort
        if let Err(e) = self.cache.put(path, &entry) {
            logging::warn!("[api] could not cache {}: {}", path, e);
        }

        decode(entry.data)
    }

    /// POST a JSON payload to `path`. Results are never cached.
    pub async fn post<B, R>(&self, path: &str, payload: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_string(payload).map_err(|e| ApiError::Encode(e.to_string()))?;

        let request = HttpRequest {
            method: Method::Post,
            url: self.url(path),
            headers: self.headers(),
            body: Some(body),
        };
        let response = self.send(request).await?;

        if !response.is_success() {
            return Err(HttpError::from_text(response.status, &response.body).into());
        }

        decode(parse_body(&response.body)?)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        if self.is_dev() {
            logging::log!("[api] {} {}", request.method.as_str(), request.url);
        }

        let response = self.transport.send(request).await?;

        if self.is_dev() {
            logging::log!("[api] -> {}", response.status);
        }
        Ok(response)
    }

    fn cached_entry(&self, path: &str) -> Option<CacheEntry> {
        match self.cache.get(path) {
            Ok(entry) => entry,
            Err(e) => {
                logging::warn!("[api] ignoring cache for {}: {}", path, e);
                None
            }
        }
    }

    fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Content-Type", "application/json".to_string()),
            ("User-Agent", config::USER_AGENT.to_string()),
            ("X-API-Key", self.options.api_key.clone()),
            ("X-API-Username", self.options.api_username.clone()),
            ("X-API-Signature", self.options.api_signature.clone()),
        ]
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.options.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Generate an opaque hex token for request signing.
pub fn create_nonce() -> Result<String, ApiError> {
    let mut bytes = [0u8; 16];
    getrandom::getrandom(&mut bytes).map_err(|e| ApiError::Entropy(e.to_string()))?;
    Ok(hex::encode(bytes))
}

/// Parse a response body as JSON. An empty body is `null`.
fn parse_body(body: &str) -> Result<Value, ApiError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn decode<R: DeserializeOwned>(value: Value) -> Result<R, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}
