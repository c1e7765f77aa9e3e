use std::time::Duration;

use candela_core::CandelaError;
use moka::future::Cache;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::{HttpSource, Route};

const USER_ID_HEADER: &str = "x-user-id";
const API_URL_HEADER: &str = "x-api-url";

/// Builder for [`HttpSource`].
///
/// Behavior and trade-offs:
/// - Every request carries `X-User-Id`; [`Route::Proxy`] also sends `X-API-URL`.
/// - Metadata and round-trip pages are cached for `metadata_ttl`; a zero TTL
///   disables that cache. Chart payloads are never cached here.
/// - `timeout` bounds each HTTP request end to end.
#[derive(Debug, Clone)]
pub struct HttpSourceBuilder {
    base_url: String,
    route: Route,
    user_id: String,
    timeout: Duration,
    metadata_ttl: Duration,
    cache_capacity: u64,
}

impl HttpSourceBuilder {
    /// Default identity sent when no user id is configured.
    pub const DEFAULT_USER_ID: &'static str = "guest";
    /// Default per-request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
    /// Default lifetime of cached metadata and round-trip pages.
    pub const DEFAULT_METADATA_TTL: Duration = Duration::from_secs(10 * 60);

    pub(crate) fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            route: Route::Direct,
            user_id: Self::DEFAULT_USER_ID.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
            metadata_ttl: Self::DEFAULT_METADATA_TTL,
            cache_capacity: 256,
        }
    }

    /// Select the URL layout (default: [`Route::Direct`]).
    #[must_use]
    pub fn route(mut self, route: Route) -> Self {
        self.route = route;
        self
    }

    /// Identity forwarded in `X-User-Id`.
    #[must_use]
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Lifetime of cached metadata and round-trip pages. Zero disables caching.
    #[must_use]
    pub const fn metadata_ttl(mut self, ttl: Duration) -> Self {
        self.metadata_ttl = ttl;
        self
    }

    /// Maximum number of cached metadata documents and pages (each).
    #[must_use]
    pub const fn cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Build the source.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the base URL does not parse or cannot carry a
    /// path, or a header value contains characters HTTP forbids, and
    /// `Transport` if the HTTP client cannot be initialized.
    pub fn build(self) -> Result<HttpSource, CandelaError> {
        let base = Url::parse(self.base_url.trim())
            .map_err(|e| CandelaError::InvalidArg(format!("invalid base url {}: {e}", self.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(CandelaError::InvalidArg(format!(
                "base url cannot carry a path: {base}"
            )));
        }

        let user_id = if self.user_id.trim().is_empty() {
            Self::DEFAULT_USER_ID.to_string()
        } else {
            self.user_id
        };

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(USER_ID_HEADER), header_value(&user_id)?);
        if let Route::Proxy { backend_url } = &self.route {
            headers.insert(HeaderName::from_static(API_URL_HEADER), header_value(backend_url)?);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.timeout)
            .build()
            .map_err(|e| CandelaError::Transport(format!("failed to build http client: {e}")))?;

        let (metadata_cache, page_cache) = if self.metadata_ttl.is_zero() {
            (None, None)
        } else {
            (
                Some(
                    Cache::builder()
                        .max_capacity(self.cache_capacity)
                        .time_to_live(self.metadata_ttl)
                        .build(),
                ),
                Some(
                    Cache::builder()
                        .max_capacity(self.cache_capacity)
                        .time_to_live(self.metadata_ttl)
                        .build(),
                ),
            )
        };

        Ok(HttpSource {
            client,
            base,
            route: self.route,
            user_id,
            metadata_cache,
            page_cache,
        })
    }
}

fn header_value(value: &str) -> Result<HeaderValue, CandelaError> {
    HeaderValue::from_str(value)
        .map_err(|e| CandelaError::InvalidArg(format!("invalid header value {value:?}: {e}")))
}
