//! candela-http
//!
//! `ChartDataSource` backed by the analytics REST backend. Fetches campaign
//! metadata, paginated round trips and binary chart payloads, either directly
//! from the backend or through the dashboard proxy routes.
#![warn(missing_docs)]

mod builder;
mod errors;

use async_trait::async_trait;
use candela_core::{
    CampaignMetadata, CandelaError, ChartDataSource, Endpoint, FetchRequest, RoundTripPage,
};
use moka::future::Cache;
use url::Url;

pub use builder::HttpSourceBuilder;
pub use errors::{HTML_ERROR_MESSAGE, error_from_body};

/// URL layout used to reach the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    /// Call the backend's `/api/v1/dashboard/*` endpoints directly.
    #[default]
    Direct,
    /// Call the dashboard proxy, which forwards to `backend_url` (sent as `X-API-URL`).
    Proxy {
        /// Backend base URL the proxy should forward to.
        backend_url: String,
    },
}

impl Route {
    fn segments<'a>(&self, endpoint: Endpoint, campaign_id: &'a str) -> Vec<&'a str> {
        match (self, endpoint) {
            (Self::Direct, Endpoint::Metadata) => {
                vec!["api", "v1", "dashboard", "analytics-metadata", campaign_id]
            }
            (Self::Direct, Endpoint::RoundTrips) => {
                vec!["api", "v1", "dashboard", "round_trip", campaign_id]
            }
            (Self::Direct, Endpoint::ChartData) => {
                vec!["api", "v1", "dashboard", "analytics", campaign_id]
            }
            (Self::Proxy { .. }, Endpoint::Metadata) => {
                vec!["api", "trade-analytics", "metadata", campaign_id]
            }
            (Self::Proxy { .. }, Endpoint::RoundTrips) => {
                vec!["api", "backend-server", "dashboard", "round-trips", campaign_id]
            }
            (Self::Proxy { .. }, Endpoint::ChartData) => vec![
                "api",
                "backend-server",
                "dashboard",
                "trade-analytics-chart-data",
                campaign_id,
            ],
        }
    }
}

/// HTTP source for the analytics backend.
///
/// Construct with [`HttpSource::builder`].
pub struct HttpSource {
    client: reqwest::Client,
    base: Url,
    route: Route,
    user_id: String,
    metadata_cache: Option<Cache<String, CampaignMetadata>>,
    page_cache: Option<Cache<(String, u32), RoundTripPage>>,
}

impl HttpSource {
    /// Start configuring a source rooted at `base_url`.
    pub fn builder(base_url: impl Into<String>) -> HttpSourceBuilder {
        HttpSourceBuilder::new(base_url)
    }

    /// Base URL requests are issued against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    /// Configured route.
    #[must_use]
    pub const fn route(&self) -> &Route {
        &self.route
    }

    /// Identity sent in `X-User-Id`.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Drop cached metadata and round-trip pages.
    pub fn invalidate_cached(&self) {
        if let Some(c) = &self.metadata_cache {
            c.invalidate_all();
        }
        if let Some(c) = &self.page_cache {
            c.invalidate_all();
        }
    }

    /// Absolute URL for `endpoint` of `campaign_id`.
    ///
    /// # Errors
    /// Returns `InvalidArg` for an empty campaign id.
    pub fn endpoint_url(&self, endpoint: Endpoint, campaign_id: &str) -> Result<Url, CandelaError> {
        let campaign_id = campaign_id.trim();
        if campaign_id.is_empty() {
            return Err(CandelaError::InvalidArg("campaign id is empty".into()));
        }
        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                CandelaError::InvalidArg(format!("base url cannot carry a path: {}", self.base))
            })?;
            path.pop_if_empty();
            path.extend(self.route.segments(endpoint, campaign_id));
        }
        Ok(url)
    }

    async fn get_bytes(&self, url: Url, accept: &'static str) -> Result<Vec<u8>, CandelaError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, accept)
            .send()
            .await
            .map_err(|e| errors::transport(&e))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| errors::transport(&e))?;
        if !status.is_success() {
            #[cfg(feature = "tracing")]
            tracing::warn!(status = status.as_u16(), "backend returned an error status");
            return Err(error_from_body(
                status.as_u16(),
                &String::from_utf8_lossy(&body),
            ));
        }
        Ok(body.to_vec())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        what: &str,
    ) -> Result<T, CandelaError> {
        let body = self.get_bytes(url, "application/json").await?;
        serde_json::from_slice(&body)
            .map_err(|e| CandelaError::Data(format!("malformed {what} response: {e}")))
    }
}

#[async_trait]
impl ChartDataSource for HttpSource {
    fn name(&self) -> &'static str {
        "candela-http"
    }

    fn vendor(&self) -> &'static str {
        "Analytics backend"
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "candela_http::metadata",
            skip(self),
            fields(campaign = campaign_id),
        )
    )]
    async fn metadata(&self, campaign_id: &str) -> Result<CampaignMetadata, CandelaError> {
        if let Some(cache) = &self.metadata_cache {
            if let Some(hit) = cache.get(campaign_id).await {
                #[cfg(feature = "tracing")]
                tracing::debug!("metadata served from transport cache");
                return Ok(hit);
            }
        }
        let url = self.endpoint_url(Endpoint::Metadata, campaign_id)?;
        let meta: CampaignMetadata = self.get_json(url, "metadata").await?;
        if let Some(cache) = &self.metadata_cache {
            cache.insert(campaign_id.to_string(), meta.clone()).await;
        }
        Ok(meta)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "candela_http::round_trips",
            skip(self),
            fields(campaign = campaign_id, page = page),
        )
    )]
    async fn round_trips(&self, campaign_id: &str, page: u32) -> Result<RoundTripPage, CandelaError> {
        let key = (campaign_id.to_string(), page);
        if let Some(cache) = &self.page_cache {
            if let Some(hit) = cache.get(&key).await {
                return Ok(hit);
            }
        }
        let mut url = self.endpoint_url(Endpoint::RoundTrips, campaign_id)?;
        url.query_pairs_mut().append_pair("page", &page.to_string());
        let parsed: RoundTripPage = self.get_json(url, "round trip").await?;
        if let Some(cache) = &self.page_cache {
            cache.insert(key, parsed.clone()).await;
        }
        Ok(parsed)
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "candela_http::chart_data",
            skip(self, request),
            fields(series = %request.series_key()),
        )
    )]
    async fn chart_data(&self, request: &FetchRequest) -> Result<Vec<u8>, CandelaError> {
        let mut url = self.endpoint_url(Endpoint::ChartData, &request.strategy_id)?;
        url.query_pairs_mut().extend_pairs(request.to_query_pairs());
        let bytes = self
            .get_bytes(url, "application/octet-stream, application/json")
            .await?;
        #[cfg(feature = "tracing")]
        tracing::debug!(bytes = bytes.len(), "chart payload received");
        Ok(bytes)
    }
}
