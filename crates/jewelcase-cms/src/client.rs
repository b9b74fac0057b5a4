//! HTTP client for the CMS REST API.
//!
//! [`CmsClient`] is built once at startup and holds the pooled HTTP client.
//! Each incoming request gets its own [`Api`] handle, pinned to the content
//! ref that request should see: the master ref, or a preview ref carried by
//! the preview cookie.

use std::{future::Future, sync::Arc, time::Duration};

use jewelcase_core::config::CmsConfig;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::{
    api::ContentApi,
    error::{CmsError, Result},
    predicate::{self, Predicate},
    query::{QueryOptions, SearchResponse},
};

/// Cookie set by the CMS toolbar while an editor previews a release.
pub const PREVIEW_COOKIE: &str = "io.prismic.preview";

/// Longest upstream error body kept in [`CmsError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Request-scoped parameters that decide which content a handle sees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestScope {
    /// Preview ref to query instead of the master ref.
    pub preview_ref: Option<String>,
}

impl RequestScope {
    /// Scope that reads published content.
    pub fn published() -> Self {
        Self::default()
    }

    /// Build a scope from a raw `Cookie` header.
    pub fn from_cookie_header(header: Option<&str>) -> Self {
        let preview_ref = header
            .into_iter()
            .flat_map(|h| h.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == PREVIEW_COOKIE)
            .and_then(|(_, value)| preview_ref_from_cookie(value));

        Self { preview_ref }
    }
}

/// Extract the preview ref from a preview cookie value.
///
/// Older toolbars store the ref directly; newer ones store a JSON object
/// keyed by repository host whose `preview` member is the ref.
fn preview_ref_from_cookie(value: &str) -> Option<String> {
    let raw = value.trim().trim_matches('"');
    let decoded = urlencoding::decode(raw).map_or_else(|_| raw.to_string(), |d| d.into_owned());
    if decoded.is_empty() {
        return None;
    }

    if decoded.starts_with('{') {
        let parsed: serde_json::Value = serde_json::from_str(&decoded).ok()?;
        return parsed
            .as_object()?
            .values()
            .find_map(|repo| repo.get("preview").and_then(|p| p.as_str()))
            .map(str::to_string);
    }

    Some(decoded)
}

/// Produces request-scoped API handles.
pub trait ApiFactory: Send + Sync + 'static {
    /// Handle type produced for each request.
    type Api: ContentApi + 'static;

    /// Build a handle for one request.
    fn connect(&self, scope: &RequestScope) -> impl Future<Output = Result<Self::Api>> + Send;
}

/// API root document; only the refs matter here.
#[derive(Debug, Deserialize)]
struct ApiRoot {
    #[serde(default)]
    refs: Vec<ContentRef>,
}

#[derive(Debug, Deserialize)]
struct ContentRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "isMasterRef", default)]
    is_master_ref: bool,
}

/// Process-wide CMS client.
#[derive(Debug, Clone)]
pub struct CmsClient {
    http: reqwest::Client,
    endpoint: Arc<str>,
    access_token: Arc<str>,
    page_size: u32,
}

impl CmsClient {
    /// Create a client from configuration.
    pub fn new(config: &CmsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .user_agent(concat!("jewelcase/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CmsError::Config(e.to_string()))?;

        Self::with_http_client(http, config)
    }

    /// Create a client around an existing HTTP client.
    pub fn with_http_client(http: reqwest::Client, config: &CmsConfig) -> Result<Self> {
        let endpoint = config.endpoint.trim().trim_end_matches('/');
        if reqwest::Url::parse(endpoint).is_err() {
            return Err(CmsError::Config(format!("invalid endpoint {endpoint:?}")));
        }

        Ok(Self {
            http,
            endpoint: Arc::from(endpoint),
            access_token: Arc::from(config.access_token.as_str()),
            page_size: config.page_size,
        })
    }

    /// Build a handle for one request.
    ///
    /// With a preview ref in scope the handle uses it directly; otherwise
    /// the current master ref is read from the API root.
    pub async fn api(&self, scope: &RequestScope) -> Result<Api> {
        let reference = match &scope.preview_ref {
            Some(preview) => {
                tracing::debug!("using preview ref");
                preview.clone()
            }
            None => self.master_ref().await?,
        };

        Ok(Api {
            client: self.clone(),
            reference,
        })
    }

    async fn master_ref(&self) -> Result<String> {
        let response = self
            .http
            .get(self.endpoint.as_ref())
            .query(&[("access_token", self.access_token.as_ref())])
            .send()
            .await?;

        let root: ApiRoot = decode(response).await?;
        root.refs
            .into_iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference)
            .ok_or(CmsError::NoMasterRef)
    }
}

impl ApiFactory for CmsClient {
    type Api = Api;

    async fn connect(&self, scope: &RequestScope) -> Result<Api> {
        self.api(scope).await
    }
}

/// A CMS handle pinned to one content ref.
#[derive(Debug, Clone)]
pub struct Api {
    client: CmsClient,
    reference: String,
}

impl Api {
    /// The content ref every query runs against.
    pub fn reference(&self) -> &str {
        &self.reference
    }
}

impl ContentApi for Api {
    async fn query(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<SearchResponse> {
        let q = predicate::to_query(predicates);
        tracing::debug!(q = %q, page = ?options.page, "querying CMS");

        let mut params: Vec<(&str, String)> = vec![
            ("ref", self.reference.clone()),
            ("q", q),
            ("access_token", self.client.access_token.to_string()),
        ];
        params.extend(options.to_params(self.client.page_size));

        let response = self
            .client
            .http
            .get(format!("{}/documents/search", self.client.endpoint))
            .query(&params)
            .send()
            .await?;

        decode(response).await
    }
}

/// Check the status and decode a JSON body.
async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(status_error(status, body));
    }

    Ok(serde_json::from_str(&body)?)
}

fn status_error(status: StatusCode, body: String) -> CmsError {
    let mut message = body;
    if message.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !message.is_char_boundary(cut) {
            cut -= 1;
        }
        message.truncate(cut);
    }

    tracing::warn!(status = status.as_u16(), "CMS request failed");
    CmsError::Status {
        status: status.as_u16(),
        message,
    }
}
