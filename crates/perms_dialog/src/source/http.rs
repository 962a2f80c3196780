//! HTTP resource source backed by `reqwest`.

use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, trace, warn};

use super::{ResourceQuery, ResourceSource};
use crate::error::DialogError;
use crate::options::DialogOptions;
use crate::tree::wire::{parse_nodes, WireNode, ROOT_PARENT};

/// Source that `GET`s the resource listing endpoint
///
/// # Example
///
/// ```
/// use perms_dialog::options::DialogOptions;
/// use perms_dialog::source::HttpResourceSource;
///
/// let options = DialogOptions::builder()
///     .base_url("http://localhost:8080")
///     .build();
/// let source = HttpResourceSource::new(&options).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct HttpResourceSource {
    client: reqwest::Client,
    base_url: String,
    endpoint_path: String,
}

impl HttpResourceSource {
    /// Create a source for the endpoint configured in `options`
    ///
    /// # Errors
    ///
    /// - [`DialogError::Http`] if the HTTP client cannot be built
    pub fn new(options: &DialogOptions) -> Result<Self, DialogError> {
        let client = reqwest::Client::builder()
            .timeout(options.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: options.base_url.clone(),
            endpoint_path: options.endpoint_path.clone(),
        })
    }

    /// Request URL for a query; lazy loads add `id=<parent>` (`#` for roots)
    pub fn request_url(
        &self,
        query: &ResourceQuery,
        parent: Option<&str>,
    ) -> Result<Url, DialogError> {
        let raw = query.url(&self.base_url, &self.endpoint_path);
        let mut url = Url::parse(&raw).map_err(|e| DialogError::InvalidUrl(format!("{raw}: {e}")))?;
        url.query_pairs_mut()
            .append_pair("id", parent.unwrap_or(ROOT_PARENT));
        Ok(url)
    }
}

#[async_trait]
impl ResourceSource for HttpResourceSource {
    async fn list(
        &self,
        query: &ResourceQuery,
        parent: Option<&str>,
    ) -> Result<Vec<WireNode>, DialogError> {
        let url = self.request_url(query, parent)?;
        debug!("Fetching resources: {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Resource endpoint returned {} for {}", status, url);
            return Err(DialogError::Endpoint {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        trace!("Resource body: {} bytes", body.len());
        Ok(parse_nodes(&body)?)
    }
}
