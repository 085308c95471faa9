//! # Source provider backed by a cloud controller's app listing.
//!
//! [`AppListerProvider`] monitors every app of one space. It issues
//! `GET /v2/apps?q=space_guid:<space>` through a [`Curl`] capability and
//! decodes the v2 resource envelope:
//!
//! ```text
//! { "resources": [ { "metadata": { "guid": "a" }, "entity": { "name": "app-1" } }, ... ] }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::clients::SourceProvider;
use crate::error::ClientError;
use crate::model::Resource;

/// Authenticated HTTP access to the cloud controller API.
#[async_trait]
pub trait Curl: Send + Sync + 'static {
    /// Performs one request against a path relative to the API root.
    async fn curl(&self, url: &str, method: &str, body: &str) -> Result<Vec<u8>, ClientError>;
}

#[derive(Deserialize)]
struct AppsResponse {
    #[serde(default)]
    resources: Vec<AppResource>,
}

#[derive(Deserialize)]
struct AppResource {
    metadata: AppMetadata,
    entity: AppEntity,
}

#[derive(Deserialize)]
struct AppMetadata {
    guid: String,
}

#[derive(Deserialize)]
struct AppEntity {
    name: String,
}

/// Lists the apps of one space as monitored resources.
#[derive(Clone)]
pub struct AppListerProvider {
    curler: Arc<dyn Curl>,
    space_guid: String,
}

impl AppListerProvider {
    /// Creates a provider for `space_guid`.
    pub fn new(curler: Arc<dyn Curl>, space_guid: impl Into<String>) -> Self {
        Self {
            curler,
            space_guid: space_guid.into(),
        }
    }

    /// Lists the space's apps in response order.
    pub async fn list_apps(&self) -> Result<Vec<Resource>, ClientError> {
        let url = format!("/v2/apps?q=space_guid:{}", self.space_guid);
        let body = self.curler.curl(&url, "GET", "").await?;
        let resp: AppsResponse = serde_json::from_slice(&body).map_err(|e| ClientError::Decode {
            error: e.to_string(),
        })?;

        Ok(resp
            .resources
            .into_iter()
            .map(|r| Resource::new(r.metadata.guid, r.entity.name))
            .collect())
    }
}

#[async_trait]
impl SourceProvider for AppListerProvider {
    async fn resources(&self) -> Result<Vec<Resource>, ClientError> {
        self.list_apps().await
    }
}
