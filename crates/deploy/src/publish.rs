//! Publishing artifacts to content-addressed storage and building
//! shareable deployment links.

use serde::Deserialize;
use url::Url;

use crate::{artifact::CompiledArtifact, error::DeployError};

/// Content identifier returned by the storage network.
///
/// Opaque, but constrained to characters that survive as a URL path
/// segment, since the whole point is to embed it in a deployment link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(raw: impl Into<String>) -> Result<Self, DeployError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(DeployError::Publish(
                "storage returned an empty content ID".to_string(),
            ));
        }
        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        {
            return Err(DeployError::Publish(format!(
                "content ID is not a valid URL path segment: {raw}"
            )));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Upload response from the storage API.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    cid: String,
}

/// Client for the content-addressed storage network's HTTP API.
pub struct StorageClient {
    client: reqwest::Client,
    api_url: Url,
    auth_token: Option<String>,
}

impl StorageClient {
    pub fn new(
        client: reqwest::Client,
        api_url: &str,
        auth_token: Option<String>,
    ) -> Result<Self, DeployError> {
        let api_url = Url::parse(api_url)
            .map_err(|e| DeployError::Publish(format!("invalid storage API URL: {e}")))?;
        Ok(Self {
            client,
            api_url,
            auth_token,
        })
    }

    /// Publish the artifact as one JSON document.
    ///
    /// A single best-effort call: network failures surface as
    /// [`DeployError::Publish`] and are not retried here.
    pub async fn publish(&self, artifact: &CompiledArtifact) -> Result<ContentId, DeployError> {
        let endpoint = self
            .api_url
            .join("upload")
            .map_err(|e| DeployError::Publish(format!("invalid upload endpoint: {e}")))?;

        let mut request = self.client.post(endpoint).json(artifact);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DeployError::Publish(format!("upload request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(DeployError::Publish(format!(
                "storage API returned {}",
                response.status()
            )));
        }

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| DeployError::Publish(format!("malformed upload response: {e}")))?;

        let cid = ContentId::new(upload.cid)?;
        tracing::info!(%cid, contract = %artifact.name, "Artifact published");
        Ok(cid)
    }
}

/// Build the shareable deployment link for a published artifact:
/// `https://<host>/deploy/<cid>`.
///
/// Resolving the link fetches the artifact back from storage and re-enters
/// the deployment flow from `Idle`.
pub fn deployment_link(host: &str, cid: &ContentId) -> Result<Url, DeployError> {
    Url::parse(&format!("https://{host}/deploy/{cid}"))
        .map_err(|e| DeployError::InvalidInput(format!("invalid link host {host}: {e}")))
}
