//! Typed client for the blood request endpoints.
//!
//! Every call goes through an [`HttpClient`], so the controllers can be driven
//! by [`crate::http::MockHttpClient`] in tests. Non-2xx statuses are reported as
//! [`BloodRequestError::UnexpectedStatus`]; a well-formed `{"success": false}`
//! body is returned as `Ok(false)` so callers can tell the two apart.

use std::sync::Arc;

use serde::Deserialize;

use crate::config::ClientConfig;
use crate::domain::{AreaRecord, BloodRequest, RequestId, StoredBloodRequest};
use crate::error::{BloodRequestError, Result};
use crate::http::{ApiRequest, HttpClient, HttpResponse};
use crate::session::Identity;

/// Collection path for blood requests.
pub const BLOOD_REQUEST_PATH: &str = "/api/blood-request";

#[derive(Debug, Deserialize)]
struct SuccessEnvelope {
    #[serde(default)]
    success: bool,
}

// Records are decoded one at a time so a single malformed entry cannot hide
// the rest of the listing.
#[derive(Debug, Deserialize)]
struct ListEnvelope {
    #[serde(default)]
    requests: Option<Vec<serde_json::Value>>,
}

/// Client for the blood request API.
#[derive(Clone)]
pub struct BloodRequestApi<H: HttpClient> {
    http: Arc<H>,
    config: ClientConfig,
}

impl<H: HttpClient> BloodRequestApi<H> {
    pub fn new(http: Arc<H>, config: ClientConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch the static area reference dataset.
    #[tracing::instrument(skip(self), fields(path = %self.config.areas_path))]
    pub async fn fetch_areas(&self) -> Result<Vec<AreaRecord>> {
        let response = self
            .send(&ApiRequest::get(self.config.areas_path.clone()))
            .await?;
        let areas: Vec<AreaRecord> = serde_json::from_str(&response.body)?;
        tracing::debug!(count = areas.len(), "Fetched area dataset");
        Ok(areas)
    }

    /// Submit a new blood request. Returns the API's `success` flag.
    #[tracing::instrument(skip(self, request), fields(blood_group = %request.blood_group))]
    pub async fn create_request(&self, request: &BloodRequest) -> Result<bool> {
        let response = self
            .send(&ApiRequest::post_json(BLOOD_REQUEST_PATH, request)?)
            .await?;
        let envelope: SuccessEnvelope = serde_json::from_str(&response.body)?;
        Ok(envelope.success)
    }

    /// List the requests created by `identity`.
    #[tracing::instrument(skip(self, identity), fields(user = %identity))]
    pub async fn list_requests(&self, identity: &Identity) -> Result<Vec<StoredBloodRequest>> {
        let request = ApiRequest::get(BLOOD_REQUEST_PATH).with_query("user", identity.as_str());
        let response = self.send(&request).await?;
        let envelope: ListEnvelope = serde_json::from_str(&response.body)?;
        let requests: Vec<StoredBloodRequest> = envelope
            .requests
            .unwrap_or_default()
            .into_iter()
            .filter_map(|raw| {
                let id = raw.get("_id").map(ToString::to_string);
                serde_json::from_value(raw)
                    .inspect_err(|e| {
                        tracing::warn!(id = ?id, error = %e, "Skipping malformed blood request");
                    })
                    .ok()
            })
            .collect();
        tracing::debug!(count = requests.len(), "Fetched blood requests");
        Ok(requests)
    }

    /// Delete the request with identity `id`. Returns the API's `success` flag.
    #[tracing::instrument(skip(self, id), fields(request_id = %id))]
    pub async fn delete_request(&self, id: &RequestId) -> Result<bool> {
        let response = self.send(&ApiRequest::delete(item_path(id)?)).await?;
        let envelope: SuccessEnvelope = serde_json::from_str(&response.body)?;
        tracing::debug!(success = envelope.success, "Delete response");
        Ok(envelope.success)
    }

    async fn send(&self, request: &ApiRequest) -> Result<HttpResponse> {
        let response = self.http.execute(request, self.config.timeout_ms).await?;
        if !response.is_success() {
            tracing::warn!(
                method = %request.method,
                path = %request.path,
                status = response.status,
                "API returned non-success status"
            );
            return Err(BloodRequestError::UnexpectedStatus {
                status: response.status,
                body: response.body,
            });
        }
        Ok(response)
    }
}

/// Path of a single request, with `id` percent-encoded as one segment.
fn item_path(id: &RequestId) -> Result<String> {
    let mut url = reqwest::Url::parse(&format!("http://localhost{BLOOD_REQUEST_PATH}"))
        .map_err(|e| anyhow::anyhow!("Invalid request path: {e}"))?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("Request path cannot take segments"))?
        .push(id);
    Ok(url.path().to_string())
}
