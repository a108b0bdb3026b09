//! Admin API client
//!
//! A thin typed wrapper over the six admin endpoints. No business logic
//! lives here; every method surfaces success or a classified [`ApiError`]
//! and nothing retries on its own; stale polls are superseded by the next
//! tick instead.

use super::ApiError;
use anyhow::{Context, Result};
use mockdeck_common::{
    constants, AdvancedMode, HangingRequest, PathResponse, RequestLog, ResolveAction,
    ResolveRequest, UpsertRequest,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;

/// Client for the mock server's admin API
#[derive(Clone)]
pub struct AdminClient {
    base_url: String,
    http: Client,
}

impl AdminClient {
    /// Create a client for the admin API at `base_url`
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// The admin API base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `/api/responses` - all configured path responses
    pub async fn list_responses(&self) -> Result<BTreeMap<String, PathResponse>, ApiError> {
        self.get_json("/api/responses", "Failed to list path responses")
            .await
    }

    /// POST `/api/response` - create or update a path's canned response
    ///
    /// The server is authoritative for validation; this only blocks requests
    /// that could never be right. A zero status code normalizes to 200, the
    /// way the server itself treats it.
    pub async fn upsert_response(
        &self,
        path: &str,
        status_code: u16,
        body: &str,
        mode: AdvancedMode,
    ) -> Result<(), ApiError> {
        validate_path(path)?;

        let status_code = if status_code == 0 { 200 } else { status_code };
        if !(100..=599).contains(&status_code) {
            return Err(ApiError::Validation(format!(
                "status code {} is outside 100-599",
                status_code
            )));
        }

        let payload = UpsertRequest {
            path: path.to_string(),
            status_code,
            response: body.to_string(),
            advanced: mode.to_wire(),
        };

        let url = format!("{}/api/response", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ApiError::from_network(&e, "Failed to save response"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::from_status(
                status.as_u16(),
                body,
                "Failed to save response",
            ));
        }
        tracing::debug!("Saved response config for {}", path);
        Ok(())
    }

    /// DELETE `/api/response?path=<p>` - remove a path's canned response
    ///
    /// Deleting the default path is rejected locally, before any network
    /// call, because the server would refuse it anyway.
    pub async fn delete_response(&self, path: &str) -> Result<(), ApiError> {
        validate_path(path)?;
        if path == constants::DEFAULT_PATH {
            return Err(ApiError::Validation(
                "cannot delete default path response".to_string(),
            ));
        }

        let url = format!("{}/api/response", self.base_url);
        let resp = self
            .http
            .delete(&url)
            .query(&[("path", path)])
            .send()
            .await
            .map_err(|e| ApiError::from_network(&e, "Failed to delete response"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::from_status(
                status.as_u16(),
                body,
                "Failed to delete response",
            ));
        }
        Ok(())
    }

    /// GET `/api/logs` + GET `/api/hanging-requests`, fetched concurrently
    ///
    /// If either fetch fails the whole refresh fails; a stale hanging set
    /// against fresh logs (or vice versa) must never be merged.
    pub async fn fetch_dashboard(
        &self,
    ) -> Result<(Vec<RequestLog>, Vec<HangingRequest>), ApiError> {
        let (logs, hanging) = tokio::join!(
            self.get_json::<Vec<RequestLog>>("/api/logs", "Failed to fetch request logs"),
            self.get_json::<Vec<HangingRequest>>(
                "/api/hanging-requests",
                "Failed to fetch hanging requests"
            ),
        );
        Ok((logs?, hanging?))
    }

    /// POST `/api/hanging-request` - respond to or drop a held request
    ///
    /// A request that vanished before the action landed (404, or 409 when
    /// another actor settled it first) maps to [`ApiError::AlreadyResolved`]
    /// rather than a failure.
    pub async fn resolve_hanging(
        &self,
        id: &str,
        action: ResolveAction,
    ) -> Result<(), ApiError> {
        let payload = ResolveRequest {
            id: id.to_string(),
            action,
        };

        let url = format!("{}/api/hanging-request", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ApiError::from_network(&e, "Failed to resolve hanging request"))?;

        let status = resp.status();
        if status.is_success() {
            tracing::debug!("Resolved hanging request {} with {}", id, action);
            return Ok(());
        }
        match status.as_u16() {
            404 | 409 => Err(ApiError::AlreadyResolved),
            s => {
                let body = resp.text().await.unwrap_or_default();
                Err(ApiError::from_status(
                    s,
                    body,
                    "Failed to resolve hanging request",
                ))
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::from_network(&e, what))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status.as_u16(), body, what));
        }

        resp.json::<T>().await.map_err(|e| ApiError::Transport {
            status: Some(status.as_u16()),
            message: format!("{}: invalid response body: {}", what, e),
        })
    }
}

/// Paths must be non-empty and absolute; everything else is the server's call
fn validate_path(path: &str) -> Result<(), ApiError> {
    if path.is_empty() {
        return Err(ApiError::Validation("path is required".to_string()));
    }
    if !path.starts_with('/') {
        return Err(ApiError::Validation(format!(
            "path must start with '/', got '{}'",
            path
        )));
    }
    Ok(())
}
