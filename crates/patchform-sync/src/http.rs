//! HTTP client for pulling patch fields from a sockpuppet session.

use std::time::Duration;

use patchform_core::{ApiError, Envelope, PatchRecord};
use reqwest::header::ACCEPT;
use thiserror::Error;
use tracing::{info, warn};

/// Path of the patch listing endpoint, relative to the session base URL.
pub const PATCHES_PATH: &str = "/api/session/sockpuppet/patches";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// HTTP client for the session's patch endpoint.
pub struct PatchClient {
    client: reqwest::Client,
    base_url: String,
}

impl PatchClient {
    /// Create a client for the given session base URL.
    ///
    /// `base_url` should be like `http://127.0.0.1` (a trailing slash is trimmed).
    /// Every request is abandoned after `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn patches_url(&self) -> String {
        format!("{}{PATCHES_PATH}", self.base_url)
    }

    /// Fetch every patch field, flattened address-major then field-minor.
    ///
    /// An empty list is a valid result; the caller decides what to do with it.
    pub async fn fetch_patches(&self) -> Result<Vec<PatchRecord>, FetchError> {
        let url = self.patches_url();

        info!(url = %url, "fetching patches");
        let resp = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        let records = Envelope::from_json(&body)?.into_records()?;
        if records.is_empty() {
            warn!("no patches found");
        } else {
            info!(count = records.len(), "fetched patches");
        }
        Ok(records)
    }
}
