//! HTTP Peer Client
//!
//! Calls another node's transport endpoints on behalf of a group.

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::group::{PeerDeleter, PeerGetter};
use crate::models::{DeleteResponse, ErrorResponse};
use crate::transport::FORWARDED_HEADER;

// == HTTP Peer ==
/// A remote node reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPeer {
    /// `{addr}{base_path}`, e.g. `http://10.0.0.2:8001/_peercache`
    base_url: Url,
    client: Client,
}

impl HttpPeer {
    /// Creates a client for the node at `addr` serving under `base_path`.
    pub fn new(addr: &str, base_path: &str, client: Client) -> Result<Self> {
        let raw = format!("{}{}", addr.trim_end_matches('/'), base_path);
        let base_url = Url::parse(&raw)
            .map_err(|err| CacheError::Internal(format!("invalid peer url {raw}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(CacheError::Internal(format!("invalid peer url {raw}")));
        }

        Ok(Self { base_url, client })
    }

    /// Returns the base URL requests are sent under.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds `{base}/{group}/{key}` with both segments percent-encoded.
    fn url(&self, group: &str, key: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CacheError::Internal(format!("invalid peer url {}", self.base_url)))?
            .pop_if_empty()
            .push(group)
            .push(key);
        Ok(url)
    }
}

#[async_trait]
impl PeerGetter for HttpPeer {
    async fn get(&self, group: &str, key: &str) -> Result<Vec<u8>> {
        let url = self.url(group, key)?;
        debug!(%url, "remote get");

        let response = self
            .client
            .get(url)
            .header(FORWARDED_HEADER, "1")
            .send()
            .await
            .map_err(communication)?;
        let response = check_status(response).await?;
        let bytes = response.bytes().await.map_err(communication)?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl PeerDeleter for HttpPeer {
    async fn delete(&self, group: &str, key: &str) -> Result<bool> {
        let url = self.url(group, key)?;
        debug!(%url, "remote delete");

        let response = self
            .client
            .delete(url)
            .header(FORWARDED_HEADER, "1")
            .send()
            .await
            .map_err(communication)?;
        let response = check_status(response).await?;
        let body: DeleteResponse = response.json().await.map_err(communication)?;
        Ok(body.removed)
    }
}

fn communication(err: reqwest::Error) -> CacheError {
    CacheError::PeerCommunication(err.to_string())
}

/// Turns a non-2xx response into a `PeerCommunication` error carrying the
/// peer's error message when it sent one.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().clone();
    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status.canonical_reason().unwrap_or("unknown").to_string(),
    };
    Err(CacheError::PeerCommunication(format!(
        "{url} returned {status}: {message}"
    )))
}
