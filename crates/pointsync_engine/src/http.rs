//! HTTP transport implementation.
//!
//! Talks to the point server's JSON endpoints with a pooled `reqwest`
//! client. Every request carries the configured timeout.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::transport::PointTransport;
use async_trait::async_trait;
use parking_lot::RwLock;
use pointsync_protocol::{decode_points, encode_points, PointId, PointSet, PushResponse};
use reqwest::{header::CONTENT_TYPE, Client, Response, Url};
use std::time::Duration;
use tracing::debug;

/// Resolves the points endpoint for a server URL.
///
/// `http://host:3000` and `http://host:3000/` become
/// `http://host:3000/points`; a URL already ending in `/points` is kept.
pub fn endpoint_url(server_url: &str) -> String {
    let trimmed = server_url.trim().trim_end_matches('/');
    if trimmed.ends_with("/points") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/points")
    }
}

/// HTTP-based point transport.
pub struct HttpTransport {
    client: Client,
    endpoint: RwLock<String>,
}

impl HttpTransport {
    /// Creates a transport for `server_url` with a per-request timeout.
    pub fn new(server_url: &str, timeout: Duration) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport_error)?;

        Ok(Self {
            client,
            endpoint: RwLock::new(endpoint_url(server_url)),
        })
    }

    /// Creates a transport from a sync configuration.
    pub fn from_config(config: &SyncConfig) -> SyncResult<Self> {
        Self::new(&config.server_url, config.timeout)
    }

    /// Returns the current points endpoint.
    pub fn endpoint(&self) -> String {
        self.endpoint.read().clone()
    }

    fn point_url(&self, id: &PointId) -> SyncResult<Url> {
        let endpoint = self.endpoint();
        let mut url = Url::parse(&endpoint)
            .map_err(|e| SyncError::transport(format!("invalid server url {endpoint}: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| SyncError::transport(format!("invalid server url {endpoint}")))?
            .push(id.as_str());
        Ok(url)
    }
}

#[async_trait]
impl PointTransport for HttpTransport {
    async fn fetch_all(&self) -> SyncResult<PointSet> {
        let url = self.endpoint();
        let response = self.client.get(&url).send().await.map_err(transport_error)?;
        let body = success_body(response).await?;
        let points = decode_points(&body)?;
        debug!(%url, count = points.len(), "fetched points");
        Ok(points)
    }

    async fn replace_all(&self, points: &PointSet) -> SyncResult<usize> {
        let url = self.endpoint();
        let body = encode_points(points)?;
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(transport_error)?;
        push_count(response).await
    }

    async fn remove(&self, id: &PointId) -> SyncResult<usize> {
        let url = self.point_url(id)?;
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(transport_error)?;
        push_count(response).await
    }

    fn set_endpoint(&self, url: &str) {
        *self.endpoint.write() = endpoint_url(url);
    }
}

async fn success_body(response: Response) -> SyncResult<Vec<u8>> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SyncError::http_status(
            status.as_u16(),
            format!("server returned {status}: {body}"),
        ));
    }
    let bytes = response.bytes().await.map_err(transport_error)?;
    Ok(bytes.to_vec())
}

async fn push_count(response: Response) -> SyncResult<usize> {
    let body = success_body(response).await?;
    let reply = PushResponse::decode(&body)?;
    if !reply.success {
        return Err(SyncError::transport("server rejected the request"));
    }
    Ok(reply.count)
}

fn transport_error(err: reqwest::Error) -> SyncError {
    SyncError::Transport {
        status: err.status().map(|s| s.as_u16()),
        message: err.to_string(),
    }
}
