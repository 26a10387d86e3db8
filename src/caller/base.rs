//! Base Client
//!
//! The innermost caller: performs the actual HTTP request with reqwest.

use async_trait::async_trait;
use tracing::debug;

use super::{ApiRequest, ApiResponse, Caller};
use crate::error::{CallerError, Result};

/// Performs the actual HTTP request.
///
/// Non-success statuses are returned as ordinary responses; only transport
/// failures become errors.
#[derive(Debug, Clone, Default)]
pub struct BaseClient {
    http_client: reqwest::Client,
}

impl BaseClient {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl Caller for BaseClient {
    async fn call(&self, request: ApiRequest) -> Result<ApiResponse> {
        let request = reqwest::Request::try_from(request)
            .map_err(|e| CallerError::InvalidRequest(e.to_string()))?;
        debug!("Calling {} {}", request.method(), request.url());

        let response = self.http_client.execute(request).await?;

        let mut builder = http::Response::builder()
            .status(response.status())
            .version(response.version());
        if let Some(headers) = builder.headers_mut() {
            headers.extend(response.headers().clone());
        }

        // Buffer the whole body so every layer above can read it independently
        let body = response.bytes().await?;
        builder
            .body(body)
            .map_err(|e| CallerError::InvalidResponse(e.to_string()))
    }
}
