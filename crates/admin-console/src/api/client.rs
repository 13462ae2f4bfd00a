//! HTTP client for the user-management API.

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::error::{ApiError, ApiResult};
use super::types::*;

/// Client for the REST endpoints under the API base path.
///
/// Cookies are kept between requests so that the session established by
/// [`ApiClient::login`] authorises the admin-only endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// HTTP client.
    client: Client,
    /// Server origin plus API base path (e.g. "http://localhost:5000/api").
    base_url: String,
}

impl ApiClient {
    /// Create a client for `server_url` with endpoints under `api_base`.
    pub fn new(server_url: &str, api_base: &str, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            client,
            base_url: join_base(server_url, api_base),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit credentials. Failed logins are reported in the body, not as an error.
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<AuthResponse> {
        let url = self.url("/login");
        let response = self.send(self.client.post(&url).json(credentials), &url).await?;
        decode_reported(response).await
    }

    /// Register a new account. Failures are reported in the body.
    pub async fn register(&self, credentials: &Credentials) -> ApiResult<AuthResponse> {
        let url = self.url("/register");
        let response = self.send(self.client.post(&url).json(credentials), &url).await?;
        decode_reported(response).await
    }

    /// List all users.
    pub async fn list_users(&self) -> ApiResult<Vec<User>> {
        let url = self.url("/users");
        let response = self.send(self.client.get(&url), &url).await?;
        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Create a user.
    pub async fn create_user(&self, request: &CreateUserRequest) -> ApiResult<()> {
        let url = self.url("/users");
        let response = self.send(self.client.post(&url).json(request), &url).await?;
        check_status(response).await?;
        Ok(())
    }

    /// Update a user. Fields absent from the request keep their stored value.
    pub async fn update_user(&self, id: u64, request: &UpdateUserRequest) -> ApiResult<()> {
        let url = self.url(&format!("/users/{id}"));
        let response = self.send(self.client.put(&url).json(request), &url).await?;
        check_status(response).await?;
        Ok(())
    }

    /// Delete a user.
    pub async fn delete_user(&self, id: u64) -> ApiResult<()> {
        let url = self.url(&format!("/users/{id}"));
        let response = self.send(self.client.delete(&url), &url).await?;
        check_status(response).await?;
        Ok(())
    }

    /// Download the backup file produced by the backend.
    pub async fn export_users(&self) -> ApiResult<Vec<u8>> {
        let url = self.url("/users/export");
        let response = self.send(self.client.get(&url), &url).await?;
        let response = check_status(response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ApiError::Connection { url, source })?;
        Ok(bytes.to_vec())
    }

    /// Post users for merging. Usernames that already exist are skipped server-side.
    pub async fn import_users(&self, request: &ImportRequest) -> ApiResult<ImportResponse> {
        let url = self.url("/users/import");
        let response = self.send(self.client.post(&url).json(request), &url).await?;
        decode_reported(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> ApiResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|source| ApiError::Connection {
                url: url.to_string(),
                source,
            })?;
        debug!("{} -> {}", url, response.status());
        Ok(response)
    }
}

/// Join a server origin and an API base path without doubling slashes.
fn join_base(server_url: &str, api_base: &str) -> String {
    let server = server_url.trim_end_matches('/');
    let base = api_base.trim_matches('/');
    if base.is_empty() {
        server.to_string()
    } else {
        format!("{server}/{base}")
    }
}

/// Turn a non-OK response into `ApiError::Server` carrying the backend's message,
/// or `ApiError::Unexpected` when the body is not JSON.
async fn check_status(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match response.json::<MessageResponse>().await {
        Ok(body) => Err(ApiError::Server {
            status,
            message: body.message.unwrap_or_default(),
        }),
        Err(_) => Err(ApiError::Unexpected { status }),
    }
}

/// Decode a body whose `success` flag carries the outcome, whatever the status.
async fn decode_reported<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let status = response.status();
    let url = response.url().to_string();
    let bytes = response
        .bytes()
        .await
        .map_err(|source| ApiError::Connection { url, source })?;

    match serde_json::from_slice(&bytes) {
        Ok(body) => Ok(body),
        Err(_) if !status.is_success() => Err(ApiError::Unexpected { status }),
        Err(e) => Err(ApiError::Decode(e.to_string())),
    }
}
