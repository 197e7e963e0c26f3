use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::error::ClientError;
use crate::auth::dto::{
    AuthResponse, LoginRequest, ProfileResponse, RegisterRequest, UpdateProfileRequest,
    UsersResponse,
};

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Remote calls the dashboard makes. Implemented over HTTP by [`ApiClient`];
/// tests substitute their own.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ClientError>;
    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ClientError>;
    async fn profile(&self, token: &str) -> Result<ProfileResponse, ClientError>;
    async fn update_profile(
        &self,
        token: &str,
        req: &UpdateProfileRequest,
    ) -> Result<ProfileResponse, ClientError>;
    async fn list_users(&self, token: &str) -> Result<UsersResponse, ClientError>;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// `base_url` is the API root, e.g. `http://localhost:5000/api`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .map_err(|e| ClientError::Unexpected(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let res = req.send().await.map_err(ClientError::Network)?;
        let status = res.status();
        let body = res.bytes().await.map_err(ClientError::Network)?;

        if !status.is_success() {
            debug!(%status, "request failed");
            return Err(ClientError::from_response(status.as_u16(), &body));
        }

        serde_json::from_slice(&body).map_err(|e| ClientError::Unexpected(e.to_string()))
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    #[instrument(skip_all)]
    async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        self.send(self.http.post(self.url("register")).json(req)).await
    }

    #[instrument(skip_all)]
    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ClientError> {
        self.send(self.http.post(self.url("login")).json(req)).await
    }

    #[instrument(skip_all)]
    async fn profile(&self, token: &str) -> Result<ProfileResponse, ClientError> {
        self.send(self.http.get(self.url("profile")).bearer_auth(token))
            .await
    }

    #[instrument(skip_all)]
    async fn update_profile(
        &self,
        token: &str,
        req: &UpdateProfileRequest,
    ) -> Result<ProfileResponse, ClientError> {
        self.send(self.http.put(self.url("profile")).bearer_auth(token).json(req))
            .await
    }

    #[instrument(skip_all)]
    async fn list_users(&self, token: &str) -> Result<UsersResponse, ClientError> {
        self.send(self.http.get(self.url("users")).bearer_auth(token))
            .await
    }
}
