//! HTTP client for the Travis CI v3 API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{
    HeaderMap,
    HeaderName,
    HeaderValue,
    ACCEPT,
    AUTHORIZATION,
    CONTENT_TYPE,
};
use reqwest::{
    Client,
    Response,
};
use secrecy::{
    ExposeSecret,
    SecretString,
};
use serde::de::DeserializeOwned;

use crate::config::{
    RepoSlug,
    TriggerConfig,
};
use crate::error::{
    TriggerError,
    TriggerResult,
};
use crate::types::{
    BuildRequest,
    StatusResponse,
    TriggerResponse,
};

pub const API_VERSION_HEADER: &str = "Travis-API-Version";
pub const API_VERSION: &str = "3";

/// The two calls the workflow makes against a build provider
#[async_trait]
pub trait BuildService: Send + Sync {
    /// Creates a build request and returns the decoded response
    async fn create_request(&self, body: &BuildRequest) -> TriggerResult<TriggerResponse>;

    /// Fetches the current status of a build request
    async fn request_status(&self, request_id: u64) -> TriggerResult<StatusResponse>;
}

pub struct TravisClient {
    client: Client,
    api_url: String,
    repo: RepoSlug,
}

impl TravisClient {
    pub fn new(client: Client, api_url: impl Into<String>, repo: RepoSlug) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            repo,
        }
    }

    pub fn from_config(config: &TriggerConfig) -> TriggerResult<Self> {
        let http_client = Client::builder()
            .default_headers(default_headers(&config.token)?)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| TriggerError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::new(
            http_client,
            config.api_url.clone(),
            config.repo.clone(),
        ))
    }

    pub fn requests_url(&self) -> String {
        requests_url(&self.api_url, &self.repo)
    }

    pub fn status_url(&self, request_id: u64) -> String {
        status_url(&self.api_url, &self.repo, request_id)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> TriggerResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TriggerError::Transport(format!("Failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(TriggerError::ApiStatus {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(TriggerError::from)
    }
}

#[async_trait]
impl BuildService for TravisClient {
    async fn create_request(&self, body: &BuildRequest) -> TriggerResult<TriggerResponse> {
        let url = self.requests_url();
        tracing::debug!(%url, "POST build request");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| TriggerError::Transport(format!("Failed to trigger build: {e}")))?;

        Self::decode(response).await
    }

    async fn request_status(&self, request_id: u64) -> TriggerResult<StatusResponse> {
        let url = self.status_url(request_id);
        tracing::debug!(%url, "GET request status");

        let response =
            self.client.get(&url).send().await.map_err(|e| {
                TriggerError::Transport(format!("Failed to fetch request status: {e}"))
            })?;

        Self::decode(response).await
    }
}

pub fn requests_url(api_url: &str, repo: &RepoSlug) -> String {
    format!("{api_url}/repo/{}/requests", repo.encoded())
}

pub fn status_url(api_url: &str, repo: &RepoSlug, request_id: u64) -> String {
    format!("{api_url}/repo/{}/request/{request_id}", repo.encoded())
}

/// Header set sent with every call
pub fn default_headers(token: &SecretString) -> TriggerResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static("travis-api-version"),
        HeaderValue::from_static(API_VERSION),
    );

    let mut auth = HeaderValue::from_str(&format!("token {}", token.expose_secret())).map_err(
        |e| TriggerError::ConfigurationInvalid {
            key: "TRAVIS_CI_TOKEN".to_string(),
            reason: format!("not usable as a header value: {e}"),
        },
    )?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);

    Ok(headers)
}
