//! Command/query transport to the permit service.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};

use crate::config::ApiConfig;
use crate::error::TransportError;

use super::wire::{
    PollRequest, PollResponse, SubmitRequest, SubmitResponse, STAMP_COMMAND, STAMP_JOB_QUERY,
};

/// Maximum length of an error body kept in errors and logs.
const MAX_ERROR_BODY_LENGTH: usize = 200;

fn truncate_body(body: &str) -> String {
    if body.chars().count() > MAX_ERROR_BODY_LENGTH {
        let head: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
        format!("{}... (truncated)", head)
    } else {
        body.to_string()
    }
}

/// Issues the stamping command and the job progress query.
#[async_trait]
pub trait StampTransport: Send + Sync {
    async fn submit(&self, request: &SubmitRequest) -> Result<SubmitResponse, TransportError>;

    async fn poll(&self, request: &PollRequest) -> Result<PollResponse, TransportError>;
}

/// `reqwest` implementation against `{base}/api/command/..` and
/// `{base}/api/query/..`.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    token: Option<SecretString>,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> Result<Self, TransportError> {
        let mut builder =
            Client::builder().connect_timeout(Duration::from_secs(config.connect_timeout_secs));
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    pub fn command_url(&self, name: &str) -> String {
        format!("{}/api/command/{}", self.base_url, name)
    }

    pub fn query_url(&self, name: &str) -> String {
        format!("{}/api/query/{}", self.base_url, name)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, TransportError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| TransportError::Decode(format!("{} in {}", e, truncate_body(&body))))
    }
}

#[async_trait]
impl StampTransport for HttpTransport {
    async fn submit(&self, request: &SubmitRequest) -> Result<SubmitResponse, TransportError> {
        let url = self.command_url(STAMP_COMMAND);
        debug!(
            "POST {} with {} attachments",
            url,
            request.attachment_ids.len()
        );
        let response = self
            .authorize(self.client.post(&url))
            .json(request)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn poll(&self, request: &PollRequest) -> Result<PollResponse, TransportError> {
        let url = self.query_url(STAMP_JOB_QUERY);
        let version = request.version.to_string();
        let response = self
            .authorize(self.client.get(&url))
            .query(&[
                ("jobId", request.job_id.as_str()),
                ("version", version.as_str()),
            ])
            .send()
            .await?;
        Self::decode(response).await
    }
}
