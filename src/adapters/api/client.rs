use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::dto::ApiPayload;
use crate::ports::{RepositoryError, RepositoryResult};

/// Thin HTTP transport for the task service. Every failure leaving this type
/// is already mapped into a [`RepositoryError`].
#[derive(Clone)]
pub struct TaskApiClient {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl TaskApiClient {
    pub fn new(
        base_url: &str,
        api_token: Option<String>,
        timeout: Duration,
    ) -> RepositoryResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("taskpad/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RepositoryError::Request(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.filter(|t| !t.is_empty()),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> RepositoryResult<Option<T>> {
        let response = self.send(self.client.get(self.url(path))).await?;
        self.handle_response(response).await
    }

    pub async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> RepositoryResult<Option<T>> {
        let response = self.send(self.client.post(self.url(path)).json(body)).await?;
        self.handle_response(response).await
    }

    pub async fn put<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> RepositoryResult<Option<T>> {
        let response = self.send(self.client.put(self.url(path)).json(body)).await?;
        self.handle_response(response).await
    }

    /// DELETE accepts an empty body, a bare payload or an envelope.
    pub async fn delete(&self, path: &str) -> RepositoryResult<()> {
        let response = self.send(self.client.delete(self.url(path))).await?;
        let text = self.success_body(response).await?;

        if text.trim().is_empty() {
            return Ok(());
        }
        match serde_json::from_str::<ApiPayload<serde_json::Value>>(&text) {
            Ok(payload) => payload.into_data().map(|_| ()),
            // Non-JSON acknowledgements are fine for a delete
            Err(_) => Ok(()),
        }
    }

    async fn send(&self, request: RequestBuilder) -> RepositoryResult<Response> {
        let request = match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        request.send().await.map_err(map_transport_error)
    }

    async fn success_body(&self, response: Response) -> RepositoryResult<String> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::debug!("API error response {}: {}", status, error_text);
            return Err(RepositoryError::from_status(status.as_u16()));
        }

        let response_text = response.text().await.map_err(map_transport_error)?;
        tracing::debug!("API Response: {}", response_text);
        Ok(response_text)
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> RepositoryResult<Option<T>> {
        let response_text = self.success_body(response).await?;

        let payload: ApiPayload<T> = serde_json::from_str(&response_text).map_err(|e| {
            RepositoryError::Response(format!(
                "Failed to parse response: {e}. Response was: {response_text}"
            ))
        })?;
        payload.into_data()
    }
}

/// Normalize a transport-level failure (no HTTP status available).
pub fn map_transport_error(error: reqwest::Error) -> RepositoryError {
    if let Some(status) = error.status() {
        RepositoryError::from_status(status.as_u16())
    } else if error.is_timeout() {
        RepositoryError::timed_out()
    } else if error.is_connect() {
        RepositoryError::no_internet()
    } else if error.is_decode() {
        RepositoryError::Response(error.to_string())
    } else if error.is_builder() || error.is_request() {
        RepositoryError::Request(error.to_string())
    } else if error.is_body() {
        RepositoryError::Connection(error.to_string())
    } else {
        RepositoryError::Unknown(format!("Unknown error: {error}"))
    }
}
