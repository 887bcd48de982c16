use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::types::FunctionResponse;
use crate::config::FunctionsConfig;
use crate::error::{ErrorCode, FleetError, OperationError};

/// Anything that can call a serverless function by name.
pub trait FunctionInvoker {
    fn invoke(
        &self,
        function: &str,
        body: &Value,
    ) -> impl Future<Output = Result<FunctionResponse, OperationError>> + Send;
}

/// HTTP client for the hosted serverless functions.
pub struct FunctionClient {
    api_key: String,
    client: Client,
    base_url: String,
}

impl FunctionClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, FleetError> {
        Self::with_request_timeout(base_url, api_key, Duration::from_secs(30))
    }

    pub fn with_request_timeout(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, FleetError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            api_key: api_key.into(),
            client,
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &FunctionsConfig) -> Result<Self, FleetError> {
        Self::with_request_timeout(
            config.base_url.clone(),
            config.api_key.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn endpoint(&self, function: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), function)
    }

    pub async fn invoke(&self, function: &str, body: &Value) -> Result<FunctionResponse, OperationError> {
        let request_id = Uuid::new_v4().to_string();
        debug!(function, request_id = %request_id, "invoking function");

        let response = self
            .client
            .post(self.endpoint(function))
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
            .header("x-request-id", &request_id)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                OperationError::new(ErrorCode::OperationFailed, e.to_string(), function)
                    .with_context("requestId", request_id.clone())
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            OperationError::new(ErrorCode::OperationFailed, e.to_string(), function)
                .with_context("status", status.as_u16())
        })?;

        if !status.is_success() {
            return Err(error_for_status(function, status, &text).with_context("requestId", request_id));
        }

        let parsed: FunctionResponse = serde_json::from_str(&text).map_err(|e| {
            OperationError::new(
                ErrorCode::OperationFailed,
                format!("invalid response body: {e}"),
                function,
            )
            .with_context("status", status.as_u16())
        })?;

        if !parsed.success {
            let reason = parsed
                .failure_reason()
                .unwrap_or("function reported failure")
                .to_string();
            return Err(OperationError::new(ErrorCode::OperationFailed, reason, function)
                .with_context("status", status.as_u16())
                .with_context("requestId", request_id));
        }

        Ok(parsed)
    }
}

impl FunctionInvoker for FunctionClient {
    async fn invoke(&self, function: &str, body: &Value) -> Result<FunctionResponse, OperationError> {
        FunctionClient::invoke(self, function, body).await
    }
}

/// Maps a non-2xx status to an error code, pulling the reason from the body
/// when it has the usual `{success, message, error}` shape.
fn error_for_status(function: &str, status: StatusCode, body: &str) -> OperationError {
    let code = match status.as_u16() {
        400 | 422 => ErrorCode::ValidationError,
        401 | 403 => ErrorCode::Unauthorized,
        404 => ErrorCode::NotFound,
        429 => ErrorCode::RateLimitExceeded,
        500..=599 => ErrorCode::DatabaseError,
        _ => ErrorCode::OperationFailed,
    };

    let message = serde_json::from_str::<FunctionResponse>(body)
        .ok()
        .and_then(|r| r.failure_reason().map(str::to_string))
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| format!("{function} returned status {}", status.as_u16()));

    OperationError::new(code, message, function).with_context("status", status.as_u16())
}
