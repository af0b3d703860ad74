use crate::error::{ProviderError, Result};
use crate::models::error_message;
use reqwest::{header, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error};

/// Decode a successful body as `T`, or classify the failure.
pub(crate) async fn handle_response<T>(response: Response, model: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let status = response.status();

    if status.is_success() {
        let response_text = response.text().await?;
        debug!("Received response: {}", response_text);

        serde_json::from_str(&response_text).map_err(|e| {
            error!("Failed to parse response: {}, text: {}", e, response_text);
            ProviderError::Json(e)
        })
    } else {
        Err(parse_error_response(response, model).await)
    }
}

async fn parse_error_response(response: Response, model: &str) -> ProviderError {
    let status_code = response.status().as_u16();
    let retry_after = response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok());

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => return ProviderError::Http(e),
    };

    match ProviderError::from_status(status_code, error_message(&body), model) {
        ProviderError::RateLimit { message, .. } => ProviderError::RateLimit {
            message,
            retry_after,
        },
        other => other,
    }
}

pub(crate) fn timeout_error(operation: &str, limit: Duration) -> ProviderError {
    ProviderError::Timeout {
        message: format!("{} exceeded {:?}", operation, limit),
    }
}
