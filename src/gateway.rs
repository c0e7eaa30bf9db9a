//! The inference gateway owns the HTTP call to the model serving endpoint.
//! It shapes the payload, attaches the bearer token, and maps every failure
//! onto a `RelayError`

use crate::error::{RelayError, Result};
use crate::payload::Payload;
use crate::settings::Settings;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::*;

/// A client for a single serving endpoint. Cheap to share between workers
pub struct InferenceGateway {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl std::fmt::Debug for InferenceGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InferenceGateway {{ endpoint: {:?}, token: <redacted> }}", self.endpoint)
    }
}

impl InferenceGateway {
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RelayError::Transport)?;

        Ok(InferenceGateway {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        InferenceGateway::new(
            settings.endpoint_url.clone(),
            settings.token(),
            settings.timeout(),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Score a payload on the serving endpoint and return its JSON answer
    #[tracing::instrument(skip_all, fields(endpoint = %self.endpoint))]
    pub async fn invoke(&self, payload: impl Into<Payload>) -> Result<Value> {
        let body = payload.into().normalize();

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(RelayError::from_send)?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.map_err(RelayError::from_send)?;
            warn!("serving endpoint answered {status}");
            return Err(RelayError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let prediction = response
            .json::<Value>()
            .await
            .map_err(|err| match err.is_decode() {
                true => RelayError::MalformedResponse(err),
                false => RelayError::from_send(err),
            })?;

        debug!("serving endpoint answered 200");
        Ok(prediction)
    }
}
