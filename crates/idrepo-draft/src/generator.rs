//! Identifier generation over HTTP.

use crate::errors::{Result, UpstreamFailure};
use crate::traits::IdentifierGenerator;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error};

/// Calls an identifier service that answers `{"response": {"uin": "..."}}`
pub struct HttpIdentifierGenerator {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpIdentifierGenerator {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

/// Pull the identifier out of a generator response body
pub fn parse_generator_response(body: &Value) -> std::result::Result<String, UpstreamFailure> {
    if let Some(errors) = body.get("errors").and_then(Value::as_array) {
        if !errors.is_empty() {
            return Err(UpstreamFailure::Service(Value::Array(errors.clone()).to_string()));
        }
    }

    body.pointer("/response/uin")
        .and_then(Value::as_str)
        .filter(|uin| !uin.is_empty())
        .map(str::to_string)
        .ok_or_else(|| UpstreamFailure::MalformedResponse("missing response.uin".to_string()))
}

#[async_trait]
impl IdentifierGenerator for HttpIdentifierGenerator {
    async fn generate(&self) -> Result<String> {
        debug!("Requesting identifier from {}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| UpstreamFailure::Service(e.to_string()))?;

        if !response.status().is_success() {
            error!("Identifier service returned {}", response.status());
            return Err(UpstreamFailure::Service(format!("status {}", response.status())).into());
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| UpstreamFailure::MalformedResponse(e.to_string()))?;

        Ok(parse_generator_response(&body)?)
    }
}
