use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use reqwest::header::{HeaderName, HeaderValue};
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

use super::error::RelayError;
use super::types::{JSONRPC_VERSION, JsonRpcResponse, RelayMethod};

/// Raw JSON-RPC access to the block engine. Returns the `result` member.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    async fn call(&self, method: RelayMethod, params: Value) -> Result<Value, RelayError>;
}

#[derive(Clone)]
pub struct HttpRelayTransport {
    base_url: String,
    uuid: Option<String>,
    client: Client,
    request_timeout: Duration,
}

impl HttpRelayTransport {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        uuid: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self, RelayError> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(RelayError::Endpoint("relay url is empty".to_string()));
        }
        let uuid = uuid
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        let transport = Self {
            base_url,
            uuid,
            client,
            request_timeout,
        };
        transport.endpoint(RelayMethod::SendBundle)?;
        Ok(transport)
    }

    fn endpoint(&self, method: RelayMethod) -> Result<Url, RelayError> {
        let raw = format!("{}{}", self.base_url, method.path());
        let mut url = Url::parse(&raw).map_err(|err| RelayError::Endpoint(format!("{raw}: {err}")))?;
        if let Some(uuid) = &self.uuid {
            url.query_pairs_mut().append_pair("uuid", uuid);
        }
        Ok(url)
    }
}

#[async_trait]
impl RelayTransport for HttpRelayTransport {
    async fn call(&self, method: RelayMethod, params: Value) -> Result<Value, RelayError> {
        let url = self.endpoint(method)?;
        let payload = json!({
            "jsonrpc": JSONRPC_VERSION,
            "id": 1,
            "method": method.as_str(),
            "params": params,
        });

        let mut request = self
            .client
            .post(url.clone())
            .timeout(self.request_timeout)
            .json(&payload);
        if let Some(uuid) = &self.uuid {
            if let Ok(value) = HeaderValue::from_str(uuid) {
                request = request.header(HeaderName::from_static("x-jito-auth"), value);
            }
        }

        debug!(target: "relay::jito", method = method.as_str(), endpoint = %url, "sending relay request");
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            warn!(
                target: "relay::jito",
                method = method.as_str(),
                status = %status,
                "relay returned non-success status"
            );
        }
        parse_rpc_response(method, url.path(), status, &body)
    }
}

/// Maps one HTTP reply to the JSON-RPC `result` member.
pub(crate) fn parse_rpc_response(
    method: RelayMethod,
    endpoint: &str,
    status: StatusCode,
    body: &[u8],
) -> Result<Value, RelayError> {
    if !status.is_success() {
        return Err(RelayError::Status {
            endpoint: endpoint.to_string(),
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        });
    }

    let envelope: JsonRpcResponse = serde_json::from_slice(body)?;
    if let Some(error) = envelope.error {
        return Err(RelayError::Rpc {
            method: method.as_str(),
            code: error.code,
            message: error.message,
        });
    }
    match envelope.result {
        Some(Value::Null) | None => Err(RelayError::schema(format!(
            "{} response has no result",
            method.as_str()
        ))),
        Some(result) => Ok(result),
    }
}
