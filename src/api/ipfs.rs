use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{ApiError, MetadataStore, status_error};

/// 构建 create 交易前上传的代币展示信息。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub twitter: String,
    pub telegram: String,
    pub website: String,
    pub show_name: bool,
    pub image: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataUpload {
    pub metadata_uri: String,
    #[serde(default)]
    pub metadata: Value,
}

#[derive(Clone)]
pub struct MetadataClient {
    endpoint: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl fmt::Debug for MetadataClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataClient")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl MetadataClient {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            client,
            timeout,
        }
    }

    fn form(metadata: &TokenMetadata, image: Vec<u8>) -> Result<Form, ApiError> {
        let file_name = metadata
            .image
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image.png".to_string());
        let part = Part::bytes(image)
            .file_name(file_name)
            .mime_str("image/png")?;

        Ok(Form::new()
            .part("file", part)
            .text("name", metadata.name.clone())
            .text("symbol", metadata.symbol.clone())
            .text("description", metadata.description.clone())
            .text("twitter", metadata.twitter.clone())
            .text("telegram", metadata.telegram.clone())
            .text("website", metadata.website.clone())
            .text("showName", metadata.show_name.to_string()))
    }
}

#[async_trait]
impl MetadataStore for MetadataClient {
    async fn upload(&self, metadata: &TokenMetadata) -> Result<MetadataUpload, ApiError> {
        let image = tokio::fs::read(&metadata.image)
            .await
            .map_err(|source| ApiError::Io {
                path: metadata.image.clone(),
                source,
            })?;
        debug!(
            target: "api::ipfs",
            image = %metadata.image.display(),
            bytes = image.len(),
            name = %metadata.name,
            symbol = %metadata.symbol,
            "上传代币元数据"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .multipart(Self::form(metadata, image)?)
            .send()
            .await?;

        if !response.status().is_success() {
            let err = status_error(&self.endpoint, response).await;
            warn!(target: "api::ipfs", error = %err, "元数据上传被拒绝");
            return Err(err);
        }

        let bytes = response.bytes().await?;
        let upload = parse_upload(&bytes)?;
        info!(target: "api::ipfs", uri = %upload.metadata_uri, "元数据上传完成");
        debug!(target: "api::ipfs", metadata = %upload.metadata, "已存储的元数据文档");
        Ok(upload)
    }
}

fn parse_upload(bytes: &[u8]) -> Result<MetadataUpload, ApiError> {
    let upload: MetadataUpload = serde_json::from_slice(bytes)?;
    if upload.metadata_uri.trim().is_empty() {
        return Err(ApiError::Schema("metadataUri is empty".to_string()));
    }
    Ok(upload)
}
