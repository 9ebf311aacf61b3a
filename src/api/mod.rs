//! 发射流程依赖的 HTTP 服务：pump.fun 元数据存储，以及构建未签名交易的
//! PumpPortal local-trade 接口。

pub mod ipfs;
pub mod pumpportal;

use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

pub use ipfs::{MetadataClient, MetadataUpload, TokenMetadata};
pub use pumpportal::{TradeAction, TradeClient, TradeRequest, TradeTokenMetadata};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("网络请求失败: {0}")]
    Http(#[from] reqwest::Error),
    #[error("请求 {endpoint} 返回状态 {status}: {body}")]
    Status {
        endpoint: String,
        status: StatusCode,
        body: String,
    },
    #[error("读取文件失败 {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("JSON 解析失败: {0}")]
    Json(#[from] serde_json::Error),
    #[error("响应结构异常: {0}")]
    Schema(String),
}

impl ApiError {
    pub fn describe(&self) -> String {
        use std::error::Error as _;
        let mut parts = vec![self.to_string()];
        let mut current = self.source();
        while let Some(err) = current {
            let text = err.to_string();
            if parts.last() != Some(&text) {
                parts.push(text);
            }
            current = err.source();
        }
        parts.join(" | caused by: ")
    }
}

/// 上传代币图片与元数据，返回内容寻址 URI。
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn upload(&self, metadata: &TokenMetadata) -> Result<MetadataUpload, ApiError>;
}

/// 根据交易描述列表生成 base58 未签名交易。
#[async_trait]
pub trait TradeQuoteSource: Send + Sync {
    async fn unsigned_transactions(
        &self,
        trades: &[TradeRequest],
    ) -> Result<Vec<String>, ApiError>;
}

async fn status_error(endpoint: &str, response: reqwest::Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    ApiError::Status {
        endpoint: endpoint.to_string(),
        status,
        body,
    }
}
