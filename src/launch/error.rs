use thiserror::Error;

use crate::api::ApiError;
use crate::bundle::SignError;
use crate::config::ConfigError;
use crate::relay::{BundleId, RelayError};

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("配置无效: {0}")]
    Config(#[from] ConfigError),
    #[error("元数据上传失败: {0}")]
    Upload(#[source] ApiError),
    #[error("交易 API 请求失败: {0}")]
    Quote(#[source] ApiError),
    #[error("交易 API 返回 {actual} 笔交易，预期 {expected} 笔")]
    ProtocolMismatch { expected: usize, actual: usize },
    #[error(transparent)]
    Sign(#[from] SignError),
    #[error("bundle 提交失败: {0}")]
    Submission(#[from] RelayError),
    #[error("bundle {bundle_id} 失败: {reason}")]
    BundleFailed { bundle_id: BundleId, reason: String },
    #[error("bundle {bundle_id} 在 {waited_ms}ms 内未确认")]
    Timeout { bundle_id: BundleId, waited_ms: u64 },
}

impl LaunchError {
    /// 失败步骤的短标签，用于日志与指标。
    pub fn stage(&self) -> &'static str {
        match self {
            LaunchError::Config(_) => "config",
            LaunchError::Upload(_) => "upload",
            LaunchError::Quote(_) => "quote",
            LaunchError::ProtocolMismatch { .. } => "protocol",
            LaunchError::Sign(err) if err.is_decode() => "decode",
            LaunchError::Sign(_) => "sign",
            LaunchError::Submission(_) => "submit",
            LaunchError::BundleFailed { .. } => "bundle_failed",
            LaunchError::Timeout { .. } => "timeout",
        }
    }

    /// 展示文本；HTTP 失败附带完整原因链。
    pub fn detail(&self) -> String {
        match self {
            LaunchError::Upload(err) => format!("元数据上传失败: {}", err.describe()),
            LaunchError::Quote(err) => format!("交易 API 请求失败: {}", err.describe()),
            other => other.to_string(),
        }
    }
}
