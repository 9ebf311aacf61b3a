use std::fmt;

use reqwest::Error as ReqwestError;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("网络请求失败: {0}")]
    Network(#[from] ReqwestError),
    #[error("中继 {endpoint} 返回状态 {status}: {body}")]
    Status {
        endpoint: String,
        status: StatusCode,
        body: String,
    },
    #[error("中继 {method} 返回错误 {code}: {message}")]
    Rpc {
        method: &'static str,
        code: i64,
        message: String,
    },
    #[error("JSON 解析失败: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("中继响应结构异常: {0}")]
    Schema(String),
    #[error("中继地址无效: {0}")]
    Endpoint(String),
    #[error("bundle 提交前被拒绝: {0}")]
    InvalidBundle(String),
}

impl RelayError {
    pub fn schema(reason: impl fmt::Display) -> Self {
        Self::Schema(reason.to_string())
    }
}
