use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub(crate) const JSONRPC_VERSION: &str = "2.0";

/// 本工具调用的三个 block engine RPC。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayMethod {
    SendBundle,
    GetInflightBundleStatuses,
    GetBundleStatuses,
}

impl RelayMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayMethod::SendBundle => "sendBundle",
            RelayMethod::GetInflightBundleStatuses => "getInflightBundleStatuses",
            RelayMethod::GetBundleStatuses => "getBundleStatuses",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            RelayMethod::SendBundle => "/bundles",
            RelayMethod::GetInflightBundleStatuses => "/getInflightBundleStatuses",
            RelayMethod::GetBundleStatuses => "/getBundleStatuses",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BundleId(String);

impl BundleId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn explorer_url(&self) -> String {
        format!("https://explorer.jito.wtf/bundle/{}", self.0)
    }
}

impl fmt::Display for BundleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct JsonRpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JsonRpcErrorBody {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum InflightState {
    Invalid,
    Pending,
    Failed,
    Landed,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct InflightBundleEntry {
    #[serde(default)]
    pub bundle_id: Option<String>,
    pub status: InflightState,
    #[serde(default)]
    pub landed_slot: Option<u64>,
    #[serde(default)]
    pub err: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct InflightBundleStatuses {
    #[serde(default)]
    pub value: Vec<Option<InflightBundleEntry>>,
}

/// inflight 轮询的终态结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InflightStatus {
    Confirmed { slot: Option<u64> },
    Failed { reason: String },
    TimedOut { waited: Duration },
}

impl InflightStatus {
    pub fn label(&self) -> &'static str {
        match self {
            InflightStatus::Confirmed { .. } => "confirmed",
            InflightStatus::Failed { .. } => "failed",
            InflightStatus::TimedOut { .. } => "timeout",
        }
    }
}

/// `getBundleStatuses` 返回的单个 bundle 详情。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FinalStatus {
    pub bundle_id: String,
    #[serde(default)]
    pub transactions: Vec<String>,
    #[serde(default)]
    pub slot: Option<u64>,
    #[serde(default)]
    pub confirmation_status: Option<String>,
    #[serde(default)]
    pub err: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BundleStatuses {
    #[serde(default)]
    pub value: Vec<Option<FinalStatus>>,
}
