use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub keys: KeysConfig,
    #[serde(default)]
    pub token: TokenConfig,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub launch: LaunchConfig,
    #[serde(default)]
    pub relay: RelayConfig,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoggingProfile {
    #[default]
    Lean,
    Verbose,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "super::default_logging_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
    #[serde(default)]
    pub profile: LoggingProfile,
    #[serde(default = "super::default_timezone_offset_hours")]
    pub timezone_offset_hours: i8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeysConfig {
    /// 保存 `dev`、`buyers`、`mintKeypairs` 与 `solValues` 的 JSON 密钥文件。
    #[serde(default = "super::default_key_file")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    #[serde(default = "super::default_image_path")]
    pub image: PathBuf,
    #[serde(default = "super::default_true")]
    pub show_name: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "super::default_trade_url")]
    pub trade_url: String,
    #[serde(default = "super::default_metadata_url")]
    pub metadata_url: String,
    #[serde(default = "super::default_relay_url")]
    pub relay_url: String,
    #[serde(default)]
    pub relay_uuid: Option<String>,
    #[serde(default = "super::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LaunchConfig {
    #[serde(default = "super::default_dev_buy_sol")]
    pub dev_buy_sol: Decimal,
    /// `solValues` 条目缺失或不可用时使用的买入金额。
    #[serde(default = "super::default_buy_sol")]
    pub default_buy_sol: Decimal,
    #[serde(default = "super::default_slippage_percent")]
    pub slippage_percent: u32,
    #[serde(default = "super::default_create_priority_fee_sol")]
    pub create_priority_fee_sol: Decimal,
    #[serde(default = "super::default_buy_priority_fee_sol")]
    pub buy_priority_fee_sol: Decimal,
    #[serde(default = "super::default_pool")]
    pub pool: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "super::default_inflight_timeout_ms")]
    pub inflight_timeout_ms: u64,
    #[serde(default = "super::default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// 发射器 JSON 布局的钱包与代币文件。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyFile {
    #[serde(default)]
    pub dev: Option<String>,
    #[serde(default)]
    pub buyers: Vec<String>,
    #[serde(default)]
    pub mint_keypairs: Vec<MintKeypairEntry>,
    #[serde(default)]
    pub sol_values: Vec<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub x: Option<String>,
    #[serde(default)]
    pub tg: Option<String>,
    #[serde(default)]
    pub web: Option<String>,
}

/// Mint 私钥：JSON 字节数组，或序列化成字符串的同一数组。
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MintKeypairEntry {
    Bytes(Vec<u8>),
    Encoded(String),
}
