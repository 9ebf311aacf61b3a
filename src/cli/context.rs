use std::path::Path;
use std::time::Duration;

use anyhow::{Result, anyhow};
use time::{UtcOffset, macros::format_description};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::{EnvFilter, fmt};

use crate::api::{MetadataClient, TokenMetadata, TradeClient};
use crate::cli::args::LaunchArgs;
use crate::config::{AppConfig, KeyFile, LoggingConfig, LoggingProfile};
use crate::launch::{LaunchSettings, Orchestrator};
use crate::relay::{BundleRelayClient, HttpRelayTransport};

pub type LiveOrchestrator = Orchestrator<MetadataClient, TradeClient, HttpRelayTransport>;

/// Lean 模式下压低的第三方 target。
const QUIET_TARGETS: &[(&str, &str)] = &[
    ("hyper", "warn"),
    ("hyper_util::client::legacy", "warn"),
    ("reqwest", "info"),
    ("rustls", "warn"),
];

/// Verbose 模式下打开 debug 的发射流程 target。
const VERBOSE_TARGETS: &[&str] = &["launch", "relay::jito", "api::pumpportal", "api::ipfs"];

/// 初始化 tracing，按配置输出 JSON 或紧凑文本。
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let time_format =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]");
    let timer = OffsetTime::new(log_offset(config.timezone_offset_hours)?, time_format);
    let builder = fmt()
        .with_timer(timer)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_env_filter(log_filter(config));

    let installed = if config.json {
        builder
            .json()
            .with_current_span(false)
            .with_span_list(false)
            .try_init()
    } else {
        builder.compact().try_init()
    };
    installed.map_err(|err| anyhow!("tracing 初始化失败: {err}"))
}

/// 由日志级别与 profile 组装过滤器；用户在 `level` 中显式写出的 target 不会被覆盖。
fn log_filter(config: &LoggingConfig) -> EnvFilter {
    let base = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let extra: Vec<String> = match config.profile {
        LoggingProfile::Lean => QUIET_TARGETS
            .iter()
            .filter(|(target, _)| !config.level.contains(target))
            .map(|(target, level)| format!("{target}={level}"))
            .collect(),
        LoggingProfile::Verbose => VERBOSE_TARGETS
            .iter()
            .map(|target| format!("{target}=debug"))
            .collect(),
    };
    extra
        .iter()
        .filter_map(|directive| directive.parse::<Directive>().ok())
        .fold(base, EnvFilter::add_directive)
}

fn log_offset(hours: i8) -> Result<UtcOffset> {
    UtcOffset::from_hms(hours, 0, 0).map_err(|err| anyhow!("日志时区偏移无效 {hours}: {err}"))
}

pub fn build_http_client(config: &AppConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("kepler/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_millis(config.endpoints.request_timeout_ms))
        .build()
        .map_err(|err| anyhow!("构建 HTTP 客户端失败: {err}"))
}

pub fn build_relay(
    config: &AppConfig,
    client: reqwest::Client,
) -> Result<BundleRelayClient<HttpRelayTransport>> {
    let endpoints = &config.endpoints;
    let transport = HttpRelayTransport::new(
        client,
        endpoints.relay_url.clone(),
        endpoints.relay_uuid.clone(),
        Duration::from_millis(endpoints.request_timeout_ms),
    )?;
    Ok(BundleRelayClient::new(
        transport,
        Duration::from_millis(config.relay.poll_interval_ms),
    ))
}

pub fn build_orchestrator(config: &AppConfig, keys: KeyFile) -> Result<LiveOrchestrator> {
    let client = build_http_client(config)?;
    let timeout = Duration::from_millis(config.endpoints.request_timeout_ms);
    let metadata = MetadataClient::new(client.clone(), config.endpoints.metadata_url.clone(), timeout);
    let quotes = TradeClient::new(client.clone(), config.endpoints.trade_url.clone(), timeout);
    let relay = build_relay(config, client)?;
    Ok(Orchestrator::new(
        LaunchSettings::from_config(config),
        keys,
        metadata,
        quotes,
        relay,
    ))
}

/// 命令行给出的代币字段优先于密钥文件；空白值视为未设置。
pub fn resolve_token(config: &AppConfig, keys: &KeyFile, args: &LaunchArgs) -> TokenMetadata {
    TokenMetadata {
        name: pick(&args.name, &keys.name),
        symbol: pick(&args.ticker, &keys.ticker),
        description: pick(&args.description, &keys.description),
        twitter: pick(&args.twitter, &keys.x),
        telegram: pick(&args.telegram, &keys.tg),
        website: pick(&args.website, &keys.web),
        show_name: config.token.show_name,
        image: args
            .image
            .clone()
            .unwrap_or_else(|| config.token.image.clone()),
    }
}

pub fn key_file_path<'a>(config: &'a AppConfig, args: &'a LaunchArgs) -> &'a Path {
    args.keys.as_deref().unwrap_or(&config.keys.path)
}

fn pick(preferred: &Option<String>, fallback: &Option<String>) -> String {
    [preferred, fallback]
        .into_iter()
        .flatten()
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .unwrap_or_default()
        .to_string()
}
