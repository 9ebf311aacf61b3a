use std::path::PathBuf;

use rust_decimal::Decimal;

pub mod keys;
pub mod loader;
pub mod types;

pub use keys::KeyMaterial;
pub use loader::*;
pub use types::*;

use self::types as cfg;

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_logging_level() -> String {
    "info".to_string()
}

pub(crate) fn default_timezone_offset_hours() -> i8 {
    0
}

pub(crate) fn default_key_file() -> PathBuf {
    PathBuf::from("config.json")
}

pub(crate) fn default_image_path() -> PathBuf {
    PathBuf::from("image.png")
}

pub(crate) fn default_trade_url() -> String {
    "https://pumpportal.fun/api/trade-local".to_string()
}

pub(crate) fn default_metadata_url() -> String {
    "https://pump.fun/api/ipfs".to_string()
}

pub(crate) fn default_relay_url() -> String {
    "https://amsterdam.mainnet.block-engine.jito.wtf/api/v1".to_string()
}

pub(crate) fn default_request_timeout_ms() -> u64 {
    15_000
}

pub(crate) fn default_dev_buy_sol() -> Decimal {
    Decimal::new(1, 1)
}

pub(crate) fn default_buy_sol() -> Decimal {
    Decimal::new(5, 1)
}

pub(crate) fn default_slippage_percent() -> u32 {
    50
}

pub(crate) fn default_create_priority_fee_sol() -> Decimal {
    Decimal::new(1, 2)
}

pub(crate) fn default_buy_priority_fee_sol() -> Decimal {
    Decimal::new(3, 3)
}

pub(crate) fn default_pool() -> String {
    "pump".to_string()
}

pub(crate) fn default_inflight_timeout_ms() -> u64 {
    120_000
}

pub(crate) fn default_poll_interval_ms() -> u64 {
    1_000
}

impl Default for cfg::LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_logging_level(),
            json: false,
            profile: cfg::LoggingProfile::default(),
            timezone_offset_hours: default_timezone_offset_hours(),
        }
    }
}

impl Default for cfg::KeysConfig {
    fn default() -> Self {
        Self {
            path: default_key_file(),
        }
    }
}

impl Default for cfg::TokenConfig {
    fn default() -> Self {
        Self {
            image: default_image_path(),
            show_name: default_true(),
        }
    }
}

impl Default for cfg::EndpointsConfig {
    fn default() -> Self {
        Self {
            trade_url: default_trade_url(),
            metadata_url: default_metadata_url(),
            relay_url: default_relay_url(),
            relay_uuid: None,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for cfg::LaunchConfig {
    fn default() -> Self {
        Self {
            dev_buy_sol: default_dev_buy_sol(),
            default_buy_sol: default_buy_sol(),
            slippage_percent: default_slippage_percent(),
            create_priority_fee_sol: default_create_priority_fee_sol(),
            buy_priority_fee_sol: default_buy_priority_fee_sol(),
            pool: default_pool(),
        }
    }
}

impl Default for cfg::RelayConfig {
    fn default() -> Self {
        Self {
            inflight_timeout_ms: default_inflight_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}
