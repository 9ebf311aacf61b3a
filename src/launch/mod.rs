//! 创建代币并以 bundle 批量买入的流程。

mod error;
mod orchestrator;
mod request;
mod result;

use std::time::Duration;

use rust_decimal::Decimal;

use crate::config::AppConfig;

pub use error::LaunchError;
pub use orchestrator::Orchestrator;
pub use request::build_trade_requests;
pub use result::DeploymentResult;

/// 单次发射的交易参数与确认时限。
#[derive(Debug, Clone)]
pub struct LaunchSettings {
    pub dev_buy_sol: Decimal,
    pub default_buy_sol: Decimal,
    pub slippage_percent: u32,
    pub create_priority_fee_sol: Decimal,
    pub buy_priority_fee_sol: Decimal,
    pub pool: String,
    pub inflight_timeout: Duration,
}

impl LaunchSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        let launch = &config.launch;
        Self {
            dev_buy_sol: launch.dev_buy_sol,
            default_buy_sol: launch.default_buy_sol,
            slippage_percent: launch.slippage_percent,
            create_priority_fee_sol: launch.create_priority_fee_sol,
            buy_priority_fee_sol: launch.buy_priority_fee_sol,
            pool: launch.pool.clone(),
            inflight_timeout: Duration::from_millis(config.relay.inflight_timeout_ms),
        }
    }
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}
