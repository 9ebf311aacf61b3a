use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;
use solana_sdk::signature::Signer;
use tracing::warn;

use crate::api::{TokenMetadata, TradeAction, TradeRequest, TradeTokenMetadata};
use crate::config::KeyMaterial;

use super::LaunchSettings;

/// 开发者钱包的 create 交易，随后按买家顺序每人一笔 buy。
pub fn build_trade_requests(
    settings: &LaunchSettings,
    keys: &KeyMaterial,
    token: &TokenMetadata,
    metadata_uri: &str,
) -> Vec<TradeRequest> {
    let mint = keys.mint_address().to_string();
    let amounts = resolve_buy_amounts(
        &keys.buy_amounts,
        keys.buyers.len(),
        settings.default_buy_sol,
    );

    let mut trades = Vec::with_capacity(keys.buyers.len() + 1);
    trades.push(TradeRequest {
        public_key: keys.dev.pubkey().to_string(),
        action: TradeAction::Create,
        mint: mint.clone(),
        denominated_in_sol: "true".to_string(),
        amount: settings.dev_buy_sol,
        slippage: settings.slippage_percent,
        priority_fee: settings.create_priority_fee_sol,
        pool: settings.pool.clone(),
        token_metadata: Some(TradeTokenMetadata {
            name: token.name.clone(),
            symbol: token.symbol.clone(),
            uri: metadata_uri.to_string(),
        }),
    });

    for (buyer, amount) in keys.buyers.iter().zip(amounts) {
        trades.push(TradeRequest {
            public_key: buyer.pubkey().to_string(),
            action: TradeAction::Buy,
            mint: mint.clone(),
            denominated_in_sol: "true".to_string(),
            amount,
            slippage: settings.slippage_percent,
            priority_fee: settings.buy_priority_fee_sol,
            pool: settings.pool.clone(),
            token_metadata: None,
        });
    }

    trades
}

/// 每个买家一个金额。缺失、无法解析或非正数的条目回退到 `default` 并告警。
pub fn resolve_buy_amounts(raw: &[Value], buyers: usize, default: Decimal) -> Vec<Decimal> {
    (0..buyers)
        .map(|idx| match raw.get(idx) {
            Some(value) => match parse_amount(value) {
                Some(amount) => amount,
                None => {
                    warn!(
                        target: "launch",
                        buyer = idx,
                        value = %value,
                        fallback = %default,
                        "买入金额不是正数，使用默认值"
                    );
                    default
                }
            },
            None => {
                warn!(
                    target: "launch",
                    buyer = idx,
                    fallback = %default,
                    "未配置买入金额，使用默认值"
                );
                default
            }
        })
        .collect()
}

fn parse_amount(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
        .filter(|amount| amount.is_sign_positive() && !amount.is_zero())
}
