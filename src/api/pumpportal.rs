use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use super::{ApiError, TradeQuoteSource, status_error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Create,
    Buy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeTokenMetadata {
    pub name: String,
    pub symbol: String,
    pub uri: String,
}

/// `trade-local` bundle 请求中的一项。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRequest {
    pub public_key: String,
    pub action: TradeAction,
    pub mint: String,
    pub denominated_in_sol: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub slippage: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub priority_fee: Decimal,
    pub pool: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_metadata: Option<TradeTokenMetadata>,
}

#[derive(Clone)]
pub struct TradeClient {
    endpoint: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl fmt::Debug for TradeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TradeClient")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl TradeClient {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            client,
            timeout,
        }
    }
}

#[async_trait]
impl TradeQuoteSource for TradeClient {
    async fn unsigned_transactions(
        &self,
        trades: &[TradeRequest],
    ) -> Result<Vec<String>, ApiError> {
        let started = Instant::now();
        debug!(
            target: "api::pumpportal",
            endpoint = %self.endpoint,
            trades = trades.len(),
            "请求未签名 bundle 交易"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(trades)
            .send()
            .await?;

        if !response.status().is_success() {
            let err = status_error(&self.endpoint, response).await;
            warn!(target: "api::pumpportal", error = %err, "交易请求被拒绝");
            return Err(err);
        }

        let bytes = response.bytes().await?;
        let transactions = parse_transactions(&bytes)?;
        debug!(
            target: "api::pumpportal",
            transactions = transactions.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "收到未签名交易"
        );
        Ok(transactions)
    }
}

fn parse_transactions(bytes: &[u8]) -> Result<Vec<String>, ApiError> {
    let transactions: Vec<String> = serde_json::from_slice(bytes)?;
    if transactions.is_empty() {
        return Err(ApiError::Schema("no transactions returned".to_string()));
    }
    if let Some(idx) = transactions.iter().position(|tx| tx.trim().is_empty()) {
        return Err(ApiError::Schema(format!("交易 #{idx} 为空")));
    }
    Ok(transactions)
}
