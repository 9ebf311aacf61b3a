use metrics::counter;
use solana_sdk::signature::Signer;
use tracing::{debug, error, info, warn};

use crate::api::{MetadataStore, TokenMetadata, TradeQuoteSource};
use crate::bundle::{
    SignedTransactionPayload, SignerAssignment, UnsignedTransactionPayload,
    expected_transaction_count, sign_payload,
};
use crate::config::{ConfigError, KeyFile, KeyMaterial};
use crate::relay::{BundleId, BundleRelayClient, InflightStatus, RelayTransport};

use super::{DeploymentResult, LaunchError, LaunchSettings, build_trade_requests};

/// 执行一次代币发射：上传元数据、获取交易、签名、提交并确认。
///
/// 每次发射只尝试一次，任何失败都会记录日志并转为未部署结果；
/// 重复提交买入 bundle 可能导致资金被扣两次。
pub struct Orchestrator<M, Q, T> {
    settings: LaunchSettings,
    keys: KeyFile,
    metadata: M,
    quotes: Q,
    relay: BundleRelayClient<T>,
}

impl<M, Q, T> Orchestrator<M, Q, T>
where
    M: MetadataStore,
    Q: TradeQuoteSource,
    T: RelayTransport,
{
    pub fn new(
        settings: LaunchSettings,
        keys: KeyFile,
        metadata: M,
        quotes: Q,
        relay: BundleRelayClient<T>,
    ) -> Self {
        Self {
            settings,
            keys,
            metadata,
            quotes,
            relay,
        }
    }

    pub async fn launch(&self, token: &TokenMetadata) -> DeploymentResult {
        match self.try_launch(token).await {
            Ok(result) => {
                counter!("kepler_launch_total", "outcome" => "deployed").increment(1);
                result
            }
            Err(err) => {
                counter!("kepler_launch_total", "outcome" => err.stage()).increment(1);
                error!(
                    target: "launch",
                    stage = err.stage(),
                    error = %err.detail(),
                    "发射中止"
                );
                DeploymentResult::not_deployed()
            }
        }
    }

    async fn try_launch(&self, token: &TokenMetadata) -> Result<DeploymentResult, LaunchError> {
        let keys = KeyMaterial::from_key_file(&self.keys)?;
        validate_token(token)?;
        let mint = keys.mint_address();
        info!(
            target: "launch",
            mint = %mint,
            dev = %keys.dev.pubkey(),
            buyers = keys.buyers.len(),
            name = %token.name,
            symbol = %token.symbol,
            "开始发射"
        );

        let upload = self
            .metadata
            .upload(token)
            .await
            .map_err(LaunchError::Upload)?;

        let trades = build_trade_requests(&self.settings, &keys, token, &upload.metadata_uri);
        let blobs = self
            .quotes
            .unsigned_transactions(&trades)
            .await
            .map_err(LaunchError::Quote)?;

        let expected = expected_transaction_count(keys.buyers.len());
        if blobs.len() != expected {
            return Err(LaunchError::ProtocolMismatch {
                expected,
                actual: blobs.len(),
            });
        }

        let signed = sign_bundle(&keys, UnsignedTransactionPayload::from_blobs(blobs))?;

        let bundle_id = self.relay.submit(&signed).await?;
        info!(
            target: "launch",
            bundle_id = %bundle_id,
            timeout_ms = self.settings.inflight_timeout.as_millis() as u64,
            "等待 inflight 确认"
        );

        match self
            .relay
            .await_inflight(&bundle_id, self.settings.inflight_timeout)
            .await
        {
            InflightStatus::Confirmed { slot } => {
                info!(
                    target: "launch",
                    bundle_id = %bundle_id,
                    slot = ?slot,
                    explorer = %bundle_id.explorer_url(),
                    "bundle 已落地"
                );
                self.report_final_status(&bundle_id).await;
                Ok(DeploymentResult::deployed(&mint, &bundle_id, slot))
            }
            InflightStatus::Failed { reason } => {
                Err(LaunchError::BundleFailed { bundle_id, reason })
            }
            InflightStatus::TimedOut { waited } => Err(LaunchError::Timeout {
                bundle_id,
                waited_ms: waited.as_millis() as u64,
            }),
        }
    }

    async fn report_final_status(&self, bundle_id: &BundleId) {
        match self.relay.fetch_final(bundle_id).await {
            Ok(Some(status)) => info!(
                target: "launch",
                bundle_id = %bundle_id,
                confirmation = status.confirmation_status.as_deref().unwrap_or("unknown"),
                slot = ?status.slot,
                transactions = ?status.transactions,
                "bundle 最终状态"
            ),
            Ok(None) => warn!(
                target: "launch",
                bundle_id = %bundle_id,
                "bundle 最终状态查询无记录"
            ),
            Err(err) => warn!(
                target: "launch",
                bundle_id = %bundle_id,
                error = %err,
                "bundle 最终状态查询失败"
            ),
        }
    }
}

fn validate_token(token: &TokenMetadata) -> Result<(), ConfigError> {
    if token.name.trim().is_empty() {
        return Err(ConfigError::Missing("name"));
    }
    if token.symbol.trim().is_empty() {
        return Err(ConfigError::Missing("ticker"));
    }
    Ok(())
}

/// 按下标顺序签名，买家游标依赖这一顺序。
fn sign_bundle(
    keys: &KeyMaterial,
    payloads: Vec<UnsignedTransactionPayload>,
) -> Result<Vec<SignedTransactionPayload>, LaunchError> {
    let mut assignment = SignerAssignment::new(&keys.mint, &keys.dev, &keys.buyers);
    let mut signed = Vec::with_capacity(payloads.len());
    for payload in &payloads {
        let signers = assignment.signers_for(payload.index);
        signed.push(sign_payload(payload, &signers)?);
    }
    debug!(
        target: "launch",
        transactions = signed.len(),
        unassigned_buyers = assignment.remaining_buyers(),
        "bundle 签名完成"
    );
    Ok(signed)
}
