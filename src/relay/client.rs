use std::time::Duration;

use metrics::counter;
use serde_json::{Value, json};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::bundle::{MAX_BUNDLE_TRANSACTIONS, SignedTransactionPayload};

use super::error::RelayError;
use super::transport::RelayTransport;
use super::types::{
    BundleId, BundleStatuses, FinalStatus, InflightBundleStatuses, InflightState, InflightStatus,
    RelayMethod,
};

#[derive(Debug, Clone, Copy)]
pub struct Deadline(Instant);

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Self(Instant::now() + timeout)
    }

    pub fn expired(&self) -> bool {
        Instant::now() >= self.0
    }

    pub fn remaining(&self) -> Duration {
        self.0.saturating_duration_since(Instant::now())
    }
}

/// 两次 inflight 轮询之间的最小间隔。
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// 提交 bundle 并跟踪到中继报告终态为止。
pub struct BundleRelayClient<T> {
    transport: T,
    poll_interval: Duration,
}

impl<T: RelayTransport> BundleRelayClient<T> {
    pub fn new(transport: T, poll_interval: Duration) -> Self {
        if poll_interval < MIN_POLL_INTERVAL {
            warn!(
                target: "relay::jito",
                requested_ms = poll_interval.as_millis() as u64,
                min_ms = MIN_POLL_INTERVAL.as_millis() as u64,
                "轮询间隔低于下限，已调整"
            );
        }
        Self {
            transport,
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
        }
    }

    pub async fn submit(
        &self,
        bundle: &[SignedTransactionPayload],
    ) -> Result<BundleId, RelayError> {
        if bundle.is_empty() {
            return Err(RelayError::InvalidBundle("bundle 为空".to_string()));
        }
        if bundle.len() > MAX_BUNDLE_TRANSACTIONS {
            return Err(RelayError::InvalidBundle(format!(
                "bundle 含 {} 笔交易，中继最多接受 {MAX_BUNDLE_TRANSACTIONS} 笔",
                bundle.len()
            )));
        }

        let transactions: Vec<Value> = bundle
            .iter()
            .map(|payload| Value::String(payload.encoded.clone()))
            .collect();
        let result = self
            .call(RelayMethod::SendBundle, json!([transactions]))
            .await?;

        let bundle_id = result
            .as_str()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| RelayError::schema(format!("sendBundle returned no bundle id: {result}")))?;

        info!(
            target: "relay::jito",
            bundle_id,
            transactions = bundle.len(),
            "bundle 已提交"
        );
        Ok(BundleId::new(bundle_id))
    }

    /// 轮询 inflight 状态，直到 bundle 落地、失败或超过 `timeout`。
    ///
    /// 轮询出错只记录日志并继续；超时返回 [`InflightStatus::TimedOut`]。
    /// 丢弃 future 即停止轮询。
    pub async fn await_inflight(&self, id: &BundleId, timeout: Duration) -> InflightStatus {
        let started = Instant::now();
        let deadline = Deadline::after(timeout);
        let mut polls: u32 = 0;

        loop {
            polls += 1;
            match tokio::time::timeout(deadline.remaining(), self.poll_inflight(id)).await {
                Ok(Ok(Some(status))) => {
                    counter!(
                        "kepler_relay_inflight_outcomes_total",
                        "outcome" => status.label()
                    )
                    .increment(1);
                    debug!(target: "relay::jito", bundle_id = %id, polls, ?status, "inflight 轮询结束");
                    return status;
                }
                Ok(Ok(None)) => {}
                Ok(Err(err)) => {
                    warn!(target: "relay::jito", bundle_id = %id, polls, error = %err, "inflight 轮询失败");
                }
                Err(_) => break,
            }

            if deadline.expired() {
                break;
            }
            tokio::time::sleep(self.poll_interval.min(deadline.remaining())).await;
            if deadline.expired() {
                break;
            }
        }

        counter!("kepler_relay_inflight_outcomes_total", "outcome" => "timeout").increment(1);
        InflightStatus::TimedOut {
            waited: started.elapsed(),
        }
    }

    /// 单次 `getBundleStatuses` 查询；中继无记录时返回 `None`。
    pub async fn fetch_final(&self, id: &BundleId) -> Result<Option<FinalStatus>, RelayError> {
        let result = self
            .call(RelayMethod::GetBundleStatuses, json!([[id.as_str()]]))
            .await?;
        let statuses: BundleStatuses = serde_json::from_value(result)?;
        Ok(statuses.value.into_iter().flatten().next())
    }

    async fn poll_inflight(&self, id: &BundleId) -> Result<Option<InflightStatus>, RelayError> {
        let result = self
            .call(
                RelayMethod::GetInflightBundleStatuses,
                json!([[id.as_str()]]),
            )
            .await?;
        let statuses: InflightBundleStatuses = serde_json::from_value(result)?;
        let entry = statuses.value.into_iter().flatten().find(|entry| {
            entry
                .bundle_id
                .as_deref()
                .is_none_or(|bundle_id| bundle_id == id.as_str())
        });

        let Some(entry) = entry else {
            return Ok(None);
        };
        Ok(match entry.status {
            InflightState::Invalid | InflightState::Pending => None,
            InflightState::Landed => Some(InflightStatus::Confirmed {
                slot: entry.landed_slot,
            }),
            InflightState::Failed => Some(InflightStatus::Failed {
                reason: entry
                    .err
                    .map(|err| err.to_string())
                    .unwrap_or_else(|| "relay reported bundle failure".to_string()),
            }),
        })
    }

    async fn call(&self, method: RelayMethod, params: Value) -> Result<Value, RelayError> {
        let result = self.transport.call(method, params).await;
        let outcome = if result.is_ok() { "ok" } else { "error" };
        counter!(
            "kepler_relay_requests_total",
            "method" => method.as_str(),
            "outcome" => outcome
        )
        .increment(1);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedTransport, inflight, landed};

    fn payloads(count: usize) -> Vec<SignedTransactionPayload> {
        (0..count)
            .map(|index| SignedTransactionPayload {
                index,
                encoded: format!("tx{index}"),
            })
            .collect()
    }

    #[tokio::test(flavor = "current_thread")]
    async fn submit_sends_one_bundle_of_all_transactions() {
        let transport = ScriptedTransport::new(vec![Ok(json!("bundle-1"))]);
        let client = BundleRelayClient::new(transport.clone(), Duration::from_millis(5));

        let id = client.submit(&payloads(3)).await.expect("submit");
        assert_eq!(id.as_str(), "bundle-1");

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, RelayMethod::SendBundle);
        assert_eq!(calls[0].1, json!([["tx0", "tx1", "tx2"]]));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn submit_rejects_missing_bundle_id() {
        let transport = ScriptedTransport::new(vec![Ok(Value::Null), Ok(json!("  "))]);
        let client = BundleRelayClient::new(transport, Duration::from_millis(5));

        assert!(matches!(
            client.submit(&payloads(1)).await,
            Err(RelayError::Schema(_))
        ));
        assert!(matches!(
            client.submit(&payloads(1)).await,
            Err(RelayError::Schema(_))
        ));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn submit_rejects_oversized_bundle_without_network() {
        let transport = ScriptedTransport::new(vec![]);
        let client = BundleRelayClient::new(transport.clone(), Duration::from_millis(5));

        let err = client.submit(&payloads(6)).await.unwrap_err();
        assert!(matches!(err, RelayError::InvalidBundle(_)));
        assert!(client.submit(&[]).await.is_err());
        assert!(transport.calls().is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn submit_propagates_rpc_errors() {
        let transport = ScriptedTransport::new(vec![Err(RelayError::Rpc {
            method: "sendBundle",
            code: -32602,
            message: "bundle contains an expired blockhash".to_string(),
        })]);
        let client = BundleRelayClient::new(transport, Duration::from_millis(5));
        assert!(matches!(
            client.submit(&payloads(2)).await,
            Err(RelayError::Rpc { code: -32602, .. })
        ));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn await_inflight_resolves_after_pending_polls() {
        let id = BundleId::new("bundle-1");
        let transport = ScriptedTransport::new(vec![
            Ok(inflight("bundle-1", "Pending")),
            Ok(inflight("bundle-1", "Pending")),
            Ok(landed("bundle-1", 42)),
        ]);
        let client = BundleRelayClient::new(transport.clone(), Duration::from_millis(5));

        let started = std::time::Instant::now();
        let timeout = Duration::from_secs(5);
        let status = client.await_inflight(&id, timeout).await;

        assert_eq!(status, InflightStatus::Confirmed { slot: Some(42) });
        assert!(started.elapsed() < timeout);
        assert_eq!(transport.calls().len(), 3);
        assert_eq!(
            transport.calls()[0].1,
            json!([["bundle-1"]])
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn await_inflight_times_out_instead_of_failing() {
        let id = BundleId::new("bundle-1");
        let transport = ScriptedTransport::new(vec![]).with_fallback(inflight("bundle-1", "Pending"));
        let client = BundleRelayClient::new(transport.clone(), Duration::from_millis(5));

        let status = client.await_inflight(&id, Duration::from_millis(60)).await;
        match status {
            InflightStatus::TimedOut { waited } => {
                assert!(waited >= Duration::from_millis(60));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        assert!(transport.calls().len() > 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn await_inflight_reports_relay_failure() {
        let id = BundleId::new("bundle-1");
        let transport = ScriptedTransport::new(vec![
            Ok(json!({ "value": [] })),
            Ok(inflight("bundle-1", "Failed")),
        ]);
        let client = BundleRelayClient::new(transport, Duration::from_millis(5));

        let status = client.await_inflight(&id, Duration::from_secs(5)).await;
        assert!(matches!(status, InflightStatus::Failed { .. }));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn await_inflight_survives_transient_poll_errors() {
        let id = BundleId::new("bundle-1");
        let transport = ScriptedTransport::new(vec![
            Err(RelayError::schema("gateway hiccup")),
            Ok(json!({ "unexpected": true, "value": "nope" })),
            Ok(landed("bundle-1", 7)),
        ]);
        let client = BundleRelayClient::new(transport, Duration::from_millis(5));

        let status = client.await_inflight(&id, Duration::from_secs(5)).await;
        assert_eq!(status, InflightStatus::Confirmed { slot: Some(7) });
    }

    #[tokio::test(flavor = "current_thread")]
    async fn fetch_final_is_optional() {
        let id = BundleId::new("bundle-1");
        let transport = ScriptedTransport::new(vec![
            Ok(json!({ "context": { "slot": 1 }, "value": [] })),
            Ok(json!({
                "context": { "slot": 101 },
                "value": [{
                    "bundle_id": "bundle-1",
                    "transactions": ["sig-a", "sig-b"],
                    "slot": 100,
                    "confirmation_status": "confirmed",
                    "err": { "Ok": null }
                }]
            })),
        ]);
        let client = BundleRelayClient::new(transport, Duration::from_millis(5));

        assert_eq!(client.fetch_final(&id).await.expect("lookup"), None);
        let status = client
            .fetch_final(&id)
            .await
            .expect("lookup")
            .expect("status");
        assert_eq!(status.slot, Some(100));
        assert_eq!(status.transactions, vec!["sig-a", "sig-b"]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn zero_poll_interval_is_clamped() {
        let id = BundleId::new("bundle-1");
        let transport =
            ScriptedTransport::new(vec![]).with_fallback(inflight("bundle-1", "Pending"));
        let client = BundleRelayClient::new(transport.clone(), Duration::ZERO);

        let status = client.await_inflight(&id, Duration::from_millis(120)).await;
        assert!(matches!(status, InflightStatus::TimedOut { .. }));
        let polls = transport.calls().len();
        assert!((2..=4).contains(&polls), "polled {polls} times");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn deadline_reports_remaining_time() {
        let deadline = Deadline::after(Duration::from_millis(20));
        assert!(!deadline.expired());
        assert!(deadline.remaining() <= Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(25)).await;
        assert!(deadline.expired());
        assert_eq!(deadline.remaining(), Duration::ZERO);
    }
}
