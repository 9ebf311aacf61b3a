use serde::Serialize;
use solana_sdk::pubkey::Pubkey;

use crate::relay::BundleId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentLinks {
    pub pump_fun: String,
    pub photon: String,
}

impl DeploymentLinks {
    pub fn for_mint(mint: &Pubkey) -> Self {
        Self {
            pump_fun: format!("https://pump.fun/coin/{mint}"),
            photon: format!("https://photon-sol.tinyastro.io/en/lp/{mint}"),
        }
    }
}

/// 单次发射的结果。失败不携带细节，细节只写入日志。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentResult {
    deployed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    contract_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    links: Option<DeploymentLinks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bundle_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    slot: Option<u64>,
}

impl DeploymentResult {
    pub fn deployed(mint: &Pubkey, bundle_id: &BundleId, slot: Option<u64>) -> Self {
        Self {
            deployed: true,
            contract_address: Some(mint.to_string()),
            links: Some(DeploymentLinks::for_mint(mint)),
            bundle_id: Some(bundle_id.to_string()),
            slot,
        }
    }

    pub fn not_deployed() -> Self {
        Self {
            deployed: false,
            contract_address: None,
            links: None,
            bundle_id: None,
            slot: None,
        }
    }

    pub fn is_deployed(&self) -> bool {
        self.deployed
    }

    pub fn contract_address(&self) -> Option<&str> {
        self.contract_address.as_deref()
    }

    pub fn links(&self) -> Option<&DeploymentLinks> {
        self.links.as_ref()
    }

    pub fn bundle_id(&self) -> Option<&str> {
        self.bundle_id.as_deref()
    }

    pub fn slot(&self) -> Option<u64> {
        self.slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn not_deployed_serializes_bare() {
        let value = serde_json::to_value(DeploymentResult::not_deployed()).expect("serialize");
        assert_eq!(value, json!({ "deployed": false }));
    }

    #[test]
    fn deployed_result_links_reference_the_mint() {
        let mint = Pubkey::new_unique();
        let result = DeploymentResult::deployed(&mint, &BundleId::new("b1"), Some(100));
        let links = result.links().expect("links");

        assert!(result.is_deployed());
        assert_eq!(result.contract_address(), Some(mint.to_string().as_str()));
        assert!(links.pump_fun.ends_with(&mint.to_string()));
        assert!(links.photon.ends_with(&mint.to_string()));

        let value = serde_json::to_value(&result).expect("serialize");
        assert_eq!(value["contractAddress"], mint.to_string());
        assert_eq!(value["links"]["pumpFun"], links.pump_fun);
        assert_eq!(value["slot"], 100);
    }
}
