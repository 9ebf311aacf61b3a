//! Bundle 交易：解码、签名者分配与签名。

pub mod codec;
pub mod policy;
pub mod signer;

pub use policy::{
    MAX_BUNDLE_TRANSACTIONS, MAX_BUYERS, SignerAssignment, expected_transaction_count,
};
pub use signer::{SignError, sign_payload};

/// 从交易 API 取得的未签名交易及其在 bundle 中的位置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransactionPayload {
    pub index: usize,
    pub encoded: String,
}

/// 已完整签名的交易，按交易 API 的 base58 格式编码。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransactionPayload {
    pub index: usize,
    pub encoded: String,
}

impl UnsignedTransactionPayload {
    pub fn from_blobs(blobs: Vec<String>) -> Vec<Self> {
        blobs
            .into_iter()
            .enumerate()
            .map(|(index, encoded)| Self { index, encoded })
            .collect()
    }
}
