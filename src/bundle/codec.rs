use bincode::error::{DecodeError, EncodeError};
use bincode::serde::{decode_from_slice, encode_to_vec};
use solana_sdk::transaction::VersionedTransaction;
use thiserror::Error;

/// 解码交易 API 返回的 base58 交易。
pub fn decode_base58_transaction(encoded: &str) -> Result<VersionedTransaction, DecodeTxError> {
    let bytes = bs58::decode(encoded.trim())
        .into_vec()
        .map_err(DecodeTxError::Base58)?;
    if bytes.is_empty() {
        return Err(DecodeTxError::Empty);
    }
    let (tx, consumed) = decode_from_slice::<VersionedTransaction, _>(&bytes, bincode_config())
        .map_err(DecodeTxError::Bincode)?;
    if consumed != bytes.len() {
        return Err(DecodeTxError::TrailingBytes {
            consumed,
            total: bytes.len(),
        });
    }
    Ok(tx)
}

/// 按相同的 base58 线格式重新编码交易。
pub fn encode_base58_transaction(tx: &VersionedTransaction) -> Result<String, EncodeTxError> {
    let bytes = encode_to_vec(tx, bincode_config()).map_err(EncodeTxError::Bincode)?;
    Ok(bs58::encode(bytes).into_string())
}

fn bincode_config() -> impl bincode::config::Config {
    bincode::config::standard()
        .with_fixed_int_encoding()
        .with_little_endian()
}

#[derive(Debug, Error)]
pub enum DecodeTxError {
    #[error("base58 解码失败: {0}")]
    Base58(bs58::decode::Error),
    #[error("交易数据为空")]
    Empty,
    #[error("bincode 反序列化失败: {0}")]
    Bincode(DecodeError),
    #[error("交易数据存在多余字节 (已消费 {consumed}/{total})")]
    TrailingBytes { consumed: usize, total: usize },
}

#[derive(Debug, Error)]
pub enum EncodeTxError {
    #[error("bincode 序列化失败: {0}")]
    Bincode(EncodeError),
}
