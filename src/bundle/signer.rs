use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::signer::SignerError;
use thiserror::Error;

use super::codec::{
    DecodeTxError, EncodeTxError, decode_base58_transaction, encode_base58_transaction,
};
use super::{SignedTransactionPayload, UnsignedTransactionPayload};

#[derive(Debug, Error)]
pub enum SignError {
    #[error("交易 #{index} 解码失败: {source}")]
    Decode {
        index: usize,
        #[source]
        source: DecodeTxError,
    },
    #[error("交易 #{index} 重新编码失败: {source}")]
    Encode {
        index: usize,
        #[source]
        source: EncodeTxError,
    },
    #[error("签名者 {signer} 不是交易 #{index} 的必需签名者")]
    SignerNotRequired { index: usize, signer: Pubkey },
    #[error("签名者 {signer} 签署交易 #{index} 失败: {source}")]
    Signer {
        index: usize,
        signer: Pubkey,
        #[source]
        source: SignerError,
    },
    #[error("交易 #{index} 缺少签名 {missing:?}")]
    MissingSignatures { index: usize, missing: Vec<Pubkey> },
}

impl SignError {
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

/// 用 `signers` 签署未签名交易并重新编码。
///
/// 每个签名写入其公钥在必需签名者列表中对应的槽位。所有必需槽位都必须覆盖，
/// 不会返回部分签名的交易。
pub fn sign_payload(
    payload: &UnsignedTransactionPayload,
    signers: &[&Keypair],
) -> Result<SignedTransactionPayload, SignError> {
    let index = payload.index;
    let mut tx = decode_base58_transaction(&payload.encoded)
        .map_err(|source| SignError::Decode { index, source })?;

    let required = usize::from(tx.message.header().num_required_signatures);
    let required_keys: Vec<Pubkey> = tx
        .message
        .static_account_keys()
        .iter()
        .take(required)
        .copied()
        .collect();
    tx.signatures.resize(required, Signature::default());

    let message_bytes = tx.message.serialize();
    let mut filled = vec![false; required];

    for signer in signers {
        let pubkey = signer.pubkey();
        let Some(slot) = required_keys.iter().position(|key| *key == pubkey) else {
            return Err(SignError::SignerNotRequired {
                index,
                signer: pubkey,
            });
        };
        let signature = signer
            .try_sign_message(&message_bytes)
            .map_err(|source| SignError::Signer {
                index,
                signer: pubkey,
                source,
            })?;
        tx.signatures[slot] = signature;
        filled[slot] = true;
    }

    let missing: Vec<Pubkey> = required_keys
        .iter()
        .zip(&filled)
        .filter(|(_, done)| !**done)
        .map(|(key, _)| *key)
        .collect();
    if !missing.is_empty() {
        return Err(SignError::MissingSignatures { index, missing });
    }

    let encoded =
        encode_base58_transaction(&tx).map_err(|source| SignError::Encode { index, source })?;
    Ok(SignedTransactionPayload { index, encoded })
}
