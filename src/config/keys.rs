use std::fmt;

use serde_json::Value;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};

use crate::bundle::MAX_BUYERS;

use super::{ConfigError, KeyFile, MintKeypairEntry};

/// 单次发射已校验的签名材料。
pub struct KeyMaterial {
    pub dev: Keypair,
    pub buyers: Vec<Keypair>,
    pub mint: Keypair,
    /// 原始 `solValues`，构建交易时再结合默认金额解析。
    pub buy_amounts: Vec<Value>,
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("dev", &self.dev.pubkey())
            .field(
                "buyers",
                &self.buyers.iter().map(Signer::pubkey).collect::<Vec<_>>(),
            )
            .field("mint", &self.mint.pubkey())
            .field("buy_amounts", &self.buy_amounts)
            .finish()
    }
}

impl KeyMaterial {
    pub fn from_key_file(file: &KeyFile) -> Result<Self, ConfigError> {
        let dev = file
            .dev
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::Missing("dev"))?;
        let dev = keypair_from_base58("dev", dev)?;

        if file.buyers.is_empty() {
            return Err(ConfigError::Missing("buyers"));
        }
        if file.buyers.len() > MAX_BUYERS {
            return Err(ConfigError::InvalidKey {
                field: "buyers".to_string(),
                reason: format!(
                    "配置了 {} 个买家，单个 bundle 最多容纳 {MAX_BUYERS} 个",
                    file.buyers.len()
                ),
            });
        }
        let buyers = file
            .buyers
            .iter()
            .enumerate()
            .map(|(idx, value)| keypair_from_base58(&format!("buyers[{idx}]"), value))
            .collect::<Result<Vec<_>, _>>()?;

        let mint_entry = file
            .mint_keypairs
            .first()
            .ok_or(ConfigError::Missing("mintKeypairs"))?;
        let mint = keypair_from_mint_entry(mint_entry)?;

        Ok(Self {
            dev,
            buyers,
            mint,
            buy_amounts: file.sol_values.clone(),
        })
    }

    pub fn mint_address(&self) -> Pubkey {
        self.mint.pubkey()
    }
}

fn keypair_from_base58(field: &str, encoded: &str) -> Result<Keypair, ConfigError> {
    let bytes = bs58::decode(encoded.trim())
        .into_vec()
        .map_err(|err| invalid(field, format!("base58 解码失败: {err}")))?;
    keypair_from_bytes(field, &bytes)
}

fn keypair_from_mint_entry(entry: &MintKeypairEntry) -> Result<Keypair, ConfigError> {
    const FIELD: &str = "mintKeypairs[0]";
    match entry {
        MintKeypairEntry::Bytes(bytes) => keypair_from_bytes(FIELD, bytes),
        MintKeypairEntry::Encoded(text) => {
            let bytes: Vec<u8> = serde_json::from_str(text.trim())
                .map_err(|err| invalid(FIELD, format!("应为 JSON 字节数组: {err}")))?;
            keypair_from_bytes(FIELD, &bytes)
        }
    }
}

fn keypair_from_bytes(field: &str, bytes: &[u8]) -> Result<Keypair, ConfigError> {
    if bytes.len() != 64 {
        return Err(invalid(
            field,
            format!("私钥必须为 64 字节，实际 {}", bytes.len()),
        ));
    }
    Keypair::try_from(bytes).map_err(|err| invalid(field, err.to_string()))
}

fn invalid(field: &str, reason: String) -> ConfigError {
    ConfigError::InvalidKey {
        field: field.to_string(),
        reason,
    }
}
