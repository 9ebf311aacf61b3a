use solana_sdk::signature::Keypair;

/// 交易 API 合并进单笔 buy 交易的买家钱包数。
pub const BUYERS_PER_TRANSACTION: usize = 5;

/// 中继接受的单个 bundle 交易上限。
pub const MAX_BUNDLE_TRANSACTIONS: usize = 5;

/// 交易仍能装入单个 bundle 的最大买家数。
pub const MAX_BUYERS: usize = (MAX_BUNDLE_TRANSACTIONS - 1) * BUYERS_PER_TRANSACTION;

/// 一笔 create 交易加上每组买家一笔。
pub fn expected_transaction_count(buyers: usize) -> usize {
    1 + buyers.div_ceil(BUYERS_PER_TRANSACTION)
}

/// 为 bundle 中每个位置分配签名者集合。
///
/// 位置 0 是 create 交易，需要 mint 与开发者签名；之后每个位置消费下一组买家，
/// 游标只前进不回退。
pub struct SignerAssignment<'a> {
    mint: &'a Keypair,
    dev: &'a Keypair,
    buyers: &'a [Keypair],
    chunk_size: usize,
    cursor: usize,
}

impl<'a> SignerAssignment<'a> {
    pub fn new(mint: &'a Keypair, dev: &'a Keypair, buyers: &'a [Keypair]) -> Self {
        Self::with_chunk_size(mint, dev, buyers, BUYERS_PER_TRANSACTION)
    }

    pub fn with_chunk_size(
        mint: &'a Keypair,
        dev: &'a Keypair,
        buyers: &'a [Keypair],
        chunk_size: usize,
    ) -> Self {
        Self {
            mint,
            dev,
            buyers,
            chunk_size: chunk_size.max(1),
            cursor: 0,
        }
    }

    pub fn signers_for(&mut self, index: usize) -> Vec<&'a Keypair> {
        if index == 0 {
            return vec![self.mint, self.dev];
        }

        let start = self.cursor.min(self.buyers.len());
        let end = (start + self.chunk_size).min(self.buyers.len());
        self.cursor = end;
        self.buyers[start..end].iter().collect()
    }

    pub fn remaining_buyers(&self) -> usize {
        self.buyers.len().saturating_sub(self.cursor)
    }
}
