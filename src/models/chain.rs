use serde::{Deserialize, Serialize};

/// A block as returned to API clients. Transactions are listed by hash only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub number: u64,
    pub hash: String,
    pub parent_hash: String,
    pub timestamp: u64,
    pub miner: String,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub base_fee_per_gas: Option<String>, // Hex quantity, may exceed u64
    pub transactions: Vec<String>,
}

/// Transaction detail as returned to API clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: String,
    pub block_number: Option<u64>,
    pub block_hash: Option<String>,
    pub transaction_index: Option<u64>,
    pub from: String,
    pub to: Option<String>,
    pub value: String,              // Hex quantity (uint256)
    pub nonce: u64,
    pub gas: u64,
    pub gas_price: Option<String>,  // Hex quantity (uint256)
    pub input: String,
    pub chain_id: Option<u64>,
    #[serde(rename = "type")]
    pub tx_type: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub transaction_hash: String,
    pub block_number: Option<u64>,
    pub status: Option<u64>,
    pub logs: Vec<Log>,
}

/// A single event log entry of a receipt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub address: String,
    pub topics: Vec<String>,
    pub data: String,
    pub log_index: Option<u64>,
}

impl Block {
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }
}
