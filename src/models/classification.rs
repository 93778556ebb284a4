use serde::{Deserialize, Serialize};

use super::chain::Block;

/// Kind of value movement a transaction performed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionType {
    Native,
    #[serde(rename = "ERC20")]
    Erc20,
    #[serde(rename = "ERC721")]
    Erc721,
}

/// One classification tag for one transaction. A transaction carrying both
/// token standards yields two of these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassifiedTransaction {
    pub transaction: String,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
}

impl ClassifiedTransaction {
    pub fn new(transaction: &str, tx_type: TransactionType) -> Self {
        Self {
            transaction: transaction.to_string(),
            tx_type,
        }
    }
}

/// Item of the paginated block listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlockWithTypes {
    pub block_data: Block,
    pub tx_types: Vec<ClassifiedTransaction>,
}
