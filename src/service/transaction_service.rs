use futures::future::try_join_all;
use serde::Serialize;
use std::time::Instant;
use thiserror::Error;

use crate::blockchain::{RpcClient, TransactionClassifier};
use crate::error::{RpcError, ServiceError};
use crate::logging::{LogContext, MetricsLogger};
use crate::models::{Block, BlockWithTypes, ClassifiedTransaction, Transaction};
use crate::service::pagination::PageRequest;

pub const INVALID_BLOCK_NUMBER: &str = "Invalid block number";
pub const NOT_DATA_HASH: &str = "Not data hash";
pub const NOT_DATA_TRANSACTION: &str = "Not data transaction";
pub const CANNOT_GET_TRANSACTION: &str = "Can not get data transaction";
pub const CANNOT_FIND_TEXT: &str = "Can't find with text";
pub const CANNOT_GET_DATA: &str = "Can not get data";
pub const CANNOT_GET_BLOCKS: &str = "Can not get data BLOCK";
pub const CANNOT_GET_TRANSACTIONS: &str = "Can not get information transaction";

/// Internal failure causes. Logged, then replaced by a fixed `ServiceError`.
#[derive(Error, Debug)]
enum FetchError {
    #[error(transparent)]
    Rpc(#[from] RpcError),
    #[error("block {requested} outside 0..={current}")]
    OutOfRange { requested: i64, current: u64 },
    #[error("node returned no {0}")]
    Missing(String),
}

/// What a free-text lookup resolved to
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Found {
    Block(Block),
    Transaction(Transaction),
}

/// How a free-text lookup is dispatched: decided purely on the `0x` prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupTarget<'a> {
    BlockHeight(&'a str),
    TransactionHash(&'a str),
}

pub fn lookup_target(text: &str) -> LookupTarget<'_> {
    if text.starts_with("0x") {
        LookupTarget::TransactionHash(text)
    } else {
        LookupTarget::BlockHeight(text)
    }
}

/// Block and transaction queries over one JSON-RPC node
#[derive(Clone)]
pub struct TransactionService {
    rpc_client: RpcClient,
    classifier: TransactionClassifier,
}

impl TransactionService {
    pub fn new(rpc_client: RpcClient) -> Self {
        Self {
            classifier: TransactionClassifier::new(rpc_client.clone()),
            rpc_client,
        }
    }

    /// Block at `block_number`, which must lie in `0..=current height`
    pub async fn get_block(&self, block_number: i64) -> Result<Block, ServiceError> {
        let result = async {
            let current = self.rpc_client.get_block_number().await?;
            if block_number < 0 || block_number as u64 > current {
                return Err(FetchError::OutOfRange { requested: block_number, current });
            }
            self.fetch_block(block_number as u64).await
        }
        .await;

        result.map_err(|e| fail("get_block", &e, ServiceError::bad_request(INVALID_BLOCK_NUMBER)))
    }

    /// Transaction by hash, `None` when the node does not know it
    pub async fn get_transaction(&self, hash: &str) -> Result<Option<Transaction>, ServiceError> {
        self.rpc_client
            .get_transaction(hash)
            .await
            .map_err(|e| fail("get_transaction", &e, ServiceError::bad_request(NOT_DATA_HASH)))
    }

    /// Transaction by hash, failing with NotFound when the node does not know it
    pub async fn get_infor_transaction(&self, hash: &str) -> Result<Transaction, ServiceError> {
        match self.get_transaction(hash).await {
            Ok(Some(transaction)) => Ok(transaction),
            Ok(None) => {
                LogContext::new("transaction_service", "get_infor_transaction")
                    .with_transaction_hash(hash)
                    .debug("Transaction not found");
                Err(ServiceError::not_found(NOT_DATA_TRANSACTION))
            }
            Err(_) => Err(ServiceError::bad_request(CANNOT_GET_TRANSACTION)),
        }
    }

    /// Resolve `text` as a block height, or as a transaction hash when it starts with `0x`
    pub async fn find_transaction(&self, text: &str) -> Result<Found, ServiceError> {
        let result = match lookup_target(text) {
            LookupTarget::BlockHeight(height) => match height.trim().parse::<i64>() {
                Ok(block_number) => self.get_block(block_number).await.map(Found::Block),
                Err(_) => Err(ServiceError::bad_request(INVALID_BLOCK_NUMBER)),
            },
            LookupTarget::TransactionHash(hash) => {
                self.get_infor_transaction(hash).await.map(Found::Transaction)
            }
        };

        result.map_err(|e| {
            LogContext::new("transaction_service", "find_transaction")
                .with_metadata("text", serde_json::json!(text))
                .with_error(&e)
                .debug("Lookup failed");
            ServiceError::bad_request(CANNOT_FIND_TEXT)
        })
    }

    /// One page of blocks, each with its classified transactions
    pub async fn get_block_paginate(&self, page: u64, limit: u64) -> Result<Vec<BlockWithTypes>, ServiceError> {
        let request = PageRequest::new(page, limit)?;
        let started = Instant::now();

        let result = async {
            let height = self.rpc_client.get_block_number().await?;
            LogContext::new("transaction_service", "get_block_paginate")
                .with_metadata("height", serde_json::json!(height))
                .with_metadata("blocks", serde_json::json!(request.window_len(height)))
                .debug("Fetching block page");

            let window = request.window(height);
            try_join_all(window.map(|index| self.block_with_types(index + 1))).await
        }
        .await;

        let items = result.map_err(|e| fail("get_block_paginate", &e, ServiceError::bad_request(CANNOT_GET_DATA)))?;
        MetricsLogger::log_page_served("block_paginate", page, limit, items.len(), elapsed_ms(started));
        Ok(items)
    }

    /// Every block from height 1 to the current height
    pub async fn get_all_blocks(&self) -> Result<Vec<Block>, ServiceError> {
        self.fetch_all_blocks()
            .await
            .map_err(|e| fail("get_all_blocks", &e, ServiceError::bad_request(CANNOT_GET_BLOCKS)))
    }

    /// One page of blocks flattened into their transactions. The page window
    /// is taken over the full block list, so the whole chain is fetched first.
    pub async fn get_transaction_paginate(&self, page: u64, limit: u64) -> Result<Vec<Transaction>, ServiceError> {
        let request = PageRequest::new(page, limit)?;
        let started = Instant::now();

        let result = async {
            let blocks = self.fetch_all_blocks().await?;
            let window = request.window(blocks.len() as u64);
            let hashes = blocks[window.start as usize..window.end as usize]
                .iter()
                .flat_map(|block| block.transactions.iter());

            try_join_all(hashes.map(|hash| self.fetch_transaction(hash))).await
        }
        .await;

        let transactions = result.map_err(|e| {
            fail("get_transaction_paginate", &e, ServiceError::bad_request(CANNOT_GET_TRANSACTIONS))
        })?;
        MetricsLogger::log_page_served("transaction_paginate", page, limit, transactions.len(), elapsed_ms(started));
        Ok(transactions)
    }

    /// Best-effort classification of one block's transactions
    pub async fn classify_block(&self, block_number: u64) -> Vec<ClassifiedTransaction> {
        self.classifier.classify_block(block_number).await
    }

    async fn fetch_block(&self, block_number: u64) -> Result<Block, FetchError> {
        self.rpc_client
            .get_block(block_number)
            .await?
            .ok_or_else(|| FetchError::Missing(format!("block {}", block_number)))
    }

    async fn fetch_all_blocks(&self) -> Result<Vec<Block>, FetchError> {
        let height = self.rpc_client.get_block_number().await?;
        try_join_all((1..=height).map(|block_number| self.fetch_block(block_number))).await
    }

    async fn fetch_transaction(&self, hash: &str) -> Result<Transaction, FetchError> {
        self.rpc_client
            .get_transaction(hash)
            .await?
            .ok_or_else(|| FetchError::Missing(format!("transaction {}", hash)))
    }

    async fn block_with_types(&self, block_number: u64) -> Result<BlockWithTypes, FetchError> {
        // A block the node returns as null fails the whole page, no empty entry is produced
        let block_data = self.fetch_block(block_number).await?;
        let tx_types = self.classifier.classify_transactions(&block_data.transactions).await;
        MetricsLogger::log_block_classified(block_number, block_data.transaction_count(), tx_types.len());
        Ok(BlockWithTypes { block_data, tx_types })
    }
}

fn fail(operation: &str, cause: &dyn std::fmt::Display, error: ServiceError) -> ServiceError {
    LogContext::new("transaction_service", operation)
        .with_error(cause)
        .warn(&format!("Request failed: {}", error));
    error
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
