use futures::future::join_all;
use log::Level;

use crate::blockchain::event_decoder::{decode_erc20_transfer, decode_erc721_transfer};
use crate::blockchain::RpcClient;
use crate::error::DecodeError;
use crate::logging::{LogContext, MetricsLogger};
use crate::models::{ClassifiedTransaction, Log, TransactionType};

/// Tags the transactions of a block as native, ERC-20 or ERC-721 transfers.
///
/// Classification is best effort: fetch failures are logged and the affected
/// block or transaction is left out of the result instead of failing it.
#[derive(Clone)]
pub struct TransactionClassifier {
    rpc_client: RpcClient,
}

impl TransactionClassifier {
    pub fn new(rpc_client: RpcClient) -> Self {
        Self { rpc_client }
    }

    /// Classify every transaction of the block at `block_number`
    pub async fn classify_block(&self, block_number: u64) -> Vec<ClassifiedTransaction> {
        let context = LogContext::new("classifier", "classify_block").with_block_number(block_number);

        let block = match self.rpc_client.get_block(block_number).await {
            Ok(Some(block)) => block,
            Ok(None) => {
                context.warn("Block not returned by node, skipping classification");
                return Vec::new();
            }
            Err(e) => {
                context.with_error(&e).warn("Failed to fetch block, skipping classification");
                return Vec::new();
            }
        };

        let tags = self.classify_transactions(&block.transactions).await;
        MetricsLogger::log_block_classified(block_number, block.transaction_count(), tags.len());
        tags
    }

    /// Fetch the receipt of each transaction and classify it from its logs.
    /// Output keeps the order of `hashes`.
    pub async fn classify_transactions(&self, hashes: &[String]) -> Vec<ClassifiedTransaction> {
        let receipts = join_all(
            hashes
                .iter()
                .map(|hash| self.rpc_client.get_transaction_receipt(hash)),
        )
        .await;

        let mut tags = Vec::with_capacity(hashes.len());
        for (hash, receipt) in hashes.iter().zip(receipts) {
            match receipt {
                Ok(Some(receipt)) => tags.extend(classify_receipt(hash, &receipt.logs)),
                Ok(None) => {
                    LogContext::new("classifier", "classify_transactions")
                        .with_transaction_hash(hash)
                        .warn("No receipt for transaction, leaving it unclassified");
                }
                Err(e) => {
                    LogContext::new("classifier", "classify_transactions")
                        .with_transaction_hash(hash)
                        .with_error(&e)
                        .warn("Failed to fetch receipt, leaving transaction unclassified");
                }
            }
        }
        tags
    }
}

/// Tags for one transaction given its receipt logs
pub fn classify_receipt(transaction_hash: &str, logs: &[Log]) -> Vec<ClassifiedTransaction> {
    classify_logs(logs)
        .into_iter()
        .map(|tx_type| ClassifiedTransaction::new(transaction_hash, tx_type))
        .collect()
}

/// Token standards whose Transfer event appears in `logs`, in first-seen
/// order, or `[Native]` when none does. Each log is tried as ERC-20 first and
/// only tried as ERC-721 when that fails.
pub fn classify_logs(logs: &[Log]) -> Vec<TransactionType> {
    let mut types = Vec::new();

    for log in logs {
        match decode_erc20_transfer(log) {
            Ok(_) => {
                push_unique(&mut types, TransactionType::Erc20);
                continue;
            }
            Err(e) => trace_skipped(log, "erc20", &e),
        }

        match decode_erc721_transfer(log) {
            Ok(_) => push_unique(&mut types, TransactionType::Erc721),
            Err(e) => trace_skipped(log, "erc721", &e),
        }
    }

    if types.is_empty() {
        types.push(TransactionType::Native);
    }
    types
}

fn push_unique(types: &mut Vec<TransactionType>, tx_type: TransactionType) {
    if !types.contains(&tx_type) {
        types.push(tx_type);
    }
}

fn trace_skipped(log: &Log, standard: &str, error: &DecodeError) {
    if log::log_enabled!(Level::Trace) {
        LogContext::new("classifier", "decode_log")
            .with_metadata("standard", serde_json::json!(standard))
            .with_metadata("address", serde_json::json!(log.address))
            .with_error(error)
            .trace("Log does not decode, ignoring");
    }
}
