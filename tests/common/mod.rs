#![allow(dead_code)]

use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use evm_tx_explorer::blockchain::{RpcClient, TRANSFER_EVENT_SIGNATURE};
use evm_tx_explorer::service::TransactionService;

pub const TOKEN: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";
pub const COLLECTION: &str = "0xbc4ca0eda7647a8ab7c2061c2e118a18a936f13d";
pub const SENDER: &str = "0x000000000000000000000000f977814e90da44bfa03b6295a0616a897441acec";
pub const RECEIVER: &str = "0x000000000000000000000000e7804c37c13166ff0b37f5ae0bb07a3aebb6e245";
pub const AMOUNT: &str = "0x0000000000000000000000000000000000000000000000000de0b6b3a7640000";
pub const TOKEN_ID: &str = "0x0000000000000000000000000000000000000000000000000000000000000007";
pub const APPROVAL_EVENT_SIGNATURE: &str = "0x8c5be1e5ebec7d5bd14f71427d1e84f3dd0314c0f7b2291e5b200ac8c7c3b925";

/// Deterministic 32-byte hash for transaction `index` of block `block`
pub fn tx_hash(block: u64, index: u64) -> String {
    format!("0x{:032x}{:032x}", block, index)
}

pub fn block_hash(block: u64) -> String {
    format!("0x{:064x}", block + 0xb000)
}

pub fn erc20_log() -> Value {
    json!({
        "address": TOKEN,
        "topics": [TRANSFER_EVENT_SIGNATURE, SENDER, RECEIVER],
        "data": AMOUNT,
        "logIndex": "0x0"
    })
}

pub fn erc721_log() -> Value {
    json!({
        "address": COLLECTION,
        "topics": [TRANSFER_EVENT_SIGNATURE, SENDER, RECEIVER, TOKEN_ID],
        "data": "0x",
        "logIndex": "0x1"
    })
}

pub fn approval_log() -> Value {
    json!({
        "address": TOKEN,
        "topics": [APPROVAL_EVENT_SIGNATURE, SENDER, RECEIVER],
        "data": AMOUNT,
        "logIndex": "0x2"
    })
}

/// An in-memory chain answering the JSON-RPC methods the explorer uses.
///
/// Block 0 is an empty genesis block. Every added block gets the next height.
#[derive(Clone, Default)]
pub struct MockChain {
    blocks: Vec<Value>,
    transactions: HashMap<String, Value>,
    receipts: HashMap<String, Value>,
    failing_receipts: HashSet<String>,
    missing_blocks: HashSet<u64>,
    missing_transactions: HashSet<String>,
}

impl MockChain {
    pub fn new() -> Self {
        let mut chain = Self::default();
        chain.blocks.push(block_json(0, &[]));
        chain
    }

    /// Append a block whose transactions emit the given receipt logs
    pub fn with_block(mut self, transactions: Vec<Vec<Value>>) -> Self {
        let number = self.blocks.len() as u64;
        let hashes: Vec<String> = (0..transactions.len() as u64)
            .map(|index| tx_hash(number, index))
            .collect();

        for (index, (hash, logs)) in hashes.iter().zip(transactions).enumerate() {
            self.transactions
                .insert(hash.clone(), transaction_json(hash, number, index as u64));
            self.receipts.insert(hash.clone(), receipt_json(hash, number, logs));
        }

        self.blocks.push(block_json(number, &hashes));
        self
    }

    /// Receipt lookups for `hash` answer with a JSON-RPC error
    pub fn with_failing_receipt(mut self, hash: &str) -> Self {
        self.failing_receipts.insert(hash.to_string());
        self
    }

    /// Lookups of block `number` answer `null`
    pub fn with_missing_block(mut self, number: u64) -> Self {
        self.missing_blocks.insert(number);
        self
    }

    /// Transaction lookups for `hash` answer `null`
    pub fn with_missing_transaction(mut self, hash: &str) -> Self {
        self.missing_transactions.insert(hash.to_string());
        self
    }

    pub fn height(&self) -> u64 {
        self.blocks.len() as u64 - 1
    }

    pub async fn mount(self, server: &MockServer) {
        Mock::given(method("POST")).respond_with(self).mount(server).await;
    }

    fn block(&self, param: &Value) -> Value {
        param
            .as_str()
            .and_then(|hex| u64::from_str_radix(hex.trim_start_matches("0x"), 16).ok())
            .filter(|number| !self.missing_blocks.contains(number))
            .and_then(|number| self.blocks.get(number as usize))
            .cloned()
            .unwrap_or(Value::Null)
    }
}

impl Respond for MockChain {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = match request.body_json() {
            Ok(body) => body,
            Err(_) => return ResponseTemplate::new(400),
        };
        let id = body["id"].clone();
        let param = &body["params"][0];
        let hash = param.as_str().unwrap_or_default();

        let result = match body["method"].as_str().unwrap_or_default() {
            "eth_blockNumber" => json!(format!("0x{:x}", self.height())),
            "eth_getBlockByNumber" => self.block(param),
            "eth_getTransactionByHash" if self.missing_transactions.contains(hash) => Value::Null,
            "eth_getTransactionByHash" => self.transactions.get(hash).cloned().unwrap_or(Value::Null),
            "eth_getTransactionReceipt" if self.failing_receipts.contains(hash) => {
                return rpc_error(id, -32000, "receipt unavailable");
            }
            "eth_getTransactionReceipt" => self.receipts.get(hash).cloned().unwrap_or(Value::Null),
            _ => return rpc_error(id, -32601, "the method does not exist/is not available"),
        };

        ResponseTemplate::new(200).set_body_json(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
    }
}

fn rpc_error(id: Value, code: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message }
    }))
}

pub fn block_json(number: u64, transactions: &[String]) -> Value {
    let parent = if number == 0 { format!("0x{:064x}", 0) } else { block_hash(number - 1) };
    json!({
        "number": format!("0x{:x}", number),
        "hash": block_hash(number),
        "parentHash": parent,
        "timestamp": format!("0x{:x}", 1_700_000_000 + number * 12),
        "miner": "0x95222290dd7278aa3ddd389cc1e1d165cc4bafe5",
        "gasLimit": "0x1c9c380",
        "gasUsed": format!("0x{:x}", 21_000 * transactions.len() as u64),
        "baseFeePerGas": "0x7",
        "transactions": transactions
    })
}

pub fn transaction_json(hash: &str, block: u64, index: u64) -> Value {
    json!({
        "hash": hash,
        "blockNumber": format!("0x{:x}", block),
        "blockHash": block_hash(block),
        "transactionIndex": format!("0x{:x}", index),
        "from": "0xf977814e90da44bfa03b6295a0616a897441acec",
        "to": TOKEN,
        "value": "0x0",
        "nonce": format!("0x{:x}", index),
        "gas": "0x5208",
        "gasPrice": "0x3b9aca00",
        "input": "0x",
        "chainId": "0x1",
        "type": "0x2"
    })
}

pub fn receipt_json(hash: &str, block: u64, logs: Vec<Value>) -> Value {
    json!({
        "transactionHash": hash,
        "blockNumber": format!("0x{:x}", block),
        "status": "0x1",
        "logs": logs
    })
}

/// Three blocks:
/// 1: ERC-20 transfer, plain transfer
/// 2: ERC-721 transfer, transaction carrying both standards
/// 3: transaction with only an approval log
pub fn sample_chain() -> MockChain {
    MockChain::new()
        .with_block(vec![vec![erc20_log()], vec![]])
        .with_block(vec![vec![erc721_log()], vec![erc20_log(), erc721_log()]])
        .with_block(vec![vec![approval_log()]])
}

pub async fn start_node(chain: MockChain) -> MockServer {
    let server = MockServer::start().await;
    chain.mount(&server).await;
    server
}

pub fn service_for(server: &MockServer) -> TransactionService {
    let rpc_client = RpcClient::new_with_config(server.uri(), 5, 8).expect("Failed to create RPC client");
    TransactionService::new(rpc_client)
}

/// JSON-RPC methods the node received, in arrival order
pub async fn received_methods(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|request| request.body_json::<Value>().ok())
        .filter_map(|body| body["method"].as_str().map(str::to_string))
        .collect()
}
