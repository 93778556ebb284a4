use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::error::RpcError;
use crate::logging::{LogContext, MetricsLogger, PerformanceMonitor};
use crate::models::{Block, Log, Receipt, Transaction};

#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: Vec<Value>,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Value,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcBlock {
    number: String,
    hash: String,
    parent_hash: String,
    timestamp: String,
    #[serde(default)]
    miner: String,
    gas_limit: String,
    gas_used: String,
    base_fee_per_gas: Option<String>,
    #[serde(default)]
    transactions: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcTransaction {
    hash: String,
    block_number: Option<String>,
    block_hash: Option<String>,
    transaction_index: Option<String>,
    from: String,
    to: Option<String>,
    value: String,
    nonce: String,
    gas: String,
    gas_price: Option<String>,
    #[serde(default)]
    input: String,
    chain_id: Option<String>,
    #[serde(rename = "type")]
    tx_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: String,
    block_number: Option<String>,
    status: Option<String>,
    #[serde(default)]
    logs: Vec<RpcLog>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcLog {
    address: String,
    topics: Vec<String>,
    data: String,
    log_index: Option<String>,
}

/// JSON-RPC client for an Ethereum-compatible node.
///
/// Cloning is cheap: clones share the connection pool and the in-flight
/// request limiter.
#[derive(Clone)]
pub struct RpcClient {
    client: Client,
    endpoint: String,
    timeout_seconds: u64,
    permits: Arc<Semaphore>,
}

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 16;

impl RpcClient {
    pub fn new(endpoint: String) -> Result<Self, RpcError> {
        Self::new_with_config(endpoint, DEFAULT_TIMEOUT_SECONDS, DEFAULT_MAX_CONCURRENT_REQUESTS)
    }

    /// Client with a request timeout and a cap on concurrent requests to the node
    pub fn new_with_config(
        endpoint: String,
        timeout_seconds: u64,
        max_concurrent_requests: usize,
    ) -> Result<Self, RpcError> {
        let context = LogContext::new("rpc_client", "initialization")
            .with_metadata("endpoint", serde_json::json!(endpoint))
            .with_metadata("timeout_seconds", serde_json::json!(timeout_seconds))
            .with_metadata("max_concurrent_requests", serde_json::json!(max_concurrent_requests));
        context.info("Initializing RPC client");

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .pool_max_idle_per_host(max_concurrent_requests)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            timeout_seconds,
            permits: Arc::new(Semaphore::new(max_concurrent_requests.max(1))),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one JSON-RPC call. A `null` result is returned as `Value::Null`.
    async fn make_request(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| RpcError::Connection("request limiter closed".to_string()))?;

        let monitor = PerformanceMonitor::new(&format!("rpc_{}", method))
            .with_metadata("method", serde_json::json!(method));
        let result = self.send(method, params).await;
        let duration = monitor.finish_with_result(&result);
        MetricsLogger::log_rpc_call(method, duration, result.is_ok());

        result
    }

    async fn send(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: 1,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| RpcError::from_transport(e, self.timeout_seconds))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Connection(format!(
                "HTTP error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RpcError::from_transport(e, self.timeout_seconds))?;
        let rpc_response: JsonRpcResponse = serde_json::from_slice(&body)?;

        if let Some(error) = rpc_response.error {
            return Err(RpcError::Method {
                code: error.code,
                message: error.message,
            });
        }

        Ok(rpc_response.result)
    }

    /// Call a method whose result may legitimately be `null`
    async fn request_optional<R>(&self, method: &str, params: Vec<Value>) -> Result<Option<R>, RpcError>
    where
        R: DeserializeOwned,
    {
        let value = self.make_request(method, params).await?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }

    /// Current chain height (`eth_blockNumber`)
    pub async fn get_block_number(&self) -> Result<u64, RpcError> {
        let result = self.make_request("eth_blockNumber", vec![]).await?;

        let hex_string = result
            .as_str()
            .ok_or_else(|| RpcError::InvalidResponse("Block number is not a string".to_string()))?;

        parse_hex_to_u64(hex_string)
    }

    /// Block header with transaction hashes, `None` when the node has no such block
    pub async fn get_block(&self, block_number: u64) -> Result<Option<Block>, RpcError> {
        let params = vec![
            Value::String(format!("0x{:x}", block_number)),
            Value::Bool(false), // Transaction hashes only
        ];

        let raw: Option<RpcBlock> = self.request_optional("eth_getBlockByNumber", params).await?;
        let block = raw.map(Block::try_from).transpose()?;

        if let Some(block) = &block {
            LogContext::new("rpc_client", "get_block")
                .with_block_number(block_number)
                .with_metadata("transaction_count", serde_json::json!(block.transactions.len()))
                .trace(&format!("Retrieved block {}", block_number));
        }

        Ok(block)
    }

    pub async fn get_transaction(&self, hash: &str) -> Result<Option<Transaction>, RpcError> {
        let params = vec![Value::String(hash.to_string())];
        let raw: Option<RpcTransaction> = self.request_optional("eth_getTransactionByHash", params).await?;
        raw.map(Transaction::try_from).transpose()
    }

    pub async fn get_transaction_receipt(&self, hash: &str) -> Result<Option<Receipt>, RpcError> {
        let params = vec![Value::String(hash.to_string())];
        let raw: Option<RpcReceipt> = self.request_optional("eth_getTransactionReceipt", params).await?;
        raw.map(Receipt::try_from).transpose()
    }
}

impl TryFrom<RpcBlock> for Block {
    type Error = RpcError;

    fn try_from(raw: RpcBlock) -> Result<Self, Self::Error> {
        Ok(Block {
            number: parse_hex_to_u64(&raw.number)?,
            hash: raw.hash,
            parent_hash: raw.parent_hash,
            timestamp: parse_hex_to_u64(&raw.timestamp)?,
            miner: raw.miner,
            gas_limit: parse_hex_to_u64(&raw.gas_limit)?,
            gas_used: parse_hex_to_u64(&raw.gas_used)?,
            base_fee_per_gas: raw.base_fee_per_gas,
            transactions: raw.transactions,
        })
    }
}

impl TryFrom<RpcTransaction> for Transaction {
    type Error = RpcError;

    fn try_from(raw: RpcTransaction) -> Result<Self, Self::Error> {
        Ok(Transaction {
            hash: raw.hash,
            block_number: parse_optional_hex(raw.block_number.as_deref())?,
            block_hash: raw.block_hash,
            transaction_index: parse_optional_hex(raw.transaction_index.as_deref())?,
            from: raw.from,
            to: raw.to,
            value: raw.value,
            nonce: parse_hex_to_u64(&raw.nonce)?,
            gas: parse_hex_to_u64(&raw.gas)?,
            gas_price: raw.gas_price,
            input: raw.input,
            chain_id: parse_optional_hex(raw.chain_id.as_deref())?,
            tx_type: parse_optional_hex(raw.tx_type.as_deref())?,
        })
    }
}

impl TryFrom<RpcReceipt> for Receipt {
    type Error = RpcError;

    fn try_from(raw: RpcReceipt) -> Result<Self, Self::Error> {
        let logs = raw
            .logs
            .into_iter()
            .map(|log| -> Result<Log, RpcError> {
                Ok(Log {
                    address: log.address,
                    topics: log.topics,
                    data: log.data,
                    log_index: parse_optional_hex(log.log_index.as_deref())?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Receipt {
            transaction_hash: raw.transaction_hash,
            block_number: parse_optional_hex(raw.block_number.as_deref())?,
            status: parse_optional_hex(raw.status.as_deref())?,
            logs,
        })
    }
}

fn parse_hex_to_u64(hex_str: &str) -> Result<u64, RpcError> {
    let hex_without_prefix = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    u64::from_str_radix(hex_without_prefix, 16)
        .map_err(|e| RpcError::InvalidResponse(format!("Failed to parse hex '{}' to u64: {}", hex_str, e)))
}

fn parse_optional_hex(hex_str: Option<&str>) -> Result<Option<u64>, RpcError> {
    hex_str.map(parse_hex_to_u64).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rpc_client_creation() {
        let endpoint = "http://127.0.0.1:8545".to_string();
        let client = RpcClient::new(endpoint.clone()).unwrap();
        assert_eq!(client.endpoint(), endpoint);
        assert_eq!(client.permits.available_permits(), DEFAULT_MAX_CONCURRENT_REQUESTS);
    }

    #[test]
    fn test_zero_concurrency_still_allows_one_request() {
        let client = RpcClient::new_with_config("http://127.0.0.1:8545".to_string(), 5, 0).unwrap();
        assert_eq!(client.permits.available_permits(), 1);
    }

    #[test]
    fn test_json_rpc_request_serialization() {
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: "eth_blockNumber".to_string(),
            params: vec![],
            id: 1,
        };

        let serialized = serde_json::to_string(&request).unwrap();
        let expected = r#"{"jsonrpc":"2.0","method":"eth_blockNumber","params":[],"id":1}"#;
        assert_eq!(serialized, expected);
    }

    #[test]
    fn test_json_rpc_response_null_result() {
        let response: JsonRpcResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","result":null,"id":1}"#).unwrap();
        assert!(response.result.is_null());
        assert!(response.error.is_none());
    }

    #[test]
    fn test_json_rpc_response_deserialization_error() {
        let response_json = r#"{"jsonrpc":"2.0","error":{"code":-32601,"message":"Method not found"},"id":1}"#;
        let response: JsonRpcResponse = serde_json::from_str(response_json).unwrap();

        let error = response.error.unwrap();
        assert_eq!(error.code, -32601);
        assert_eq!(error.message, "Method not found");
    }

    #[test]
    fn test_parse_hex_to_u64() {
        assert_eq!(parse_hex_to_u64("0x1234").unwrap(), 0x1234u64);
        assert_eq!(parse_hex_to_u64("1234").unwrap(), 0x1234u64);
        assert_eq!(parse_hex_to_u64("0x0").unwrap(), 0u64);
        assert!(parse_hex_to_u64("invalid").is_err());
        assert_eq!(parse_optional_hex(None).unwrap(), None);
        assert_eq!(parse_optional_hex(Some("0x2")).unwrap(), Some(2));
    }

    #[test]
    fn test_block_conversion() {
        let raw: RpcBlock = serde_json::from_value(json!({
            "number": "0x10",
            "hash": "0xb16",
            "parentHash": "0xb15",
            "timestamp": "0x6553f100",
            "miner": "0x0000000000000000000000000000000000000000",
            "gasLimit": "0x1c9c380",
            "gasUsed": "0x5208",
            "baseFeePerGas": "0x7",
            "transactions": ["0xt1", "0xt2"],
            "uncles": []
        }))
        .unwrap();

        let block = Block::try_from(raw).unwrap();
        assert_eq!(block.number, 16);
        assert_eq!(block.timestamp, 0x6553f100);
        assert_eq!(block.gas_limit, 30_000_000);
        assert_eq!(block.gas_used, 21_000);
        assert_eq!(block.transactions, vec!["0xt1", "0xt2"]);
    }

    #[test]
    fn test_block_conversion_rejects_bad_hex() {
        let raw: RpcBlock = serde_json::from_value(json!({
            "number": "0xzz",
            "hash": "0xb16",
            "parentHash": "0xb15",
            "timestamp": "0x1",
            "gasLimit": "0x1",
            "gasUsed": "0x1"
        }))
        .unwrap();

        assert!(matches!(Block::try_from(raw), Err(RpcError::InvalidResponse(_))));
    }

    #[test]
    fn test_receipt_conversion() {
        let raw: RpcReceipt = serde_json::from_value(json!({
            "transactionHash": "0xt1",
            "blockNumber": "0x3",
            "status": "0x1",
            "logs": [{
                "address": "0xtoken",
                "topics": ["0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"],
                "data": "0x",
                "logIndex": "0x0"
            }]
        }))
        .unwrap();

        let receipt = Receipt::try_from(raw).unwrap();
        assert_eq!(receipt.block_number, Some(3));
        assert_eq!(receipt.status, Some(1));
        assert_eq!(receipt.logs.len(), 1);
        assert_eq!(receipt.logs[0].log_index, Some(0));
    }

    #[test]
    fn test_pending_transaction_conversion() {
        let raw: RpcTransaction = serde_json::from_value(json!({
            "hash": "0xt1",
            "blockNumber": null,
            "blockHash": null,
            "transactionIndex": null,
            "from": "0xaa",
            "to": "0xbb",
            "value": "0xde0b6b3a7640000",
            "nonce": "0x0",
            "gas": "0x5208",
            "gasPrice": "0x3b9aca00",
            "input": "0x",
            "type": "0x0"
        }))
        .unwrap();

        let transaction = Transaction::try_from(raw).unwrap();
        assert_eq!(transaction.block_number, None);
        assert_eq!(transaction.value, "0xde0b6b3a7640000");
        assert_eq!(transaction.gas, 21_000);
        assert_eq!(transaction.tx_type, Some(0));
        assert_eq!(transaction.chain_id, None);
    }
}
