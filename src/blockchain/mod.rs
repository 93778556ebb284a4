pub mod rpc_client;
pub mod event_decoder;
pub mod classifier;

pub use rpc_client::RpcClient;
pub use event_decoder::{decode_erc20_transfer, decode_erc721_transfer, normalize_hex, Erc20Transfer, Erc721Transfer, TRANSFER_EVENT_SIGNATURE};
pub use classifier::{classify_logs, classify_receipt, TransactionClassifier};
