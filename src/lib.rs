pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod service;

pub use blockchain::{RpcClient, TransactionClassifier};
pub use config::{ApiConfig, AppConfig, LoggingConfig, RpcConfig};
pub use error::{ExplorerError, Result, ServiceError};
pub use logging::{init_logging, LogContext, MetricsLogger, PerformanceMonitor};
pub use service::TransactionService;
