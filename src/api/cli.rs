use clap::{Parser, Subcommand};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use crate::error::{ConfigError, ServiceError};
use crate::service::TransactionService;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Service(#[from] ServiceError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "evm-tx-explorer-cli")]
#[command(about = "Query blocks and transactions of an EVM JSON-RPC node")]
#[command(version)]
pub struct Cli {
    /// JSON-RPC endpoint, overrides RPC_URL and the config file
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List every block from height 1 to the tip
    All,
    /// List a page of blocks with their transaction types
    Blocks {
        #[arg(long, default_value_t = 1)]
        page: u64,
        #[arg(long, default_value_t = 10)]
        limit: u64,
    },
    /// List the transactions of a page of blocks
    Transactions {
        #[arg(long, default_value_t = 1)]
        page: u64,
        #[arg(long, default_value_t = 10)]
        limit: u64,
    },
    /// Show a transaction by hash
    Infor { hash: String },
    /// Look up a block height or a 0x-prefixed transaction hash
    Find { text: String },
    /// Show the transaction types of one block
    Classify { block_number: u64 },
    /// Print a sample configuration file
    Config,
}

pub struct CliHandler {
    service: Arc<TransactionService>,
}

impl CliHandler {
    pub fn new(service: Arc<TransactionService>) -> Self {
        Self { service }
    }

    /// Run a command and return its pretty-printed JSON output
    pub async fn execute_command(&self, command: &Commands) -> Result<String, CliError> {
        match command {
            Commands::All => render(&self.service.get_all_blocks().await?),
            Commands::Blocks { page, limit } => {
                render(&self.service.get_block_paginate(*page, *limit).await?)
            }
            Commands::Transactions { page, limit } => {
                render(&self.service.get_transaction_paginate(*page, *limit).await?)
            }
            Commands::Infor { hash } => render(&self.service.get_infor_transaction(hash).await?),
            Commands::Find { text } => render(&self.service.find_transaction(text).await?),
            Commands::Classify { block_number } => {
                render(&self.service.classify_block(*block_number).await)
            }
            Commands::Config => Ok(AppConfig::generate_sample_config()?),
        }
    }
}

fn render<T: Serialize>(value: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(value)?)
}
