use clap::Parser;
use evm_tx_explorer::api::{Cli, CliHandler, Commands};
use evm_tx_explorer::blockchain::RpcClient;
use evm_tx_explorer::config::AppConfig;
use evm_tx_explorer::service::TransactionService;
use evm_tx_explorer::Result;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Quieter than the server unless RUST_LOG says otherwise
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if cli.command == Commands::Config {
        println!("{}", AppConfig::generate_sample_config()?);
        return Ok(());
    }

    let mut config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(rpc_url) = cli.rpc_url.clone() {
        config.rpc.endpoint = rpc_url;
    }

    let rpc_client = match RpcClient::new_with_config(
        config.rpc.endpoint.clone(),
        config.rpc.timeout_seconds,
        config.rpc.max_concurrent_requests,
    ) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to create RPC client for '{}': {}", config.rpc.endpoint, e);
            std::process::exit(1);
        }
    };

    let cli_handler = CliHandler::new(Arc::new(TransactionService::new(rpc_client)));

    match cli_handler.execute_command(&cli.command).await {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
