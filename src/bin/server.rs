use clap::Parser;
use evm_tx_explorer::api::ApiServer;
use evm_tx_explorer::blockchain::RpcClient;
use evm_tx_explorer::config::AppConfig;
use evm_tx_explorer::logging::init_logging;
use evm_tx_explorer::service::TransactionService;
use evm_tx_explorer::Result;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "evm-tx-explorer-server")]
#[command(about = "HTTP API for blocks and classified transactions of an EVM node")]
#[command(version)]
struct Args {
    /// JSON-RPC endpoint of the node
    #[arg(long)]
    rpc_url: Option<String>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Server port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // File and environment first, then command line flags on top
    let mut config = AppConfig::load()?;
    if let Some(rpc_url) = args.rpc_url {
        config.rpc.endpoint = rpc_url;
    }
    if let Some(host) = args.host {
        config.api.host = host;
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }
    config.validate()?;

    init_logging(&config.logging);

    let rpc_client = RpcClient::new_with_config(
        config.rpc.endpoint.clone(),
        config.rpc.timeout_seconds,
        config.rpc.max_concurrent_requests,
    )?;
    let service = Arc::new(TransactionService::new(rpc_client));

    let server = ApiServer::new(service, &config.api);
    log::info!("Serving {} on {}:{}", config.rpc.endpoint, server.host, server.port);

    if let Err(e) = server.start().await {
        log::error!("Server failed: {}", e);
        return Err(e.into());
    }

    Ok(())
}
