use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use kvstore::config::{Config, RPC_ADDR_ENV, normalize_endpoint};
use kvstore::gateway::{Gateway, RpcBackend};
use kvstore::logging;
use kvstore::server::Server;

#[derive(Debug, Parser)]
#[command(name = "kvstore", version, about = "In-memory key-value store with an HTTP gateway")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the gRPC storage service
    Storage {
        /// Listening address, e.g. 0.0.0.0:50000
        #[arg(long)]
        listen: Option<String>,
    },
    /// Run the HTTP gateway
    Gateway {
        /// Listening address, e.g. 0.0.0.0:8080
        #[arg(long)]
        listen: Option<String>,
        /// Storage service address
        #[arg(long)]
        rpc_addr: Option<String>,
    },
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Received Ctrl+C, shutting down");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    logging::init(&config.log)?;
    info!("Starting kvstore {}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Storage { listen } => {
            if let Some(addr) = listen {
                config.storage.listen_addr = addr;
            }

            let server = Server::bind(&config.storage.listen_addr).await?;
            info!("Storage server listening on: {}", server.local_addr());
            server.run_until(shutdown_signal()).await?;
        }
        Command::Gateway { listen, rpc_addr } => {
            if let Some(addr) = listen {
                config.gateway.listen_addr = addr;
            }
            if let Some(addr) = rpc_addr {
                config.gateway.rpc_addr = normalize_endpoint(&addr);
            }
            info!(
                "Storage service address: {} (override with {})",
                config.gateway.rpc_addr, RPC_ADDR_ENV
            );

            let backend = RpcBackend::connect_lazy(&config.gateway.rpc_addr)?;
            let gateway = Gateway::bind(&config.gateway.listen_addr, Arc::new(backend)).await?;
            gateway.run_until(shutdown_signal()).await?;
        }
    }

    Ok(())
}
