//! chat-dapp shell
//!
//! Line-oriented terminal client for the `ChatApp` contract.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chat_dapp::command::Command;
use chat_dapp::config::WalletBackend;
use chat_dapp::{bootstrap, logging, App, Config, Flow, Session};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Parser)]
#[command(name = "chat-dapp", version, about = "Terminal chat client for the ChatApp contract")]
struct Cli {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint of the node
    #[arg(long)]
    rpc_url: Option<String>,

    /// Log level for this client's crates (RUST_LOG takes precedence)
    #[arg(long)]
    log_level: Option<String>,

    /// Start without a wallet
    #[arg(long)]
    no_wallet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(url) = cli.rpc_url {
        config.network.rpc_url = url;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.no_wallet {
        config.wallet.backend = WalletBackend::None;
    }

    logging::init(&config.logging.level);
    tracing::info!("chat-dapp v{}", env!("CARGO_PKG_VERSION"));

    let contract_address = config.contract_address()?;
    let interface = Arc::new(config.interface()?);
    let injected = bootstrap::injected_provider(&config)
        .await
        .context("setting up the wallet")?;
    let session = Session::new(
        injected,
        &contract_address,
        interface,
        config.wallet.poll_interval(),
    )?;
    tracing::info!(contract = %contract_address, wallet = session.has_wallet(), "session ready");

    let mut app = App::start(Arc::new(session)).await;
    print!("{}", app.render());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        match app.dispatch(command).await {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => print!("{}", app.render()),
            Err(e) => println!("{e}"),
        }
    }

    tracing::info!("chat-dapp exiting");
    Ok(())
}
