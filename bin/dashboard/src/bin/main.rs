//! Token dashboard CLI.
//!
//! - `connect`: connect the wallet and print the dashboard
//! - `address`: print the full connected address
//! - `transfer`: send tokens and wait for confirmation
//! - `watch`: keep the dashboard live until Ctrl-C, reloading on chain changes.
//!   Reads `lock`, `unlock` and `account <private-key>` from stdin to switch
//!   the wallet's account.

use clap::{Parser, Subcommand};
use dashboard::{
    config::Config,
    console::ConsoleCommand,
    metrics::{install_prometheus_exporter, Metrics},
    App, Dispatch, Intent,
};
use session::ListenOutcome;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wallet::RpcWallet;

#[derive(Parser)]
#[command(name = "dashboard")]
#[command(about = "Connect a wallet, view ETH and token balances, send tokens")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Wallet private key (hex string, with or without 0x prefix).
    /// Without it no wallet provider is available.
    #[arg(short = 'k', long, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Serve Prometheus metrics on this port
    #[arg(long)]
    metrics_port: Option<u16>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Connect the wallet and print the dashboard
    Connect,

    /// Print the full connected address
    Address,

    /// Send tokens to a recipient
    Transfer {
        /// Recipient address
        #[arg(long)]
        to: String,

        /// Amount in whole tokens, e.g. 1.5
        #[arg(long)]
        amount: String,
    },

    /// Keep the dashboard live until Ctrl-C.
    /// Type `lock`, `unlock` or `account <private-key>` to switch accounts.
    Watch,
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn build_app(
    config: &Config,
    private_key: Option<&str>,
    metrics: &Metrics,
) -> eyre::Result<App<RpcWallet>> {
    let wallet = match private_key {
        Some(key) => Some(RpcWallet::new(
            &config.rpc_url,
            Some(key),
            config.chain_poll_interval(),
        )?),
        None => {
            warn!("No private key supplied, running without a wallet provider");
            None
        }
    };

    Ok(App::new(config, wallet, metrics.clone()))
}

/// Warn when the endpoint serves a different chain than configured.
async fn check_network(app: &App<RpcWallet>, config: &Config) {
    let Some(wallet) = app.connection().wallet() else {
        return;
    };

    let expected = config.network_config();
    match wallet.chain_id().await {
        Ok(chain_id) if chain_id != expected.chain_id => {
            warn!(
                chain_id,
                expected = expected.chain_id,
                network = expected.display_name,
                "RPC endpoint is on a different chain than configured"
            );
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "Failed to read chain id"),
    }
}

async fn connect(app: &App<RpcWallet>, config: &Config) -> eyre::Result<()> {
    check_network(app, config).await;
    app.dispatch(Intent::Connect).await;

    let state = app.connection().state();
    match state.error_message {
        Some(error) => eyre::bail!(error),
        None => Ok(()),
    }
}

/// Apply a console line to the wallet; it announces the account change.
async fn switch_account(app: &App<RpcWallet>, private_key: Option<&str>, line: &str) {
    let Some(wallet) = app.connection().wallet() else {
        warn!("No wallet provider, ignoring command");
        return;
    };

    let result = match line.parse::<ConsoleCommand>() {
        Ok(ConsoleCommand::Lock) => wallet.switch_account(None).await,
        Ok(ConsoleCommand::Unlock) => wallet.switch_account(private_key).await,
        Ok(ConsoleCommand::Account(key)) => wallet.switch_account(Some(&key)).await,
        Err(e) => {
            warn!(error = %e, "Ignoring console input");
            return;
        }
    };

    if let Err(e) = result {
        warn!(error = %e, "Failed to switch account");
    }
}

async fn watch(config: &Config, private_key: Option<&str>, metrics: &Metrics) -> eyre::Result<()> {
    let mut console = BufReader::new(tokio::io::stdin()).lines();
    let mut console_open = true;

    loop {
        let app = build_app(config, private_key, metrics)?;
        check_network(&app, config).await;
        app.dispatch(Intent::Connect).await;

        let watching = app.watch(|page| println!("\n{page}"));
        tokio::pin!(watching);

        let outcome = loop {
            tokio::select! {
                outcome = &mut watching => break outcome,
                line = console.next_line(), if console_open => match line {
                    Ok(Some(line)) if line.trim().is_empty() => {}
                    Ok(Some(line)) => switch_account(&app, private_key, &line).await,
                    Ok(None) => console_open = false,
                    Err(e) => {
                        warn!(error = %e, "Console input closed");
                        console_open = false;
                    }
                },
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutting down");
                    return Ok(());
                }
            }
        };

        match outcome {
            ListenOutcome::Reload { chain_id } => {
                info!(chain_id, "Rebuilding application for new chain");
            }
            ListenOutcome::Closed => {
                info!("Wallet notifications ended, waiting for Ctrl-C");
                tokio::signal::ctrl_c().await?;
                info!("Shutting down");
                return Ok(());
            }
        }
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = Config::from_file(&cli.config)?;
    let network = config.network_config();

    info!("Loaded config:");
    info!("  RPC URL: {}", config.rpc_url);
    info!("  Network: {} ({})", network.display_name, network.chain_id);
    info!("  Token: {} ({})", config.token.address, config.token.symbol);

    if let Some(port) = cli.metrics_port {
        install_prometheus_exporter(port)?;
        info!(port, "Serving Prometheus metrics");
    }
    let metrics = Metrics::new();
    let private_key = cli.private_key.as_deref();

    match cli.command {
        Command::Connect => {
            let app = build_app(&config, private_key, &metrics)?;
            let result = connect(&app, &config).await;
            println!("{}", app.render());
            result?;
        }
        Command::Address => {
            let app = build_app(&config, private_key, &metrics)?;
            connect(&app, &config).await?;

            match app.dispatch(Intent::CopyAddress).await {
                Dispatch::Copied(address) => println!("{address}"),
                _ => eyre::bail!("No connected address"),
            }
        }
        Command::Transfer { to, amount } => {
            let app = build_app(&config, private_key, &metrics)?;
            connect(&app, &config).await?;

            let outcome = app
                .dispatch(Intent::SubmitTransfer {
                    recipient: to,
                    amount,
                })
                .await;
            println!("{}", app.render());

            match outcome {
                Dispatch::Transfer(Ok(receipt)) => {
                    info!(
                        tx_hash = %receipt.tx_hash,
                        block_number = ?receipt.block_number,
                        "Transfer complete"
                    );
                }
                Dispatch::Transfer(Err(e)) => eyre::bail!(e.user_message()),
                _ => eyre::bail!("Recipient and amount are required"),
            }
        }
        Command::Watch => watch(&config, private_key, &metrics).await?,
    }

    Ok(())
}
