//! inscriber
//!
//! Sends inscription transactions (zero-value self-transfers carrying payload data) to an
//! Ethereum-compatible chain, a configured number of times with a fixed delay.
//!
//! ```text
//!   config.toml + CLI flags          INSCRIBER_PRIVATE_KEY
//!             │                              │
//!             ▼                              ▼
//!     ┌──────────────┐   endpoint    ┌──────────────┐
//!     │ ProxyRegistry│──────────────▶│  ChainProxy  │◀── nonce / balance / estimate / send
//!     └──────────────┘               └──────┬───────┘
//!                                           │
//!     ┌──────────────┐               ┌──────▼───────┐
//!     │    Runner    │──────────────▶│    Token     │── build → sign → broadcast
//!     └──────────────┘               └──────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::sync::watch;

use inscriber::blockchain::codec::{decode_hex, text_to_hex};
use inscriber::blockchain::Account;
use inscriber::config::{load_config, InscriberConfig};
use inscriber::inscription::{Runner, Token};
use inscriber::observability::{logging, metrics};
use inscriber::ProxyRegistry;

#[derive(Parser)]
#[command(name = "inscriber")]
#[command(about = "Send inscription transactions to an EVM chain", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML configuration file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `rpc.url`.
    #[arg(long)]
    rpc_url: Option<String>,

    /// Override `observability.log_level`.
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send inscriptions in a loop
    Run {
        /// Text payload (hex-encoded before sending)
        #[arg(long, conflicts_with = "data")]
        text: Option<String>,
        /// Hex payload
        #[arg(long)]
        data: Option<String>,
        /// Number of inscriptions
        #[arg(long)]
        times: Option<u32>,
        /// Seconds to wait before each inscription
        #[arg(long)]
        delay: Option<u64>,
        /// Gas price in wei
        #[arg(long)]
        gas_price: Option<String>,
        /// Gas limit; estimated when empty
        #[arg(long)]
        gas_limit: Option<String>,
    },
    /// Print the balance of an address in wei (defaults to the configured account)
    Balance { address: Option<String> },
    /// Send a plain value transfer
    Transfer {
        #[arg(long)]
        to: String,
        /// Amount in wei
        #[arg(long)]
        value: String,
        #[arg(long, default_value = "21000")]
        gas_limit: String,
    },
    /// Estimate the gas limit of a transfer from the configured account
    Estimate {
        /// Destination; defaults to the configured account
        #[arg(long)]
        to: Option<String>,
        #[arg(long, default_value = "0")]
        value: String,
        #[arg(long, conflicts_with = "data")]
        text: Option<String>,
        #[arg(long)]
        data: Option<String>,
    },
    /// Print the account derived from the configured private key
    Account,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: failed to load {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => InscriberConfig::default(),
    };
    if let Some(url) = cli.rpc_url.clone() {
        config.rpc.url = url;
    }
    if let Some(level) = cli.log_level.clone() {
        config.observability.log_level = level;
    }

    logging::init_logging(&config.observability.log_level);
    tracing::info!("inscriber v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    match execute(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            ExitCode::FAILURE
        }
    }
}

async fn execute(
    command: Commands,
    mut config: InscriberConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let account = Account::from_env();
    let registry = ProxyRegistry::new();

    match command {
        Commands::Account => {
            println!("{}", serde_json::to_string_pretty(&account?)?);
        }
        Commands::Run {
            text,
            data,
            times,
            delay,
            gas_price,
            gas_limit,
        } => {
            let token = connect(&registry, &config).await?;
            let inscription = &mut config.inscription;
            if data.is_some() || text.is_some() {
                inscription.data = data;
                inscription.text = text;
            }
            if let Some(times) = times {
                inscription.times = times;
            }
            if let Some(delay) = delay {
                inscription.delay_secs = delay;
            }
            if let Some(gas_price) = gas_price {
                inscription.gas_price = gas_price;
            }
            if let Some(gas_limit) = gas_limit {
                inscription.gas_limit = gas_limit;
            }

            let payload = inscription
                .payload_hex()
                .ok_or("no payload: set inscription.text or inscription.data")?;
            decode_hex(&payload)?;
            tracing::info!(data = %payload, "Inscription payload");

            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        let _ = shutdown_tx.send(true);
                    }
                    Err(e) => tracing::warn!(error = %e, "Ctrl-C handler unavailable"),
                }
            });

            let runner = Runner::new(token, account?, config.inscription.clone(), payload);
            let summary = runner.run(shutdown_rx).await;
            println!(
                "succeeded: {}, failed: {}",
                summary.succeeded, summary.failed
            );
        }
        Commands::Balance { address } => {
            let token = connect(&registry, &config).await?;
            let address = match address {
                Some(address) => address,
                None => account?.address,
            };
            println!("{}", token.balance_of(&address).await?);
        }
        Commands::Transfer {
            to,
            value,
            gas_limit,
        } => {
            let token = connect(&registry, &config).await?;
            let account = account?;
            let outcome = token
                .transfer(
                    &account.private_key,
                    &config.inscription.gas_price,
                    &gas_limit,
                    &config.inscription.max_priority_fee_per_gas,
                    &value,
                    &to,
                    "",
                )
                .await?;
            println!("{}", outcome.into_result()?);
        }
        Commands::Estimate {
            to,
            value,
            text,
            data,
        } => {
            let token = connect(&registry, &config).await?;
            let account = account?;
            let payload = match (data, text) {
                (Some(data), _) => decode_hex(&data)?,
                (None, Some(text)) => decode_hex(&text_to_hex(&text))?,
                (None, None) => Vec::new(),
            };
            let to = to.unwrap_or_else(|| account.address.clone());
            let gas = token
                .estimate_gas_limit(
                    &account.address,
                    &to,
                    &config.inscription.gas_price,
                    &value,
                    Some(&payload),
                )
                .await?;
            println!("{}", gas);
        }
    }

    Ok(())
}

async fn connect(
    registry: &ProxyRegistry,
    config: &InscriberConfig,
) -> Result<Token, Box<dyn std::error::Error>> {
    let proxy = registry
        .get_or_create(&config.rpc.url, config.rpc.timeout_secs)
        .await?;
    Ok(Token::new(proxy, config.inscription.nonce_policy))
}
