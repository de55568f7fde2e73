use clap::{Parser, Subcommand};
use eyre::Context as _;
use std::{io::Write as _, path::PathBuf};
use tracing_subscriber::prelude::*;

mod amount;
mod balance;
mod chains;
mod cli_output;
mod config;
mod errors;
mod fsutil;
mod keystore;
mod wallet;

use cli_output::OutputFormat;
use config::WalletConfig;
use keystore::Keystore;
use wallet::WriteMode;

const LOG_FILE_NAME: &str = "solkeep.log.jsonl";

#[derive(Parser, Debug)]
#[command(name = "solkeep", version)]
struct Cli {
    /// Solana RPC endpoint (overrides `RPC_URL`).
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Directory holding wallet files.
    #[arg(long, global = true)]
    wallet_dir: Option<PathBuf>,

    /// Emit JSON to stdout (machine-readable).
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Defaults to `demo` when omitted.
    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a wallet, list all wallets, then import the first one listed.
    Demo,

    /// Generate a new keypair and store it as a wallet file.
    Create {
        /// File name inside the wallet directory (default: `wallet_<pubkey prefix>.json`).
        #[arg(long)]
        name: Option<String>,

        /// Replace an existing file with the same name.
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// List stored wallets with their current balances.
    List,

    /// Load a wallet file, verify its keypair and show its balance.
    Import {
        /// Path to the wallet file.
        path: PathBuf,
    },

    /// Look up the SOL balance of any public key (fails on RPC errors).
    Balance {
        /// Base58 public key.
        public_key: String,
    },
}

fn init_logging(cfg: &WalletConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_filter(env_filter.clone());

    let (file_layer, guard) = match cfg.log_dir.as_deref() {
        Some(dir) if std::fs::create_dir_all(dir).is_ok() => {
            let file_appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(file_writer)
                .with_filter(env_filter);
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

async fn run_demo(
    ks: &Keystore<chains::solana::SolanaChain>,
    fmt: OutputFormat,
) -> eyre::Result<()> {
    let created = ks
        .create_wallet(None, WriteMode::CreateNew)
        .await
        .context("create wallet")?;
    let wallets = ks.list_wallets().await.context("list wallets")?;
    // Enumeration order is filesystem-defined; "first" carries no meaning beyond that.
    let imported = match wallets.first() {
        Some(w) => Some(
            ks.import_wallet(&w.path)
                .await
                .with_context(|| format!("import wallet {}", w.path.display()))?,
        ),
        None => None,
    };

    let mut out = std::io::stdout().lock();
    if fmt == OutputFormat::Json {
        let v = serde_json::json!({
            "created": cli_output::created_json(&created),
            "list": cli_output::listing_json(&wallets),
            "imported": imported.as_ref().map(cli_output::imported_json),
        });
        let s = serde_json::to_string_pretty(&v).context("serialize demo output")?;
        writeln!(out, "{s}").context("write demo output")?;
        return Ok(());
    }
    cli_output::print_created(&mut out, &created, fmt)?;
    cli_output::print_listing(&mut out, &wallets, fmt)?;
    if let Some(w) = &imported {
        cli_output::print_imported(&mut out, w, fmt)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let cfg = WalletConfig::from_env().with_overrides(cli.rpc_url, cli.wallet_dir);
    let _log_guard = init_logging(&cfg);
    tracing::debug!(rpc_url = %cfg.rpc_url, "config resolved");

    let fmt = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let ks = Keystore::open(cfg);
    tracing::debug!(wallet_dir = %ks.store().dir().display(), "keystore opened");

    match cli.cmd.unwrap_or(Command::Demo) {
        Command::Demo => run_demo(&ks, fmt).await.context("demo failed"),
        Command::Create { name, force } => {
            let mode = if force {
                WriteMode::Overwrite
            } else {
                WriteMode::CreateNew
            };
            let w = ks
                .create_wallet(name.as_deref(), mode)
                .await
                .context("create wallet failed")?;
            cli_output::print_created(&mut std::io::stdout().lock(), &w, fmt)
        }
        Command::List => {
            let ws = ks.list_wallets().await.context("list wallets failed")?;
            cli_output::print_listing(&mut std::io::stdout().lock(), &ws, fmt)
        }
        Command::Import { path } => {
            let w = ks
                .import_wallet(&path)
                .await
                .context("import wallet failed")?;
            cli_output::print_imported(&mut std::io::stdout().lock(), &w, fmt)
        }
        Command::Balance { public_key } => {
            let bal = ks
                .balance(&public_key)
                .await
                .context("balance lookup failed")?;
            cli_output::print_balance(&mut std::io::stdout().lock(), &public_key, bal, fmt)
        }
    }
}
