use std::sync::Arc;

use alloy::primitives::{Address, U256};
use basestory::backend::BackendClient;
use basestory::config::Config;
use basestory::confirm::{wait_for_calls, ConfirmSettings};
use basestory::deposit::DepositMonitor;
use basestory::provider::{RpcWalletProvider, WalletProvider};
use basestory::reader::BalanceReader;
use basestory::session::{CacacheStore, SessionSettings, WalletSession};
use basestory::share::{preview_svg, share_page_html, ShareTarget};
use basestory::units::{format_token_amount, parse_token_amount};
use basestory::utils::logger::setup_logger;
use basestory::utils::providers::{create_balance_reader, wallet_provider_factory};
use clap::{Parser, Subcommand, ValueEnum};
use eyre::{eyre, Result};
use tokio::sync::oneshot;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect the wallet and show both accounts and the USDC balance
    Connect,
    /// Forget the connected wallet
    Disconnect,
    /// Show the USDC balance of an address
    Balance { address: Address },
    /// Wait for a USDC deposit to an address
    Watch {
        address: Address,
        /// Starting balance, e.g. "12.50"; defaults to the current balance
        #[arg(long)]
        baseline: Option<String>,
    },
    /// Show the status of a submitted call batch
    Status {
        batch_id: String,
        /// Keep polling until the batch is final
        #[arg(long)]
        wait: bool,
    },
    /// Show view counts for stories
    Views {
        ids: Vec<u64>,
        /// Story contract, defaults to STORY_CONTRACT_ADDRESS
        #[arg(long)]
        contract: Option<Address>,
    },
    /// Print a share page, or its preview image with --svg
    Share {
        kind: ShareKind,
        id: u64,
        #[arg(long)]
        svg: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ShareKind {
    Story,
    Ama,
}

fn session(config: &Config) -> WalletSession {
    WalletSession::new(
        SessionSettings::from_config(config),
        wallet_provider_factory(config.wallet_rpc_url.clone()),
        Arc::new(CacacheStore::new(config.state_dir.clone())),
    )
}

async fn connect(config: &Config) -> Result<()> {
    let session = session(config);
    if let Err(e) = session.connect().await {
        return Err(eyre!(e.user_message()));
    }

    let state = session.snapshot();
    println!("Connected as {}", state.display_name);
    if let Some(universal) = state.universal_address {
        println!("Universal account: {universal}");
    }
    match state.sub_account_address {
        Some(sub) => println!("Sub account:       {sub}"),
        None => println!("Sub account:       unavailable"),
    }
    println!(
        "USDC balance:      {}",
        state.usdc_balance.as_deref().unwrap_or("0.00")
    );

    session.teardown().await;
    Ok(())
}

async fn balance(config: &Config, address: Address) -> Result<()> {
    let reader = create_balance_reader(&config.rpc_url)?;
    let balance = reader.token_balance(config.token(), address).await?;
    println!("{} USDC", format_token_amount(balance));
    Ok(())
}

async fn watch(config: &Config, address: Address, baseline: Option<String>) -> Result<()> {
    let reader: Arc<dyn BalanceReader> = Arc::new(create_balance_reader(&config.rpc_url)?);

    let baseline: U256 = match baseline {
        Some(amount) => parse_token_amount(&amount)?,
        None => reader.token_balance(config.token(), address).await?,
    };
    println!(
        "Waiting for a deposit to {address} (current balance {} USDC)...",
        format_token_amount(baseline)
    );

    let (tx, rx) = oneshot::channel();
    let monitor = DepositMonitor::new(reader, config.token());
    let handle = monitor.watch(
        address,
        baseline,
        move |detected| {
            let _ = tx.send(detected);
        },
        |e| eprintln!("Balance check failed, retrying: {}", e.user_message()),
    );

    tokio::select! {
        detected = rx => {
            let detected = detected?;
            println!(
                "Received {} USDC, balance is now {} USDC",
                detected.amount, detected.new_balance
            );
        }
        _ = tokio::signal::ctrl_c() => {
            handle.stop();
            println!("Stopped watching");
        }
    }

    Ok(())
}

async fn status(config: &Config, batch_id: &str, wait: bool) -> Result<()> {
    let provider = RpcWalletProvider::new(&config.wallet_rpc_url)?;

    let status = if wait {
        wait_for_calls(&provider, batch_id, ConfirmSettings::default()).await?
    } else {
        provider.get_calls_status(batch_id).await?
    };

    println!("Batch {batch_id}: {}", status.state);
    for receipt in status.receipts {
        let hash = receipt
            .transaction_hash
            .map_or_else(|| "unknown".to_string(), |h| h.to_string());
        let outcome = if receipt.success { "success" } else { "failed" };
        println!("  {hash} {outcome}");
    }
    Ok(())
}

async fn views(config: &Config, ids: &[u64], contract: Option<Address>) -> Result<()> {
    let contract = contract
        .or(config.story_contract)
        .ok_or_else(|| eyre!("no story contract given and STORY_CONTRACT_ADDRESS not set"))?;
    let backend = BackendClient::from_config(config)?;

    let counts = backend.view_counts(ids, contract).await?;
    for id in ids {
        println!("story {id}: {} views", counts.get(id).copied().unwrap_or(0));
    }
    Ok(())
}

fn share(config: &Config, kind: ShareKind, id: u64, svg: bool) {
    let target = match kind {
        ShareKind::Story => ShareTarget::Story(id),
        ShareKind::Ama => ShareTarget::Ama(id),
    };

    if svg {
        println!("{}", preview_svg(target));
    } else {
        let app_url = config.app_url.trim_end_matches('/');
        let image_url = match target {
            ShareTarget::Story(id) => format!("{app_url}/api/og?story={id}"),
            ShareTarget::Ama(id) => format!("{app_url}/api/og?ama={id}"),
        };
        println!("{}", share_page_html(target, app_url, &image_url));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let config = Config::from_env();
    setup_logger(config.log_level)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Connect => connect(&config).await?,
        Commands::Disconnect => {
            session(&config).disconnect().await;
            println!("Disconnected");
        }
        Commands::Balance { address } => balance(&config, address).await?,
        Commands::Watch { address, baseline } => watch(&config, address, baseline).await?,
        Commands::Status { batch_id, wait } => status(&config, &batch_id, wait).await?,
        Commands::Views { ids, contract } => views(&config, &ids, contract).await?,
        Commands::Share { kind, id, svg } => share(&config, kind, id, svg),
    }

    Ok(())
}
