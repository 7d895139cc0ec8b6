use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use swap_chains::{HttpTransport, JsonRpcChainProvider};
use swap_client::{Client, ProviderStack};
use swap_config::{Config, ConfigLoader};
use swap_engine::HtlcSwapProvider;
use swap_types::{SwapParams, TxHash};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "swap-cli")]
#[command(about = "HTLC atomic swap client", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[arg(short, long, value_name = "FILE", default_value = "config/local.toml")]
	config: PathBuf,

	#[arg(long, env = "SWAP_LOG_LEVEL", default_value = "info")]
	log_level: String,
}

#[derive(Subcommand)]
enum Commands {
	/// Validate the configuration file
	Validate,
	/// Verify an on-chain swap initiation against agreed parameters
	Verify {
		/// Hash of the claimed initiation transaction
		tx_hash: String,
		#[arg(long)]
		value: u64,
		#[arg(long)]
		recipient: String,
		#[arg(long)]
		refund: String,
		#[arg(long)]
		secret_hash: String,
		#[arg(long)]
		expiration: u64,
	},
	/// Extract the secret revealed by a claim transaction
	Secret {
		/// Hash of the claim transaction
		claim_tx_hash: String,
	},
	/// Show the current fee rate, falling back to the configured default
	Fee {
		#[arg(long, default_value_t = 1)]
		target: u32,
	},
	/// Show the current chain height
	Height,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	setup_tracing(&cli.log_level)?;

	let config = ConfigLoader::new()
		.with_file(&cli.config)
		.load()
		.await
		.context("Failed to load configuration")?;

	match cli.command {
		Commands::Validate => {
			info!("Configuration is valid");
			info!("RPC endpoint: {}", config.chain.rpc_url);
			info!("Swap code hash: {}", config.chain.swap_code_hash);
			Ok(())
		}
		Commands::Verify {
			tx_hash,
			value,
			recipient,
			refund,
			secret_hash,
			expiration,
		} => {
			let client = build_client(&config)?;
			let params = SwapParams {
				value,
				recipient_address: recipient.into(),
				refund_address: refund.into(),
				secret_hash: secret_hash
					.parse()
					.context("Invalid secret hash")?,
				expiration,
			};

			let verified = client
				.swap()?
				.verify_initiate_swap_transaction(&params, &TxHash::new(tx_hash))
				.await
				.context("Verification failed")?;

			println!("{}", if verified { "verified" } else { "mismatch" });
			Ok(())
		}
		Commands::Secret { claim_tx_hash } => {
			let client = build_client(&config)?;
			let secret = client
				.swap()?
				.get_swap_secret(&TxHash::new(claim_tx_hash))
				.await
				.context("Failed to extract swap secret")?;

			println!("{}", secret);
			Ok(())
		}
		Commands::Fee { target } => {
			let client = build_client(&config)?;
			let fee = client
				.fees()?
				.get_fee_per_byte(target)
				.await
				.context("Failed to resolve fee rate")?;

			println!("{}", fee);
			Ok(())
		}
		Commands::Height => {
			let client = build_client(&config)?;
			let height = client
				.chain()?
				.get_block_height()
				.await
				.context("Failed to fetch chain height")?;

			println!("{}", height);
			Ok(())
		}
	}
}

/// Builds the provider stack from configuration: the JSON-RPC chain adapter
/// at the bottom, the HTLC swap engine layered on top.
fn build_client(config: &Config) -> Result<Client> {
	let transport = HttpTransport::new(
		config.chain.rpc_url.clone(),
		config.chain.rpc_user.clone(),
		config.chain.rpc_password.clone(),
		Duration::from_secs(config.chain.request_timeout_secs),
	)
	.context("Failed to construct RPC transport")?;

	let chain = JsonRpcChainProvider::new(
		Arc::new(transport),
		config.chain.default_fee_per_byte,
		config.chain.swap_code_hash.clone(),
	);

	let stack = ProviderStack::builder()
		.with_provider(Arc::new(chain))
		.with_provider(Arc::new(HtlcSwapProvider::new()))
		.build();

	Ok(Client::new(stack))
}

fn setup_tracing(log_level: &str) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer())
		.init();

	Ok(())
}
