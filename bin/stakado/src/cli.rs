//! Contains the prover CLI.

use crate::flags::ProverArgs;
use alloy_network::EthereumWallet;
use alloy_provider::{ProviderBuilder, RootProvider};
use alloy_signer_local::PrivateKeySigner;
use anyhow::{Context, Result};
use clap::Parser;
use stakado_prover::{AlloyVerifier, CodeDeployer, Config, Prover, probe_endpoints, resolve_addresses};
use stakado_providers::{AlloyRollupView, AlloySettlementView};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// The format of the logs.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[clap(rename_all = "lowercase")]
pub enum LogFormat {
    /// Full format (default).
    #[default]
    Full,
    /// JSON format.
    Json,
    /// Compact format.
    Compact,
}

/// The prover CLI.
#[derive(Parser, Debug)]
#[command(author, version, about = "Fraud prover for optimistic-rollup state commitments")]
pub struct Cli {
    /// Verbosity level (0-2). Repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub v: u8,

    /// Format of stdout logs.
    #[arg(long = "log-format", default_value = "full")]
    pub log_format: LogFormat,

    /// Prover configuration flags.
    #[command(flatten)]
    pub prover: ProverArgs,
}

impl Cli {
    /// Runs the CLI.
    pub fn run(self) -> Result<()> {
        self.init_tracing()?;
        let config = self.prover.config();
        let rt = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
        rt.block_on(run_prover(config))
    }

    /// Initializes the tracing subscriber from the verbosity flag, letting
    /// `RUST_LOG` override it when set.
    fn init_tracing(&self) -> Result<()> {
        let default_level = match self.v {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));

        let builder = tracing_subscriber::fmt().with_env_filter(filter);
        match self.log_format {
            LogFormat::Full => builder.try_init(),
            LogFormat::Json => builder.json().try_init(),
            LogFormat::Compact => builder.compact().try_init(),
        }
        .map_err(|err| anyhow::anyhow!("failed to initialize tracing: {err}"))
    }
}

/// Wires the providers, resolves the settlement contracts, and runs the
/// prover loop until ctrl-c.
async fn run_prover(config: Config) -> Result<()> {
    let signer: PrivateKeySigner =
        config.l1_wallet_key.parse().context("invalid L1 wallet key")?;
    let wallet = EthereumWallet::from(signer);

    let l1_provider =
        ProviderBuilder::new().wallet(wallet).connect_http(config.l1_rpc_url.clone());
    let l2_provider = RootProvider::new_http(config.l2_rpc_url.clone());

    probe_endpoints(&l1_provider, &l2_provider).await?;
    let addresses = resolve_addresses(l1_provider.clone(), config.address_manager).await?;
    info!(
        target: "stakado",
        fraud_verifier = %addresses.fraud_verifier,
        state_commitment_chain = %addresses.state_commitment_chain,
        "Resolved settlement contracts"
    );

    let settlement = AlloySettlementView::new(
        l1_provider.clone(),
        addresses.state_commitment_chain,
        addresses.canonical_transaction_chain,
    );
    let rollup = AlloyRollupView::new(l2_provider);
    let verifier = AlloyVerifier::new(
        l1_provider.clone(),
        addresses.fraud_verifier,
        config.deploy_gas_limit,
        config.run_gas_limit,
    );
    let deployer = CodeDeployer::new(l1_provider, config.deploy_gas_limit);
    let prover = Prover::new(settlement, rollup, verifier, deployer, &config);

    let cancellation = CancellationToken::new();
    let handle = tokio::spawn(prover.run(cancellation.clone()));

    tokio::signal::ctrl_c().await?;
    info!(target: "stakado", "Received ctrl-c; letting any in-flight dispute finish");
    cancellation.cancel();
    handle.await?;
    Ok(())
}
