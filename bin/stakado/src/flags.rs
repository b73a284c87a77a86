//! Prover configuration flags.

use alloy_primitives::Address;
use clap::Args;
use stakado_prover::Config;
use std::time::Duration;
use url::Url;

/// Prover configuration arguments.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ProverArgs {
    /// Settlement-chain RPC endpoint.
    #[arg(long = "l1-rpc-url", env = "L1_RPC_URL")]
    pub l1_rpc_url: Url,

    /// Rollup-node RPC endpoint.
    #[arg(long = "l2-rpc-url", env = "L2_RPC_URL")]
    pub l2_rpc_url: Url,

    /// Private key of the submitter identity.
    #[arg(long = "l1-wallet-key", env = "L1_WALLET_KEY")]
    pub l1_wallet_key: String,

    /// Address-manager contract the settlement contracts resolve through.
    #[arg(long = "address-manager", env = "ADDRESS_MANAGER")]
    pub address_manager: Address,

    /// Gas limit for commit and code-carrier submissions.
    #[arg(long = "deploy-gas-limit", env = "DEPLOY_GAS_LIMIT", default_value_t = 4_000_000)]
    pub deploy_gas_limit: u64,

    /// Gas limit for the on-chain transaction replay.
    #[arg(long = "run-gas-limit", env = "RUN_GAS_LIMIT", default_value_t = 95_000_000)]
    pub run_gas_limit: u64,

    /// Polling interval of the driver loop, in milliseconds.
    #[arg(long = "polling-interval", env = "POLLING_INTERVAL", default_value_t = 5_000)]
    pub polling_interval: u64,

    /// Offset between the global index space and rollup block numbers.
    #[arg(long = "block-offset", env = "BLOCK_OFFSET", default_value_t = 1)]
    pub block_offset: u64,

    /// Global index scanning starts from.
    #[arg(long = "from-index", env = "FROM_INDEX", default_value_t = 0)]
    pub from_index: u64,
}

impl ProverArgs {
    /// Lowers the flags into the prover [`Config`].
    pub fn config(&self) -> Config {
        Config {
            l1_rpc_url: self.l1_rpc_url.clone(),
            l2_rpc_url: self.l2_rpc_url.clone(),
            l1_wallet_key: self.l1_wallet_key.clone(),
            address_manager: self.address_manager,
            deploy_gas_limit: self.deploy_gas_limit,
            run_gas_limit: self.run_gas_limit,
            polling_interval: Duration::from_millis(self.polling_interval),
            block_offset: self.block_offset,
            from_index: self.from_index,
        }
    }
}
