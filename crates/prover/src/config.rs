//! Prover configuration.

use alloy_primitives::Address;
use std::time::Duration;
use url::Url;

/// Runtime configuration of the prover, lowered from CLI flags.
#[derive(Debug, Clone)]
pub struct Config {
    /// Settlement-chain RPC endpoint.
    pub l1_rpc_url: Url,
    /// Rollup-node RPC endpoint.
    pub l2_rpc_url: Url,
    /// Private key of the submitter identity.
    pub l1_wallet_key: String,
    /// Address-manager contract the settlement contracts resolve through.
    pub address_manager: Address,
    /// Gas limit for commit and code-carrier submissions.
    pub deploy_gas_limit: u64,
    /// Gas limit for the on-chain transaction replay.
    pub run_gas_limit: u64,
    /// Sleep between driver-loop polls.
    pub polling_interval: Duration,
    /// Offset between the global index space and rollup block numbers.
    pub block_offset: u64,
    /// Global index scanning starts from.
    pub from_index: u64,
}
