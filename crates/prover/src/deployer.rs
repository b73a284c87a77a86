//! Code-carrier deployment.
//!
//! Proving an account's pre-state requires its bytecode to exist on the
//! settlement chain. The deployer publishes a transaction whose init code is
//! a position-independent CODECOPY/RETURN shim followed by the raw runtime
//! bytes, so the created contract's code equals the input byte for byte and
//! none of it is executed during construction.

use crate::{BytecodeDeployer, ProverError};
use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, Bytes, address, hex};
use alloy_provider::Provider;
use alloy_rpc_types_eth::TransactionRequest;
use async_trait::async_trait;
use tracing::debug;

/// Constructor shim: `CODECOPY` everything after these 13 bytes to memory
/// and `RETURN` it as the runtime code.
pub const DEPLOY_CODE_PREFIX: [u8; 13] = hex!("600d380380600d6000396000f3");

/// Carrier standing in for accounts with no code; no deployment is issued
/// for those.
pub const EMPTY_CODE_CARRIER: Address = address!("0000c0De0000C0DE0000c0de0000C0DE0000c0De");

/// Init code deploying `code` verbatim as runtime bytecode.
pub fn carrier_init_code(code: &[u8]) -> Bytes {
    let mut init = Vec::with_capacity(DEPLOY_CODE_PREFIX.len() + code.len());
    init.extend_from_slice(&DEPLOY_CODE_PREFIX);
    init.extend_from_slice(code);
    init.into()
}

/// A [`BytecodeDeployer`] submitting carrier deployments through an alloy
/// provider with a signing wallet attached.
#[derive(Debug, Clone)]
pub struct CodeDeployer<P> {
    provider: P,
    gas_limit: u64,
}

impl<P: Provider> CodeDeployer<P> {
    /// Creates a deployer submitting with the given gas limit.
    pub const fn new(provider: P, gas_limit: u64) -> Self {
        Self { provider, gas_limit }
    }
}

#[async_trait]
impl<P: Provider> BytecodeDeployer for CodeDeployer<P> {
    async fn deploy_code(&self, code: &Bytes) -> Result<Address, ProverError> {
        let request = TransactionRequest::default()
            .with_deploy_code(carrier_init_code(code))
            .with_gas_limit(self.gas_limit);

        let pending = self.provider.send_transaction(request).await?;
        let receipt = pending
            .get_receipt()
            .await
            .map_err(|err| ProverError::Submission(err.to_string()))?;
        if !receipt.status() {
            return Err(ProverError::Submission("code carrier deployment reverted".to_string()));
        }

        let carrier = receipt.contract_address.ok_or_else(|| {
            ProverError::Submission("deployment receipt lacks a contract address".to_string())
        })?;
        debug!(target: "prover::deployer", %carrier, code_len = code.len(), "Deployed code carrier");
        Ok(carrier)
    }
}
