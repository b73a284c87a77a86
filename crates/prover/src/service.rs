//! The periodic driver loop.

use crate::{
    BytecodeDeployer, Config, PhaseDriver, ProverError, Scanner, VerifierHandle, witness,
};
use alloy_provider::Provider;
use backon::{ConstantBuilder, Retryable};
use stakado_providers::{RollupView, SettlementView};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Boot-time connection attempts per endpoint.
const BOOT_ATTEMPTS: usize = 10;

/// Spacing between boot-time connection attempts.
const BOOT_DELAY: Duration = Duration::from_secs(1);

/// Probes both RPC endpoints, retrying each up to ten times with one-second
/// spacing before escalating to a fatal error.
pub async fn probe_endpoints<P1, P2>(settlement: &P1, rollup: &P2) -> Result<(), ProverError>
where
    P1: Provider,
    P2: Provider,
{
    (|| async { settlement.get_chain_id().await })
        .retry(ConstantBuilder::default().with_delay(BOOT_DELAY).with_max_times(BOOT_ATTEMPTS))
        .await
        .map_err(|err| ProverError::Fatal(format!("settlement endpoint unreachable: {err}")))?;
    (|| async { rollup.get_chain_id().await })
        .retry(ConstantBuilder::default().with_delay(BOOT_DELAY).with_max_times(BOOT_ATTEMPTS))
        .await
        .map_err(|err| ProverError::Fatal(format!("rollup endpoint unreachable: {err}")))?;
    Ok(())
}

/// The cooperative prover loop.
///
/// Each tick runs the scanner and, on a mismatch, assembles the witness and
/// drives the dispute. Dispute-level failures are logged and retried on the
/// next poll without advancing the cursor; cancellation is honored between
/// polls only, so an in-flight dispute runs to completion.
#[derive(Debug)]
pub struct Prover<L1, L2, V, D> {
    settlement: L1,
    rollup: L2,
    verifier: V,
    deployer: D,
    scanner: Scanner,
    polling_interval: Duration,
    block_offset: u64,
}

impl<L1, L2, V, D> Prover<L1, L2, V, D>
where
    L1: SettlementView,
    L2: RollupView,
    V: VerifierHandle,
    D: BytecodeDeployer,
{
    /// Creates the prover from its collaborators and configuration.
    pub fn new(settlement: L1, rollup: L2, verifier: V, deployer: D, config: &Config) -> Self {
        Self {
            settlement,
            rollup,
            verifier,
            deployer,
            scanner: Scanner::new(config.from_index, config.block_offset),
            polling_interval: config.polling_interval,
            block_offset: config.block_offset,
        }
    }

    /// Runs the loop until the cancellation token fires.
    pub async fn run(mut self, cancellation: CancellationToken) {
        info!(
            target: "prover",
            from_index = self.scanner.cursor(),
            interval_ms = self.polling_interval.as_millis() as u64,
            "Starting fraud prover loop"
        );
        loop {
            tokio::select! {
                _ = cancellation.cancelled() => {
                    info!(target: "prover", "Cancellation requested, stopping");
                    break;
                }
                _ = tokio::time::sleep(self.polling_interval) => {
                    match self.tick().await {
                        Ok(()) => {}
                        Err(ProverError::Fatal(reason)) => {
                            error!(target: "prover", reason, "Fatal error, stopping");
                            break;
                        }
                        Err(err) => {
                            error!(
                                target: "prover",
                                %err,
                                cursor = self.scanner.cursor(),
                                "Dispute aborted; retrying on the next poll"
                            );
                        }
                    }
                }
            }
        }
    }

    /// One poll: scan, and on a hit, prove.
    async fn tick(&mut self) -> Result<(), ProverError> {
        let Some(index) = self.scanner.next_mismatch(&self.settlement, &self.rollup).await? else {
            return Ok(());
        };
        warn!(target: "prover", index, "State root mismatch detected");

        let mut data =
            witness::assemble(&self.settlement, &self.rollup, index, self.block_offset).await?;
        let driver =
            PhaseDriver::new(&self.verifier, &self.deployer, &self.rollup, self.block_offset);
        let next = driver.drive(index, &mut data).await?;

        info!(target: "prover", index, next_cursor = next, "Dispute resolved");
        self.scanner.rewind(next);
        Ok(())
    }
}
