//! The mismatch scanner.

use crate::ProverError;
use stakado_protocol::GlobalIndex;
use stakado_providers::{RollupView, SettlementView};
use tracing::trace;

/// A linear cursor over state-root indices locating the next disagreement
/// between the settlement chain and the rollup node.
///
/// The cursor is the only process-persistent datum of the prover: it
/// advances monotonically past verified roots and is only ever rewound by
/// the phase driver's post-dispute reset.
#[derive(Debug, Clone, Copy)]
pub struct Scanner {
    cursor: GlobalIndex,
    block_offset: u64,
}

impl Scanner {
    /// Creates a scanner starting at `from_index`.
    pub const fn new(from_index: GlobalIndex, block_offset: u64) -> Self {
        Self { cursor: from_index, block_offset }
    }

    /// The next unverified state-root index.
    pub const fn cursor(&self) -> GlobalIndex {
        self.cursor
    }

    /// Resets the cursor, used by the post-dispute rewind.
    pub const fn rewind(&mut self, cursor: GlobalIndex) {
        self.cursor = cursor;
    }

    /// Walks forward from the cursor comparing committed and locally
    /// computed state roots.
    ///
    /// Returns the first disagreeing index, leaving the cursor on it, or
    /// `None` once the settlement chain is caught up without a mismatch.
    pub async fn next_mismatch<L1, L2>(
        &mut self,
        settlement: &L1,
        rollup: &L2,
    ) -> Result<Option<GlobalIndex>, ProverError>
    where
        L1: SettlementView + ?Sized,
        L2: RollupView + ?Sized,
    {
        loop {
            if settlement.state_root_batch_header(self.cursor).await?.is_none() {
                trace!(target: "prover::scanner", cursor = self.cursor, "Caught up with the chain tip");
                return Ok(None);
            }

            let committed = settlement.state_root(self.cursor).await?;
            let local = rollup.state_root(self.cursor + self.block_offset).await?;
            if committed != local {
                return Ok(Some(self.cursor));
            }

            self.cursor += 1;
        }
    }
}
