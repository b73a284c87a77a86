//! Revert-message classes treated as cooperative progress.
//!
//! The verifier contracts signal "already done" only through revert strings,
//! so the driver categorizes reverts by literal substring. A peer prover
//! landing a write first produces exactly one of these classes; anything
//! else is a real submission failure.

/// Guard emitted by every phase-gated transitioner entrypoint.
const PHASE_GUARD: &str = "Function must be called during the correct phase";

/// A peer already proved the account or slot.
const ALREADY_PROVEN: &str = "already been proven";

/// A peer initialized the dispute between our read and our write.
const ALREADY_INITIALIZED: &str = "has already been initialized";

/// A peer's commit invalidated our root or consumed our candidate.
const COMMIT_INVALIDATED: [&str; 3] =
    ["invalid opcode", "Invalid root hash", "wasn't changed or has already been committed"];

/// A peer finalized the dispute first.
const FINALIZE_SETTLED: [&str; 2] = ["Invalid batch header.", "Index out of bounds."];

/// The write hit a phase the transitioner already left.
pub(crate) fn is_phase_guard(reason: &str) -> bool {
    reason.contains(PHASE_GUARD)
}

/// The account or slot was proven by a peer.
pub(crate) fn is_already_proven(reason: &str) -> bool {
    reason.contains(ALREADY_PROVEN)
}

/// The dispute was initialized by a peer.
pub(crate) fn is_initialize_race(reason: &str) -> bool {
    reason.contains(ALREADY_INITIALIZED)
}

/// The commit lost a race and must be recomputed from fresh events.
pub(crate) fn is_commit_invalidation(reason: &str) -> bool {
    COMMIT_INVALIDATED.iter().any(|needle| reason.contains(needle))
}

/// The dispute was finalized by a peer.
pub(crate) fn is_finalize_race(reason: &str) -> bool {
    FINALIZE_SETTLED.iter().any(|needle| reason.contains(needle))
}
