use crate::pow;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Nonces tried between looks at the abort flag.
const ABORT_CHECK_INTERVAL: u64 = 4096;

/// Run the proof-of-work search with a cancellation hook.
///
/// Same search as [`pow::solve`], but the abort flag is polled between
/// batches of attempts so a caller can abandon a stale search, e.g. when
/// consensus replaces the chain while mining is in flight. Returns `None`
/// once the flag is observed raised.
pub fn solve_interruptible(previous_proof: u64, abort: &AtomicBool) -> Option<u64> {
    let mut proof = 0u64;
    loop {
        if abort.load(Ordering::Relaxed) {
            info!(previous_proof, attempts = proof, "proof search aborted");
            return None;
        }
        let batch_end = proof.saturating_add(ABORT_CHECK_INTERVAL);
        while proof < batch_end {
            if pow::verify(previous_proof, proof) {
                info!(previous_proof, proof, "proof found");
                return Some(proof);
            }
            proof += 1;
        }
    }
}
