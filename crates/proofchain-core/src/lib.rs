use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

pub mod consensus;
pub mod constants;
pub mod error;
pub mod ledger;
pub mod miner;

pub use consensus::{resolve, CandidateChain, ResolutionOutcome};
pub use error::ChainError;
pub use ledger::Ledger;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: u64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_secs()
}

/// Canonical SHA-256 digest of a block, rendered as lowercase hex.
///
/// The block is serialized through `serde_json::Value`, whose object map is
/// keyed by a `BTreeMap`, so the encoding is key-sorted and independent of
/// field declaration order. Two structurally equal blocks always produce the
/// same digest.
pub fn block_digest(block: &Block) -> String {
    let value = serde_json::to_value(block).expect("block serializes to JSON");
    hex::encode(Sha256::digest(value.to_string().as_bytes()))
}

pub mod pow {
    use super::constants::DIFFICULTY;
    use sha2::{Digest, Sha256};

    /// Check whether `candidate` is a valid proof following `previous_proof`:
    /// the SHA-256 digest of the decimal text `{previous_proof}{candidate}`
    /// must start with `DIFFICULTY` zero hex digits.
    pub fn verify(previous_proof: u64, candidate: u64) -> bool {
        let guess = format!("{previous_proof}{candidate}");
        let digest = Sha256::digest(guess.as_bytes());
        leading_zero_nibbles(&digest) >= DIFFICULTY
    }

    /// Find the smallest proof following `previous_proof` by sequential
    /// search from zero. Termination rests on the uniform, non-zero density
    /// of solutions in the nonce space; this is an engineering assumption,
    /// not a proven bound. Callers that need bounded latency should use
    /// [`crate::miner::solve_interruptible`] instead.
    pub fn solve(previous_proof: u64) -> u64 {
        let mut proof = 0u64;
        while !verify(previous_proof, proof) {
            proof += 1;
        }
        proof
    }

    pub fn leading_zero_nibbles(digest: &[u8]) -> u32 {
        let mut total = 0u32;
        for b in digest {
            if *b == 0 {
                total += 2;
            } else {
                if *b >> 4 == 0 {
                    total += 1;
                }
                break;
            }
        }
        total
    }
}
