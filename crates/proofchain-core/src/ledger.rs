use crate::constants::{GENESIS_PREVIOUS_HASH, GENESIS_PROOF};
use crate::error::ChainError;
use crate::{block_digest, pow, unix_now, Block, Transaction};
use tracing::debug;

/// The chain plus the pool of transactions awaiting the next block.
///
/// The chain is never empty: a genesis block is created at construction and
/// survives until a wholesale replacement installs another chain (which, if
/// it passed [`Ledger::validate`], is itself non-empty).
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        let genesis = Block {
            index: 1,
            timestamp: unix_now(),
            transactions: Vec::new(),
            proof: GENESIS_PROOF,
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
        };
        Self {
            chain: vec![genesis],
            pending: Vec::new(),
        }
    }

    /// Queue a transaction for the next block. Returns the index of the
    /// block that will contain it.
    pub fn submit_transaction(&mut self, sender: String, recipient: String, amount: u64) -> u64 {
        self.pending.push(Transaction {
            sender,
            recipient,
            amount,
        });
        self.chain.len() as u64 + 1
    }

    /// Seal the pending pool into a new block and append it.
    ///
    /// The proof is expected to come from [`pow::solve`] against the last
    /// block's proof; it is re-verified here and an unproven block is
    /// rejected rather than silently accepted. `previous_hash` defaults to
    /// the digest of the current last block. The pool is cleared in the same
    /// step, so callers holding exclusive access see submit/seal as atomic.
    pub fn seal_block(
        &mut self,
        proof: u64,
        previous_hash: Option<String>,
    ) -> Result<Block, ChainError> {
        let last = self.chain.last().ok_or(ChainError::EmptyChain)?;
        if !pow::verify(last.proof, proof) {
            return Err(ChainError::InvalidProof {
                previous_proof: last.proof,
                proof,
            });
        }
        let previous_hash = previous_hash.unwrap_or_else(|| block_digest(last));

        let block = Block {
            index: self.chain.len() as u64 + 1,
            timestamp: unix_now(),
            transactions: std::mem::take(&mut self.pending),
            proof,
            previous_hash,
        };
        self.chain.push(block.clone());
        debug!(
            index = block.index,
            transactions = block.transactions.len(),
            "sealed block"
        );
        Ok(block)
    }

    pub fn last_block(&self) -> &Block {
        self.chain.last().expect("chain always holds a genesis block")
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    /// Walk a candidate chain and check every link: each block's
    /// `previous_hash` must match the digest of its predecessor in the
    /// candidate sequence, and each proof must verify against its
    /// predecessor's proof. A single-block chain is trivially valid; an
    /// empty sequence is not. The candidate's own genesis is accepted as
    /// given and not cross-checked against the local one.
    pub fn validate(candidate: &[Block]) -> bool {
        let Some(mut last) = candidate.first() else {
            return false;
        };
        for block in &candidate[1..] {
            if block.previous_hash != block_digest(last) {
                return false;
            }
            if !pow::verify(last.proof, block.proof) {
                return false;
            }
            last = block;
        }
        true
    }

    /// Wholesale chain replacement. Only the consensus resolver calls this;
    /// the pending pool is deliberately left untouched.
    pub(crate) fn replace_chain(&mut self, chain: Vec<Block>) {
        self.chain = chain;
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ledger_has_valid_genesis_chain() {
        let ledger = Ledger::new();
        assert_eq!(ledger.len(), 1);
        assert!(Ledger::validate(ledger.chain()));

        let genesis = ledger.last_block();
        assert_eq!(genesis.index, 1);
        assert_eq!(genesis.proof, GENESIS_PROOF);
        assert_eq!(genesis.previous_hash, GENESIS_PREVIOUS_HASH);
        assert!(genesis.transactions.is_empty());
        assert!(ledger.pending().is_empty());
    }

    #[test]
    fn submit_returns_next_block_index() {
        let mut ledger = Ledger::new();
        let index = ledger.submit_transaction("alice".into(), "bob".into(), 10);
        assert_eq!(index, 2);
        let index = ledger.submit_transaction("bob".into(), "charlie".into(), 5);
        assert_eq!(index, 2);
        assert_eq!(ledger.pending().len(), 2);
    }

    #[test]
    fn seal_commits_pending_in_submission_order_and_clears_pool() {
        let mut ledger = Ledger::new();
        for i in 0..5u64 {
            ledger.submit_transaction(format!("sender-{i}"), format!("recipient-{i}"), i);
        }
        let proof = pow::solve(ledger.last_block().proof);
        let block = ledger.seal_block(proof, None).unwrap();

        assert_eq!(block.index, 2);
        assert_eq!(block.transactions.len(), 5);
        for (i, tx) in block.transactions.iter().enumerate() {
            assert_eq!(tx.sender, format!("sender-{i}"));
            assert_eq!(tx.amount, i as u64);
        }
        assert!(ledger.pending().is_empty());
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn seal_defaults_previous_hash_to_last_block_digest() {
        let mut ledger = Ledger::new();
        let genesis_digest = block_digest(ledger.last_block());
        let proof = pow::solve(ledger.last_block().proof);
        let block = ledger.seal_block(proof, None).unwrap();
        assert_eq!(block.previous_hash, genesis_digest);
    }

    #[test]
    fn seal_rejects_an_unproven_block() {
        let mut ledger = Ledger::new();
        ledger.submit_transaction("alice".into(), "bob".into(), 10);
        let proof = pow::solve(ledger.last_block().proof);
        let bogus = proof + 1;

        let err = ledger.seal_block(bogus, None).unwrap_err();
        assert_eq!(
            err,
            ChainError::InvalidProof {
                previous_proof: GENESIS_PROOF,
                proof: bogus,
            }
        );
        // nothing committed, pool intact
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.pending().len(), 1);
    }

    #[test]
    fn mine_one_block_end_to_end() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.last_block().proof, 100);

        let genesis_digest = block_digest(ledger.last_block());
        let p1 = pow::solve(100);
        let block = ledger.seal_block(p1, Some(genesis_digest.clone())).unwrap();

        assert_eq!(ledger.len(), 2);
        assert_eq!(block.previous_hash, genesis_digest);
        assert!(Ledger::validate(ledger.chain()));
    }

    #[test]
    fn validate_rejects_a_tampered_link() {
        let mut ledger = Ledger::new();
        for _ in 0..2 {
            let proof = pow::solve(ledger.last_block().proof);
            ledger.seal_block(proof, None).unwrap();
        }
        assert!(Ledger::validate(ledger.chain()));

        let mut tampered = ledger.chain().to_vec();
        tampered[1].previous_hash = "0".repeat(64);
        assert!(!Ledger::validate(&tampered));
    }

    #[test]
    fn validate_rejects_a_tampered_proof() {
        let mut ledger = Ledger::new();
        let proof = pow::solve(ledger.last_block().proof);
        ledger.seal_block(proof, None).unwrap();

        let mut tampered = ledger.chain().to_vec();
        tampered[1].proof += 1;
        assert!(!Ledger::validate(&tampered));
    }

    #[test]
    fn validate_edge_cases() {
        assert!(!Ledger::validate(&[]));
        let ledger = Ledger::new();
        assert!(Ledger::validate(ledger.chain())); // single block
    }
}
