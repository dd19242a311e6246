use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ChainError {
    /// A candidate chain failed the pairwise hash/proof walk.
    #[error("candidate chain failed validation")]
    InvalidChain,

    /// A supplied proof does not satisfy the work requirement against the
    /// proof it claims to follow.
    #[error("proof {proof} does not satisfy the work requirement after proof {previous_proof}")]
    InvalidProof { previous_proof: u64, proof: u64 },

    /// The chain has no blocks. Unreachable while the genesis invariant
    /// holds; observing it means internal state is corrupt.
    #[error("ledger chain is empty")]
    EmptyChain,
}
