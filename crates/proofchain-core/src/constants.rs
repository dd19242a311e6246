/// Leading zero hex digits a proof digest must carry. Fixed; there is no
/// retargeting.
pub const DIFFICULTY: u32 = 4;
/// Proof recorded in the genesis block. Never verified.
pub const GENESIS_PROOF: u64 = 100;
/// Sentinel previous-hash marking the genesis block as trusted by
/// construction rather than derived from a predecessor.
pub const GENESIS_PREVIOUS_HASH: &str = "1";
/// Reward credited for sealing a block.
pub const MINING_REWARD: u64 = 1;
/// Sender identity denoting system-minted issuance.
pub const MINT_SENDER: &str = "0";
