use crate::ledger::Ledger;
use crate::Block;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// A peer's view of the chain, in the wire shape served by `/chain`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CandidateChain {
    pub chain: Vec<Block>,
    pub length: usize,
}

#[derive(Clone, Debug)]
pub struct ResolutionOutcome {
    pub replaced: bool,
    pub chain: Vec<Block>,
}

/// Longest-valid-chain rule.
///
/// A candidate displaces the current best only if its reported length is
/// strictly greater and the whole chain passes [`Ledger::validate`]; equal
/// lengths never replace. If several candidates share the maximum length the
/// winner follows map iteration order, which is arbitrary. When no candidate
/// wins, the local chain is untouched. The pending pool is never touched
/// either way.
pub fn resolve(
    ledger: &mut Ledger,
    candidates: &HashMap<String, CandidateChain>,
) -> ResolutionOutcome {
    let mut best_length = ledger.len();
    let mut best: Option<(&str, &CandidateChain)> = None;

    for (peer, candidate) in candidates {
        if candidate.length <= best_length {
            continue;
        }
        if !Ledger::validate(&candidate.chain) {
            debug!(peer = %peer, length = candidate.length, "rejected invalid candidate chain");
            continue;
        }
        best_length = candidate.length;
        best = Some((peer.as_str(), candidate));
    }

    match best {
        Some((peer, candidate)) => {
            info!(peer = %peer, length = candidate.length, "adopting longer valid chain");
            ledger.replace_chain(candidate.chain.clone());
            ResolutionOutcome {
                replaced: true,
                chain: ledger.chain().to_vec(),
            }
        }
        None => ResolutionOutcome {
            replaced: false,
            chain: ledger.chain().to_vec(),
        },
    }
}
