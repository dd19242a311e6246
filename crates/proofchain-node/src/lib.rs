use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use proofchain_core::constants::{MINING_REWARD, MINT_SENDER};
use proofchain_core::{consensus, miner, pow, CandidateChain, Ledger};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::warn;

pub mod peers;

const PEER_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared node state. One mutex guards the ledger (chain plus pending
/// pool) so submit/seal/resolve are serialized against each other; it is
/// never held across an await point.
#[derive(Clone)]
pub struct AppState {
    node_id: String,
    ledger: Arc<Mutex<Ledger>>,
    peers: Arc<Mutex<HashSet<String>>>,
    abort_mining: Arc<AtomicBool>,
    http: reqwest::Client,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            node_id: uuid::Uuid::new_v4().simple().to_string(),
            ledger: Arc::new(Mutex::new(Ledger::new())),
            peers: Arc::new(Mutex::new(HashSet::new())),
            abort_mining: Arc::new(AtomicBool::new(false)),
            http: reqwest::Client::new(),
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Normalize and store a peer address. Returns the stored authority, or
    /// `None` if the address cannot be reduced to one.
    pub fn register_peer(&self, address: &str) -> Option<String> {
        let authority = peers::authority(address)?;
        self.peers
            .lock()
            .expect("peer set lock poisoned")
            .insert(authority.clone());
        Some(authority)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/mine", get(mine))
        .route("/transactions/new", post(new_transaction))
        .route("/chain", get(full_chain))
        .route("/nodes/register", post(register_peers))
        .route("/nodes/resolve", get(resolve_conflicts))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

#[derive(Deserialize)]
struct NewTransaction {
    sender: String,
    recipient: String,
    amount: u64,
}

async fn new_transaction(
    State(state): State<AppState>,
    Json(tx): Json<NewTransaction>,
) -> Response {
    let index = state
        .ledger
        .lock()
        .expect("ledger lock poisoned")
        .submit_transaction(tx.sender, tx.recipient, tx.amount);
    (
        StatusCode::CREATED,
        Json(json!({
            "message": format!("transaction will be included in block {index}")
        })),
    )
        .into_response()
}

async fn full_chain(State(state): State<AppState>) -> Json<CandidateChain> {
    let ledger = state.ledger.lock().expect("ledger lock poisoned");
    Json(CandidateChain {
        chain: ledger.chain().to_vec(),
        length: ledger.len(),
    })
}

/// Solve the puzzle against the current last block, then seal the pool plus
/// the mining reward into a new block. The search runs on a blocking thread
/// with the shared abort flag, so a consensus replacement can cancel it; a
/// chain that moved underneath the miner is detected when the lock is
/// reacquired and answered with 409.
async fn mine(State(state): State<AppState>) -> Response {
    let last_proof = state
        .ledger
        .lock()
        .expect("ledger lock poisoned")
        .last_block()
        .proof;

    state.abort_mining.store(false, Ordering::Relaxed);
    let abort = state.abort_mining.clone();
    let solved =
        tokio::task::spawn_blocking(move || miner::solve_interruptible(last_proof, &abort)).await;

    let Ok(Some(proof)) = solved else {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "message": "mining aborted: chain replaced during search" })),
        )
            .into_response();
    };

    let mut ledger = state.ledger.lock().expect("ledger lock poisoned");
    if !pow::verify(ledger.last_block().proof, proof) {
        // chain replaced between snapshot and seal
        return (
            StatusCode::CONFLICT,
            Json(json!({ "message": "stale proof: chain advanced during search" })),
        )
            .into_response();
    }
    ledger.submit_transaction(MINT_SENDER.to_string(), state.node_id.clone(), MINING_REWARD);
    match ledger.seal_block(proof, None) {
        Ok(block) => Json(json!({
            "message": "new block forged",
            "index": block.index,
            "transactions": block.transactions,
            "proof": block.proof,
            "previous_hash": block.previous_hash,
        }))
        .into_response(),
        Err(err) => (
            StatusCode::CONFLICT,
            Json(json!({ "message": err.to_string() })),
        )
            .into_response(),
    }
}

#[derive(Deserialize)]
struct RegisterPeers {
    nodes: Vec<String>,
}

async fn register_peers(
    State(state): State<AppState>,
    Json(body): Json<RegisterPeers>,
) -> Response {
    if body.nodes.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "please supply a non-empty list of peer addresses" })),
        )
            .into_response();
    }
    for node in &body.nodes {
        if state.register_peer(node).is_none() {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": format!("invalid peer address: {node}") })),
            )
                .into_response();
        }
    }
    let total: Vec<String> = {
        let peers = state.peers.lock().expect("peer set lock poisoned");
        peers.iter().cloned().collect()
    };
    (
        StatusCode::CREATED,
        Json(json!({
            "message": "new peers have been registered",
            "total_peers": total,
        })),
    )
        .into_response()
}

/// Fetch every registered peer's chain, drop the unreachable or malformed
/// ones, and apply the longest-valid-chain rule as one atomic decision
/// under the ledger lock. A replacement cancels any in-flight mining.
async fn resolve_conflicts(State(state): State<AppState>) -> Response {
    let peers: Vec<String> = {
        let peers = state.peers.lock().expect("peer set lock poisoned");
        peers.iter().cloned().collect()
    };

    let mut candidates = HashMap::new();
    for peer in peers {
        match fetch_chain(&state.http, &peer).await {
            Ok(candidate) => {
                candidates.insert(peer, candidate);
            }
            Err(err) => warn!(peer = %peer, error = %err, "skipping unreachable peer"),
        }
    }

    let outcome = {
        let mut ledger = state.ledger.lock().expect("ledger lock poisoned");
        let outcome = consensus::resolve(&mut ledger, &candidates);
        if outcome.replaced {
            state.abort_mining.store(true, Ordering::Relaxed);
        }
        outcome
    };

    if outcome.replaced {
        Json(json!({
            "message": "our chain was replaced",
            "new_chain": outcome.chain,
        }))
        .into_response()
    } else {
        Json(json!({
            "message": "our chain is authoritative",
            "chain": outcome.chain,
        }))
        .into_response()
    }
}

async fn fetch_chain(http: &reqwest::Client, peer: &str) -> anyhow::Result<CandidateChain> {
    let response = http
        .get(format!("http://{peer}/chain"))
        .timeout(PEER_FETCH_TIMEOUT)
        .send()
        .await?
        .error_for_status()?;
    Ok(response.json::<CandidateChain>().await?)
}
