use anyhow::Result;
use clap::Parser;
use proofchain_node::{build_router, AppState};
use std::net::SocketAddr;
use tracing::{info, warn, Level};

#[derive(Parser, Debug)]
struct Args {
    /// Address to listen on, e.g. 127.0.0.1:8080
    #[arg(long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// Peer authorities (host:port) to register at startup; repeatable
    #[arg(long = "peer")]
    peers: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let state = AppState::new();
    info!(node_id = state.node_id(), "node identity generated");

    for peer in &args.peers {
        match state.register_peer(peer) {
            Some(authority) => info!(peer = %authority, "registered startup peer"),
            None => warn!(peer = %peer, "ignoring malformed startup peer"),
        }
    }

    let app = build_router(state);
    let addr: SocketAddr = args.listen.parse()?;
    info!("proofchain-node listening on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}
