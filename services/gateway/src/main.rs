use std::sync::Arc;
use std::time::Duration;

use gateway::router::create_router;
use gateway::state::AppState;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use mirror::ingestion::EventIngester;
use mirror::ledger::{ArtworkCatalog, LedgerReader};
use mirror::reconcile::Reconciler;
use mirror::rpc::{HttpCatalog, HttpLedger};
use mirror::store::MirrorStore;
use types::ids::Address;

/// Deployment configuration, read from the environment with defaults
/// matching the reference deployment.
struct Config {
    port: u16,
    ledger_rpc_url: String,
    artwork_api_url: String,
    asset_contract: Address,
    poll_interval: Duration,
    read_timeout: Duration,
}

impl Config {
    fn from_env() -> Self {
        Self {
            port: env_or("GATEWAY_PORT", "4006").parse().unwrap_or(4006),
            ledger_rpc_url: env_or("LEDGER_RPC_URL", "http://localhost:8545"),
            artwork_api_url: env_or("ARTWORK_API_URL", "http://localhost:4005"),
            asset_contract: Address::new(env_or(
                "ASSET_CONTRACT_ADDRESS",
                "0x85a4ce9d57188f598a8a8f708d4e9c12c51b6d74",
            )),
            poll_interval: Duration::from_secs(
                env_or("LEDGER_POLL_INTERVAL_SECS", "5").parse().unwrap_or(5),
            ),
            read_timeout: Duration::from_millis(
                env_or("LEDGER_READ_TIMEOUT_MS", "3000").parse().unwrap_or(3000),
            ),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    tracing::info!(
        ledger_rpc_url = %config.ledger_rpc_url,
        artwork_api_url = %config.artwork_api_url,
        "Starting marketplace gateway"
    );

    let store = Arc::new(MirrorStore::new());
    let ledger = HttpLedger::new(config.ledger_rpc_url.clone(), config.read_timeout);
    let ledger_reader: Arc<dyn LedgerReader> = Arc::new(ledger.clone());
    let catalog: Arc<dyn ArtworkCatalog> =
        Arc::new(HttpCatalog::new(config.artwork_api_url, config.read_timeout));
    let reconciler = Arc::new(Reconciler::new(
        Arc::clone(&store),
        ledger_reader,
        config.read_timeout,
    ));

    // Single long-lived event subscription for this deployment
    let ingester = Arc::new(EventIngester::new(Arc::clone(&store), Arc::clone(&catalog)));
    let poll_interval = config.poll_interval;
    tokio::spawn({
        let ingester = Arc::clone(&ingester);
        async move { ingester.run(ledger, poll_interval).await }
    });

    let state = AppState::new(store, reconciler, catalog, config.asset_contract);
    let app = create_router(state);

    // Bind and serve
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
