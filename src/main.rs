use std::sync::Arc;

use credit_flow::config::ServiceConfig;
use credit_flow::flow::routes::{AppState, flow_routes};
use credit_flow::gateway::create_gateway;
use credit_flow::session::WalletSession;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServiceConfig::from_env()?;

    eprintln!("💳 Credit Flow v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "   Gateway: {}",
        config
            .rpc_url
            .as_deref()
            .unwrap_or("simulated (no CREDIT_FLOW_RPC_URL set)")
    );
    eprintln!("   Contract: {}", config.contract_address);
    eprintln!("   Chain: {}", config.chain_id);
    eprintln!("   API: http://0.0.0.0:{}/api\n", config.port);

    let session = Arc::new(WalletSession::new());
    let gateway = create_gateway(&config, Arc::clone(&session));

    // Flow events feed the log; the SPA polls flow status over REST.
    let (events_tx, mut events_rx) = tokio::sync::mpsc::channel(256);
    tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            tracing::debug!(?event, "Flow event");
        }
    });

    let state = AppState::new(gateway, session, Some(events_tx));
    let app = flow_routes(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "REST server started");
    axum::serve(listener, app).await?;

    Ok(())
}
