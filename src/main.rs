//! Transfer Engine server
//!
//! Serves the transfer REST API over an in-process key-value store.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --port 7000
//! cargo run -- --port 7000 --max-retries 10 --backoff-ms 1
//! ```
//!
//! Logging is controlled through `RUST_LOG` (e.g. `RUST_LOG=debug` to see
//! per-request repository activity and conflict retries).

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use transfer_engine::{build_router, cli, AppState, KvAccountRepository, LedgerService, MemoryStore};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = cli::parse_args();

    let store = Arc::new(MemoryStore::new());
    let repository = Arc::new(KvAccountRepository::new(store));
    let ledger = LedgerService::with_retry_policy(repository, args.to_retry_policy());
    let router = build_router(AppState::new(ledger));

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("could not bind the REST port");

    tracing::info!("HTTP server listening on {}", addr);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

/// Wait for either ctrl+c or the terminate signal, whichever comes first.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::debug!("Received ctrl+c signal."),
        _ = terminate => tracing::debug!("Received terminate signal."),
    }
}
