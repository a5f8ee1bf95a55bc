//! HTTP transport module
//!
//! The REST surface over the ledger:
//!
//! - `POST /transfer/{sum}?from=<id>&to=<id>` — move funds, 204 on success
//! - `POST /accounts` — create an account (setup/testing affordance)
//! - `GET /accounts/{id}/balance` — balance snapshot
//! - `GET /` — service banner
//!
//! # Components
//!
//! - `handlers` - Request decoding and dispatch to the ledger
//! - `error` - `TransferError` to status-code translation

pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::core::{AccountRepository, LedgerService};

pub use error::ApiError;
pub use handlers::{BalanceResponse, CreateAccountRequest, CreateAccountResponse};

/// Shared state handed to every handler
pub struct AppState<R> {
    /// The ledger service all requests dispatch to
    pub ledger: Arc<LedgerService<R>>,
}

// Manual impl: R itself need not be Clone, only the Arc is cloned.
impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        AppState {
            ledger: Arc::clone(&self.ledger),
        }
    }
}

impl<R> AppState<R> {
    /// Create the shared state over a ledger service
    pub fn new(ledger: LedgerService<R>) -> Self {
        AppState {
            ledger: Arc::new(ledger),
        }
    }
}

/// Return a router with all the service's routes
pub fn build_router<R: AccountRepository + 'static>(state: AppState<R>) -> Router {
    Router::new()
        .route("/", get(handlers::get_index))
        .route("/transfer/{sum}", post(handlers::post_transfer::<R>))
        .route("/accounts", post(handlers::post_account::<R>))
        .route("/accounts/{id}/balance", get(handlers::get_balance::<R>))
        .with_state(state)
}
