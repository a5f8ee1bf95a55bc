//! Request handlers
//!
//! Each handler decodes the inbound request into validated primitive
//! values, dispatches to the ledger, and translates the outcome to a
//! status code. Malformed input is rejected here with the expected-format
//! message; it never reaches the core.

use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::AppState;
use crate::core::AccountRepository;
use crate::types::AccountId;

/// Message returned for any malformed transfer request
pub const EXPECTED_FORMAT: &str =
    "Expected format: /transfer/<Decimal>?from=<AccountId>&to=<AccountId>";

/// Raw query parameters of a transfer request, before validation
#[derive(Debug, Deserialize)]
pub struct TransferParams {
    /// Debit-side account id, as sent on the wire
    pub from: Option<String>,
    /// Credit-side account id, as sent on the wire
    pub to: Option<String>,
}

/// Body of an account-creation request
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    /// Opening balance, carried as a decimal string
    pub initial_balance: Decimal,
}

/// Body of an account-creation response
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateAccountResponse {
    /// The freshly assigned account id
    pub id: AccountId,
}

/// Body of a balance lookup response
#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    /// The account id queried
    pub id: AccountId,
    /// Current balance, carried as a decimal string
    pub balance: Decimal,
}

/// Service banner
pub async fn get_index() -> &'static str {
    "Transfer Engine"
}

/// `POST /transfer/{sum}?from=<id>&to=<id>`
///
/// Moves `sum` between the two accounts; `204 No Content` on success.
pub async fn post_transfer<R: AccountRepository>(
    State(state): State<AppState<R>>,
    Path(sum): Path<String>,
    Query(params): Query<TransferParams>,
) -> Result<StatusCode, ApiError> {
    let sum = Decimal::from_str(&sum).map_err(|_| ApiError::bad_request(EXPECTED_FORMAT))?;
    let from = parse_account_id(params.from.as_deref())?;
    let to = parse_account_id(params.to.as_deref())?;

    state.ledger.transfer(sum, from, to).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// `POST /accounts` — create an account with an opening balance
///
/// Setup/testing affordance mirroring the core's creation API.
pub async fn post_account<R: AccountRepository>(
    State(state): State<AppState<R>>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<CreateAccountResponse>), ApiError> {
    let id = state.ledger.create_account(request.initial_balance)?;

    Ok((StatusCode::CREATED, Json(CreateAccountResponse { id })))
}

/// `GET /accounts/{id}/balance` — point-in-time balance snapshot
pub async fn get_balance<R: AccountRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<AccountId>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = state.ledger.balance(id)?;

    Ok(Json(BalanceResponse { id, balance }))
}

/// Parse an account id query parameter, rejecting absent or non-numeric ids
fn parse_account_id(raw: Option<&str>) -> Result<AccountId, ApiError> {
    raw.and_then(|value| value.parse::<AccountId>().ok())
        .ok_or_else(|| ApiError::bad_request(EXPECTED_FORMAT))
}
