//! Posting and account listings

use axum::{
    extract::{Query, State},
    Json,
};
use domain_ledger::Posting;
use domain_staging::Account;

use crate::dto::ledger::PostingQuery;
use crate::{error::ApiError, AppState};

/// Lists approved postings, optionally by client and kind
pub async fn list_postings(
    State(state): State<AppState>,
    Query(query): Query<PostingQuery>,
) -> Result<Json<Vec<Posting>>, ApiError> {
    Ok(Json(state.service.list_postings(query.into()).await?))
}

/// Lists the chart of accounts
pub async fn list_accounts(State(state): State<AppState>) -> Result<Json<Vec<Account>>, ApiError> {
    Ok(Json(state.service.list_accounts().await?))
}
