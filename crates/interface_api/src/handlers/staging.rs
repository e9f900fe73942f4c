//! Import and approval handlers for invoices and payments
//!
//! Imports answer `200` even when some rows fail; the per-row errors are in
//! the body. Approvals and rejections do the same per id. Only an
//! unreachable store fails the whole request. An id staged under the other
//! kind is reported as a per-id error by the route it was sent to.

use axum::{extract::State, Json};
use domain_staging::{IngestReport, StagingKind, StagingRecord};
use validator::Validate;

use crate::dto::staging::*;
use crate::{error::ApiError, AppState};

/// Stages spreadsheet invoice rows
pub async fn import_invoices(
    State(state): State<AppState>,
    Json(request): Json<ImportInvoicesRequest>,
) -> Result<Json<IngestReport>, ApiError> {
    request.validate()?;
    Ok(Json(state.service.ingest_invoice_rows(&request.rows).await?))
}

/// Stages pasted bank statement lines
pub async fn import_payments(
    State(state): State<AppState>,
    Json(request): Json<ImportPaymentsRequest>,
) -> Result<Json<IngestReport>, ApiError> {
    request.validate()?;
    Ok(Json(state.service.ingest_payment_text(&request.text).await?))
}

pub async fn pending_invoices(
    State(state): State<AppState>,
) -> Result<Json<Vec<StagingRecord>>, ApiError> {
    Ok(Json(state.service.list_pending(StagingKind::Invoice).await?))
}

pub async fn pending_payments(
    State(state): State<AppState>,
) -> Result<Json<Vec<StagingRecord>>, ApiError> {
    Ok(Json(state.service.list_pending(StagingKind::Payment).await?))
}

/// Approves staged invoices, each id in its own transaction
pub async fn approve_invoices(
    state: State<AppState>,
    request: Json<DecisionRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    approve(state, request, StagingKind::Invoice).await
}

/// Approves staged payments, each id in its own transaction
pub async fn approve_payments(
    state: State<AppState>,
    request: Json<DecisionRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    approve(state, request, StagingKind::Payment).await
}

/// Rejects staged invoices without touching the ledger
pub async fn reject_invoices(
    state: State<AppState>,
    request: Json<DecisionRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    reject(state, request, StagingKind::Invoice).await
}

/// Rejects staged payments without touching the ledger
pub async fn reject_payments(
    state: State<AppState>,
    request: Json<DecisionRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    reject(state, request, StagingKind::Payment).await
}

async fn approve(
    State(state): State<AppState>,
    Json(request): Json<DecisionRequest>,
    kind: StagingKind,
) -> Result<Json<BatchResponse>, ApiError> {
    request.validate()?;
    let report = state.service.approve_batch_of(kind, &request.ids).await?;
    Ok(Json(report.into()))
}

async fn reject(
    State(state): State<AppState>,
    Json(request): Json<DecisionRequest>,
    kind: StagingKind,
) -> Result<Json<BatchResponse>, ApiError> {
    request.validate()?;
    let report = state.service.reject_batch_of(kind, &request.ids).await?;
    Ok(Json(report.into()))
}
