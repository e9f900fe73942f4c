//! Client registry and statement handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use core_kernel::ClientId;
use validator::Validate;

use crate::dto::clients::*;
use crate::{error::ApiError, AppState};

/// Lists registered clients
pub async fn list_clients(
    State(state): State<AppState>,
) -> Result<Json<Vec<ClientResponse>>, ApiError> {
    let clients = state.service.list_clients().await?;
    Ok(Json(clients.into_iter().map(ClientResponse::from).collect()))
}

/// Registers a client
pub async fn create_client(
    State(state): State<AppState>,
    Json(request): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<ClientResponse>), ApiError> {
    request.validate()?;
    let client = state.service.register_client(request.into()).await?;
    Ok((StatusCode::CREATED, Json(client.into())))
}

/// Gets a client by ID
pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ClientResponse>, ApiError> {
    let client = state.service.get_client(ClientId::new(id)).await?;
    Ok(Json(client.into()))
}

/// Updates a client's registry data
pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateClientRequest>,
) -> Result<Json<ClientResponse>, ApiError> {
    request.validate()?;
    let client = state
        .service
        .update_client(ClientId::new(id), request.into())
        .await?;
    Ok(Json(client.into()))
}

/// Deletes a client without postings
pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_client(ClientId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Computes a client's statement
pub async fn get_statement(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<StatementResponse>, ApiError> {
    let statement = state.service.compute_statement(ClientId::new(id)).await?;
    Ok(Json(statement.into()))
}
