//! HTTP API Layer
//!
//! This crate provides the REST API for the client credit ledger using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for clients, staging and the ledger
//! - **Middleware**: Request ids, tracing and request logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let store = Arc::new(PostgresLedgerStore::new(pool));
//! let app = create_router(store, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;

use std::sync::Arc;

use axum::{
    http::HeaderName,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use domain_staging::{LedgerService, LedgerStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{clients, health, ledger, staging};
use crate::middleware::{request_log_middleware, REQUEST_ID_HEADER};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: LedgerService,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `store` - Ledger storage adapter
/// * `config` - API configuration, including the approval policy
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(store: Arc<dyn LedgerStore>, config: ApiConfig) -> Router {
    let service = LedgerService::new(store, config.approval_policy());
    let state = AppState { service, config };

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let client_routes = Router::new()
        .route("/", get(clients::list_clients).post(clients::create_client))
        .route(
            "/:id",
            get(clients::get_client)
                .put(clients::update_client)
                .delete(clients::delete_client),
        )
        .route("/:id/statement", get(clients::get_statement));

    let invoice_routes = Router::new()
        .route("/import", post(staging::import_invoices))
        .route("/staging", get(staging::pending_invoices))
        .route("/staging/approve", post(staging::approve_invoices))
        .route("/staging/reject", post(staging::reject_invoices));

    let payment_routes = Router::new()
        .route("/import", post(staging::import_payments))
        .route("/staging", get(staging::pending_payments))
        .route("/staging/approve", post(staging::approve_payments))
        .route("/staging/reject", post(staging::reject_payments));

    let api_routes = Router::new()
        .nest("/clients", client_routes)
        .nest("/invoices", invoice_routes)
        .nest("/payments", payment_routes)
        .route("/postings", get(ledger::list_postings))
        .route("/accounts", get(ledger::list_accounts))
        .layer(axum_middleware::from_fn(request_log_middleware));

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
