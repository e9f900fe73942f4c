//! HTTP API tests against the in-memory ledger store

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use core_kernel::{Cents, StagingId};
use domain_staging::{Account, InMemoryLedgerStore, IngestReport, StagingRecord};
use interface_api::config::ApiConfig;
use interface_api::create_router;
use interface_api::dto::clients::{ClientResponse, StatementResponse};
use interface_api::dto::staging::BatchResponse;
use test_utils::{ClientFixtures, ImportFixtures};

fn server_with(store: Arc<InMemoryLedgerStore>, config: ApiConfig) -> TestServer {
    TestServer::new(create_router(store, config)).unwrap()
}

fn server() -> (TestServer, Arc<InMemoryLedgerStore>) {
    let store = Arc::new(
        InMemoryLedgerStore::new()
            .with_clients(vec![ClientFixtures::bettio()])
            .with_accounts(vec![Account::new("G1", "Main bank account")]),
    );
    (server_with(store.clone(), ApiConfig::default()), store)
}

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness() {
        let (server, _) = server();
        let body: Value = server.get("/health").await.json();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_readiness_reflects_store() {
        let (server, store) = server();
        server.get("/health/ready").await.assert_status_ok();

        store.set_unavailable(true);
        server
            .get("/health/ready")
            .await
            .assert_status(StatusCode::SERVICE_UNAVAILABLE);
    }
}

mod client_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get_client() {
        let (server, _) = server();

        let response = server
            .post("/api/v1/clients")
            .json(&json!({
                "id": 42,
                "name": "Acme Ltda",
                "credit_limit": 100000,
                "has_payment_term": true
            }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let client: ClientResponse = server.get("/api/v1/clients/42").await.json();
        assert_eq!(client.name, "Acme Ltda");
        assert_eq!(client.available_credit, Cents::new(100_000));
        assert!(!client.over_limit);
    }

    #[tokio::test]
    async fn test_invalid_registration_is_unprocessable() {
        let (server, _) = server();
        let response = server
            .post("/api/v1/clients")
            .json(&json!({ "id": 0, "name": "", "credit_limit": -5 }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["error"], "validation_error");
        assert!(body["details"].as_array().is_some_and(|d| d.len() == 3));
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let (server, _) = server();
        server
            .post("/api/v1/clients")
            .json(&json!({ "id": 199, "name": "Bettio again" }))
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_unknown_client_is_not_found() {
        let (server, _) = server();
        server
            .get("/api/v1/clients/999")
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_update_then_delete() {
        let (server, _) = server();
        let updated: ClientResponse = server
            .put("/api/v1/clients/199")
            .json(&json!({ "credit_limit": 250000, "document": null }))
            .await
            .json();
        assert_eq!(updated.credit_limit, Cents::new(250_000));
        assert!(updated.has_payment_term);

        server
            .delete("/api/v1/clients/199")
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get("/api/v1/clients/199")
            .await
            .assert_status_not_found();
    }
}

mod workflow_tests {
    use super::*;

    async fn stage_payment(server: &TestServer) -> StagingId {
        let report: IngestReport = server
            .post("/api/v1/payments/import")
            .json(&json!({ "text": ImportFixtures::payment_line() }))
            .await
            .json();
        assert!(report.errors.is_empty());
        report.staged[0].id
    }

    #[tokio::test]
    async fn test_invoice_import_approve_and_statement() {
        let (server, _) = server();

        let report: IngestReport = server
            .post("/api/v1/invoices/import")
            .json(&json!({ "rows": ImportFixtures::invoice_rows() }))
            .await
            .json();
        assert_eq!(report.staged.len(), 2);

        let pending: Vec<StagingRecord> = server.get("/api/v1/invoices/staging").await.json();
        let ids: Vec<StagingId> = pending.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), 2);

        let batch: BatchResponse = server
            .post("/api/v1/invoices/staging/approve")
            .json(&json!({ "ids": ids }))
            .await
            .json();
        assert_eq!((batch.successes, batch.errors), (2, 0));

        let statement: StatementResponse =
            server.get("/api/v1/clients/199/statement").await.json();
        assert_eq!(statement.statement.open_balance, Cents::new(150_000));
        assert_eq!(statement.statement.available_credit, Cents::new(350_000));
        assert_eq!(statement.balance_drift, None);

        let pending: Vec<StagingRecord> = server.get("/api/v1/invoices/staging").await.json();
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn test_import_reports_bad_lines() {
        let (server, _) = server();
        let text = format!("{}\nnot a payment line\n", ImportFixtures::payment_line());

        let report: IngestReport = server
            .post("/api/v1/payments/import")
            .json(&json!({ "text": text }))
            .await
            .json();

        assert_eq!(report.staged.len(), 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].line, 2);
    }

    #[tokio::test]
    async fn test_partial_batch_reports_each_id() {
        let (server, _) = server();
        let id = stage_payment(&server).await;
        let missing = StagingId::new_v7();

        let batch: BatchResponse = server
            .post("/api/v1/payments/staging/approve")
            .json(&json!({ "ids": [id, missing] }))
            .await
            .json();

        assert_eq!((batch.successes, batch.errors), (1, 1));
        assert!(batch.items[0].outcome.is_some());
        assert!(batch.items[1].error.is_some());

        let postings: Vec<Value> = server
            .get("/api/v1/postings")
            .add_query_param("client_id", 199)
            .add_query_param("kind", "payment")
            .await
            .json();
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0]["due_date"], Value::Null);
    }

    #[tokio::test]
    async fn test_decision_route_only_accepts_its_own_kind() {
        let (server, _) = server();
        let id = stage_payment(&server).await;

        let approved: BatchResponse = server
            .post("/api/v1/invoices/staging/approve")
            .json(&json!({ "ids": [id] }))
            .await
            .json();
        assert_eq!((approved.successes, approved.errors), (0, 1));

        let rejected: BatchResponse = server
            .post("/api/v1/invoices/staging/reject")
            .json(&json!({ "ids": [id] }))
            .await
            .json();
        assert_eq!((rejected.successes, rejected.errors), (0, 1));

        let pending: Vec<StagingRecord> = server.get("/api/v1/payments/staging").await.json();
        assert_eq!(pending.len(), 1);
        let client: ClientResponse = server.get("/api/v1/clients/199").await.json();
        assert_eq!(client.open_balance, Cents::ZERO);
    }

    #[tokio::test]
    async fn test_reject_leaves_ledger_untouched() {
        let (server, _) = server();
        let id = stage_payment(&server).await;

        let batch: BatchResponse = server
            .post("/api/v1/payments/staging/reject")
            .json(&json!({ "ids": [id] }))
            .await
            .json();
        assert_eq!(batch.successes, 1);

        let client: ClientResponse = server.get("/api/v1/clients/199").await.json();
        assert_eq!(client.open_balance, Cents::ZERO);
    }

    #[tokio::test]
    async fn test_empty_decision_is_unprocessable() {
        let (server, _) = server();
        server
            .post("/api/v1/payments/staging/approve")
            .json(&json!({ "ids": [] }))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_batch() {
        let (server, store) = server();
        let id = stage_payment(&server).await;
        store.set_unavailable(true);

        server
            .post("/api/v1/payments/staging/approve")
            .json(&json!({ "ids": [id] }))
            .await
            .assert_status(StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_accounts_listing() {
        let (server, _) = server();
        let accounts: Vec<Account> = server.get("/api/v1/accounts").await.json();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].code, "G1");
    }
}
