//! PostgreSQL adapter tests
//!
//! These run against a real database in a test container and are ignored
//! by default. Run them with `cargo test -p infra_db -- --ignored`.

use std::sync::Arc;

use core_kernel::{Cents, ClientId, PortError};
use domain_ledger::PostingKind;
use domain_staging::{
    ApprovalPolicy, ClientDefaults, Decision, LedgerService, LedgerStore, PostingFilter,
    StagingError, StagingFilter, StagingKind, StagingStatus,
};
use test_utils::{
    assert_batch_counts, assert_statement_consistent, batch_result, create_isolated_test_database,
    ClientBuilder, DateFixtures, StagingRecordBuilder, TestDatabase,
};

async fn setup() -> (TestDatabase, Arc<dyn LedgerStore>) {
    let db = create_isolated_test_database()
        .await
        .expect("Failed to start test database");
    let store: Arc<dyn LedgerStore> = Arc::new(db.ledger_store());
    (db, store)
}

mod registry_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_create_and_find_by_name() {
        let (_db, store) = setup().await;
        let client = ClientBuilder::new().with_id(199).with_name("Bettio").build();

        store.create_client(client.clone()).await.unwrap();

        let found = store.find_client_by_name("bettio").await.unwrap().unwrap();
        assert_eq!(found.id, ClientId::new(199));
        assert_eq!(store.get_client(ClientId::new(199)).await.unwrap().name, "Bettio");
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_duplicate_id_is_conflict() {
        let (_db, store) = setup().await;
        let client = ClientBuilder::new().with_id(1).build();

        store.create_client(client.clone()).await.unwrap();
        let err = store.create_client(client).await.unwrap_err();

        assert!(matches!(err, PortError::Conflict { .. }));
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_missing_client_is_not_found() {
        let (_db, store) = setup().await;
        let err = store.get_client(ClientId::new(404)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_upsert_reports_created_then_updated() {
        let (_db, store) = setup().await;
        let defaults = ClientDefaults {
            credit_limit: Cents::new(50_000),
            has_payment_term: true,
        };

        let mut tx = store.begin().await.unwrap();
        let first = tx.upsert_client(ClientId::new(5), "Acme", defaults).await.unwrap();
        let second = tx
            .upsert_client(ClientId::new(5), "Renamed", ClientDefaults::default())
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert!(first.was_created());
        assert!(!second.was_created());
        let client = second.into_client();
        assert_eq!(client.name, "Renamed");
        assert_eq!(client.credit_limit, Cents::new(50_000));
        assert!(client.has_payment_term);
    }
}

mod transaction_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_rollback_discards_balance_change() {
        let (_db, store) = setup().await;
        store
            .create_client(ClientBuilder::new().with_id(3).build())
            .await
            .unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.adjust_balance(ClientId::new(3), Cents::new(10_000)).await.unwrap();
        tx.rollback().await.unwrap();

        let client = store.get_client(ClientId::new(3)).await.unwrap();
        assert_eq!(client.open_balance, Cents::ZERO);
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_marking_status_records_decision_time() {
        let (_db, store) = setup().await;
        let staged = store
            .insert_staging_records(vec![StagingRecordBuilder::payment(9, 1_000).build()])
            .await
            .unwrap();
        let id = staged[0].id;

        let mut tx = store.begin().await.unwrap();
        let record = tx.get_staging_record(id).await.unwrap();
        assert_eq!(record.status, StagingStatus::Pending);
        tx.mark_staging_status(id, StagingStatus::Rejected, chrono::Utc::now())
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let rejected = store
            .list_staging(StagingFilter {
                kind: Some(StagingKind::Payment),
                status: Some(StagingStatus::Rejected),
            })
            .await
            .unwrap();
        assert_eq!(rejected.len(), 1);
        assert!(rejected[0].decided_at.is_some());
    }
}

mod approval_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_approve_invoice_and_payment() {
        let (_db, store) = setup().await;
        store
            .create_client(ClientBuilder::new().with_id(199).with_payment_term().build())
            .await
            .unwrap();
        let service = LedgerService::new(store.clone(), ApprovalPolicy::default());

        let staged = store
            .insert_staging_records(vec![
                StagingRecordBuilder::invoice(199, 100_000)
                    .on(DateFixtures::first_half())
                    .build(),
                StagingRecordBuilder::payment(199, 40_000).build(),
            ])
            .await
            .unwrap();
        let ids: Vec<_> = staged.iter().map(|r| r.id).collect();

        let report = service.approve_batch(&ids).await.unwrap();
        assert_batch_counts(&report, 2, 0);

        let statement = service.compute_statement(ClientId::new(199)).await.unwrap();
        assert_eq!(statement.open_balance, Cents::new(60_000));
        assert_eq!(statement.client.open_balance, Cents::new(60_000));
        assert_statement_consistent(&statement);

        let payments = store
            .list_postings(PostingFilter {
                client_id: Some(ClientId::new(199)),
                kind: Some(PostingKind::Payment),
            })
            .await
            .unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].due_date, None);
        assert_eq!(payments[0].source_staging_id, Some(ids[1]));
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_second_approval_is_invalid_state() {
        let (_db, store) = setup().await;
        let service = LedgerService::new(store.clone(), ApprovalPolicy::default());
        let staged = store
            .insert_staging_records(vec![StagingRecordBuilder::invoice(77, 5_000).build()])
            .await
            .unwrap();
        let id = staged[0].id;

        let first = service.approve_batch(&[id]).await.unwrap();
        let second = service.approve_batch(&[id, id]).await.unwrap();

        assert!(matches!(
            batch_result(&first, id),
            Ok(Decision::Approved { client_created: true, .. })
        ));
        assert_batch_counts(&second, 0, 2);
        assert!(matches!(batch_result(&second, id), Err(StagingError::InvalidState(_))));

        let client = store.get_client(ClientId::new(77)).await.unwrap();
        assert_eq!(client.open_balance, Cents::new(5_000));
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_approval_refreshes_client_name() {
        let (_db, store) = setup().await;
        store
            .create_client(
                ClientBuilder::new()
                    .with_id(31)
                    .with_name("Old Name")
                    .with_credit_limit(80_000)
                    .build(),
            )
            .await
            .unwrap();
        let service = LedgerService::new(store.clone(), ApprovalPolicy::default());
        let staged = store
            .insert_staging_records(vec![StagingRecordBuilder::invoice(31, 2_500)
                .with_client_name("New Name")
                .build()])
            .await
            .unwrap();

        let report = service.approve_batch_of(StagingKind::Invoice, &[staged[0].id]).await.unwrap();
        assert_batch_counts(&report, 1, 0);

        let client = store.get_client(ClientId::new(31)).await.unwrap();
        assert_eq!(client.name, "New Name");
        assert_eq!(client.credit_limit, Cents::new(80_000));
        assert_eq!(client.open_balance, Cents::new(2_500));
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_delete_refused_while_postings_exist() {
        let (_db, store) = setup().await;
        let service = LedgerService::new(store.clone(), ApprovalPolicy::default());
        let staged = store
            .insert_staging_records(vec![StagingRecordBuilder::payment(12, 1_000).build()])
            .await
            .unwrap();
        service.approve_batch(&[staged[0].id]).await.unwrap();

        let err = service.delete_client(ClientId::new(12)).await.unwrap_err();
        assert!(matches!(err, StagingError::Conflict(_)));
    }
}
