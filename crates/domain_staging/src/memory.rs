//! In-memory `LedgerStore`
//!
//! Transactions take the store's async mutex for their whole lifetime and
//! work on a copy of the state, which replaces the shared state on commit.
//! Transactions are therefore fully serialized, and an abandoned transaction
//! leaves no trace.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use core_kernel::{
    AdapterHealth, Cents, ClientId, DomainPort, HealthCheckResult, HealthCheckable, PortError,
    StagingId,
};
use domain_ledger::{Client, NewClient, Posting, UpsertOutcome};

use crate::account::Account;
use crate::ports::{ClientDefaults, LedgerStore, LedgerTransaction, PostingFilter, StagingFilter};
use crate::record::{StagingRecord, StagingStatus};

#[derive(Debug, Clone, Default)]
struct LedgerState {
    clients: BTreeMap<ClientId, Client>,
    postings: Vec<Posting>,
    staging: Vec<StagingRecord>,
    accounts: Vec<Account>,
}

impl LedgerState {
    fn staging_mut(&mut self, id: StagingId) -> Option<&mut StagingRecord> {
        self.staging.iter_mut().find(|r| r.id == id)
    }
}

/// In-memory implementation of `LedgerStore`
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: Arc<Mutex<LedgerState>>,
    failing_clients: Arc<RwLock<HashSet<ClientId>>>,
    unavailable: AtomicBool,
}

impl InMemoryLedgerStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates the client registry
    pub fn with_clients(self, clients: Vec<Client>) -> Self {
        let mut state = self.state.try_lock().map(|s| s.clone()).unwrap_or_default();
        for client in clients {
            state.clients.insert(client.id, client);
        }
        Self {
            state: Arc::new(Mutex::new(state)),
            ..self
        }
    }

    /// Pre-populates the payment account registry
    pub fn with_accounts(self, accounts: Vec<Account>) -> Self {
        let mut state = self.state.try_lock().map(|s| s.clone()).unwrap_or_default();
        state.accounts.extend(accounts);
        Self {
            state: Arc::new(Mutex::new(state)),
            ..self
        }
    }

    /// Makes every posting insert for `client_id` fail with an internal error
    pub async fn fail_postings_for(&self, client_id: ClientId) {
        self.failing_clients.write().await.insert(client_id);
    }

    /// Simulates losing the connection to the store
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), PortError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(PortError::connection("in-memory store marked unavailable"));
        }
        Ok(())
    }
}

impl DomainPort for InMemoryLedgerStore {}

#[async_trait]
impl HealthCheckable for InMemoryLedgerStore {
    async fn health_check(&self) -> HealthCheckResult {
        let status = if self.unavailable.load(Ordering::SeqCst) {
            AdapterHealth::Unhealthy
        } else {
            AdapterHealth::Healthy
        };
        HealthCheckResult {
            adapter_id: "in-memory-ledger-store".to_string(),
            status,
            latency_ms: 0,
            message: None,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn get_client(&self, id: ClientId) -> Result<Client, PortError> {
        self.check_available()?;
        self.state
            .lock()
            .await
            .clients
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Client", id))
    }

    async fn find_client_by_name(&self, name: &str) -> Result<Option<Client>, PortError> {
        self.check_available()?;
        let wanted = name.trim().to_lowercase();
        Ok(self
            .state
            .lock()
            .await
            .clients
            .values()
            .find(|c| c.name.to_lowercase() == wanted)
            .cloned())
    }

    async fn list_clients(&self) -> Result<Vec<Client>, PortError> {
        self.check_available()?;
        let mut clients: Vec<_> = self.state.lock().await.clients.values().cloned().collect();
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clients)
    }

    async fn create_client(&self, client: Client) -> Result<Client, PortError> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        if state.clients.contains_key(&client.id) {
            return Err(PortError::conflict(format!("client {} already exists", client.id)));
        }
        state.clients.insert(client.id, client.clone());
        Ok(client)
    }

    async fn update_client(&self, client: Client) -> Result<Client, PortError> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        let stored = state
            .clients
            .get_mut(&client.id)
            .ok_or_else(|| PortError::not_found("Client", client.id))?;
        let open_balance = stored.open_balance;
        *stored = Client {
            open_balance,
            ..client
        };
        Ok(stored.clone())
    }

    async fn delete_client(&self, id: ClientId) -> Result<(), PortError> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        if !state.clients.contains_key(&id) {
            return Err(PortError::not_found("Client", id));
        }
        if state.postings.iter().any(|p| p.client_id == id) {
            return Err(PortError::conflict(format!(
                "client {} has postings and cannot be deleted",
                id
            )));
        }
        state.clients.remove(&id);
        Ok(())
    }

    async fn list_postings(&self, filter: PostingFilter) -> Result<Vec<Posting>, PortError> {
        self.check_available()?;
        let mut postings: Vec<_> = self
            .state
            .lock()
            .await
            .postings
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        postings.sort_by(|a, b| (a.occurred_on, a.created_at).cmp(&(b.occurred_on, b.created_at)));
        Ok(postings)
    }

    async fn insert_staging_records(
        &self,
        records: Vec<StagingRecord>,
    ) -> Result<Vec<StagingRecord>, PortError> {
        self.check_available()?;
        self.state.lock().await.staging.extend(records.iter().cloned());
        Ok(records)
    }

    async fn list_staging(&self, filter: StagingFilter) -> Result<Vec<StagingRecord>, PortError> {
        self.check_available()?;
        Ok(self
            .state
            .lock()
            .await
            .staging
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, PortError> {
        self.check_available()?;
        Ok(self.state.lock().await.accounts.clone())
    }

    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, PortError> {
        self.check_available()?;
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        let failing_clients = self.failing_clients.read().await.clone();
        Ok(Box::new(MemoryTransaction {
            guard,
            working,
            failing_clients,
        }))
    }
}

struct MemoryTransaction {
    guard: OwnedMutexGuard<LedgerState>,
    working: LedgerState,
    failing_clients: HashSet<ClientId>,
}

#[async_trait]
impl LedgerTransaction for MemoryTransaction {
    async fn get_client(&mut self, id: ClientId) -> Result<Option<Client>, PortError> {
        Ok(self.working.clients.get(&id).cloned())
    }

    async fn upsert_client(
        &mut self,
        id: ClientId,
        name: &str,
        defaults: ClientDefaults,
    ) -> Result<UpsertOutcome, PortError> {
        if let Some(existing) = self.working.clients.get_mut(&id) {
            existing.name = name.to_string();
            existing.updated_at = Utc::now();
            return Ok(UpsertOutcome::Updated(existing.clone()));
        }
        let client = NewClient::new(id, name)
            .with_credit_limit(defaults.credit_limit)
            .with_payment_term(defaults.has_payment_term)
            .into_client(Utc::now());
        self.working.clients.insert(id, client.clone());
        Ok(UpsertOutcome::Created(client))
    }

    async fn adjust_balance(&mut self, id: ClientId, delta: Cents) -> Result<Client, PortError> {
        let client = self
            .working
            .clients
            .get_mut(&id)
            .ok_or_else(|| PortError::not_found("Client", id))?;
        client.open_balance = client
            .open_balance
            .checked_add(delta)
            .map_err(|e| PortError::internal(e.to_string()))?;
        client.updated_at = Utc::now();
        Ok(client.clone())
    }

    async fn insert_posting(&mut self, posting: &Posting) -> Result<(), PortError> {
        if self.failing_clients.contains(&posting.client_id) {
            return Err(PortError::internal(format!(
                "injected posting failure for client {}",
                posting.client_id
            )));
        }
        self.working.postings.push(posting.clone());
        Ok(())
    }

    async fn get_staging_record(&mut self, id: StagingId) -> Result<StagingRecord, PortError> {
        self.working
            .staging
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| PortError::not_found("StagingRecord", id))
    }

    async fn mark_staging_status(
        &mut self,
        id: StagingId,
        status: StagingStatus,
        decided_at: DateTime<Utc>,
    ) -> Result<(), PortError> {
        let record = self
            .working
            .staging_mut(id)
            .ok_or_else(|| PortError::not_found("StagingRecord", id))?;
        record.status = status;
        record.decided_at = Some(decided_at);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), PortError> {
        let MemoryTransaction {
            mut guard, working, ..
        } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), PortError> {
        Ok(())
    }
}
