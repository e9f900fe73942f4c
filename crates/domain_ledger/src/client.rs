//! Client registry entity
//!
//! A client carries a credit limit, a payment term flag, and a cached open
//! balance that the approval workflow keeps in step with the posted ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Cents, ClientId, CoreError};

/// A client credit account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// ERP-assigned identifier
    pub id: ClientId,
    /// Display name
    pub name: String,
    /// Optional tax document (CPF/CNPJ or similar)
    pub document: Option<String>,
    /// Maximum open balance the client may carry
    pub credit_limit: Cents,
    /// Whether invoices get a due date (true) or are due immediately (false)
    pub has_payment_term: bool,
    /// Cached signed sum of approved postings
    pub open_balance: Cents,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// Available credit against the cached balance
    pub fn available_credit(&self) -> Cents {
        crate::ledger::available_credit(self.credit_limit, self.open_balance)
    }

    /// Returns true when the open balance exceeds the credit limit
    pub fn is_over_limit(&self) -> bool {
        self.available_credit().is_negative()
    }
}

/// Data for registering a client explicitly or on first approval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    pub id: ClientId,
    pub name: String,
    pub document: Option<String>,
    pub credit_limit: Cents,
    pub has_payment_term: bool,
}

impl NewClient {
    /// Creates registration data with no credit and no payment term
    pub fn new(id: ClientId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            document: None,
            credit_limit: Cents::ZERO,
            has_payment_term: false,
        }
    }

    pub fn with_credit_limit(mut self, limit: Cents) -> Self {
        self.credit_limit = limit;
        self
    }

    pub fn with_payment_term(mut self, has_payment_term: bool) -> Self {
        self.has_payment_term = has_payment_term;
        self
    }

    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }

    /// Checks the registration data
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a blank name or a negative limit
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name(&self.name)?;
        validate_limit(self.credit_limit)
    }

    /// Materializes the client with a zero balance
    pub fn into_client(self, now: DateTime<Utc>) -> Client {
        Client {
            id: self.id,
            name: self.name.trim().to_string(),
            document: self.document,
            credit_limit: self.credit_limit,
            has_payment_term: self.has_payment_term,
            open_balance: Cents::ZERO,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a client's registry data
///
/// The open balance is deliberately absent: it only moves through approvals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientUpdate {
    pub name: Option<String>,
    pub document: Option<Option<String>>,
    pub credit_limit: Option<Cents>,
    pub has_payment_term: Option<bool>,
}

impl ClientUpdate {
    /// Checks the fields that are present
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(limit) = self.credit_limit {
            validate_limit(limit)?;
        }
        Ok(())
    }

    /// Applies the update to a client
    pub fn apply(&self, client: &mut Client, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            client.name = name.trim().to_string();
        }
        if let Some(document) = &self.document {
            client.document = document.clone();
        }
        if let Some(limit) = self.credit_limit {
            client.credit_limit = limit;
        }
        if let Some(flag) = self.has_payment_term {
            client.has_payment_term = flag;
        }
        client.updated_at = now;
    }
}

/// Result of an upsert against the client registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The client did not exist and was created
    Created(Client),
    /// The client already existed; only its name was refreshed
    Updated(Client),
}

impl UpsertOutcome {
    pub fn client(&self) -> &Client {
        match self {
            UpsertOutcome::Created(client) | UpsertOutcome::Updated(client) => client,
        }
    }

    pub fn into_client(self) -> Client {
        match self {
            UpsertOutcome::Created(client) | UpsertOutcome::Updated(client) => client,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, UpsertOutcome::Created(_))
    }
}

fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::validation("client name is required"));
    }
    Ok(())
}

fn validate_limit(limit: Cents) -> Result<(), CoreError> {
    if limit.is_negative() {
        return Err(CoreError::validation("credit limit cannot be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client_validation() {
        assert!(NewClient::new(ClientId::new(1), "Bettio").validate().is_ok());
        assert!(NewClient::new(ClientId::new(1), "  ").validate().is_err());
        assert!(NewClient::new(ClientId::new(1), "Bettio")
            .with_credit_limit(Cents::new(-1))
            .validate()
            .is_err());
    }

    #[test]
    fn test_update_keeps_balance() {
        let now = Utc::now();
        let mut client = NewClient::new(ClientId::new(7), "Old").into_client(now);
        client.open_balance = Cents::new(500);

        let update = ClientUpdate {
            name: Some(" New ".to_string()),
            credit_limit: Some(Cents::new(1000)),
            ..Default::default()
        };
        update.apply(&mut client, now);

        assert_eq!(client.name, "New");
        assert_eq!(client.credit_limit, Cents::new(1000));
        assert_eq!(client.open_balance, Cents::new(500));
        assert_eq!(client.available_credit(), Cents::new(500));
    }

    #[test]
    fn test_over_limit() {
        let mut client = NewClient::new(ClientId::new(7), "Acme")
            .with_credit_limit(Cents::new(100))
            .into_client(Utc::now());
        client.open_balance = Cents::new(150);
        assert!(client.is_over_limit());
        assert_eq!(client.available_credit(), Cents::new(-50));
    }
}
