//! Client registry DTOs

use chrono::{DateTime, Utc};
use core_kernel::{Cents, ClientId};
use domain_ledger::{Client, ClientUpdate, NewClient, Statement};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate(range(min = 1, message = "client id must be positive"))]
    pub id: i64,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 32))]
    pub document: Option<String>,
    #[validate(range(min = 0, message = "credit limit cannot be negative"))]
    #[serde(default)]
    pub credit_limit: i64,
    #[serde(default)]
    pub has_payment_term: bool,
}

impl From<CreateClientRequest> for NewClient {
    fn from(request: CreateClientRequest) -> Self {
        let mut new_client = NewClient::new(ClientId::new(request.id), request.name)
            .with_credit_limit(Cents::new(request.credit_limit))
            .with_payment_term(request.has_payment_term);
        if let Some(document) = request.document {
            new_client = new_client.with_document(document);
        }
        new_client
    }
}

/// Partial update; absent fields are left as they are
///
/// `document: null` clears the document, while omitting it keeps it.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateClientRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub document: Option<Option<String>>,
    #[validate(range(min = 0, message = "credit limit cannot be negative"))]
    pub credit_limit: Option<i64>,
    pub has_payment_term: Option<bool>,
}

fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl From<UpdateClientRequest> for ClientUpdate {
    fn from(request: UpdateClientRequest) -> Self {
        ClientUpdate {
            name: request.name,
            document: request.document,
            credit_limit: request.credit_limit.map(Cents::new),
            has_payment_term: request.has_payment_term,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClientResponse {
    pub id: ClientId,
    pub name: String,
    pub document: Option<String>,
    pub credit_limit: Cents,
    pub has_payment_term: bool,
    pub open_balance: Cents,
    pub available_credit: Cents,
    pub over_limit: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        Self {
            available_credit: client.available_credit(),
            over_limit: client.is_over_limit(),
            id: client.id,
            name: client.name,
            document: client.document,
            credit_limit: client.credit_limit,
            has_payment_term: client.has_payment_term,
            open_balance: client.open_balance,
            created_at: client.created_at,
            updated_at: client.updated_at,
        }
    }
}

/// A statement plus the gap between the stored and recomputed balance
#[derive(Debug, Serialize, Deserialize)]
pub struct StatementResponse {
    #[serde(flatten)]
    pub statement: Statement,
    pub balance_drift: Option<Cents>,
}

impl From<Statement> for StatementResponse {
    fn from(statement: Statement) -> Self {
        Self {
            balance_drift: statement.cached_balance_drift(),
            statement,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let cleared: UpdateClientRequest = serde_json::from_str(r#"{"document": null}"#).unwrap();
        assert_eq!(cleared.document, Some(None));

        let untouched: UpdateClientRequest = serde_json::from_str(r#"{"name": "X"}"#).unwrap();
        assert_eq!(untouched.document, None);
    }

    #[test]
    fn test_negative_limit_fails_validation() {
        let request = CreateClientRequest {
            id: 1,
            name: "Acme".into(),
            document: None,
            credit_limit: -1,
            has_payment_term: false,
        };
        assert!(request.validate().is_err());
    }
}
