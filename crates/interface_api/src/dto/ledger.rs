//! Posting and account query DTOs

use core_kernel::ClientId;
use domain_ledger::PostingKind;
use domain_staging::PostingFilter;
use serde::Deserialize;

/// Query string for `GET /postings`
#[derive(Debug, Default, Deserialize)]
pub struct PostingQuery {
    pub client_id: Option<i64>,
    pub kind: Option<PostingKind>,
}

impl From<PostingQuery> for PostingFilter {
    fn from(query: PostingQuery) -> Self {
        PostingFilter {
            client_id: query.client_id.map(ClientId::new),
            kind: query.kind,
        }
    }
}
