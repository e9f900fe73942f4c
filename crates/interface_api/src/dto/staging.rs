//! Import and approval DTOs

use core_kernel::StagingId;
use domain_staging::import::InvoiceRow;
use domain_staging::{BatchReport, Decision};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct ImportInvoicesRequest {
    #[validate(length(min = 1, message = "at least one row is required"))]
    pub rows: Vec<InvoiceRow>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ImportPaymentsRequest {
    /// Pasted bank statement lines
    #[validate(length(min = 1, message = "payment text is empty"))]
    pub text: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DecisionRequest {
    #[validate(length(min = 1, message = "at least one id is required"))]
    pub ids: Vec<StagingId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchItemResponse {
    pub id: StagingId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Decision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchResponse {
    pub successes: usize,
    pub errors: usize,
    pub items: Vec<BatchItemResponse>,
}

impl From<BatchReport> for BatchResponse {
    fn from(report: BatchReport) -> Self {
        let items = report
            .items
            .into_iter()
            .map(|item| {
                let (outcome, error) = match item.result {
                    Ok(decision) => (Some(decision), None),
                    Err(err) => (None, Some(err.to_string())),
                };
                BatchItemResponse {
                    id: item.id,
                    outcome,
                    error,
                }
            })
            .collect();

        Self {
            successes: report.successes,
            errors: report.errors,
            items,
        }
    }
}
