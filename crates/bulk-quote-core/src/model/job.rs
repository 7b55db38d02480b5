//! Bulk quotation job state: one result row per input line, a job-level
//! summary, and the job handle itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::match_result::{MatchStage, RejectReason};
use super::pricing::PriceRow;

/// One row of `cotizar_lista`'s output: everything the orchestrator
/// assembled for a single input drug name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteResultRow {
    pub input_text: String,
    pub parser_warnings: Vec<String>,
    pub match_stage: MatchStage,
    pub match_confidence: f64,
    pub cum_code: Option<String>,
    pub principio_activo: Option<String>,
    pub forma_farmaceutica: Option<String>,
    pub concentracion: Option<String>,
    pub reject_reason: Option<RejectReason>,
    pub inn_score: Option<f64>,
    pub prices: Vec<PriceRow>,
}

impl QuoteResultRow {
    /// Index 0 of `prices`, already sorted most-recent-`published_at`-first.
    pub fn best_price(&self) -> Option<&PriceRow> {
        self.prices.first()
    }
}

/// Aggregate statistics over one job's result rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteSummary {
    pub total: usize,
    pub with_match: usize,
    pub without_match: usize,
    pub with_price: usize,
    pub without_price: usize,
    pub rate_match: f64,
    pub rate_price: f64,
}

impl QuoteSummary {
    pub fn from_rows(rows: &[QuoteResultRow]) -> Self {
        let total = rows.len();
        let with_match = rows
            .iter()
            .filter(|r| !matches!(r.match_stage, MatchStage::NoMatch | MatchStage::Error))
            .count();
        let with_price = rows.iter().filter(|r| !r.prices.is_empty()).count();
        Self {
            total,
            with_match,
            without_match: total - with_match,
            with_price,
            without_price: total - with_price,
            rate_match: if total > 0 { with_match as f64 / total as f64 } else { 0.0 },
            rate_price: if total > 0 { with_price as f64 / total as f64 } else { 0.0 },
        }
    }
}

/// Status of a bulk quotation job. `Cancelled` is an addition over the
/// legacy four-value status enum this crate's reference data model was
/// distilled from, needed to satisfy the cancellation semantics of §5.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

/// The full persisted state of one bulk quotation job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BulkQuoteJob {
    pub job_id: String,
    pub hospital_id: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub results: Vec<QuoteResultRow>,
    pub summary: Option<QuoteSummary>,
    /// Populated only when `status == Failed`.
    pub failure_message: Option<String>,
}
