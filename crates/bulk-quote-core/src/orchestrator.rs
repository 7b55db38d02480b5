//! Bulk orchestration: parse → match → price-select, one input row at a
//! time, independently. A failure on one row never aborts the job — it's
//! turned into an `ERROR`-stage row and processing continues. The only
//! path to a job-level `FAILED` status is an unexpected panic escaping the
//! per-row loop, which [`run_job`] catches and converts into a terminal
//! [`OrchestratorError`] rather than propagating it.

use chrono::Utc;
use log::{error, info, warn};
use thiserror::Error;

use crate::matcher::{match_drug, MatcherConfig};
use crate::model::{BulkQuoteJob, JobStatus, MatchStage, QuoteResultRow, QuoteSummary, RejectReason};
use crate::parser::parse;
use crate::pricing::select_prices;
use crate::providers::{CatalogProvider, PriceProvider, ProviderError, SynonymDictProvider};

/// Generate a fresh job id. The host process is free to supply its own
/// `job_id` to [`run_job`] instead (e.g. one already assigned by its own
/// queue) — this exists for callers with no better id of their own.
pub fn new_job_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Job-level failure. Per-row failures never reach this type — they stay
/// data, represented as an `ERROR`-stage [`QuoteResultRow`].
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("job failed: {0}")]
    Failed(String),
}

fn process_row(
    input: &str,
    hospital_id: &str,
    catalog: &dyn CatalogProvider,
    prices: &dyn PriceProvider,
    synonyms: &dyn SynonymDictProvider,
    config: &MatcherConfig,
) -> QuoteResultRow {
    let parsed = parse(input);
    let warning_labels: Vec<String> = parsed.warnings.iter().map(|w| format!("{w:?}")).collect();

    match match_drug(&parsed, hospital_id, catalog, synonyms, config) {
        Ok(result) => {
            let price_rows = match &result.cum_code {
                Some(code) => match prices.prices_for(code) {
                    Ok(rows) => select_prices(rows, config.price_row_limit),
                    Err(e) => {
                        warn!("price lookup failed for {code}: {e}");
                        vec![]
                    }
                },
                None => vec![],
            };
            QuoteResultRow {
                input_text: input.to_string(),
                parser_warnings: warning_labels,
                match_stage: result.stage,
                match_confidence: result.confidence,
                cum_code: result.cum_code,
                principio_activo: result.principio_activo,
                forma_farmaceutica: result.forma_farmaceutica,
                concentracion: result.concentracion,
                reject_reason: result.reject_reason,
                inn_score: result.inn_score,
                prices: price_rows,
            }
        }
        Err(e) => {
            error!("matcher processing error for '{input}': {e}");
            QuoteResultRow {
                input_text: input.to_string(),
                parser_warnings: warning_labels,
                match_stage: MatchStage::Error,
                match_confidence: 0.0,
                cum_code: None,
                principio_activo: None,
                forma_farmaceutica: None,
                concentracion: None,
                reject_reason: Some(RejectReason::ProcessingError),
                inn_score: None,
                prices: vec![],
            }
        }
    }
}

/// Process every input line independently, honoring `should_cancel`
/// between rows. A job cancelled mid-run keeps the rows already processed
/// and is marked `Cancelled`, not `Failed` — cancellation is an expected
/// outcome, not an error.
pub fn run_job(
    job_id: String,
    hospital_id: String,
    inputs: &[String],
    catalog: &dyn CatalogProvider,
    prices: &dyn PriceProvider,
    synonyms: &dyn SynonymDictProvider,
    config: &MatcherConfig,
    mut should_cancel: impl FnMut() -> bool,
) -> BulkQuoteJob {
    let created_at = Utc::now();

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let mut results = Vec::with_capacity(inputs.len());
        let mut cancelled = false;
        for input in inputs {
            if should_cancel() {
                cancelled = true;
                break;
            }
            results.push(process_row(input, &hospital_id, catalog, prices, synonyms, config));
        }
        (results, cancelled)
    }));

    match outcome {
        Ok((results, cancelled)) => {
            let summary = QuoteSummary::from_rows(&results);
            let status = if cancelled { JobStatus::Cancelled } else { JobStatus::Completed };
            info!(
                "job {job_id} {status:?}: {}/{} matched, {}/{} priced",
                summary.with_match, summary.total, summary.with_price, summary.total
            );
            BulkQuoteJob {
                job_id,
                hospital_id,
                status,
                created_at,
                completed_at: Some(Utc::now()),
                results,
                summary: Some(summary),
                failure_message: None,
            }
        }
        Err(panic_payload) => {
            let message = panic_payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic_payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!("job {job_id} failed: {message}");
            BulkQuoteJob {
                job_id,
                hospital_id,
                status: JobStatus::Failed,
                created_at,
                completed_at: Some(Utc::now()),
                results: vec![],
                summary: None,
                failure_message: Some(message),
            }
        }
    }
}
