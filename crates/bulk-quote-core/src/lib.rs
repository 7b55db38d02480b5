//! Bulk Quotation Core
//!
//! Normalizes free-text drug descriptions from a hospital's bulk purchase
//! request, matches each one against the regulated CUM catalog, and
//! retrieves the most recently published supplier price — so a pharmacy
//! can quote hundreds of line items without a human re-typing every drug
//! name by hand.
//!
//! # Architecture
//!
//! ```text
//! free-text line  ──▶  parser (4 layers)  ──▶  ParsedDrug
//!                                                  │
//!                                                  ▼
//!                       synonym dict ◀── matcher ──▶ CUM catalog
//!                        (pre-stage)    (Stage 1/2/3)  (Hard Barrier)
//!                                                  │
//!                                                  ▼
//!                                          price selector
//!                                                  │
//!                                                  ▼
//!                                           QuoteResultRow
//! ```
//!
//! # Core Principle
//!
//! **Similarity never overrides safety.** A fuzzy INN match at 0.99
//! similarity with the wrong concentration, or the wrong administration
//! route, is still a `NO_MATCH` — never a low-confidence match. Every
//! catalog candidate that reaches Stage 2 is re-checked against the parsed
//! concentration and form group before it can become a result.
//!
//! # Modules
//!
//! - [`parser`]: the 4-layer deterministic normalization pipeline
//! - [`tables`]: the static unit/INN/form lookup tables the parser runs against
//! - [`matcher`]: the Stage 1/2/3 catalog-matching pipeline and its Hard Barrier
//! - [`pricing`]: pure best-price selection over already-fetched rows
//! - [`providers`]: the `CatalogProvider`/`PriceProvider`/`SynonymDictProvider`
//!   traits and their one concrete `rusqlite` backend
//! - [`orchestrator`]: per-row bulk processing with failure isolation
//! - [`model`]: domain types shared across every module above

pub mod matcher;
pub mod model;
pub mod orchestrator;
pub mod parser;
pub mod pricing;
pub mod providers;
pub mod tables;

mod trigram;

pub use matcher::{match_drug, MatcherConfig};
pub use orchestrator::{new_job_id, run_job, OrchestratorError};
pub use parser::parse;
pub use pricing::select_prices;
pub use providers::{CatalogCandidate, CatalogProvider, PriceProvider, ProviderError, SynonymDictProvider};
