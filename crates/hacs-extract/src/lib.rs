//! HACS Structured Extraction
//!
//! Turns free-text clinical documents into typed, citation-grounded
//! records by orchestrating windowed LLM calls under concurrency,
//! timeout, and retry policy.
//!
//! # Architecture
//!
//! ```text
//! Text → Window Planner → Prompt Builder → Extraction Runner → Merger
//!                              ↑                  ↓
//!                        Field Selector      LLM Provider
//! ```
//!
//! # Key Features
//!
//! - **Compact prompts**: each resource type is reduced to a bounded
//!   field subset before prompt rendering
//! - **Bounded fan-out**: one semaphore gates all in-flight LLM calls
//!   across windows and types
//! - **Timeouts and retries**: per-call and whole-run deadlines, with a
//!   configurable retry budget per window
//! - **Grounded results**: extracted records carry verbatim citations
//!   with document-coordinate offsets, deduplicated across windows
//! - **Resilient parsing**: malformed LLM output contributes zero records
//!   and a metrics increment, never an error
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use hacs_extract::{ExtractionConfig, ExtractionRunner};
//! use hacs_llm::MockProvider;
//! use hacs_model::{catalog, Extractable};
//!
//! # async fn example() -> Result<(), hacs_extract::ExtractError> {
//! let provider = MockProvider::new("[]");
//! let runner = ExtractionRunner::new(provider, ExtractionConfig::default())?;
//!
//! let model: Arc<dyn Extractable + Send + Sync> = Arc::new(catalog::observation());
//! let records = runner
//!     .extract_single_type("Heart rate 72 bpm at rest.", model)
//!     .await?;
//!
//! println!("extracted {} records", records.len());
//! if let Some(metrics) = runner.get_metrics() {
//!     println!("{}", metrics.summary());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod fields;
mod merge;
mod metrics;
mod prompt;
mod runner;
mod types;
mod window;


pub use config::{ExtractionConfig, WindowPolicy};
pub use error::ExtractError;
pub use fields::{compact_extractable_fields, DISCRIMINATOR_FIELD};
pub use merge::{dedupe_insert, parse_window_response};
pub use metrics::ExtractionMetrics;
pub use prompt::PromptBuilder;
pub use runner::ExtractionRunner;
pub use types::{ExtractedRecord, ParseOutcome};
pub use window::{plan_windows, ExtractionWindow};
