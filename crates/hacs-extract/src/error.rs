//! Error types for the extraction core

use thiserror::Error;

/// Errors surfaced to callers of the extraction runner
///
/// Parse failures and single-window provider errors are absorbed into
/// "zero records for that window" outcomes and never appear here; only
/// run-level timeout, unrecoverable provider/task failures, and malformed
/// configuration abort a run.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The run exceeded its total budget, or a window exhausted its retry
    /// budget on per-call timeouts
    #[error("extraction timed out")]
    Timeout,

    /// Unrecoverable provider or task failure
    #[error("provider error: {0}")]
    Provider(String),

    /// Configuration rejected by validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
