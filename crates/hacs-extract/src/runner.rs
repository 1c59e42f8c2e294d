//! Extraction run orchestration
//!
//! The runner fans one document out across (window, resource type) pairs,
//! invoking the LLM provider under a shared admission gate so the number
//! of in-flight calls never exceeds the configured concurrency limit. Each
//! call gets a per-call timeout and a retry budget; the whole run gets a
//! total deadline that cancels everything still outstanding.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::merge::{dedupe_insert, parse_window_response};
use crate::metrics::ExtractionMetrics;
use crate::prompt::PromptBuilder;
use crate::types::{ExtractedRecord, ParseOutcome};
use crate::window::{plan_windows, ExtractionWindow};
use hacs_model::{Extractable, LlmProvider};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Orchestrates structured extraction runs over one LLM provider
///
/// The provider and configuration are injected at construction; the runner
/// holds no hidden global state, so tests substitute a mock provider
/// without any patching.
pub struct ExtractionRunner<P> {
    provider: Arc<P>,
    config: ExtractionConfig,
    prompts: PromptBuilder,
    metrics: Arc<Mutex<ExtractionMetrics>>,
}

impl<P> ExtractionRunner<P>
where
    P: LlmProvider + Send + Sync + 'static,
{
    /// Create a runner for the given provider and configuration.
    ///
    /// # Errors
    ///
    /// Returns `ExtractError::InvalidConfig` if the configuration fails
    /// validation.
    pub fn new(provider: P, config: ExtractionConfig) -> Result<Self, ExtractError> {
        config.validate().map_err(ExtractError::InvalidConfig)?;
        let prompts = PromptBuilder::new(config.max_extractable_fields);
        Ok(Self {
            provider: Arc::new(provider),
            config,
            prompts,
            metrics: Arc::new(Mutex::new(ExtractionMetrics::new())),
        })
    }

    /// The configuration governing this runner's runs.
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Snapshot of the most recent run's metrics, when metrics are enabled.
    ///
    /// Counters cover one run only; each `extract_document` call starts
    /// from a zeroed accumulator.
    pub fn get_metrics(&self) -> Option<ExtractionMetrics> {
        if !self.config.enable_metrics {
            return None;
        }
        self.metrics.lock().ok().map(|m| m.clone())
    }

    /// Extract records of a single resource type from a document.
    ///
    /// # Errors
    ///
    /// Returns `ExtractError::Timeout` when the total deadline elapses or
    /// a window exhausts its retry budget on per-call timeouts.
    pub async fn extract_single_type(
        &self,
        source_text: &str,
        model: Arc<dyn Extractable + Send + Sync>,
    ) -> Result<Vec<ExtractedRecord>, ExtractError> {
        let resource_type = model.resource_type().to_string();
        let mut results = self.extract_document(source_text, &[model]).await?;
        Ok(results.remove(&resource_type).unwrap_or_default())
    }

    /// Extract records of every configured target type from a document.
    ///
    /// Result lists are in completion order, not source order; callers
    /// needing source order sort by `start_pos` themselves. Every target
    /// type appears in the mapping, with an empty list when nothing was
    /// extracted for it.
    ///
    /// # Errors
    ///
    /// Returns `ExtractError::Timeout` when the total deadline elapses or
    /// a window exhausts its retry budget on per-call timeouts.
    pub async fn extract_document(
        &self,
        source_text: &str,
        models: &[Arc<dyn Extractable + Send + Sync>],
    ) -> Result<HashMap<String, Vec<ExtractedRecord>>, ExtractError> {
        let run_start = Instant::now();
        if self.config.enable_metrics {
            if let Ok(mut metrics) = self.metrics.lock() {
                metrics.reset();
            }
        }
        let windows = plan_windows(source_text, models, &self.config.window_policy);
        info!(
            windows = windows.len(),
            types = models.len(),
            source_len = source_text.len(),
            "starting extraction run"
        );

        let outcome = timeout(self.config.total_timeout(), self.run_windows(models, windows)).await;
        let elapsed = run_start.elapsed().as_secs_f64();

        let result = match outcome {
            Ok(inner) => inner,
            Err(_) => {
                warn!(elapsed, "run exceeded its total deadline; cancelling outstanding calls");
                Err(ExtractError::Timeout)
            }
        };

        if self.config.enable_metrics {
            if let Ok(mut metrics) = self.metrics.lock() {
                metrics.finish_run(elapsed);
                if let Ok(map) = &result {
                    metrics.record_records(map.values().map(Vec::len).sum());
                }
            }
        }

        match &result {
            Ok(map) => {
                let total: usize = map.values().map(Vec::len).sum();
                info!(records = total, elapsed, "extraction run complete");
            }
            Err(e) => warn!(error = %e, elapsed, "extraction run failed"),
        }
        result
    }

    /// Fan the windows out as tasks and merge results as they complete.
    ///
    /// Dropping the `JoinSet` (on early return or when the caller's total
    /// deadline fires) aborts every task still in flight.
    async fn run_windows(
        &self,
        models: &[Arc<dyn Extractable + Send + Sync>],
        windows: Vec<ExtractionWindow>,
    ) -> Result<HashMap<String, Vec<ExtractedRecord>>, ExtractError> {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency_limit));
        let mut join_set: JoinSet<Result<Vec<ExtractedRecord>, ExtractError>> = JoinSet::new();

        for window in windows {
            let window = Arc::new(window);
            for target in window.targets.clone() {
                let provider = Arc::clone(&self.provider);
                let semaphore = Arc::clone(&semaphore);
                let metrics = Arc::clone(&self.metrics);
                let window = Arc::clone(&window);
                let instructions = self.prompts.build_window_prompt(target.as_ref());
                let per_call_timeout = self.config.window_timeout();
                let max_retries = self.config.max_retries;
                let enable_metrics = self.config.enable_metrics;

                join_set.spawn(async move {
                    let permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|_| ExtractError::Provider("admission gate closed".to_string()))?;
                    Self::run_one_call(
                        provider,
                        window,
                        target,
                        instructions,
                        per_call_timeout,
                        max_retries,
                        metrics,
                        enable_metrics,
                        permit,
                    )
                    .await
                });
            }
        }

        // Every target type gets an entry, even if nothing is extracted
        let mut merged: HashMap<String, Vec<ExtractedRecord>> = HashMap::new();
        for model in models {
            merged.entry(model.resource_type().to_string()).or_default();
        }

        while let Some(joined) = join_set.join_next().await {
            let records = joined
                .map_err(|e| ExtractError::Provider(format!("extraction task failed: {}", e)))??;
            for record in records {
                let kept = merged.entry(record.resource_type.clone()).or_default();
                if !dedupe_insert(kept, record, self.config.dedupe_overlap) {
                    debug!("dropped duplicate record");
                }
            }
        }
        Ok(merged)
    }

    /// Issue one (window, type) call with per-call timeout and retries.
    ///
    /// Provider errors retry up to `max_retries`, then degrade the window
    /// to zero records. Per-call timeouts also retry, but exhausting the
    /// budget on timeouts leaves the run unable to complete: the task
    /// parks until the run's total deadline converts it into a run-level
    /// `Timeout`. The admission permit is released before parking so other
    /// windows keep making progress.
    #[allow(clippy::too_many_arguments)]
    async fn run_one_call(
        provider: Arc<P>,
        window: Arc<ExtractionWindow>,
        target: Arc<dyn Extractable + Send + Sync>,
        instructions: String,
        per_call_timeout: Duration,
        max_retries: u32,
        metrics: Arc<Mutex<ExtractionMetrics>>,
        enable_metrics: bool,
        permit: OwnedSemaphorePermit,
    ) -> Result<Vec<ExtractedRecord>, ExtractError> {
        let resource_type = target.resource_type().to_string();
        let prompt = format!("{}\nTEXT:\n---\n{}\n---", instructions, window.text);
        let record_metric = |f: &dyn Fn(&mut ExtractionMetrics)| {
            if enable_metrics {
                if let Ok(mut m) = metrics.lock() {
                    f(&mut m);
                }
            }
        };

        let mut attempt: u32 = 0;
        loop {
            record_metric(&|m| m.record_call());

            match timeout(per_call_timeout, provider.invoke(&prompt)).await {
                Ok(Ok(response)) => {
                    return Ok(
                        match parse_window_response(&response.content, &window, &resource_type) {
                            ParseOutcome::Parsed(records) => {
                                debug!(
                                    resource_type = %resource_type,
                                    start = window.start_offset,
                                    records = records.len(),
                                    "window parsed"
                                );
                                records
                            }
                            ParseOutcome::Malformed(reason) => {
                                warn!(
                                    resource_type = %resource_type,
                                    start = window.start_offset,
                                    %reason,
                                    "discarding malformed response"
                                );
                                record_metric(&|m| m.record_parse_error());
                                Vec::new()
                            }
                        },
                    );
                }
                Ok(Err(err)) => {
                    warn!(resource_type = %resource_type, attempt, error = %err, "provider call failed");
                    record_metric(&|m| m.record_provider_error());
                    if attempt >= max_retries {
                        warn!(
                            resource_type = %resource_type,
                            start = window.start_offset,
                            "window abandoned after provider failures"
                        );
                        record_metric(&|m| m.record_window_failure());
                        return Ok(Vec::new());
                    }
                }
                Err(_) => {
                    warn!(resource_type = %resource_type, attempt, "window call timed out");
                    if attempt >= max_retries {
                        warn!(
                            resource_type = %resource_type,
                            start = window.start_offset,
                            "retry budget exhausted on timeouts; run will fail at its deadline"
                        );
                        record_metric(&|m| m.record_window_failure());
                        // Release admission so other windows proceed, then
                        // wait for the run deadline to cancel this task
                        drop(permit);
                        return std::future::pending().await;
                    }
                }
            }

            attempt += 1;
            record_metric(&|m| m.record_retry());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hacs_model::catalog;

    #[test]
    fn test_new_rejects_invalid_config() {
        let provider = crate::tests::support::NullProvider;
        let mut config = ExtractionConfig::default();
        config.concurrency_limit = 0;

        let result = ExtractionRunner::new(provider, config);
        assert!(matches!(result, Err(ExtractError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_empty_document_returns_empty_mapping() {
        let provider = crate::tests::support::NullProvider;
        let runner = ExtractionRunner::new(provider, ExtractionConfig::default()).unwrap();

        let model: Arc<dyn Extractable + Send + Sync> = Arc::new(catalog::observation());
        let results = runner.extract_document("", &[model]).await.unwrap();

        assert_eq!(results.len(), 1);
        assert!(results["Observation"].is_empty());
    }
}
