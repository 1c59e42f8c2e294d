//! Metrics collection for extraction runs

/// Counters for a single extraction run
///
/// Owned by a single `ExtractionRunner` and mutated behind a mutex by
/// concurrent call-completion paths. The runner zeroes the accumulator at
/// the start of every run; counters are never shared across runs or
/// runners.
#[derive(Debug, Clone, Default)]
pub struct ExtractionMetrics {
    /// LLM invocations issued (including retries)
    pub llm_calls: usize,

    /// Retries performed after per-call failures
    pub retries: usize,

    /// Provider-side call failures
    pub provider_errors: usize,

    /// Responses discarded as malformed
    pub parse_errors: usize,

    /// Windows abandoned after exhausting their retry budget
    pub windows_failed: usize,

    /// Records surviving merge and deduplication
    pub total_records_extracted: usize,

    /// Wall-clock duration of the most recent run (seconds)
    pub total_duration_secs: f64,
}

impl ExtractionMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one LLM invocation
    pub fn record_call(&mut self) {
        self.llm_calls += 1;
    }

    /// Record a retry
    pub fn record_retry(&mut self) {
        self.retries += 1;
    }

    /// Record a provider-side failure
    pub fn record_provider_error(&mut self) {
        self.provider_errors += 1;
    }

    /// Record a discarded malformed response
    pub fn record_parse_error(&mut self) {
        self.parse_errors += 1;
    }

    /// Record a window abandoned after exhausting retries
    pub fn record_window_failure(&mut self) {
        self.windows_failed += 1;
    }

    /// Record records kept after merge
    pub fn record_records(&mut self, count: usize) {
        self.total_records_extracted += count;
    }

    /// Finalize a run with its wall-clock duration
    pub fn finish_run(&mut self, duration_secs: f64) {
        self.total_duration_secs = duration_secs;
    }

    /// Reset all counters
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report
    pub fn summary(&self) -> String {
        let lines = vec![
            "Extraction Metrics Summary".to_string(),
            "==========================".to_string(),
            format!("LLM calls: {}", self.llm_calls),
            format!("Retries: {}", self.retries),
            format!("Provider errors: {}", self.provider_errors),
            format!("Parse errors: {}", self.parse_errors),
            format!("Windows failed: {}", self.windows_failed),
            format!("Records extracted: {}", self.total_records_extracted),
            format!("Duration: {:.3}s", self.total_duration_secs),
        ];
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_start_empty() {
        let metrics = ExtractionMetrics::new();
        assert_eq!(metrics.llm_calls, 0);
        assert_eq!(metrics.total_records_extracted, 0);
        assert_eq!(metrics.total_duration_secs, 0.0);
    }

    #[test]
    fn test_counter_increments() {
        let mut metrics = ExtractionMetrics::new();
        metrics.record_call();
        metrics.record_call();
        metrics.record_retry();
        metrics.record_provider_error();
        metrics.record_parse_error();
        metrics.record_window_failure();
        metrics.record_records(3);

        assert_eq!(metrics.llm_calls, 2);
        assert_eq!(metrics.retries, 1);
        assert_eq!(metrics.provider_errors, 1);
        assert_eq!(metrics.parse_errors, 1);
        assert_eq!(metrics.windows_failed, 1);
        assert_eq!(metrics.total_records_extracted, 3);
    }

    #[test]
    fn test_reset() {
        let mut metrics = ExtractionMetrics::new();
        metrics.record_call();
        metrics.record_records(5);
        metrics.finish_run(1.25);

        metrics.reset();

        assert_eq!(metrics.llm_calls, 0);
        assert_eq!(metrics.total_records_extracted, 0);
        assert_eq!(metrics.total_duration_secs, 0.0);
    }

    #[test]
    fn test_summary() {
        let mut metrics = ExtractionMetrics::new();
        metrics.record_call();
        metrics.record_records(2);
        metrics.finish_run(0.5);

        let summary = metrics.summary();
        assert!(summary.contains("LLM calls: 1"));
        assert!(summary.contains("Records extracted: 2"));
        assert!(summary.contains("Duration: 0.500s"));
    }
}
