use super::PragmaReport;
use std::time::Duration;

/// Totals across the sources of one run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    pub sources_processed: usize,
    pub sources_failed: usize,
    pub sources_with_errors: usize,
    pub total_directives: usize,
    pub total_diagnostics: usize,
    pub total_tokens: usize,
    pub total_processing_time: Duration,
}

impl PipelineStats {
    pub fn record(&mut self, report: &PragmaReport) {
        self.sources_processed += 1;
        if report.has_errors() {
            self.sources_with_errors += 1;
        }
        self.total_directives += report.counts.directives;
        self.total_diagnostics += report.diagnostics.len();
        self.total_tokens += report.counts.tokens;
        self.total_processing_time += report.processing_duration;
    }

    pub fn record_failure(&mut self) {
        self.sources_failed += 1;
    }

    pub fn clean_rate(&self) -> f64 {
        if self.sources_processed == 0 {
            0.0
        } else {
            (self.sources_processed - self.sources_with_errors) as f64
                / self.sources_processed as f64
        }
    }

    pub fn average_processing_time(&self) -> Duration {
        match u32::try_from(self.sources_processed) {
            Ok(count) if count > 0 => self.total_processing_time / count,
            _ => Duration::ZERO,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} source(s), {} failed, {} directive(s), {} diagnostic(s)",
            self.sources_processed,
            self.sources_failed,
            self.total_directives,
            self.total_diagnostics
        )
    }
}
