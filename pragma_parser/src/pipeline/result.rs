use crate::grammar::ast::Directive;
use crate::lexical::LexicalMetrics;
use crate::syntax::{ParseOutcome, SyntaxError};
use crate::utils::Span;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// One diagnostic in serialisable form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticRecord {
    pub code: String,
    pub severity: &'static str,
    pub warning: bool,
    pub message: String,
    pub span: Span,
}

impl From<&SyntaxError> for DiagnosticRecord {
    fn from(error: &SyntaxError) -> Self {
        Self {
            code: error.error_code().as_str().to_string(),
            severity: error.severity(),
            warning: error.is_warning(),
            message: error.to_string(),
            span: error.span(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportCounts {
    pub tokens: usize,
    pub pragma_runs: usize,
    pub directives: usize,
    pub clauses: usize,
    pub errors: usize,
    pub warnings: usize,
}

/// Everything the pipeline produced for one source
#[derive(Debug, Clone, Serialize)]
pub struct PragmaReport {
    pub source: String,
    pub processed_at: DateTime<Utc>,
    pub counts: ReportCounts,
    pub directives: Vec<Directive>,
    pub diagnostics: Vec<DiagnosticRecord>,
    #[serde(skip)]
    pub processing_duration: Duration,
}

impl PragmaReport {
    pub fn new(
        source: &str,
        metrics: &LexicalMetrics,
        outcome: ParseOutcome,
        processing_duration: Duration,
    ) -> Self {
        let counts = ReportCounts {
            tokens: metrics.total_tokens,
            pragma_runs: metrics.pragma_runs,
            directives: outcome.directives.len(),
            clauses: outcome.directives.iter().map(|d| d.clauses.len()).sum(),
            errors: outcome.error_count(),
            warnings: outcome.warning_count(),
        };

        Self {
            source: source.to_string(),
            processed_at: Utc::now(),
            counts,
            diagnostics: outcome.diagnostics.iter().map(DiagnosticRecord::from).collect(),
            directives: outcome.directives,
            processing_duration,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.counts.errors > 0
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn log_success(&self) {
        crate::log_success!(
            crate::logging::codes::success::SOURCE_PROCESSED,
            "Pragma processing pipeline completed",
            "source" => self.source,
            "directives" => self.counts.directives,
            "errors" => self.counts.errors,
            "warnings" => self.counts.warnings,
            "duration_ms" => format!("{:.2}", self.processing_duration.as_secs_f64() * 1000.0)
        );
    }

    /// Human-readable listing, one directive per line followed by diagnostics
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for directive in &self.directives {
            out.push_str(&format!(
                "{}:{}: {}\n",
                self.source,
                directive.span.start.line,
                directive.summary()
            ));
        }
        for diagnostic in &self.diagnostics {
            let label = if diagnostic.warning { "warning" } else { "error" };
            out.push_str(&format!(
                "{}:{}:{}: {}[{}]: {}\n",
                self.source,
                diagnostic.span.start.line,
                diagnostic.span.start.column,
                label,
                diagnostic.code,
                diagnostic.message
            ));
        }
        out.push_str(&format!(
            "{}: {} directive(s), {} error(s), {} warning(s)\n",
            self.source, self.counts.directives, self.counts.errors, self.counts.warnings
        ));
        out
    }
}
