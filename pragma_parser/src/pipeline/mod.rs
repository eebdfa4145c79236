mod error;
mod result;
mod stats;

pub use error::PipelineError;
pub use result::{DiagnosticRecord, PragmaReport, ReportCounts};
pub use stats::PipelineStats;

use crate::config::compile_time::pipeline::{MAX_DIRECTIVES_PER_SOURCE, MAX_SOURCE_SIZE};
use crate::config::runtime::RuntimeConfig;
use crate::lexical::LexicalAnalyzer;
use crate::logging;
use std::path::Path;
use std::time::Instant;

/// Process source text (source -> tokens -> directives)
pub fn process_source(
    name: &str,
    source: &str,
    config: &RuntimeConfig,
) -> Result<PragmaReport, PipelineError> {
    check_size(name, source.len() as u64)?;

    logging::with_source_context(name, || {
        let start_time = Instant::now();
        crate::log_info!("Starting pragma processing pipeline",
            "source" => name,
            "bytes" => source.len()
        );

        // Stage 1: Lexical analysis
        let mut analyzer = LexicalAnalyzer::with_preferences(config.lexical.clone());
        let tokens = analyzer.tokenize(source)?;
        let metrics = analyzer.metrics().clone();

        // Stage 2: Directive parsing
        let mut outcome =
            crate::syntax::parse_pragmas_with_preferences(tokens, config.parser.clone());
        if outcome.directives.len() > MAX_DIRECTIVES_PER_SOURCE {
            crate::log_warning!("Directive limit reached, later directives dropped",
                "source" => name,
                "found" => outcome.directives.len(),
                "limit" => MAX_DIRECTIVES_PER_SOURCE
            );
            outcome.directives.truncate(MAX_DIRECTIVES_PER_SOURCE);
        }

        // Stage 3: Report
        let report = PragmaReport::new(name, &metrics, outcome, start_time.elapsed());
        report.log_success();
        Ok(report)
    })
}

/// Read a file and process it
pub fn process_file(path: &Path, config: &RuntimeConfig) -> Result<PragmaReport, PipelineError> {
    let name = path.display().to_string();
    check_size(&name, std::fs::metadata(path)?.len())?;

    let source = std::fs::read_to_string(path).map_err(|error| {
        crate::log_error!(crate::logging::codes::pipeline::IO_ERROR, "Failed to read source",
            "source" => name,
            "error" => error
        );
        error
    })?;
    process_source(&name, &source, config)
}

fn check_size(name: &str, size: u64) -> Result<(), PipelineError> {
    if size > MAX_SOURCE_SIZE {
        return Err(PipelineError::SourceTooLarge {
            name: name.to_string(),
            size,
            max_size: MAX_SOURCE_SIZE,
        });
    }
    Ok(())
}

/// Validate that every stage's codes and limits are configured
pub fn validate_pipeline() -> Result<(), String> {
    crate::log_debug!("Validating pipeline configuration");

    crate::lexical::validate_tokenization()?;
    crate::syntax::init_syntax_logging()?;
    crate::logging::config::validate_config()?;

    crate::log_success!(
        crate::logging::codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Pipeline validation succeeded",
        "profile" => crate::config::build_info::profile()
    );
    Ok(())
}
