use crate::lexical::LexerError;
use crate::logging::{codes, Code};

/// Failures that stop a source from being processed at all. Directive
/// diagnostics are never pipeline errors; they land in the report.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Lexical analysis failed: {0}")]
    LexicalAnalysis(#[from] LexerError),

    #[error("I/O error reading source: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source {name} is too large: {size} bytes (max: {max_size})")]
    SourceTooLarge {
        name: String,
        size: u64,
        max_size: u64,
    },
}

impl PipelineError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::LexicalAnalysis(error) => error.error_code(),
            Self::Io(_) => codes::pipeline::IO_ERROR,
            Self::SourceTooLarge { .. } => codes::pipeline::SOURCE_TOO_LARGE,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }
}
